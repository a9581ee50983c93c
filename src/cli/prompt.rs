use crate::core::source::{SourceChoice, SourcePrompt};
use crate::error::{AppError, CliError};
use rpassword::read_password;
use std::io::{self, BufRead, Write};

/// Interactive data-source question on a line-oriented terminal.
///
/// Unrecognized answers are asked again; end of input means abort.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

pub type StdinPrompt = LinePrompt<io::StdinLock<'static>, io::Stdout>;

impl StdinPrompt {
    pub fn stdin() -> Self {
        LinePrompt::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn write(&mut self, text: &str) -> Result<(), AppError> {
        self.output
            .write_all(text.as_bytes())
            .and_then(|_| self.output.flush())
            .map_err(|e| CliError::Input(format!("Failed to write prompt: {}", e)).into())
    }
}

/// Map an answer to a choice; `c` only counts when a cache entry exists.
fn parse_choice(answer: &str, cache_available: bool) -> Option<SourceChoice> {
    match answer.trim().to_lowercase().as_str() {
        "a" => Some(SourceChoice::Api),
        "c" if cache_available => Some(SourceChoice::Cache),
        "x" => Some(SourceChoice::Abort),
        _ => None,
    }
}

impl<R: BufRead, W: Write> SourcePrompt for LinePrompt<R, W> {
    fn choose(&mut self, cached_at: Option<&str>) -> Result<SourceChoice, AppError> {
        let question = match cached_at {
            Some(timestamp) => {
                self.write(&format!("Cached data found -->> {}\n", timestamp))?;
                "Read from API (a), cache (c) or exit (x)? "
            }
            None => {
                self.write("Cached data not available.\n")?;
                "Read from API (a) or exit (x)? "
            }
        };

        loop {
            self.write(question)?;

            let mut answer = String::new();
            let read = self
                .input
                .read_line(&mut answer)
                .map_err(|e| CliError::Input(format!("Failed to read answer: {}", e)))?;
            if read == 0 {
                return Ok(SourceChoice::Abort);
            }

            if let Some(choice) = parse_choice(&answer, cached_at.is_some()) {
                return Ok(choice);
            }
            self.write("Error: invalid input\n")?;
        }
    }
}

/// Read an access token without echo.
pub fn read_token() -> Result<String, AppError> {
    print!("Access token: ");
    io::stdout()
        .flush()
        .map_err(|e| CliError::Input(format!("Failed to flush stdout: {}", e)))?;

    let token = read_password()
        .map_err(|e| CliError::Input(format!("Failed to read token: {}", e)))?;
    Ok(token.trim().to_string())
}
