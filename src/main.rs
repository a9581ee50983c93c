use clap::Parser;
use gitdata::AppError;
use gitdata::cli::dispatcher::Dispatcher;
use gitdata::cli::main_types::Cli;
use gitdata::storage::app_dir;
use gitdata::storage::config::Config;
use gitdata::utils::logging::init_tracing;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        match err {
            // The operator chose to stop at the source prompt.
            AppError::Aborted => std::process::exit(0),
            err => {
                eprintln!("Error: {}", err);
                if let Some(hint) = err.troubleshooting_hint() {
                    eprintln!("Hint: {}", hint);
                }
                std::process::exit(1);
            }
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let dir_override = cli.config_dir.as_ref().map(PathBuf::from);
    let app_dir = app_dir(dir_override.as_deref())?;
    let config = Config::load(Some(Config::file_in(&app_dir)))?;

    if cli.verbose {
        println!("Verbose mode is enabled");
        println!("Using config directory: {}", app_dir.display());
    }

    let dispatcher = Dispatcher::new(config, app_dir, cli.authuser, cli.verbose);
    dispatcher.dispatch(cli.command).await
}
