use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` wins over the verbosity switch.
pub fn init_tracing(verbose: bool) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(default_directive(verbose)),
    };

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "gitdata=info" } else { "gitdata=warn" }
}

pub fn print_verbose(verbose: bool, msg: &str) {
    if verbose {
        println!("Verbose: {}", msg);
    }
}

pub fn print_verbose_with_prefix(verbose: bool, prefix: &str, msg: &str) {
    if verbose {
        println!("{}: {}", prefix, msg);
    }
}
