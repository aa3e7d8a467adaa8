//! tabgen - static shell completion generator
//!
//! # Usage
//!
//! ```bash
//! # Generate a bash completion script
//! tabgen generate prog.toml --shell bash -o prog.bash
//!
//! # Ask the reference engine what it would offer
//! tabgen complete prog.toml -- build --
//! ```

use tabgen::cli::CliInterface;
use tabgen::error::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Application entry point
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments
/// 2. Load configuration
/// 3. Initialize logging
/// 4. Run the selected subcommand
fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    cli.handle_command()
}

/// Initialize logging system based on verbosity level
///
/// Logs go to stderr so scripts written to stdout stay clean. `RUST_LOG`
/// takes precedence over flags and configuration when set.
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    // Build subscriber with level filter
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // Configure timestamps
    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
