use clap::Parser;

use fintwin::api::{Cli, CliError, run_cli};
use fintwin::logging::{LoggingConfig, init_logging};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = init_logging(&LoggingConfig::from_env()) {
        eprintln!("Logging setup failed: {e}");
    }

    let cli = Cli::parse();
    match run_cli(cli).await {
        Ok(()) => {}
        Err(CliError::Reported) => std::process::exit(1),
        Err(CliError::Message(msg)) => {
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}
