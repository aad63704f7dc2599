use clap::Parser;

use xcard::cli::{self, Cli, Command};
use xcard::{logging, server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Version) = cli.command {
        cli::handle_version();
        return Ok(());
    }

    let mut config = cli::load(cli.config.as_deref())?;
    logging::init_logging(&config.logging)?;

    match cli.command {
        Some(Command::Lookup { id }) => {
            if !cli::handle_lookup(&config, &id).await? {
                std::process::exit(1);
            }
        }
        Some(Command::Start { bind }) => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            server::run_server(config).await?;
        }
        None => server::run_server(config).await?,
        Some(Command::Version) => {}
    }

    Ok(())
}
