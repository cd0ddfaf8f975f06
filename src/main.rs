use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::{error, info, warn};
use reqwest::Client;

mod cli;
mod config;
mod error;
mod exchange_rate;
mod fetcher;
mod latest_rates;
mod logging;
mod notifier;
mod pipeline;
mod recorder;
#[cfg(test)]
mod test_support;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dotenv = dotenvy::dotenv();
    logging::init(cli.log_file.as_deref())?;

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => warn!("Can't load .env: {}", err),
    }

    match pipeline::run(&cli, |name| std::env::var(name).ok(), Client::new()).await {
        Ok(sample) => {
            info!(
                "Done: {} on {} is {}",
                sample.pair_label(),
                sample.observed_at,
                sample.rate
            );
            Ok(())
        }
        Err(err) => {
            error!("{}", err);
            if cli.log_file.is_some() {
                eprintln!("❌ {}", err);
            }
            std::process::exit(err.exit_code());
        }
    }
}
