use log::info;
use reqwest::Client;

use crate::{
    cli::Cli,
    config::{Config, Sink},
    error::PipelineError,
    exchange_rate::ExchangeRateSample,
    fetcher::RateFetcher,
    notifier::EmailNotifier,
    recorder::CsvRecorder,
};

/// Fetch one sample and hand it to the configured sink.
pub struct Pipeline {
    config: Config,
    fetcher: RateFetcher,
}

impl Pipeline {
    pub fn new(config: Config, client: Client) -> Self {
        let fetcher = RateFetcher::new(client, config.api_url.clone());
        Self { config, fetcher }
    }

    pub async fn run(&self) -> Result<ExchangeRateSample, PipelineError> {
        let Config {
            api_key,
            base,
            target,
            date_format,
            sink,
            ..
        } = &self.config;

        let sample = self.fetcher.fetch(api_key, *base, *target).await?;
        let date = date_format.render(sample.observed_at);
        println!("💱 {} → {} rate on {}: {}", base, target, date, sample.rate);

        match sink {
            Sink::DryRun => info!("Dry run, nothing recorded"),
            Sink::Csv(path) => {
                let recorder = CsvRecorder::new(path, *date_format);
                if recorder.append(&sample)? {
                    info!("Created {} with header", recorder.path().display());
                }
                println!(
                    "✅ {}/{} rate ({}) for {} saved to {}",
                    base,
                    target,
                    sample.rate,
                    date,
                    recorder.path().display()
                );
            }
            Sink::Email { recipient, smtp } => {
                EmailNotifier::new(smtp.clone(), *date_format)
                    .send(&sample, recipient)
                    .await?;
                println!("✅ {}/{} rate emailed to {}", base, target, recipient);
            }
        }

        Ok(sample)
    }
}

/// Builds the configuration and runs the pipeline once.
///
/// Configuration problems are reported before any request is made.
pub async fn run(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
    client: Client,
) -> Result<ExchangeRateSample, PipelineError> {
    let config = Config::from_lookup(cli, lookup)?;
    info!(
        "Running {}/{} with sink {:?}",
        config.base, config.target, config.sink
    );

    Pipeline::new(config, client).run().await
}
