use std::{fmt, path::PathBuf};

use thiserror::Error;

use crate::{
    cli::Cli,
    exchange_rate::{CurrencyCode, DateFormat},
    fetcher::DEFAULT_API_URL,
};

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    MissingVar(&'static str),
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Non-empty exchange-rate API key. Never printed.
#[derive(Clone, PartialEq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        (!key.is_empty()).then_some(ApiKey(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Clone, PartialEq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Where a fetched sample goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Sink {
    Csv(PathBuf),
    Email {
        recipient: String,
        smtp: SmtpSettings,
    },
    DryRun,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: ApiKey,
    pub api_url: String,
    pub base: CurrencyCode,
    pub target: CurrencyCode,
    pub date_format: DateFormat,
    pub sink: Sink,
}

impl Config {
    /// Builds the configuration from CLI flags and an environment lookup.
    pub fn from_lookup(
        cli: &Cli,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = lookup("API_KEY")
            .and_then(ApiKey::new)
            .ok_or(ConfigError::MissingVar("API_KEY"))?;
        let api_url = lookup("EXCHANGE_RATE_API_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let base = parse_currency("base currency", &cli.base)?;
        let target = parse_currency("target currency", &cli.target)?;

        let sink = if cli.dry_run {
            Sink::DryRun
        } else if let Some(recipient) = &cli.email_to {
            Sink::Email {
                recipient: recipient.clone(),
                smtp: smtp_settings(&lookup)?,
            }
        } else {
            Sink::Csv(cli.output.clone())
        };

        Ok(Config {
            api_key,
            api_url,
            base,
            target,
            date_format: cli.date_format,
            sink,
        })
    }
}

fn parse_currency(name: &'static str, value: &str) -> Result<CurrencyCode, ConfigError> {
    value
        .parse()
        .map_err(|reason| ConfigError::Invalid { name, reason })
}

fn smtp_settings(lookup: &impl Fn(&str) -> Option<String>) -> Result<SmtpSettings, ConfigError> {
    let required = |name: &'static str| {
        lookup(name)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingVar(name))
    };

    let username = required("EMAIL_ADDRESS")?;
    let password = required("EMAIL_PASSWORD")?;
    let host = lookup("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());
    let port = match lookup("SMTP_PORT") {
        Some(port) => port.trim().parse().map_err(|_| ConfigError::Invalid {
            name: "SMTP_PORT",
            reason: format!("not a port number: {:?}", port),
        })?,
        None => DEFAULT_SMTP_PORT,
    };

    Ok(SmtpSettings {
        host,
        port,
        username,
        password,
    })
}
