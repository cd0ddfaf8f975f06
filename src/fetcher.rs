use chrono::{DateTime, NaiveDate, NaiveDateTime, Weekday};
use log::{debug, info};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    config::ApiKey,
    exchange_rate::{CurrencyCode, ExchangeRateSample},
    latest_rates::{ApiError, LatestRates},
};

pub const DEFAULT_API_URL: &str = "https://v6.exchangerate-api.com/v6";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("service responded with {status} ({})", .error_type.as_deref().unwrap_or("no details"))]
    Status {
        status: StatusCode,
        error_type: Option<String>,
    },
    #[error("malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("service reported an error: {0}")]
    Api(String),
    #[error("{0} not found in conversion rates")]
    TargetCurrencyNotFound(CurrencyCode),
    #[error("rate for {0} is not positive: {1}")]
    InvalidRate(CurrencyCode, Decimal),
    #[error("response is missing {0}")]
    MissingField(&'static str),
    #[error("can't parse update time {0:?}")]
    TimestampUnparseable(String),
}

impl FetchError {
    /// Whether the failure happened before a usable body was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Request(_) | FetchError::Status { .. })
    }
}

/// Pulls the latest rates for a base currency from the exchange-rate service.
#[derive(Debug, Clone)]
pub struct RateFetcher {
    client: Client,
    base_url: String,
}

impl RateFetcher {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Issues a single GET and extracts the `base` to `target` rate. No retries.
    pub async fn fetch(
        &self,
        api_key: &ApiKey,
        base: CurrencyCode,
        target: CurrencyCode,
    ) -> Result<ExchangeRateSample, FetchError> {
        info!("Fetching latest {} rates", base);

        let resp = self
            .client
            .get(self.latest_url(api_key, base))
            .send()
            .await
            .map_err(|err| FetchError::Request(err.without_url()))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|err| FetchError::Request(err.without_url()))?;

        if !status.is_success() {
            let error_type = serde_json::from_str::<ApiError>(&text)
                .ok()
                .map(|body| body.error_type);
            return Err(FetchError::Status { status, error_type });
        }
        debug!("Received {} bytes for {}", text.len(), base);

        parse_latest(&text, base, target)
    }

    fn latest_url(&self, api_key: &ApiKey, base: CurrencyCode) -> String {
        format!(
            "{}/{}/latest/{}",
            self.base_url.trim_end_matches('/'),
            api_key.expose(),
            base
        )
    }
}

/// Turns a `latest` response body into a sample for `target`.
pub fn parse_latest(
    body: &str,
    base: CurrencyCode,
    target: CurrencyCode,
) -> Result<ExchangeRateSample, FetchError> {
    let latest: LatestRates = serde_json::from_str(body)?;
    if latest.result.as_deref() == Some("error") {
        return Err(FetchError::Api(
            latest.error_type.unwrap_or_else(|| "unknown".to_string()),
        ));
    }

    let rate = *latest
        .conversion_rates
        .get(target.as_str())
        .ok_or(FetchError::TargetCurrencyNotFound(target))?;
    if rate <= Decimal::ZERO {
        return Err(FetchError::InvalidRate(target, rate));
    }

    let updated = latest
        .time_last_update_utc
        .ok_or(FetchError::MissingField("time_last_update_utc"))?;
    let observed_at = parse_update_date(&updated)?;

    Ok(ExchangeRateSample {
        base,
        target,
        rate,
        observed_at,
    })
}

/// Calendar date of the service's `time_last_update_utc`.
///
/// Accepts `Thu, 01 Jun 2023 00:00:01 +0000` and falls back to
/// `2023-06-01 00:00:01`. The date is taken in the offset the string carries.
pub fn parse_update_date(raw: &str) -> Result<NaiveDate, FetchError> {
    let raw = raw.trim();
    parse_rfc1123_date(raw)
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .ok_or_else(|| FetchError::TimestampUnparseable(raw.to_string()))
}

// The weekday must be a weekday name but is not checked against the date.
fn parse_rfc1123_date(raw: &str) -> Option<NaiveDate> {
    let (weekday, rest) = raw.split_once(',')?;
    weekday.trim().parse::<Weekday>().ok()?;

    DateTime::parse_from_str(rest.trim(), "%d %b %Y %H:%M:%S %z")
        .ok()
        .map(|dt| dt.date_naive())
}
