use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
pub struct LatestRates {
    pub result: Option<String>,
    #[serde(rename = "error-type")]
    pub error_type: Option<String>,
    pub time_last_update_utc: Option<String>,
    #[serde(default)]
    pub conversion_rates: HashMap<String, Decimal>,
}

/// Error body returned by the service alongside non-2xx statuses.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ApiError {
    #[serde(rename = "error-type")]
    pub error_type: String,
}
