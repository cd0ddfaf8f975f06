use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use clap::ValueEnum;
use rust_decimal::Decimal;

/// Three-letter, upper-case ISO 4217 style currency code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        // Only ASCII letters ever get in, see `from_str`.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        let bytes: [u8; 3] = normalized
            .as_bytes()
            .try_into()
            .map_err(|_| format!("currency code must be 3 letters, got {:?}", s))?;
        if !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(format!("currency code must be 3 letters, got {:?}", s));
        }

        Ok(CurrencyCode(bytes))
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a sample's date is rendered in the ledger and in notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DateFormat {
    /// `DD-MM-YYYY`
    #[default]
    Dmy,
    /// `YYYY-MM-DD`
    Iso,
}

impl DateFormat {
    pub fn render(self, date: NaiveDate) -> String {
        match self {
            DateFormat::Dmy => date.format("%d-%m-%Y").to_string(),
            DateFormat::Iso => date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// One fetched observation for a currency pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRateSample {
    pub base: CurrencyCode,
    pub target: CurrencyCode,
    pub rate: Decimal,
    pub observed_at: NaiveDate,
}

impl ExchangeRateSample {
    /// Ledger column name for this pair, e.g. `GBP_INR`.
    pub fn pair_label(&self) -> String {
        format!("{}_{}", self.base, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_code_is_normalized() {
        let code: CurrencyCode = " gbp ".parse().unwrap();
        assert_eq!(code.as_str(), "GBP");
        assert_eq!(code.to_string(), "GBP");
    }

    #[test]
    fn currency_code_rejects_bad_input() {
        assert!("GB".parse::<CurrencyCode>().is_err());
        assert!("GBPX".parse::<CurrencyCode>().is_err());
        assert!("G1P".parse::<CurrencyCode>().is_err());
        assert!("".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn date_formats() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        assert_eq!(DateFormat::Dmy.render(date), "01-06-2023");
        assert_eq!(DateFormat::Iso.render(date), "2023-06-01");
    }
}
