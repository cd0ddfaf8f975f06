use std::path::PathBuf;

use clap::Parser;

use crate::exchange_rate::DateFormat;

pub const DEFAULT_OUTPUT: &str = "output/exchange_rates.csv";

/// 📈 Fetch an exchange rate and append it to a CSV ledger (or email it).
///
/// Requires the API_KEY environment variable; EMAIL_ADDRESS and EMAIL_PASSWORD
/// are needed as well when --email-to is given. A `.env` file is honoured.
///
/// Exit status: 0 on success (including --dry-run), 2 on a configuration
/// error (nothing is fetched), 1 when fetching, recording or sending fails.
#[derive(Parser, Debug, Clone)]
#[command(name = "rate-ledger", version)]
pub struct Cli {
    /// Base currency
    #[arg(short, long, default_value = "GBP")]
    pub base: String,

    /// Target currency
    #[arg(short, long, default_value = "INR")]
    pub target: String,

    /// Output CSV file path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Only display the rate, don't save or send it
    #[arg(long)]
    pub dry_run: bool,

    /// Email the rate to this address instead of writing the CSV
    #[arg(long, value_name = "ADDRESS")]
    pub email_to: Option<String>,

    /// How dates are written
    #[arg(long, value_enum, default_value_t = DateFormat::Dmy)]
    pub date_format: DateFormat,

    /// Append log lines to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
