use std::{
    fmt::Display,
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use env_logger::{Builder, Env, Target};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Logs to stderr, or appends `<timestamp> - <message>` lines to `log_file`.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Can't create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Can't open log file {}", path.display()))?;

        builder
            .target(Target::Pipe(Box::new(file)))
            .format(|buf, record| {
                writeln!(buf, "{}", log_line(Local::now().naive_local(), record.args()))
            });
    }

    builder.try_init()?;

    Ok(())
}

fn log_line(at: NaiveDateTime, message: impl Display) -> String {
    format!("{} - {}", at.format(TIMESTAMP_FORMAT), message)
}
