use lettre::{
    Message, SmtpTransport, Transport,
    address::AddressError,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use log::info;
use thiserror::Error;

use crate::{
    config::SmtpSettings,
    exchange_rate::{DateFormat, ExchangeRateSample},
};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid address {address:?}: {source}")]
    Address {
        address: String,
        source: AddressError,
    },
    #[error("can't build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP failure: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("mail task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Mails a sample over an authenticated STARTTLS submission session.
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    smtp: SmtpSettings,
    date_format: DateFormat,
}

impl EmailNotifier {
    pub fn new(smtp: SmtpSettings, date_format: DateFormat) -> Self {
        Self { smtp, date_format }
    }

    pub async fn send(
        &self,
        sample: &ExchangeRateSample,
        recipient: &str,
    ) -> Result<(), NotifyError> {
        let message = self.compose(sample, recipient)?;
        let transport = SmtpTransport::starttls_relay(&self.smtp.host)?
            .port(self.smtp.port)
            .credentials(Credentials::new(
                self.smtp.username.clone(),
                self.smtp.password.clone(),
            ))
            .build();

        info!(
            "Sending {} rate to {} via {}:{}",
            sample.pair_label(),
            recipient,
            self.smtp.host,
            self.smtp.port
        );
        let response = tokio::task::spawn_blocking(move || transport.send(&message)).await??;
        info!("Mail accepted with code {}", response.code());

        Ok(())
    }

    pub fn compose(
        &self,
        sample: &ExchangeRateSample,
        recipient: &str,
    ) -> Result<Message, NotifyError> {
        Ok(Message::builder()
            .from(mailbox(&self.smtp.username)?)
            .to(mailbox(recipient)?)
            .subject(subject(sample))
            .header(ContentType::TEXT_PLAIN)
            .body(body(sample, self.date_format))?)
    }
}

fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}

fn subject(sample: &ExchangeRateSample) -> String {
    format!("💱 Today's {} {} Exchange Rate", sample.base, sample.target)
}

fn body(sample: &ExchangeRateSample, date_format: DateFormat) -> String {
    format!(
        "Hi,\n\n\
         Today's {base} {target} Exchange Rate\n\
         💱 {base} → {target} rate on {date}: {rate}\n\n\
         Regards",
        base = sample.base,
        target = sample.target,
        date = date_format.render(sample.observed_at),
        rate = sample.rate,
    )
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;

    fn sample() -> ExchangeRateSample {
        ExchangeRateSample {
            base: "GBP".parse().unwrap(),
            target: "INR".parse().unwrap(),
            rate: Decimal::from_str("102.34").unwrap(),
            observed_at: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        }
    }

    fn notifier(date_format: DateFormat) -> EmailNotifier {
        EmailNotifier::new(
            SmtpSettings {
                host: "smtp.example.com".to_string(),
                port: 587,
                username: "me@example.com".to_string(),
                password: "secret".to_string(),
            },
            date_format,
        )
    }

    #[test]
    fn subject_names_the_pair() {
        assert_eq!(subject(&sample()), "💱 Today's GBP INR Exchange Rate");
    }

    #[test]
    fn body_embeds_the_sample() {
        let text = body(&sample(), DateFormat::Iso);
        assert!(text.contains("💱 GBP → INR rate on 2024-01-02: 102.34"));

        let text = body(&sample(), DateFormat::Dmy);
        assert!(text.contains("rate on 02-01-2024: 102.34"));
    }

    #[test]
    fn composes_message() {
        let message = notifier(DateFormat::Dmy)
            .compose(&sample(), "someone@example.com")
            .unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(raw.contains("someone@example.com"));
        assert!(raw.contains("me@example.com"));
    }

    #[test]
    fn rejects_bad_recipient() {
        let err = notifier(DateFormat::Dmy)
            .compose(&sample(), "not an address")
            .unwrap_err();
        assert!(matches!(err, NotifyError::Address { .. }));
    }
}
