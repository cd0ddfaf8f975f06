use thiserror::Error;

use crate::{config::ConfigError, fetcher::FetchError, notifier::NotifyError, recorder::RecordError};

/// Everything that can abort a single run of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("API error: {0}")]
    Transport(FetchError),
    #[error("data parsing error: {0}")]
    Data(FetchError),
    #[error("file write error: {0}")]
    Persistence(#[from] RecordError),
    #[error("email delivery error: {0}")]
    Delivery(#[from] NotifyError),
}

impl From<FetchError> for PipelineError {
    fn from(err: FetchError) -> Self {
        if err.is_transport() {
            PipelineError::Transport(err)
        } else {
            PipelineError::Data(err)
        }
    }
}

impl PipelineError {
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Configuration(_) => 2,
            _ => 1,
        }
    }
}
