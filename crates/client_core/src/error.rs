use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("control is missing the `{attribute}` attribute")]
    MissingAttribute { attribute: &'static str },
    #[error("update request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("update response was not valid JSON: {0}")]
    InvalidResponse(#[from] serde_json::Error),
    #[error("invalid page url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type ErrorCallback = Arc<dyn Fn(&DispatchError) + Send + Sync>;

pub fn log_only_error_callback() -> ErrorCallback {
    Arc::new(|err: &DispatchError| {
        tracing::error!(error = %err, "cart control handler failed");
    })
}
