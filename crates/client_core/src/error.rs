use std::path::PathBuf;

use shared::error::ProtocolError;
use thiserror::Error;

const GENERIC_REJECTION: &str = "Could not add the product to the cart";

/// Every way a cart action can end without a positive acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("no product is selected")]
    MissingTarget,
    #[error("session is not authenticated")]
    Unauthenticated,
    #[error("cart rejected the request: {}", .reason.as_deref().unwrap_or("no reason given"))]
    Rejected { reason: Option<String> },
    #[error("cart request failed: {0}")]
    Transport(String),
}

impl SubmitError {
    /// Text for the error toast: the server's own reason when it gave one.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingTarget => "Could not identify the product".to_string(),
            Self::Unauthenticated => "Sign in to add items to your cart".to_string(),
            Self::Rejected { reason } => reason
                .clone()
                .unwrap_or_else(|| GENERIC_REJECTION.to_string()),
            Self::Transport(_) => "Connection error".to_string(),
        }
    }
}

impl From<EndpointError> for SubmitError {
    fn from(value: EndpointError) -> Self {
        Self::Transport(value.to_string())
    }
}

impl From<ProtocolError> for SubmitError {
    fn from(value: ProtocolError) -> Self {
        Self::Transport(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid cart url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid server url '{url}': {source}")]
    InvalidServerUrl {
        url: String,
        source: url::ParseError,
    },
}
