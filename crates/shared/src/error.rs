use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Negative acknowledgement body as the cart endpoint sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub success: bool,
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed cart response: {0}")]
    Malformed(String),
    #[error("cart acknowledgement is missing `{0}`")]
    MissingField(&'static str),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value.to_string())
    }
}
