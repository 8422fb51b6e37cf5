use crate::{Error, Result};
use serde::Deserialize;

/// `ErrorCode` value the platform uses for success.
pub const SUCCESS_CODE: i64 = 1;

/// Standard wrapper around every platform payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlatformEnvelope<T> {
    pub response: Option<T>,
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub throttle_seconds: f64,
    #[serde(default)]
    pub error_status: String,
    #[serde(default)]
    pub message: String,
}

impl<T> PlatformEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.error_code == SUCCESS_CODE && self.response.is_some()
    }

    /// Payload, or [`Error::Remote`] carrying the envelope's error fields.
    ///
    /// `status` is the HTTP status the envelope arrived with.
    pub fn into_result(self, status: u16) -> Result<T> {
        match self.response {
            Some(payload) => Ok(payload),
            None => Err(Error::Remote {
                status,
                error_code: self.error_code,
                error_status: self.error_status,
                message: self.message,
            }),
        }
    }
}
