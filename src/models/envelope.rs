use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ClientError, ClientResult};

/// Application-level success code carried in every LightX response body.
pub const SUCCESS_STATUS_CODE: i64 = 2000;

/// Response wrapper shared by every LightX JSON endpoint.
///
/// The body is kept raw until the status code has been checked, since rejected
/// responses do not carry the success shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.status_code == SUCCESS_STATUS_CODE
    }

    /// Check the envelope status and decode the body.
    pub fn into_body<T: DeserializeOwned>(self) -> ClientResult<T> {
        if !self.is_success() {
            return Err(ClientError::ApiRejected {
                status_code: self.status_code,
                message: self.message,
            });
        }

        let body = self.body.ok_or_else(|| ClientError::ApiRejected {
            status_code: self.status_code,
            message: "response envelope has no body".to_string(),
        })?;

        Ok(serde_json::from_value(body)?)
    }
}
