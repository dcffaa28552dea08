use thiserror::Error;

use crate::NetworkError;

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("unable to serialize body as json: {0}")]
    Json(serde_json::Error),
    #[error("unable to serialize body as xml: {0}")]
    Xml(serde_xml_rs::Error),
    #[error("unable to serialize body as url-encoded form: {0}")]
    UrlEncoded(serde_urlencoded::ser::Error),
}

#[derive(Debug, Error)]
pub enum DeserializationError {
    #[error("unable to deserialize json body: {0}")]
    Json(serde_json::Error),
    #[error("unable to deserialize xml body: {0}")]
    Xml(serde_xml_rs::Error),
    #[error("unable to deserialize url-encoded body: {0}")]
    UrlEncoded(serde_urlencoded::de::Error),
    #[error("{0}")]
    Unknown(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid header {name}")]
    InvalidHeader { name: String },
    #[error("unable to send request: {err}")]
    UnableToSendRequest { err: reqwest::Error },
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("remote responded with {}", .0.status)]
    NetworkError(NetworkError),
    #[error(transparent)]
    SerializationError(SerializationError),
    #[error(transparent)]
    DeserializationError(DeserializationError),
    #[error(transparent)]
    Unknown(anyhow::Error),
}

impl FetchError {
    /// Returns true when the request was aborted by the configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}
