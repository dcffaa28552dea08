use std::{fmt::Display, str::FromStr};

use crate::FetchHeaders;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContentType {
    #[default]
    Json,
    TextXml,
    ApplicationXml,
    UrlEncoded,
    TextPlain,
}

impl Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mime = match self {
            ContentType::Json => "application/json",
            ContentType::TextXml => "text/xml",
            ContentType::ApplicationXml => "application/xml",
            ContentType::UrlEncoded => "application/x-www-form-urlencoded",
            ContentType::TextPlain => "text/plain",
        };
        write!(f, "{mime}")
    }
}

impl FromStr for ContentType {
    type Err = String;

    /// Parses a `Content-Type` header value, ignoring parameters such as `charset`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mime = s.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match mime.as_str() {
            "application/json" => Ok(ContentType::Json),
            "text/xml" => Ok(ContentType::TextXml),
            "application/xml" => Ok(ContentType::ApplicationXml),
            "application/x-www-form-urlencoded" => Ok(ContentType::UrlEncoded),
            "text/plain" => Ok(ContentType::TextPlain),
            _ => Err(format!("unsupported content type {s}")),
        }
    }
}

impl From<ContentType> for String {
    fn from(value: ContentType) -> Self {
        value.to_string()
    }
}

/// Per-call options. Every `Some` field overrides the matching default of the `Fetch` instance.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub headers: Option<FetchHeaders>,
    pub params: Option<FetchHeaders>,
    /// When false the body is left in `FetchResponse::raw_body` only
    pub deserialize_body: bool,
    pub accept: Option<ContentType>,
    pub content_type: Option<ContentType>,
    /// Replaces the client timeout for this call; zero keeps the client default
    pub timeout_ms: Option<u64>,
    /// Sends and stores cookies for this call regardless of the client default
    pub with_credentials: Option<bool>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            headers: None,
            params: None,
            deserialize_body: true,
            accept: None,
            content_type: None,
            timeout_ms: None,
            with_credentials: None,
        }
    }
}
