use bytes::Bytes;
use reqwest::{Response, StatusCode, Url};

use crate::{utils::reqwest_headers_to_map, FetchHeaders};

/// A response the remote answered with a 4xx or 5xx status.
#[derive(Debug)]
pub struct NetworkError {
    pub status: StatusCode,
    pub url: Url,
    pub response_headers: FetchHeaders,
    pub body: Option<Bytes>,
}

impl NetworkError {
    /// Reads the error body. Fails only if the body cannot be read, e.g. on timeout.
    pub async fn new(response: Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let url = response.url().clone();
        let response_headers = reqwest_headers_to_map(response.headers());
        let body = response.bytes().await?;

        Ok(Self {
            status,
            url,
            response_headers,
            body: Some(body),
        })
    }

    /// The response body as text, if it was valid utf8.
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .and_then(|b| String::from_utf8(b.to_vec()).ok())
    }
}
