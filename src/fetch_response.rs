use bytes::Bytes;
use std::net::SocketAddr;

use reqwest::{StatusCode, Url};

use crate::FetchHeaders;

#[derive(Debug)]
pub struct FetchResponse<T> {
    pub body: Option<T>,
    pub raw_body: Option<Bytes>,
    pub status: StatusCode,
    /// The fully resolved request target
    pub url: Url,
    pub response_headers: FetchHeaders,
    pub remote_address: Option<SocketAddr>,
}
