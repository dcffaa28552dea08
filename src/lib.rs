//! Client-side bootstrap for the scheduler simulation.
//!
//! [`app::initialize`] builds the application from a root component, configures a
//! shared [`Fetch`] client from an [`AppConfig`] and mounts the root onto a host
//! document element. Components receive the client through [`app::AppContext`].

pub mod api;
pub mod app;
mod app_config;
pub mod document;
mod error;
mod fetch_config;
mod fetch_options;
mod fetch_response;
mod network_error;
mod utils;

use anyhow::anyhow;
use bytes::Bytes;
pub use app_config::{
    AppConfig, ConfigError, BASE_URL_VAR, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS, TIMEOUT_MS_VAR,
    WITH_CREDENTIALS_VAR,
};
pub use error::{DeserializationError, FetchError, FetchResult, SerializationError};
pub use fetch_config::FetchConfig;
pub use fetch_options::{ContentType, FetchOptions};
pub use fetch_response::FetchResponse;
pub use network_error::NetworkError;
pub use reqwest;
pub use reqwest::StatusCode;
use reqwest::{
    cookie::Jar, header::HeaderMap, Client, ClientBuilder, Method, RequestBuilder, Response, Url,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::{collections::HashMap, time::Duration};
use utils::{map_to_reqwest_headers, reqwest_headers_to_map};

pub type FetchHeaders = HashMap<String, String>;
pub const USER_AGENT: &'static str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct Fetch {
    client: Client,
    /// Same defaults as `client`, plus the cookie jar
    credentialed_client: Client,
    pub config: Option<FetchConfig>,
    base_url: String,
    cookie_jar: Arc<Jar>,
}

impl Default for Fetch {
    fn default() -> Self {
        let mut headers: FetchHeaders = HashMap::new();
        Self::insert_default_headers(&mut headers, Default::default());

        let default_headers = map_to_reqwest_headers(&headers).unwrap_or_default();
        let cookie_jar: Arc<Jar> = Default::default();

        Self {
            client: ClientBuilder::default()
                .default_headers(default_headers.clone())
                .build()
                .unwrap_or_default(),
            credentialed_client: ClientBuilder::default()
                .default_headers(default_headers)
                .cookie_provider(cookie_jar.clone())
                .build()
                .unwrap_or_default(),
            config: Some(FetchConfig {
                headers: Some(headers),
                ..Default::default()
            }),
            base_url: Default::default(),
            cookie_jar,
        }
    }
}

impl Fetch {
    /// Creates a new instance of Fetch with a set base url and optional Options
    ///
    /// # Example
    /// ```rust
    /// use scheduler_client::Fetch;
    /// let client = Fetch::new("http://localhost:8080", None);
    /// assert_ne!(true, client.is_err());
    ///
    /// ```
    pub fn new(base_url: &str, options: Option<FetchConfig>) -> FetchResult<Self> {
        Self::with_cookie_jar(base_url, options, Default::default())
    }

    /// Creates the client the application shares: base url, credential policy and timeout
    /// all come from `config`.
    ///
    /// # Example
    /// ```rust
    /// use scheduler_client::{AppConfig, Fetch};
    ///
    /// let fetch = Fetch::from_app_config(&AppConfig::default()).unwrap();
    /// assert_eq!("http://localhost:8080", fetch.base_url());
    /// assert_eq!(Some(10000), fetch.timeout_ms());
    /// assert!(fetch.with_credentials());
    /// ```
    pub fn from_app_config(config: &AppConfig) -> FetchResult<Self> {
        Self::new(&config.base_url, Some(config.fetch_config()))
    }

    fn with_cookie_jar(
        base_url: &str,
        options: Option<FetchConfig>,
        cookie_jar: Arc<Jar>,
    ) -> FetchResult<Self> {
        let mut options = options.unwrap_or_default();
        let mut headers = options.headers.clone().unwrap_or_default();

        Self::insert_default_headers(&mut headers, Some(&options));
        options.headers = Some(headers);
        // zero means no timeout at all
        options.timeout_ms = options.timeout_ms.filter(|timeout| *timeout > 0);

        let default_headers = match &options.headers {
            Some(headers) => Some(map_to_reqwest_headers(headers)?),
            None => None,
        };
        let client = Self::build_client(&options, default_headers.clone(), None)?;
        let credentialed_client =
            Self::build_client(&options, default_headers, Some(cookie_jar.clone()))?;

        log::debug!(
            "fetch client for {base_url} (timeout: {:?}ms, credentials: {})",
            options.timeout_ms,
            options.with_credentials
        );

        Ok(Self {
            base_url: base_url.to_string(),
            config: Some(options),
            client,
            credentialed_client,
            cookie_jar,
        })
    }

    fn build_client(
        options: &FetchConfig,
        default_headers: Option<HeaderMap>,
        cookie_jar: Option<Arc<Jar>>,
    ) -> FetchResult<Client> {
        let mut client = ClientBuilder::default();
        if let Some(headers) = default_headers {
            client = client.default_headers(headers);
        }
        if let Some(timeout) = &options.timeout_ms {
            client = client.timeout(Duration::from_millis(timeout.to_owned()))
        }
        // the jar also sees every redirect hop
        if let Some(jar) = cookie_jar {
            client = client.cookie_provider(jar);
        }

        client
            .build()
            .map_err(|e| FetchError::Unknown(anyhow!(e)))
    }

    fn insert_default_headers(headers: &mut FetchHeaders, config: Option<&FetchConfig>) {
        headers.insert("user-agent".to_string(), USER_AGENT.to_string());
        if let Some(config) = config {
            headers.insert(
                reqwest::header::CONTENT_TYPE.to_string(),
                config.content_type.clone().to_string(),
            );
            headers.insert(
                reqwest::header::ACCEPT.to_string(),
                config.accept.clone().to_string(),
            );
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The default timeout applied to requests without their own
    pub fn timeout_ms(&self) -> Option<u64> {
        self.config.as_ref().and_then(|c| c.timeout_ms)
    }

    pub fn with_credentials(&self) -> bool {
        self.config
            .as_ref()
            .map(|c| c.with_credentials)
            .unwrap_or_default()
    }

    /// Sets the default headers for this instance of Fetch. Stored cookies are kept.
    ///
    /// # Example
    /// ```rust
    /// use scheduler_client::{Fetch, map_string};
    ///
    /// let mut client = Fetch::new("http://localhost:8080", None).unwrap();
    /// let set_header_result = client.set_default_headers(Some(map_string!{ header1 : "header 1 value" }));
    /// assert_ne!(true, set_header_result.is_err());
    ///
    /// ```
    pub fn set_default_headers(&mut self, headers: Option<FetchHeaders>) -> FetchResult<()> {
        let mut headers = headers.unwrap_or_default();

        Self::insert_default_headers(&mut headers, self.config.as_ref());

        let opts: FetchConfig = FetchConfig {
            headers: Some(headers),
            ..self.config.clone().unwrap_or_default()
        };

        let new_fetch = Self::with_cookie_jar(&self.base_url, Some(opts), self.cookie_jar.clone())?;
        self.client = new_fetch.client;
        self.credentialed_client = new_fetch.credentialed_client;
        self.config = new_fetch.config;

        Ok(())
    }

    /// Resolves `endpoint` against the base url, with exactly one `/` between them.
    pub fn build_url(&self, endpoint: &str, options: Option<&FetchOptions>) -> FetchResult<Url> {
        let mut built_string = String::new();
        built_string += &self.base_url;

        if !built_string.ends_with('/') && !endpoint.starts_with('/') {
            built_string += "/";
        } else if built_string.ends_with('/') && endpoint.starts_with('/') {
            built_string.pop();
        }

        built_string += endpoint;
        if let Some(options) = options {
            if let Some(params) = &options.params {
                if !params.is_empty() {
                    let query = serde_urlencoded::to_string(params).map_err(|e| {
                        FetchError::SerializationError(SerializationError::UrlEncoded(e))
                    })?;
                    built_string += "?";
                    built_string += &query;
                }
            }
        }

        let url: Url = built_string
            .parse()
            .map_err(|_| FetchError::InvalidUrl(built_string))?;

        Ok(url)
    }

    fn make_body<U>(
        &self,
        data: U,
        options: Option<&FetchOptions>,
    ) -> FetchResult<(Vec<u8>, ContentType)>
    where
        U: Serialize,
    {
        let content_type = options
            .and_then(|opts| opts.content_type.clone())
            .or_else(|| self.config.as_ref().map(|c| c.content_type.clone()))
            .unwrap_or_default();

        let data_to_return = match content_type {
            ContentType::Json => serde_json::to_vec(&data)
                .map_err(|e| FetchError::SerializationError(SerializationError::Json(e)))?,
            ContentType::TextXml | ContentType::ApplicationXml => serde_xml_rs::to_string(&data)
                .map_err(|e| FetchError::SerializationError(SerializationError::Xml(e)))?
                .into_bytes(),
            ContentType::UrlEncoded => serde_urlencoded::to_string(&data)
                .map_err(|e| FetchError::SerializationError(SerializationError::UrlEncoded(e)))?
                .into_bytes(),
            ContentType::TextPlain => match serde_json::to_value(&data)
                .map_err(|e| FetchError::SerializationError(SerializationError::Json(e)))?
            {
                serde_json::Value::String(text) => text.into_bytes(),
                other => other.to_string().into_bytes(),
            },
        };

        Ok((data_to_return, content_type))
    }

    fn build_request<U>(
        &self,
        data: Option<U>,
        options: &FetchOptions,
        original_builder: RequestBuilder,
    ) -> FetchResult<RequestBuilder>
    where
        U: Serialize,
    {
        let mut builder = original_builder;
        if let Some(headers) = &options.headers {
            builder = builder.headers(map_to_reqwest_headers(headers)?);
        }
        if let Some(body) = data {
            let (body, content_type) = self.make_body(body, Some(options))?;
            builder = builder.body(body);
            builder = builder.header(reqwest::header::CONTENT_TYPE, format!("{content_type}"));
        }
        if let Some(ref accept) = options.accept {
            builder = builder.header(reqwest::header::ACCEPT, accept.to_string());
        }
        if let Some(timeout) = Self::call_timeout_ms(options) {
            builder = builder.timeout(Duration::from_millis(timeout));
        }

        Ok(builder)
    }

    fn sends_credentials(&self, options: &FetchOptions) -> bool {
        options
            .with_credentials
            .unwrap_or_else(|| self.with_credentials())
    }

    fn call_timeout_ms(options: &FetchOptions) -> Option<u64> {
        options.timeout_ms.filter(|timeout| *timeout > 0)
    }

    fn client_for(&self, options: &FetchOptions) -> &Client {
        if self.sends_credentials(options) {
            &self.credentialed_client
        } else {
            &self.client
        }
    }

    /// Maps a transport error, reporting expiry of `timeout_ms` as a timeout.
    fn transport_error(err: reqwest::Error, url: &Url, timeout_ms: Option<u64>) -> FetchError {
        match timeout_ms {
            Some(timeout_ms) if err.is_timeout() => {
                log::warn!("{url} timed out after {timeout_ms}ms");
                FetchError::Timeout { timeout_ms }
            }
            _ => FetchError::UnableToSendRequest { err },
        }
    }

    fn deserialize_response<T>(
        &self,
        raw_body: &Bytes,
        content_type: ContentType,
    ) -> FetchResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        match content_type {
            ContentType::Json => Ok(serde_json::from_slice::<T>(raw_body)
                .map_err(|e| FetchError::DeserializationError(DeserializationError::Json(e)))?),
            ContentType::TextXml | ContentType::ApplicationXml => {
                let body_string = Self::body_as_string(raw_body)?;
                Ok(serde_xml_rs::from_str::<T>(&body_string)
                    .map_err(|e| FetchError::DeserializationError(DeserializationError::Xml(e)))?)
            }
            ContentType::UrlEncoded => {
                Ok(serde_urlencoded::from_bytes::<T>(raw_body).map_err(|e| {
                    FetchError::DeserializationError(DeserializationError::UrlEncoded(e))
                })?)
            }
            ContentType::TextPlain => {
                let body_string = Self::body_as_string(raw_body)?;
                Ok(serde_json::from_value::<T>(serde_json::Value::String(body_string))
                    .map_err(|e| FetchError::DeserializationError(DeserializationError::Json(e)))?)
            }
        }
    }

    fn body_as_string(raw_body: &Bytes) -> FetchResult<String> {
        String::from_utf8(raw_body.to_vec()).map_err(|_| {
            FetchError::DeserializationError(DeserializationError::Unknown(String::from(
                "Response body does not contain valid Utf8",
            )))
        })
    }

    async fn check_response_and_return_err(
        &self,
        response: Response,
        timeout_ms: Option<u64>,
    ) -> FetchResult<Response> {
        if response.status().is_client_error() || response.status().is_server_error() {
            log::warn!("{} responded with {}", response.url(), response.status());
            let url = response.url().clone();
            let err = NetworkError::new(response)
                .await
                .map_err(|err| Self::transport_error(err, &url, timeout_ms))?;
            return Err(FetchError::NetworkError(err));
        }
        Ok(response)
    }

    async fn response_to_fetch_response<T>(
        &self,
        response: Response,
        deserialize_body: bool,
        timeout_ms: Option<u64>,
    ) -> FetchResult<FetchResponse<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .check_response_and_return_err(response, timeout_ms)
            .await?;
        let remote_content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|c_type| c_type.to_str().ok())
            .map(|string| ContentType::from_str(string).ok().unwrap_or_default());

        let headers = response.headers().clone();
        let remote_address = response.remote_addr();
        let status = response.status();
        let url = response.url().clone();

        // the client timeout keeps running while the body streams in
        let raw_body = response
            .bytes()
            .await
            .map_err(|err| Self::transport_error(err, &url, timeout_ms))?;
        let mut body: Option<T> = None;

        // an empty body has nothing to deserialize, e.g. a bare 200
        if deserialize_body && !raw_body.is_empty() {
            let content_type = remote_content_type.unwrap_or_default();
            body = Some(self.deserialize_response::<T>(&raw_body, content_type)?);
        }

        Ok(FetchResponse {
            body,
            raw_body: Some(raw_body),
            status,
            url,
            response_headers: reqwest_headers_to_map(&headers),
            remote_address,
        })
    }

    async fn execute<T, U>(
        &self,
        method: Method,
        endpoint: &str,
        data: Option<U>,
        options: Option<FetchOptions>,
    ) -> FetchResult<FetchResponse<T>>
    where
        T: for<'de> Deserialize<'de>,
        U: Serialize,
    {
        let options = options.unwrap_or_default();
        let url = self.build_url(endpoint, Some(&options))?;
        let timeout_ms = Self::call_timeout_ms(&options).or_else(|| self.timeout_ms());

        log::debug!("{method} {url}");
        let response = self
            .build_request(
                data,
                &options,
                self.client_for(&options).request(method, url.clone()),
            )?
            .send()
            .await
            .map_err(|err| Self::transport_error(err, &url, timeout_ms))?;

        self.response_to_fetch_response(response, options.deserialize_body, timeout_ms)
            .await
    }

    /// Sends an HTTP Post request to the configured remote server
    ///
    /// * `endpoint` - The remote endpoint. This gets joined with the base_url configured in the ::new() method
    /// * `data` - Optional data to send to the remote endpoint (to be serialized as JSON). If `None`, then no data is sent instead of `null`
    /// * `options` - The `FetchOptions` for this call. Allows setting of headers, query params, timeout and credentials
    ///
    /// # Example
    /// ```rust
    /// use httpmock::prelude::*;
    /// use scheduler_client::Fetch;
    ///
    /// #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    /// struct ToReturn {}
    ///
    /// #[derive(serde::Serialize, serde::Deserialize, Debug)]
    /// struct ToSend {
    ///     algorithm: String,
    /// }
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let server = MockServer::start();
    ///
    ///     server.mock(|when, then| {
    ///         when.path("/api/scheduler/init").method(POST);
    ///         then.status(200).json_body(serde_json::json!({}));
    ///     });
    ///
    ///     let fetch = Fetch::new(&server.base_url(), None).unwrap();
    ///
    ///     let response = fetch
    ///         .post::<ToReturn, ToSend>(
    ///             "/api/scheduler/init",
    ///             Some(ToSend {
    ///                 algorithm: "fcfs".to_string(),
    ///             }),
    ///             None,
    ///         )
    ///         .await.unwrap();
    ///     assert_eq!(&200, &response.status);
    ///     assert_eq!(ToReturn {}, response.body.unwrap());
    /// }
    /// ```
    pub async fn post<T, U>(
        &self,
        endpoint: &str,
        data: Option<U>,
        options: Option<FetchOptions>,
    ) -> FetchResult<FetchResponse<T>>
    where
        T: for<'de> Deserialize<'de>,
        U: Serialize,
    {
        self.execute(Method::POST, endpoint, data, options).await
    }

    /// Sends an HTTP GET request to the configured remote server
    ///
    /// * `endpoint` - The remote endpoint. This gets joined with the base_url configured in the ::new() method
    /// * `options` - The `FetchOptions` for this call. Allows setting of headers, query params, timeout and credentials
    ///
    /// # Example
    ///
    /// ```rust
    ///     use scheduler_client::Fetch;
    ///     use httpmock::prelude::*;
    ///
    ///     #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    ///     struct ToReturn {}
    ///
    ///     #[tokio::main]
    ///     async fn main() {
    ///         let server = MockServer::start();
    ///
    ///         server.mock(|when, then|{
    ///             when.path("/api/tasks").query_param("page", "1");
    ///             then.status(200).json_body(serde_json::json!({}));
    ///         });
    ///
    ///         let fetch = Fetch::new(&server.base_url(), None).unwrap();
    ///
    ///         let response = fetch.get::<ToReturn>("/api/tasks", Some(scheduler_client::FetchOptions
    ///         {
    ///             params: Some(scheduler_client::map_string!{page : "1"}),
    ///             ..Default::default()
    ///         })).await.unwrap();
    ///         assert_eq!(&200, &response.status);
    ///         assert_eq!(ToReturn{}, response.body.unwrap());
    ///     }
    /// ```
    pub async fn get<T>(
        &self,
        endpoint: &str,
        options: Option<FetchOptions>,
    ) -> FetchResult<FetchResponse<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.execute::<T, ()>(Method::GET, endpoint, None, options)
            .await
    }

    /// Sends an HTTP DELETE request to the configured remote server
    ///
    /// * `endpoint` - The remote endpoint. This gets joined with the base_url configured in the ::new() method
    /// * `data` - The optional data to send the the remote endpoint
    /// * `options` - The `FetchOptions` for this call
    pub async fn delete<T, U>(
        &self,
        endpoint: &str,
        data: Option<T>,
        options: Option<FetchOptions>,
    ) -> FetchResult<FetchResponse<U>>
    where
        T: Serialize,
        U: for<'de> Deserialize<'de>,
    {
        self.execute(Method::DELETE, endpoint, data, options).await
    }

    /// Sends an HTTP PUT request to the configured remote server
    pub async fn put<T, U>(
        &self,
        endpoint: &str,
        data: Option<T>,
        options: Option<FetchOptions>,
    ) -> FetchResult<FetchResponse<U>>
    where
        T: Serialize,
        U: for<'de> Deserialize<'de>,
    {
        self.execute(Method::PUT, endpoint, data, options).await
    }

    /// Sends an HTTP PATCH request to the configured remote server
    pub async fn patch<T, U>(
        &self,
        endpoint: &str,
        data: Option<T>,
        options: Option<FetchOptions>,
    ) -> FetchResult<FetchResponse<U>>
    where
        T: Serialize,
        U: for<'de> Deserialize<'de>,
    {
        self.execute(Method::PATCH, endpoint, data, options).await
    }
}
