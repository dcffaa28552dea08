use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::str::FromStr;

use crate::{FetchError, FetchHeaders, FetchResult};

/// Builds a `HashMap<String, String>` from `key : value` pairs. Keys that are not
/// identifiers (e.g. `"x-requested-with"`) are written as string literals.
///
/// # Example
/// ```rust
/// use scheduler_client::map_string;
///
/// let params = map_string! { algorithm : "rr", timeSlice : "2" };
/// assert_eq!(Some(&"rr".to_string()), params.get("algorithm"));
/// ```
#[macro_export]
macro_rules! map_string {
    ($($key:literal : $value:expr),* $(,)?) => {{
        let mut map: ::std::collections::HashMap<String, String> = ::std::collections::HashMap::new();
        $(
            map.insert($key.to_string(), $value.to_string());
        )*
        map
    }};
    ($($key:ident : $value:expr),* $(,)?) => {{
        let mut map: ::std::collections::HashMap<String, String> = ::std::collections::HashMap::new();
        $(
            map.insert(stringify!($key).to_string(), $value.to_string());
        )*
        map
    }};
}

pub(crate) fn map_to_reqwest_headers(headers: &FetchHeaders) -> FetchResult<HeaderMap> {
    let mut header_map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = HeaderName::from_str(key)
            .map_err(|_| FetchError::InvalidHeader { name: key.clone() })?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| FetchError::InvalidHeader { name: key.clone() })?;
        header_map.insert(name, value);
    }
    Ok(header_map)
}

/// Values that are not valid utf8 are left out.
pub(crate) fn reqwest_headers_to_map(headers: &HeaderMap) -> FetchHeaders {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.to_string(), value.to_string()))
        })
        .collect()
}
