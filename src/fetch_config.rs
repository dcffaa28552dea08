use crate::{fetch_options::ContentType, FetchHeaders};

#[derive(Default, Debug, Clone)]
pub struct FetchConfig {
    pub timeout_ms: Option<u64>,
    /// Store cookies set by the remote and send them back (overrideable via FetchOptions)
    pub with_credentials: bool,
    pub headers: Option<FetchHeaders>,
    /// What content-type should these requests accept (overrideable via FetchOptions)
    pub accept: ContentType,
    /// What content-type does do these requests send (overrideable via FetchOptions)
    pub content_type: ContentType,
}
