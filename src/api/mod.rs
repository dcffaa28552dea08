//! Typed clients for the REST surfaces served at the configured origin.

mod producer_consumer;
mod scheduler;

pub use producer_consumer::{
    BufferItem, Consumer, Producer, ProducerConsumerApi, ProducerConsumerInit,
    ProducerConsumerStatus, Stats,
};
pub use scheduler::{
    Algorithm, Core, ProcessControlBlock, ProcessStatus, ScheduleResult, SchedulerApi,
    SchedulerInit, SchedulerStatus,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Fetch, FetchError, FetchResponse};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("{0} returned no body")]
    EmptyBody(String),
}

fn into_body<T>(endpoint: &str, response: FetchResponse<T>) -> ApiResult<T> {
    response
        .body
        .ok_or_else(|| ApiError::EmptyBody(endpoint.to_string()))
}

async fn get_json<T>(fetch: &Fetch, endpoint: &str) -> ApiResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    into_body(endpoint, fetch.get::<T>(endpoint, None).await?)
}

async fn post_json<T, U>(fetch: &Fetch, endpoint: &str, data: Option<U>) -> ApiResult<T>
where
    T: for<'de> Deserialize<'de>,
    U: Serialize,
{
    into_body(endpoint, fetch.post::<T, U>(endpoint, data, None).await?)
}
