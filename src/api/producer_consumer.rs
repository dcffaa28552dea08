use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{get_json, post_json, ApiResult};
use crate::{app::AppContext, Fetch};

const BASE: &str = "/api/producer-consumer";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerConsumerInit {
    pub buffer_size: i32,
    pub producer_count: i32,
    pub consumer_count: i32,
    /// Milliseconds between simulation ticks
    pub simulation_speed: i32,
    pub production_speed: i32,
    pub consumption_speed: i32,
}

/// One slot of the bounded buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BufferItem {
    pub value: i32,
    pub producer_id: Option<String>,
    pub timestamp: Option<String>,
    pub wait_time: i64,
    #[serde(alias = "isConsumed")]
    pub consumed: bool,
    pub consumer_id: Option<String>,
    pub state: Option<String>,
    pub remaining_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Producer {
    pub id: String,
    pub waiting: bool,
    pub items_produced: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consumer {
    pub id: String,
    pub waiting: bool,
    pub items_consumed: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_produced: i32,
    pub total_consumed: i32,
    pub buffer_full_count: i32,
    pub buffer_empty_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerConsumerStatus {
    pub buffer: Vec<BufferItem>,
    pub head_pointer: i32,
    pub tail_pointer: i32,
    pub item_count: i32,
    pub buffer_size: i32,
    pub producers: Vec<Producer>,
    pub consumers: Vec<Consumer>,
    pub stats: Stats,
    #[serde(default)]
    pub logs: Vec<String>,
}

impl ProducerConsumerStatus {
    pub fn is_full(&self) -> bool {
        self.item_count >= self.buffer_size
    }

    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}

/// Client for `/api/producer-consumer`.
#[derive(Debug, Clone)]
pub struct ProducerConsumerApi {
    fetch: Arc<Fetch>,
}

impl ProducerConsumerApi {
    pub fn new(fetch: Arc<Fetch>) -> Self {
        Self { fetch }
    }

    pub fn from_context(ctx: &AppContext) -> Self {
        Self::new(ctx.http())
    }

    pub async fn init(&self, request: &ProducerConsumerInit) -> ApiResult<ProducerConsumerStatus> {
        post_json(&self.fetch, &format!("{BASE}/init"), Some(request)).await
    }

    pub async fn start(&self) -> ApiResult<ProducerConsumerStatus> {
        post_json::<_, ()>(&self.fetch, &format!("{BASE}/start"), None).await
    }

    pub async fn stop(&self) -> ApiResult<ProducerConsumerStatus> {
        post_json::<_, ()>(&self.fetch, &format!("{BASE}/stop"), None).await
    }

    pub async fn reset(&self) -> ApiResult<String> {
        post_json::<_, ()>(&self.fetch, &format!("{BASE}/reset"), None).await
    }

    pub async fn status(&self) -> ApiResult<ProducerConsumerStatus> {
        get_json(&self.fetch, &format!("{BASE}/status")).await
    }

    pub async fn is_running(&self) -> ApiResult<bool> {
        get_json(&self.fetch, &format!("{BASE}/is-running")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_item_accepts_server_shape() {
        let item: BufferItem = serde_json::from_value(serde_json::json!({
            "value": 7,
            "producerId": "P1",
            "timestamp": "2024-05-01T10:00:00",
            "waitTime": 120,
            "consumed": false,
            "consumerId": null,
            "state": "生产中",
            "remainingTime": 300
        }))
        .unwrap();
        assert_eq!(7, item.value);
        assert_eq!(Some("P1".to_string()), item.producer_id);
        assert!(!item.consumed);

        let empty: BufferItem = serde_json::from_value(serde_json::json!({ "isConsumed": true })).unwrap();
        assert!(empty.consumed);
        assert_eq!(None, empty.state);
    }

    #[test]
    fn fullness() {
        let status = ProducerConsumerStatus {
            buffer: vec![BufferItem::default(); 2],
            head_pointer: 0,
            tail_pointer: 0,
            item_count: 2,
            buffer_size: 2,
            producers: vec![],
            consumers: vec![],
            stats: Stats::default(),
            logs: vec![],
        };
        assert!(status.is_full());
        assert!(!status.is_empty());
    }
}
