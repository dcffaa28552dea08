use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{get_json, post_json, ApiResult};
use crate::{app::AppContext, Fetch};

const BASE: &str = "/api/scheduler";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessStatus {
    Ready,
    Running,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessControlBlock {
    pub pid: i32,
    pub arrival_time: i32,
    pub burst_time: i32,
    pub remaining_time: i32,
    pub job_size: i32,
    pub priority: i32,
    pub status: ProcessStatus,
    /// -1 until the process first runs
    pub start_time: i32,
    /// -1 until the process finishes
    pub finish_time: i32,
    pub waiting_time: i32,
    pub turnaround_time: i32,
    pub weighted_turnaround_time: f64,
    pub time_slice_used: i32,
}

impl ProcessControlBlock {
    /// A fresh, ready process with no statistics yet.
    pub fn new(pid: i32, arrival_time: i32, burst_time: i32, job_size: i32, priority: i32) -> Self {
        Self {
            pid,
            arrival_time,
            burst_time,
            remaining_time: burst_time,
            job_size,
            priority,
            status: ProcessStatus::Ready,
            start_time: -1,
            finish_time: -1,
            waiting_time: 0,
            turnaround_time: 0,
            weighted_turnaround_time: 0.0,
            time_slice_used: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Core {
    pub core_id: i32,
    pub running_process: Option<ProcessControlBlock>,
}

impl Core {
    pub fn is_idle(&self) -> bool {
        self.running_process.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub current_time: i32,
    pub ready_queue: Vec<ProcessControlBlock>,
    pub cores: Vec<Core>,
    pub finished_queue: Vec<ProcessControlBlock>,
}

impl SchedulerStatus {
    /// Nothing left to run: the ready queue is empty and every core idle.
    pub fn is_finished(&self) -> bool {
        self.ready_queue.is_empty() && self.cores.iter().all(Core::is_idle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResult {
    pub processes: Vec<ProcessControlBlock>,
    pub avg_waiting_time: f64,
    pub avg_turnaround_time: f64,
    pub avg_weighted_turnaround_time: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Fcfs,
    /// Round robin, uses `SchedulerInit::time_slice`
    Rr,
    Sjf,
    Priority,
    Hrn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerInit {
    pub processes: Vec<ProcessControlBlock>,
    pub algorithm: Algorithm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slice: Option<i32>,
}

impl SchedulerInit {
    pub fn new(processes: Vec<ProcessControlBlock>, algorithm: Algorithm) -> Self {
        Self {
            processes,
            algorithm,
            time_slice: None,
        }
    }

    pub fn round_robin(processes: Vec<ProcessControlBlock>, time_slice: i32) -> Self {
        Self {
            processes,
            algorithm: Algorithm::Rr,
            time_slice: Some(time_slice),
        }
    }
}

/// Client for `/api/scheduler`.
#[derive(Debug, Clone)]
pub struct SchedulerApi {
    fetch: Arc<Fetch>,
}

impl SchedulerApi {
    pub fn new(fetch: Arc<Fetch>) -> Self {
        Self { fetch }
    }

    pub fn from_context(ctx: &AppContext) -> Self {
        Self::new(ctx.http())
    }

    /// Loads the processes and selects the algorithm, returning the initial state.
    pub async fn init(&self, request: &SchedulerInit) -> ApiResult<SchedulerStatus> {
        post_json(&self.fetch, &format!("{BASE}/init"), Some(request)).await
    }

    /// Advances the simulation by one time unit (no-op once everything finished).
    pub async fn step(&self) -> ApiResult<SchedulerStatus> {
        post_json::<_, ()>(&self.fetch, &format!("{BASE}/step"), None).await
    }

    pub async fn run(&self) -> ApiResult<SchedulerStatus> {
        post_json::<_, ()>(&self.fetch, &format!("{BASE}/run"), None).await
    }

    pub async fn status(&self) -> ApiResult<SchedulerStatus> {
        get_json(&self.fetch, &format!("{BASE}/status")).await
    }

    pub async fn performance(&self) -> ApiResult<ScheduleResult> {
        get_json(&self.fetch, &format!("{BASE}/performance")).await
    }

    /// Returns the server's acknowledgement text.
    pub async fn reset(&self) -> ApiResult<String> {
        post_json::<_, ()>(&self.fetch, &format!("{BASE}/reset"), None).await
    }

    /// Runs the server's built-in three process FCFS demo.
    pub async fn demo(&self) -> ApiResult<ScheduleResult> {
        get_json(&self.fetch, &format!("{BASE}/test-demo")).await
    }

    /// Runs the server's built-in round robin demo (time slice 2) to completion.
    pub async fn demo_rr(&self) -> ApiResult<SchedulerStatus> {
        get_json(&self.fetch, &format!("{BASE}/test-rr")).await
    }

    pub async fn demo_sjf(&self) -> ApiResult<SchedulerStatus> {
        get_json(&self.fetch, &format!("{BASE}/test-sjf")).await
    }

    pub async fn demo_priority(&self) -> ApiResult<SchedulerStatus> {
        get_json(&self.fetch, &format!("{BASE}/test-priority")).await
    }

    // the server spells this one in upper case
    pub async fn demo_hrn(&self) -> ApiResult<SchedulerStatus> {
        get_json(&self.fetch, &format!("{BASE}/test-HRN")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_process_is_ready_and_unstarted() {
        let pcb = ProcessControlBlock::new(1, 0, 3, 10, 2);
        assert_eq!(3, pcb.remaining_time);
        assert_eq!(ProcessStatus::Ready, pcb.status);
        assert_eq!(-1, pcb.start_time);
        assert_eq!(-1, pcb.finish_time);
    }

    #[test]
    fn init_request_uses_wire_names() {
        let request = SchedulerInit::round_robin(vec![ProcessControlBlock::new(1, 0, 3, 10, 2)], 2);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!("rr", json["algorithm"]);
        assert_eq!(2, json["timeSlice"]);
        assert_eq!(3, json["processes"][0]["burstTime"]);
        assert_eq!("READY", json["processes"][0]["status"]);

        let fcfs = serde_json::to_value(SchedulerInit::new(vec![], Algorithm::Fcfs)).unwrap();
        assert!(fcfs.get("timeSlice").is_none());
    }

    #[test]
    fn status_is_finished_when_queues_drain() {
        let status: SchedulerStatus = serde_json::from_value(serde_json::json!({
            "currentTime": 6,
            "readyQueue": [],
            "cores": [{ "coreId": 0, "runningProcess": null }],
            "finishedQueue": []
        }))
        .unwrap();
        assert!(status.is_finished());
    }
}
