use std::sync::Arc;

use httpmock::prelude::*;
use scheduler_client::{
    api::{
        Algorithm, ApiError, ProcessControlBlock, ProcessStatus, ProducerConsumerApi,
        ProducerConsumerInit, SchedulerApi, SchedulerInit,
    },
    AppConfig, Fetch, FetchError,
};
use serde_json::json;

fn fetch_for(server: &MockServer) -> anyhow::Result<Arc<Fetch>> {
    let config = AppConfig {
        base_url: server.base_url(),
        ..Default::default()
    };
    Ok(Arc::new(Fetch::from_app_config(&config)?))
}

fn pcb_json(pid: i32, status: &str, finish_time: i32) -> serde_json::Value {
    let remaining_time = if status == "FINISHED" { 0 } else { 3 };
    let start_time = if status == "READY" { -1 } else { 0 };
    let turnaround_time = finish_time.max(0);
    json!({
        "pid": pid,
        "arrivalTime": 0,
        "burstTime": 3,
        "remainingTime": remaining_time,
        "jobSize": 10,
        "priority": 2,
        "status": status,
        "startTime": start_time,
        "finishTime": finish_time,
        "waitingTime": 0,
        "turnaroundTime": turnaround_time,
        "weightedTurnaroundTime": 1.0,
        "timeSliceUsed": 0
    })
}

#[tokio::test]
async fn scheduler_init_posts_processes_and_algorithm() -> anyhow::Result<()> {
    let server = MockServer::start();
    let api = SchedulerApi::new(fetch_for(&server)?);

    let init = server.mock(|when, then| {
        when.path("/api/scheduler/init")
            .method(POST)
            .json_body_partial(r#"{ "algorithm": "rr", "timeSlice": 2 }"#);
        then.status(200).json_body(json!({
            "currentTime": 0,
            "readyQueue": [pcb_json(1, "READY", -1)],
            "cores": [{ "coreId": 0, "runningProcess": null }],
            "finishedQueue": []
        }));
    });

    let status = api
        .init(&SchedulerInit::round_robin(
            vec![ProcessControlBlock::new(1, 0, 3, 10, 2)],
            2,
        ))
        .await?;

    init.assert_async().await;
    assert_eq!(0, status.current_time);
    assert_eq!(1, status.ready_queue.len());
    assert_eq!(ProcessStatus::Ready, status.ready_queue[0].status);
    assert!(status.cores[0].is_idle());
    assert!(!status.is_finished());
    Ok(())
}

#[tokio::test]
async fn scheduler_step_run_and_status() -> anyhow::Result<()> {
    let server = MockServer::start();
    let api = SchedulerApi::new(fetch_for(&server)?);

    let running = json!({
        "currentTime": 1,
        "readyQueue": [],
        "cores": [{ "coreId": 0, "runningProcess": pcb_json(1, "RUNNING", -1) }],
        "finishedQueue": []
    });
    let finished = json!({
        "currentTime": 3,
        "readyQueue": [],
        "cores": [{ "coreId": 0, "runningProcess": null }],
        "finishedQueue": [pcb_json(1, "FINISHED", 3)]
    });

    let step = server.mock(|when, then| {
        when.path("/api/scheduler/step").method(POST);
        then.status(200).json_body(running.clone());
    });
    let run = server.mock(|when, then| {
        when.path("/api/scheduler/run").method(POST);
        then.status(200).json_body(finished.clone());
    });
    let status = server.mock(|when, then| {
        when.path("/api/scheduler/status").method(GET);
        then.status(200).json_body(finished.clone());
    });

    let after_step = api.step().await?;
    assert_eq!(
        Some(ProcessStatus::Running),
        after_step.cores[0].running_process.as_ref().map(|p| p.status)
    );

    let after_run = api.run().await?;
    assert!(after_run.is_finished());
    assert_eq!(3, after_run.finished_queue[0].finish_time);

    assert_eq!(after_run, api.status().await?);

    step.assert_async().await;
    run.assert_async().await;
    status.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn scheduler_performance_demo_and_reset() -> anyhow::Result<()> {
    let server = MockServer::start();
    let api = SchedulerApi::new(fetch_for(&server)?);

    let result = json!({
        "processes": [pcb_json(1, "FINISHED", 3)],
        "avgWaitingTime": 1.5,
        "avgTurnaroundTime": 3.0,
        "avgWeightedTurnaroundTime": 1.25
    });
    server.mock(|when, then| {
        when.path("/api/scheduler/performance").method(GET);
        then.status(200).json_body(result.clone());
    });
    server.mock(|when, then| {
        when.path("/api/scheduler/test-demo").method(GET);
        then.status(200).json_body(result.clone());
    });
    server.mock(|when, then| {
        when.path("/api/scheduler/reset").method(POST);
        then.status(200)
            .header("content-type", "text/plain;charset=UTF-8")
            .body("已重置");
    });

    let performance = api.performance().await?;
    assert_eq!(1.5, performance.avg_waiting_time);
    assert_eq!(1.25, performance.avg_weighted_turnaround_time);
    assert_eq!(performance, api.demo().await?);
    assert_eq!("已重置", api.reset().await?);
    Ok(())
}

#[tokio::test]
async fn scheduler_algorithm_demos() -> anyhow::Result<()> {
    let server = MockServer::start();
    let api = SchedulerApi::new(fetch_for(&server)?);

    let mut demos = Vec::new();
    for (path, time) in [("test-rr", 6), ("test-sjf", 15), ("test-priority", 15), ("test-HRN", 15)] {
        let body = json!({
            "currentTime": time,
            "readyQueue": [],
            "cores": [{ "coreId": 0, "runningProcess": null }],
            "finishedQueue": [pcb_json(1, "FINISHED", 3)]
        });
        demos.push(server.mock(|when, then| {
            when.path(format!("/api/scheduler/{path}")).method(GET);
            then.status(200).json_body(body);
        }));
    }

    assert_eq!(6, api.demo_rr().await?.current_time);
    assert_eq!(15, api.demo_sjf().await?.current_time);
    assert!(api.demo_priority().await?.is_finished());
    assert_eq!(1, api.demo_hrn().await?.finished_queue.len());

    for demo in demos {
        demo.assert_async().await;
    }
    Ok(())
}

#[tokio::test]
async fn scheduler_errors_surface_as_fetch_errors() -> anyhow::Result<()> {
    let server = MockServer::start();
    let api = SchedulerApi::new(fetch_for(&server)?);

    server.mock(|when, then| {
        when.path("/api/scheduler/status");
        then.status(503);
    });
    server.mock(|when, then| {
        when.path("/api/scheduler/performance");
        then.status(200);
    });

    assert!(matches!(
        api.status().await,
        Err(ApiError::Fetch(FetchError::NetworkError(_)))
    ));
    assert!(matches!(api.performance().await, Err(ApiError::EmptyBody(_))));
    Ok(())
}

#[test]
fn unknown_algorithm_name_is_rejected() {
    assert!(serde_json::from_str::<Algorithm>("\"lottery\"").is_err());
    assert_eq!(
        Algorithm::Hrn,
        serde_json::from_str::<Algorithm>("\"hrn\"").unwrap()
    );
}

#[tokio::test]
async fn producer_consumer_lifecycle() -> anyhow::Result<()> {
    let server = MockServer::start();
    let api = ProducerConsumerApi::new(fetch_for(&server)?);

    let status = |running: bool| {
        let items_produced = if running { 1 } else { 0 };
        json!({
            "buffer": [
                { "value": 4, "producerId": "P1", "timestamp": "2024-05-01T10:00:00",
                  "waitTime": 0, "consumed": false, "consumerId": null,
                  "state": "生产中", "remainingTime": 200 },
                { "value": 0, "producerId": null, "timestamp": null,
                  "waitTime": 0, "consumed": false, "consumerId": null,
                  "state": "空", "remainingTime": 0 }
            ],
            "headPointer": 0,
            "tailPointer": 1,
            "itemCount": 1,
            "bufferSize": 2,
            "producers": [{ "id": "P1", "waiting": false, "itemsProduced": items_produced }],
            "consumers": [{ "id": "C1", "waiting": running, "itemsConsumed": 0 }],
            "stats": { "totalProduced": 1, "totalConsumed": 0, "bufferFullCount": 0, "bufferEmptyCount": 2 },
            "logs": ["[10:00:00] P1 produced 4"]
        })
    };

    let init = server.mock(|when, then| {
        when.path("/api/producer-consumer/init")
            .method(POST)
            .json_body(json!({
                "bufferSize": 2,
                "producerCount": 1,
                "consumerCount": 1,
                "simulationSpeed": 500,
                "productionSpeed": 1000,
                "consumptionSpeed": 1500
            }));
        then.status(200).json_body(status(false));
    });
    server.mock(|when, then| {
        when.path("/api/producer-consumer/start").method(POST);
        then.status(200).json_body(status(true));
    });
    server.mock(|when, then| {
        when.path("/api/producer-consumer/is-running").method(GET);
        then.status(200).json_body(json!(true));
    });
    server.mock(|when, then| {
        when.path("/api/producer-consumer/stop").method(POST);
        then.status(200).json_body(status(false));
    });
    server.mock(|when, then| {
        when.path("/api/producer-consumer/status").method(GET);
        then.status(200).json_body(status(false));
    });
    server.mock(|when, then| {
        when.path("/api/producer-consumer/reset").method(POST);
        then.status(200)
            .header("content-type", "text/plain;charset=UTF-8")
            .body("已重置");
    });

    let initial = api
        .init(&ProducerConsumerInit {
            buffer_size: 2,
            producer_count: 1,
            consumer_count: 1,
            simulation_speed: 500,
            production_speed: 1000,
            consumption_speed: 1500,
        })
        .await?;
    init.assert_async().await;
    assert_eq!(2, initial.buffer_size);
    assert_eq!(Some("生产中".to_string()), initial.buffer[0].state);
    assert!(!initial.is_full());

    let started = api.start().await?;
    assert_eq!(1, started.producers[0].items_produced);
    assert!(started.consumers[0].waiting);
    assert!(api.is_running().await?);

    let stopped = api.stop().await?;
    assert_eq!(1, stopped.stats.total_produced);
    assert_eq!(stopped, api.status().await?);
    assert_eq!(1, stopped.logs.len());

    assert_eq!("已重置", api.reset().await?);
    Ok(())
}
