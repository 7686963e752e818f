// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! End-to-end tests of the task orchestrator using stub stages and the built-in adapters.

use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::backends::local::{register_builtins, LocalResources};
use crate::backends::stub::{
    test_registry, CollectingConsumer, FailingConsumer, HeldConsumer, PendingProducer,
    TrailTransform,
};
use crate::config::{parse_yaml, StageMetadata, StageSpec, TaskConfig};
use crate::engine::{Task, TaskState};
use crate::errors::{ConfigError, StageError};
use crate::record::{Payload, Record};
use crate::registry::{Registry, StageKind};
use crate::traits::{Consumer, Producer, Transform};

const DEADLINE: Duration = Duration::from_secs(5);

fn task_config(
    producer: &str,
    transforms: &[&str],
    consumers: &[&str],
    thread_count: i64,
) -> TaskConfig {
    TaskConfig {
        description: "integration".to_string(),
        thread_count,
        producer: StageSpec::new(producer),
        transforms: transforms.iter().map(|t| StageSpec::new(*t)).collect(),
        consumers: consumers.iter().map(|c| StageSpec::new(*c)).collect(),
    }
}

fn values(n: u64) -> Vec<Value> {
    (1..=n).map(|v| json!({ "v": v })).collect()
}

/// Registry whose `pending` producer keeps its channel open until cancelled.
fn pending_registry(endless: bool) -> (Registry, Arc<CollectingConsumer>) {
    let mut registry = Registry::new();
    let sink = Arc::new(CollectingConsumer::new());

    registry.producers.register("pending", move |_spec, ctx| {
        let producer = if endless {
            PendingProducer::endless()
        } else {
            PendingProducer::new()
        };
        producer.watch(ctx.cancel);
        Ok(Arc::new(producer) as Arc<dyn Producer>)
    });
    {
        let sink = sink.clone();
        registry
            .consumers
            .register("collect", move |_spec, _ctx| Ok(sink.clone() as Arc<dyn Consumer>));
    }

    (registry, sink)
}

fn seq_values(records: &[Record]) -> Vec<u64> {
    let mut seqs: Vec<u64> = records
        .iter()
        .filter_map(|r| r.metadata.get("seq").and_then(Value::as_u64))
        .collect();
    seqs.sort_unstable();
    seqs
}

#[tokio::test]
async fn test_end_to_end_sequence_from_payload() {
    let (registry, sink) = test_registry(values(3));
    let task = Task::new(
        task_config("vec", &["seq_from_v"], &["collect"], 2),
        &registry,
        &CancellationToken::new(),
    )
    .unwrap();

    tokio::time::timeout(DEADLINE, task.run()).await.unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 3);
    assert_eq!(seq_values(&records), vec![1, 2, 3]);
    for record in &records {
        match &record.payload {
            Payload::Single(value) => assert_eq!(record.metadata["seq"], value["v"]),
            other => panic!("unexpected payload {:?}", other),
        }
    }
    assert_eq!(task.stats().records, 3);
}

#[tokio::test]
async fn test_transforms_apply_in_configuration_order() {
    let mut registry = Registry::new();
    registry.producers.register("vec", |_spec, _ctx| {
        Ok(Arc::new(crate::backends::stub::VecProducer::new(values(5))) as Arc<dyn Producer>)
    });
    for label in ["a", "b", "c"] {
        registry.transforms.register(label, move |_spec, _ctx| {
            Ok(Arc::new(TrailTransform::new(label)) as Arc<dyn Transform>)
        });
    }
    let sink = Arc::new(CollectingConsumer::new());
    {
        let sink = sink.clone();
        registry
            .consumers
            .register("collect", move |_spec, _ctx| Ok(sink.clone() as Arc<dyn Consumer>));
    }

    let task = Task::new(
        task_config("vec", &["c", "a", "b"], &["collect"], 3),
        &registry,
        &CancellationToken::new(),
    )
    .unwrap();
    task.run().await;

    let records = sink.records();
    assert_eq!(records.len(), 5);
    for record in records {
        assert_eq!(record.metadata["trail"], json!(["c", "a", "b"]));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_run_processes_records_once() {
    let (registry, sink) = test_registry(values(20));
    let task = Arc::new(
        Task::new(
            task_config("vec", &["seq_from_v"], &["collect"], 3),
            &registry,
            &CancellationToken::new(),
        )
        .unwrap(),
    );

    let mut callers = Vec::new();
    for _ in 0..8 {
        let task = task.clone();
        callers.push(tokio::spawn(async move { task.run().await }));
    }
    for caller in callers {
        caller.await.unwrap();
    }
    tokio::time::timeout(DEADLINE, task.terminated().wait())
        .await
        .unwrap();

    assert_eq!(sink.len(), 20);
    assert_eq!(seq_values(&sink.records()), (1..=20).collect::<Vec<_>>());
    assert_eq!(task.stats().worker_exits, 3);
}

#[tokio::test]
async fn test_sequential_run_is_a_no_op() {
    let (registry, sink) = test_registry(values(4));
    let task = Task::new(
        task_config("vec", &[], &["collect"], 1),
        &registry,
        &CancellationToken::new(),
    )
    .unwrap();

    task.run().await;
    task.run().await;
    task.run().await;

    assert_eq!(sink.len(), 4);
    assert_eq!(task.stats().worker_exits, 1);
    assert_eq!(task.state(), TaskState::Terminated);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_stop_returns_one_signal_and_cancels_once() {
    let (registry, _sink) = pending_registry(false);
    let task = Arc::new(
        Task::new(
            task_config("pending", &[], &["collect"], 2),
            &registry,
            &CancellationToken::new(),
        )
        .unwrap(),
    );

    let runner = {
        let task = task.clone();
        tokio::spawn(async move { task.run().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let mut stoppers = Vec::new();
    for _ in 0..16 {
        let task = task.clone();
        stoppers.push(tokio::spawn(async move { task.stop() }));
    }
    let mut signals = Vec::new();
    for stopper in stoppers {
        signals.push(stopper.await.unwrap());
    }

    for signal in &signals {
        assert!(signal.same_signal(&signals[0]));
    }
    tokio::time::timeout(DEADLINE, signals[0].wait())
        .await
        .expect("termination signal should close after stop");
    runner.await.unwrap();

    let stats = task.stats();
    assert_eq!(stats.cancellations, 1);
    assert_eq!(stats.worker_exits, 2);
    assert_eq!(task.state(), TaskState::Terminated);
}

#[tokio::test]
async fn test_all_workers_exit_before_signal_closes() {
    let (registry, _sink) = test_registry(values(50));
    let task = Arc::new(
        Task::new(
            task_config("vec", &[], &["collect"], 6),
            &registry,
            &CancellationToken::new(),
        )
        .unwrap(),
    );

    let watcher = {
        let task = task.clone();
        tokio::spawn(async move {
            task.terminated().wait().await;
            task.stats().worker_exits
        })
    };

    task.run().await;
    assert_eq!(watcher.await.unwrap(), 6);
}

#[tokio::test]
async fn test_signal_waits_for_every_consumer_to_terminate() {
    let (mut registry, sink) = test_registry(values(10));
    let (held, release) = HeldConsumer::new();
    let held = Arc::new(held);
    registry
        .consumers
        .register("held", move |_spec, _ctx| Ok(held.clone() as Arc<dyn Consumer>));

    let task = Arc::new(
        Task::new(
            task_config("vec", &[], &["collect", "held"], 3),
            &registry,
            &CancellationToken::new(),
        )
        .unwrap(),
    );
    let runner = {
        let task = task.clone();
        tokio::spawn(async move { task.run().await })
    };

    tokio::time::timeout(DEADLINE, async {
        while task.stats().worker_exits < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("workers should drain the producer");
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Every worker is gone and the producer is done, but one consumer is not.
    assert_eq!(sink.len(), 10);
    assert!(!task.terminated().is_terminated());
    assert_eq!(task.state(), TaskState::Running);
    assert!(!runner.is_finished());

    release.fire();
    tokio::time::timeout(DEADLINE, task.terminated().wait())
        .await
        .expect("signal should close once the held consumer terminates");
    runner.await.unwrap();
    assert_eq!(task.state(), TaskState::Terminated);
}

#[tokio::test]
async fn test_non_positive_thread_count_runs_one_worker() {
    for thread_count in [0, -1, -100] {
        let (registry, sink) = test_registry(values(3));
        let task = Task::new(
            task_config("vec", &[], &["collect"], thread_count),
            &registry,
            &CancellationToken::new(),
        )
        .unwrap();

        task.run().await;

        assert_eq!(task.stats().worker_exits, 1, "thread_count {}", thread_count);
        assert_eq!(sink.len(), 3);
    }
}

#[tokio::test]
async fn test_stop_with_endless_producer_terminates() {
    let (registry, sink) = pending_registry(true);
    let task = Arc::new(
        Task::new(
            task_config("pending", &[], &["collect"], 4),
            &registry,
            &CancellationToken::new(),
        )
        .unwrap(),
    );

    let runner = {
        let task = task.clone();
        tokio::spawn(async move { task.run().await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;

    let signal = task.stop();
    tokio::time::timeout(DEADLINE, signal.wait())
        .await
        .expect("endless producer should stop on cancellation");
    runner.await.unwrap();

    assert!(sink.len() > 0);
    assert_eq!(task.stats().records, sink.len() as u64);
}

#[tokio::test]
async fn test_stop_after_terminated_is_harmless() {
    let (registry, _sink) = test_registry(values(2));
    let task = Task::new(
        task_config("vec", &[], &["collect"], 1),
        &registry,
        &CancellationToken::new(),
    )
    .unwrap();

    task.run().await;
    let before = task.terminated();
    let after = task.stop();

    assert!(after.is_terminated());
    assert!(after.same_signal(&before));
    // Run already issued the single cancellation while shutting down.
    assert_eq!(task.stats().cancellations, 1);
}

#[tokio::test]
async fn test_failing_and_panicking_transforms_keep_workers_alive() {
    let (registry, sink) = test_registry(values(10));
    let task = Task::new(
        task_config(
            "vec",
            &["panicking", "failing", "seq_from_v"],
            &["collect"],
            2,
        ),
        &registry,
        &CancellationToken::new(),
    )
    .unwrap();

    tokio::time::timeout(DEADLINE, task.run()).await.unwrap();

    let stats = task.stats();
    assert_eq!(stats.records, 10);
    assert_eq!(stats.transform_failures, 20);
    // Later transforms still ran on every record.
    assert_eq!(seq_values(&sink.records()), (1..=10).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_failing_consumer_does_not_block_other_consumers() {
    let (mut registry, sink) = test_registry(values(4));
    registry.consumers.register("fails", |_spec, _ctx| {
        Ok(Arc::new(FailingConsumer::new(false)) as Arc<dyn Consumer>)
    });
    registry.consumers.register("panics", |_spec, _ctx| {
        Ok(Arc::new(FailingConsumer::new(true)) as Arc<dyn Consumer>)
    });

    let task = Task::new(
        task_config("vec", &[], &["fails", "panics", "collect"], 2),
        &registry,
        &CancellationToken::new(),
    )
    .unwrap();
    tokio::time::timeout(DEADLINE, task.run()).await.unwrap();

    assert_eq!(sink.len(), 4);
    assert_eq!(task.stats().consumer_failures, 8);
}

#[tokio::test]
async fn test_every_consumer_receives_every_record() {
    let mut registry = Registry::new();
    registry.producers.register("vec", |_spec, _ctx| {
        Ok(Arc::new(crate::backends::stub::VecProducer::new(values(6))) as Arc<dyn Producer>)
    });
    let first = Arc::new(CollectingConsumer::new());
    let second = Arc::new(CollectingConsumer::slow(Duration::from_millis(1)));
    for (name, sink) in [("first", first.clone()), ("second", second.clone())] {
        registry
            .consumers
            .register(name, move |_spec, _ctx| Ok(sink.clone() as Arc<dyn Consumer>));
    }

    let task = Task::new(
        task_config("vec", &[], &["first", "second"], 3),
        &registry,
        &CancellationToken::new(),
    )
    .unwrap();
    task.run().await;

    assert_eq!(first.len(), 6);
    assert_eq!(second.len(), 6);
    assert_eq!(task.consumer_count(), 2);
}

#[tokio::test]
async fn test_records_are_not_duplicated_across_workers() {
    let (registry, sink) = test_registry(values(200));
    let task = Task::new(
        task_config("vec", &["seq_from_v"], &["collect"], 8),
        &registry,
        &CancellationToken::new(),
    )
    .unwrap();

    task.run().await;

    let seqs = seq_values(&sink.records());
    let unique: HashSet<u64> = seqs.iter().copied().collect();
    assert_eq!(seqs.len(), 200);
    assert_eq!(unique.len(), 200);
}

#[tokio::test]
async fn test_builtin_pipeline_from_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.jsonl");
    let yaml = format!(
        r#"
- description: builtins
  thread_count: 2
  producer:
    type: static
    metadata:
      raw: true
      records: ['{{"v": 1}}', '{{"v": 2}}', '{{"v": 3}}']
  transforms:
    - type: json
    - type: copy_field
      metadata:
        field: v
        key: original
    - type: sequence_id
      metadata:
        key: seq
    - type: set_metadata
      metadata:
        values:
          source: test
  consumers:
    - type: jsonl
      metadata:
        path: {}
    - type: discard
"#,
        out.display()
    );

    let configs = parse_yaml(&yaml).unwrap();
    let mut registry = Registry::new();
    register_builtins(&mut registry, &LocalResources::new());

    let task = Task::new(
        configs.into_iter().next().unwrap(),
        &registry,
        &CancellationToken::new(),
    )
    .unwrap();
    tokio::time::timeout(DEADLINE, task.run()).await.unwrap();

    let written = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<Value> = written
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);

    let mut seqs: Vec<u64> = lines
        .iter()
        .map(|line| line["metadata"]["seq"].as_u64().unwrap())
        .collect();
    seqs.sort_unstable();
    assert_eq!(seqs, vec![1, 2, 3]);
    for line in &lines {
        assert_eq!(line["metadata"]["original"], line["payload"]["v"]);
        assert_eq!(line["metadata"]["source"], json!("test"));
    }
}

#[tokio::test]
async fn test_oversized_buffer_fails_construction() {
    let mut registry = Registry::new();
    register_builtins(&mut registry, &LocalResources::new());

    let mut config = task_config("static", &[], &["discard"], 1);
    config.producer = StageSpec::with_metadata(
        "static",
        StageMetadata::from_iter([
            ("records".to_string(), json!([1])),
            ("buffer".to_string(), json!(u64::MAX)),
        ]),
    );

    match Task::new(config, &registry, &CancellationToken::new()) {
        Err(ConfigError::StageConstruction {
            kind: StageKind::Producer,
            source: StageError::InvalidMetadata { key, .. },
            ..
        }) => assert_eq!(key, "buffer"),
        other => panic!("expected StageConstruction, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_shared_sequence_spans_tasks() {
    let resources = LocalResources::new();
    resources.init_sequence(100, 1);
    let mut registry = Registry::new();
    register_builtins(&mut registry, &resources);

    let sink = Arc::new(CollectingConsumer::new());
    {
        let sink = sink.clone();
        registry
            .consumers
            .register("collect", move |_spec, _ctx| Ok(sink.clone() as Arc<dyn Consumer>));
    }

    let shared = StageSpec::with_metadata(
        "sequence_id",
        StageMetadata::from_iter([("shared".to_string(), json!(true))]),
    );
    let mut tasks = Vec::new();
    for _ in 0..2 {
        let mut config = task_config("static", &[], &["collect"], 1);
        config.producer = StageSpec::with_metadata(
            "static",
            StageMetadata::from_iter([("records".to_string(), json!(["a", "b"]))]),
        );
        config.transforms = vec![shared.clone()];
        tasks.push(Task::new(config, &registry, &CancellationToken::new()).unwrap());
    }
    for task in &tasks {
        tokio::time::timeout(DEADLINE, task.run()).await.unwrap();
    }

    let mut ids: Vec<u64> = sink
        .records()
        .iter()
        .map(|r| r.metadata["id"].as_u64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![100, 101, 102, 103]);
}
