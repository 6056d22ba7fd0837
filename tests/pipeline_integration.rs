//! End-to-end behaviour of the ingestion pipeline.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pool_watcher::alerting::{AlertKind, DispatchOutcome, SuppressReason};
use pool_watcher::config::{ConfigOverrides, WatcherConfig};
use pool_watcher::ingest::StopReason;
use pool_watcher::lifecycle::{startup, Shutdown};
use pool_watcher::source::{ChannelSource, FileTail, LineSource};

mod common;

use common::{access_line, pipeline_with, shared_settings, RecordingNotifier};

#[tokio::test]
async fn test_error_rate_scenarios() {
    // 2 errors in 60 requests is 3.33%; the second error arrives last so
    // the rate stays at or under 2% until the 60th line
    let notifier = Arc::new(RecordingNotifier::default());
    let mut pipeline = pipeline_with(notifier.clone(), 200, shared_settings(2.0, 300, false));
    let now = Instant::now();
    for i in 0..60 {
        let status = if i == 10 || i == 59 { "503" } else { "200" };
        let outcomes = pipeline.process_line(&access_line("blue", status), now).await;
        assert_eq!(outcomes.is_empty(), i < 59, "unexpected alert state at line {}", i + 1);
    }
    assert_eq!(notifier.messages(), vec!["High Error Rate: 3.3% (2/60)".to_string()]);

    // 1 error in 60 requests is 1.67%
    let notifier = Arc::new(RecordingNotifier::default());
    let mut pipeline = pipeline_with(notifier.clone(), 200, shared_settings(2.0, 300, false));
    for i in 0..60 {
        let status = if i == 10 { "500" } else { "200" };
        pipeline.process_line(&access_line("blue", status), now).await;
    }
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_no_error_rate_alert_before_fifty_samples() {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut pipeline = pipeline_with(notifier.clone(), 200, shared_settings(2.0, 300, false));
    let now = Instant::now();

    for _ in 0..49 {
        pipeline.process_line(&access_line("blue", "502"), now).await;
    }
    assert!(notifier.messages().is_empty());

    pipeline.process_line(&access_line("blue", "502"), now).await;
    assert_eq!(notifier.messages(), vec!["High Error Rate: 100.0% (50/50)".to_string()]);
}

#[tokio::test]
async fn test_single_failover_on_fourth_event() {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut pipeline = pipeline_with(notifier.clone(), 200, shared_settings(2.0, 300, false));
    let now = Instant::now();

    let mut fired_at = Vec::new();
    for (i, pool) in ["A", "A", "A", "B"].iter().enumerate() {
        let outcomes = pipeline.process_line(&access_line(pool, "200"), now).await;
        if !outcomes.is_empty() {
            fired_at.push(i + 1);
        }
    }

    assert_eq!(fired_at, vec![4]);
    assert_eq!(notifier.messages(), vec!["Failover: A → B (window: 4 requests)".to_string()]);
}

#[tokio::test]
async fn test_failover_cooldown_scenarios() {
    let t0 = Instant::now();

    // 10s apart: second transition suppressed
    let notifier = Arc::new(RecordingNotifier::default());
    let mut pipeline = pipeline_with(notifier.clone(), 200, shared_settings(2.0, 300, false));
    pipeline.process_line(&access_line("A", "200"), t0).await;
    pipeline.process_line(&access_line("B", "200"), t0).await;
    let outcomes = pipeline
        .process_line(&access_line("A", "200"), t0 + Duration::from_secs(10))
        .await;
    assert!(matches!(
        outcomes.as_slice(),
        [(_, DispatchOutcome::Suppressed(SuppressReason::Cooldown { .. }))]
    ));
    assert_eq!(notifier.messages().len(), 1);
    // state still follows the transition even though the alert was muted
    assert_eq!(pipeline.monitor().last_pool(), Some("A"));

    // 400s apart: both fire
    let notifier = Arc::new(RecordingNotifier::default());
    let mut pipeline = pipeline_with(notifier.clone(), 200, shared_settings(2.0, 300, false));
    pipeline.process_line(&access_line("A", "200"), t0).await;
    pipeline.process_line(&access_line("B", "200"), t0).await;
    pipeline
        .process_line(&access_line("A", "200"), t0 + Duration::from_secs(400))
        .await;
    assert_eq!(
        notifier.messages(),
        vec![
            "Failover: A → B (window: 2 requests)".to_string(),
            "Failover: B → A (window: 3 requests)".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_persistent_errors_alert_once_per_cooldown() {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut pipeline = pipeline_with(notifier.clone(), 200, shared_settings(2.0, 300, false));
    let t0 = Instant::now();

    for i in 0..500u64 {
        pipeline
            .process_line(&access_line("blue", "500"), t0 + Duration::from_secs(i))
            .await;
    }

    // fires at t=49s, then again once 300s have passed (t=349s)
    assert_eq!(notifier.messages().len(), 2);
    let last = pipeline.dispatcher().cooldown().last_fired(AlertKind::ErrorRate).unwrap();
    assert_eq!(last, t0 + Duration::from_secs(349));
}

#[tokio::test]
async fn test_maintenance_mode_only_mutes_failover() {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut pipeline = pipeline_with(notifier.clone(), 200, shared_settings(2.0, 300, true));
    let now = Instant::now();

    for i in 0..60 {
        let pool = if i % 2 == 0 { "blue" } else { "green" };
        pipeline.process_line(&access_line(pool, "502"), now).await;
    }

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("High Error Rate"));
}

#[tokio::test]
async fn test_run_consumes_channel_until_exhausted() {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut pipeline = pipeline_with(notifier.clone(), 200, shared_settings(2.0, 300, false));
    let (tx, mut source) = ChannelSource::pair(16);
    let shutdown = Shutdown::new();

    tokio::spawn(async move {
        for pool in ["blue", "blue", "garbage", "green"] {
            let line = if pool == "garbage" {
                "2026/10/16 10:00:00 [error] upstream timed out".to_string()
            } else {
                access_line(pool, "200")
            };
            tx.send(line).await.unwrap();
        }
    });

    let reason = pipeline.run(&mut source, shutdown.subscribe()).await;
    assert_eq!(reason, StopReason::SourceExhausted);
    assert_eq!(pipeline.stats().lines, 4);
    assert_eq!(pipeline.stats().events, 3);
    assert_eq!(
        notifier.messages(),
        vec!["Failover: blue → green (window: 3 requests)".to_string()]
    );
}

#[tokio::test]
async fn test_run_stops_on_shutdown() {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut pipeline = pipeline_with(notifier, 200, shared_settings(2.0, 300, false));
    let (_tx, mut source) = ChannelSource::pair(1);
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.trigger();
    });

    let reason = tokio::time::timeout(Duration::from_secs(5), pipeline.run(&mut source, rx))
        .await
        .expect("pipeline should stop on shutdown");
    assert_eq!(reason, StopReason::Shutdown);
}

#[tokio::test]
async fn test_file_follower_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("access.log");
    // history must not be replayed
    let mut history = String::new();
    for _ in 0..100 {
        history.push_str(&access_line("blue", "500"));
        history.push('\n');
    }
    std::fs::write(&path, history).unwrap();

    let mut source = FileTail::new(&path, Duration::from_millis(10), Duration::from_millis(10));
    source.start().await.unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let mut pipeline = pipeline_with(notifier.clone(), 200, shared_settings(2.0, 300, false));
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        let reason = pipeline.run(&mut source, rx).await;
        (reason, pipeline.stats())
    });

    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "{}", access_line("blue", "200")).unwrap();
    writeln!(file, "{}", access_line("green", "200")).unwrap();
    file.flush().unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while notifier.messages().is_empty() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    shutdown.trigger();

    let (reason, stats) = handle.await.unwrap();
    assert_eq!(reason, StopReason::Shutdown);
    assert_eq!(stats.events, 2);
    assert_eq!(
        notifier.messages(),
        vec!["Failover: blue → green (window: 2 requests)".to_string()]
    );
}

#[tokio::test]
async fn test_startup_run_with_stdout_fallback() {
    let (tx, source) = ChannelSource::pair(8);
    let shutdown = Shutdown::new();

    tx.send(access_line("blue", "200")).await.unwrap();
    tx.send(access_line("green", "200")).await.unwrap();
    drop(tx);

    let reason = startup::run(
        WatcherConfig::default(),
        None,
        ConfigOverrides::default(),
        Box::new(source),
        shutdown.clone(),
    )
    .await
    .unwrap();
    assert_eq!(reason, StopReason::SourceExhausted);
    assert!(shutdown.is_triggered());
}

#[tokio::test]
async fn test_startup_run_honors_shutdown_triggered_before_start() {
    // sender stays alive so the source alone would never end the run
    let (_tx, source) = ChannelSource::pair(8);
    let shutdown = Shutdown::new();
    shutdown.trigger();

    let run = startup::run(
        WatcherConfig::default(),
        None,
        ConfigOverrides::default(),
        Box::new(source),
        shutdown,
    );
    let reason = tokio::time::timeout(Duration::from_secs(2), run)
        .await
        .expect("run should return when shutdown was already requested")
        .unwrap();
    assert_eq!(reason, StopReason::Shutdown);
}
