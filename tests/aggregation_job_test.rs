mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use advisor_backend::services::aggregation_service::{CycleOutcome, FeedbackAggregator};
use common::{Behaviour, InMemoryStore};

const INTERVAL: Duration = Duration::from_secs(60);
const STORE_TIMEOUT: Duration = Duration::from_secs(5);

fn job(store: &Arc<InMemoryStore>) -> FeedbackAggregator {
    FeedbackAggregator::new(Some(store.clone()), INTERVAL, STORE_TIMEOUT)
}

#[tokio::test]
async fn window_is_the_last_day_with_exclusive_end() {
    let store = Arc::new(InMemoryStore::new());
    let now = Utc::now();
    let day = chrono::Duration::days(1);

    for _ in 0..7 {
        store.seed(true, now - chrono::Duration::hours(2));
    }
    for _ in 0..3 {
        store.seed(false, now - chrono::Duration::hours(20));
    }
    // Outside the window on both sides.
    store.seed(true, now - day - chrono::Duration::seconds(1));
    store.seed(false, now);
    // Start is inclusive.
    store.seed(false, now - day);

    let summary = job(&store).run_once_at(now).await.unwrap().unwrap();
    assert_eq!(summary.total_feedback, 11);
    assert_eq!(summary.helpful_count, 7);
    assert_eq!(summary.unhelpful_count, 4);
    assert_eq!(summary.period_start, now - day);
    assert_eq!(summary.period_end, now);
    assert_eq!(store.summaries().len(), 1);
}

#[tokio::test]
async fn seven_helpful_three_unhelpful() {
    let store = Arc::new(InMemoryStore::new());
    let now = Utc::now();
    for i in 0..10 {
        store.seed(i < 7, now - chrono::Duration::minutes(i + 1));
    }

    let summary = job(&store).run_once_at(now).await.unwrap().unwrap();
    assert_eq!(summary.total_feedback, 10);
    assert_eq!(summary.helpful_count, 7);
    assert_eq!(summary.unhelpful_count, 3);
    assert!((summary.helpfulness_rate - 0.7).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn loop_runs_one_cycle_per_interval() {
    let store = Arc::new(InMemoryStore::new());
    let handle = tokio::spawn(job(&store).run());

    tokio::time::sleep(INTERVAL * 2 + Duration::from_secs(30)).await;
    handle.abort();

    assert_eq!(store.count_calls(), 3);
    assert_eq!(store.summaries().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn failing_store_does_not_stop_the_loop() {
    let store = Arc::new(InMemoryStore::with_behaviour(Behaviour::Failing));
    let handle = tokio::spawn(job(&store).run());

    tokio::time::sleep(INTERVAL * 2 + Duration::from_secs(30)).await;
    assert!(!handle.is_finished());
    handle.abort();

    assert_eq!(store.count_calls(), 3);
    assert!(store.summaries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn hanging_store_times_out_and_the_loop_continues() {
    let store = Arc::new(InMemoryStore::with_behaviour(Behaviour::Hanging));

    let outcome = job(&store).run_cycle().await;
    assert!(matches!(outcome, CycleOutcome::Failed(msg) if msg.contains("did not respond")));

    let handle = tokio::spawn(job(&store).run());
    // Cycles start at 0s, 65s and 130s: each waits out the timeout before sleeping.
    tokio::time::sleep(Duration::from_secs(150)).await;
    handle.abort();

    assert_eq!(store.count_calls(), 1 + 3);
    assert!(store.summaries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unconfigured_store_keeps_ticking() {
    let job = FeedbackAggregator::new(None, INTERVAL, STORE_TIMEOUT);
    assert_eq!(job.run_cycle().await, CycleOutcome::Skipped);

    let handle = tokio::spawn(job.run());
    tokio::time::sleep(INTERVAL * 3).await;
    assert!(!handle.is_finished());
    handle.abort();
}
