//! Integration tests for the Store runtime
//!
//! Uses a single-gate head counter so the assertions read like the
//! festival domain without depending on it.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use festpulse_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use festpulse_runtime::{Store, StoreError};
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum GateAction {
    Enter,
    Leave,
    /// Re-admit after a delay (exercises `Effect::Delay`)
    EnterLater { after_ms: u64 },
    /// Resolve asynchronously (exercises `Effect::Future`)
    LookupThenEnter,
    /// Fan out two entries concurrently
    EnterTwice,
}

#[derive(Debug, Clone, Default)]
struct GateState {
    inside: u32,
    capacity: u32,
}

#[derive(Clone)]
struct GateReducer;

impl Reducer for GateReducer {
    type State = GateState;
    type Action = GateAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut GateState,
        action: GateAction,
        _env: &(),
    ) -> SmallVec<[Effect<GateAction>; 4]> {
        match action {
            GateAction::Enter => {
                if state.inside < state.capacity {
                    state.inside += 1;
                }
                smallvec![Effect::None]
            },
            GateAction::Leave => {
                state.inside = state.inside.saturating_sub(1);
                smallvec![Effect::None]
            },
            GateAction::EnterLater { after_ms } => smallvec![Effect::Delay {
                duration: Duration::from_millis(after_ms),
                action: Box::new(GateAction::Enter),
            }],
            GateAction::LookupThenEnter => smallvec![Effect::Future(Box::pin(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Some(GateAction::Enter)
            }))],
            GateAction::EnterTwice => smallvec![Effect::merge(vec![
                Effect::Future(Box::pin(async { Some(GateAction::Enter) })),
                Effect::Future(Box::pin(async { Some(GateAction::Enter) })),
            ])],
        }
    }
}

fn gate(capacity: u32) -> Store<GateState, GateAction, (), GateReducer> {
    Store::new(
        GateState {
            inside: 0,
            capacity,
        },
        GateReducer,
        (),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn send_applies_reducer() {
    let store = gate(10);

    store.send(GateAction::Enter).await.unwrap();
    store.send(GateAction::Enter).await.unwrap();
    store.send(GateAction::Leave).await.unwrap();

    assert_eq!(store.state(|s| s.inside).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sends_never_lose_updates() {
    let store = gate(10_000);

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..10 {
                    store.send(GateAction::Enter).await.unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.state(|s| s.inside).await, 1000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sends_respect_capacity() {
    let store = gate(50);

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..10 {
                    store.send(GateAction::Enter).await.unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.state(|s| s.inside).await, 50);
}

#[tokio::test(start_paused = true)]
async fn delay_effect_feeds_action_back() {
    let store = gate(10);

    store.send(GateAction::EnterLater { after_ms: 500 }).await.unwrap();
    assert_eq!(store.state(|s| s.inside).await, 0);
    assert_eq!(store.pending_effects(), 1);

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(store.state(|s| s.inside).await, 1);
    assert_eq!(store.pending_effects(), 0);
}

#[tokio::test(start_paused = true)]
async fn future_effect_feeds_action_back() {
    let store = gate(10);

    store.send(GateAction::LookupThenEnter).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(store.state(|s| s.inside).await, 1);
}

#[tokio::test(start_paused = true)]
async fn parallel_effects_all_run() {
    let store = gate(10);

    store.send(GateAction::EnterTwice).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(store.state(|s| s.inside).await, 2);
}

#[tokio::test]
async fn subscribers_observe_processed_actions() {
    let store = gate(10);
    let mut actions = store.subscribe_actions();

    store.send(GateAction::Enter).await.unwrap();

    let observed = actions.recv().await.unwrap();
    assert_eq!(observed, GateAction::Enter);
    assert_eq!(store.state(|s| s.inside).await, 1);
}

#[tokio::test]
async fn shutdown_rejects_new_actions() {
    let store = gate(10);

    store.shutdown(Duration::from_secs(1)).await.unwrap();

    assert!(store.is_shutting_down());
    let result = store.send(GateAction::Enter).await;
    assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
    assert_eq!(store.state(|s| s.inside).await, 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_times_out_on_long_running_effects() {
    let store = gate(10);

    store
        .send(GateAction::EnterLater { after_ms: 60_000 })
        .await
        .unwrap();

    let result = store.shutdown(Duration::from_millis(200)).await;
    assert!(matches!(result, Err(StoreError::ShutdownTimeout(1))));
}

#[tokio::test(start_paused = true)]
async fn shutdown_waits_for_pending_effects() {
    let store = gate(10);

    store.send(GateAction::EnterLater { after_ms: 100 }).await.unwrap();
    store.shutdown(Duration::from_secs(1)).await.unwrap();

    // The delayed action arrives after shutdown began and is dropped
    assert_eq!(store.state(|s| s.inside).await, 0);
    assert_eq!(store.pending_effects(), 0);
}
