//! Integration tests for the periodic Ticker

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use festpulse_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use festpulse_runtime::{Store, Ticker};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Tick;

#[derive(Clone)]
struct TickCounter;

impl Reducer for TickCounter {
    type State = u32;
    type Action = Tick;
    type Environment = ();

    fn reduce(&self, state: &mut u32, _action: Tick, _env: &()) -> SmallVec<[Effect<Tick>; 4]> {
        *state += 1;
        smallvec![Effect::None]
    }
}

fn counter() -> Store<u32, Tick, (), TickCounter> {
    Store::new(0, TickCounter, ())
}

#[tokio::test(start_paused = true)]
async fn ticks_once_per_period() {
    let store = counter();
    let ticker = Ticker::spawn(store.clone(), Duration::from_secs(5), || Tick);

    // Nothing before the first full period
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(store.state(|s| *s).await, 0);

    tokio::time::sleep(Duration::from_secs(12)).await;
    assert_eq!(store.state(|s| *s).await, 3);
    assert!(ticker.is_running());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_ticker_cancels_the_schedule() {
    let store = counter();
    let ticker = Ticker::spawn(store.clone(), Duration::from_secs(5), || Tick);

    tokio::time::sleep(Duration::from_secs(11)).await;
    drop(ticker);
    let before = store.state(|s| *s).await;

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(store.state(|s| *s).await, before);
    assert_eq!(before, 2);
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_the_schedule() {
    let store = counter();
    let ticker = Ticker::spawn(store.clone(), Duration::from_secs(1), || Tick);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    ticker.stop();

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(store.state(|s| *s).await, 1);
}

#[tokio::test(start_paused = true)]
async fn schedule_is_cancelled_when_owner_unwinds() {
    let store = counter();

    let owner = {
        let store = store.clone();
        tokio::spawn(async move {
            let _ticker = Ticker::spawn(store, Duration::from_secs(1), || Tick);
            tokio::time::sleep(Duration::from_millis(2500)).await;
            panic!("view torn down mid-session");
        })
    };
    assert!(owner.await.is_err());

    let after_teardown = store.state(|s| *s).await;
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(store.state(|s| *s).await, after_teardown);
    assert_eq!(after_teardown, 2);
}

#[tokio::test(start_paused = true)]
async fn ticker_exits_when_store_shuts_down() {
    let store = counter();
    let ticker = Ticker::spawn(store.clone(), Duration::from_secs(1), || Tick);

    store.shutdown(Duration::from_secs(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1100)).await;
    tokio::task::yield_now().await;

    assert!(!ticker.is_running());
    assert_eq!(store.state(|s| *s).await, 0);
}

#[tokio::test(start_paused = true)]
async fn zero_period_is_clamped() {
    let store = counter();
    let ticker = Ticker::spawn(store.clone(), Duration::ZERO, || Tick);

    assert_eq!(ticker.period(), festpulse_runtime::ticker::MIN_PERIOD);
}
