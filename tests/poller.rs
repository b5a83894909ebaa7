use compass_dash::poller::Poller;
use compass_dash::types::AppEvent;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

fn drain(rx: &mut UnboundedReceiver<AppEvent>) -> usize {
    let mut n = 0;
    while let Ok(ev) = rx.try_recv() {
        assert!(matches!(ev, AppEvent::PollTick));
        n += 1;
    }
    n
}

#[tokio::test(start_paused = true)]
async fn double_start_keeps_a_single_timer() {
    let (tx, mut rx) = unbounded_channel();
    let mut poller = Poller::new(tx);

    poller.start();
    poller.start();
    assert!(poller.is_running());

    tokio::time::sleep(Duration::from_millis(5_001)).await;
    assert_eq!(drain(&mut rx), 1);

    tokio::time::sleep(Duration::from_millis(5_000)).await;
    assert_eq!(drain(&mut rx), 1);
}

#[tokio::test(start_paused = true)]
async fn no_tick_before_first_interval() {
    let (tx, mut rx) = unbounded_channel();
    let mut poller = Poller::new(tx);
    poller.start();

    tokio::time::sleep(Duration::from_millis(4_999)).await;
    assert_eq!(drain(&mut rx), 0);
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent_and_silences_ticks() {
    let (tx, mut rx) = unbounded_channel();
    let mut poller = Poller::new(tx);

    poller.stop();
    poller.start();
    tokio::time::sleep(Duration::from_millis(5_001)).await;
    assert_eq!(drain(&mut rx), 1);

    poller.stop();
    poller.stop();
    assert!(!poller.is_running());
    tokio::time::sleep(Duration::from_millis(20_000)).await;
    assert_eq!(drain(&mut rx), 0);

    poller.start();
    tokio::time::sleep(Duration::from_millis(5_001)).await;
    assert_eq!(drain(&mut rx), 1);
}
