//! Fixed-cadence dashboard refresh.
//!
//! One repeating timer sends [`AppEvent::PollTick`]; the router answers every
//! tick with a dashboard load, whatever view is active. Failed loads do not
//! affect the timer.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::constants::app::POLL_INTERVAL_MS;
use crate::types::AppEvent;

pub struct Poller {
    period: Duration,
    tx: UnboundedSender<AppEvent>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn new(tx: UnboundedSender<AppEvent>) -> Self {
        Self::with_period(tx, Duration::from_millis(POLL_INTERVAL_MS))
    }

    pub(crate) fn with_period(tx: UnboundedSender<AppEvent>, period: Duration) -> Self {
        Self {
            period,
            tx,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start the timer. No-op while one is already running.
    pub fn start(&mut self) {
        if self.is_running() {
            log::debug!("poller already running");
            return;
        }
        let tx = self.tx.clone();
        let period = self.period;
        log::info!("⏱️ poller started ({}ms)", period.as_millis());
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(AppEvent::PollTick).is_err() {
                    log::debug!("poller: event channel closed");
                    break;
                }
            }
        }));
    }

    /// Cancel the timer. Loads already in flight keep running.
    pub fn stop(&mut self) {
        if let Some(h) = self.handle.take() {
            h.abort();
            log::info!("⏱️ poller stopped");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
