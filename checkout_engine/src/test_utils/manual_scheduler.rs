use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use log::*;
use tokio::sync::{oneshot, Notify};

use crate::traits::Scheduler;

/// A [`Scheduler`] whose delays only complete when the test says so.
///
/// Every requested delay is recorded. In the default mode, a delay parks until [`Self::elapse`] is called. An
/// auto-advancing scheduler completes every delay immediately, which is handy when only the sequence of delays matters.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<State>,
    parked: Notify,
}

#[derive(Debug, Default)]
struct State {
    requested: Vec<Duration>,
    waiting: Vec<oneshot::Sender<()>>,
    auto_advance: bool,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_advancing() -> Self {
        let scheduler = Self::default();
        scheduler.lock().auto_advance = true;
        scheduler
    }

    /// Every delay that has been requested so far, in order.
    pub fn requested(&self) -> Vec<Duration> {
        self.lock().requested.clone()
    }

    /// The number of delays currently parked.
    pub fn parked(&self) -> usize {
        self.lock().waiting.len()
    }

    /// Waits until at least one delay is parked.
    pub async fn until_parked(&self) {
        while self.parked() == 0 {
            self.inner.parked.notified().await;
        }
    }

    /// Completes every parked delay. Returns how many were released.
    pub fn elapse(&self) -> usize {
        let waiting = std::mem::take(&mut self.lock().waiting);
        let n = waiting.len();
        for tx in waiting {
            let _ = tx.send(());
        }
        trace!("⏱️ Released {n} parked delays");
        n
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn delay(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        let scheduler = self.clone();
        async move {
            let parked = {
                let mut state = scheduler.lock();
                state.requested.push(duration);
                if state.auto_advance {
                    None
                } else {
                    let (tx, rx) = oneshot::channel();
                    state.waiting.push(tx);
                    Some(rx)
                }
            };
            if let Some(rx) = parked {
                scheduler.inner.parked.notify_one();
                let _ = rx.await;
            }
        }
    }
}
