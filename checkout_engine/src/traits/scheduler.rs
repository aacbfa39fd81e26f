use std::{future::Future, time::Duration};

/// Provides the delay between reconciliation attempts.
///
/// Production code sleeps on the tokio timer. Tests substitute a scheduler that is advanced by hand, so that the
/// polling schedule can be exercised without waiting in real time.
pub trait Scheduler {
    fn delay(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    async fn delay(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
