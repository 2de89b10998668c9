use std::time::Duration;

use tokio::{runtime::Handle, task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Recurring task that drives live updates while a session runs.
///
/// Dropping the ticker cancels it; cancelling twice is harmless.
pub(crate) struct Ticker {
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawns `on_tick` every `period` on the current tokio runtime. The loop
    /// ends when `on_tick` returns false or the ticker is cancelled.
    /// Returns `None` outside a runtime.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Option<Self>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let runtime = Handle::try_current().ok()?;
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let handle = runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the session start already notified.
            interval.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if !on_tick() {
                            break;
                        }
                    }
                }
            }
        });

        Some(Self {
            cancel_token,
            handle,
        })
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
        self.handle.abort();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn no_runtime_means_no_ticker() {
        assert!(Ticker::spawn(Duration::from_secs(1), || true).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_until_dropped() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let ticker = Ticker::spawn(Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        })
        .expect("inside runtime");

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        ticker.cancel();
        drop(ticker);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_callback_declines() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let _ticker = Ticker::spawn(Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst) < 1
        });

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }
}
