//! Cancellable fixed-period background loop.

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Run `job` once per `period` until `shutdown` is cancelled.
///
/// The first run happens one full period after the call. A failed run is
/// logged and the loop keeps ticking; there is no retry before the next tick.
/// Cancellation is polled before the tick, so once it is observed no further
/// run starts, and no final run happens on the way out.
///
/// Returns the number of runs that were started.
pub async fn run_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    shutdown: CancellationToken,
    mut job: F,
) -> u64
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    if period.is_zero() {
        tracing::warn!(task = name, "periodic task disabled: period is zero");
        return 0;
    }

    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(task = name, period_secs = period.as_secs(), "periodic task started");

    let mut runs = 0;
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                tracing::info!(task = name, "periodic task received shutdown signal");
                break;
            }
            _ = ticker.tick() => {}
        }

        runs += 1;
        tracing::debug!(task = name, run = runs, "periodic task tick");
        if let Err(err) = job().await {
            tracing::error!(task = name, run = runs, error = ?err, "periodic task run failed");
        }
    }

    tracing::info!(task = name, runs, "periodic task stopped");
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn runs_once_per_period() {
        let shutdown = CancellationToken::new();
        let count = Arc::new(AtomicU64::new(0));

        let counter = count.clone();
        let handle = tokio::spawn(run_periodic(
            "test",
            Duration::from_secs(10),
            shutdown.clone(),
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        ));

        time::sleep(Duration::from_secs(35)).await;
        shutdown.cancel();

        let runs = handle.await.unwrap();
        assert_eq!(runs, 3);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_runs_do_not_stop_the_loop() {
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_periodic(
            "failing",
            Duration::from_secs(5),
            shutdown.clone(),
            || async { Err(anyhow::anyhow!("aggregation failed")) },
        ));

        time::sleep(Duration::from_secs(16)).await;
        shutdown.cancel();

        assert_eq!(handle.await.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_first_tick_never_runs() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let runs = run_periodic("cancelled", Duration::from_secs(1), shutdown, || async {
            panic!("job must not run after cancellation")
        })
        .await;

        assert_eq!(runs, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_wins_over_pending_tick() {
        let shutdown = CancellationToken::new();
        let count = Arc::new(AtomicU64::new(0));

        let counter = count.clone();
        let handle = tokio::spawn(run_periodic(
            "race",
            Duration::from_secs(10),
            shutdown.clone(),
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        ));

        // Park the loop on its first tick, then make both branches ready
        // before the task is polled again.
        tokio::task::yield_now().await;
        shutdown.cancel();
        time::advance(Duration::from_secs(10)).await;

        assert_eq!(handle.await.unwrap(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_period_is_disabled() {
        let runs = run_periodic("off", Duration::ZERO, CancellationToken::new(), || async {
            Ok(())
        })
        .await;
        assert_eq!(runs, 0);
    }
}
