use std::sync::Arc;
use std::time::Duration;

use bookstore_kernel::{schedule::run_periodic, Context};
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use super::aggregator::ReportAggregator;

/// Generates one report per interval until shutdown.
#[derive(Clone)]
pub struct ReportScheduler {
    aggregator: Arc<ReportAggregator>,
    interval: Duration,
}

impl ReportScheduler {
    pub fn new(aggregator: Arc<ReportAggregator>, interval: Duration) -> Self {
        Self {
            aggregator,
            interval,
        }
    }

    /// Run until `shutdown` fires; returns how many reports were attempted.
    pub async fn run(self, shutdown: CancellationToken) -> u64 {
        let aggregator = self.aggregator;
        let job_shutdown = shutdown.clone();

        run_periodic("report-scheduler", self.interval, shutdown, move || {
            let aggregator = aggregator.clone();
            let ctx = Context::with_token(job_shutdown.child_token());
            async move {
                // report writes hit the disk
                tokio::task::spawn_blocking(move || aggregator.generate(&ctx, Utc::now()))
                    .await??;
                Ok::<_, anyhow::Error>(())
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::models::Book;
    use crate::modules::orders::models::Order;
    use crate::modules::reports::archive::ReportArchive;
    use bookstore_db::MemoryStore;
    use bookstore_kernel::settings::ReportSettings;

    fn aggregator(dir: &std::path::Path) -> Arc<ReportAggregator> {
        Arc::new(ReportAggregator::new(
            Arc::new(MemoryStore::<Order>::new()),
            Arc::new(MemoryStore::<Book>::new()),
            ReportArchive::new(dir),
            &ReportSettings::default(),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn one_report_per_day_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let aggregator = aggregator(dir.path());
        let shutdown = CancellationToken::new();

        let scheduler = ReportScheduler::new(aggregator.clone(), Duration::from_secs(24 * 3600));
        let task = tokio::spawn(scheduler.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_secs(49 * 3600)).await;
        shutdown.cancel();

        assert_eq!(task.await.unwrap(), 2);
        assert_eq!(aggregator.archive().list().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn overflowing_figures_do_not_stop_the_schedule() {
        use crate::modules::orders::models::OrderItem;
        use bookstore_db::Repository;
        use bookstore_kernel::Context;

        let dir = tempfile::tempdir().unwrap();
        let orders = Arc::new(MemoryStore::<Order>::new());
        for quantity in [i64::MAX, 1] {
            orders
                .create(
                    &Context::background(),
                    Order {
                        id: 0,
                        customer_id: 1,
                        items: vec![OrderItem { book_id: 1, quantity }],
                        total_price: 0.0,
                        created_at: Utc::now(),
                        status: "Pending".to_string(),
                    },
                )
                .unwrap();
        }
        let aggregator = Arc::new(ReportAggregator::new(
            orders,
            Arc::new(MemoryStore::<Book>::new()),
            ReportArchive::new(dir.path()),
            &ReportSettings::default(),
        ));
        let shutdown = CancellationToken::new();

        let scheduler = ReportScheduler::new(aggregator.clone(), Duration::from_secs(60));
        let task = tokio::spawn(scheduler.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_secs(150)).await;
        shutdown.cancel();

        assert_eq!(task.await.unwrap(), 2);
        assert!(aggregator.archive().list().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_generation_keeps_ticking() {
        let dir = tempfile::tempdir().unwrap();
        // a file where the report directory should be makes every save fail
        let blocked = dir.path().join("reports");
        std::fs::write(&blocked, "").unwrap();
        let shutdown = CancellationToken::new();

        let scheduler = ReportScheduler::new(aggregator(&blocked), Duration::from_secs(60));
        let task = tokio::spawn(scheduler.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_secs(150)).await;
        shutdown.cancel();

        assert_eq!(task.await.unwrap(), 2);
    }
}
