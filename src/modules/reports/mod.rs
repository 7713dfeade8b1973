pub mod aggregator;
pub mod archive;
pub mod models;
pub mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{extract::State, routing::get, Json, Router};
use bookstore_http::{error::AppError, extract::RequestContext};
use bookstore_kernel::{InitCtx, Module};
use parking_lot::Mutex;
use serde_json::json;
use tokio::task::JoinHandle;

use super::openapi;
use aggregator::ReportAggregator;
use models::Report;
use scheduler::ReportScheduler;

/// Reports module: the daily report task and read access to the archive
pub struct ReportsModule {
    aggregator: Arc<ReportAggregator>,
    interval: Duration,
    task: Mutex<Option<JoinHandle<u64>>>,
}

impl ReportsModule {
    pub fn new(aggregator: Arc<ReportAggregator>, interval: Duration) -> Self {
        Self {
            aggregator,
            interval,
            task: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Module for ReportsModule {
    fn name(&self) -> &'static str {
        "reports"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            dir = %self.aggregator.archive().dir().display(),
            interval_secs = ctx.settings.reports.interval_secs,
            "reports module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_reports))
            .with_state(self.aggregator.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book_ref = json!({ "$ref": "#/components/schemas/Book" });
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List archived reports",
                        "tags": ["Reports"],
                        "responses": {
                            "200": {
                                "description": "Reports, oldest first",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Report" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Report": {
                        "type": "object",
                        "properties": {
                            "total_revenue": openapi::number_field("Sum of order totals in the window"),
                            "total_orders": openapi::integer_field("Orders in the window"),
                            "total_books_sold": openapi::integer_field("Units sold in the window"),
                            "top_selling_books": { "type": "array", "items": book_ref },
                            "generated_at": openapi::timestamp_field("Completion time")
                        }
                    }
                }
            }
        }))
    }

    async fn start(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let scheduler = ReportScheduler::new(self.aggregator.clone(), self.interval);
        let handle = tokio::spawn(scheduler.run(ctx.shutdown.clone()));
        if let Some(previous) = self.task.lock().replace(handle) {
            previous.abort();
        }
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            let runs = handle.await?;
            tracing::info!(module = self.name(), runs, "report scheduler stopped");
        }
        Ok(())
    }
}

async fn list_reports(
    State(aggregator): State<Arc<ReportAggregator>>,
    RequestContext(ctx): RequestContext,
) -> Result<Json<Vec<Report>>, AppError> {
    ctx.check()?;
    let reports = tokio::task::spawn_blocking(move || aggregator.archive().list())
        .await
        .map_err(anyhow::Error::from)??;
    Ok(Json(reports))
}
