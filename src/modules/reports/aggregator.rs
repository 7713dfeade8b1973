use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use bookstore_db::Repository;
use bookstore_kernel::{settings::ReportSettings, Context, Error, Result};
use chrono::{DateTime, Duration, Utc};

use super::archive::ReportArchive;
use super::models::Report;
use crate::modules::books::models::Book;
use crate::modules::orders::models::Order;

pub const FIGURES_OUT_OF_RANGE: &str = "report figures are out of range";

/// Builds sales reports from the order and book stores. Read only: no entity
/// is ever modified here.
pub struct ReportAggregator {
    orders: Arc<dyn Repository<Order>>,
    books: Arc<dyn Repository<Book>>,
    archive: ReportArchive,
    window: Duration,
    top_n: usize,
}

impl ReportAggregator {
    pub fn new(
        orders: Arc<dyn Repository<Order>>,
        books: Arc<dyn Repository<Book>>,
        archive: ReportArchive,
        settings: &ReportSettings,
    ) -> Self {
        Self {
            orders,
            books,
            archive,
            window: Duration::hours(i64::from(settings.window_hours)),
            top_n: settings.top_n,
        }
    }

    pub fn archive(&self) -> &ReportArchive {
        &self.archive
    }

    /// Aggregate the orders created strictly after `as_of - window`.
    ///
    /// Orders newer than `as_of` are not excluded.
    pub fn summarize(&self, ctx: &Context, as_of: DateTime<Utc>) -> Result<Report> {
        ctx.check()?;
        let cutoff = as_of - self.window;
        let orders = self.orders.search(ctx, None)?;

        let mut total_orders = 0;
        let mut total_revenue = 0.0;
        let mut total_books_sold: i64 = 0;
        // (book_id, quantity) in first-seen order
        let mut sold: Vec<(u64, i64)> = Vec::new();
        let mut position: HashMap<u64, usize> = HashMap::new();

        for order in orders.iter().filter(|order| order.created_at > cutoff) {
            total_orders += 1;
            total_revenue += order.total_price;
            for item in &order.items {
                total_books_sold = add_quantity(total_books_sold, item.quantity)?;
                let slot = *position.entry(item.book_id).or_insert_with(|| {
                    sold.push((item.book_id, 0));
                    sold.len() - 1
                });
                sold[slot].1 = add_quantity(sold[slot].1, item.quantity)?;
            }
        }
        if !total_revenue.is_finite() {
            return Err(Error::validation(FIGURES_OUT_OF_RANGE));
        }

        // stable: ties keep first-seen order
        sold.sort_by(|a, b| b.1.cmp(&a.1));

        let mut top_selling_books = Vec::with_capacity(self.top_n);
        for &(book_id, _) in sold.iter().take(self.top_n) {
            match self.books.get(ctx, book_id) {
                Ok(book) => top_selling_books.push(book),
                Err(err) if err.is_not_found() => {
                    tracing::debug!(book_id, "top seller no longer in catalogue, skipped");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(Report {
            total_revenue,
            total_orders,
            total_books_sold,
            top_selling_books,
            generated_at: Utc::now(),
        })
    }

    /// Summarize and archive the result.
    pub fn generate(&self, ctx: &Context, as_of: DateTime<Utc>) -> Result<(Report, PathBuf)> {
        let report = self.summarize(ctx, as_of)?;
        let path = self.archive.save(&report)?;

        tracing::info!(
            path = %path.display(),
            total_orders = report.total_orders,
            total_revenue = report.total_revenue,
            total_books_sold = report.total_books_sold,
            "report generated"
        );
        Ok((report, path))
    }
}

/// Quantities are unbounded, so their sums are checked.
fn add_quantity(sum: i64, quantity: i64) -> Result<i64> {
    sum.checked_add(quantity)
        .ok_or_else(|| Error::validation(FIGURES_OUT_OF_RANGE))
}
