use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modules::books::models::Book;

/// Sales summary over a trailing window of orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub total_revenue: f64,
    pub total_orders: usize,
    pub total_books_sold: i64,
    /// Best sellers by quantity, current book records
    pub top_selling_books: Vec<Book>,
    /// Completion time of the aggregation, not the window end
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Whether two reports carry the same figures, ignoring when they were made.
    pub fn same_figures(&self, other: &Report) -> bool {
        self.total_revenue == other.total_revenue
            && self.total_orders == other.total_orders
            && self.total_books_sold == other.total_books_sold
            && self.top_selling_books == other.top_selling_books
    }
}
