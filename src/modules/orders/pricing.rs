use std::sync::Arc;

use bookstore_db::Repository;
use bookstore_kernel::{Context, Error, Result};

use super::models::OrderItem;
use crate::modules::books::models::Book;
use crate::modules::references::BOOK_NOT_FOUND;

pub const TOTAL_OUT_OF_RANGE: &str = "order total is out of range";

/// Prices order items from the book store.
#[derive(Clone)]
pub struct PricingEngine {
    books: Arc<dyn Repository<Book>>,
}

impl PricingEngine {
    pub fn new(books: Arc<dyn Repository<Book>>) -> Self {
        Self { books }
    }

    /// Sum of current price times quantity over `items`.
    ///
    /// Prices are read at call time; a book that no longer exists aborts the
    /// computation.
    pub fn compute_total(&self, ctx: &Context, items: &[OrderItem]) -> Result<f64> {
        let total = items.iter().try_fold(0.0, |total, item| -> Result<f64> {
            let book = self.books.get(ctx, item.book_id).map_err(|err| {
                if err.is_not_found() {
                    Error::reference(BOOK_NOT_FOUND)
                } else {
                    err
                }
            })?;
            Ok(total + book.price * item.quantity as f64)
        })?;

        // JSON has no infinity; such a total could not be stored and reloaded
        if !total.is_finite() {
            return Err(Error::validation(TOTAL_OUT_OF_RANGE));
        }
        Ok(total)
    }
}
