//! Existence checks run by write paths before they touch their own store.
//!
//! Each check is an independent read through the referenced store; nothing is
//! locked across stores, so a referenced record can still disappear between
//! the check and the write that depends on it.

use std::collections::HashSet;
use std::sync::Arc;

use bookstore_db::{Record, Repository};
use bookstore_kernel::{Context, Error, Result};

use super::authors::models::Author;
use super::books::models::Book;
use super::customers::models::Customer;
use super::orders::models::OrderItem;

pub const AUTHOR_NOT_FOUND: &str = "author not found";
pub const CUSTOMER_NOT_FOUND: &str = "customer non existant";
pub const BOOK_NOT_FOUND: &str = "book non existant";

#[derive(Clone)]
pub struct ReferenceValidator {
    authors: Arc<dyn Repository<Author>>,
    customers: Arc<dyn Repository<Customer>>,
    books: Arc<dyn Repository<Book>>,
}

impl ReferenceValidator {
    pub fn new(
        authors: Arc<dyn Repository<Author>>,
        customers: Arc<dyn Repository<Customer>>,
        books: Arc<dyn Repository<Book>>,
    ) -> Self {
        Self {
            authors,
            customers,
            books,
        }
    }

    pub fn require_author(&self, ctx: &Context, id: u64) -> Result<()> {
        require(self.authors.as_ref(), ctx, id, AUTHOR_NOT_FOUND)
    }

    pub fn require_customer(&self, ctx: &Context, id: u64) -> Result<()> {
        require(self.customers.as_ref(), ctx, id, CUSTOMER_NOT_FOUND)
    }

    /// Check every distinct book referenced by `items`, failing on the first
    /// one that does not exist.
    pub fn require_books(&self, ctx: &Context, items: &[OrderItem]) -> Result<()> {
        let mut checked = HashSet::with_capacity(items.len());
        for item in items {
            if checked.insert(item.book_id) {
                require(self.books.as_ref(), ctx, item.book_id, BOOK_NOT_FOUND)?;
            }
        }
        Ok(())
    }
}

/// Only a missing record becomes a reference error; cancellation and storage
/// failures pass through unchanged.
fn require<T: Record>(
    store: &dyn Repository<T>,
    ctx: &Context,
    id: u64,
    message: &'static str,
) -> Result<()> {
    match store.get(ctx, id) {
        Ok(_) => Ok(()),
        Err(err) if err.is_not_found() => {
            tracing::debug!(entity = T::ENTITY, id, "referenced record missing");
            Err(Error::reference(message))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_db::MemoryStore;
    use chrono::Utc;

    fn book(title: &str) -> Book {
        Book {
            id: 0,
            title: title.to_string(),
            author_id: 1,
            genres: Vec::new(),
            published_at: Utc::now(),
            price: 5.0,
            stock: 1,
        }
    }

    fn validator() -> ReferenceValidator {
        let books = Arc::new(MemoryStore::<Book>::new());
        books.create(&Context::background(), book("one")).unwrap();
        books.create(&Context::background(), book("two")).unwrap();
        ReferenceValidator::new(
            Arc::new(MemoryStore::<Author>::new()),
            Arc::new(MemoryStore::<Customer>::new()),
            books,
        )
    }

    fn item(book_id: u64) -> OrderItem {
        OrderItem {
            book_id,
            quantity: 1,
        }
    }

    #[test]
    fn missing_records_become_reference_errors() {
        let validator = validator();
        let ctx = Context::background();

        let author = validator.require_author(&ctx, 1).unwrap_err();
        assert_eq!(author.to_string(), AUTHOR_NOT_FOUND);
        assert!(!author.is_not_found());

        let customer = validator.require_customer(&ctx, 1).unwrap_err();
        assert_eq!(customer.to_string(), CUSTOMER_NOT_FOUND);
    }

    #[test]
    fn every_book_must_exist() {
        let validator = validator();
        let ctx = Context::background();

        validator.require_books(&ctx, &[item(1), item(2), item(1)]).unwrap();
        let err = validator
            .require_books(&ctx, &[item(1), item(3)])
            .unwrap_err();
        assert_eq!(err.to_string(), BOOK_NOT_FOUND);
    }

    #[test]
    fn cancellation_is_not_reported_as_missing() {
        let validator = validator();
        let ctx = Context::background();
        ctx.cancel();

        assert!(matches!(
            validator.require_books(&ctx, &[item(1)]),
            Err(Error::Cancelled)
        ));
    }
}
