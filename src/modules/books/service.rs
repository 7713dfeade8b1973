use std::sync::Arc;

use bookstore_db::Repository;
use bookstore_kernel::{Context, Error, Result, SearchParams};
use chrono::{DateTime, Utc};

use super::models::{Book, BookInput};
use crate::modules::references::ReferenceValidator;

pub struct BookService {
    books: Arc<dyn Repository<Book>>,
    references: ReferenceValidator,
}

impl BookService {
    pub fn new(books: Arc<dyn Repository<Book>>, references: ReferenceValidator) -> Self {
        Self { books, references }
    }

    pub fn create(&self, ctx: &Context, input: BookInput) -> Result<Book> {
        ctx.check()?;
        let book = build(0, Utc::now(), input)?;
        self.references.require_author(ctx, book.author_id)?;
        self.books.create(ctx, book)
    }

    pub fn get(&self, ctx: &Context, id: u64) -> Result<Book> {
        ctx.check()?;
        self.books.get(ctx, id)
    }

    /// Replace every input-driven field; `published_at` is kept.
    pub fn update(&self, ctx: &Context, id: u64, input: BookInput) -> Result<Book> {
        ctx.check()?;
        let existing = self.books.get(ctx, id)?;
        let book = build(existing.id, existing.published_at, input)?;
        self.references.require_author(ctx, book.author_id)?;
        self.books.update(ctx, id, book)
    }

    pub fn delete(&self, ctx: &Context, id: u64) -> Result<()> {
        ctx.check()?;
        self.books.delete(ctx, id)
    }

    pub fn search(&self, ctx: &Context, params: &SearchParams) -> Result<Vec<Book>> {
        ctx.check()?;
        self.books.search(ctx, Some(params))
    }

    pub fn flush(&self) -> Result<()> {
        self.books.flush()
    }

    pub fn count(&self) -> usize {
        self.books.len()
    }
}

fn build(id: u64, published_at: DateTime<Utc>, input: BookInput) -> Result<Book> {
    let invalid = || Error::validation("book details are invalid");

    if !input.price.is_finite() || input.price < 0.0 {
        return Err(invalid());
    }
    let stock = u32::try_from(input.stock).map_err(|_| invalid())?;
    if input.title.trim().is_empty() {
        return Err(Error::validation("book title is mandatory"));
    }

    Ok(Book {
        id,
        title: input.title,
        author_id: input.author_id,
        genres: input.genres,
        published_at,
        price: input.price,
        stock,
    })
}
