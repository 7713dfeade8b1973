use std::sync::Arc;

use bookstore_db::Repository;
use bookstore_kernel::{Context, Error, Result, SearchParams};

use super::models::{Author, AuthorInput};

pub struct AuthorService {
    authors: Arc<dyn Repository<Author>>,
}

impl AuthorService {
    pub fn new(authors: Arc<dyn Repository<Author>>) -> Self {
        Self { authors }
    }

    pub fn create(&self, ctx: &Context, input: AuthorInput) -> Result<Author> {
        ctx.check()?;
        let author = build(0, input)?;
        self.authors.create(ctx, author)
    }

    pub fn get(&self, ctx: &Context, id: u64) -> Result<Author> {
        ctx.check()?;
        self.authors.get(ctx, id)
    }

    pub fn update(&self, ctx: &Context, id: u64, input: AuthorInput) -> Result<Author> {
        ctx.check()?;
        let existing = self.authors.get(ctx, id)?;
        let author = build(existing.id, input)?;
        self.authors.update(ctx, id, author)
    }

    /// Books written by the author are left untouched.
    pub fn delete(&self, ctx: &Context, id: u64) -> Result<()> {
        ctx.check()?;
        self.authors.delete(ctx, id)
    }

    pub fn search(&self, ctx: &Context, params: &SearchParams) -> Result<Vec<Author>> {
        ctx.check()?;
        self.authors.search(ctx, Some(params))
    }

    pub fn flush(&self) -> Result<()> {
        self.authors.flush()
    }

    pub fn count(&self) -> usize {
        self.authors.len()
    }
}

fn build(id: u64, input: AuthorInput) -> Result<Author> {
    if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
        return Err(Error::validation("author name is mandatory"));
    }

    Ok(Author {
        id,
        first_name: input.first_name,
        last_name: input.last_name,
        bio: input.bio,
    })
}
