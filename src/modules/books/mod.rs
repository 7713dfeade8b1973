pub mod models;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use bookstore_http::{
    error::AppError,
    extract::{EntityId, Payload, RequestContext, SearchQuery},
};
use bookstore_kernel::{InitCtx, Module};
use serde_json::json;

use super::openapi;
use models::{Book, BookInput};
use service::BookService;

/// Books module: CRUD and search over the book catalogue
pub struct BooksModule {
    service: Arc<BookService>,
}

impl BooksModule {
    pub fn new(service: Arc<BookService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books = self.service.count(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(search_books).post(create_book))
            .route("/{id}", get(get_book).put(update_book).delete(delete_book))
            .with_state(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let input_properties = json!({
            "title": openapi::string_field("Title of the book"),
            "author_id": openapi::integer_field("Existing author id"),
            "genres": { "type": "array", "items": { "type": "string" } },
            "price": openapi::number_field("Unit price, not negative"),
            "stock": openapi::integer_field("Units in stock, not negative")
        });
        let mut book_properties = input_properties.clone();
        book_properties["id"] = openapi::integer_field("Store-assigned identifier");
        book_properties["published_at"] = openapi::timestamp_field("Creation time of the record");

        Some(json!({
            "paths": openapi::crud_paths(
                "Books",
                "Book",
                "BookInput",
                &[
                    "title",
                    "author",
                    "genre",
                    "year",
                    "published_after",
                    "published_before",
                    "min_price",
                    "max_price",
                ],
            ),
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": book_properties,
                        "required": ["id", "title", "author_id", "published_at", "price", "stock"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": input_properties,
                        "required": ["title", "author_id"]
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.service.flush()?;
        tracing::info!(module = self.name(), books = self.service.count(), "books saved");
        Ok(())
    }
}

async fn search_books(
    State(service): State<Arc<BookService>>,
    RequestContext(ctx): RequestContext,
    SearchQuery(params): SearchQuery,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service.search(&ctx, &params)?))
}

async fn create_book(
    State(service): State<Arc<BookService>>,
    RequestContext(ctx): RequestContext,
    Payload(input): Payload<BookInput>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = service.create(&ctx, input)?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn get_book(
    State(service): State<Arc<BookService>>,
    RequestContext(ctx): RequestContext,
    EntityId(id): EntityId,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service.get(&ctx, id)?))
}

async fn update_book(
    State(service): State<Arc<BookService>>,
    RequestContext(ctx): RequestContext,
    EntityId(id): EntityId,
    Payload(input): Payload<BookInput>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(service.update(&ctx, id, input)?))
}

async fn delete_book(
    State(service): State<Arc<BookService>>,
    RequestContext(ctx): RequestContext,
    EntityId(id): EntityId,
) -> Result<StatusCode, AppError> {
    service.delete(&ctx, id)?;
    Ok(StatusCode::NO_CONTENT)
}
