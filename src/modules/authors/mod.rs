pub mod models;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookstore_http::{
    error::AppError,
    extract::{EntityId, Payload, RequestContext, SearchQuery},
};
use bookstore_kernel::{InitCtx, Module};
use serde_json::json;

use super::openapi;
use models::{Author, AuthorInput};
use service::AuthorService;

/// Authors module: CRUD and search over the author store
pub struct AuthorsModule {
    service: Arc<AuthorService>,
}

impl AuthorsModule {
    pub fn new(service: Arc<AuthorService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            authors = self.service.count(),
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(search_authors).post(create_author))
            .route(
                "/{id}",
                get(get_author).put(update_author).delete(delete_author),
            )
            .with_state(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let author_properties = json!({
            "first_name": openapi::string_field("Given name"),
            "last_name": openapi::string_field("Family name"),
            "bio": openapi::string_field("Short biography")
        });
        let mut stored_properties = author_properties.clone();
        stored_properties["id"] = openapi::integer_field("Store-assigned identifier");

        Some(json!({
            "paths": openapi::crud_paths("Authors", "Author", "AuthorInput", &["first_name", "last_name"]),
            "components": {
                "schemas": {
                    "Author": {
                        "type": "object",
                        "properties": stored_properties,
                        "required": ["id", "first_name", "last_name"]
                    },
                    "AuthorInput": {
                        "type": "object",
                        "properties": author_properties,
                        "required": ["first_name", "last_name"]
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.service.flush()?;
        tracing::info!(module = self.name(), authors = self.service.count(), "authors saved");
        Ok(())
    }
}

async fn search_authors(
    State(service): State<Arc<AuthorService>>,
    RequestContext(ctx): RequestContext,
    SearchQuery(params): SearchQuery,
) -> Result<Json<Vec<Author>>, AppError> {
    Ok(Json(service.search(&ctx, &params)?))
}

async fn create_author(
    State(service): State<Arc<AuthorService>>,
    RequestContext(ctx): RequestContext,
    Payload(input): Payload<AuthorInput>,
) -> Result<(StatusCode, Json<Author>), AppError> {
    let author = service.create(&ctx, input)?;
    Ok((StatusCode::CREATED, Json(author)))
}

async fn get_author(
    State(service): State<Arc<AuthorService>>,
    RequestContext(ctx): RequestContext,
    EntityId(id): EntityId,
) -> Result<Json<Author>, AppError> {
    Ok(Json(service.get(&ctx, id)?))
}

async fn update_author(
    State(service): State<Arc<AuthorService>>,
    RequestContext(ctx): RequestContext,
    EntityId(id): EntityId,
    Payload(input): Payload<AuthorInput>,
) -> Result<Json<Author>, AppError> {
    Ok(Json(service.update(&ctx, id, input)?))
}

async fn delete_author(
    State(service): State<Arc<AuthorService>>,
    RequestContext(ctx): RequestContext,
    EntityId(id): EntityId,
) -> Result<StatusCode, AppError> {
    service.delete(&ctx, id)?;
    Ok(StatusCode::NO_CONTENT)
}
