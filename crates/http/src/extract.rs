//! Request extractors shared by module handlers.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use bookstore_kernel::{query::search_params, Context, SearchParams};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;

/// Per-server settings used to derive each request's [`Context`].
///
/// Installed as a request extension by
/// [`RouterBuilder::with_request_scope`](crate::router::RouterBuilder::with_request_scope).
#[derive(Debug, Clone)]
pub struct RequestScope {
    pub shutdown: CancellationToken,
    pub timeout: Duration,
}

impl RequestScope {
    pub fn context(&self) -> Context {
        Context::with_token(self.shutdown.child_token()).with_timeout(self.timeout)
    }
}

/// Operation context for the current request: cancelled on shutdown and
/// expired after the configured request timeout.
pub struct RequestContext(pub Context);

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<RequestScope>()
            .map(RequestScope::context)
            .unwrap_or_else(Context::background);
        Ok(RequestContext(ctx))
    }
}

/// Query parameters as flat search parameters, with empty values dropped.
pub struct SearchQuery(pub SearchParams);

impl<S> FromRequestParts<S> for SearchQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        Ok(SearchQuery(search_params(raw)))
    }
}

/// Numeric `{id}` path segment.
pub struct EntityId(pub u64);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<u64>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request("Invalid ID format"))?;
        Ok(EntityId(id))
    }
}

/// JSON request body whose rejections use the standard error format.
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        Ok(Payload(value))
    }
}
