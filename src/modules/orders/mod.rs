pub mod models;
pub mod pricing;
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
use models::{Order, OrderInput};
use service::OrderService;

/// Orders module: placement, repricing on update, and search
pub struct OrdersModule {
    service: Arc<OrderService>,
}

impl OrdersModule {
    pub fn new(service: Arc<OrderService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for OrdersModule {
    fn name(&self) -> &'static str {
        "orders"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            orders = self.service.count(),
            "orders module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(search_orders).post(create_order))
            .route("/{id}", get(get_order).put(update_order).delete(delete_order))
            .with_state(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let item = json!({
            "type": "object",
            "properties": {
                "book_id": openapi::integer_field("Existing book id"),
                "quantity": openapi::integer_field("Units ordered")
            },
            "required": ["book_id", "quantity"]
        });
        let input_properties = json!({
            "customer": openapi::integer_field("Existing customer id"),
            "items": { "type": "array", "items": item },
            "status": openapi::string_field("New status, update only")
        });
        let mut order_properties = input_properties.clone();
        order_properties["id"] = openapi::integer_field("Store-assigned identifier");
        order_properties["total_price"] = openapi::number_field("Sum of price times quantity");
        order_properties["created_at"] = openapi::timestamp_field("Placement time");
        order_properties["status"] = openapi::string_field("Order status, Pending when placed");

        Some(json!({
            "paths": openapi::crud_paths(
                "Orders",
                "Order",
                "OrderInput",
                &["customer", "status", "book_id", "created_at"],
            ),
            "components": {
                "schemas": {
                    "Order": {
                        "type": "object",
                        "properties": order_properties,
                        "required": ["id", "customer", "items", "total_price", "created_at", "status"]
                    },
                    "OrderInput": {
                        "type": "object",
                        "properties": input_properties,
                        "required": ["customer", "items"]
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.service.flush()?;
        tracing::info!(module = self.name(), orders = self.service.count(), "orders saved");
        Ok(())
    }
}

async fn search_orders(
    State(service): State<Arc<OrderService>>,
    RequestContext(ctx): RequestContext,
    SearchQuery(params): SearchQuery,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(service.search(&ctx, &params)?))
}

async fn create_order(
    State(service): State<Arc<OrderService>>,
    RequestContext(ctx): RequestContext,
    Payload(input): Payload<OrderInput>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = service.create(&ctx, input)?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order(
    State(service): State<Arc<OrderService>>,
    RequestContext(ctx): RequestContext,
    EntityId(id): EntityId,
) -> Result<Json<Order>, AppError> {
    Ok(Json(service.get(&ctx, id)?))
}

async fn update_order(
    State(service): State<Arc<OrderService>>,
    RequestContext(ctx): RequestContext,
    EntityId(id): EntityId,
    Payload(input): Payload<OrderInput>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(service.update(&ctx, id, input)?))
}

async fn delete_order(
    State(service): State<Arc<OrderService>>,
    RequestContext(ctx): RequestContext,
    EntityId(id): EntityId,
) -> Result<StatusCode, AppError> {
    service.delete(&ctx, id)?;
    Ok(StatusCode::NO_CONTENT)
}
