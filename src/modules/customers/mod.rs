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
use models::{Customer, CustomerInput};
use service::CustomerService;

/// Customers module: CRUD and search over customer accounts
pub struct CustomersModule {
    service: Arc<CustomerService>,
}

impl CustomersModule {
    pub fn new(service: Arc<CustomerService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for CustomersModule {
    fn name(&self) -> &'static str {
        "customers"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            customers = self.service.count(),
            "customers module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(search_customers).post(create_customer))
            .route(
                "/{id}",
                get(get_customer).put(update_customer).delete(delete_customer),
            )
            .with_state(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let input_properties = json!({
            "name": openapi::string_field("Full name"),
            "email": openapi::string_field("Contact email"),
            "address": { "$ref": "#/components/schemas/Address" }
        });
        let mut customer_properties = input_properties.clone();
        customer_properties["id"] = openapi::integer_field("Store-assigned identifier");
        customer_properties["created_at"] = openapi::timestamp_field("Registration time");

        Some(json!({
            "paths": openapi::crud_paths(
                "Customers",
                "Customer",
                "CustomerInput",
                &["name", "email", "city", "country"],
            ),
            "components": {
                "schemas": {
                    "Address": {
                        "type": "object",
                        "properties": {
                            "street": openapi::string_field("Street and number"),
                            "city": openapi::string_field("City"),
                            "state": openapi::string_field("State or province"),
                            "postal_code": openapi::string_field("Postal code"),
                            "country": openapi::string_field("Country")
                        }
                    },
                    "Customer": {
                        "type": "object",
                        "properties": customer_properties,
                        "required": ["id", "name", "email", "created_at"]
                    },
                    "CustomerInput": {
                        "type": "object",
                        "properties": input_properties,
                        "required": ["name", "email"]
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.service.flush()?;
        tracing::info!(module = self.name(), customers = self.service.count(), "customers saved");
        Ok(())
    }
}

async fn search_customers(
    State(service): State<Arc<CustomerService>>,
    RequestContext(ctx): RequestContext,
    SearchQuery(params): SearchQuery,
) -> Result<Json<Vec<Customer>>, AppError> {
    Ok(Json(service.search(&ctx, &params)?))
}

async fn create_customer(
    State(service): State<Arc<CustomerService>>,
    RequestContext(ctx): RequestContext,
    Payload(input): Payload<CustomerInput>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let customer = service.create(&ctx, input)?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn get_customer(
    State(service): State<Arc<CustomerService>>,
    RequestContext(ctx): RequestContext,
    EntityId(id): EntityId,
) -> Result<Json<Customer>, AppError> {
    Ok(Json(service.get(&ctx, id)?))
}

async fn update_customer(
    State(service): State<Arc<CustomerService>>,
    RequestContext(ctx): RequestContext,
    EntityId(id): EntityId,
    Payload(input): Payload<CustomerInput>,
) -> Result<Json<Customer>, AppError> {
    Ok(Json(service.update(&ctx, id, input)?))
}

async fn delete_customer(
    State(service): State<Arc<CustomerService>>,
    RequestContext(ctx): RequestContext,
    EntityId(id): EntityId,
) -> Result<StatusCode, AppError> {
    service.delete(&ctx, id)?;
    Ok(StatusCode::NO_CONTENT)
}
