use std::sync::Arc;

use bookstore_db::Repository;
use bookstore_kernel::{Context, Error, Result, SearchParams};
use chrono::Utc;

use super::models::{Order, OrderInput, DEFAULT_STATUS};
use super::pricing::PricingEngine;
use crate::modules::references::ReferenceValidator;

/// Order placement: input checks, reference checks, pricing, then the write.
///
/// Every step reads other stores independently, so the workflow is
/// best-effort rather than atomic across stores.
pub struct OrderService {
    orders: Arc<dyn Repository<Order>>,
    references: ReferenceValidator,
    pricing: PricingEngine,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn Repository<Order>>,
        references: ReferenceValidator,
        pricing: PricingEngine,
    ) -> Self {
        Self {
            orders,
            references,
            pricing,
        }
    }

    pub fn create(&self, ctx: &Context, input: OrderInput) -> Result<Order> {
        ctx.check()?;
        validate(&input)?;
        self.references.require_customer(ctx, input.customer_id)?;
        self.references.require_books(ctx, &input.items)?;
        let total_price = self.pricing.compute_total(ctx, &input.items)?;

        let order = Order {
            id: 0,
            customer_id: input.customer_id,
            items: input.items,
            total_price,
            created_at: Utc::now(),
            status: DEFAULT_STATUS.to_string(),
        };
        let order = self.orders.create(ctx, order)?;

        tracing::info!(
            order_id = order.id,
            customer_id = order.customer_id,
            total_price = order.total_price,
            "order placed"
        );
        Ok(order)
    }

    pub fn get(&self, ctx: &Context, id: u64) -> Result<Order> {
        ctx.check()?;
        self.orders.get(ctx, id)
    }

    /// Replace customer and items and reprice from current book prices.
    ///
    /// `created_at` is kept, and so is the status unless the input carries one.
    pub fn update(&self, ctx: &Context, id: u64, input: OrderInput) -> Result<Order> {
        ctx.check()?;
        let existing = self.orders.get(ctx, id)?;
        validate(&input)?;
        self.references.require_customer(ctx, input.customer_id)?;
        self.references.require_books(ctx, &input.items)?;
        let total_price = self.pricing.compute_total(ctx, &input.items)?;

        let status = input
            .status
            .filter(|status| !status.trim().is_empty())
            .unwrap_or(existing.status);
        let order = Order {
            id: existing.id,
            customer_id: input.customer_id,
            items: input.items,
            total_price,
            created_at: existing.created_at,
            status,
        };
        self.orders.update(ctx, id, order)
    }

    pub fn delete(&self, ctx: &Context, id: u64) -> Result<()> {
        ctx.check()?;
        self.orders.delete(ctx, id)
    }

    pub fn search(&self, ctx: &Context, params: &SearchParams) -> Result<Vec<Order>> {
        ctx.check()?;
        self.orders.search(ctx, Some(params))
    }

    pub fn flush(&self) -> Result<()> {
        self.orders.flush()
    }

    pub fn count(&self) -> usize {
        self.orders.len()
    }
}

fn validate(input: &OrderInput) -> Result<()> {
    if input.customer_id == 0 {
        return Err(Error::validation("customer ID is mandatory"));
    }
    if input.items.is_empty() {
        return Err(Error::validation("order must have at least one item"));
    }
    Ok(())
}
