use std::sync::Arc;

use bookstore_db::Repository;
use bookstore_kernel::{Context, Error, Result, SearchParams};
use chrono::{DateTime, Utc};

use super::models::{Customer, CustomerInput};

pub struct CustomerService {
    customers: Arc<dyn Repository<Customer>>,
}

impl CustomerService {
    pub fn new(customers: Arc<dyn Repository<Customer>>) -> Self {
        Self { customers }
    }

    pub fn create(&self, ctx: &Context, input: CustomerInput) -> Result<Customer> {
        ctx.check()?;
        let customer = build(0, Utc::now(), input)?;
        self.customers.create(ctx, customer)
    }

    pub fn get(&self, ctx: &Context, id: u64) -> Result<Customer> {
        ctx.check()?;
        self.customers.get(ctx, id)
    }

    /// Replace name, email, and address; `created_at` is kept.
    pub fn update(&self, ctx: &Context, id: u64, input: CustomerInput) -> Result<Customer> {
        ctx.check()?;
        let existing = self.customers.get(ctx, id)?;
        let customer = build(existing.id, existing.created_at, input)?;
        self.customers.update(ctx, id, customer)
    }

    /// Orders placed by the customer are left untouched.
    pub fn delete(&self, ctx: &Context, id: u64) -> Result<()> {
        ctx.check()?;
        self.customers.delete(ctx, id)
    }

    pub fn search(&self, ctx: &Context, params: &SearchParams) -> Result<Vec<Customer>> {
        ctx.check()?;
        self.customers.search(ctx, Some(params))
    }

    pub fn flush(&self) -> Result<()> {
        self.customers.flush()
    }

    pub fn count(&self) -> usize {
        self.customers.len()
    }
}

fn build(id: u64, created_at: DateTime<Utc>, input: CustomerInput) -> Result<Customer> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("customer name is mandatory"));
    }
    if input.email.trim().is_empty() {
        return Err(Error::validation("customer email is mandatory"));
    }

    Ok(Customer {
        id,
        name: input.name,
        email: input.email,
        address: input.address,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::customers::models::Address;
    use bookstore_db::MemoryStore;
    use bookstore_kernel::query::search_params;

    fn service() -> CustomerService {
        CustomerService::new(Arc::new(MemoryStore::new()))
    }

    fn input(name: &str, email: &str, city: &str) -> CustomerInput {
        CustomerInput {
            name: name.to_string(),
            email: email.to_string(),
            address: Address {
                city: city.to_string(),
                country: "NL".to_string(),
                ..Address::default()
            },
        }
    }

    #[test]
    fn name_and_email_are_mandatory() {
        let service = service();
        let ctx = Context::background();

        let err = service.create(&ctx, input("", "b@x.com", "Utrecht")).unwrap_err();
        assert_eq!(err.to_string(), "customer name is mandatory");
        let err = service.create(&ctx, input("Bob", " ", "Utrecht")).unwrap_err();
        assert_eq!(err.to_string(), "customer email is mandatory");
        assert_eq!(service.count(), 0);
    }

    #[test]
    fn update_round_trip_preserves_id_and_created_at() {
        let service = service();
        let ctx = Context::background();
        let created = service.create(&ctx, input("Bob", "b@x.com", "Utrecht")).unwrap();

        let updated = service
            .update(&ctx, created.id, input("Robert", "robert@x.com", "Leiden"))
            .unwrap();
        let fetched = service.get(&ctx, created.id).unwrap();

        assert_eq!(fetched, updated);
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.created_at, created.created_at);
        assert_eq!(fetched.name, "Robert");
        assert_eq!(fetched.address.city, "Leiden");
    }

    #[test]
    fn search_by_email_and_city() {
        let service = service();
        let ctx = Context::background();
        service.create(&ctx, input("Bob", "b@x.com", "Utrecht")).unwrap();
        service.create(&ctx, input("Ann", "a@x.com", "Leiden")).unwrap();

        let found = service.search(&ctx, &search_params([("email", "B@X.COM")])).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Bob");

        let found = service.search(&ctx, &search_params([("city", "leiden")])).unwrap();
        assert_eq!(found[0].name, "Ann");
    }
}
