use bookstore_db::{matching, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Postal address of a customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

/// Stored customer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: Address,
    pub created_at: DateTime<Utc>,
}

/// Request model for creating or replacing a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: Address,
}

impl Record for Customer {
    const ENTITY: &'static str = "customer";
    const COLLECTION: &'static str = "customers";

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn matches(&self, key: &str, value: &str) -> bool {
        match key {
            "name" => matching::eq_ignore_case(&self.name, value),
            "email" => matching::eq_ignore_case(&self.email, value),
            "city" => matching::eq_ignore_case(&self.address.city, value),
            "country" => matching::eq_ignore_case(&self.address.country, value),
            _ => true,
        }
    }
}
