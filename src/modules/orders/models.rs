use bookstore_db::{matching, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STATUS: &str = "Pending";

/// One line of an order.
///
/// `quantity` is taken as given; it is not bounded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub book_id: u64,
    pub quantity: i64,
}

/// Stored order record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    #[serde(rename = "customer")]
    pub customer_id: u64,
    pub items: Vec<OrderItem>,
    /// Derived from current book prices on every create and update
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
    pub status: String,
}

/// Request model for placing or replacing an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderInput {
    /// `0` when absent, which is rejected as a missing customer
    #[serde(rename = "customer", default)]
    pub customer_id: u64,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Replaces the stored status on update; ignored on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Record for Order {
    const ENTITY: &'static str = "order";
    const COLLECTION: &'static str = "orders";

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn matches(&self, key: &str, value: &str) -> bool {
        match key {
            "customer" | "customer_id" => matching::id_eq(self.customer_id, value),
            "status" => matching::eq_ignore_case(&self.status, value),
            "book_id" => self
                .items
                .iter()
                .any(|item| matching::id_eq(item.book_id, value)),
            "created_at" => matching::date_eq(&self.created_at, value),
            _ => true,
        }
    }
}
