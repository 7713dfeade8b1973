use bookstore_db::{matching, Record};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Stored book record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned identifier
    pub id: u64,
    pub title: String,
    /// Author at the time of the last create or update
    pub author_id: u64,
    #[serde(default)]
    pub genres: Vec<String>,
    /// Set when the book is created and kept across updates
    pub published_at: DateTime<Utc>,
    pub price: f64,
    pub stock: u32,
}

/// Request model for creating or replacing a book.
///
/// `stock` is signed so a negative value is reported as invalid input rather
/// than as a malformed payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author_id: u64,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
}

impl Record for Book {
    const ENTITY: &'static str = "book";
    const COLLECTION: &'static str = "books";

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn matches(&self, key: &str, value: &str) -> bool {
        match key {
            "title" => matching::eq_ignore_case(&self.title, value),
            "author" | "author_id" => matching::id_eq(self.author_id, value),
            "genre" => matching::any_eq_ignore_case(&self.genres, value),
            "year" if value.trim().len() == 4 => {
                value.trim().parse::<i32>().is_ok_and(|year| self.published_at.year() == year)
            }
            "year" | "published_at" => matching::date_eq(&self.published_at, value),
            "published_after" => matching::date_after(&self.published_at, value),
            "published_before" => matching::date_before(&self.published_at, value),
            "min_price" => matching::at_least(self.price, value),
            "max_price" => matching::at_most(self.price, value),
            _ => true,
        }
    }
}
