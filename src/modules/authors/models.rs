use bookstore_db::{matching, Record};
use serde::{Deserialize, Serialize};

/// Stored author record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
}

/// Request model for creating or replacing an author.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
}

impl Record for Author {
    const ENTITY: &'static str = "author";
    const COLLECTION: &'static str = "authors";

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn matches(&self, key: &str, value: &str) -> bool {
        match key {
            "first_name" | "firstName" => matching::eq_ignore_case(&self.first_name, value),
            "last_name" | "lastName" => matching::eq_ignore_case(&self.last_name, value),
            _ => true,
        }
    }
}
