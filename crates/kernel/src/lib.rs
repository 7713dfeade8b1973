//! Core building blocks shared by every bookstore crate: settings, the error
//! taxonomy, the per-operation [`Context`], and the module lifecycle.

pub mod context;
pub mod error;
pub mod module;
pub mod query;
pub mod registry;
pub mod schedule;
pub mod settings;

pub use context::Context;
pub use error::{Error, Result};
pub use module::{InitCtx, Module};
pub use query::SearchParams;
pub use registry::ModuleRegistry;
