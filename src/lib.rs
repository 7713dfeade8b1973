//! Bookstore back-office service: entity stores, order pricing, and sales
//! reports behind an HTTP API.

pub mod app;
pub mod modules;

pub use modules::{Services, Stores};
