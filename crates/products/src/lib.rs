//! Products domain module.
//!
//! This crate contains business rules for the product catalog, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod page;
pub mod product;
pub mod validation;

pub use page::{Page, PageRequest};
pub use product::{NewProduct, Product, ProductUpdate};
pub use validation::messages;
