//! `truetag-infra` — repository implementations.
//!
//! Currently in-memory only (dev/test); a durable backend plugs in behind
//! the same [`truetag_engine::ProductRepository`] contract.

pub mod product_store;

#[cfg(test)]
mod integration_tests;

pub use product_store::InMemoryProductRepository;
