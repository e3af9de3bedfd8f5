//! `truetag-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the domain error taxonomy, and the shared value
//! objects used by the authenticity/return engine.

pub mod error;
pub mod id;
pub mod label;
pub mod trust;

pub use error::{DomainError, DomainResult};
pub use id::{ProductId, ReturnAttemptId, UserId};
pub use label::LabelRegion;
pub use trust::TrustScore;
