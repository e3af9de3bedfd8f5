//! `truetag-engine` — product authenticity & return-arbitration core.
//!
//! The engine owns the product lifecycle state machine
//! (`created → activated → returned`), the repository contract it mutates
//! state through, and the arbitration policy that turns an external trust
//! signal into an approve/deny outcome. It holds no state of its own between
//! calls beyond configuration; all durable state lives behind
//! [`ProductRepository`].

pub mod config;
pub mod lifecycle;
pub mod product;
pub mod repository;
pub mod returns;
pub mod verify;

pub use config::EngineConfig;
pub use lifecycle::{NewProduct, ProductLifecycle, ProductPage};
pub use product::{Product, ProductStatus, ProductSummary, ReturnAttempt};
pub use repository::{ProductRepository, RepositoryError};
pub use returns::{ReturnArbitrator, ReturnHistoryEntry, ReturnOutcome};
pub use verify::{VerificationResult, Verifier};
