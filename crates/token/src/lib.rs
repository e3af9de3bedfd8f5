//! `truetag-token` — product token generation and verification.
//!
//! Two token classes:
//! - **identity tokens**: 256-bit random credentials minted once per product
//!   at registration and printed into the physical tag;
//! - **action tokens**: keyed MACs over `subject ‖ timestamp`, proving a
//!   specific action was authorized at a specific time without persisting a
//!   per-action secret.

mod service;

pub use service::{IdentityToken, TokenService};
