//! `truetag-auth` — authentication boundary for the engine's callers.
//!
//! Session issuance (registration, login, password handling) is an external
//! collaborator; the engine only needs a verified caller identity and role.
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod roles;
pub mod validator;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use roles::Role;
pub use validator::{Hs256JwtValidator, JwtValidator};
