//! `truetag-api` — HTTP boundary over the authenticity/return engine.

pub mod app;
pub mod context;
pub mod middleware;
