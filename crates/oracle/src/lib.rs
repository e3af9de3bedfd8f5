//! `truetag-oracle` — external scoring services, consumed as opaque oracles.
//!
//! Two request/response contracts: the trust oracle scores how legitimate a
//! return request looks, the label oracle scores how well a photographed
//! label matches its expected placement. Both are consulted with a bounded
//! timeout; how the scores are computed is out of scope here.

pub mod contract;
pub mod http;

pub use contract::{
    LabelOracle, LabelRequest, LabelResponse, OracleError, TrustOracle, TrustRequest,
    TrustResponse,
};
pub use http::HttpOracleClient;
