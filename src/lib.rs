//! Zephyre Catalog Gateway Library
//!
//! This library provides a resilient REST gateway over a third-party anime
//! catalog aggregation API: identifier normalization, fallback resolution
//! across mirror domains, response shape normalization, stream mirror
//! selection, and a best-effort report relay.

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod identifier;
pub mod models;
pub mod normalize;
pub mod relay;
pub mod resolver;
pub mod routes;
pub mod stream;
