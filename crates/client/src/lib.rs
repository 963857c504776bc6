//! Network side of shellcache.
//!
//! This crate provides the reqwest-backed [`HttpFetcher`] the worker uses to
//! reach the origin server.

pub mod fetch;

pub use fetch::{FetchConfig, HttpFetcher};
