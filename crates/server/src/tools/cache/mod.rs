//! Cache-related MCP tools.
//!
//! This module provides read-only views of the response stores.

pub mod get;
pub mod stores;

pub use get::{CacheGetParams, get_impl};
pub use stores::stores_impl;
