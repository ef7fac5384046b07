//! embedcache - persistent embedding cache
//!
//! Keeps one embedding per source file in a JSON store, computes missing
//! entries at most once per session, and publishes new results with an
//! atomic replace.

pub mod cli;
pub mod compute;
pub mod config;
pub mod discovery;
pub mod error;
pub mod identifier;
pub mod producer;
pub mod session;
pub mod store;
pub mod ui;

pub use error::{EmbedCacheError, EmbedCacheResult};
pub use identifier::Identifier;
