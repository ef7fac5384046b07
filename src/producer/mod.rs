//! Embedding producers
//!
//! The cache treats the producer as opaque; this module supplies the one the
//! command line uses: an external command per resource.

pub mod command;

pub use command::CommandProducer;

/// Value stored per resource
pub type Embedding = Vec<f64>;
