//! Session orchestration
//!
//! One session = load the durable snapshot once, serve any number of
//! requests, then merge and publish at the checkpoint.

pub mod orchestrator;
pub mod report;

pub use orchestrator::Session;
pub use report::{Checkpoint, SessionReport};
