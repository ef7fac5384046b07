//! UI module for consistent CLI output
//!
//! Uses `cliclack` log lines and `indicatif` progress bars in interactive
//! terminals, with plain-text fallback in CI/non-interactive environments.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{compute_failure, header, line, store_outcome, summary, Tone};
pub use progress::EmbedProgress;
