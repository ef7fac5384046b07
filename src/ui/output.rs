//! Command output
//!
//! Every line carries a [`Tone`]. Interactive terminals get cliclack log
//! lines; anything else gets `[TAG] message` lines on stdout so the output
//! stays greppable in CI logs.

use super::context::UiContext;
use crate::error::ComputeError;
use crate::session::SessionReport;
use console::{style, StyledObject};

/// Severity of an output line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Ok,
    Info,
    Warn,
    Fail,
}

impl Tone {
    fn tag(self) -> StyledObject<&'static str> {
        match self {
            Tone::Ok => style("[OK]").green(),
            Tone::Info => style("[INFO]").cyan(),
            Tone::Warn => style("[WARN]").yellow(),
            Tone::Fail => style("[FAIL]").red(),
        }
    }

    fn paint(self, message: &str) -> StyledObject<&str> {
        let styled = style(message).bold();
        match self {
            Tone::Ok => styled.green(),
            Tone::Info => styled.cyan(),
            Tone::Warn => styled.yellow(),
            Tone::Fail => styled.red(),
        }
    }
}

/// Command banner followed by its location fields
pub fn header(ctx: &UiContext, command: &str, fields: &[(&str, String)]) {
    let title = format!("embedcache {}", command);
    if ctx.is_fancy() {
        cliclack::intro(style(title).cyan().bold()).ok();
        for (key, value) in fields {
            println!("  {}: {}", style(key).dim(), value);
        }
    } else {
        println!("{}", title);
        for (key, value) in fields {
            println!("  {}: {}", key, value);
        }
        println!();
    }
}

/// One progress line inside a command
pub fn line(ctx: &UiContext, tone: Tone, message: &str) {
    if !ctx.is_fancy() {
        println!("  {} {}", tone.tag(), message);
        return;
    }

    let _ = match tone {
        Tone::Ok => cliclack::log::success(message),
        Tone::Info => cliclack::log::info(message),
        Tone::Warn => cliclack::log::warning(message),
        Tone::Fail => cliclack::log::error(message),
    };
}

/// Closing line of a command
pub fn summary(ctx: &UiContext, tone: Tone, message: &str) {
    if ctx.is_fancy() {
        cliclack::outro(tone.paint(message)).ok();
    } else {
        println!();
        println!("{} {}", tone.tag(), message);
    }
}

/// `<identifier>: <cause>` for one identifier that could not be embedded
pub fn compute_failure(ctx: &UiContext, failure: &ComputeError) {
    line(ctx, Tone::Fail, &failure_line(failure));
}

fn failure_line(failure: &ComputeError) -> String {
    let cause = std::error::Error::source(failure)
        .map(|source| source.to_string())
        .unwrap_or_else(|| failure.to_string());
    format!("{}: {}", failure.identifier(), cause)
}

/// What happened to the durable store at the end of a build
pub fn store_outcome(ctx: &UiContext, merged: usize, report: &SessionReport) {
    match (merged, report.published) {
        (0, _) => line(ctx, Tone::Info, "Store already up to date"),
        (n, true) => line(ctx, Tone::Ok, &format!("Saved {} new embeddings", n)),
        (n, false) => line(
            ctx,
            Tone::Warn,
            &format!("{} new embeddings could not be saved to the store", n),
        ),
    }
}
