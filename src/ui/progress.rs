//! Progress indicator for embedding runs

use super::context::UiContext;
use crate::compute::Resolution;
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over the resources of one build.
///
/// Shows an indicatif bar in interactive mode and stays silent otherwise;
/// per-resource detail is available through `-vv` logging.
pub struct EmbedProgress {
    bar: Option<ProgressBar>,
}

impl EmbedProgress {
    pub fn new(ctx: &UiContext, total: usize) -> Self {
        let bar = if ctx.is_fancy() {
            let bar = ProgressBar::new(total as u64);
            let template = ProgressStyle::default_bar()
                .template("  {spinner:.cyan} Embedding  {bar:20.cyan/dim} {pos}/{len} {msg:.dim}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(template.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ").progress_chars("━╸─"));
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            Some(bar)
        } else {
            None
        };
        Self { bar }
    }

    /// Record one finished resource
    pub fn on_resolved(&self, id: &str, resolution: Option<Resolution>) {
        if let Some(ref bar) = self.bar {
            let label = match resolution {
                Some(Resolution::Durable) => "stored",
                Some(Resolution::Secondary) => "cached",
                Some(Resolution::Computed) => "generated",
                Some(Resolution::Session) => "shared",
                None => "failed",
            };
            bar.set_message(format!("{} ({})", truncate(id, 48), label));
            bar.inc(1);
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

/// Keep the tail of long identifiers, where the file name is
fn truncate(id: &str, max: usize) -> String {
    let count = id.chars().count();
    if count <= max {
        return id.to_string();
    }
    let tail: String = id.chars().skip(count - (max - 3)).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_non_interactive() {
        let ctx = UiContext::plain();
        let progress = EmbedProgress::new(&ctx, 2);
        progress.on_resolved("src/a.ts", Some(Resolution::Computed));
        progress.on_resolved("src/b.ts", None);
        progress.finish();
        // Should not panic
    }

    #[test]
    fn truncate_keeps_tail() {
        assert_eq!(truncate("src/a.ts", 48), "src/a.ts");
        let long = format!("{}/file.ts", "d".repeat(60));
        let short = truncate(&long, 20);
        assert_eq!(short.chars().count(), 20);
        assert!(short.starts_with("..."));
        assert!(short.ends_with("/file.ts"));
    }
}
