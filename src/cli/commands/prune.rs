//! Prune command - drop stored embeddings for files that no longer exist

use crate::cli::args::PruneArgs;
use crate::cli::commands::{open_store, resolve_root};
use crate::compute::NoSecondary;
use crate::config::Config;
use crate::error::EmbedCacheResult;
use crate::identifier::Identifier;
use crate::producer::Embedding;
use crate::session::Session;
use crate::store::Snapshot;
use crate::ui::{self, Tone, UiContext};
use std::path::Path;
use std::sync::Arc;

fn still_exists(root: &Path, id: &Identifier) -> bool {
    id.resolve(root).is_file()
}

/// Execute the prune command
pub async fn execute(args: PruneArgs, config: &Config) -> EmbedCacheResult<()> {
    let ctx = UiContext::detect();
    let root = resolve_root(args.root)?;
    let store = open_store(&root, &args.store, config);

    ui::header(
        &ctx,
        "prune",
        &[("Store", store.output_path().display().to_string())],
    );

    if args.dry_run {
        let snapshot: Snapshot<Embedding> = store.load();
        let stale: Vec<&Identifier> = snapshot
            .iter()
            .map(|(id, _)| id)
            .filter(|id| !still_exists(&root, id))
            .collect();

        if stale.is_empty() {
            ui::summary(&ctx, Tone::Ok, "Nothing to prune");
            return Ok(());
        }
        for id in &stale {
            ui::line(&ctx, Tone::Info, &format!("Would remove {}", id));
        }
        ui::summary(
            &ctx,
            Tone::Warn,
            &format!("{} stale entries (dry run)", stale.len()),
        );
        return Ok(());
    }

    let mut session = Session::<Embedding>::open(store, Arc::new(NoSecondary));
    let removed = session.prune(|id| still_exists(&root, id));
    let report = session.finish();

    if removed.is_empty() {
        ui::summary(&ctx, Tone::Ok, "Nothing to prune");
        return Ok(());
    }

    for id in &removed {
        ui::line(&ctx, Tone::Ok, &format!("Removed {}", id));
    }
    if report.published {
        ui::summary(
            &ctx,
            Tone::Ok,
            &format!(
                "Pruned {} entries ({} remaining)",
                report.pruned, report.total_entries
            ),
        );
    } else {
        ui::summary(
            &ctx,
            Tone::Warn,
            "Store could not be updated; nothing was removed",
        );
    }
    Ok(())
}
