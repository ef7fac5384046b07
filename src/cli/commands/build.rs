//! Build command - embed every matching file in a project

use crate::cli::args::BuildArgs;
use crate::cli::commands::{open_store, resolve_root, secondary_dir};
use crate::compute::{ContentLoader, DirCache, FsLoader, NoSecondary, Producer, SecondaryCache};
use crate::config::Config;
use crate::discovery::discover;
use crate::error::{ComputeError, EmbedCacheError, EmbedCacheResult};
use crate::producer::{CommandProducer, Embedding};
use crate::session::Session;
use crate::ui::{self, EmbedProgress, Tone, UiContext};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info};

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config) -> EmbedCacheResult<()> {
    let ctx = UiContext::detect();
    let root = resolve_root(args.root)?;

    let mut discovery = config.discovery.clone();
    if !args.ext.is_empty() {
        discovery.extensions = args.ext;
    }

    let command: Vec<String> = match args.embed_command {
        Some(ref line) => line.split_whitespace().map(str::to_string).collect(),
        None => config.producer.command.clone(),
    };
    let producer: Arc<dyn Producer<Embedding>> = Arc::new(CommandProducer::from_command(&command)?);
    let loader: Arc<dyn ContentLoader> = Arc::new(FsLoader::new(&root));

    let secondary: Arc<dyn SecondaryCache<Embedding>> =
        if args.no_secondary || !config.secondary.enabled {
            debug!("Secondary cache disabled");
            Arc::new(NoSecondary)
        } else {
            let dir = secondary_dir(&root, config);
            debug!("Secondary cache at {}", dir.display());
            Arc::new(DirCache::<Embedding>::open(dir).await?)
        };

    let ids = discover(&root, &discovery)?;
    info!("Found {} files under {}", ids.len(), root.display());

    let mut session = Session::open(open_store(&root, &args.store, config), secondary);
    ui::header(
        &ctx,
        "build",
        &[
            ("Root", root.display().to_string()),
            ("Store", session.store().output_path().display().to_string()),
        ],
    );

    let jobs = args.jobs.unwrap_or(config.producer.concurrency).max(1);
    let progress = EmbedProgress::new(&ctx, ids.len());
    let total = ids.len();

    let failures: Vec<ComputeError> = {
        let cache = session.cache();
        let results: Vec<_> = stream::iter(ids)
            .map(|id| {
                let loader = Arc::clone(&loader);
                let producer = Arc::clone(&producer);
                async move {
                    let result = cache.resolve(id.clone(), loader, producer).await;
                    (id, result)
                }
            })
            .buffer_unordered(jobs)
            .inspect(|(id, result)| {
                progress.on_resolved(id.as_str(), result.as_ref().ok().map(|(_, how)| *how));
            })
            .collect()
            .await;

        results
            .into_iter()
            .filter_map(|(_, result)| result.err())
            .collect()
    };
    progress.finish();

    let checkpoint = session.checkpoint();
    let report = session.finish();

    ui::store_outcome(&ctx, checkpoint.merged, &report);
    for failure in &failures {
        ui::compute_failure(&ctx, failure);
    }

    if !failures.is_empty() {
        ui::summary(&ctx, Tone::Fail, &report.to_string());
        return Err(EmbedCacheError::SessionIncomplete {
            failed: failures.len(),
            total,
        });
    }

    ui::summary(&ctx, Tone::Ok, &report.to_string());
    Ok(())
}
