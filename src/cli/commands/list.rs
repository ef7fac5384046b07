//! List command - show stored embeddings

use crate::cli::args::{ListArgs, OutputFormat};
use crate::cli::commands::{open_store, resolve_root};
use crate::config::Config;
use crate::error::EmbedCacheResult;
use crate::producer::Embedding;
use crate::store::Snapshot;
use console::style;
use serde::Serialize;

#[derive(Serialize)]
struct EntryJson<'a> {
    identifier: &'a str,
    dimensions: usize,
}

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> EmbedCacheResult<()> {
    let root = resolve_root(args.root)?;
    let store = open_store(&root, &args.store, config);
    let snapshot: Snapshot<Embedding> = store.load();

    if snapshot.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            _ => println!("No stored embeddings in {}", store.output_path().display()),
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => {
            let entries: Vec<EntryJson<'_>> = snapshot
                .iter()
                .map(|(id, value)| EntryJson {
                    identifier: id.as_str(),
                    dimensions: value.len(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Plain => {
            for (id, _) in &snapshot {
                println!("{}", id);
            }
        }
        OutputFormat::Table => print_table(&snapshot),
    }

    Ok(())
}

fn print_table(snapshot: &Snapshot<Embedding>) {
    let width = snapshot
        .iter()
        .map(|(id, _)| id.as_str().len())
        .max()
        .unwrap_or(0)
        .max("IDENTIFIER".len());

    println!(
        "{:<width$}  {}",
        style("IDENTIFIER").bold(),
        style("DIMENSIONS").bold(),
        width = width
    );
    for (id, value) in snapshot {
        println!("{:<width$}  {}", id.as_str(), value.len(), width = width);
    }
    println!();
    println!("{} entries", snapshot.len());
}
