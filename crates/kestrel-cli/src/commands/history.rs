use crate::OutputFormat;
use anyhow::Result;
use console::style;
use kestrel_core::format::{format_millis, format_timestamp};
use kestrel_core::history::HistoryStore;
use std::path::Path;

pub fn execute(format: OutputFormat, limit: Option<usize>, data_dir: Option<&Path>) -> Result<()> {
    let history = HistoryStore::load(super::open_store(data_dir)?);
    let entries = history.load_all();
    let shown = limit.unwrap_or(entries.len()).min(entries.len());
    let entries = &entries[..shown];

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(entries)?),
        OutputFormat::Pretty => {
            if entries.is_empty() {
                println!("No analysis history yet. Run `kestrel analyze <url>` first.");
                return Ok(());
            }

            println!("\n{}", style("Analysis History").bold().cyan());
            println!("{}", style("================").cyan());

            println!(
                "\n  {:<17} {:<8} {:>5} {:>8} {:>7}  {}",
                "Date", "Device", "Perf", "LCP", "CLS", "URL"
            );
            for entry in entries {
                println!(
                    "  {:<17} {:<8} {:>5} {:>8} {:>7.3}  {}",
                    format_timestamp(entry.timestamp),
                    entry.device,
                    entry.scores.performance,
                    format_millis(entry.metrics.largest_contentful_paint),
                    entry.metrics.cumulative_layout_shift,
                    entry.url
                );
            }

            println!("\n  {} entries", entries.len());
        }
    }

    Ok(())
}
