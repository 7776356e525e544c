use anyhow::Result;
use console::style;
use kestrel_core::format::format_millis;
use kestrel_core::history::{HistoryStore, ImplementedOpportunities};
use std::path::Path;

pub fn execute(mark: Option<&str>, unmark: Option<&str>, data_dir: Option<&Path>) -> Result<()> {
    let mut implemented = ImplementedOpportunities::load(super::open_store(data_dir)?);

    if let Some(id) = mark {
        if implemented.mark(id)? {
            println!("Marked {} as implemented", id);
        } else {
            println!("{} was already marked", id);
        }
    }

    if let Some(id) = unmark {
        if implemented.unmark(id)? {
            println!("Cleared implemented marker for {}", id);
        } else {
            println!("{} was not marked", id);
        }
    }

    let history = HistoryStore::load(super::open_store(data_dir)?);
    let Some(latest) = history.load_all().first() else {
        println!("No analysis history yet; markers apply to future results.");
        return Ok(());
    };

    println!("\n{}", style("Opportunities").bold().cyan());
    println!("{}", style("=============").cyan());
    println!("\n  {} ({})\n", latest.url, latest.device);

    if latest.opportunities.is_empty() {
        println!("  No major opportunities found.");
        return Ok(());
    }

    for opportunity in &latest.opportunities {
        let marker = if implemented.contains(&opportunity.id) {
            style("done").green()
        } else {
            style("open").yellow()
        };
        println!(
            "  [{}] {:<52} save {}",
            marker,
            format!("{} ({})", opportunity.title, opportunity.id),
            format_millis(opportunity.savings)
        );
    }

    Ok(())
}
