use crate::DeviceArg;
use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use kestrel_client::PsiClient;
use kestrel_core::format::format_millis;
use kestrel_core::history::HistoryStore;
use kestrel_core::session::AnalysisSession;
use std::path::Path;

pub async fn execute(
    urls: &[String],
    device: DeviceArg,
    data_dir: Option<&Path>,
    api_key: Option<String>,
) -> Result<()> {
    let Some(profile) = device.device() else {
        anyhow::bail!("benchmark audits one device profile per run; choose desktop or mobile");
    };

    tracing::info!("Benchmarking {} candidate URLs ({})", urls.len(), profile);

    let history = HistoryStore::load(super::open_store(data_dir)?);
    let mut session = AnalysisSession::new(PsiClient::new(api_key), history);

    let bar = ProgressBar::new(urls.len() as u64);
    if let Ok(template) = ProgressStyle::with_template("{bar:30.cyan} {pos}/{len} {msg}") {
        bar.set_style(template);
    }

    let results = session
        .run_benchmark(urls, profile, |_, url, error| {
            match error {
                None => bar.println(format!("  {} {}", style("ok").green(), url)),
                Some(err) => bar.println(format!(
                    "  {} {} ({})",
                    style("failed").red(),
                    url,
                    err.user_message()
                )),
            }
            bar.inc(1);
        })
        .await?;

    bar.finish_and_clear();

    println!("\n{}", style("Benchmark Results").bold().cyan());
    println!("{}", style("=================").cyan());

    if results.is_empty() {
        println!("\n  No candidate completed successfully.");
        return Ok(());
    }

    println!("\n  {:<44} {:>5} {:>8} {:>7}", "URL", "Perf", "LCP", "CLS");
    for snapshot in &results {
        println!(
            "  {:<44} {:>5} {:>8} {:>7.3}",
            snapshot.url,
            snapshot.scores.performance,
            format_millis(snapshot.metrics.largest_contentful_paint),
            snapshot.metrics.cumulative_layout_shift
        );
    }

    println!("\n  {} of {} candidates analyzed", results.len(), urls.len());

    Ok(())
}
