use crate::{DeviceArg, OutputFormat};
use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use kestrel_client::PsiClient;
use kestrel_core::analysis::{Device, MetricsSnapshot, Rating};
use kestrel_core::export::{self, JsonExport};
use kestrel_core::format::{format_bytes, format_millis, format_timestamp};
use kestrel_core::history::{HistoryStore, ImplementedOpportunities, JsonFileStore};
use kestrel_core::psi::PayloadReader;
use kestrel_core::session::{AnalysisSession, DualReport};
use std::path::Path;
use std::time::Duration;

enum Outcome {
    Single(MetricsSnapshot),
    Dual(DualReport),
}

pub async fn execute(
    url: &str,
    device: DeviceArg,
    payload: Option<&Path>,
    format: OutputFormat,
    output: Option<&Path>,
    data_dir: Option<&Path>,
    api_key: Option<String>,
) -> Result<()> {
    let history = HistoryStore::load(super::open_store(data_dir)?);
    let mut session = AnalysisSession::new(PsiClient::new(api_key), history);

    let outcome = if let Some(payload_path) = payload {
        tracing::info!("Extracting metrics from payload: {}", payload_path.display());
        let report = PayloadReader::from_file(payload_path)?;
        let target_device = device.device().unwrap_or(Device::Desktop);
        Outcome::Single(session.run_payload(&report, url, target_device)?)
    } else {
        run_audit(&mut session, url, device).await?
    };

    let implemented = ImplementedOpportunities::load(super::open_store(data_dir)?);

    let (primary, companion) = match &outcome {
        Outcome::Single(snapshot) => (snapshot, None),
        Outcome::Dual(report) => (report.primary(), Some(&report.mobile)),
    };

    match format {
        OutputFormat::Json => println!("{}", JsonExport::to_string(primary)?),
        OutputFormat::Pretty => print_pretty(primary, companion, &implemented),
    }

    if let Some(path) = output {
        JsonExport::to_file(primary, path)?;
        println!("Report written to: {}", path.display());
    }

    Ok(())
}

async fn run_audit(
    session: &mut AnalysisSession<PsiClient, JsonFileStore>,
    url: &str,
    device: DeviceArg,
) -> Result<Outcome> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        spinner.set_style(template);
    }
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("Running performance audit via PageSpeed Insights...");

    let result = match device.device() {
        Some(profile) => session.run_single(url, profile).await.map(Outcome::Single),
        None => session.run_dual(url).await.map(Outcome::Dual),
    };

    spinner.finish_and_clear();

    match result {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            tracing::error!("Analysis failed: {}", err);
            anyhow::bail!("{}", err.user_message())
        }
    }
}

fn print_pretty(
    snapshot: &MetricsSnapshot,
    companion: Option<&MetricsSnapshot>,
    implemented: &ImplementedOpportunities<JsonFileStore>,
) {
    println!("\n{}", style("Performance Report").bold().cyan());
    println!("{}", style("==================").cyan());

    println!("\n  URL:     {}", snapshot.url);
    println!("  Device:  {}", snapshot.device);
    println!("  Date:    {}", format_timestamp(snapshot.timestamp));

    println!("\n{}", style("Scores:").bold());
    for entry in export::performance_scores(&snapshot.scores) {
        println!(
            "  {:<16} {:>3}  {}",
            entry.name,
            styled_score(entry.score),
            style(export::score_label(entry.score)).dim()
        );
    }
    println!("  {:<16} {:>3}", "Overall", snapshot.scores.average());

    let metrics = &snapshot.metrics;
    println!("\n{}", style("Core Web Vitals:").bold());
    println!(
        "  {:<28} {:>8}  {}",
        "First Contentful Paint",
        format_millis(metrics.first_contentful_paint),
        rating_badge(metrics.fcp_rating())
    );
    println!(
        "  {:<28} {:>8}  {}",
        "Largest Contentful Paint",
        format_millis(metrics.largest_contentful_paint),
        rating_badge(metrics.lcp_rating())
    );
    println!(
        "  {:<28} {:>8}  {}",
        "Interaction to Next Paint",
        format_millis(metrics.interaction_to_next_paint),
        rating_badge(metrics.inp_rating())
    );
    println!(
        "  {:<28} {:>8.3}  {}",
        "Cumulative Layout Shift",
        metrics.cumulative_layout_shift,
        rating_badge(metrics.cls_rating())
    );
    println!(
        "  {:<28} {:>8}  {}",
        "Speed Index",
        format_millis(metrics.speed_index),
        rating_badge(metrics.speed_index_rating())
    );
    println!(
        "  {:<28} {:>8}",
        "Total Blocking Time",
        format_millis(metrics.total_blocking_time)
    );

    let resources = &snapshot.resource_summary;
    println!("\n{}", style("Resources:").bold());
    println!("  Total Size:    {}", format_bytes(resources.total_size));
    println!("  Images:        {}", format_bytes(resources.image_size));
    println!("  Scripts:       {}", format_bytes(resources.script_size));
    println!("  Stylesheets:   {}", format_bytes(resources.stylesheet_size));
    println!("  Other:         {}", format_bytes(resources.other_size()));
    println!("  Requests:      {}", resources.resource_count);

    if let Some(experience) = &snapshot.loading_experience
        && let Some(category) = &experience.overall_category
    {
        println!("\n{} {}", style("Field Data:").bold(), category);
    }

    if !snapshot.opportunities.is_empty() {
        println!("\n{}", style("Top Opportunities:").bold());
        for (index, opportunity) in snapshot.opportunities.iter().enumerate() {
            let marker = if implemented.contains(&opportunity.id) {
                format!("  {}", style("[done]").green())
            } else {
                String::new()
            };
            println!(
                "  {}. [save {}] {}{}",
                index + 1,
                format_millis(opportunity.savings),
                opportunity.title,
                marker
            );
        }
    }

    if let Some(mobile) = companion {
        println!(
            "\n{} performance {} (LCP {}, CLS {:.3})",
            style("Mobile:").bold(),
            styled_score(mobile.scores.performance),
            format_millis(mobile.metrics.largest_contentful_paint),
            mobile.metrics.cumulative_layout_shift
        );
    }

    println!(); // trailing newline
}

fn styled_score(score: u8) -> console::StyledObject<u8> {
    if score >= 90 {
        style(score).green().bold()
    } else if score >= 50 {
        style(score).yellow().bold()
    } else {
        style(score).red().bold()
    }
}

fn rating_badge(rating: Rating) -> console::StyledObject<&'static str> {
    match rating {
        Rating::Good => style(rating.label()).green(),
        Rating::NeedsImprovement => style(rating.label()).yellow(),
        Rating::Poor => style(rating.label()).red(),
    }
}
