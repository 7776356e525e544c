use crate::analysis::{CategoryScores, MetricsSnapshot};
use crate::format::{format_millis, format_timestamp};
use crate::{Error, Result};
use chrono::Utc;
use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rgb};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Threshold color for a 0-100 score (90 / 50 boundaries)
pub fn score_color(score: u8) -> &'static str {
    if score >= 90 {
        "rgb(34, 197, 94)"
    } else if score >= 50 {
        "rgb(245, 158, 11)"
    } else {
        "rgb(239, 68, 68)"
    }
}

/// Threshold label for a 0-100 score
pub fn score_label(score: u8) -> &'static str {
    if score >= 90 {
        "Fast"
    } else if score >= 50 {
        "Average"
    } else {
        "Slow"
    }
}

/// One derived score entry of the JSON export document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub name: &'static str,
    pub score: u8,
    pub color: &'static str,
    pub category: &'static str,
}

pub fn performance_scores(scores: &CategoryScores) -> Vec<ScoreEntry> {
    vec![
        ScoreEntry {
            name: "Performance",
            score: scores.performance,
            color: score_color(scores.performance),
            category: "Core Vitals",
        },
        ScoreEntry {
            name: "Accessibility",
            score: scores.accessibility,
            color: score_color(scores.accessibility),
            category: "User Experience",
        },
        ScoreEntry {
            name: "Best Practices",
            score: scores.best_practices,
            color: score_color(scores.best_practices),
            category: "Standards",
        },
        ScoreEntry {
            name: "SEO",
            score: scores.seo,
            color: score_color(scores.seo),
            category: "Search",
        },
    ]
}

#[derive(Debug, Clone, Serialize)]
struct CoreWebVitals {
    fcp: f64,
    lcp: f64,
    fid: f64,
    inp: f64,
    cls: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    #[serde(flatten)]
    snapshot: &'a MetricsSnapshot,
    exported_at: String,
    performance_scores: Vec<ScoreEntry>,
    core_web_vitals: CoreWebVitals,
}

pub struct JsonExport;

impl JsonExport {
    /// Full snapshot plus the derived score entries and the Core Web
    /// Vitals convenience subset, pretty-printed
    pub fn to_string(snapshot: &MetricsSnapshot) -> Result<String> {
        let document = ExportDocument {
            snapshot,
            exported_at: Utc::now().to_rfc3339(),
            performance_scores: performance_scores(&snapshot.scores),
            core_web_vitals: CoreWebVitals {
                fcp: snapshot.metrics.first_contentful_paint,
                lcp: snapshot.metrics.largest_contentful_paint,
                fid: snapshot.metrics.first_input_delay,
                inp: snapshot.metrics.interaction_to_next_paint,
                cls: snapshot.metrics.cumulative_layout_shift,
            },
        };

        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn to_file(snapshot: &MetricsSnapshot, path: &Path) -> Result<()> {
        tracing::debug!("Writing JSON export to: {}", path.display());
        std::fs::write(path, Self::to_string(snapshot)?)?;
        Ok(())
    }
}

/// Column headers of the history CSV export
pub const CSV_COLUMNS: [&str; 12] = [
    "Date",
    "Device",
    "Performance",
    "Accessibility",
    "Best Practices",
    "SEO",
    "FCP (ms)",
    "LCP (ms)",
    "CLS",
    "INP (ms)",
    "Speed Index (ms)",
    "Total Blocking Time (ms)",
];

pub struct CsvExport;

impl CsvExport {
    /// One quoted row per history entry, newest first
    pub fn to_string(entries: &[MetricsSnapshot]) -> String {
        let mut output = String::new();
        push_row(&mut output, CSV_COLUMNS.iter().map(|column| column.to_string()));

        for entry in entries {
            push_row(
                &mut output,
                [
                    format_timestamp(entry.timestamp),
                    entry.device.to_string(),
                    entry.scores.performance.to_string(),
                    entry.scores.accessibility.to_string(),
                    entry.scores.best_practices.to_string(),
                    entry.scores.seo.to_string(),
                    format!("{:.0}", entry.metrics.first_contentful_paint),
                    format!("{:.0}", entry.metrics.largest_contentful_paint),
                    format!("{:.3}", entry.metrics.cumulative_layout_shift),
                    format!("{:.0}", entry.metrics.interaction_to_next_paint),
                    format!("{:.0}", entry.metrics.speed_index),
                    format!("{:.0}", entry.metrics.total_blocking_time),
                ]
                .into_iter(),
            );
        }

        output
    }

    pub fn to_file(entries: &[MetricsSnapshot], path: &Path) -> Result<()> {
        tracing::debug!("Writing CSV export to: {}", path.display());
        std::fs::write(path, Self::to_string(entries))?;
        Ok(())
    }
}

fn push_row(output: &mut String, values: impl Iterator<Item = String>) {
    let quoted: Vec<String> = values.map(|value| format!("\"{}\"", value)).collect();
    output.push_str(&quoted.join(","));
    output.push('\n');
}

pub struct PdfExport;

impl PdfExport {
    /// Single-page report: URL, date, device, category scores with
    /// threshold colors, Core Web Vitals with thresholds, top opportunities
    pub fn to_file(snapshot: &MetricsSnapshot, path: &Path) -> Result<()> {
        tracing::debug!("Writing PDF report to: {}", path.display());

        let (doc, page, layer) =
            PdfDocument::new("Kestrel Performance Report", Mm(210.0), Mm(297.0), "report");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);

        let mut page = PageWriter::new(layer);

        page.line(&bold, 18.0, "Performance Report");
        page.gap(4.0);
        page.line(&regular, 11.0, &format!("URL:     {}", snapshot.url));
        page.line(
            &regular,
            11.0,
            &format!("Date:    {}", format_timestamp(snapshot.timestamp)),
        );
        page.line(&regular, 11.0, &format!("Device:  {}", snapshot.device));

        page.gap(6.0);
        page.line(&bold, 13.0, "Category Scores");
        for entry in performance_scores(&snapshot.scores) {
            page.set_color(score_rgb(entry.score));
            page.line(
                &regular,
                11.0,
                &format!("{:<16} {:>3}  ({})", entry.name, entry.score, score_label(entry.score)),
            );
        }
        page.set_color((0.0, 0.0, 0.0));

        page.gap(6.0);
        page.line(&bold, 13.0, "Core Web Vitals");
        let metrics = &snapshot.metrics;
        page.line(
            &regular,
            11.0,
            &format!(
                "{:<28} {:>8}   Good: < 1.8s   [{}]",
                "First Contentful Paint",
                format_millis(metrics.first_contentful_paint),
                metrics.fcp_rating().label()
            ),
        );
        page.line(
            &regular,
            11.0,
            &format!(
                "{:<28} {:>8}   Good: < 2.5s   [{}]",
                "Largest Contentful Paint",
                format_millis(metrics.largest_contentful_paint),
                metrics.lcp_rating().label()
            ),
        );
        page.line(
            &regular,
            11.0,
            &format!(
                "{:<28} {:>8}   Good: < 200ms  [{}]",
                "Interaction to Next Paint",
                format_millis(metrics.interaction_to_next_paint),
                metrics.inp_rating().label()
            ),
        );
        page.line(
            &regular,
            11.0,
            &format!(
                "{:<28} {:>8.3}   Good: < 0.1    [{}]",
                "Cumulative Layout Shift",
                metrics.cumulative_layout_shift,
                metrics.cls_rating().label()
            ),
        );

        page.gap(6.0);
        page.line(&bold, 13.0, "Top Opportunities");
        if snapshot.opportunities.is_empty() {
            page.line(&regular, 11.0, "No major opportunities found.");
        }
        for opportunity in snapshot.opportunities.iter().take(5) {
            page.line(
                &regular,
                11.0,
                &format!(
                    "- {} (save {})",
                    opportunity.title,
                    format_millis(opportunity.savings)
                ),
            );
        }

        doc.save(&mut BufWriter::new(File::create(path)?))
            .map_err(pdf_error)?;

        Ok(())
    }
}

fn pdf_error(err: printpdf::Error) -> Error {
    Error::Pdf(err.to_string())
}

fn score_rgb(score: u8) -> (f64, f64, f64) {
    if score >= 90 {
        (0.13, 0.77, 0.37)
    } else if score >= 50 {
        (0.96, 0.62, 0.04)
    } else {
        (0.94, 0.27, 0.27)
    }
}

/// Tracks the vertical cursor while laying out report lines top-down
struct PageWriter {
    layer: PdfLayerReference,
    y: f64,
}

impl PageWriter {
    fn new(layer: PdfLayerReference) -> Self {
        Self { layer, y: 280.0 }
    }

    fn line(&mut self, font: &IndirectFontRef, size: f64, text: &str) {
        self.layer.use_text(text, size, Mm(18.0), Mm(self.y), font);
        self.y -= size * 0.6;
    }

    fn gap(&mut self, amount: f64) {
        self.y -= amount;
    }

    fn set_color(&mut self, (r, g, b): (f64, f64, f64)) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
    }
}
