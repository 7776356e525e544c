use crate::ExportFormat;
use anyhow::Result;
use kestrel_core::export::{CsvExport, JsonExport, PdfExport};
use kestrel_core::history::HistoryStore;
use std::path::{Path, PathBuf};

pub fn execute(format: ExportFormat, output: Option<&Path>, data_dir: Option<&Path>) -> Result<()> {
    let history = HistoryStore::load(super::open_store(data_dir)?);
    let entries = history.load_all();

    let Some(latest) = entries.first() else {
        anyhow::bail!("nothing to export; run `kestrel analyze <url>` first");
    };

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(format));

    match format {
        ExportFormat::Json => JsonExport::to_file(latest, &path)?,
        ExportFormat::Csv => CsvExport::to_file(entries, &path)?,
        ExportFormat::Pdf => PdfExport::to_file(latest, &path)?,
    }

    println!("Export written to: {}", path.display());

    Ok(())
}

fn default_output(format: ExportFormat) -> PathBuf {
    let date = chrono::Utc::now().format("%Y-%m-%d");
    PathBuf::from(format!("kestrel-report-{}.{}", date, format.extension()))
}
