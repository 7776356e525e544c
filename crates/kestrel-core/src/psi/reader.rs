use super::types::AuditPayload;
use crate::Result;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub struct PayloadReader;

impl PayloadReader {
    /// Read and parse a PageSpeed report from the given path
    pub fn from_file(path: &Path) -> Result<AuditPayload> {
        tracing::debug!("Reading audit payload from: {}", path.display());

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let payload: AuditPayload = serde_json::from_reader(reader)?;

        tracing::info!("Successfully parsed audit payload from {}", path.display());

        Ok(payload)
    }

    /// Parse a PageSpeed report from a JSON string
    pub fn from_str(content: &str) -> Result<AuditPayload> {
        tracing::debug!("Parsing audit payload from string");

        let payload: AuditPayload = serde_json::from_str(content)?;

        Ok(payload)
    }
}
