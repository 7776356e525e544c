use crate::{Error, Result};
use url::Url;

/// Prepare a user-supplied address for auditing. Bare hostnames get an
/// https scheme prepended; anything that still fails URL parsing is
/// rejected before any request is issued.
pub fn normalize_url(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidUrl(input.to_string()));
    }

    let candidate = if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    Url::parse(&candidate).map_err(|_| Error::InvalidUrl(input.to_string()))?;

    Ok(candidate)
}
