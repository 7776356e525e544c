use async_trait::async_trait;
use kestrel_core::analysis::Device;
use kestrel_core::psi::AuditPayload;
use kestrel_core::session::AuditFetch;
use kestrel_core::target::normalize_url;
use kestrel_core::{Error, Result};

/// Production endpoint of the PageSpeed Insights API
pub const PAGESPEED_API_BASE: &str =
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// Environment variable an API key is read from
pub const API_KEY_ENV: &str = "PAGESPEED_API_KEY";

const CATEGORIES: [&str; 4] = ["performance", "accessibility", "best-practices", "seo"];

/// HTTP client for the PageSpeed Insights API. Exactly one outbound GET
/// per fetch; no retries and no caching at this layer.
pub struct PsiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl PsiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: PAGESPEED_API_BASE.to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
        }
    }

    /// Client configured from PAGESPEED_API_KEY, when set
    pub fn from_env() -> Self {
        Self::new(std::env::var(API_KEY_ENV).ok())
    }

    /// Point the client at a different endpoint (test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AuditFetch for PsiClient {
    async fn fetch_audit(&self, url: &str, device: Device) -> Result<AuditPayload> {
        let target = normalize_url(url)?;

        let mut query: Vec<(&str, String)> = vec![
            ("url", target.clone()),
            ("strategy", device.as_str().to_string()),
        ];
        for category in CATEGORIES {
            query.push(("category", category.to_string()));
        }
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }

        tracing::debug!("Requesting audit for {} ({})", target, device);

        let response = self
            .http
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Service {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            });
        }

        let payload: AuditPayload = response.json().await.map_err(|err| {
            if err.is_decode() {
                Error::MalformedPayload(err.to_string())
            } else {
                Error::Transport(err.to_string())
            }
        })?;

        // A well-formed error envelope can arrive inside a 200 response
        if let Some(envelope) = &payload.error {
            return Err(Error::Service {
                status: envelope.code.unwrap_or(0),
                message: envelope
                    .message
                    .clone()
                    .unwrap_or_else(|| "analysis failed".to_string()),
            });
        }

        tracing::info!("Received audit payload for {} ({})", target, device);

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_production_endpoint() {
        let client = PsiClient::new(None);
        assert_eq!(client.base_url(), PAGESPEED_API_BASE);
    }

    #[test]
    fn test_base_url_override() {
        let client = PsiClient::new(None).with_base_url("http://127.0.0.1:9999/audit");
        assert_eq!(client.base_url(), "http://127.0.0.1:9999/audit");
    }

    #[test]
    fn test_empty_api_key_is_ignored() {
        let client = PsiClient::new(Some(String::new()));
        assert!(client.api_key.is_none());
    }
}
