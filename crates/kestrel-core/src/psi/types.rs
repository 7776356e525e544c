use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level PageSpeed Insights response for one (URL, device) run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditPayload {
    #[serde(rename = "lighthouseResult", skip_serializing_if = "Option::is_none")]
    pub lighthouse_result: Option<LighthouseResult>,
    #[serde(rename = "loadingExperience", skip_serializing_if = "Option::is_none")]
    pub loading_experience: Option<LoadingExperience>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
}

/// Lab data section produced by the Lighthouse run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LighthouseResult {
    #[serde(rename = "requestedUrl", skip_serializing_if = "Option::is_none")]
    pub requested_url: Option<String>,
    #[serde(rename = "finalUrl", skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Categories>,
    /// Keyed by audit id; a BTreeMap keeps iteration order deterministic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audits: Option<BTreeMap<String, Audit>>,
}

/// Category scores requested with the audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Categories {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<Category>,
    #[serde(rename = "best-practices", skip_serializing_if = "Option::is_none")]
    pub best_practices: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo: Option<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Fractional score in [0, 1]; null when not applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A single Lighthouse audit result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(rename = "scoreDisplayMode", skip_serializing_if = "Option::is_none")]
    pub score_display_mode: Option<String>,
    #[serde(rename = "numericValue", skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,
    #[serde(rename = "displayValue", skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<AuditDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditDetails {
    #[serde(rename = "overallSavingsMs", skip_serializing_if = "Option::is_none")]
    pub overall_savings_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<DetailItem>>,
    /// Image payload of the final-screenshot audit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// One row of an audit's detail table. The service emits two naming
/// conventions for the timing fields; both are modeled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "resourceType", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(rename = "transferSize", skip_serializing_if = "Option::is_none")]
    pub transfer_size: Option<u64>,
    #[serde(rename = "resourceSize", skip_serializing_if = "Option::is_none")]
    pub resource_size: Option<u64>,
    #[serde(rename = "requestCount", skip_serializing_if = "Option::is_none")]
    pub request_count: Option<u64>,
    #[serde(rename = "startTimeMs", skip_serializing_if = "Option::is_none")]
    pub start_time_ms: Option<f64>,
    #[serde(rename = "startTime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(rename = "endTimeMs", skip_serializing_if = "Option::is_none")]
    pub end_time_ms: Option<f64>,
    #[serde(rename = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    #[serde(rename = "durationMs", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Image payload of screenshot-thumbnail rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Error envelope the API can return inside a successful HTTP response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Field data (real-user percentiles) from the Chrome UX Report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingExperience {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<FieldMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetrics {
    #[serde(
        rename = "CUMULATIVE_LAYOUT_SHIFT_SCORE",
        skip_serializing_if = "Option::is_none"
    )]
    pub cumulative_layout_shift_score: Option<FieldPercentile>,
    #[serde(
        rename = "FIRST_CONTENTFUL_PAINT_MS",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_contentful_paint_ms: Option<FieldPercentile>,
    #[serde(
        rename = "FIRST_INPUT_DELAY_MS",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_input_delay_ms: Option<FieldPercentile>,
    #[serde(
        rename = "LARGEST_CONTENTFUL_PAINT_MS",
        skip_serializing_if = "Option::is_none"
    )]
    pub largest_contentful_paint_ms: Option<FieldPercentile>,
    #[serde(
        rename = "INTERACTION_TO_NEXT_PAINT_MS",
        skip_serializing_if = "Option::is_none"
    )]
    pub interaction_to_next_paint_ms: Option<FieldPercentile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPercentile {
    pub category: String,
    pub percentile: f64,
}
