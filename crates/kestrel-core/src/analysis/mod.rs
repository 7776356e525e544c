mod extractor;

pub use extractor::MetricsExtractor;

use crate::psi::LoadingExperience;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Device profile an audit runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Desktop,
    Mobile,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Desktop => "desktop",
            Device::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized result of one audit run. Created once by the extractor and
/// never mutated afterwards; serialized camelCase so exports match the
/// service's own field spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub url: String,
    /// Creation time, milliseconds since epoch
    pub timestamp: i64,
    pub device: Device,
    pub scores: CategoryScores,
    pub metrics: LabMetrics,
    pub opportunities: Vec<Opportunity>,
    pub diagnostics: Vec<Diagnostic>,
    pub resource_summary: ResourceSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub network_requests: Vec<NetworkRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<Screenshots>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_experience: Option<LoadingExperience>,
}

/// Category scores, each in 0..=100
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub performance: u8,
    pub accessibility: u8,
    pub best_practices: u8,
    pub seo: u8,
}

impl CategoryScores {
    /// Mean of the four category scores, rounded
    pub fn average(&self) -> u8 {
        let total = self.performance as u16
            + self.accessibility as u16
            + self.best_practices as u16
            + self.seo as u16;
        (total as f64 / 4.0).round() as u8
    }
}

/// Lab timings in milliseconds; cumulative layout shift is a unitless ratio
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabMetrics {
    pub first_contentful_paint: f64,
    pub largest_contentful_paint: f64,
    pub first_input_delay: f64,
    pub interaction_to_next_paint: f64,
    pub cumulative_layout_shift: f64,
    pub speed_index: f64,
    pub total_blocking_time: f64,
}

impl LabMetrics {
    pub fn fcp_rating(&self) -> Rating {
        rate(self.first_contentful_paint, 1800.0, 3000.0)
    }

    pub fn lcp_rating(&self) -> Rating {
        rate(self.largest_contentful_paint, 2500.0, 4000.0)
    }

    /// INP uses a strict bound for "good" (< 200ms)
    pub fn inp_rating(&self) -> Rating {
        if self.interaction_to_next_paint < 200.0 {
            Rating::Good
        } else if self.interaction_to_next_paint <= 500.0 {
            Rating::NeedsImprovement
        } else {
            Rating::Poor
        }
    }

    pub fn cls_rating(&self) -> Rating {
        rate(self.cumulative_layout_shift, 0.1, 0.25)
    }

    pub fn speed_index_rating(&self) -> Rating {
        rate(self.speed_index, 3400.0, 5800.0)
    }
}

/// Qualitative rating of a vital against its fixed thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Good,
    NeedsImprovement,
    Poor,
}

impl Rating {
    pub fn label(&self) -> &'static str {
        match self {
            Rating::Good => "Good",
            Rating::NeedsImprovement => "Needs Work",
            Rating::Poor => "Poor",
        }
    }
}

fn rate(value: f64, good: f64, acceptable: f64) -> Rating {
    if value <= good {
        Rating::Good
    } else if value <= acceptable {
        Rating::NeedsImprovement
    } else {
        Rating::Poor
    }
}

/// A suggested optimization with an estimated savings in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub savings: f64,
    pub display_value: String,
}

/// An informational finding without a savings estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub id: String,
    pub title: String,
    pub description: String,
    pub display_value: String,
}

/// Byte totals and request count for the audited page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    pub total_size: u64,
    pub image_size: u64,
    pub script_size: u64,
    pub stylesheet_size: u64,
    pub resource_count: u64,
}

impl ResourceSummary {
    /// Bytes not attributed to images, scripts, or stylesheets; never negative
    pub fn other_size(&self) -> u64 {
        self.total_size
            .saturating_sub(self.image_size + self.script_size + self.stylesheet_size)
    }
}

/// One request of the page's network waterfall, times in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRequest {
    pub url: String,
    pub transfer_size: u64,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

impl NetworkRequest {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Load-progress thumbnails plus the optional final frame, as image data URIs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Screenshots {
    pub thumbnails: Vec<String>,
    #[serde(rename = "final", skip_serializing_if = "Option::is_none")]
    pub final_frame: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_size_clamps_to_zero() {
        let summary = ResourceSummary {
            total_size: 100,
            image_size: 80,
            script_size: 50,
            stylesheet_size: 10,
            resource_count: 4,
        };
        assert_eq!(summary.other_size(), 0);
    }

    #[test]
    fn test_other_size_remainder() {
        let summary = ResourceSummary {
            total_size: 1000,
            image_size: 400,
            script_size: 300,
            stylesheet_size: 100,
            resource_count: 12,
        };
        assert_eq!(summary.other_size(), 200);
    }

    #[test]
    fn test_ratings_at_thresholds() {
        let metrics = LabMetrics {
            first_contentful_paint: 1800.0,
            largest_contentful_paint: 4001.0,
            interaction_to_next_paint: 200.0,
            cumulative_layout_shift: 0.1,
            speed_index: 5000.0,
            ..Default::default()
        };
        assert_eq!(metrics.fcp_rating(), Rating::Good);
        assert_eq!(metrics.lcp_rating(), Rating::Poor);
        assert_eq!(metrics.inp_rating(), Rating::NeedsImprovement);
        assert_eq!(metrics.cls_rating(), Rating::Good);
        assert_eq!(metrics.speed_index_rating(), Rating::NeedsImprovement);
    }

    #[test]
    fn test_scores_average() {
        let scores = CategoryScores {
            performance: 87,
            accessibility: 92,
            best_practices: 100,
            seo: 85,
        };
        assert_eq!(scores.average(), 91);
    }

    #[test]
    fn test_device_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Device::Desktop).unwrap(), "\"desktop\"");
        assert_eq!(serde_json::to_string(&Device::Mobile).unwrap(), "\"mobile\"");
    }
}
