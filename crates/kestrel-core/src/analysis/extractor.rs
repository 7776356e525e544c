use super::{
    CategoryScores, Device, Diagnostic, LabMetrics, MetricsSnapshot, NetworkRequest, Opportunity,
    ResourceSummary, Screenshots,
};
use crate::psi::{Audit, AuditPayload, Category, DetailItem};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Turns a raw audit payload into a normalized snapshot. Total over
/// well-formed payloads: individually missing leaf fields default to
/// zero/absent; only missing top-level sections are an error.
pub struct MetricsExtractor {
    max_opportunities: usize,
    max_diagnostics: usize,
    min_savings_ms: f64,
}

impl MetricsExtractor {
    pub fn new(max_opportunities: usize, max_diagnostics: usize, min_savings_ms: f64) -> Self {
        Self {
            max_opportunities,
            max_diagnostics,
            min_savings_ms,
        }
    }
}

impl Default for MetricsExtractor {
    fn default() -> Self {
        Self::new(10, 8, 100.0)
    }
}

impl MetricsExtractor {
    pub fn extract(
        &self,
        payload: &AuditPayload,
        url: &str,
        device: Device,
    ) -> Result<MetricsSnapshot> {
        tracing::debug!("Extracting metrics for {} ({})", url, device);

        let lighthouse = payload
            .lighthouse_result
            .as_ref()
            .ok_or_else(|| Error::MalformedPayload("missing lighthouseResult".to_string()))?;
        let categories = lighthouse.categories.as_ref().ok_or_else(|| {
            Error::MalformedPayload("missing lighthouseResult.categories".to_string())
        })?;
        let audits = lighthouse
            .audits
            .as_ref()
            .ok_or_else(|| Error::MalformedPayload("missing lighthouseResult.audits".to_string()))?;

        let scores = CategoryScores {
            performance: category_score(categories.performance.as_ref()),
            accessibility: category_score(categories.accessibility.as_ref()),
            best_practices: category_score(categories.best_practices.as_ref()),
            seo: category_score(categories.seo.as_ref()),
        };

        let metrics = LabMetrics {
            first_contentful_paint: numeric_value(audits, "first-contentful-paint"),
            largest_contentful_paint: numeric_value(audits, "largest-contentful-paint"),
            first_input_delay: numeric_value(audits, "max-potential-fid"),
            interaction_to_next_paint: numeric_value(audits, "interaction-to-next-paint"),
            cumulative_layout_shift: numeric_value(audits, "cumulative-layout-shift"),
            speed_index: numeric_value(audits, "speed-index"),
            total_blocking_time: numeric_value(audits, "total-blocking-time"),
        };

        let opportunities = self.collect_opportunities(audits);
        let diagnostics = self.collect_diagnostics(audits);

        tracing::info!(
            "Extraction complete for {}: performance={}, {} opportunities, {} diagnostics",
            url,
            scores.performance,
            opportunities.len(),
            diagnostics.len()
        );

        Ok(MetricsSnapshot {
            url: url.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            device,
            scores,
            metrics,
            opportunities,
            diagnostics,
            resource_summary: resource_summary(audits),
            network_requests: network_requests(audits),
            screenshots: Some(screenshots(audits)),
            loading_experience: payload.loading_experience.clone(),
        })
    }

    fn collect_opportunities(&self, audits: &BTreeMap<String, Audit>) -> Vec<Opportunity> {
        let mut opportunities: Vec<Opportunity> = audits
            .iter()
            .filter_map(|(id, audit)| {
                if audit.score_display_mode.as_deref() != Some("numeric") {
                    return None;
                }
                if !audit.numeric_value.is_some_and(|value| value > 0.0) {
                    return None;
                }
                // Audits without a savings estimate never make the list
                let savings = audit
                    .details
                    .as_ref()
                    .and_then(|details| details.overall_savings_ms)
                    .filter(|&savings| savings > self.min_savings_ms)?;
                Some(Opportunity {
                    id: id.clone(),
                    title: audit.title.clone().unwrap_or_default(),
                    description: audit.description.clone().unwrap_or_default(),
                    savings,
                    display_value: audit.display_value.clone().unwrap_or_default(),
                })
            })
            .collect();

        // Stable sort keeps encounter order between equal savings
        opportunities.sort_by(|a, b| b.savings.total_cmp(&a.savings));
        opportunities.truncate(self.max_opportunities);
        opportunities
    }

    fn collect_diagnostics(&self, audits: &BTreeMap<String, Audit>) -> Vec<Diagnostic> {
        audits
            .iter()
            .filter(|(_, audit)| {
                audit.score_display_mode.as_deref() == Some("informative")
                    && audit
                        .display_value
                        .as_deref()
                        .is_some_and(|value| !value.is_empty())
            })
            .take(self.max_diagnostics)
            .map(|(id, audit)| Diagnostic {
                id: id.clone(),
                title: audit.title.clone().unwrap_or_default(),
                description: audit.description.clone().unwrap_or_default(),
                display_value: audit.display_value.clone().unwrap_or_default(),
            })
            .collect()
    }
}

/// Fractional category score scaled to 0-100, rounded half-up
fn category_score(category: Option<&Category>) -> u8 {
    let score = category.and_then(|c| c.score).unwrap_or(0.0);
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

fn numeric_value(audits: &BTreeMap<String, Audit>, id: &str) -> f64 {
    audits
        .get(id)
        .and_then(|audit| audit.numeric_value)
        .unwrap_or(0.0)
}

fn detail_items<'a>(audits: &'a BTreeMap<String, Audit>, id: &str) -> &'a [DetailItem] {
    audits
        .get(id)
        .and_then(|audit| audit.details.as_ref())
        .and_then(|details| details.items.as_deref())
        .unwrap_or(&[])
}

fn resource_summary(audits: &BTreeMap<String, Audit>) -> ResourceSummary {
    let items = detail_items(audits, "resource-summary");

    let size_of = |resource_type: &str| {
        items
            .iter()
            .find(|item| item.resource_type.as_deref() == Some(resource_type))
            .and_then(|item| item.size)
            .unwrap_or(0)
    };

    ResourceSummary {
        total_size: items.iter().map(|item| item.size.unwrap_or(0)).sum(),
        image_size: size_of("image"),
        script_size: size_of("script"),
        stylesheet_size: size_of("stylesheet"),
        resource_count: items.iter().map(|item| item.request_count.unwrap_or(0)).sum(),
    }
}

fn network_requests(audits: &BTreeMap<String, Audit>) -> Vec<NetworkRequest> {
    detail_items(audits, "network-requests")
        .iter()
        .map(|item| {
            let start = item.start_time_ms.or(item.start_time).unwrap_or(0.0);
            let duration = item.duration_ms.or(item.duration).unwrap_or(0.0);
            let end = item.end_time_ms.or(item.end_time).unwrap_or(start + duration);
            NetworkRequest {
                url: item.url.clone().unwrap_or_default(),
                transfer_size: item.transfer_size.or(item.resource_size).unwrap_or(0),
                start_time: start,
                // Inconsistent source timings must never yield a negative duration
                end_time: end.max(start),
                resource_type: item.resource_type.clone(),
            }
        })
        .collect()
}

fn screenshots(audits: &BTreeMap<String, Audit>) -> Screenshots {
    let thumbnails = detail_items(audits, "screenshot-thumbnails")
        .iter()
        .filter_map(|item| item.data.clone())
        .filter(|data| !data.is_empty())
        .collect();

    let final_frame = audits
        .get("final-screenshot")
        .and_then(|audit| audit.details.as_ref())
        .and_then(|details| details.data.clone());

    Screenshots {
        thumbnails,
        final_frame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::psi::PayloadReader;

    fn extract(raw: &str) -> MetricsSnapshot {
        let payload = PayloadReader::from_str(raw).unwrap();
        MetricsExtractor::default()
            .extract(&payload, "https://example.com", Device::Desktop)
            .unwrap()
    }

    fn full_payload() -> &'static str {
        r#"{
            "lighthouseResult": {
                "categories": {
                    "performance": {"score": 0.873},
                    "accessibility": {"score": 0.92},
                    "best-practices": {"score": 1.0},
                    "seo": {"score": 0.845}
                },
                "audits": {
                    "first-contentful-paint": {"scoreDisplayMode": "numeric", "numericValue": 1234.5},
                    "largest-contentful-paint": {"scoreDisplayMode": "numeric", "numericValue": 2400.0},
                    "max-potential-fid": {"scoreDisplayMode": "numeric", "numericValue": 130.0},
                    "interaction-to-next-paint": {"scoreDisplayMode": "numeric", "numericValue": 180.0},
                    "cumulative-layout-shift": {"scoreDisplayMode": "numeric", "numericValue": 0.042},
                    "speed-index": {"scoreDisplayMode": "numeric", "numericValue": 3100.0},
                    "total-blocking-time": {"scoreDisplayMode": "numeric", "numericValue": 250.0},
                    "unused-javascript": {
                        "title": "Reduce unused JavaScript",
                        "description": "Remove dead code",
                        "scoreDisplayMode": "numeric",
                        "numericValue": 1200.0,
                        "displayValue": "Potential savings of 1,200 ms",
                        "details": {"overallSavingsMs": 1200.0}
                    },
                    "render-blocking-resources": {
                        "title": "Eliminate render-blocking resources",
                        "description": "Defer non-critical resources",
                        "scoreDisplayMode": "numeric",
                        "numericValue": 450.0,
                        "displayValue": "Potential savings of 450 ms",
                        "details": {"overallSavingsMs": 450.0}
                    },
                    "uses-text-compression": {
                        "title": "Enable text compression",
                        "description": "Compress responses",
                        "scoreDisplayMode": "numeric",
                        "numericValue": 150.0,
                        "details": {"overallSavingsMs": 150.0}
                    },
                    "unused-css-rules": {
                        "title": "Reduce unused CSS",
                        "description": "Below the threshold",
                        "scoreDisplayMode": "numeric",
                        "numericValue": 80.0,
                        "details": {"overallSavingsMs": 80.0}
                    },
                    "server-response-time": {
                        "title": "No savings estimate",
                        "description": "Missing overallSavingsMs",
                        "scoreDisplayMode": "numeric",
                        "numericValue": 600.0,
                        "details": {}
                    },
                    "mainthread-work-breakdown": {
                        "title": "Minimize main-thread work",
                        "description": "Where time is spent",
                        "scoreDisplayMode": "informative",
                        "displayValue": "2.1 s"
                    },
                    "bootup-time": {
                        "title": "JavaScript execution time",
                        "description": "Parse and compile cost",
                        "scoreDisplayMode": "informative",
                        "displayValue": "1.2 s"
                    },
                    "font-display": {
                        "title": "No display value",
                        "description": "Filtered out",
                        "scoreDisplayMode": "informative"
                    },
                    "resource-summary": {
                        "details": {
                            "items": [
                                {"resourceType": "total", "size": 0, "requestCount": 0},
                                {"resourceType": "image", "size": 400, "requestCount": 5},
                                {"resourceType": "script", "size": 300, "requestCount": 8},
                                {"resourceType": "stylesheet", "size": 100, "requestCount": 2},
                                {"resourceType": "font", "size": 200, "requestCount": 1}
                            ]
                        }
                    },
                    "network-requests": {
                        "details": {
                            "items": [
                                {"url": "https://example.com/", "transferSize": 5000, "startTimeMs": 0.0, "endTimeMs": 120.0, "resourceType": "Document"},
                                {"url": "https://example.com/app.js", "resourceSize": 8000, "startTime": 130.0, "duration": 80.0, "resourceType": "Script"},
                                {"url": "https://example.com/late.png", "transferSize": 900, "startTimeMs": 400.0, "endTimeMs": 350.0}
                            ]
                        }
                    },
                    "screenshot-thumbnails": {
                        "details": {
                            "items": [
                                {"data": "data:image/jpeg;base64,AAA"},
                                {"data": ""},
                                {"data": "data:image/jpeg;base64,BBB"}
                            ]
                        }
                    },
                    "final-screenshot": {
                        "details": {"data": "data:image/jpeg;base64,FINAL"}
                    }
                }
            },
            "loadingExperience": {
                "overall_category": "FAST",
                "metrics": {
                    "LARGEST_CONTENTFUL_PAINT_MS": {"category": "FAST", "percentile": 2100}
                }
            }
        }"#
    }

    #[test]
    fn test_scores_round_half_up() {
        let snapshot = extract(full_payload());
        assert_eq!(snapshot.scores.performance, 87);
        assert_eq!(snapshot.scores.accessibility, 92);
        assert_eq!(snapshot.scores.best_practices, 100);
        assert_eq!(snapshot.scores.seo, 85);
    }

    #[test]
    fn test_lab_metrics_read_by_audit_id() {
        let snapshot = extract(full_payload());
        assert_eq!(snapshot.metrics.first_contentful_paint, 1234.5);
        assert_eq!(snapshot.metrics.largest_contentful_paint, 2400.0);
        assert_eq!(snapshot.metrics.first_input_delay, 130.0);
        assert_eq!(snapshot.metrics.interaction_to_next_paint, 180.0);
        assert_eq!(snapshot.metrics.cumulative_layout_shift, 0.042);
        assert_eq!(snapshot.metrics.speed_index, 3100.0);
        assert_eq!(snapshot.metrics.total_blocking_time, 250.0);
    }

    #[test]
    fn test_opportunities_filtered_and_sorted() {
        let snapshot = extract(full_payload());
        let ids: Vec<&str> = snapshot
            .opportunities
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        // Sorted by savings descending; the 80ms audit and the audit with
        // no savings estimate are excluded
        assert_eq!(
            ids,
            vec![
                "unused-javascript",
                "render-blocking-resources",
                "uses-text-compression"
            ]
        );
        for opportunity in &snapshot.opportunities {
            assert!(opportunity.savings > 100.0);
        }
        for window in snapshot.opportunities.windows(2) {
            assert!(window[0].savings >= window[1].savings);
        }
    }

    #[test]
    fn test_opportunities_capped_at_ten() {
        let mut audits = String::new();
        for index in 0..15 {
            audits.push_str(&format!(
                r#""audit-{index:02}": {{"scoreDisplayMode": "numeric", "numericValue": 1.0, "details": {{"overallSavingsMs": {}}}}},"#,
                200 + index
            ));
        }
        let raw = format!(
            r#"{{"lighthouseResult": {{"categories": {{}}, "audits": {{{}"speed-index": {{"numericValue": 1.0}}}}}}}}"#,
            audits
        );
        let snapshot = extract(&raw);
        assert_eq!(snapshot.opportunities.len(), 10);
    }

    #[test]
    fn test_diagnostics_informative_with_display_value() {
        let snapshot = extract(full_payload());
        let ids: Vec<&str> = snapshot.diagnostics.iter().map(|d| d.id.as_str()).collect();
        assert!(ids.contains(&"mainthread-work-breakdown"));
        assert!(ids.contains(&"bootup-time"));
        assert!(!ids.contains(&"font-display"));
        assert!(snapshot.diagnostics.len() <= 8);
    }

    #[test]
    fn test_resource_summary_sums() {
        let snapshot = extract(full_payload());
        assert_eq!(snapshot.resource_summary.total_size, 1000);
        assert_eq!(snapshot.resource_summary.image_size, 400);
        assert_eq!(snapshot.resource_summary.script_size, 300);
        assert_eq!(snapshot.resource_summary.stylesheet_size, 100);
        assert_eq!(snapshot.resource_summary.resource_count, 16);
        assert_eq!(snapshot.resource_summary.other_size(), 200);
    }

    #[test]
    fn test_network_requests_fallbacks_and_clamp() {
        let snapshot = extract(full_payload());
        let requests = &snapshot.network_requests;
        assert_eq!(requests.len(), 3);

        // Explicit start/end pair
        assert_eq!(requests[0].transfer_size, 5000);
        assert_eq!(requests[0].end_time, 120.0);

        // transferSize absent: fall back to resourceSize; end derived from duration
        assert_eq!(requests[1].transfer_size, 8000);
        assert_eq!(requests[1].start_time, 130.0);
        assert_eq!(requests[1].end_time, 210.0);

        // Inconsistent source data: end clamped to start
        assert_eq!(requests[2].start_time, 400.0);
        assert_eq!(requests[2].end_time, 400.0);

        for request in requests {
            assert!(request.end_time >= request.start_time);
        }
    }

    #[test]
    fn test_screenshots_drop_empty_frames() {
        let snapshot = extract(full_payload());
        let screenshots = snapshot.screenshots.unwrap();
        assert_eq!(screenshots.thumbnails.len(), 2);
        assert_eq!(
            screenshots.final_frame.as_deref(),
            Some("data:image/jpeg;base64,FINAL")
        );
    }

    #[test]
    fn test_field_data_passes_through() {
        let snapshot = extract(full_payload());
        let experience = snapshot.loading_experience.unwrap();
        assert_eq!(experience.overall_category.as_deref(), Some("FAST"));
        let lcp = experience
            .metrics
            .unwrap()
            .largest_contentful_paint_ms
            .unwrap();
        assert_eq!(lcp.percentile, 2100.0);
    }

    #[test]
    fn test_missing_leaves_default_to_zero() {
        let snapshot = extract(
            r#"{"lighthouseResult": {"categories": {"performance": {"score": 0.5}}, "audits": {}}}"#,
        );
        assert_eq!(snapshot.scores.performance, 50);
        assert_eq!(snapshot.scores.accessibility, 0);
        assert_eq!(snapshot.metrics.largest_contentful_paint, 0.0);
        assert_eq!(snapshot.resource_summary, ResourceSummary::default());
        assert!(snapshot.network_requests.is_empty());
        assert!(snapshot.opportunities.is_empty());
        assert!(snapshot.diagnostics.is_empty());
    }

    #[test]
    fn test_missing_sections_are_malformed() {
        let extractor = MetricsExtractor::default();

        let no_lighthouse = PayloadReader::from_str("{}").unwrap();
        let no_categories =
            PayloadReader::from_str(r#"{"lighthouseResult": {"audits": {}}}"#).unwrap();
        let no_audits =
            PayloadReader::from_str(r#"{"lighthouseResult": {"categories": {}}}"#).unwrap();

        for payload in [no_lighthouse, no_categories, no_audits] {
            let result = extractor.extract(&payload, "https://example.com", Device::Mobile);
            assert!(matches!(result, Err(Error::MalformedPayload(_))));
        }
    }

    #[test]
    fn test_extraction_is_idempotent_modulo_timestamp() {
        let payload = PayloadReader::from_str(full_payload()).unwrap();
        let extractor = MetricsExtractor::default();
        let first = extractor
            .extract(&payload, "https://example.com", Device::Desktop)
            .unwrap();
        let mut second = extractor
            .extract(&payload, "https://example.com", Device::Desktop)
            .unwrap();
        second.timestamp = first.timestamp;
        assert_eq!(first, second);
    }
}
