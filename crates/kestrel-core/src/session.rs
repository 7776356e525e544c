use crate::analysis::{Device, MetricsExtractor, MetricsSnapshot};
use crate::cache::ResultCache;
use crate::history::{HistoryStore, KeyValueStore};
use crate::psi::AuditPayload;
use crate::target::normalize_url;
use crate::{Error, Result};
use async_trait::async_trait;

/// Issues one audit request per (url, device) against the measurement
/// service. Implemented by the HTTP client; stubbed in tests.
#[async_trait]
pub trait AuditFetch {
    async fn fetch_audit(&self, url: &str, device: Device) -> Result<AuditPayload>;
}

/// Combined result of one dual-device run
#[derive(Debug, Clone, PartialEq)]
pub struct DualReport {
    pub desktop: MetricsSnapshot,
    pub mobile: MetricsSnapshot,
}

impl DualReport {
    /// Snapshot shown by default (desktop, for display compatibility)
    pub fn primary(&self) -> &MetricsSnapshot {
        &self.desktop
    }
}

/// Application state driving analyses: fetcher, extractor, cache, history
/// and the in-flight guard. All mutable state lives here and is only
/// touched through the run_* entry points, on a single logical thread of
/// control.
pub struct AnalysisSession<F, S>
where
    F: AuditFetch,
    S: KeyValueStore,
{
    fetcher: F,
    extractor: MetricsExtractor,
    cache: ResultCache,
    history: HistoryStore<S>,
    in_flight: bool,
}

impl<F, S> AnalysisSession<F, S>
where
    F: AuditFetch,
    S: KeyValueStore,
{
    pub fn new(fetcher: F, history: HistoryStore<S>) -> Self {
        Self {
            fetcher,
            extractor: MetricsExtractor::default(),
            cache: ResultCache::new(),
            history,
            in_flight: false,
        }
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Analyze one (url, device) pair and record the result in the history
    pub async fn run_single(&mut self, url: &str, device: Device) -> Result<MetricsSnapshot> {
        self.begin()?;
        let result = self.audited_snapshot(url, device).await;
        self.in_flight = false;

        let snapshot = result?;
        self.history.append(snapshot.clone());
        Ok(snapshot)
    }

    /// Desktop then mobile, sequentially. Each sub-call is independently
    /// cacheable; failure of either aborts the run before anything is
    /// recorded in the history.
    pub async fn run_dual(&mut self, url: &str) -> Result<DualReport> {
        self.begin()?;
        let result = self.dual_inner(url).await;
        self.in_flight = false;

        let report = result?;
        self.history
            .append_pair(report.desktop.clone(), report.mobile.clone());
        Ok(report)
    }

    /// Desktop then mobile sub-calls, each through the cacheable path.
    /// Propagates the first failure without touching the history.
    async fn dual_inner(&mut self, url: &str) -> Result<DualReport> {
        let desktop = self.audited_snapshot(url, Device::Desktop).await?;
        let mobile = self.audited_snapshot(url, Device::Mobile).await?;
        Ok(DualReport { desktop, mobile })
    }

    /// One sequential audit per candidate URL. Per-candidate failures are
    /// logged and skipped; successes accumulate in completion order, both
    /// in the returned list and in the history.
    pub async fn run_benchmark<P>(
        &mut self,
        urls: &[String],
        device: Device,
        mut progress: P,
    ) -> Result<Vec<MetricsSnapshot>>
    where
        P: FnMut(usize, &str, Option<&Error>),
    {
        self.begin()?;

        let mut results = Vec::new();
        for (index, url) in urls.iter().enumerate() {
            match self.audited_snapshot(url, device).await {
                Ok(snapshot) => {
                    self.history.append(snapshot.clone());
                    progress(index, url, None);
                    results.push(snapshot);
                }
                Err(err) => {
                    tracing::warn!("Benchmark candidate {} failed: {}", url, err);
                    progress(index, url, Some(&err));
                }
            }
        }

        self.in_flight = false;
        Ok(results)
    }

    /// Analyze a payload already on hand (an offline report); no network
    pub fn run_payload(
        &mut self,
        payload: &AuditPayload,
        url: &str,
        device: Device,
    ) -> Result<MetricsSnapshot> {
        let target = normalize_url(url)?;
        let snapshot = self.extractor.extract(payload, &target, device)?;
        self.cache.put(&target, device, snapshot.clone());
        self.history.append(snapshot.clone());
        Ok(snapshot)
    }

    /// Cache hit or fetch-and-extract; never touches the history
    async fn audited_snapshot(&mut self, url: &str, device: Device) -> Result<MetricsSnapshot> {
        let target = normalize_url(url)?;

        if let Some(hit) = self.cache.get(&target, device) {
            tracing::debug!("Cache hit for {} ({})", target, device);
            return Ok(hit);
        }

        let payload = self.fetcher.fetch_audit(&target, device).await?;
        let snapshot = self.extractor.extract(&payload, &target, device)?;
        self.cache.put(&target, device, snapshot.clone());
        Ok(snapshot)
    }

    fn begin(&mut self) -> Result<()> {
        if self.in_flight {
            return Err(Error::Busy);
        }
        self.in_flight = true;
        Ok(())
    }
}
