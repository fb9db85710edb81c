//! Multi-year historic orchestrator.
//!
//! Drives a source client across a set of years, strictly sequentially with
//! a pacing delay between years. The upstream tables are free public
//! services with undocumented rate limits; the sequential loop is the one
//! deliberate serialization point in the crate. A year that fails — either
//! validation against the registry or its fetch — is logged and skipped so
//! the remaining years still come back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::client::SourceClient;
use crate::registry::{DataSource, DatasetRegistry};
use crate::types::{GeographicCodes, HistoricResponse, HistoricSeries};

const DEFAULT_RATE_LIMIT_DELAY_MS: u64 = 200;

/// Called after each processed year with (done, total, year).
pub type ProgressFn = Box<dyn Fn(usize, usize, i32) + Send + Sync>;

/// Knobs for one historic batch.
pub struct HistoricOptions {
    /// Pause between consecutive year fetches; no pause after the last.
    pub rate_limit_delay: Duration,
    /// Invoked once per processed year, success or failure.
    pub on_progress: Option<ProgressFn>,
    /// Checked before each year; a set flag stops the batch between years.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for HistoricOptions {
    fn default() -> Self {
        Self {
            rate_limit_delay: Duration::from_millis(DEFAULT_RATE_LIMIT_DELAY_MS),
            on_progress: None,
            cancel: None,
        }
    }
}

/// Orchestrates multi-year fetches for one source.
pub struct HistoricFetcher {
    source: DataSource,
    registry: Arc<DatasetRegistry>,
    fetcher: Arc<dyn crate::client::OdataFetch>,
}

impl HistoricFetcher {
    pub fn new(
        source: DataSource,
        registry: Arc<DatasetRegistry>,
        fetcher: Arc<dyn crate::client::OdataFetch>,
    ) -> Self {
        Self {
            source,
            registry,
            fetcher,
        }
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    /// Fetch multi-level data for each requested year.
    ///
    /// `years` defaults to everything the registry lists for this source.
    /// Years the registry does not know are dropped with a warning; an
    /// all-invalid (or empty) request yields an empty series, which is not
    /// an error. Note the empty series is the same answer whether nothing
    /// was requested or nothing survived validation; callers cannot tell
    /// the two apart.
    pub async fn fetch_historic_data(
        &self,
        codes: &GeographicCodes,
        years: Option<&[i32]>,
        options: &HistoricOptions,
    ) -> HistoricSeries {
        let requested: Vec<i32> = match years {
            Some(years) => years.to_vec(),
            None => self.registry.available_years(self.source),
        };

        let valid: Vec<i32> = requested
            .into_iter()
            .filter(|&year| {
                let available = self.registry.is_year_available(self.source, year);
                if !available {
                    tracing::warn!("{}: no dataset for {}, dropping year", self.source, year);
                }
                available
            })
            .collect();

        let mut series = HistoricSeries::new();
        if valid.is_empty() {
            return series;
        }

        let total = valid.len();
        tracing::info!("{}: fetching {} year(s)", self.source, total);

        for (index, &year) in valid.iter().enumerate() {
            if let Some(cancel) = &options.cancel {
                if cancel.load(Ordering::Relaxed) {
                    tracing::info!(
                        "{}: batch cancelled after {} of {} year(s)",
                        self.source,
                        index,
                        total
                    );
                    break;
                }
            }

            match self.fetch_year(codes, year).await {
                Some(response) => series.insert(response),
                None => {
                    tracing::warn!("{}: fetch for {} failed, continuing", self.source, year);
                }
            }

            if let Some(on_progress) = &options.on_progress {
                on_progress(index + 1, total, year);
            }

            if index + 1 < total && !options.rate_limit_delay.is_zero() {
                tokio::time::sleep(options.rate_limit_delay).await;
            }
        }

        series
    }

    /// Single-year convenience wrapper over the batch method.
    pub async fn fetch_historic_year(
        &self,
        codes: &GeographicCodes,
        year: i32,
    ) -> Option<HistoricResponse> {
        let mut series = self
            .fetch_historic_data(codes, Some(&[year]), &HistoricOptions::default())
            .await;
        series.take_year(year)
    }

    async fn fetch_year(&self, codes: &GeographicCodes, year: i32) -> Option<HistoricResponse> {
        // Demographics changes dataset id per year, so every year gets its
        // own client binding; shared-dataset sources only vary the period.
        let resolved = self.registry.endpoint(self.source, year)?;
        let client = SourceClient::for_dataset(
            self.source,
            resolved.dataset_id.clone(),
            resolved.base_url,
            Arc::clone(&self.fetcher),
        );

        let mut data = client.fetch_multi_level(codes, &resolved.period).await;

        let dataset_id =
            (self.source == DataSource::Demographics).then(|| resolved.dataset_id.clone());
        for level in data.levels_mut() {
            level.year = Some(year);
            level.dataset_id = dataset_id.clone();
        }

        Some(HistoricResponse {
            year,
            period: resolved.period,
            dataset_id,
            data,
        })
    }
}
