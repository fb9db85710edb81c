//! OData fetch primitive and the per-source multi-level fetch client.
//!
//! All four upstream sources speak the same OData dialect: one GET with a
//! `$filter` combining a geographic-code prefix match and an exact period
//! match, answering `{ "value": [rows...] }`. The fetch primitive is a trait
//! so tests can script responses without a network.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use url::Url;

use crate::error::FetchError;
use crate::registry::{DataSource, DatasetRegistry};
use crate::types::{
    CodeName, GeographicCodes, GeographicLevel, LevelKind, LeveledResponse, MultiLevelResponse,
    Row,
};

/// Code under which the national row is published.
pub const NATIONAL_CODE: &str = "NL00";
/// Older health tables published the national row under this code instead.
pub const NATIONAL_FALLBACK_CODE: &str = "NL01";

const NATIONAL_NAME: &str = "Nederland";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct ODataEnvelope {
    #[serde(default)]
    value: Vec<Row>,
}

/// One OData request: rows matching a code prefix within one period.
#[async_trait]
pub trait OdataFetch: Send + Sync {
    async fn fetch_rows(
        &self,
        base_url: &str,
        code: &str,
        period: &str,
    ) -> Result<Vec<Row>, FetchError>;
}

/// Production fetcher over reqwest.
pub struct HttpOdataClient {
    client: reqwest::Client,
}

impl HttpOdataClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl OdataFetch for HttpOdataClient {
    async fn fetch_rows(
        &self,
        base_url: &str,
        code: &str,
        period: &str,
    ) -> Result<Vec<Row>, FetchError> {
        let filter = format!("startswith(WijkenEnBuurten,'{code}') and Perioden eq '{period}'");
        let url = Url::parse_with_params(base_url, &[("$filter", filter.as_str())])?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let envelope: ODataEnvelope = response.json().await?;
        Ok(envelope.value)
    }
}

/// Fetch client bound to one source and one concrete dataset.
///
/// For the shared-dataset sources one client serves every year; demographics
/// needs a fresh binding per year because the dataset id changes.
pub struct SourceClient {
    source: DataSource,
    dataset_id: String,
    base_url: String,
    fetcher: Arc<dyn OdataFetch>,
}

impl SourceClient {
    /// Bind to the dataset the registry resolves for (source, year).
    /// `None` when the year is not available for this source.
    pub fn new(
        registry: &DatasetRegistry,
        source: DataSource,
        year: i32,
        fetcher: Arc<dyn OdataFetch>,
    ) -> Option<Self> {
        let resolved = registry.endpoint(source, year)?;
        Some(Self::for_dataset(
            source,
            resolved.dataset_id,
            resolved.base_url,
            fetcher,
        ))
    }

    /// Bind to an explicit dataset, bypassing the registry.
    pub fn for_dataset(
        source: DataSource,
        dataset_id: impl Into<String>,
        base_url: impl Into<String>,
        fetcher: Arc<dyn OdataFetch>,
    ) -> Self {
        Self {
            source,
            dataset_id: dataset_id.into(),
            base_url: base_url.into(),
            fetcher,
        }
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    /// First row matching the code prefix in the given period.
    ///
    /// Returns an empty row both for "no data" and for a failed request;
    /// callers treat the two identically, so the error is logged here and
    /// never propagated.
    pub async fn fetch_by_code(&self, code: &str, period: &str) -> Row {
        match self.fetcher.fetch_rows(&self.base_url, code, period).await {
            Ok(rows) => rows.into_iter().next().unwrap_or_default(),
            Err(e) => {
                tracing::warn!(
                    "{} fetch for '{}' in {} failed: {}",
                    self.source,
                    code,
                    period,
                    e
                );
                Row::new()
            }
        }
    }

    /// National row, trying "NL00" first. Health tables have historically
    /// used "NL01" for some years, so for that source an empty NL00 answer
    /// triggers one fallback lookup.
    async fn fetch_national(&self, period: &str) -> (&'static str, Row) {
        let row = self.fetch_by_code(NATIONAL_CODE, period).await;
        if row.is_empty() && self.source == DataSource::Health {
            let fallback = self.fetch_by_code(NATIONAL_FALLBACK_CODE, period).await;
            if !fallback.is_empty() {
                return (NATIONAL_FALLBACK_CODE, fallback);
            }
        }
        (NATIONAL_CODE, row)
    }

    /// Fetch all geographic levels for one period concurrently.
    ///
    /// A level comes back `None` exactly when its lookup produced no rows
    /// (or failed); wijk/buurt lookups are skipped without a network call
    /// when the geocoder did not supply a code. Never returns an error.
    pub async fn fetch_multi_level(
        &self,
        codes: &GeographicCodes,
        period: &str,
    ) -> MultiLevelResponse {
        let district = codes.district.as_ref();
        let neighborhood = codes.neighborhood.as_ref();

        let national = self.fetch_national(period);
        let municipality = self.fetch_by_code(&codes.municipality.code, period);
        let district_row = async {
            match district {
                Some(d) => self.fetch_by_code(&d.code, period).await,
                None => Row::new(),
            }
        };
        let neighborhood_row = async {
            match neighborhood {
                Some(n) => self.fetch_by_code(&n.code, period).await,
                None => Row::new(),
            }
        };

        let ((national_code, national_row), municipality_row, district_row, neighborhood_row) =
            tokio::join!(national, municipality, district_row, neighborhood_row);

        MultiLevelResponse {
            national: leveled(national_code, LevelKind::National, NATIONAL_NAME, national_row),
            municipality: leveled(
                &codes.municipality.code,
                LevelKind::Municipality,
                &codes.municipality.name,
                municipality_row,
            ),
            district: district.and_then(|d| leveled_from(d, LevelKind::District, district_row)),
            neighborhood: neighborhood
                .and_then(|n| leveled_from(n, LevelKind::Neighborhood, neighborhood_row)),
        }
    }
}

fn leveled(code: &str, kind: LevelKind, name: &str, data: Row) -> Option<LeveledResponse> {
    if data.is_empty() {
        return None;
    }
    Some(LeveledResponse {
        level: GeographicLevel {
            code: code.to_string(),
            kind,
            name: name.to_string(),
        },
        data,
        fetched_at: Utc::now(),
        year: None,
        dataset_id: None,
    })
}

fn leveled_from(unit: &CodeName, kind: LevelKind, data: Row) -> Option<LeveledResponse> {
    leveled(&unit.code, kind, &unit.name, data)
}
