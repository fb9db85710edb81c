//! Dataset registry: which dataset answers for a given (source, year).
//!
//! The four upstream sources version their tables differently:
//! - demographics (Kerncijfers wijken en buurten) publishes a *new dataset id
//!   per year*, so the registry keeps a sparse per-year map;
//! - health and livability keep one dataset id and enumerate the years it
//!   actually contains (health is surveyed roughly every four years);
//! - safety keeps one dataset id covering a contiguous year range.
//!
//! The registry is an explicitly constructed, immutable value injected into
//! clients and the orchestrator; there is no global configuration state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The four data sources the aggregation core knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Demographics,
    Health,
    Safety,
    Livability,
}

impl DataSource {
    pub const ALL: [DataSource; 4] = [
        DataSource::Demographics,
        DataSource::Health,
        DataSource::Safety,
        DataSource::Livability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Demographics => "demographics",
            DataSource::Health => "health",
            DataSource::Safety => "safety",
            DataSource::Livability => "livability",
        }
    }

    /// Parse a source name as supplied by the UI layer. `None` for names the
    /// core does not recognize.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "demographics" => Some(DataSource::Demographics),
            "health" => Some(DataSource::Health),
            "safety" => Some(DataSource::Safety),
            "livability" => Some(DataSource::Livability),
            _ => None,
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Annual period code in the upstream convention, e.g. "2023JJ00".
pub fn period_for(year: i32) -> String {
    format!("{year}JJ00")
}

/// One demographics dataset: the table id changes every publication year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub id: String,
    pub year: i32,
    pub base_url: String,
    pub notes: Option<String>,
}

impl DatasetConfig {
    /// Period code is always derived from the year, never stored separately.
    pub fn period_code(&self) -> String {
        period_for(self.year)
    }
}

/// How a shared-dataset source describes which years it covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceAvailability {
    /// Explicit list of publication years (health, livability).
    Enumerated(Vec<i32>),
    /// Contiguous inclusive range (safety).
    Range { start: i32, end: i32 },
}

impl SourceAvailability {
    fn contains(&self, year: i32) -> bool {
        match self {
            SourceAvailability::Enumerated(years) => years.contains(&year),
            SourceAvailability::Range { start, end } => (*start..=*end).contains(&year),
        }
    }

    /// Covered years, strictly descending, no duplicates.
    fn years_descending(&self) -> Vec<i32> {
        match self {
            SourceAvailability::Enumerated(years) => {
                let mut sorted = years.clone();
                sorted.sort_unstable_by(|a, b| b.cmp(a));
                sorted.dedup();
                sorted
            }
            SourceAvailability::Range { start, end } => (*start..=*end).rev().collect(),
        }
    }
}

/// A source that keeps one dataset id across years; only the period-code
/// query parameter changes per year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedDataset {
    pub id: String,
    pub base_url: String,
    pub availability: SourceAvailability,
}

/// Everything needed to issue one request: dataset id, endpoint, period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDataset {
    pub dataset_id: String,
    pub base_url: String,
    pub period: String,
}

/// Immutable (source, year) -> dataset mapping for all four sources.
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    demographics: BTreeMap<i32, DatasetConfig>,
    health: SharedDataset,
    safety: SharedDataset,
    livability: SharedDataset,
}

fn cbs_odata_url(dataset_id: &str) -> String {
    format!("https://opendata.cbs.nl/ODataApi/odata/{dataset_id}/TypedDataSet")
}

fn dataderden_odata_url(dataset_id: &str) -> String {
    format!("https://dataderden.cbs.nl/ODataApi/odata/{dataset_id}/TypedDataSet")
}

impl DatasetRegistry {
    pub fn new(
        demographics: Vec<DatasetConfig>,
        health: SharedDataset,
        safety: SharedDataset,
        livability: SharedDataset,
    ) -> Self {
        let demographics = demographics
            .into_iter()
            .map(|config| (config.year, config))
            .collect();
        Self {
            demographics,
            health,
            safety,
            livability,
        }
    }

    /// The production configuration.
    ///
    /// The demographics map is sparse on purpose: CBS published no
    /// Kerncijfers wijken en buurten table for 2013 or 2015, so those years
    /// are genuinely unavailable even though they fall inside the covered
    /// span.
    pub fn standard() -> Self {
        let demographics = [
            (2024, "85984NED"),
            (2023, "85618NED"),
            (2022, "85318NED"),
            (2021, "85039NED"),
            (2020, "84799NED"),
            (2019, "84583NED"),
            (2018, "84286NED"),
            (2017, "83765NED"),
            (2016, "83487NED"),
            (2014, "82931NED"),
        ]
        .into_iter()
        .map(|(year, id)| DatasetConfig {
            id: id.to_string(),
            year,
            base_url: cbs_odata_url(id),
            notes: None,
        })
        .collect();

        Self::new(
            demographics,
            SharedDataset {
                id: "50120NED".to_string(),
                base_url: dataderden_odata_url("50120NED"),
                availability: SourceAvailability::Enumerated(vec![2012, 2016, 2020, 2022]),
            },
            SharedDataset {
                id: "47018NED".to_string(),
                base_url: dataderden_odata_url("47018NED"),
                availability: SourceAvailability::Range {
                    start: 2012,
                    end: 2024,
                },
            },
            SharedDataset {
                id: "85146NED".to_string(),
                base_url: dataderden_odata_url("85146NED"),
                availability: SourceAvailability::Enumerated(vec![
                    2014, 2016, 2018, 2020, 2022,
                ]),
            },
        )
    }

    fn shared(&self, source: DataSource) -> Option<&SharedDataset> {
        match source {
            DataSource::Demographics => None,
            DataSource::Health => Some(&self.health),
            DataSource::Safety => Some(&self.safety),
            DataSource::Livability => Some(&self.livability),
        }
    }

    /// Years with data for `source`, strictly descending, no duplicates.
    pub fn available_years(&self, source: DataSource) -> Vec<i32> {
        match self.shared(source) {
            Some(dataset) => dataset.availability.years_descending(),
            None => self.demographics.keys().rev().copied().collect(),
        }
    }

    pub fn is_year_available(&self, source: DataSource, year: i32) -> bool {
        match self.shared(source) {
            Some(dataset) => dataset.availability.contains(year),
            None => self.demographics.contains_key(&year),
        }
    }

    /// `None` if the year is unavailable, otherwise the "{year}JJ00" code.
    pub fn period_code(&self, source: DataSource, year: i32) -> Option<String> {
        self.is_year_available(source, year).then(|| period_for(year))
    }

    /// Full per-year demographics configuration, or `None` for gap years.
    pub fn demographics_config(&self, year: i32) -> Option<&DatasetConfig> {
        self.demographics.get(&year)
    }

    /// Resolve the dataset to query for one (source, year) request.
    pub fn endpoint(&self, source: DataSource, year: i32) -> Option<ResolvedDataset> {
        match self.shared(source) {
            Some(dataset) => {
                let period = self.period_code(source, year)?;
                Some(ResolvedDataset {
                    dataset_id: dataset.id.clone(),
                    base_url: dataset.base_url.clone(),
                    period,
                })
            }
            None => {
                let config = self.demographics_config(year)?;
                Some(ResolvedDataset {
                    dataset_id: config.id.clone(),
                    base_url: config.base_url.clone(),
                    period: config.period_code(),
                })
            }
        }
    }

    /// Years available in *all four* sources, descending.
    pub fn common_available_years(&self) -> Vec<i32> {
        self.available_years(DataSource::Demographics)
            .into_iter()
            .filter(|&year| {
                self.is_year_available(DataSource::Health, year)
                    && self.is_year_available(DataSource::Safety, year)
                    && self.is_year_available(DataSource::Livability, year)
            })
            .collect()
    }

    /// Per-source availability grid for a closed year range.
    ///
    /// Years run descending; each source contributes one boolean per year,
    /// `false` (not absent) for years outside that source's coverage.
    pub fn availability_matrix(&self, start_year: i32, end_year: i32) -> AvailabilityMatrix {
        let (low, high) = if start_year <= end_year {
            (start_year, end_year)
        } else {
            (end_year, start_year)
        };
        let years: Vec<i32> = (low..=high).rev().collect();
        let sources = DataSource::ALL
            .into_iter()
            .map(|source| {
                let flags = years
                    .iter()
                    .map(|&year| self.is_year_available(source, year))
                    .collect();
                (source, flags)
            })
            .collect();
        AvailabilityMatrix { years, sources }
    }
}

/// Availability grid, aligned positionally: `sources[s][i]` answers for
/// `years[i]`.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityMatrix {
    pub years: Vec<i32>,
    pub sources: BTreeMap<DataSource, Vec<bool>>,
}
