//! Geographic levels and response shapes shared across sources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of an OData `value` array, kept opaque to the core.
pub type Row = Map<String, Value>;

/// The four granularities at which Dutch statistical data is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    National,
    Municipality,
    District,
    Neighborhood,
}

/// A geographic unit as it appears in the upstream tables.
///
/// Code formats are upstream conventions ("NL00" national, "GMxxxx"
/// gemeente, "WKxxxxxx" wijk, "BUxxxxxxxx" buurt) and are treated as opaque
/// strings here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographicLevel {
    pub code: String,
    pub kind: LevelKind,
    pub name: String,
}

/// Code plus display name, as produced by the geocoding collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeName {
    pub code: String,
    pub name: String,
}

/// Geocoder output for one address: the gemeente is always known, wijk and
/// buurt may be missing for addresses the geocoder cannot resolve that deep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeographicCodes {
    pub municipality: CodeName,
    pub district: Option<CodeName>,
    pub neighborhood: Option<CodeName>,
}

/// Data for one geographic level in one reporting period.
///
/// Only constructed when the upstream query returned at least one row; "no
/// data at this level" is represented by `None` in [`MultiLevelResponse`],
/// never by a zero-filled placeholder.
#[derive(Debug, Clone, Serialize)]
pub struct LeveledResponse {
    pub level: GeographicLevel,
    pub data: Row,
    pub fetched_at: DateTime<Utc>,
    /// Set by the historic orchestrator; `None` for single-period fetches.
    pub year: Option<i32>,
    /// Set for demographics, whose dataset id changes per year.
    pub dataset_id: Option<String>,
}

/// One (source, period) fetch across all levels.
///
/// A `None` level means either the upstream table has no row there or the
/// request for that level failed; the two are deliberately indistinguishable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MultiLevelResponse {
    pub national: Option<LeveledResponse>,
    pub municipality: Option<LeveledResponse>,
    pub district: Option<LeveledResponse>,
    pub neighborhood: Option<LeveledResponse>,
}

impl MultiLevelResponse {
    /// Mutable access to the non-absent levels, for post-fetch enrichment.
    pub fn levels_mut(&mut self) -> impl Iterator<Item = &mut LeveledResponse> {
        [
            self.national.as_mut(),
            self.municipality.as_mut(),
            self.district.as_mut(),
            self.neighborhood.as_mut(),
        ]
        .into_iter()
        .flatten()
    }
}

/// One year's result within a historic batch.
#[derive(Debug, Clone, Serialize)]
pub struct HistoricResponse {
    pub year: i32,
    pub period: String,
    /// Demographics only; shared-dataset sources leave this unset.
    pub dataset_id: Option<String>,
    pub data: MultiLevelResponse,
}

/// Results of a historic batch, in request order.
///
/// Holds at most one entry per year. Entries appear in the order the years
/// were requested (ascending, descending, or arbitrary as supplied); the
/// series is never re-sorted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoricSeries {
    entries: Vec<HistoricResponse>,
}

impl HistoricSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a year's result, replacing any earlier entry for the same year.
    pub fn insert(&mut self, response: HistoricResponse) {
        match self.entries.iter_mut().find(|e| e.year == response.year) {
            Some(existing) => *existing = response,
            None => self.entries.push(response),
        }
    }

    pub fn year(&self, year: i32) -> Option<&HistoricResponse> {
        self.entries.iter().find(|e| e.year == year)
    }

    /// Remove and return the entry for `year`, if present.
    pub fn take_year(&mut self, year: i32) -> Option<HistoricResponse> {
        let index = self.entries.iter().position(|e| e.year == year)?;
        Some(self.entries.remove(index))
    }

    /// Years in insertion order.
    pub fn years(&self) -> Vec<i32> {
        self.entries.iter().map(|e| e.year).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoricResponse> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for HistoricSeries {
    type Item = HistoricResponse;
    type IntoIter = std::vec::IntoIter<HistoricResponse>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(year: i32) -> HistoricResponse {
        HistoricResponse {
            year,
            period: format!("{year}JJ00"),
            dataset_id: None,
            data: MultiLevelResponse::default(),
        }
    }

    #[test]
    fn series_preserves_request_order() {
        let mut series = HistoricSeries::new();
        series.insert(response(2022));
        series.insert(response(2019));
        series.insert(response(2024));
        assert_eq!(series.years(), vec![2022, 2019, 2024]);
    }

    #[test]
    fn series_holds_one_entry_per_year() {
        let mut series = HistoricSeries::new();
        series.insert(response(2022));
        series.insert(response(2022));
        assert_eq!(series.len(), 1);
        assert_eq!(series.year(2022).unwrap().period, "2022JJ00");
        assert!(series.year(2021).is_none());
    }
}
