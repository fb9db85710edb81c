//! String-keyed facade over the registry.
//!
//! The report/UI layers address sources by name. Unknown names answer with
//! safe defaults (empty list / false / `None`) instead of an error, so a
//! stale frontend never takes the backend down with it.

use crate::registry::{AvailabilityMatrix, DataSource, DatasetRegistry};

pub fn available_years(registry: &DatasetRegistry, source: &str) -> Vec<i32> {
    match DataSource::from_name(source) {
        Some(source) => registry.available_years(source),
        None => Vec::new(),
    }
}

pub fn is_year_available(registry: &DatasetRegistry, source: &str, year: i32) -> bool {
    DataSource::from_name(source)
        .map(|source| registry.is_year_available(source, year))
        .unwrap_or(false)
}

pub fn period_code(registry: &DatasetRegistry, source: &str, year: i32) -> Option<String> {
    registry.period_code(DataSource::from_name(source)?, year)
}

/// Pure reducer over the per-source registries; no network involved.
pub fn common_available_years(registry: &DatasetRegistry) -> Vec<i32> {
    registry.common_available_years()
}

/// Pure reducer over the per-source registries; no network involved.
pub fn availability_matrix(
    registry: &DatasetRegistry,
    start_year: i32,
    end_year: i32,
) -> AvailabilityMatrix {
    registry.availability_matrix(start_year, end_year)
}
