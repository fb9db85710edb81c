//! wijkdata - multi-year Dutch open-data aggregation core
//!
//! This crate resolves (source, year) pairs to the correct CBS/RIVM/Politie
//! OData dataset, fetches statistics for up to four geographic levels
//! (national / gemeente / wijk / buurt) concurrently, and orchestrates
//! multi-year historic batches with rate-limit pacing and per-year failure
//! isolation.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wijkdata::{DataSource, DatasetRegistry, HistoricFetcher, HistoricOptions, HttpOdataClient};
//! use wijkdata::types::{CodeName, GeographicCodes};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let registry = Arc::new(DatasetRegistry::standard());
//! let fetcher = Arc::new(HttpOdataClient::new()?);
//!
//! let codes = GeographicCodes {
//!     municipality: CodeName { code: "GM0344".into(), name: "Utrecht".into() },
//!     district: None,
//!     neighborhood: None,
//! };
//!
//! let safety = HistoricFetcher::new(DataSource::Safety, registry, fetcher);
//! let series = safety
//!     .fetch_historic_data(&codes, Some(&[2023, 2022]), &HistoricOptions::default())
//!     .await;
//! println!("fetched {} years", series.len());
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Geographic and response types
pub mod types;

// Dataset registry: (source, year) -> dataset id / endpoint / period code
pub mod registry;

// OData fetch primitive and per-source multi-level client
pub mod client;

// Multi-year historic orchestrator
pub mod historic;

// String-keyed facade for UI/report layers
pub mod unified;

pub use client::{HttpOdataClient, OdataFetch, SourceClient};
pub use error::FetchError;
pub use historic::{HistoricFetcher, HistoricOptions};
pub use registry::{
    AvailabilityMatrix, DataSource, DatasetConfig, DatasetRegistry, ResolvedDataset,
    SharedDataset, SourceAvailability,
};
pub use types::{HistoricResponse, HistoricSeries, LeveledResponse, MultiLevelResponse};
