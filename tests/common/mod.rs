//! Shared test doubles: a scripted OData fetcher that records every call.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use wijkdata::types::{CodeName, GeographicCodes, Row};
use wijkdata::{FetchError, OdataFetch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub base_url: String,
    pub code: String,
    pub period: String,
}

type Responder = Box<dyn Fn(&str, &str, &str) -> Result<Vec<Row>, FetchError> + Send + Sync>;

/// OData fetcher whose answers come from a closure over (base_url, code,
/// period). Calls are recorded in order.
pub struct ScriptedOdata {
    responder: Responder,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedOdata {
    pub fn new(
        responder: impl Fn(&str, &str, &str) -> Result<Vec<Row>, FetchError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// One row for every lookup.
    pub fn always_one_row() -> Self {
        Self::new(|_, code, _| Ok(vec![row_for(code)]))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OdataFetch for ScriptedOdata {
    async fn fetch_rows(
        &self,
        base_url: &str,
        code: &str,
        period: &str,
    ) -> Result<Vec<Row>, FetchError> {
        self.calls.lock().unwrap().push(RecordedCall {
            base_url: base_url.to_string(),
            code: code.to_string(),
            period: period.to_string(),
        });
        (self.responder)(base_url, code, period)
    }
}

/// A plausible upstream row keyed by the code that produced it.
pub fn row_for(code: &str) -> Row {
    let mut row = Row::new();
    row.insert("WijkenEnBuurten".into(), json!(code));
    row.insert("AantalInwoners_5".into(), json!(12345));
    row
}

pub fn status_error() -> FetchError {
    FetchError::Status {
        status: 503,
        url: "https://example.invalid/odata".into(),
    }
}

pub fn amsterdam_full() -> GeographicCodes {
    GeographicCodes {
        municipality: CodeName {
            code: "GM0363".into(),
            name: "Amsterdam".into(),
        },
        district: Some(CodeName {
            code: "WK036300".into(),
            name: "Centrum".into(),
        }),
        neighborhood: Some(CodeName {
            code: "BU03630001".into(),
            name: "Burgwallen-Oude Zijde".into(),
        }),
    }
}

pub fn amsterdam_municipality_only() -> GeographicCodes {
    GeographicCodes {
        municipality: CodeName {
            code: "GM0363".into(),
            name: "Amsterdam".into(),
        },
        district: None,
        neighborhood: None,
    }
}
