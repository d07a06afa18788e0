pub mod export;
pub mod loader;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw export as produced by the upstream data provider.
#[derive(Debug, Default, Deserialize)]
pub struct RawExport {
    #[serde(default)]
    pub data: Vec<RawRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    pub block_date: String,
    pub token: String,
    pub token_symbol: String,
    pub open: f64,
    pub prediction: f64,
    pub prediction_lb: Option<f64>,
    pub prediction_ub: Option<f64>,
}

/// One row of the cleaned price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub token: String,
    pub symbol: String,
    pub open_price: f64,
    pub predicted_price: f64,
    pub prediction_lb: Option<f64>,
    pub prediction_ub: Option<f64>,
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid date {value:?} in record {index}")]
    InvalidDate { index: usize, value: String },
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("No price records found")]
    MissingData,
}

pub type Result<T> = std::result::Result<T, DataError>;
