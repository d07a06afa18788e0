//! Multi-day forecasting on top of a fitted predictor.
//!
//! Two strategies share the [`Forecaster`] interface:
//!
//! * [`ForecastStrategy::SingleFeatureIterative`] feeds each day's prediction
//!   back in as the next day's open price (see [`roller`]).
//! * [`ForecastStrategy::WindowedSequence`] scales the last window of open
//!   prices, predicts the whole horizon in one model call and maps the output
//!   back to the price scale (see [`windowed`]).

pub mod roller;
pub mod windowed;

use chrono::{Days, NaiveDate};
use ndarray::{Array2, ArrayView3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::scaling::ScalingError;

pub use roller::{roll, IterativeForecaster};
pub use windowed::WindowedForecaster;

/// Number of daily predictions produced by one run.
pub const DEFAULT_HORIZON: usize = 10;

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Model call failed: {0}")]
    Model(String),
    #[error("Unexpected shape: expected {expected:?}, got {actual:?}")]
    Shape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("Insufficient history: need {required} values, have {available}")]
    InsufficientHistory { required: usize, available: usize },
    #[error("Forecast date overflows the calendar")]
    DateOverflow,
    #[error(transparent)]
    Scaling(#[from] ScalingError),
}

pub type Result<T> = std::result::Result<T, PredictionError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_price: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForecastStrategy {
    #[default]
    SingleFeatureIterative,
    WindowedSequence,
}

impl ForecastStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastStrategy::SingleFeatureIterative => "single-feature-iterative",
            ForecastStrategy::WindowedSequence => "windowed-sequence",
        }
    }
}

impl fmt::Display for ForecastStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForecastStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "single-feature-iterative" => Ok(ForecastStrategy::SingleFeatureIterative),
            "windowed-sequence" => Ok(ForecastStrategy::WindowedSequence),
            other => Err(format!(
                "unknown strategy {other:?}, expected single-feature-iterative or windowed-sequence"
            )),
        }
    }
}

/// A fitted model mapping one open price to the next day's price.
pub trait ScalarPredictor {
    fn predict_scalar(&self, feature: f64) -> Result<f64>;
}

/// A fitted model mapping a `(1, window, 1)` tensor to a `(1, horizon)` one.
pub trait SequencePredictor {
    fn window_len(&self) -> usize;
    fn predict_sequence(&self, window: ArrayView3<f64>) -> Result<Array2<f64>>;
}

pub trait Forecaster {
    fn strategy(&self) -> ForecastStrategy;

    /// Forecast `horizon` days after `start` from the historical open prices.
    fn forecast(
        &self,
        history: &[f64],
        start: NaiveDate,
        horizon: usize,
    ) -> Result<Vec<ForecastPoint>>;
}

/// Date of the `step`-th forecast day (1-based) after `start`.
pub(crate) fn forecast_date(start: NaiveDate, step: usize) -> Result<NaiveDate> {
    start
        .checked_add_days(Days::new(step as u64))
        .ok_or(PredictionError::DateOverflow)
}
