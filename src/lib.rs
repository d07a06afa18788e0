//! Token price forecasting pipeline.
//!
//! Flattens a raw token price export into a CSV price series, fits a model
//! relating the open price to the next price, and rolls a ten-day daily
//! forecast from the last observed open price.

pub mod config;
pub mod data;
pub mod error;
pub mod forecast;
pub mod model;
pub mod pipeline;
pub mod scaling;

pub use config::Config;
pub use error::{Error, Result};
pub use forecast::{
    roll, ForecastPoint, ForecastStrategy, Forecaster, IterativeForecaster, PredictionError,
    ScalarPredictor, SequencePredictor, WindowedForecaster, DEFAULT_HORIZON,
};
pub use model::{LinearPriceModel, ModelArtifact, WindowedSequenceModel};
pub use scaling::{Bounds, ScalingError};
