use thiserror::Error;

use crate::config::ConfigError;
use crate::data::DataError;
use crate::forecast::PredictionError;
use crate::model::ModelError;
use crate::scaling::ScalingError;

/// Every failure a pipeline stage can end with.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Data format error: {0}")]
    DataFormat(#[from] DataError),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Prediction error: {0}")]
    Prediction(#[from] PredictionError),
    #[error("Failed to write predictions to {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode predictions: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl Error {
    /// The scaling failure behind this error, if any.
    pub fn scaling_error(&self) -> Option<&ScalingError> {
        match self {
            Error::Model(ModelError::Scaling(err))
            | Error::Model(ModelError::Prediction(PredictionError::Scaling(err)))
            | Error::Prediction(PredictionError::Scaling(err)) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
