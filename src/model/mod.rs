pub mod evaluation;
pub mod linear;
pub mod sequence;

use crate::forecast::{
    ForecastStrategy, Forecaster, IterativeForecaster, PredictionError, WindowedForecaster,
};
use crate::scaling::ScalingError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub use evaluation::{train_test_split, FitMetrics, Split};
pub use linear::{LinearPriceModel, TrainedLinearModel};
pub use sequence::WindowedSequenceModel;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("I/O error on model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Model artifact encoding error: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("Model training failed: {0}")]
    Training(String),
    #[error("Insufficient training data: need {required} rows, have {available}")]
    InsufficientData { required: usize, available: usize },
    #[error("Model artifact holds a {found} model but {expected} was requested")]
    StrategyMismatch {
        expected: ForecastStrategy,
        found: ForecastStrategy,
    },
    #[error(transparent)]
    Scaling(#[from] ScalingError),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// Persisted form of a fitted model, tagged with the strategy it serves.
#[derive(Serialize, Deserialize)]
pub enum ModelArtifact {
    SingleFeature(LinearPriceModel),
    WindowedSequence(WindowedSequenceModel),
}

impl ModelArtifact {
    pub fn strategy(&self) -> ForecastStrategy {
        match self {
            ModelArtifact::SingleFeature(_) => ForecastStrategy::SingleFeatureIterative,
            ModelArtifact::WindowedSequence(_) => ForecastStrategy::WindowedSequence,
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let io_error = |source: std::io::Error| ModelError::Io {
            path: path.display().to_string(),
            source,
        };

        let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush().map_err(io_error)?;

        info!(path = %path.display(), strategy = %self.strategy(), "saved model artifact");
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let artifact: ModelArtifact = bincode::deserialize_from(BufReader::new(file))?;

        info!(path = %path.display(), strategy = %artifact.strategy(), "loaded model artifact");
        Ok(artifact)
    }

    /// Wrap the model in the forecaster for its strategy, failing when the
    /// artifact does not match the strategy the caller asked for.
    pub fn into_forecaster(
        self,
        expected: ForecastStrategy,
        reuse_bounds: bool,
    ) -> Result<Box<dyn Forecaster>> {
        let found = self.strategy();
        if found != expected {
            return Err(ModelError::StrategyMismatch { expected, found });
        }

        let forecaster: Box<dyn Forecaster> = match self {
            ModelArtifact::SingleFeature(model) => Box::new(IterativeForecaster::new(model)),
            ModelArtifact::WindowedSequence(model) => {
                Box::new(WindowedForecaster::new(model, reuse_bounds))
            }
        };
        Ok(forecaster)
    }
}
