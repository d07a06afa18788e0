//! Windowed sequence model: a window of scaled open prices in, one scaled
//! value per forecast day out.
//!
//! Each output day has its own linear regressor over the flattened window
//! (direct multi-step forecasting), so the whole horizon comes from a single
//! model call with no feedback between days.

use super::linear::{solver_parameters, Regressor};
use super::{ModelError, Result};
use crate::forecast::{self, PredictionError, SequencePredictor};
use crate::scaling::Bounds;
use ndarray::{Array2, ArrayView3};
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::LinearRegression;
use tracing::info;

#[derive(Serialize, Deserialize)]
pub struct WindowedSequenceModel {
    window: usize,
    horizon: usize,
    steps: Vec<Regressor>,
}

impl WindowedSequenceModel {
    /// Fewest series values that yield more training windows than
    /// regression parameters.
    pub fn required_rows(window: usize, horizon: usize) -> usize {
        2 * window + horizon + 1
    }

    /// Fit on a raw open-price series, scaling it with bounds fit on the same
    /// series.
    pub fn train(series: &[f64], window: usize, horizon: usize) -> Result<Self> {
        if window == 0 || horizon == 0 {
            return Err(ModelError::Training(format!(
                "window ({window}) and horizon ({horizon}) must be positive"
            )));
        }
        let required = Self::required_rows(window, horizon);
        if series.len() < required {
            return Err(ModelError::InsufficientData {
                required,
                available: series.len(),
            });
        }

        let bounds = Bounds::fit_slice(series)?;
        let scaled: Vec<f64> = series.iter().map(|&v| bounds.forward(v)).collect();

        let n_samples = scaled.len() - window - horizon + 1;
        let inputs: Vec<Vec<f64>> = (0..n_samples)
            .map(|i| scaled[i..i + window].to_vec())
            .collect();
        let x = DenseMatrix::from_2d_vec(&inputs);

        let mut steps = Vec::with_capacity(horizon);
        for step in 0..horizon {
            let targets: Vec<f64> = (0..n_samples).map(|i| scaled[i + window + step]).collect();
            let regressor = LinearRegression::fit(&x, &targets, solver_parameters())
                .map_err(|err| ModelError::Training(format!("day {}: {}", step + 1, err)))?;
            steps.push(regressor);
        }

        info!(window, horizon, samples = n_samples, "trained windowed sequence model");
        Ok(Self {
            window,
            horizon,
            steps,
        })
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }
}

impl SequencePredictor for WindowedSequenceModel {
    fn window_len(&self) -> usize {
        self.window
    }

    fn predict_sequence(&self, window: ArrayView3<f64>) -> forecast::Result<Array2<f64>> {
        let expected = [1, self.window, 1];
        if window.shape() != expected {
            return Err(PredictionError::Shape {
                expected: expected.to_vec(),
                actual: window.shape().to_vec(),
            });
        }

        let row: Vec<f64> = window.iter().copied().collect();
        let x = DenseMatrix::from_2d_vec(&vec![row]);

        let mut outputs = Vec::with_capacity(self.horizon);
        for regressor in &self.steps {
            let predicted = regressor
                .predict(&x)
                .map_err(|err| PredictionError::Model(err.to_string()))?;
            let value = predicted.first().copied().ok_or_else(|| PredictionError::Shape {
                expected: vec![1],
                actual: vec![0],
            })?;
            outputs.push(value);
        }

        Array2::from_shape_vec((1, outputs.len()), outputs)
            .map_err(|err| PredictionError::Model(err.to_string()))
    }
}
