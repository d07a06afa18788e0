//! Single-feature linear regression from open price to predicted price.

use super::evaluation::{train_test_split, FitMetrics};
use super::{ModelError, Result};
use crate::data::PriceRecord;
use crate::forecast::{self, PredictionError, ScalarPredictor};
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{
    LinearRegression, LinearRegressionParameters, LinearRegressionSolverName,
};
use tracing::info;

pub(crate) type Regressor = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;

pub(crate) fn solver_parameters() -> LinearRegressionParameters {
    LinearRegressionParameters::default().with_solver(LinearRegressionSolverName::SVD)
}

const MIN_TRAINING_ROWS: usize = 2;

#[derive(Serialize, Deserialize)]
pub struct LinearPriceModel {
    regressor: Regressor,
}

/// Outcome of [`LinearPriceModel::train`]: the fitted model plus held-out
/// metrics when the test split is non-empty.
pub struct TrainedLinearModel {
    pub model: LinearPriceModel,
    pub train_rows: usize,
    pub test_metrics: Option<FitMetrics>,
}

impl LinearPriceModel {
    /// Fit on paired `(feature, target)` samples.
    pub fn fit(features: &[f64], targets: &[f64]) -> Result<Self> {
        if features.len() != targets.len() {
            return Err(ModelError::Training(format!(
                "{} features for {} targets",
                features.len(),
                targets.len()
            )));
        }
        if features.len() < MIN_TRAINING_ROWS {
            return Err(ModelError::InsufficientData {
                required: MIN_TRAINING_ROWS,
                available: features.len(),
            });
        }

        let rows: Vec<Vec<f64>> = features.iter().map(|&x| vec![x]).collect();
        let x = DenseMatrix::from_2d_vec(&rows);
        let y = targets.to_vec();
        let regressor = LinearRegression::fit(&x, &y, solver_parameters())
            .map_err(|err| ModelError::Training(err.to_string()))?;

        Ok(Self { regressor })
    }

    /// Split the price series, fit `open_price -> predicted_price` on the
    /// training rows and score the held-out rows.
    pub fn train(records: &[PriceRecord], test_size: f64, seed: u64) -> Result<TrainedLinearModel> {
        let split = train_test_split(records.len(), test_size, seed);
        let column = |indices: &[usize], pick: fn(&PriceRecord) -> f64| -> Vec<f64> {
            indices.iter().map(|&i| pick(&records[i])).collect()
        };

        let train_x = column(&split.train, |r| r.open_price);
        let train_y = column(&split.train, |r| r.predicted_price);
        let model = Self::fit(&train_x, &train_y)?;

        let test_x = column(&split.test, |r| r.open_price);
        let test_y = column(&split.test, |r| r.predicted_price);
        let test_metrics = if test_x.is_empty() {
            None
        } else {
            let predicted = model.predict_batch(&test_x)?;
            FitMetrics::compute(&test_y, &predicted)
        };

        info!(
            train_rows = train_x.len(),
            test_rows = test_x.len(),
            r_squared = test_metrics.map(|m| m.r_squared),
            rmse = test_metrics.map(|m| m.rmse),
            "trained single-feature model"
        );

        Ok(TrainedLinearModel {
            model,
            train_rows: train_x.len(),
            test_metrics,
        })
    }

    pub fn predict_batch(&self, features: &[f64]) -> forecast::Result<Vec<f64>> {
        let rows: Vec<Vec<f64>> = features.iter().map(|&x| vec![x]).collect();
        let x = DenseMatrix::from_2d_vec(&rows);
        let predicted = self
            .regressor
            .predict(&x)
            .map_err(|err| PredictionError::Model(err.to_string()))?;

        if predicted.len() != features.len() {
            return Err(PredictionError::Shape {
                expected: vec![features.len()],
                actual: vec![predicted.len()],
            });
        }
        Ok(predicted)
    }
}

impl ScalarPredictor for LinearPriceModel {
    fn predict_scalar(&self, feature: f64) -> forecast::Result<f64> {
        let predicted = self.predict_batch(&[feature])?;
        predicted
            .first()
            .copied()
            .ok_or_else(|| PredictionError::Shape {
                expected: vec![1],
                actual: vec![0],
            })
    }
}
