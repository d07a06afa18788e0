//! Min-max scaling of price values into the `[0, 1]` range.
//!
//! [`Bounds`] are fit once on a historical series and then used for both
//! directions of the transform. Values outside the fitted range are not
//! clamped, so they extrapolate past `[0, 1]`.

use ndarray::{Array, ArrayView1, Dimension};
use ndarray_stats::errors::MinMaxError;
use ndarray_stats::QuantileExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ScalingError {
    #[error("Degenerate range: every value equals {0}")]
    DegenerateRange(f64),
    #[error("Cannot fit bounds on an empty series")]
    EmptySeries,
    #[error("Series contains non-finite values")]
    NonFinite,
}

pub type Result<T> = std::result::Result<T, ScalingError>;

impl From<MinMaxError> for ScalingError {
    fn from(err: MinMaxError) -> Self {
        match err {
            MinMaxError::EmptyInput => ScalingError::EmptySeries,
            MinMaxError::UndefinedOrder => ScalingError::NonFinite,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Fit bounds on a historical series.
    ///
    /// Fails with [`ScalingError::DegenerateRange`] when all values are equal,
    /// since the inverse transform would divide by zero.
    pub fn fit(series: ArrayView1<f64>) -> Result<Self> {
        let min = *series.min()?;
        let max = *series.max()?;

        if !min.is_finite() || !max.is_finite() {
            return Err(ScalingError::NonFinite);
        }
        if max - min == 0.0 {
            return Err(ScalingError::DegenerateRange(min));
        }

        Ok(Self { min, max })
    }

    pub fn fit_slice(series: &[f64]) -> Result<Self> {
        Self::fit(ArrayView1::from(series))
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn forward(&self, value: f64) -> f64 {
        (value - self.min) / self.range()
    }

    pub fn inverse(&self, normalized: f64) -> f64 {
        normalized * self.range() + self.min
    }

    /// Element-wise forward transform, shape is preserved.
    pub fn forward_array<D: Dimension>(&self, values: &Array<f64, D>) -> Array<f64, D> {
        values.mapv(|v| self.forward(v))
    }

    /// Element-wise inverse transform, shape is preserved.
    pub fn inverse_array<D: Dimension>(&self, values: &Array<f64, D>) -> Array<f64, D> {
        values.mapv(|v| self.inverse(v))
    }
}
