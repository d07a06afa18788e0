use super::{
    forecast_date, ForecastPoint, ForecastStrategy, Forecaster, PredictionError, Result,
    SequencePredictor,
};
use crate::scaling::Bounds;
use chrono::NaiveDate;
use ndarray::Array3;
use tracing::debug;

/// Windowed-sequence strategy.
///
/// Bounds are fit on the full history, the last `window_len` open prices are
/// scaled and shaped `(1, window_len, 1)`, and the model predicts the whole
/// horizon in one call. With `reuse_bounds` unset the output is unscaled with
/// bounds re-fit on the raw inference window instead of the forward bounds.
pub struct WindowedForecaster<P: SequencePredictor> {
    predictor: P,
    reuse_bounds: bool,
}

impl<P: SequencePredictor> WindowedForecaster<P> {
    pub fn new(predictor: P, reuse_bounds: bool) -> Self {
        Self {
            predictor,
            reuse_bounds,
        }
    }

    pub fn reuse_bounds(&self) -> bool {
        self.reuse_bounds
    }
}

impl<P: SequencePredictor> Forecaster for WindowedForecaster<P> {
    fn strategy(&self) -> ForecastStrategy {
        ForecastStrategy::WindowedSequence
    }

    fn forecast(
        &self,
        history: &[f64],
        start: NaiveDate,
        horizon: usize,
    ) -> Result<Vec<ForecastPoint>> {
        let window_len = self.predictor.window_len();
        if history.len() < window_len {
            return Err(PredictionError::InsufficientHistory {
                required: window_len,
                available: history.len(),
            });
        }

        let bounds = Bounds::fit_slice(history)?;
        let raw_window = &history[history.len() - window_len..];
        let input = Array3::from_shape_vec((1, window_len, 1), raw_window.to_vec()).map_err(
            |_| PredictionError::Shape {
                expected: vec![1, window_len, 1],
                actual: vec![raw_window.len()],
            },
        )?;
        let scaled = bounds.forward_array(&input);

        let output = self.predictor.predict_sequence(scaled.view())?;
        if output.shape() != [1, horizon] {
            return Err(PredictionError::Shape {
                expected: vec![1, horizon],
                actual: output.shape().to_vec(),
            });
        }

        let inverse_bounds = if self.reuse_bounds {
            bounds
        } else {
            Bounds::fit_slice(raw_window)?
        };
        debug!(?bounds, ?inverse_bounds, window_len, "unscaling sequence output");

        inverse_bounds
            .inverse_array(&output)
            .iter()
            .enumerate()
            .map(|(i, &value)| -> Result<ForecastPoint> {
                Ok(ForecastPoint {
                    date: forecast_date(start, i + 1)?,
                    predicted_price: value,
                })
            })
            .collect()
    }
}
