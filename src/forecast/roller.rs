use super::{
    forecast_date, ForecastPoint, ForecastStrategy, Forecaster, PredictionError, Result,
    ScalarPredictor,
};
use chrono::NaiveDate;
use tracing::debug;

/// Roll a single-feature predictor forward `horizon` days from `start`.
///
/// Day `i` is dated `start + i` and holds `P(value_{i-1})` with
/// `value_0 = initial`. The first failing step aborts the whole roll, no
/// partial forecast is returned.
pub fn roll<P: ScalarPredictor + ?Sized>(
    predictor: &P,
    initial: f64,
    horizon: usize,
    start: NaiveDate,
) -> Result<Vec<ForecastPoint>> {
    let mut points = Vec::with_capacity(horizon);
    let mut value = initial;

    for step in 1..=horizon {
        let date = forecast_date(start, step)?;
        value = predictor.predict_scalar(value)?;
        debug!(step, %date, value, "rolled forecast step");
        points.push(ForecastPoint {
            date,
            predicted_price: value,
        });
    }

    Ok(points)
}

/// Single-feature iterative strategy: starts from the last observed open
/// price and rolls the predictor over its own output.
pub struct IterativeForecaster<P: ScalarPredictor> {
    predictor: P,
}

impl<P: ScalarPredictor> IterativeForecaster<P> {
    pub fn new(predictor: P) -> Self {
        Self { predictor }
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }
}

impl<P: ScalarPredictor> Forecaster for IterativeForecaster<P> {
    fn strategy(&self) -> ForecastStrategy {
        ForecastStrategy::SingleFeatureIterative
    }

    fn forecast(
        &self,
        history: &[f64],
        start: NaiveDate,
        horizon: usize,
    ) -> Result<Vec<ForecastPoint>> {
        let last_open = history
            .last()
            .copied()
            .ok_or(PredictionError::InsufficientHistory {
                required: 1,
                available: 0,
            })?;
        roll(&self.predictor, last_open, horizon, start)
    }
}
