//! The three batch stages, each reading and writing artifacts on disk.
//!
//! `data.json` → [`preprocess`] → `cleaned_data.csv` → [`train`] → model
//! artifact → [`predict`] → `predictions.json`.

use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::config::{Config, PathSettings};
use crate::data::export;
use crate::data::loader::DataLoader;
use crate::error::{Error, Result};
use crate::forecast::{ForecastPoint, ForecastStrategy};
use crate::model::{FitMetrics, LinearPriceModel, ModelArtifact, WindowedSequenceModel};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub strategy: ForecastStrategy,
    pub train_rows: usize,
    pub test_metrics: Option<FitMetrics>,
}

/// Flatten the raw export into the cleaned CSV. Returns the row count.
pub fn preprocess(paths: &PathSettings) -> Result<usize> {
    let raw = export::load_export(&paths.raw_data)?;
    let records = export::flatten(&raw)?;
    DataLoader::write_records(&paths.cleaned_data, &records)?;
    Ok(records.len())
}

/// Fit the model for the configured strategy and persist it.
pub fn train(config: &Config) -> Result<TrainingReport> {
    let records = DataLoader::load_records(&config.paths.cleaned_data)?;
    let strategy = config.forecast.strategy;

    let (artifact, report) = match strategy {
        ForecastStrategy::SingleFeatureIterative => {
            let trained = LinearPriceModel::train(
                &records,
                config.training.test_size,
                config.training.seed,
            )?;
            let report = TrainingReport {
                strategy,
                train_rows: trained.train_rows,
                test_metrics: trained.test_metrics,
            };
            (ModelArtifact::SingleFeature(trained.model), report)
        }
        ForecastStrategy::WindowedSequence => {
            let opens: Vec<f64> = records.iter().map(|r| r.open_price).collect();
            let model = WindowedSequenceModel::train(
                &opens,
                config.training.window_size,
                config.forecast.horizon,
            )?;
            let report = TrainingReport {
                strategy,
                train_rows: opens.len(),
                test_metrics: None,
            };
            (ModelArtifact::WindowedSequence(model), report)
        }
    };

    artifact.save(&config.paths.model)?;
    Ok(report)
}

/// Load the model and forecast from the last observed open price.
///
/// The first forecast day follows `forecast.start_date`, or `today` when the
/// config leaves it unset.
pub fn predict(config: &Config, today: NaiveDate) -> Result<Vec<ForecastPoint>> {
    let history = DataLoader::load_open_prices(&config.paths.cleaned_data)?;
    let forecaster = ModelArtifact::load(&config.paths.model)?
        .into_forecaster(config.forecast.strategy, config.forecast.reuse_bounds)?;

    let start = config.forecast.start_date.unwrap_or(today);
    let points = forecaster.forecast(&history, start, config.forecast.horizon)?;
    info!(
        strategy = %forecaster.strategy(),
        %start,
        days = points.len(),
        "forecast complete"
    );

    write_predictions(&config.paths.predictions, &points)?;
    Ok(points)
}

/// Write predictions as a pretty-printed JSON array of records.
pub fn write_predictions<P: AsRef<Path>>(path: P, points: &[ForecastPoint]) -> Result<()> {
    let path = path.as_ref();
    let output_error = |source: std::io::Error| Error::Output {
        path: path.display().to_string(),
        source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(output_error)?);
    serde_json::to_writer_pretty(&mut writer, points)?;
    writer.write_all(b"\n").map_err(output_error)?;
    writer.flush().map_err(output_error)?;

    info!(path = %path.display(), records = points.len(), "saved predictions");
    Ok(())
}

/// Run preprocess, train and predict back to back.
pub fn run(config: &Config, today: NaiveDate) -> Result<Vec<ForecastPoint>> {
    let rows = preprocess(&config.paths)?;
    info!(rows, "preprocess stage done");
    let report = train(config)?;
    info!(train_rows = report.train_rows, "train stage done");
    predict(config, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_predictions_file_is_pretty_record_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("predictions.json");
        let points = vec![
            ForecastPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                predicted_price: 101.0,
            },
            ForecastPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                predicted_price: 102.01,
            },
        ];

        write_predictions(&path, &points).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("[\n  {\n    \"date\": \"2024-01-02\""));
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!([
                {"date": "2024-01-02", "predicted_price": 101.0},
                {"date": "2024-01-03", "predicted_price": 102.01}
            ])
        );
    }

    #[test]
    fn test_missing_raw_export_is_data_error() {
        let dir = tempdir().unwrap();
        let paths = PathSettings {
            raw_data: dir.path().join("missing.json"),
            cleaned_data: dir.path().join("cleaned_data.csv"),
            model: dir.path().join("model.bin"),
            predictions: dir.path().join("predictions.json"),
        };

        assert!(matches!(preprocess(&paths), Err(Error::DataFormat(_))));
        assert!(!paths.cleaned_data.exists());
    }
}
