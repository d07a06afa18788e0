use approx::assert_relative_eq;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};
use token_forecast::config::{Config, PathSettings};
use token_forecast::model::ModelError;
use token_forecast::{pipeline, Error, ForecastStrategy, ScalingError};

fn config_in(dir: &Path) -> Config {
    Config {
        paths: PathSettings {
            raw_data: dir.join("data.json"),
            cleaned_data: dir.join("cleaned_data.csv"),
            model: dir.join("model.bin"),
            predictions: dir.join("predictions.json"),
        },
        ..Config::default()
    }
}

fn write_export(dir: &Path, opens: &[f64]) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let data: Vec<_> = opens
        .iter()
        .enumerate()
        .map(|(i, &open)| {
            let date = start + chrono::Days::new(i as u64);
            json!({
                "block_date": format!("{} 00:00:00.000 UTC", date),
                "token": "0xabc",
                "token_symbol": "TOK",
                "open": open,
                "prediction": open * 1.01,
                "prediction_lb": open * 0.95,
                "prediction_ub": null,
            })
        })
        .collect();
    fs::write(
        dir.join("data.json"),
        serde_json::to_string(&json!({ "data": data })).unwrap(),
    )
    .unwrap();
}

fn noisy_opens(n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut value: f64 = 2.0;
    (0..n)
        .map(|_| {
            value = (value * (1.0 + rng.gen_range(-0.05..0.05))).max(0.1);
            value
        })
        .collect()
}

fn setup(opens: &[f64]) -> (TempDir, Config) {
    let dir = tempdir().unwrap();
    write_export(dir.path(), opens);
    let mut config = config_in(dir.path());
    config.forecast.start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
    (dir, config)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 6, 1).unwrap()
}

#[test]
fn single_row_export_flattens_to_one_csv_row() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("data.json"),
        r#"{"data": [{"block_date": "2024-01-01", "token": "0xabc", "token_symbol": "TOK", "open": 1.5, "prediction": 1.6, "prediction_lb": 1.4, "prediction_ub": 1.8}]}"#,
    )
    .unwrap();
    let config = config_in(dir.path());

    let rows = pipeline::preprocess(&config.paths).unwrap();

    assert_eq!(rows, 1);
    let csv = fs::read_to_string(&config.paths.cleaned_data).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "date,token,symbol,open_price,predicted_price,prediction_lb,prediction_ub"
    );
    assert_eq!(lines[1], "2024-01-01,0xabc,TOK,1.5,1.6,1.4,1.8");
}

#[test]
fn single_feature_pipeline_rolls_learned_growth() {
    let opens = noisy_opens(40);
    let (_dir, config) = setup(&opens);

    let points = pipeline::run(&config, today()).unwrap();

    assert_eq!(points.len(), 10);
    let mut expected = *opens.last().unwrap();
    for (i, point) in points.iter().enumerate() {
        expected *= 1.01;
        assert_eq!(
            point.date,
            NaiveDate::from_ymd_opt(2024, 1, 2 + i as u32).unwrap()
        );
        assert_relative_eq!(point.predicted_price, expected, max_relative = 1e-6);
    }

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.paths.predictions).unwrap()).unwrap();
    let records = written.as_array().unwrap();
    assert_eq!(records.len(), 10);
    assert_eq!(records[0]["date"], "2024-01-02");
    assert!(records[9]["predicted_price"].is_number());
}

#[test]
fn train_reports_held_out_metrics() {
    let (_dir, config) = setup(&noisy_opens(40));
    pipeline::preprocess(&config.paths).unwrap();

    let report = pipeline::train(&config).unwrap();

    assert_eq!(report.strategy, ForecastStrategy::SingleFeatureIterative);
    assert_eq!(report.train_rows, 32);
    let metrics = report.test_metrics.unwrap();
    assert_eq!(metrics.samples, 8);
    assert!(metrics.r_squared > 0.999);
}

#[test]
fn start_date_defaults_to_today() {
    let (_dir, mut config) = setup(&noisy_opens(20));
    config.forecast.start_date = None;

    let points = pipeline::run(&config, today()).unwrap();

    assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2030, 6, 2).unwrap());
    assert_eq!(points[9].date, NaiveDate::from_ymd_opt(2030, 6, 11).unwrap());
}

#[test]
fn windowed_pipeline_produces_dated_horizon() {
    let opens = noisy_opens(80);
    let (_dir, mut config) = setup(&opens);
    config.forecast.strategy = ForecastStrategy::WindowedSequence;

    let points = pipeline::run(&config, today()).unwrap();

    assert_eq!(points.len(), 10);
    for (i, point) in points.iter().enumerate() {
        assert_eq!(
            point.date,
            NaiveDate::from_ymd_opt(2024, 1, 2 + i as u32).unwrap()
        );
        assert!(point.predicted_price.is_finite());
    }
}

#[test]
fn windowed_pipeline_needs_enough_history() {
    let (_dir, mut config) = setup(&noisy_opens(25));
    config.forecast.strategy = ForecastStrategy::WindowedSequence;
    pipeline::preprocess(&config.paths).unwrap();

    let err = pipeline::train(&config).unwrap_err();

    assert!(matches!(
        err,
        Error::Model(ModelError::InsufficientData {
            required: 31,
            available: 25
        })
    ));
}

#[test]
fn constant_series_fails_with_degenerate_range() {
    let (_dir, mut config) = setup(&[5.0; 40]);
    config.forecast.strategy = ForecastStrategy::WindowedSequence;
    pipeline::preprocess(&config.paths).unwrap();

    let err = pipeline::train(&config).unwrap_err();

    assert!(matches!(
        err.scaling_error(),
        Some(ScalingError::DegenerateRange(v)) if *v == 5.0
    ));
}

#[test]
fn model_strategy_must_match_prediction_strategy() {
    let (_dir, mut config) = setup(&noisy_opens(40));
    pipeline::preprocess(&config.paths).unwrap();
    pipeline::train(&config).unwrap();

    config.forecast.strategy = ForecastStrategy::WindowedSequence;
    let err = pipeline::predict(&config, today()).unwrap_err();

    assert!(matches!(
        err,
        Error::Model(ModelError::StrategyMismatch { .. })
    ));
    assert!(!config.paths.predictions.exists());
}

#[test]
fn predicting_without_a_model_fails() {
    let (_dir, config) = setup(&noisy_opens(10));
    pipeline::preprocess(&config.paths).unwrap();

    let err = pipeline::predict(&config, today()).unwrap_err();

    assert!(matches!(err, Error::Model(ModelError::Io { .. })));
}
