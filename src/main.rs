use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use token_forecast::{pipeline, Config, ForecastStrategy};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "token-forecast")]
#[command(about = "Token price forecasting pipeline", long_about = None)]
struct Cli {
    /// Pipeline configuration (YAML); built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Flatten the raw JSON export into the cleaned CSV
    Preprocess,

    /// Fit and persist the model for the selected strategy
    Train {
        #[command(flatten)]
        forecast: ForecastArgs,
    },

    /// Roll the daily forecast and write predictions
    Predict {
        #[command(flatten)]
        forecast: ForecastArgs,
    },

    /// Preprocess, train and predict in one go
    Run {
        #[command(flatten)]
        forecast: ForecastArgs,
    },
}

#[derive(Args)]
struct ForecastArgs {
    /// single-feature-iterative or windowed-sequence
    #[arg(short, long)]
    strategy: Option<ForecastStrategy>,

    /// Number of days to forecast
    #[arg(long)]
    horizon: Option<usize>,

    /// Forecast the days after this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Unscale sequence output with bounds re-fit on the inference window
    #[arg(long)]
    refit_bounds: bool,
}

impl ForecastArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(strategy) = self.strategy {
            config.forecast.strategy = strategy;
        }
        if let Some(horizon) = self.horizon {
            config.forecast.horizon = horizon;
        }
        if let Some(start_date) = self.start_date {
            config.forecast.start_date = Some(start_date);
        }
        if self.refit_bounds {
            config.forecast.reuse_bounds = false;
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    let today = Utc::now().date_naive();

    match cli.command {
        Command::Preprocess => {
            let rows = pipeline::preprocess(&config.paths)?;
            println!(
                "Preprocessed {} records into {}",
                rows,
                config.paths.cleaned_data.display()
            );
        }
        Command::Train { forecast } => {
            forecast.apply(&mut config);
            config.validate()?;
            let report = pipeline::train(&config)?;
            println!(
                "Trained {} model on {} rows, saved to {}",
                report.strategy,
                report.train_rows,
                config.paths.model.display()
            );
            if let Some(metrics) = report.test_metrics {
                println!(
                    "Held-out R-squared: {:.4}, RMSE: {:.6} ({} rows)",
                    metrics.r_squared, metrics.rmse, metrics.samples
                );
            }
        }
        Command::Predict { forecast } => {
            forecast.apply(&mut config);
            config.validate()?;
            let points = pipeline::predict(&config, today)?;
            print_forecast(&points, &config);
        }
        Command::Run { forecast } => {
            forecast.apply(&mut config);
            config.validate()?;
            let points = pipeline::run(&config, today)?;
            print_forecast(&points, &config);
        }
    }

    info!("done");
    Ok(())
}

fn print_forecast(points: &[token_forecast::ForecastPoint], config: &Config) {
    println!("\n{:<12} {:>16}", "Date", "Predicted price");
    println!("{:-<29}", "");
    for point in points {
        println!("{:<12} {:>16.6}", point.date.to_string(), point.predicted_price);
    }
    println!(
        "\nPredictions for the next {} days saved to {}",
        points.len(),
        config.paths.predictions.display()
    );
}
