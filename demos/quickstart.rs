//! Quickstart example demonstrating basic usage of epm-forecast.
//!
//! Run with: cargo run --example quickstart
//! Set RUST_LOG=epm_forecast=debug to see per-candidate scores.

use chrono::{Duration, TimeZone, Utc};
use epm_forecast::core::TimeSeries;
use epm_forecast::models::{LinearLagRegressor, ModelRegistry, ModelSpec};
use epm_forecast::pipeline::{ForecastPipeline, PipelineConfig};
use epm_forecast::supervised::{series_to_supervised, MissingLags};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "epm_forecast=info".into()),
        )
        .init();

    println!("=== epm-forecast Quickstart ===\n");

    // 1. Two years of weekly petrol prices in EUR per 1000 litres
    let timestamps: Vec<_> = (0..104)
        .map(|i| Utc.with_ymd_and_hms(2022, 1, 3, 0, 0, 0).unwrap() + Duration::weeks(i))
        .collect();

    let values: Vec<f64> = (0..104)
        .map(|i| {
            1750.0                                                // base level
            + 1.2 * i as f64                                      // slow drift
            + 60.0 * (2.0 * std::f64::consts::PI * i as f64 / 52.0).sin() // yearly cycle
            + 8.0 * ((i * 37 % 11) as f64 - 5.0) / 5.0            // weekly noise
        })
        .collect();

    let ts = TimeSeries::univariate(timestamps, values.clone()).unwrap();
    println!("Created price series with {} weekly observations", ts.len());

    // 2. Lag frame
    println!("\n--- Lag frame (n_in = 3) ---");
    let frame = series_to_supervised(&values, 3, MissingLags::Drop);
    println!("{:?}", frame.column_names());
    for row in frame.rows().iter().take(3) {
        println!("  {:?}", row);
    }
    println!("  ... {} rows", frame.len());

    // 3. Evaluate built-in candidates on the last 20% of the series
    println!("\n--- Evaluation ---");
    let config = PipelineConfig::default().with_lags(3).with_scale(1000.0);
    let pipeline = ForecastPipeline::new(config);
    let report = pipeline.run(&ts, &ModelRegistry::with_builtin()).unwrap();

    for score in &report.candidate_scores {
        println!(
            "  {:<18} CV MAE = {:.5}",
            score.name, score.results.aggregated.mae
        );
    }
    println!("Selected: {}", report.model_name);
    println!("Test MAE:  {:.5} EUR/l", report.metrics.mae);
    if let Some(mape) = report.metrics.mape {
        println!("Test MAPE: {:.2}%", mape);
    }

    println!("\n{:>12} {:>10} {:>10}", "Week", "Actual", "Forecast");
    println!("{:-<34}", "");
    for ((stamp, pred), actual) in report.forecast.iter_stamped().zip(report.actual()) {
        println!(
            "{:>12} {:>10.4} {:>10.4}",
            stamp.format("%Y-%m-%d"),
            actual,
            pred
        );
    }

    // 4. Forecast beyond the end of the series
    println!("\n--- Next 4 weeks ---");
    let spec = ModelSpec::new("Linear", || Box::new(LinearLagRegressor::new()));
    let ahead = pipeline.forecast_ahead(&ts, &spec, 4).unwrap();
    for (stamp, pred) in ahead.iter_stamped() {
        println!("  {}: {:.4} EUR/l", stamp.format("%Y-%m-%d"), pred);
    }
}
