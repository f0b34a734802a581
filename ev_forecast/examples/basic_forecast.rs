use chrono::NaiveDate;
use ev_forecast::engine::ForecastEngine;
use ev_forecast::features::FeatureVector;
use ev_forecast::models::FnPredictor;
use ev_forecast::report::{ComparisonReport, CountyOutlook};
use ev_forecast::utils::synthetic_series;
use ev_forecast::EvDataset;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Build three synthetic county histories (4 years of monthly counts)
    let start = NaiveDate::from_ymd_opt(2020, 1, 31).ok_or("invalid start date")?;
    let dataset = EvDataset::from_series(vec![
        synthetic_series("King", 16, start, 48, 1)?,
        synthetic_series("Pierce", 26, start, 48, 2)?,
        synthetic_series("Spokane", 31, start, 48, 3)?,
    ]);
    println!("Loaded {} counties", dataset.len());

    // Stand-in for a trained model: continue the recent trend, damped
    let model = FnPredictor::new("damped trend", |f: &FeatureVector| {
        Ok((f.ev_total_roll_mean_3 + 0.5 * f.ev_growth_slope / 6.0).max(0.0))
    });

    let engine = ForecastEngine::default();

    let king = dataset.county("King")?;
    let outlook = CountyOutlook::forecast_county(king, &model, &engine)?;
    println!("{}", outlook);

    println!("First forecast months for {}:", king.county());
    for point in outlook.forecast().points().iter().take(6) {
        println!(
            "  {}: {:>6} (cumulative {:.0})",
            point.date, point.rounded, point.cumulative
        );
    }

    let comparison = ComparisonReport::build(
        &dataset,
        &["King", "Pierce", "Spokane"],
        &model,
        &engine,
        3,
    )?;
    println!("{}", comparison);

    Ok(())
}
