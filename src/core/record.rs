use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::calendar::add_months;
use super::error::{Result, invalid};
use super::types::{
    ForecastRecord, ForecastType, ScenarioParameters, SimulationParameters, SimulationResult,
    TrendForecastResult,
};
use crate::config::EngineConfig;

/// z-score of the two-sided 95% band used for trend records.
const TREND_Z: f64 = 1.96;

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub(crate) fn scenario_record(
    params: &ScenarioParameters,
    scenario_name: &str,
    projected_balance: f64,
    config: &EngineConfig,
) -> Result<ForecastRecord> {
    let forecast_date = params.forecast_date.unwrap_or_else(today);
    let target_date = add_months(forecast_date, params.months_to_project)?;
    let width = config.scenario_band.band_width;
    let (lower_bound, upper_bound) = ordered(
        projected_balance * (1.0 - width),
        projected_balance * (1.0 + width),
    );

    Ok(ForecastRecord {
        title: format!("{scenario_name} scenario"),
        description: format!(
            "{}-month cash flow projection at {:.2}% growth and {:.2}% inflation",
            params.months_to_project,
            params.growth_rate * 100.0,
            params.inflation_rate * 100.0
        ),
        forecast_type: ForecastType::Scenario,
        scenario: scenario_tag(scenario_name),
        forecast_date,
        target_date,
        predicted_value: projected_balance,
        confidence_interval: config.scenario_band.confidence,
        lower_bound,
        upper_bound,
        currency: config.currency.clone(),
        category: params
            .category
            .clone()
            .unwrap_or_else(|| config.category.clone()),
        account_id: params.account_id,
        parameters: serde_json::to_string(params)?,
        is_active: true,
    })
}

/// Record for a Monte Carlo run: median outcome bounded by the run's
/// confidence interval.
pub fn simulation_record(
    result: &SimulationResult,
    params: &SimulationParameters,
    forecast_date: NaiveDate,
    account_id: Option<Uuid>,
    config: &EngineConfig,
) -> Result<ForecastRecord> {
    Ok(ForecastRecord {
        title: "Monte Carlo balance simulation".to_string(),
        description: format!(
            "{} simulated paths over {} months",
            params.iterations, params.time_horizon_months
        ),
        forecast_type: ForecastType::MonteCarlo,
        scenario: "simulated".to_string(),
        forecast_date,
        target_date: add_months(forecast_date, params.time_horizon_months)?,
        predicted_value: result.median,
        confidence_interval: params.confidence_level * 100.0,
        lower_bound: result.confidence_interval.lower,
        upper_bound: result.confidence_interval.upper,
        currency: config.currency.clone(),
        category: config.category.clone(),
        account_id,
        parameters: serde_json::to_string(params)?,
        is_active: true,
    })
}

/// Record for a trend fit: the final prediction with a band of
/// ±1.96 residual standard errors, floored at zero.
pub fn trend_record(
    result: &TrendForecastResult,
    forecast_months: u32,
    account_id: Option<Uuid>,
    config: &EngineConfig,
) -> Result<ForecastRecord> {
    let (first, last) = match (result.predictions.first(), result.predictions.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(invalid("trend forecast has no predictions")),
    };
    let margin = TREND_Z * result.standard_error;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct TrendParameters {
        forecast_months: u32,
        trend: f64,
        intercept: f64,
        r_squared: f64,
    }

    Ok(ForecastRecord {
        title: "Linear trend forecast".to_string(),
        description: format!(
            "Least-squares trend of {:+.2} per month (R² {:.3})",
            result.trend, result.r_squared
        ),
        forecast_type: ForecastType::Trend,
        scenario: "trend".to_string(),
        forecast_date: first.date,
        target_date: last.date,
        predicted_value: last.value,
        confidence_interval: 95.0,
        lower_bound: (last.value - margin).max(0.0),
        upper_bound: last.value + margin,
        currency: config.currency.clone(),
        category: config.category.clone(),
        account_id,
        parameters: serde_json::to_string(&TrendParameters {
            forecast_months,
            trend: result.trend,
            intercept: result.intercept,
            r_squared: result.r_squared,
        })?,
        is_active: true,
    })
}

fn scenario_tag(name: &str) -> String {
    name.trim().to_lowercase().replace(char::is_whitespace, "_")
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}
