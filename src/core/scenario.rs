use rayon::prelude::*;
use tracing::debug;

use super::error::{Result, invalid, require_finite};
use super::record::scenario_record;
use super::types::{ScenarioComparison, ScenarioOverrides, ScenarioParameters, ScenarioResult};
use crate::config::EngineConfig;

pub const OPTIMISTIC: &str = "Optimistic";
pub const REALISTIC: &str = "Realistic";
pub const PESSIMISTIC: &str = "Pessimistic";

/// Deterministic month-by-month projection. Income grows at
/// `growth_rate / 12` per month and expenses at `inflation_rate / 12`
/// (simple division, not compounded annual rates); month 1 is unadjusted.
///
/// The projection itself never reads the clock. Only the record's
/// `forecast_date` falls back to today when `params.forecast_date` is unset.
pub fn analyze_scenario(
    params: &ScenarioParameters,
    scenario_name: &str,
    config: &EngineConfig,
) -> Result<ScenarioResult> {
    validate(params)?;
    debug!(
        scenario = scenario_name,
        months = params.months_to_project,
        "projecting scenario"
    );

    let monthly_growth = params.growth_rate / 12.0;
    let monthly_inflation = params.inflation_rate / 12.0;

    let mut total_income = 0.0;
    let mut total_expenses = 0.0;
    let mut projected_balance = params.current_balance;
    for month in 1..=params.months_to_project {
        let elapsed = (month - 1) as i32;
        let adjusted_income = params.monthly_income * (1.0 + monthly_growth).powi(elapsed);
        let adjusted_expenses = params.monthly_expenses * (1.0 + monthly_inflation).powi(elapsed);

        total_income += adjusted_income;
        total_expenses += adjusted_expenses;
        projected_balance += adjusted_income - adjusted_expenses;
    }

    let net_cash_flow = total_income - total_expenses;
    let forecast_record = scenario_record(params, scenario_name, projected_balance, config)?;

    Ok(ScenarioResult {
        scenario_name: scenario_name.to_string(),
        projected_balance,
        monthly_cash_flow: net_cash_flow / params.months_to_project as f64,
        total_income,
        total_expenses,
        net_cash_flow,
        growth_rate: params.growth_rate,
        inflation_rate: params.inflation_rate,
        months_to_project: params.months_to_project,
        forecast_record,
    })
}

fn validate(params: &ScenarioParameters) -> Result<()> {
    if params.months_to_project == 0 {
        return Err(invalid("monthsToProject must be positive"));
    }
    if params.months_to_project > i32::MAX as u32 {
        return Err(invalid("monthsToProject is too large"));
    }
    require_finite("monthlyIncome", params.monthly_income)?;
    require_finite("monthlyExpenses", params.monthly_expenses)?;
    require_finite("currentBalance", params.current_balance)?;
    require_finite("growthRate", params.growth_rate)?;
    require_finite("inflationRate", params.inflation_rate)?;
    Ok(())
}

pub fn optimistic_scenario(
    params: &ScenarioParameters,
    config: &EngineConfig,
) -> Result<ScenarioResult> {
    let shifts = &config.scenario_shifts;
    let shifted = params.clone().with_rates(
        params.growth_rate + shifts.optimistic_growth,
        params.inflation_rate + shifts.optimistic_inflation,
    );
    analyze_scenario(&shifted, OPTIMISTIC, config)
}

pub fn realistic_scenario(
    params: &ScenarioParameters,
    config: &EngineConfig,
) -> Result<ScenarioResult> {
    analyze_scenario(params, REALISTIC, config)
}

pub fn pessimistic_scenario(
    params: &ScenarioParameters,
    config: &EngineConfig,
) -> Result<ScenarioResult> {
    let shifts = &config.scenario_shifts;
    let shifted = params.clone().with_rates(
        params.growth_rate + shifts.pessimistic_growth,
        params.inflation_rate + shifts.pessimistic_inflation,
    );
    analyze_scenario(&shifted, PESSIMISTIC, config)
}

/// Runs the three variants concurrently; the result shape is fixed.
pub fn compare_scenarios(
    params: &ScenarioParameters,
    config: &EngineConfig,
) -> Result<ScenarioComparison> {
    let (optimistic, (realistic, pessimistic)) = rayon::join(
        || optimistic_scenario(params, config),
        || {
            rayon::join(
                || realistic_scenario(params, config),
                || pessimistic_scenario(params, config),
            )
        },
    );

    Ok(ScenarioComparison {
        optimistic: optimistic?,
        realistic: realistic?,
        pessimistic: pessimistic?,
    })
}

/// Applies each override to `base` and projects it. Output order follows
/// `overrides`; unnamed entries are called "Scenario N" (1-based). On
/// failure the first failing entry's error is returned.
pub fn run_multiple_scenarios(
    base: &ScenarioParameters,
    overrides: &[ScenarioOverrides],
    config: &EngineConfig,
) -> Result<Vec<ScenarioResult>> {
    debug!(count = overrides.len(), "running scenario batch");

    let outcomes = overrides
        .par_iter()
        .enumerate()
        .map(|(idx, patch)| {
            let name = patch
                .name
                .clone()
                .unwrap_or_else(|| format!("Scenario {}", idx + 1));
            analyze_scenario(&patch.apply(base), &name, config)
        })
        .collect::<Vec<_>>();

    outcomes.into_iter().collect()
}
