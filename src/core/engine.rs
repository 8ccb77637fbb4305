use chrono::NaiveDate;
use uuid::Uuid;

use super::error::Result;
use super::patterns;
use super::random::RandomSource;
use super::record;
use super::risk;
use super::scenario;
use super::simulation;
use super::stats;
use super::trend;
use super::types::{
    ForecastRecord, RiskMetrics, ScenarioComparison, ScenarioOverrides, ScenarioParameters,
    ScenarioResult, SeriesPoint, SimulationParameters, SimulationResult, Transaction,
    TransactionPatterns, TrendForecastResult,
};
use crate::config::EngineConfig;

/// Stateless forecasting service. Holds only configuration, so a single
/// instance can be shared across threads and calls.
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    config: EngineConfig,
}

impl ForecastEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Monte Carlo simulation on the thread-local generator.
    pub fn monte_carlo_simulation(
        &self,
        historical_data: &[f64],
        params: &SimulationParameters,
    ) -> Result<SimulationResult> {
        let mut rng = rand::rng();
        simulation::monte_carlo_simulation(historical_data, params, &mut rng)
    }

    pub fn monte_carlo_simulation_with<S: RandomSource + ?Sized>(
        &self,
        historical_data: &[f64],
        params: &SimulationParameters,
        source: &mut S,
    ) -> Result<SimulationResult> {
        simulation::monte_carlo_simulation(historical_data, params, source)
    }

    pub fn monte_carlo_simulation_seeded(
        &self,
        historical_data: &[f64],
        params: &SimulationParameters,
        seed: u64,
    ) -> Result<SimulationResult> {
        simulation::monte_carlo_simulation_seeded(historical_data, params, seed)
    }

    pub fn percentile(&self, sorted: &[f64], p: f64) -> Result<f64> {
        stats::percentile(sorted, p)
    }

    pub fn trend_forecast(
        &self,
        series: &[SeriesPoint],
        forecast_months: u32,
    ) -> Result<TrendForecastResult> {
        trend::trend_forecast(series, forecast_months)
    }

    pub fn analyze_scenario(
        &self,
        params: &ScenarioParameters,
        scenario_name: &str,
    ) -> Result<ScenarioResult> {
        scenario::analyze_scenario(params, scenario_name, &self.config)
    }

    pub fn optimistic_scenario(&self, params: &ScenarioParameters) -> Result<ScenarioResult> {
        scenario::optimistic_scenario(params, &self.config)
    }

    pub fn realistic_scenario(&self, params: &ScenarioParameters) -> Result<ScenarioResult> {
        scenario::realistic_scenario(params, &self.config)
    }

    pub fn pessimistic_scenario(&self, params: &ScenarioParameters) -> Result<ScenarioResult> {
        scenario::pessimistic_scenario(params, &self.config)
    }

    pub fn compare_scenarios(&self, params: &ScenarioParameters) -> Result<ScenarioComparison> {
        scenario::compare_scenarios(params, &self.config)
    }

    pub fn run_multiple_scenarios(
        &self,
        base: &ScenarioParameters,
        overrides: &[ScenarioOverrides],
    ) -> Result<Vec<ScenarioResult>> {
        scenario::run_multiple_scenarios(base, overrides, &self.config)
    }

    pub fn calculate_risk_metrics(&self, scenarios: &[ScenarioResult]) -> Result<RiskMetrics> {
        risk::calculate_risk_metrics(scenarios)
    }

    pub fn generate_recommendations(&self, scenarios: &[ScenarioResult]) -> Result<Vec<String>> {
        risk::generate_recommendations(scenarios, &self.config.risk)
    }

    pub fn analyze_transaction_patterns(
        &self,
        transactions: &[Transaction],
    ) -> Result<TransactionPatterns> {
        patterns::analyze_transaction_patterns(transactions)
    }

    pub fn simulation_record(
        &self,
        result: &SimulationResult,
        params: &SimulationParameters,
        forecast_date: NaiveDate,
        account_id: Option<Uuid>,
    ) -> Result<ForecastRecord> {
        record::simulation_record(result, params, forecast_date, account_id, &self.config)
    }

    pub fn trend_record(
        &self,
        result: &TrendForecastResult,
        forecast_months: u32,
        account_id: Option<Uuid>,
    ) -> Result<ForecastRecord> {
        record::trend_record(result, forecast_months, account_id, &self.config)
    }
}
