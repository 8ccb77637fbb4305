mod calendar;
mod engine;
mod error;
mod patterns;
mod random;
mod record;
mod risk;
mod scenario;
mod simulation;
mod stats;
mod trend;
mod types;

pub use calendar::{YearMonth, add_months};
pub use engine::ForecastEngine;
pub use error::{ForecastError, Result};
pub use patterns::analyze_transaction_patterns;
pub use random::{RandomSource, generate_normal};
pub use record::{simulation_record, trend_record};
pub use risk::{
    HIGH_DRAWDOWN, HIGH_LOSS_RISK, HIGH_VOLATILITY, NEGATIVE_EXPECTATION, calculate_risk_metrics,
    generate_recommendations, recommendations_for, risk_metrics_from_balances,
};
pub use scenario::{
    OPTIMISTIC, PESSIMISTIC, REALISTIC, analyze_scenario, compare_scenarios,
    optimistic_scenario, pessimistic_scenario, realistic_scenario, run_multiple_scenarios,
};
pub use simulation::{monte_carlo_simulation, monte_carlo_simulation_seeded};
pub use stats::{LinearFit, linear_fit, mean, percentile, population_std_dev};
pub use trend::trend_forecast;
pub use types::{
    ConfidenceInterval, DEFAULT_CONFIDENCE_LEVEL, DEFAULT_GROWTH_RATE, DEFAULT_INFLATION_RATE,
    ForecastRecord, ForecastType, Percentiles, RiskMetrics, ScenarioComparison, ScenarioOverrides,
    ScenarioParameters, ScenarioResult, SeriesPoint, SimulationParameters, SimulationResult,
    Transaction, TransactionPatterns, TransactionType, TrendForecastResult,
};
