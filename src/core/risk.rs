use tracing::debug;

use super::error::{Result, require_finite, require_len};
use super::stats::{mean, population_std_dev};
use super::types::{RiskMetrics, ScenarioResult};
use crate::config::RiskThresholds;

pub const HIGH_LOSS_RISK: &str =
    "High probability of loss detected. Consider building an emergency fund before taking on new commitments.";
pub const HIGH_VOLATILITY: &str =
    "Projected balances vary widely between scenarios. Consider diversifying income sources.";
pub const HIGH_DRAWDOWN: &str =
    "Significant drawdown risk. Review risk management and keep a cash buffer for downturns.";
pub const NEGATIVE_EXPECTATION: &str =
    "Expected balance falls below the target floor. Review recurring expenses and reduce discretionary spending.";

pub fn calculate_risk_metrics(scenarios: &[ScenarioResult]) -> Result<RiskMetrics> {
    let balances = scenarios
        .iter()
        .map(|s| s.projected_balance)
        .collect::<Vec<_>>();
    risk_metrics_from_balances(&balances)
}

/// Risk metrics over raw projected balances.
///
/// `max_drawdown` tracks the running peak over the slice in the order given,
/// so reordering the input can change it. Steps taken while the peak is not
/// positive contribute nothing.
pub fn risk_metrics_from_balances(balances: &[f64]) -> Result<RiskMetrics> {
    require_len("risk metrics", balances.len(), 1)?;
    for &balance in balances {
        require_finite("projected balance", balance)?;
    }
    debug!(scenarios = balances.len(), "calculating risk metrics");

    let losses = balances.iter().filter(|&&b| b < 0.0).count();

    Ok(RiskMetrics {
        volatility: population_std_dev(balances),
        max_drawdown: max_drawdown(balances),
        probability_of_loss: losses as f64 / balances.len() as f64,
        expected_value: mean(balances),
    })
}

fn max_drawdown(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut worst: f64 = 0.0;
    for &value in values {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            worst = worst.max((peak - value) / peak);
        }
    }
    worst
}

/// Every rule is checked independently; the messages come back in rule order.
pub fn generate_recommendations(
    scenarios: &[ScenarioResult],
    thresholds: &RiskThresholds,
) -> Result<Vec<String>> {
    let metrics = calculate_risk_metrics(scenarios)?;
    Ok(recommendations_for(&metrics, thresholds))
}

pub fn recommendations_for(metrics: &RiskMetrics, thresholds: &RiskThresholds) -> Vec<String> {
    let mut out = Vec::new();
    if metrics.probability_of_loss > thresholds.loss_probability {
        out.push(HIGH_LOSS_RISK.to_string());
    }
    if metrics.volatility > thresholds.volatility {
        out.push(HIGH_VOLATILITY.to_string());
    }
    if metrics.max_drawdown > thresholds.max_drawdown {
        out.push(HIGH_DRAWDOWN.to_string());
    }
    if metrics.expected_value < thresholds.expected_value_floor {
        out.push(NEGATIVE_EXPECTATION.to_string());
    }
    out
}
