use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{ForecastError, Result};

/// Thresholds above which a recommendation is emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RiskThresholds {
    pub loss_probability: f64,
    /// Currency units; tuned for a single currency's typical balances.
    pub volatility: f64,
    pub max_drawdown: f64,
    /// Mean projected balance below this triggers an expense review.
    pub expected_value_floor: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            loss_probability: 0.3,
            volatility: 10_000.0,
            max_drawdown: 0.2,
            expected_value_floor: 0.0,
        }
    }
}

/// Heuristic band attached to scenario records. Not a statistical interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioBand {
    /// Percent.
    pub confidence: f64,
    /// Fraction of the projected balance on each side.
    pub band_width: f64,
}

impl Default for ScenarioBand {
    fn default() -> Self {
        Self {
            confidence: 85.0,
            band_width: 0.15,
        }
    }
}

/// Rate adjustments applied to derive the optimistic and pessimistic variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioShifts {
    pub optimistic_growth: f64,
    pub optimistic_inflation: f64,
    pub pessimistic_growth: f64,
    pub pessimistic_inflation: f64,
}

impl Default for ScenarioShifts {
    fn default() -> Self {
        Self {
            optimistic_growth: 0.02,
            optimistic_inflation: -0.01,
            pessimistic_growth: -0.02,
            pessimistic_inflation: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub risk: RiskThresholds,
    pub scenario_band: ScenarioBand,
    pub scenario_shifts: ScenarioShifts,
    pub currency: String,
    pub category: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk: RiskThresholds::default(),
            scenario_band: ScenarioBand::default(),
            scenario_shifts: ScenarioShifts::default(),
            currency: "USD".to_string(),
            category: "cash_flow".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config = serde_json::from_str::<Self>(json)
            .map_err(|e| ForecastError::Config(format!("invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Defaults overlaid with `FORECAST_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(currency) = lookup("FORECAST_CURRENCY") {
            self.currency = currency;
        }
        if let Some(category) = lookup("FORECAST_CATEGORY") {
            self.category = category;
        }
        if let Some(v) = parse_var(&lookup, "FORECAST_VOLATILITY_THRESHOLD")? {
            self.risk.volatility = v;
        }
        if let Some(v) = parse_var(&lookup, "FORECAST_LOSS_PROBABILITY_THRESHOLD")? {
            self.risk.loss_probability = v;
        }
        if let Some(v) = parse_var(&lookup, "FORECAST_DRAWDOWN_THRESHOLD")? {
            self.risk.max_drawdown = v;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let risk = &self.risk;
        for (label, value) in [
            ("risk.lossProbability", risk.loss_probability),
            ("risk.volatility", risk.volatility),
            ("risk.maxDrawdown", risk.max_drawdown),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::Config(format!(
                    "{label} must be a non-negative number, got {value}"
                )));
            }
        }
        if !risk.expected_value_floor.is_finite() {
            return Err(ForecastError::Config(
                "risk.expectedValueFloor must be finite".to_string(),
            ));
        }

        let band = &self.scenario_band;
        if !(band.confidence > 0.0 && band.confidence <= 100.0) {
            return Err(ForecastError::Config(format!(
                "scenarioBand.confidence must be within (0, 100], got {}",
                band.confidence
            )));
        }
        if !(0.0..=1.0).contains(&band.band_width) {
            return Err(ForecastError::Config(format!(
                "scenarioBand.bandWidth must be within [0, 1], got {}",
                band.band_width
            )));
        }

        let shifts = &self.scenario_shifts;
        if [
            shifts.optimistic_growth,
            shifts.optimistic_inflation,
            shifts.pessimistic_growth,
            shifts.pessimistic_inflation,
        ]
        .iter()
        .any(|v| !v.is_finite())
        {
            return Err(ForecastError::Config(
                "scenarioShifts must be finite".to_string(),
            ));
        }

        if self.currency.trim().is_empty() {
            return Err(ForecastError::Config("currency must not be empty".to_string()));
        }
        Ok(())
    }
}

fn parse_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<f64>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| ForecastError::Config(format!("{key}={raw:?} is not a number: {e}"))),
    }
}
