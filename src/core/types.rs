use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calendar::YearMonth;

pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;
pub const DEFAULT_GROWTH_RATE: f64 = 0.02;
pub const DEFAULT_INFLATION_RATE: f64 = 0.05;

fn default_confidence_level() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL
}

fn default_growth_rate() -> f64 {
    DEFAULT_GROWTH_RATE
}

fn default_inflation_rate() -> f64 {
    DEFAULT_INFLATION_RATE
}

fn default_active() -> bool {
    true
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    pub iterations: u32,
    pub time_horizon_months: u32,
    #[serde(default)]
    pub volatility: Option<f64>,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
}

impl SimulationParameters {
    pub fn new(iterations: u32, time_horizon_months: u32) -> Self {
        Self {
            iterations,
            time_horizon_months,
            volatility: None,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
        }
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }

    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.confidence_level = confidence_level;
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub mean: f64,
    pub median: f64,
    pub percentiles: Percentiles,
    pub confidence_interval: ConfidenceInterval,
    /// Final simulated values, ascending.
    pub scenarios: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendForecastResult {
    /// Fitted values for every observed month followed by the forecast months.
    pub predictions: Vec<SeriesPoint>,
    /// Slope of the fit, per month.
    pub trend: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub standard_error: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioParameters {
    pub months_to_project: u32,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub current_balance: f64,
    #[serde(default = "default_growth_rate")]
    pub growth_rate: f64,
    #[serde(default = "default_inflation_rate")]
    pub inflation_rate: f64,
    /// Start of the projection. When absent the record dates read the wall
    /// clock (today, UTC); set it for results that depend only on the inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ScenarioParameters {
    pub fn new(
        months_to_project: u32,
        monthly_income: f64,
        monthly_expenses: f64,
        current_balance: f64,
    ) -> Self {
        Self {
            months_to_project,
            monthly_income,
            monthly_expenses,
            current_balance,
            growth_rate: DEFAULT_GROWTH_RATE,
            inflation_rate: DEFAULT_INFLATION_RATE,
            forecast_date: None,
            account_id: None,
            category: None,
        }
    }

    pub fn with_rates(mut self, growth_rate: f64, inflation_rate: f64) -> Self {
        self.growth_rate = growth_rate;
        self.inflation_rate = inflation_rate;
        self
    }

    pub fn starting(mut self, forecast_date: NaiveDate) -> Self {
        self.forecast_date = Some(forecast_date);
        self
    }
}

/// Partial set of scenario fields merged onto a base parameter set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioOverrides {
    pub name: Option<String>,
    pub months_to_project: Option<u32>,
    pub monthly_income: Option<f64>,
    pub monthly_expenses: Option<f64>,
    pub current_balance: Option<f64>,
    pub growth_rate: Option<f64>,
    pub inflation_rate: Option<f64>,
}

impl ScenarioOverrides {
    pub fn apply(&self, base: &ScenarioParameters) -> ScenarioParameters {
        ScenarioParameters {
            months_to_project: self.months_to_project.unwrap_or(base.months_to_project),
            monthly_income: self.monthly_income.unwrap_or(base.monthly_income),
            monthly_expenses: self.monthly_expenses.unwrap_or(base.monthly_expenses),
            current_balance: self.current_balance.unwrap_or(base.current_balance),
            growth_rate: self.growth_rate.unwrap_or(base.growth_rate),
            inflation_rate: self.inflation_rate.unwrap_or(base.inflation_rate),
            ..base.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub projected_balance: f64,
    pub monthly_cash_flow: f64,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_cash_flow: f64,
    pub growth_rate: f64,
    pub inflation_rate: f64,
    pub months_to_project: u32,
    pub forecast_record: ForecastRecord,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub optimistic: ScenarioResult,
    pub realistic: ScenarioResult,
    pub pessimistic: ScenarioResult,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    pub volatility: f64,
    pub max_drawdown: f64,
    pub probability_of_loss: f64,
    pub expected_value: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastType {
    Scenario,
    MonteCarlo,
    Trend,
}

/// Projection handed to the storage collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRecord {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub forecast_type: ForecastType,
    pub scenario: String,
    pub forecast_date: NaiveDate,
    pub target_date: NaiveDate,
    pub predicted_value: f64,
    /// Percent, e.g. 85.0.
    pub confidence_interval: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub currency: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    /// JSON of the inputs that produced the record.
    pub parameters: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
    TransferIn,
    TransferOut,
    #[serde(other)]
    Other,
}

impl TransactionType {
    pub fn is_inflow(self) -> bool {
        matches!(self, TransactionType::Income | TransactionType::TransferIn)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}

impl Transaction {
    pub fn new(date: NaiveDate, amount: f64, transaction_type: TransactionType) -> Self {
        Self {
            date,
            amount,
            transaction_type,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatterns {
    /// Month keys, ascending; parallel to the three series below.
    pub months: Vec<YearMonth>,
    pub monthly_income: Vec<f64>,
    pub monthly_expenses: Vec<f64>,
    pub net_cash_flow: Vec<f64>,
    pub volatility: f64,
    pub trend: f64,
}

impl TransactionPatterns {
    /// Net cash flow dated on the first of each month, ready for trend fitting.
    pub fn net_cash_flow_series(&self) -> Vec<SeriesPoint> {
        self.months
            .iter()
            .zip(&self.net_cash_flow)
            .filter_map(|(month, &net)| month.first_day().map(|date| SeriesPoint::new(date, net)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulation_parameters_default_confidence_level() {
        let params: SimulationParameters =
            serde_json::from_str(r#"{"iterations": 100, "timeHorizonMonths": 12}"#).unwrap();
        assert_eq!(params, SimulationParameters::new(100, 12));
        assert_eq!(params.confidence_level, 0.95);
        assert!(params.volatility.is_none());
    }

    #[test]
    fn scenario_parameters_default_rates() {
        let params: ScenarioParameters = serde_json::from_str(
            r#"{"monthsToProject": 6, "monthlyIncome": 5000, "monthlyExpenses": 3000, "currentBalance": 100}"#,
        )
        .unwrap();
        assert_eq!(params.growth_rate, 0.02);
        assert_eq!(params.inflation_rate, 0.05);
        assert!(params.forecast_date.is_none());
    }

    #[test]
    fn overrides_only_replace_supplied_fields() {
        let base = ScenarioParameters::new(12, 5_000.0, 3_000.0, 10_000.0).with_rates(0.03, 0.02);
        let overrides = ScenarioOverrides {
            monthly_expenses: Some(4_000.0),
            growth_rate: Some(0.0),
            ..ScenarioOverrides::default()
        };
        let merged = overrides.apply(&base);
        assert_eq!(merged.monthly_expenses, 4_000.0);
        assert_eq!(merged.growth_rate, 0.0);
        assert_eq!(merged.monthly_income, 5_000.0);
        assert_eq!(merged.inflation_rate, 0.02);
        assert_eq!(merged.months_to_project, 12);
    }

    #[test]
    fn unknown_transaction_types_are_other() {
        let tx: Transaction =
            serde_json::from_str(r#"{"date": "2024-03-15", "amount": 12.5, "type": "fee"}"#)
                .unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Other);
        assert!(!tx.transaction_type.is_inflow());

        let tx: Transaction =
            serde_json::from_str(r#"{"date": "2024-03-15", "amount": 12.5, "type": "transfer_in"}"#)
                .unwrap();
        assert!(tx.transaction_type.is_inflow());
    }
}
