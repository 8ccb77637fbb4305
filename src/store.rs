use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::core::{ForecastError, ForecastRecord, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredForecast {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: ForecastRecord,
}

/// Persistence collaborator for forecast records. The engine never calls
/// it; callers decide what to keep.
pub trait ForecastStore: Send + Sync {
    fn create_forecast(&self, record: ForecastRecord) -> Result<StoredForecast>;
    fn get_forecasts(&self) -> Result<Vec<StoredForecast>>;
    fn delete_forecast(&self, id: Uuid) -> Result<()>;
}

/// Process-local store, insertion ordered.
#[derive(Debug, Default)]
pub struct InMemoryForecastStore {
    forecasts: RwLock<Vec<StoredForecast>>,
}

impl InMemoryForecastStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.forecasts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.forecasts.read().is_empty()
    }
}

impl ForecastStore for InMemoryForecastStore {
    fn create_forecast(&self, record: ForecastRecord) -> Result<StoredForecast> {
        let stored = StoredForecast {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            record,
        };
        debug!(id = %stored.id, kind = ?stored.record.forecast_type, "storing forecast");
        self.forecasts.write().push(stored.clone());
        Ok(stored)
    }

    fn get_forecasts(&self) -> Result<Vec<StoredForecast>> {
        Ok(self.forecasts.read().clone())
    }

    fn delete_forecast(&self, id: Uuid) -> Result<()> {
        let mut forecasts = self.forecasts.write();
        let Some(pos) = forecasts.iter().position(|f| f.id == id) else {
            return Err(ForecastError::NotFound(id));
        };
        forecasts.remove(pos);
        debug!(%id, "deleted forecast");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::core::{ForecastType, ScenarioParameters, analyze_scenario};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn record(balance: f64) -> ForecastRecord {
        let params = ScenarioParameters::new(3, 1_000.0, 1_000.0, balance)
            .with_rates(0.0, 0.0)
            .starting(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        analyze_scenario(&params, "Realistic", &EngineConfig::default())
            .unwrap()
            .forecast_record
    }

    #[test]
    fn create_list_delete() {
        let store = InMemoryForecastStore::new();
        let first = store.create_forecast(record(100.0)).unwrap();
        let second = store.create_forecast(record(200.0)).unwrap();
        assert_ne!(first.id, second.id);

        let listed = store.get_forecasts().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].record.predicted_value, 100.0);
        assert_eq!(listed[1].record.predicted_value, 200.0);

        store.delete_forecast(first.id).unwrap();
        let listed = store.get_forecasts().unwrap();
        assert_eq!(listed, vec![second]);
    }

    #[test]
    fn deleting_unknown_id_is_not_found() {
        let store = InMemoryForecastStore::new();
        let id = Uuid::new_v4();
        let err = store.delete_forecast(id).unwrap_err();
        assert!(matches!(err, ForecastError::NotFound(missing) if missing == id));
    }

    #[test]
    fn stored_forecast_serializes_flat() {
        let store = InMemoryForecastStore::new();
        let stored = store.create_forecast(record(50.0)).unwrap();
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["type"], "scenario");
        assert_eq!(json["scenario"], "realistic");
        assert!(json["createdAt"].is_string());
        assert_eq!(json["id"], stored.id.to_string());
        assert_eq!(stored.record.forecast_type, ForecastType::Scenario);
    }

    #[test]
    fn concurrent_writers_all_land() {
        let store = Arc::new(InMemoryForecastStore::new());
        std::thread::scope(|scope| {
            for i in 0..8 {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    store.create_forecast(record(i as f64)).unwrap();
                });
            }
        });
        assert_eq!(store.len(), 8);
    }
}
