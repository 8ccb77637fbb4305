pub mod config;
pub mod core;
pub mod store;

pub use crate::config::EngineConfig;
pub use crate::core::{ForecastEngine, ForecastError, Result};
pub use crate::store::{ForecastStore, InMemoryForecastStore, StoredForecast};
