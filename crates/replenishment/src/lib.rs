//! `stockpulse-replenishment`
//!
//! **Responsibility:** deterministic replenishment rules for one SKU at one branch.
//!
//! This crate is pure domain logic:
//! - no IO, no clocks, no storage;
//! - every rule constant comes from an injected [`ReplenishmentConfig`];
//! - [`compute_row`] is a pure function of its inputs (same record, same row).

pub mod classification;
pub mod config;
pub mod forecast;
pub mod normal;
pub mod numeric;
pub mod record;
pub mod replenishment;
pub mod row;
pub mod series;
pub mod variability;

pub use classification::{Classification, OrderStatus, StockMoving};
pub use config::{
    AverageDemandRules, MovementThresholds, ReplenishmentConfig, ServiceLevelTiers, WindowConfig,
};
pub use forecast::{DemandForecast, forecast_average_demand};
pub use record::{ComputedRow, RawSkuFacts, SkuBranchRecord};
pub use replenishment::{ReplenishmentLevels, service_level_for};
pub use row::compute_row;
pub use series::{DemandSeries, MonthWindow, MonthlyPoint};
pub use variability::{Variability, linear_trend, population_stdev};
