//! Service level, safety stock, reorder point, minimum quantity and turnover.

use crate::config::{ReplenishmentConfig, ServiceLevelTiers};
use crate::normal::inverse_standard_normal;
use crate::numeric::{finite_or_zero, round2, round_to_i64};

/// Target service level for a 6-month selling frequency.
pub fn service_level_for(frequency: u32, tiers: &ServiceLevelTiers) -> f64 {
    if frequency > tiers.high_threshold {
        tiers.high
    } else if frequency > tiers.mid_threshold {
        tiers.mid
    } else {
        tiers.low
    }
}

/// Inputs of the replenishment calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplenishmentInputs {
    pub frequency: u32,
    pub average_demand: i64,
    pub stdev: i64,
    pub lead_time_days: f64,
    pub on_hand: i64,
    pub backlog: i64,
}

/// Derived stock levels for one SKU at one branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplenishmentLevels {
    pub service_level: f64,
    pub z_score: f64,
    pub safety_stock: i64,
    pub reorder_point: i64,
    pub min_qty: i64,
    pub turn_over: f64,
}

impl ReplenishmentLevels {
    pub fn compute(inputs: &ReplenishmentInputs, config: &ReplenishmentConfig) -> Self {
        let service_level = service_level_for(inputs.frequency, &config.service_level);
        let z_score = round2(finite_or_zero(inverse_standard_normal(service_level)));

        let lead_time_months = finite_or_zero(inputs.lead_time_days.max(0.0) / config.days_per_month);
        let lead_time_factor = lead_time_months.sqrt();

        let safety_stock =
            round_to_i64((z_score * inputs.stdev as f64 * lead_time_factor).max(0.0));
        let reorder_point = round_to_i64((inputs.average_demand as f64 * lead_time_months).max(0.0));
        let min_qty = safety_stock.saturating_add(reorder_point).max(0);

        let turn_over = if inputs.average_demand > 0 {
            round2(inputs.on_hand.saturating_add(inputs.backlog) as f64 / inputs.average_demand as f64)
        } else {
            0.0
        };

        Self {
            service_level,
            z_score,
            safety_stock,
            reorder_point,
            min_qty,
            turn_over,
        }
    }
}
