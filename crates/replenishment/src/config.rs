//! Rule configuration for the replenishment engines.
//!
//! Every business constant lives here exactly once. Deserialization accepts
//! partial documents: missing fields fall back to [`Default`].

use serde::{Deserialize, Serialize};

use stockpulse_core::{DomainError, DomainResult};

/// Frequency-based service-level tiers.
///
/// `f > high_threshold` → `high`; `mid_threshold < f <= high_threshold` → `mid`;
/// otherwise `low`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceLevelTiers {
    pub high: f64,
    pub mid: f64,
    pub low: f64,
    pub high_threshold: u32,
    pub mid_threshold: u32,
}

impl Default for ServiceLevelTiers {
    fn default() -> Self {
        Self {
            high: 0.95,
            mid: 0.93,
            low: 0.50,
            high_threshold: 4,
            mid_threshold: 2,
        }
    }
}

/// Averaging rules for the demand forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AverageDemandRules {
    /// Length of the averaging window in months.
    pub total_months: u32,
    /// Share of the window that counts as "regular" demand.
    pub threshold_ratio: f64,
}

impl Default for AverageDemandRules {
    fn default() -> Self {
        Self {
            total_months: 6,
            threshold_ratio: 0.75,
        }
    }
}

impl AverageDemandRules {
    /// Minimum number of selling months for the damped-average branch.
    pub fn threshold_months(&self) -> u32 {
        (self.total_months as f64 * self.threshold_ratio).floor() as u32
    }
}

/// Fast/slow movement thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MovementThresholds {
    pub fast_trend_min: f64,
    pub fast_turnover_max: f64,
    pub slow_turnover_min: f64,
}

impl Default for MovementThresholds {
    fn default() -> Self {
        Self {
            fast_trend_min: 1.0,
            fast_turnover_max: 2.0,
            slow_turnover_min: 6.0,
        }
    }
}

/// Lookback windows used when assembling demand series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowConfig {
    /// Forecast/variability/inactive window (months).
    pub forecast_months: usize,
    /// Dead-stock window (months).
    pub dead_stock_months: usize,
    /// Drop the newest (incomplete) month before cutting windows.
    pub exclude_current_month: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            forecast_months: 6,
            dead_stock_months: 9,
            exclude_current_month: true,
        }
    }
}

/// Complete rule set injected into row computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReplenishmentConfig {
    pub service_level: ServiceLevelTiers,
    pub average_demand: AverageDemandRules,
    pub movement: MovementThresholds,
    pub windows: WindowConfig,
    /// Old items selling in at most this many months (and nothing last month) need no order.
    pub no_order_max_frequency: u32,
    /// Items without sales in the forecast window are inactive up to this frequency.
    pub inactive_max_frequency: u32,
    /// Lead-time days per demand month.
    pub days_per_month: f64,
}

impl Default for ReplenishmentConfig {
    fn default() -> Self {
        Self {
            service_level: ServiceLevelTiers::default(),
            average_demand: AverageDemandRules::default(),
            movement: MovementThresholds::default(),
            windows: WindowConfig::default(),
            no_order_max_frequency: 1,
            inactive_max_frequency: 2,
            days_per_month: 30.0,
        }
    }
}

impl ReplenishmentConfig {
    /// Reject rule sets the engines cannot evaluate meaningfully.
    pub fn validate(&self) -> DomainResult<()> {
        let sl = &self.service_level;
        for (name, p) in [("high", sl.high), ("mid", sl.mid), ("low", sl.low)] {
            if !(p > 0.0 && p < 1.0) {
                return Err(DomainError::invalid_config(format!(
                    "service level {name} must be in (0, 1), got {p}"
                )));
            }
        }
        if sl.mid_threshold > sl.high_threshold {
            return Err(DomainError::invalid_config(
                "service level midThreshold must not exceed highThreshold",
            ));
        }

        let avg = &self.average_demand;
        if avg.total_months == 0 {
            return Err(DomainError::invalid_config("totalMonths must be positive"));
        }
        if !(avg.threshold_ratio > 0.0 && avg.threshold_ratio <= 1.0) {
            return Err(DomainError::invalid_config(format!(
                "thresholdRatio must be in (0, 1], got {}",
                avg.threshold_ratio
            )));
        }

        let mv = &self.movement;
        if ![mv.fast_trend_min, mv.fast_turnover_max, mv.slow_turnover_min]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(DomainError::invalid_config("movement thresholds must be finite"));
        }

        if self.windows.forecast_months == 0 || self.windows.dead_stock_months == 0 {
            return Err(DomainError::invalid_config("window lengths must be positive"));
        }

        if !(self.days_per_month.is_finite() && self.days_per_month > 0.0) {
            return Err(DomainError::invalid_config("daysPerMonth must be positive"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ReplenishmentConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.average_demand.threshold_months(), 4);
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let cfg: ReplenishmentConfig = serde_json::from_str(
            r#"{ "serviceLevel": { "high": 0.97 }, "movement": { "slowTurnoverMin": 8 } }"#,
        )
        .unwrap();

        assert_eq!(cfg.service_level.high, 0.97);
        assert_eq!(cfg.service_level.mid, 0.93);
        assert_eq!(cfg.movement.slow_turnover_min, 8.0);
        assert_eq!(cfg.movement.fast_turnover_max, 2.0);
        assert_eq!(cfg.windows.dead_stock_months, 9);
    }

    #[test]
    fn rejects_inverted_tiers() {
        let mut cfg = ReplenishmentConfig::default();
        cfg.service_level.mid_threshold = 5;
        assert!(matches!(cfg.validate(), Err(DomainError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_degenerate_probabilities() {
        let mut cfg = ReplenishmentConfig::default();
        cfg.service_level.high = 1.0;
        assert!(cfg.validate().is_err());
    }
}
