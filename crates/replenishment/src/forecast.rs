//! Average monthly demand estimation.

use serde::{Deserialize, Serialize};

use crate::config::AverageDemandRules;
use crate::series::DemandSeries;

/// Output of the demand forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandForecast {
    /// Uncapped average before rounding.
    pub raw: f64,
    /// `ceil(raw)`: rounding always favors over-provisioning.
    pub average_demand: i64,
    /// Sparse history but recent sales: looks like a newly listed item.
    pub new_item_pattern: bool,
}

/// Estimate average monthly demand from the forecast window.
///
/// Rules, first match wins:
/// 1. no selling month → 0
/// 2. every month sold → plain average over the window
/// 3. at least `threshold` months sold → per-selling-month average damped by the ratio
/// 4. otherwise look at the last two months: both empty → 0, any sale → per-selling-month
///    average (new item pattern), fewer than two points → plain average over the window
pub fn forecast_average_demand(series: &DemandSeries, rules: &AverageDemandRules) -> DemandForecast {
    let total_months = rules.total_months.max(1);
    let total_sales = series.total();
    let months_with_sales = series.months_with_sales();
    let threshold = rules.threshold_months();

    let mut new_item_pattern = false;

    let raw = if months_with_sales == 0 {
        0.0
    } else if months_with_sales == total_months {
        total_sales / total_months as f64
    } else if months_with_sales >= threshold && months_with_sales < total_months {
        (total_sales / months_with_sales as f64) * rules.threshold_ratio
    } else {
        let qtys = series.quantities();
        match qtys.as_slice() {
            [.., a, b] if *a == 0.0 && *b == 0.0 => 0.0,
            [.., a, b] if *a > 0.0 || *b > 0.0 => {
                new_item_pattern = true;
                total_sales / months_with_sales as f64
            }
            _ => total_sales / total_months as f64,
        }
    };

    let raw = crate::numeric::finite_or_zero(raw);

    DemandForecast {
        raw,
        average_demand: raw.ceil() as i64,
        new_item_pattern,
    }
}
