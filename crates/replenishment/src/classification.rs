//! Order status, movement speed and activity flags.

use serde::{Deserialize, Serialize};

use crate::config::ReplenishmentConfig;
use crate::series::DemandSeries;

/// Order recommendation for a SKU at a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// No order needed.
    Normal,
    /// Stock plus open orders already exceed the minimum.
    Overstock,
    /// Below the minimum: replenish.
    Understock,
}

/// Movement speed tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockMoving {
    Fast,
    Slow,
    None,
}

/// Facts the classifier decides on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationInputs<'a> {
    pub sales6: &'a DemandSeries,
    pub demand9: &'a DemandSeries,
    pub frequency: u32,
    /// Forecast saw a new-item demand pattern; the record's own flag plays no part.
    pub new_item_pattern: bool,
    pub in_item_group: bool,
    pub average_demand: i64,
    pub on_hand: i64,
    pub backlog: i64,
    pub min_qty: i64,
    pub trend: f64,
    pub turn_over: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub status: OrderStatus,
    pub stock_moving: StockMoving,
    pub is_inactive: bool,
    pub is_dead_stock: bool,
}

impl Classification {
    pub fn classify(inputs: &ClassificationInputs<'_>, config: &ReplenishmentConfig) -> Self {
        Self {
            status: order_status(inputs, config),
            stock_moving: stock_moving(inputs.trend, inputs.turn_over, config),
            is_inactive: !inputs.sales6.has_any_sales()
                && inputs.frequency <= config.inactive_max_frequency,
            is_dead_stock: !inputs.demand9.has_any_sales(),
        }
    }
}

fn order_status(inputs: &ClassificationInputs<'_>, config: &ReplenishmentConfig) -> OrderStatus {
    let barely_selling = !inputs.new_item_pattern
        && inputs.frequency <= config.no_order_max_frequency
        && inputs.sales6.last_qty() <= 0.0;
    let nothing_to_cover = inputs.average_demand == 0 && inputs.on_hand == 0;

    if barely_selling || inputs.in_item_group || nothing_to_cover {
        OrderStatus::Normal
    } else if inputs.on_hand.saturating_add(inputs.backlog) > inputs.min_qty.max(0) {
        OrderStatus::Overstock
    } else {
        OrderStatus::Understock
    }
}

fn stock_moving(trend: f64, turn_over: f64, config: &ReplenishmentConfig) -> StockMoving {
    let mv = &config.movement;
    if trend >= mv.fast_trend_min && turn_over <= mv.fast_turnover_max {
        StockMoving::Fast
    } else if turn_over >= mv.slow_turnover_min {
        StockMoving::Slow
    } else {
        StockMoving::None
    }
}
