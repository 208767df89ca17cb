//! Row computation: raw SKU-branch record → computed replenishment row.

use crate::classification::{Classification, ClassificationInputs};
use crate::config::ReplenishmentConfig;
use crate::forecast::forecast_average_demand;
use crate::record::{ComputedRow, SkuBranchRecord};
use crate::replenishment::{ReplenishmentInputs, ReplenishmentLevels};
use crate::variability::Variability;

/// Compute every replenishment signal for one record.
///
/// Pure and deterministic: no clock, no shared state, no IO. Calling it twice
/// with the same record and config yields identical rows.
pub fn compute_row(record: &SkuBranchRecord, config: &ReplenishmentConfig) -> ComputedRow {
    let forecast = forecast_average_demand(&record.sales6, &config.average_demand);
    let variability = Variability::of(&record.sales6);

    let levels = ReplenishmentLevels::compute(
        &ReplenishmentInputs {
            frequency: record.frequency,
            average_demand: forecast.average_demand,
            stdev: variability.stdev,
            lead_time_days: record.lead_time_days(),
            on_hand: record.on_hand_qty,
            backlog: record.backlog,
        },
        config,
    );

    let classification = Classification::classify(
        &ClassificationInputs {
            sales6: &record.sales6,
            demand9: &record.demand9,
            frequency: record.frequency,
            new_item_pattern: forecast.new_item_pattern,
            in_item_group: record.in_item_group,
            average_demand: forecast.average_demand,
            on_hand: record.on_hand_qty,
            backlog: record.backlog,
            min_qty: levels.min_qty,
            trend: variability.trend,
            turn_over: levels.turn_over,
        },
        config,
    );

    ComputedRow {
        record: record.clone(),
        average_demand: forecast.average_demand,
        stdev: variability.stdev,
        z_score: levels.z_score,
        service_level: levels.service_level,
        trend: variability.trend,
        safety_stock: levels.safety_stock,
        reorder_point: levels.reorder_point,
        min_qty: levels.min_qty,
        turn_over: levels.turn_over,
        status: classification.status,
        stock_moving: classification.stock_moving,
        is_inactive: classification.is_inactive,
        is_dead_stock: classification.is_dead_stock,
        new_item_pattern: forecast.new_item_pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{OrderStatus, StockMoving};
    use crate::record::RawSkuFacts;
    use crate::series::DemandSeries;
    use proptest::prelude::*;
    use serde_json::json;
    use stockpulse_core::{BranchCode, SkuNumber};

    fn record(sales6: &[f64], frequency: u32) -> SkuBranchRecord {
        SkuBranchRecord {
            branch_code: BranchCode::new("05AY").unwrap(),
            sku_number: SkuNumber::new("A0101").unwrap(),
            product_name: "Aluminium bar".into(),
            base_unit: "PCS".into(),
            brand_name: None,
            acc_group_name: None,
            item_group: String::new(),
            in_item_group: false,
            new_item: false,
            lt_po: 10.0,
            lt_sup: 5.0,
            lt_dc: 5.0,
            on_hand_qty: 0,
            backlog: 0,
            frequency,
            sales6: DemandSeries::from_quantities(sales6),
            demand9: DemandSeries::from_quantities(&[1.0; 9]),
        }
    }

    fn compute(rec: &SkuBranchRecord) -> ComputedRow {
        compute_row(rec, &ReplenishmentConfig::default())
    }

    #[test]
    fn full_history_row() {
        let row = compute(&record(&[10.0; 6], 6));
        assert_eq!(row.average_demand, 10);
        assert_eq!(row.stdev, 0);
        assert_eq!(row.service_level, 0.95);
        assert_eq!(row.z_score, 1.64);
        // 20 days lead time: ROP = 10 * 20/30 = 6.67 → 7
        assert_eq!(row.reorder_point, 7);
        assert_eq!(row.safety_stock, 0);
        assert_eq!(row.min_qty, 7);
        assert_eq!(row.status, OrderStatus::Understock);
        assert!(!row.new_item_pattern);
    }

    #[test]
    fn record_new_item_flag_does_not_affect_status() {
        let mut rec = record(&[5.0, 5.0, 5.0, 5.0, 5.0, 0.0], 1);
        rec.new_item = true;
        rec.lt_po = 0.0;
        rec.lt_sup = 0.0;
        rec.lt_dc = 0.0;

        let row = compute(&rec);
        assert_eq!(row.average_demand, 4);
        assert!(!row.new_item_pattern);
        assert_eq!(row.status, OrderStatus::Normal);
    }

    #[test]
    fn new_item_pattern_is_reported() {
        let row = compute(&record(&[0.0, 0.0, 0.0, 4.0, 0.0, 4.0], 2));
        assert_eq!(row.average_demand, 4);
        assert!(row.new_item_pattern);
        assert_eq!(row.status, OrderStatus::Understock);
    }

    #[test]
    fn empty_input_still_produces_a_complete_row() {
        let raw = RawSkuFacts {
            branch_code: Some("00TR".into()),
            sku_number: Some("Z".into()),
            sales6: Some(json!("garbage")),
            ..Default::default()
        };
        let rec = SkuBranchRecord::from_raw(raw).unwrap();
        let row = compute(&rec);

        assert_eq!(row.average_demand, 0);
        assert_eq!(row.min_qty, 0);
        assert_eq!(row.turn_over, 0.0);
        assert_eq!(row.status, OrderStatus::Normal);
        assert_eq!(row.stock_moving, StockMoving::None);
        assert!(row.is_inactive);
        assert!(row.is_dead_stock);
    }

    #[test]
    fn fast_and_slow_movers() {
        let mut fast = record(&[5.0, 5.0, 5.0, 5.0, 10.0, 10.0], 6);
        fast.on_hand_qty = 10;
        assert_eq!(compute(&fast).stock_moving, StockMoving::Fast);

        let mut slow = record(&[1.0; 6], 6);
        slow.on_hand_qty = 60;
        let row = compute(&slow);
        assert_eq!(row.turn_over, 60.0);
        assert_eq!(row.stock_moving, StockMoving::Slow);
        assert_eq!(row.status, OrderStatus::Overstock);
    }

    #[test]
    fn serializes_with_camel_case_and_lead_time_names() {
        let row = compute(&record(&[10.0; 6], 6));
        let v = serde_json::to_value(&row).unwrap();

        assert_eq!(v["branchCode"], "05AY");
        assert_eq!(v["averageDemand"], 10);
        assert_eq!(v["LT_PO"], 10.0);
        assert_eq!(v["status"], "UNDERSTOCK");
        assert_eq!(v["stockMoving"], "NONE");

        let back: ComputedRow = serde_json::from_value(v).unwrap();
        assert_eq!(back, row);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 500,
            ..ProptestConfig::default()
        })]

        /// Property: min quantity is the non-negative sum of safety stock and reorder point.
        #[test]
        fn min_qty_invariant(
            qtys in prop::collection::vec(-50.0f64..500.0, 0..8),
            frequency in 0u32..10,
            lt in -30.0f64..120.0,
        ) {
            let mut rec = record(&qtys, frequency);
            rec.lt_po = lt;
            let row = compute(&rec);
            prop_assert!(row.min_qty >= 0);
            prop_assert_eq!(row.min_qty, row.safety_stock + row.reorder_point);
            prop_assert!([0.95, 0.93, 0.50].contains(&row.service_level));
        }

        /// Property: computation is deterministic (byte-identical JSON).
        #[test]
        fn compute_is_deterministic(
            qtys in prop::collection::vec(0.0f64..1000.0, 6),
            on_hand in 0i64..10_000,
            frequency in 0u32..7,
        ) {
            let mut rec = record(&qtys, frequency);
            rec.on_hand_qty = on_hand;
            let a = serde_json::to_string(&compute(&rec)).unwrap();
            let b = serde_json::to_string(&compute(&rec)).unwrap();
            prop_assert_eq!(a, b);
        }

        /// Property: arbitrary floats (NaN, infinities) never panic.
        #[test]
        fn never_panics_on_arbitrary_numbers(
            qtys in prop::collection::vec(any::<f64>(), 0..10),
            lt in any::<f64>(),
        ) {
            let raw = RawSkuFacts {
                branch_code: Some("01TJ".into()),
                sku_number: Some("S1".into()),
                lt_dc: serde_json::Number::from_f64(lt).map(serde_json::Value::Number),
                sales6: Some(json!(qtys.iter().map(|q| q.to_string()).collect::<Vec<_>>())),
                ..Default::default()
            };
            let rec = SkuBranchRecord::from_raw(raw).unwrap();
            let row = compute(&rec);
            prop_assert!(row.min_qty >= 0);
            prop_assert!(row.turn_over.is_finite());
        }
    }
}
