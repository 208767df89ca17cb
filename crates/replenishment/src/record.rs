//! Input and output record shapes.
//!
//! [`RawSkuFacts`] is what a data provider hands over: every field optional,
//! numbers possibly encoded as strings, series in any supported shape.
//! [`SkuBranchRecord::from_raw`] is the single place where defaults and
//! coercions are applied; everything downstream works on required fields.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockpulse_core::{BranchCode, DomainError, DomainResult, SkuNumber};

use crate::classification::{OrderStatus, StockMoving};
use crate::numeric::{finite_or_zero, round_to_i64};
use crate::series::{DemandSeries, number_from_json};

/// Loosely-typed per-SKU facts for one branch, as assembled upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSkuFacts {
    pub branch_code: Option<String>,
    pub sku_number: Option<String>,
    pub product_name: Option<String>,
    pub base_unit: Option<String>,
    pub brand_name: Option<String>,
    pub acc_group_name: Option<String>,
    #[serde(rename = "Item_Group", alias = "itemGroup")]
    pub item_group: Option<String>,
    #[serde(rename = "New_Item", alias = "newItem")]
    pub new_item: Option<JsonValue>,
    #[serde(rename = "LT_PO")]
    pub lt_po: Option<JsonValue>,
    #[serde(rename = "LT_Sup", alias = "LT_SP")]
    pub lt_sup: Option<JsonValue>,
    #[serde(rename = "LT_DC")]
    pub lt_dc: Option<JsonValue>,
    pub on_hand_qty: Option<JsonValue>,
    pub backlog: Option<JsonValue>,
    /// Months with positive sales in the forecast window.
    #[serde(alias = "cntNonZero")]
    pub frequency: Option<JsonValue>,
    pub sales6: Option<JsonValue>,
    #[serde(alias = "demandJson")]
    pub demand9: Option<JsonValue>,
}

/// Fully-typed input of row computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuBranchRecord {
    pub branch_code: BranchCode,
    pub sku_number: SkuNumber,
    pub product_name: String,
    pub base_unit: String,
    pub brand_name: Option<String>,
    pub acc_group_name: Option<String>,
    #[serde(rename = "Item_Group")]
    pub item_group: String,
    pub in_item_group: bool,
    pub new_item: bool,
    #[serde(rename = "LT_PO")]
    pub lt_po: f64,
    #[serde(rename = "LT_Sup")]
    pub lt_sup: f64,
    #[serde(rename = "LT_DC")]
    pub lt_dc: f64,
    pub on_hand_qty: i64,
    pub backlog: i64,
    pub frequency: u32,
    pub sales6: DemandSeries,
    pub demand9: DemandSeries,
}

impl SkuBranchRecord {
    /// Apply defaults and coercions to raw provider output.
    ///
    /// Only the identifiers are mandatory: a missing one is a validation
    /// error, a blank one an invalid identifier. Every numeric field degrades
    /// to `0`.
    pub fn from_raw(raw: RawSkuFacts) -> DomainResult<Self> {
        let branch_code = raw
            .branch_code
            .as_deref()
            .ok_or_else(|| DomainError::validation("record has no branchCode"))
            .and_then(BranchCode::new)?;
        let sku_number = raw
            .sku_number
            .as_deref()
            .ok_or_else(|| DomainError::validation("record has no skuNumber"))
            .and_then(SkuNumber::new)?;

        let item_group = raw.item_group.map(|g| g.trim().to_string()).unwrap_or_default();
        let frequency = number(&raw.frequency).max(0.0).round() as u32;

        Ok(Self {
            branch_code,
            sku_number,
            product_name: trimmed(raw.product_name),
            base_unit: trimmed(raw.base_unit),
            brand_name: raw.brand_name,
            acc_group_name: raw.acc_group_name,
            in_item_group: !item_group.is_empty(),
            item_group,
            new_item: truthy(&raw.new_item),
            lt_po: number(&raw.lt_po),
            lt_sup: number(&raw.lt_sup),
            lt_dc: number(&raw.lt_dc),
            on_hand_qty: round_to_i64(number(&raw.on_hand_qty)),
            backlog: round_to_i64(number(&raw.backlog)),
            frequency,
            sales6: raw.sales6.as_ref().map(DemandSeries::from_json).unwrap_or_default(),
            demand9: raw.demand9.as_ref().map(DemandSeries::from_json).unwrap_or_default(),
        })
    }

    /// Total replenishment lead time in days, never negative.
    pub fn lead_time_days(&self) -> f64 {
        finite_or_zero(self.lt_po + self.lt_sup + self.lt_dc).max(0.0)
    }
}

fn number(v: &Option<JsonValue>) -> f64 {
    v.as_ref().map(number_from_json).unwrap_or(0.0)
}

fn truthy(v: &Option<JsonValue>) -> bool {
    match v {
        Some(JsonValue::Bool(b)) => *b,
        Some(JsonValue::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "y" | "yes"),
        Some(other) => number_from_json(other) != 0.0,
        None => false,
    }
}

fn trimmed(v: Option<String>) -> String {
    v.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// A SKU-branch record with every replenishment signal attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedRow {
    #[serde(flatten)]
    pub record: SkuBranchRecord,

    pub average_demand: i64,
    pub stdev: i64,
    pub z_score: f64,
    pub service_level: f64,
    pub trend: f64,
    pub safety_stock: i64,
    pub reorder_point: i64,
    pub min_qty: i64,
    pub turn_over: f64,
    pub status: OrderStatus,
    pub stock_moving: StockMoving,
    pub is_inactive: bool,
    pub is_dead_stock: bool,
    /// Demand history looks like a newly listed item.
    pub new_item_pattern: bool,
}

impl ComputedRow {
    pub fn branch_code(&self) -> &BranchCode {
        &self.record.branch_code
    }

    pub fn sku_number(&self) -> &SkuNumber {
        &self.record.sku_number
    }
}
