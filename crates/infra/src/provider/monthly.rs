//! Provider that assembles SKU facts from monthly demand and master data.
//!
//! Source tables are modeled as plain fact lists: the item master, per-branch
//! stock/lead-time facts and per-branch monthly net demand. The month axis is
//! the calendar run of `YYYY-MM` labels ending at the current month, so idle
//! months and branches without any facts still get zero-filled series. The
//! forecast and dead-stock windows are cut from that axis with
//! [`MonthWindow`], and one [`RawSkuFacts`] is emitted per master item.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use tracing::instrument;

use stockpulse_core::{BranchCode, SkuNumber};
use stockpulse_replenishment::{MonthWindow, RawSkuFacts, WindowConfig};

use super::r#trait::{DataProviderError, SkuFactsProvider};

/// Item master entry (branch independent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMaster {
    pub sku_number: SkuNumber,
    pub product_name: String,
    pub base_unit: String,
    pub brand_name: Option<String>,
    pub acc_group_name: Option<String>,
    pub item_group: Option<String>,
    pub new_item: bool,
}

/// Stock position and lead times of one SKU at one branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchStock {
    pub branch_code: BranchCode,
    pub sku_number: SkuNumber,
    pub on_hand_qty: f64,
    pub backlog: f64,
    pub lt_po: f64,
    pub lt_sup: f64,
    pub lt_dc: f64,
}

/// Net demand of one SKU at one branch in one month (`YYYY-MM`).
///
/// Several facts for the same key are summed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDemandFact {
    pub branch_code: BranchCode,
    pub sku_number: SkuNumber,
    pub month: String,
    pub demand_qty: f64,
}

/// Source tables as a whole, e.g. loaded from a JSON export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTables {
    pub items: Vec<ItemMaster>,
    pub stock: Vec<BranchStock>,
    pub demand: Vec<MonthlyDemandFact>,
}

#[derive(Debug, Default)]
struct Tables {
    items: Vec<ItemMaster>,
    stock: HashMap<(BranchCode, SkuNumber), BranchStock>,
    demand: Vec<MonthlyDemandFact>,
}

#[derive(Debug)]
pub struct MonthlyDemandProvider {
    windows: WindowConfig,
    /// Fixed current month; the UTC clock decides when unset.
    current_month: Option<NaiveDate>,
    tables: RwLock<Tables>,
}

impl MonthlyDemandProvider {
    pub fn new(windows: WindowConfig) -> Self {
        Self {
            windows,
            current_month: None,
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Pin the current month to the one containing `day`.
    pub fn with_current_month(mut self, day: NaiveDate) -> Self {
        self.current_month = Some(day);
        self
    }

    /// Add every row of `source`.
    pub fn load(&self, source: SourceTables) {
        let mut tables = self.write();
        tables.items.extend(source.items);
        for stock in source.stock {
            tables
                .stock
                .insert((stock.branch_code.clone(), stock.sku_number.clone()), stock);
        }
        tables.demand.extend(source.demand);
    }

    pub fn add_item(&self, item: ItemMaster) {
        self.write().items.push(item);
    }

    pub fn add_stock(&self, stock: BranchStock) {
        self.write()
            .stock
            .insert((stock.branch_code.clone(), stock.sku_number.clone()), stock);
    }

    pub fn add_demand(&self, fact: MonthlyDemandFact) {
        self.write().demand.push(fact);
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Chronological labels ending at the current month, long enough for both windows.
    fn month_axis(&self) -> Vec<String> {
        let current = self.current_month.unwrap_or_else(|| Utc::now().date_naive());
        let current = current.with_day(1).unwrap_or(current);
        let span = self.windows.forecast_months.max(self.windows.dead_stock_months) + 1;

        (0..span)
            .rev()
            .filter_map(|back| current.checked_sub_months(Months::new(u32::try_from(back).ok()?)))
            .map(|m| m.format("%Y-%m").to_string())
            .collect()
    }

    fn assemble(&self, tables: &Tables, branch: &BranchCode) -> Vec<RawSkuFacts> {
        let mut net: HashMap<(&SkuNumber, &str), f64> = HashMap::new();
        for fact in tables.demand.iter().filter(|f| &f.branch_code == branch) {
            *net.entry((&fact.sku_number, fact.month.trim())).or_default() += fact.demand_qty;
        }

        let window = MonthWindow::new(self.month_axis());
        let forecast = window.pick(self.windows.forecast_months, self.windows.exclude_current_month);
        let dead_stock = window.pick(self.windows.dead_stock_months, self.windows.exclude_current_month);

        let series = |sku: &SkuNumber, cut: &[String]| -> (JsonValue, usize) {
            let mut selling = 0;
            let points: Vec<JsonValue> = cut
                .iter()
                .map(|m| {
                    let qty = net.get(&(sku, m.as_str())).copied().unwrap_or(0.0);
                    if qty > 0.0 {
                        selling += 1;
                    }
                    json!({ "month": m, "qty": qty })
                })
                .collect();
            (JsonValue::Array(points), selling)
        };

        tables
            .items
            .iter()
            .map(|item| {
                let (sales6, frequency) = series(&item.sku_number, forecast);
                let (demand9, _) = series(&item.sku_number, dead_stock);
                let stock = tables.stock.get(&(branch.clone(), item.sku_number.clone()));
                let stock_field = |f: fn(&BranchStock) -> f64| Some(json!(stock.map(f).unwrap_or(0.0)));

                RawSkuFacts {
                    branch_code: Some(branch.to_string()),
                    sku_number: Some(item.sku_number.to_string()),
                    product_name: Some(item.product_name.clone()),
                    base_unit: Some(item.base_unit.clone()),
                    brand_name: item.brand_name.clone(),
                    acc_group_name: item.acc_group_name.clone(),
                    item_group: item.item_group.clone(),
                    new_item: Some(JsonValue::Bool(item.new_item)),
                    lt_po: stock_field(|s| s.lt_po),
                    lt_sup: stock_field(|s| s.lt_sup),
                    lt_dc: stock_field(|s| s.lt_dc),
                    on_hand_qty: stock_field(|s| s.on_hand_qty),
                    backlog: stock_field(|s| s.backlog),
                    frequency: Some(json!(frequency)),
                    sales6: Some(sales6),
                    demand9: Some(demand9),
                }
            })
            .collect()
    }
}

#[async_trait]
impl SkuFactsProvider for MonthlyDemandProvider {
    #[instrument(skip(self), fields(branch = %branch), err)]
    async fn fetch_branch(&self, branch: &BranchCode) -> Result<Vec<RawSkuFacts>, DataProviderError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| DataProviderError::Unavailable("source tables lock poisoned".to_string()))?;
        Ok(self.assemble(&tables, branch))
    }
}
