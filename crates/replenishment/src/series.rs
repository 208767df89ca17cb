//! Monthly demand series and month-window selection.
//!
//! Upstream systems hand over series in several shapes: JSON text, arrays of
//! `{month, qty}` or `{monthEnd, demandQty}` objects, or bare numbers. All of
//! them normalize into one [`DemandSeries`]; anything unrecognizable degrades
//! to an empty series instead of failing the row.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockpulse_core::ValueObject;

use crate::numeric::finite_or_zero;

/// Net demand for one month (sales minus returns/adjustments, netted upstream).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month: String,
    pub qty: f64,
}

impl MonthlyPoint {
    pub fn new(month: impl Into<String>, qty: f64) -> Self {
        Self {
            month: month.into(),
            qty: finite_or_zero(qty),
        }
    }
}

impl ValueObject for MonthlyPoint {}

/// Chronologically ascending monthly demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemandSeries(Vec<MonthlyPoint>);

impl ValueObject for DemandSeries {}

impl DemandSeries {
    pub fn new(points: Vec<MonthlyPoint>) -> Self {
        Self(points)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build from bare quantities, labelling months `M1..Mn`.
    pub fn from_quantities(qtys: &[f64]) -> Self {
        Self(
            qtys.iter()
                .enumerate()
                .map(|(i, q)| MonthlyPoint::new(format!("M{}", i + 1), *q))
                .collect(),
        )
    }

    /// Normalize any raw JSON representation into a series.
    pub fn from_json(raw: &JsonValue) -> Self {
        match raw {
            JsonValue::String(text) => match serde_json::from_str::<JsonValue>(text) {
                Ok(inner @ JsonValue::Array(_)) => Self::from_json(&inner),
                _ => Self::empty(),
            },
            JsonValue::Array(items) => Self(items.iter().map(point_from_json).collect()),
            _ => Self::empty(),
        }
    }

    pub fn points(&self) -> &[MonthlyPoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Quantities in chronological order.
    pub fn quantities(&self) -> Vec<f64> {
        self.0.iter().map(|p| finite_or_zero(p.qty)).collect()
    }

    pub fn total(&self) -> f64 {
        self.quantities().iter().sum()
    }

    /// Number of months with strictly positive demand.
    pub fn months_with_sales(&self) -> u32 {
        self.0.iter().filter(|p| p.qty > 0.0).count() as u32
    }

    pub fn has_any_sales(&self) -> bool {
        self.0.iter().any(|p| p.qty > 0.0)
    }

    /// Quantity of the newest month, `0` for an empty series.
    pub fn last_qty(&self) -> f64 {
        self.0.last().map(|p| finite_or_zero(p.qty)).unwrap_or(0.0)
    }
}

fn point_from_json(item: &JsonValue) -> MonthlyPoint {
    match item {
        JsonValue::Object(map) => {
            let month = map
                .get("month")
                .or_else(|| map.get("monthEnd"))
                .and_then(JsonValue::as_str)
                .unwrap_or_default();
            let qty = map
                .get("qty")
                .or_else(|| map.get("demandQty"))
                .map(number_from_json)
                .unwrap_or(0.0);
            MonthlyPoint::new(month, qty)
        }
        other => MonthlyPoint::new("", number_from_json(other)),
    }
}

/// Lenient number coercion: numbers and numeric strings, anything else is `0`.
pub fn number_from_json(v: &JsonValue) -> f64 {
    let n = match v {
        JsonValue::Number(n) => n.as_f64().unwrap_or(0.0),
        JsonValue::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        JsonValue::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    finite_or_zero(n)
}

/// Selects trailing month labels from a chronologically ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthWindow {
    all: Vec<String>,
}

impl MonthWindow {
    pub fn new(all: Vec<String>) -> Self {
        Self { all }
    }

    /// The last `months` labels.
    ///
    /// With `exclude_current`, the newest label is treated as the current
    /// (incomplete) month and dropped before selecting.
    pub fn pick(&self, months: usize, exclude_current: bool) -> &[String] {
        let end = if exclude_current {
            self.all.len().saturating_sub(1)
        } else {
            self.all.len()
        };
        let start = end.saturating_sub(months);
        &self.all[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_month_qty_objects() {
        let s = DemandSeries::from_json(&json!([
            { "month": "2025-01", "qty": 4 },
            { "month": "2025-02", "qty": "2.5" },
            { "month": "2025-03" },
        ]));
        assert_eq!(s.quantities(), vec![4.0, 2.5, 0.0]);
        assert_eq!(s.points()[1].month, "2025-02");
    }

    #[test]
    fn parses_month_end_demand_qty_objects() {
        let s = DemandSeries::from_json(&json!([
            { "monthEnd": "2025-01-01", "demandQty": 0 },
            { "monthEnd": "2025-02-01", "demandQty": 1 },
        ]));
        assert_eq!(s.quantities(), vec![0.0, 1.0]);
        assert!(s.has_any_sales());
    }

    #[test]
    fn parses_json_text_and_bare_numbers() {
        let s = DemandSeries::from_json(&json!("[1, 2, \"3\"]"));
        assert_eq!(s.quantities(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn malformed_input_degrades_to_empty() {
        assert!(DemandSeries::from_json(&json!(null)).is_empty());
        assert!(DemandSeries::from_json(&json!({"qty": 3})).is_empty());
        assert!(DemandSeries::from_json(&json!("not json")).is_empty());
        assert!(DemandSeries::from_json(&json!("{\"a\":1}")).is_empty());
        assert_eq!(DemandSeries::empty().last_qty(), 0.0);
    }

    #[test]
    fn counts_only_positive_months() {
        let s = DemandSeries::from_quantities(&[3.0, 0.0, -2.0, 5.0]);
        assert_eq!(s.months_with_sales(), 2);
        assert_eq!(s.total(), 6.0);
        assert_eq!(s.last_qty(), 5.0);
    }

    #[test]
    fn month_window_excludes_current() {
        let labels: Vec<String> = (1..=10).map(|m| format!("2025-{m:02}")).collect();
        let w = MonthWindow::new(labels);

        assert_eq!(w.pick(3, true), ["2025-07", "2025-08", "2025-09"]);
        assert_eq!(w.pick(3, false), ["2025-08", "2025-09", "2025-10"]);
        assert_eq!(w.pick(20, true).len(), 9);
        assert!(MonthWindow::new(vec![]).pick(6, true).is_empty());
    }
}
