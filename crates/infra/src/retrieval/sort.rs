//! Column sort for retrieved rows.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use stockpulse_replenishment::ComputedRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    BranchCode,
    SkuNumber,
    ProductName,
    AverageDemand,
    SafetyStock,
    Trend,
    MinQty,
    OnHandQty,
    Backlog,
    TurnOver,
    BrandName,
    AccGroupName,
}

impl SortKey {
    /// Column name or one of its short aliases; `None` for unknown columns.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = match raw.trim() {
            "branchCode" => Self::BranchCode,
            "skuNumber" => Self::SkuNumber,
            "productName" => Self::ProductName,
            "averageDemand" => Self::AverageDemand,
            "safetyStock" => Self::SafetyStock,
            "trend" => Self::Trend,
            "minQty" | "min" => Self::MinQty,
            "onHandQty" | "onhand" => Self::OnHandQty,
            "backlog" | "backorder" => Self::Backlog,
            "turnOver" | "turnover" => Self::TurnOver,
            "brandName" | "brand" => Self::BrandName,
            "accGroupName" => Self::AccGroupName,
            _ => return None,
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// `"desc"` (any case) is descending; anything else ascending.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Self::Asc => ord,
            Self::Desc => ord.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl RowSort {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// Build from query parameters. An absent or unknown column means no sort.
    pub fn from_params(sort_by: Option<&str>, order: Option<&str>) -> Option<Self> {
        let key = SortKey::parse(sort_by?)?;
        Some(Self::new(key, order.map(SortOrder::parse).unwrap_or_default()))
    }

    /// Stable in-place sort. Missing values go last in either direction.
    pub fn apply(&self, rows: &mut [ComputedRow]) {
        rows.sort_by(|a, b| compare(value(a, self.key), value(b, self.key), self.order));
    }
}

enum SortValue<'a> {
    Number(f64),
    Text(&'a str),
    Missing,
}

fn value(row: &ComputedRow, key: SortKey) -> SortValue<'_> {
    let rec = &row.record;
    match key {
        SortKey::BranchCode => SortValue::Text(rec.branch_code.as_str()),
        SortKey::SkuNumber => SortValue::Text(rec.sku_number.as_str()),
        SortKey::ProductName => SortValue::Text(&rec.product_name),
        SortKey::AverageDemand => SortValue::Number(row.average_demand as f64),
        SortKey::SafetyStock => SortValue::Number(row.safety_stock as f64),
        SortKey::Trend => SortValue::Number(row.trend),
        SortKey::MinQty => SortValue::Number(row.min_qty as f64),
        SortKey::OnHandQty => SortValue::Number(rec.on_hand_qty as f64),
        SortKey::Backlog => SortValue::Number(rec.backlog as f64),
        SortKey::TurnOver => SortValue::Number(row.turn_over),
        SortKey::BrandName => rec.brand_name.as_deref().map_or(SortValue::Missing, SortValue::Text),
        SortKey::AccGroupName => rec
            .acc_group_name
            .as_deref()
            .map_or(SortValue::Missing, SortValue::Text),
    }
}

fn compare(a: SortValue<'_>, b: SortValue<'_>, order: SortOrder) -> Ordering {
    match (a, b) {
        (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
        (SortValue::Missing, _) => Ordering::Greater,
        (_, SortValue::Missing) => Ordering::Less,
        (SortValue::Number(x), SortValue::Number(y)) => order.apply(x.total_cmp(&y)),
        (SortValue::Text(x), SortValue::Text(y)) => order.apply(natural_cmp(x, y)),
        // Keys are homogeneous; mixed kinds cannot occur.
        _ => Ordering::Equal,
    }
}

/// Case-insensitive comparison that orders embedded digit runs by value
/// (`"A2" < "a10"`).
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut xs = a.chars().peekable();
    let mut ys = b.chars().peekable();

    loop {
        match (xs.peek().copied(), ys.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let (dx, dy) = (digit_run(&mut xs), digit_run(&mut ys));
                let (tx, ty) = (dx.trim_start_matches('0'), dy.trim_start_matches('0'));
                let ord = tx.len().cmp(&ty.len()).then_with(|| tx.cmp(ty));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.to_lowercase().cmp(y.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                xs.next();
                ys.next();
            }
        }
    }
}

fn digit_run(it: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = it.next_if(|c| c.is_ascii_digit()) {
        run.push(c);
    }
    run
}
