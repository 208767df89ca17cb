use serde::Deserialize;

/// `GET /api/stock-status` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockStatusQuery {
    pub date: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl StockStatusQuery {
    /// The date parameter, treating a blank value as absent.
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }
}
