//! Data-provider boundary: where raw per-SKU facts come from.

pub mod in_memory;
pub mod monthly;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemorySkuFactsProvider;
pub use monthly::{BranchStock, ItemMaster, MonthlyDemandFact, MonthlyDemandProvider, SourceTables};
pub use postgres::PostgresSkuFactsProvider;
pub use r#trait::{DataProviderError, SkuFactsProvider};
