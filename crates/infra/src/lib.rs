//! Infrastructure layer: data providers, snapshot storage, the snapshot
//! pipeline and snapshot retrieval.

pub mod pipeline;
pub mod provider;
pub mod retrieval;
pub mod snapshot;

pub use pipeline::{
    BackoffStrategy, BranchOutcome, BranchReport, PipelineConfig, PipelineError, RetryPolicy, RunReport,
    SkipReason, SnapshotPipeline,
};
pub use provider::{DataProviderError, SkuFactsProvider};
pub use retrieval::{RetrievalError, RowSort, SnapshotRetrieval, StockStatusResult};
pub use snapshot::{AppendOutcome, PersistenceError, Snapshot, SnapshotRecord, SnapshotStore};
