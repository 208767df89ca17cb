use async_trait::async_trait;
use thiserror::Error;

use stockpulse_core::BranchCode;
use stockpulse_replenishment::RawSkuFacts;

/// Data provider errors.
///
/// `Unavailable` covers transient conditions (connection refused, pool
/// exhausted); `Query` covers everything the backing store rejected.
#[derive(Debug, Error)]
pub enum DataProviderError {
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("malformed source data: {0}")]
    Malformed(String),
}

/// Source of raw per-SKU facts for one branch.
///
/// Implementations assemble everything row computation needs (master data,
/// lead times, stock levels and the demand series) and hand it over in the
/// loosely-typed [`RawSkuFacts`] shape. Defaults and coercions are applied by
/// the caller, not by the provider.
#[async_trait]
pub trait SkuFactsProvider: Send + Sync {
    async fn fetch_branch(&self, branch: &BranchCode) -> Result<Vec<RawSkuFacts>, DataProviderError>;
}

#[async_trait]
impl<P> SkuFactsProvider for std::sync::Arc<P>
where
    P: SkuFactsProvider + ?Sized,
{
    async fn fetch_branch(&self, branch: &BranchCode) -> Result<Vec<RawSkuFacts>, DataProviderError> {
        (**self).fetch_branch(branch).await
    }
}
