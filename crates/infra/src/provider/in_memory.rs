use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stockpulse_core::BranchCode;
use stockpulse_replenishment::RawSkuFacts;

use super::r#trait::{DataProviderError, SkuFactsProvider};

/// In-memory provider keyed by branch.
///
/// Intended for tests/dev. Branches without data yield an empty batch.
#[derive(Debug, Default)]
pub struct InMemorySkuFactsProvider {
    branches: RwLock<HashMap<BranchCode, Vec<RawSkuFacts>>>,
}

impl InMemorySkuFactsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the facts served for `branch`.
    pub fn set_branch(&self, branch: BranchCode, facts: Vec<RawSkuFacts>) {
        self.branches
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(branch, facts);
    }

    pub fn with_branch(self, branch: BranchCode, facts: Vec<RawSkuFacts>) -> Self {
        self.set_branch(branch, facts);
        self
    }
}

#[async_trait]
impl SkuFactsProvider for InMemorySkuFactsProvider {
    async fn fetch_branch(&self, branch: &BranchCode) -> Result<Vec<RawSkuFacts>, DataProviderError> {
        let branches = self
            .branches
            .read()
            .map_err(|_| DataProviderError::Unavailable("provider lock poisoned".to_string()))?;
        Ok(branches.get(branch).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_per_branch_data() {
        let tr = BranchCode::new("00TR").unwrap();
        let tj = BranchCode::new("01TJ").unwrap();
        let provider = InMemorySkuFactsProvider::new().with_branch(
            tr.clone(),
            vec![RawSkuFacts {
                sku_number: Some("A1".into()),
                ..Default::default()
            }],
        );

        assert_eq!(provider.fetch_branch(&tr).await.unwrap().len(), 1);
        assert!(provider.fetch_branch(&tj).await.unwrap().is_empty());
    }
}
