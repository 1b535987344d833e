use anyhow::Result;
use async_trait::async_trait;

use crate::api::xlinestore::XlineStore;

/// Finds the backing volume a persistent volume claim is bound to.
#[async_trait]
pub trait ClaimResolver: Send + Sync {
    /// `Ok(None)` when the claim does not exist or is not bound yet.
    async fn backing_volume(&self, namespace: &str, claim_name: &str) -> Result<Option<String>>;
}

#[async_trait]
impl ClaimResolver for XlineStore {
    async fn backing_volume(&self, namespace: &str, claim_name: &str) -> Result<Option<String>> {
        Ok(self
            .get_claim(namespace, claim_name)
            .await?
            .map(|claim| claim.spec.volume_name)
            .filter(|name| !name.is_empty()))
    }
}
