/// DID provider abstraction
use crate::{
    error::HandlesResult,
    identity::{Did, Domain, Handle},
};
use async_trait::async_trait;

/// Health report of a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderHealth {
    pub healthy: bool,
    pub detail: String,
}

impl ProviderHealth {
    pub fn healthy(detail: impl Into<String>) -> Self {
        Self {
            healthy: true,
            detail: detail.into(),
        }
    }

    pub fn unhealthy(detail: impl Into<String>) -> Self {
        Self {
            healthy: false,
            detail: detail.into(),
        }
    }
}

/// Source of truth for handle to DID mappings
///
/// Implementations are shared across all in-flight requests and must be safe
/// to call concurrently.
#[async_trait]
pub trait DidProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Check whether this provider has authority over a domain
    async fn can_resolve(&self, domain: &Domain) -> HandlesResult<bool>;

    /// Resolve a handle to its DID
    ///
    /// Fails with `DomainNotServed` when the handle's domain is not served by
    /// this provider, and with `DidNotFound` when it is served but unmapped.
    async fn resolve(&self, handle: &Handle) -> HandlesResult<Did>;

    /// Report liveness with a human readable detail
    async fn health_check(&self) -> ProviderHealth;

    /// Release held resources on shutdown
    async fn close(&self) {}
}
