/// In-memory DID provider backed by a fixed handle map
use crate::{
    error::{HandlesError, HandlesResult},
    identity::{Did, DidProvider, Domain, Handle, ProviderHealth},
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

/// Provider answering from mappings loaded once at startup
#[derive(Debug)]
pub struct MemoryProvider {
    dids: HashMap<String, Did>,
    domains: HashSet<String>,
    healthy: AtomicBool,
}

impl MemoryProvider {
    /// Create a provider from `handle -> DID` pairs and served domains
    ///
    /// Handles and domains are stored lowercase so lookups by canonical
    /// handle string always match.
    pub fn new<D, S>(dids: D, domains: S) -> Self
    where
        D: IntoIterator<Item = (String, Did)>,
        S: IntoIterator<Item = String>,
    {
        Self {
            dids: dids
                .into_iter()
                .map(|(handle, did)| (handle.to_lowercase(), did))
                .collect(),
            domains: domains.into_iter().map(|d| d.to_lowercase()).collect(),
            healthy: AtomicBool::new(true),
        }
    }

    /// Toggle the reported health, for tests and operators
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn handle_count(&self) -> usize {
        self.dids.len()
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }
}

#[async_trait]
impl DidProvider for MemoryProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn can_resolve(&self, domain: &Domain) -> HandlesResult<bool> {
        Ok(self.domains.contains(domain.as_str()))
    }

    async fn resolve(&self, handle: &Handle) -> HandlesResult<Did> {
        if !self.can_resolve(&handle.domain).await? {
            return Err(HandlesError::DomainNotServed(handle.domain.to_string()));
        }

        let key = handle.to_string();

        self.dids
            .get(&key)
            .cloned()
            .ok_or(HandlesError::DidNotFound(key))
    }

    async fn health_check(&self) -> ProviderHealth {
        if self.healthy.load(Ordering::SeqCst) {
            ProviderHealth::healthy(format!(
                "Available with {} handles for {} domains",
                self.handle_count(),
                self.domain_count()
            ))
        } else {
            ProviderHealth::unhealthy("Not healthy")
        }
    }
}
