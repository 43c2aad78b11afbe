/// Identity Resolution System
///
/// Handle parsing and the providers that map handles to DIDs.

pub mod handle;
pub mod memory;
pub mod postgres;
pub mod provider;

pub use handle::{hostname_from_authority, Did, Domain, Handle, Username};
pub use memory::MemoryProvider;
pub use postgres::PostgresProvider;
pub use provider::{DidProvider, ProviderHealth};

/// Outcome of resolving the request's handle
///
/// Produced by the resolution middleware and read by the terminal handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Did),
    Unresolved,
}

impl Resolution {
    pub fn did(&self) -> Option<&Did> {
        match self {
            Resolution::Resolved(did) => Some(did),
            Resolution::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}
