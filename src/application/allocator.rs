//! Party identifier allocation against the store's current snapshot.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::context::bounded;
use crate::domain::{party_id, DomainResult, MerchantStore, PartyId};

/// Reads the allocated identifiers fresh on every call; nothing is cached.
///
/// Two concurrent registrations may pick the same identifier. The store's
/// unique index decides, and the loser sees `DUPLICATE_PARTY_ID`.
pub struct IdentifierAllocator {
    store: Arc<dyn MerchantStore>,
    timeout: Duration,
}

impl IdentifierAllocator {
    pub fn new(store: Arc<dyn MerchantStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn allocate(&self, company_name: &str) -> DomainResult<PartyId> {
        let existing: HashSet<PartyId> = bounded(
            "list_allocated_party_ids",
            self.timeout,
            self.store.list_allocated_party_ids(),
        )
        .await?
        .into_iter()
        .collect();

        let id = party_id::allocate(company_name, &existing)?;
        debug!(company = company_name, party_id = %id, taken = existing.len(), "Allocated party id");
        Ok(id)
    }
}
