//! The reconciliation flow: resolve, validate, merge, persist.

use thiserror::Error;

use custsync_core::merge;
use custsync_core::{matching, ConflictError, ExternalCustomer};
use custsync_db::{CustomerStore, RepositoryError};

use crate::duplicates;
use crate::resolver;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("conflict: {0}")]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Drives one external record through the full reconciliation flow. Holds
/// no state between invocations; each call is strictly ordered and a failed
/// store call aborts the remaining steps without rollback. Concurrency
/// guarantees are the store's responsibility.
pub struct ReconciliationEngine<S> {
    store: S,
}

impl<S: CustomerStore> ReconciliationEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reconcile one external record. Returns `true` when a new primary
    /// record was created, `false` when an existing one was updated.
    /// Conflicts are detected before any write is issued.
    pub async fn sync(&self, external: &ExternalCustomer) -> Result<bool, SyncError> {
        tracing::debug!(external_id = %external.external_id, "starting sync");

        let matches = resolver::resolve(&self.store, external).await?;
        let matches = match matching::validate(matches, external) {
            Ok(matches) => matches,
            Err(conflict) => {
                tracing::warn!(external_id = %external.external_id, %conflict, "sync rejected");
                return Err(conflict.into());
            }
        };

        let mut customer = merge::materialize(matches.primary, external);
        merge::apply_classification(&mut customer, external);

        let created = customer.internal_id.is_none();
        customer = if created {
            tracing::info!(external_id = %external.external_id, "creating customer record");
            self.store.create(customer).await?
        } else {
            tracing::info!(external_id = %external.external_id, "updating customer record");
            self.store.update(customer).await?
        };

        merge::apply_contact_info(&mut customer, external);
        merge::apply_preferred_store(&mut customer, external);
        customer = self.store.update(customer).await?;

        duplicates::coordinate(&self.store, external, matches.duplicates).await?;

        // One list write plus one record update per shopping list, in order.
        for list in &external.shopping_lists {
            customer.add_shopping_list(list.clone());
            self.store.update_shopping_list(list.clone()).await?;
            customer = self.store.update(customer).await?;
        }

        merge::apply_preferred_store(&mut customer, external);

        tracing::debug!(external_id = %external.external_id, created, "sync finished");
        Ok(created)
    }
}
