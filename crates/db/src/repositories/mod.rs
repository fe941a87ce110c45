use async_trait::async_trait;
use thiserror::Error;

use custsync_core::{Customer, ShoppingList};

pub mod memory;
pub mod sql;

pub use memory::{InMemoryCustomerStore, StoreOp};
pub use sql::SqlCustomerStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("customer has no internal id; it must be created first")]
    MissingInternalId,
}

/// Point lookups and writes against persisted customer records.
///
/// Lookups return `Ok(None)` for "not found"; that is a common, valid
/// outcome, not an error. Implementations must provide at least
/// read-committed visibility. The store performs no cross-call locking:
/// callers that need exactly-once creation per external identity must
/// serialize concurrent syncs of the same key themselves (per-key mutual
/// exclusion, or a unique constraint at the store).
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Customer>, RepositoryError>;

    async fn find_by_master_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Customer>, RepositoryError>;

    async fn find_by_company_number(
        &self,
        company_number: &str,
    ) -> Result<Option<Customer>, RepositoryError>;

    /// Persist a new record and return it with its store-assigned internal
    /// id. The id is immutable from then on.
    async fn create(&self, customer: Customer) -> Result<Customer, RepositoryError>;

    async fn update(&self, customer: Customer) -> Result<Customer, RepositoryError>;

    async fn update_shopping_list(&self, list: ShoppingList) -> Result<(), RepositoryError>;
}
