use std::collections::BTreeMap;

use tokio::sync::RwLock;

use custsync_core::{Customer, CustomerId, ShoppingList};

use super::{CustomerStore, RepositoryError};

/// One store call, in the order it was issued. Tests assert against this
/// journal to pin down write counts and ordering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreOp {
    FindByExternalId(String),
    FindByMasterExternalId(String),
    FindByCompanyNumber(String),
    Create(CustomerId),
    Update(CustomerId),
    UpdateShoppingList(String),
}

#[derive(Default)]
struct Inner {
    customers: BTreeMap<String, Customer>,
    shopping_lists: BTreeMap<String, ShoppingList>,
    journal: Vec<StoreOp>,
    next_id: u64,
}

impl Inner {
    fn assign_id(&mut self) -> CustomerId {
        self.next_id += 1;
        CustomerId(format!("cust-{:04}", self.next_id))
    }
}

/// In-memory [`CustomerStore`] for tests. Customers are keyed by internal
/// id in insertion-stable (sorted) order, so lookups are deterministic.
#[derive(Default)]
pub struct InMemoryCustomerStore {
    inner: RwLock<Inner>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pre-existing record, assigning an internal id when absent.
    pub async fn seed(&self, mut customer: Customer) -> CustomerId {
        let mut inner = self.inner.write().await;
        let id = match customer.internal_id.clone() {
            Some(id) => id,
            None => inner.assign_id(),
        };
        customer.internal_id = Some(id.clone());
        inner.customers.insert(id.0.clone(), customer);
        id
    }

    pub async fn customer(&self, id: &CustomerId) -> Option<Customer> {
        self.inner.read().await.customers.get(&id.0).cloned()
    }

    pub async fn customers(&self) -> Vec<Customer> {
        self.inner.read().await.customers.values().cloned().collect()
    }

    pub async fn shopping_list(&self, name: &str) -> Option<ShoppingList> {
        self.inner.read().await.shopping_lists.get(name).cloned()
    }

    pub async fn journal(&self) -> Vec<StoreOp> {
        self.inner.read().await.journal.clone()
    }

    pub async fn clear_journal(&self) {
        self.inner.write().await.journal.clear();
    }
}

#[async_trait::async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.journal.push(StoreOp::FindByExternalId(external_id.to_string()));
        Ok(inner
            .customers
            .values()
            .find(|customer| customer.external_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn find_by_master_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.journal.push(StoreOp::FindByMasterExternalId(external_id.to_string()));
        Ok(inner
            .customers
            .values()
            .find(|customer| customer.master_external_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn find_by_company_number(
        &self,
        company_number: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.journal.push(StoreOp::FindByCompanyNumber(company_number.to_string()));
        Ok(inner
            .customers
            .values()
            .find(|customer| customer.company_number() == Some(company_number))
            .cloned())
    }

    async fn create(&self, mut customer: Customer) -> Result<Customer, RepositoryError> {
        let mut inner = self.inner.write().await;
        let id = inner.assign_id();
        customer.internal_id = Some(id.clone());
        inner.journal.push(StoreOp::Create(id.clone()));
        inner.customers.insert(id.0.clone(), customer.clone());
        Ok(customer)
    }

    async fn update(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let Some(id) = customer.internal_id.clone() else {
            return Err(RepositoryError::MissingInternalId);
        };
        let mut inner = self.inner.write().await;
        inner.journal.push(StoreOp::Update(id.clone()));
        inner.customers.insert(id.0.clone(), customer.clone());
        Ok(customer)
    }

    async fn update_shopping_list(&self, list: ShoppingList) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;
        inner.journal.push(StoreOp::UpdateShoppingList(list.name.clone()));
        inner.shopping_lists.insert(list.name.clone(), list);
        Ok(())
    }
}
