//! Field merging: building or refreshing the in-memory shape of an internal
//! record from an external one. All functions here are pure; the engine
//! decides when each merge step is persisted.

use crate::domain::customer::{Customer, CustomerKind};
use crate::domain::external::ExternalCustomer;

/// Produce the record the sync call will operate on. A missing record is
/// seeded as the canonical target for the external identity; the name is
/// always taken from the external record.
pub fn materialize(existing: Option<Customer>, external: &ExternalCustomer) -> Customer {
    let mut customer = existing.unwrap_or_else(|| Customer {
        internal_id: None,
        external_id: Some(external.external_id.clone()),
        master_external_id: Some(external.external_id.clone()),
        kind: kind_of(external),
        name: String::new(),
        preferred_store: None,
        address: None,
        shopping_lists: Vec::new(),
    });
    customer.name = external.name.clone();
    customer
}

pub fn kind_of(external: &ExternalCustomer) -> CustomerKind {
    match &external.company_number {
        Some(company_number) => CustomerKind::Company { company_number: company_number.clone() },
        None => CustomerKind::Person { bonus_points_balance: external.bonus_points_balance },
    }
}

/// Overwrite the type-specific fields: company number for companies, bonus
/// points balance for persons. Never both.
pub fn apply_classification(customer: &mut Customer, external: &ExternalCustomer) {
    customer.kind = kind_of(external);
}

pub fn apply_contact_info(customer: &mut Customer, external: &ExternalCustomer) {
    customer.address = external.postal_address.clone();
}

/// Applied unconditionally, regardless of classification.
pub fn apply_preferred_store(customer: &mut Customer, external: &ExternalCustomer) {
    customer.preferred_store = external.preferred_store.clone();
}
