//! Match resolution: which stored record, if any, an inbound external
//! record refers to, and under which key it was found.

use custsync_core::{CustomerMatch, DuplicateSlot, ExternalCustomer, MatchTerm};
use custsync_db::{CustomerStore, RepositoryError};

/// Look up the candidate records for an external customer. "Not found" is a
/// valid outcome and yields an empty match, never an error.
pub async fn resolve<S>(
    store: &S,
    external: &ExternalCustomer,
) -> Result<CustomerMatch, RepositoryError>
where
    S: CustomerStore + ?Sized,
{
    if external.is_company() {
        resolve_company(store, external).await
    } else {
        resolve_person(store, external).await
    }
}

async fn resolve_person<S>(
    store: &S,
    external: &ExternalCustomer,
) -> Result<CustomerMatch, RepositoryError>
where
    S: CustomerStore + ?Sized,
{
    Ok(match store.find_by_external_id(&external.external_id).await? {
        Some(customer) => CustomerMatch::matched(customer, MatchTerm::ExternalId),
        None => CustomerMatch::none(),
    })
}

async fn resolve_company<S>(
    store: &S,
    external: &ExternalCustomer,
) -> Result<CustomerMatch, RepositoryError>
where
    S: CustomerStore + ?Sized,
{
    if let Some(customer) = store.find_by_external_id(&external.external_id).await? {
        let primary_id = customer.internal_id.clone();
        let mut matches = CustomerMatch::matched(customer, MatchTerm::ExternalId);
        // Another record that still points at this external id as its
        // master is a sibling that must be kept in step with the primary.
        // The primary is usually its own canonical target, so a hit on the
        // same row is not a sibling.
        if let Some(sibling) = store.find_by_master_external_id(&external.external_id).await? {
            if sibling.internal_id != primary_id {
                matches.duplicates.push(DuplicateSlot::Existing(sibling));
            }
        }
        return Ok(matches);
    }

    let company_number = external.company_number.as_deref().unwrap_or_default();
    Ok(match store.find_by_company_number(company_number).await? {
        Some(customer) => CustomerMatch::matched(customer, MatchTerm::CompanyNumber),
        None => CustomerMatch::none(),
    })
}

#[cfg(test)]
mod tests {
    use custsync_core::{Customer, CustomerKind, DuplicateSlot, ExternalCustomer, MatchTerm};
    use custsync_db::{InMemoryCustomerStore, StoreOp};

    use super::resolve;

    fn external_company(external_id: &str, company_number: &str) -> ExternalCustomer {
        ExternalCustomer {
            external_id: external_id.to_string(),
            name: "Acme Inc.".to_string(),
            company_number: Some(company_number.to_string()),
            bonus_points_balance: None,
            postal_address: None,
            preferred_store: None,
            shopping_lists: Vec::new(),
        }
    }

    fn external_person(external_id: &str) -> ExternalCustomer {
        ExternalCustomer {
            company_number: None,
            name: "Joe Bloggs".to_string(),
            ..external_company(external_id, "")
        }
    }

    fn stored(external_id: Option<&str>, master: Option<&str>, kind: CustomerKind) -> Customer {
        Customer {
            internal_id: None,
            external_id: external_id.map(str::to_string),
            master_external_id: master.map(str::to_string),
            kind,
            name: "stored".to_string(),
            preferred_store: None,
            address: None,
            shopping_lists: Vec::new(),
        }
    }

    #[tokio::test]
    async fn person_lookup_stops_at_the_external_id() {
        let store = InMemoryCustomerStore::new();
        let matches = resolve(&store, &external_person("12345")).await.expect("resolve");

        assert!(matches.primary.is_none());
        assert_eq!(matches.match_term, MatchTerm::None);
        assert_eq!(store.journal().await, vec![StoreOp::FindByExternalId("12345".to_string())]);
    }

    #[tokio::test]
    async fn company_falls_back_to_the_company_number() {
        let store = InMemoryCustomerStore::new();
        store
            .seed(stored(
                None,
                None,
                CustomerKind::Company { company_number: "470813-8895".to_string() },
            ))
            .await;

        let matches =
            resolve(&store, &external_company("12345", "470813-8895")).await.expect("resolve");

        assert_eq!(matches.match_term, MatchTerm::CompanyNumber);
        assert!(matches.primary.is_some());
        assert_eq!(
            store.journal().await,
            vec![
                StoreOp::FindByExternalId("12345".to_string()),
                StoreOp::FindByCompanyNumber("470813-8895".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn external_id_hit_also_probes_for_a_master_sibling() {
        let store = InMemoryCustomerStore::new();
        let primary_id = store
            .seed(stored(
                Some("12345"),
                None,
                CustomerKind::Company { company_number: "470813-8895".to_string() },
            ))
            .await;
        let sibling_id = store
            .seed(stored(
                None,
                Some("12345"),
                CustomerKind::Company { company_number: "470813-8895".to_string() },
            ))
            .await;

        let matches =
            resolve(&store, &external_company("12345", "470813-8895")).await.expect("resolve");

        assert_eq!(matches.match_term, MatchTerm::ExternalId);
        assert_eq!(matches.primary.and_then(|c| c.internal_id), Some(primary_id));
        match &matches.duplicates[..] {
            [DuplicateSlot::Existing(sibling)] => {
                assert_eq!(sibling.internal_id, Some(sibling_id));
            }
            other => panic!("expected one sibling duplicate, got {other:?}"),
        }
        assert_eq!(
            store.journal().await,
            vec![
                StoreOp::FindByExternalId("12345".to_string()),
                StoreOp::FindByMasterExternalId("12345".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn primary_is_not_reported_as_its_own_sibling() {
        let store = InMemoryCustomerStore::new();
        store
            .seed(stored(
                Some("12345"),
                Some("12345"),
                CustomerKind::Company { company_number: "470813-8895".to_string() },
            ))
            .await;

        let matches =
            resolve(&store, &external_company("12345", "470813-8895")).await.expect("resolve");

        assert_eq!(matches.match_term, MatchTerm::ExternalId);
        assert!(matches.primary.is_some());
        assert!(matches.duplicates.is_empty());
    }
}
