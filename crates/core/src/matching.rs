//! Matching contract and conflict validation.
//!
//! The resolver produces a [`CustomerMatch`]; [`validate`] then checks it
//! against the external record's derived classification and business key.
//! Validation is pure: it either rejects the match with a [`ConflictError`]
//! or adjusts it (demoting a false match to a duplicate, or flagging that a
//! sibling record must be created). No store write happens before it returns.

use crate::domain::customer::{Classification, Customer};
use crate::domain::external::ExternalCustomer;
use crate::errors::ConflictError;

/// Which key produced the primary match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchTerm {
    #[default]
    None,
    ExternalId,
    CompanyNumber,
}

/// A secondary record that must be kept consistent with the primary.
/// `ToCreate` marks a sibling that does not exist yet and must be
/// synthesized and persisted by the duplicate coordinator.
#[derive(Clone, Debug, PartialEq)]
pub enum DuplicateSlot {
    Existing(Customer),
    ToCreate,
}

/// Resolver output: at most one primary candidate plus the ordered
/// duplicate slots discovered along the way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomerMatch {
    pub primary: Option<Customer>,
    pub match_term: MatchTerm,
    pub duplicates: Vec<DuplicateSlot>,
}

impl CustomerMatch {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn matched(customer: Customer, match_term: MatchTerm) -> Self {
        Self { primary: Some(customer), match_term, duplicates: Vec::new() }
    }
}

pub fn validate(
    matches: CustomerMatch,
    external: &ExternalCustomer,
) -> Result<CustomerMatch, ConflictError> {
    if let Some(primary) = &matches.primary {
        let expected = external.classification();
        if primary.classification() != expected {
            return Err(match expected {
                Classification::Person => {
                    ConflictError::NotAPerson { external_id: external.external_id.clone() }
                }
                Classification::Company => {
                    ConflictError::NotACompany { external_id: external.external_id.clone() }
                }
            });
        }
    }

    match external.classification() {
        Classification::Person => Ok(validate_person(matches, external)),
        Classification::Company => validate_company(matches, external),
    }
}

fn validate_person(mut matches: CustomerMatch, external: &ExternalCustomer) -> CustomerMatch {
    if let Some(primary) = matches.primary.as_mut() {
        if matches.match_term != MatchTerm::ExternalId {
            // The lookup found the record under some other key: re-stamp it
            // as the canonical target for this external identity.
            primary.external_id = Some(external.external_id.clone());
            primary.master_external_id = Some(external.external_id.clone());
        }
    }
    matches
}

fn validate_company(
    mut matches: CustomerMatch,
    external: &ExternalCustomer,
) -> Result<CustomerMatch, ConflictError> {
    let expected_number = external.company_number.clone().unwrap_or_default();

    match matches.match_term {
        MatchTerm::ExternalId => {
            if let Some(primary) = matches.primary.take() {
                if primary.company_number() == Some(expected_number.as_str()) {
                    matches.primary = Some(primary);
                } else {
                    // Same external key, different legal entity. The stored
                    // record is not this customer: it loses its canonical
                    // pointer and becomes a duplicate, and the sync falls
                    // through to the creation path.
                    let mut demoted = primary;
                    demoted.master_external_id = None;
                    matches.duplicates.push(DuplicateSlot::Existing(demoted));
                    matches.match_term = MatchTerm::None;
                }
            }
            Ok(matches)
        }
        MatchTerm::CompanyNumber => {
            if let Some(primary) = matches.primary.as_mut() {
                let stored_external_id = primary.external_id.clone().unwrap_or_default();
                if !stored_external_id.is_empty() && stored_external_id != external.external_id {
                    return Err(ConflictError::ExternalIdMismatch {
                        company_number: expected_number,
                        external_id: external.external_id.clone(),
                        stored_external_id,
                    });
                }
                primary.external_id = Some(external.external_id.clone());
                primary.master_external_id = Some(external.external_id.clone());
                // The entity is now reachable by two independent keys; a
                // sibling record addressed by external id must also exist.
                matches.duplicates.push(DuplicateSlot::ToCreate);
            }
            Ok(matches)
        }
        MatchTerm::None => Ok(matches),
    }
}
