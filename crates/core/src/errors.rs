use thiserror::Error;

/// An irreconcilable difference between an inbound external record and an
/// existing internal record. Conflicts are fatal to the current sync call
/// and are always detected before any store write is issued.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConflictError {
    #[error("existing customer for external id {external_id} is a company, not a person")]
    NotAPerson { external_id: String },
    #[error("existing customer for external id {external_id} is a person, not a company")]
    NotACompany { external_id: String },
    #[error(
        "customer matched by company number {company_number} is bound to \
         external id {stored_external_id}, not {external_id}"
    )]
    ExternalIdMismatch {
        company_number: String,
        external_id: String,
        stored_external_id: String,
    },
}
