//! Keeps sibling records linked to the same business entity in step with
//! the inbound external record.

use custsync_core::merge;
use custsync_core::{CustomerKind, DuplicateSlot, ExternalCustomer};
use custsync_db::CustomerStore;

use crate::sync::SyncError;

/// Process duplicate slots in the order the validator produced them; each
/// slot is fully persisted before the next one is touched.
pub async fn coordinate<S>(
    store: &S,
    external: &ExternalCustomer,
    slots: Vec<DuplicateSlot>,
) -> Result<(), SyncError>
where
    S: CustomerStore + ?Sized,
{
    for slot in slots {
        let mut duplicate = match slot {
            DuplicateSlot::Existing(existing) => merge::materialize(Some(existing), external),
            DuplicateSlot::ToCreate => merge::materialize(None, external),
        };

        if !external.is_company() {
            if let CustomerKind::Person { bonus_points_balance } = &mut duplicate.kind {
                *bonus_points_balance = external.bonus_points_balance;
            }
        }

        if duplicate.internal_id.is_none() {
            tracing::debug!(external_id = %external.external_id, "creating duplicate record");
            store.create(duplicate).await?;
        } else {
            tracing::debug!(external_id = %external.external_id, "updating duplicate record");
            store.update(duplicate).await?;
        }
    }
    Ok(())
}
