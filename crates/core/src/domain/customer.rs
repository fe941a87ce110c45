use serde::{Deserialize, Serialize};

use crate::domain::shopping_list::ShoppingList;

/// Store-assigned identity. A customer without one has never been persisted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

/// Discriminant of [`CustomerKind`], used for comparisons and conflict
/// reporting without dragging the type-specific payload along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Company,
    Person,
}

/// Type-specific customer data. Companies carry a company number, persons a
/// bonus points balance; neither field exists for the other kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerKind {
    Company { company_number: String },
    Person { bonus_points_balance: Option<i64> },
}

impl CustomerKind {
    pub fn classification(&self) -> Classification {
        match self {
            Self::Company { .. } => Classification::Company,
            Self::Person { .. } => Classification::Person,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
}

/// Persisted internal customer record.
///
/// `master_external_id` is set only while this record is the canonical
/// resolution target for its external id; demoting the record to a
/// duplicate clears it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub internal_id: Option<CustomerId>,
    pub external_id: Option<String>,
    pub master_external_id: Option<String>,
    pub kind: CustomerKind,
    pub name: String,
    pub preferred_store: Option<String>,
    pub address: Option<Address>,
    pub shopping_lists: Vec<ShoppingList>,
}

impl Customer {
    pub fn classification(&self) -> Classification {
        self.kind.classification()
    }

    pub fn company_number(&self) -> Option<&str> {
        match &self.kind {
            CustomerKind::Company { company_number } => Some(company_number),
            CustomerKind::Person { .. } => None,
        }
    }

    pub fn bonus_points_balance(&self) -> Option<i64> {
        match &self.kind {
            CustomerKind::Company { .. } => None,
            CustomerKind::Person { bonus_points_balance } => *bonus_points_balance,
        }
    }

    /// Shopping lists are accumulative and keyed by name: a list already
    /// present is refreshed in place, a new one is appended.
    pub fn add_shopping_list(&mut self, list: ShoppingList) {
        match self.shopping_lists.iter_mut().find(|existing| existing.name == list.name) {
            Some(existing) => *existing = list,
            None => self.shopping_lists.push(list),
        }
    }
}
