use serde::{Deserialize, Serialize};

use crate::domain::customer::{Address, Classification};
use crate::domain::shopping_list::ShoppingList;

/// Inbound customer record from an outside source, alive for the duration
/// of one reconciliation call. Whether it represents a company is derived
/// solely from `company_number` being present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCustomer {
    pub external_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company_number: Option<String>,
    #[serde(default)]
    pub bonus_points_balance: Option<i64>,
    #[serde(default)]
    pub postal_address: Option<Address>,
    #[serde(default)]
    pub preferred_store: Option<String>,
    #[serde(default)]
    pub shopping_lists: Vec<ShoppingList>,
}

impl ExternalCustomer {
    pub fn classification(&self) -> Classification {
        if self.company_number.is_some() {
            Classification::Company
        } else {
            Classification::Person
        }
    }

    pub fn is_company(&self) -> bool {
        self.classification() == Classification::Company
    }
}
