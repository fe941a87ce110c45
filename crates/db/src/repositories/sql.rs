use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use custsync_core::{Address, Customer, CustomerId, CustomerKind, ShoppingList};

use super::{CustomerStore, RepositoryError};
use crate::DbPool;

pub struct SqlCustomerStore {
    pool: DbPool,
}

impl SqlCustomerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn fetch_one(
        &self,
        query: &str,
        bind: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query(query).bind(bind).fetch_optional(&self.pool).await?;
        match row {
            Some(ref row) => {
                let mut customer = row_to_customer(row)?;
                customer.shopping_lists = self.load_shopping_lists(&customer).await?;
                Ok(Some(customer))
            }
            None => Ok(None),
        }
    }

    async fn load_shopping_lists(
        &self,
        customer: &Customer,
    ) -> Result<Vec<ShoppingList>, RepositoryError> {
        let Some(internal_id) = &customer.internal_id else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            "SELECT csl.list_name, sl.items
             FROM customer_shopping_list csl
             LEFT JOIN shopping_list sl ON sl.name = csl.list_name
             WHERE csl.customer_id = ?
             ORDER BY csl.position",
        )
        .bind(&internal_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let name: String = row
                    .try_get("list_name")
                    .map_err(|e| RepositoryError::Decode(e.to_string()))?;
                let items_json: Option<String> =
                    row.try_get("items").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                let items = match items_json {
                    Some(json) => serde_json::from_str(&json)
                        .map_err(|e| RepositoryError::Decode(e.to_string()))?,
                    None => Vec::new(),
                };
                Ok(ShoppingList { name, items })
            })
            .collect()
    }

    async fn save_list_memberships(&self, customer: &Customer) -> Result<(), RepositoryError> {
        let Some(internal_id) = &customer.internal_id else {
            return Err(RepositoryError::MissingInternalId);
        };

        sqlx::query("DELETE FROM customer_shopping_list WHERE customer_id = ?")
            .bind(&internal_id.0)
            .execute(&self.pool)
            .await?;

        for (position, list) in customer.shopping_lists.iter().enumerate() {
            sqlx::query(
                "INSERT INTO customer_shopping_list (customer_id, list_name, position)
                 VALUES (?, ?, ?)",
            )
            .bind(&internal_id.0)
            .bind(&list.name)
            .bind(position as i64)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }
}

const SELECT_CUSTOMER: &str =
    "SELECT internal_id, external_id, master_external_id, customer_type, company_number,
            bonus_points_balance, name, preferred_store, street, city, postal_code
     FROM customer";

// Keys are expected to be unique, but a stable pick beats a planner-chosen
// one if the table ever holds two rows sharing a key.
fn select_where(filter: &str) -> String {
    format!("{SELECT_CUSTOMER} WHERE {filter} ORDER BY internal_id LIMIT 1")
}

fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Result<Customer, RepositoryError> {
    let internal_id: String =
        row.try_get("internal_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let external_id: Option<String> =
        row.try_get("external_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let master_external_id: Option<String> =
        row.try_get("master_external_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let customer_type: String =
        row.try_get("customer_type").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let company_number: Option<String> =
        row.try_get("company_number").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let bonus_points_balance: Option<i64> =
        row.try_get("bonus_points_balance").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let preferred_store: Option<String> =
        row.try_get("preferred_store").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let street: Option<String> =
        row.try_get("street").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let city: Option<String> =
        row.try_get("city").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let postal_code: Option<String> =
        row.try_get("postal_code").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let kind = match customer_type.as_str() {
        "company" => CustomerKind::Company {
            company_number: company_number.ok_or_else(|| {
                RepositoryError::Decode(format!(
                    "company customer {internal_id} has no company number"
                ))
            })?,
        },
        "person" => CustomerKind::Person { bonus_points_balance },
        other => {
            return Err(RepositoryError::Decode(format!("unknown customer type `{other}`")));
        }
    };

    let address = match (street, city, postal_code) {
        (Some(street), Some(city), Some(postal_code)) => {
            Some(Address { street, city, postal_code })
        }
        _ => None,
    };

    Ok(Customer {
        internal_id: Some(CustomerId(internal_id)),
        external_id,
        master_external_id,
        kind,
        name,
        preferred_store,
        address,
        shopping_lists: Vec::new(),
    })
}

fn customer_type_as_str(kind: &CustomerKind) -> &'static str {
    match kind {
        CustomerKind::Company { .. } => "company",
        CustomerKind::Person { .. } => "person",
    }
}

#[async_trait::async_trait]
impl CustomerStore for SqlCustomerStore {
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        self.fetch_one(&select_where("external_id = ?"), external_id).await
    }

    async fn find_by_master_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        self.fetch_one(&select_where("master_external_id = ?"), external_id).await
    }

    async fn find_by_company_number(
        &self,
        company_number: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        self.fetch_one(&select_where("company_number = ?"), company_number).await
    }

    async fn create(&self, mut customer: Customer) -> Result<Customer, RepositoryError> {
        let internal_id = CustomerId(Uuid::new_v4().to_string());
        customer.internal_id = Some(internal_id.clone());
        tracing::debug!(customer = %internal_id.0, "inserting customer row");

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO customer (internal_id, external_id, master_external_id, customer_type,
                                   company_number, bonus_points_balance, name, preferred_store,
                                   street, city, postal_code, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&internal_id.0)
        .bind(&customer.external_id)
        .bind(&customer.master_external_id)
        .bind(customer_type_as_str(&customer.kind))
        .bind(customer.company_number())
        .bind(customer.bonus_points_balance())
        .bind(&customer.name)
        .bind(&customer.preferred_store)
        .bind(customer.address.as_ref().map(|a| a.street.clone()))
        .bind(customer.address.as_ref().map(|a| a.city.clone()))
        .bind(customer.address.as_ref().map(|a| a.postal_code.clone()))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.save_list_memberships(&customer).await?;
        Ok(customer)
    }

    async fn update(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let Some(internal_id) = customer.internal_id.clone() else {
            return Err(RepositoryError::MissingInternalId);
        };
        tracing::debug!(customer = %internal_id.0, "updating customer row");

        sqlx::query(
            "UPDATE customer
             SET external_id = ?, master_external_id = ?, customer_type = ?, company_number = ?,
                 bonus_points_balance = ?, name = ?, preferred_store = ?, street = ?, city = ?,
                 postal_code = ?, updated_at = ?
             WHERE internal_id = ?",
        )
        .bind(&customer.external_id)
        .bind(&customer.master_external_id)
        .bind(customer_type_as_str(&customer.kind))
        .bind(customer.company_number())
        .bind(customer.bonus_points_balance())
        .bind(&customer.name)
        .bind(&customer.preferred_store)
        .bind(customer.address.as_ref().map(|a| a.street.clone()))
        .bind(customer.address.as_ref().map(|a| a.city.clone()))
        .bind(customer.address.as_ref().map(|a| a.postal_code.clone()))
        .bind(Utc::now().to_rfc3339())
        .bind(&internal_id.0)
        .execute(&self.pool)
        .await?;

        self.save_list_memberships(&customer).await?;
        Ok(customer)
    }

    async fn update_shopping_list(&self, list: ShoppingList) -> Result<(), RepositoryError> {
        let items = serde_json::to_string(&list.items)
            .map_err(|e| RepositoryError::Decode(e.to_string()))?;
        tracing::debug!(list = %list.name, "upserting shopping list");

        sqlx::query(
            "INSERT INTO shopping_list (name, items, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET
                 items = excluded.items,
                 updated_at = excluded.updated_at",
        )
        .bind(&list.name)
        .bind(&items)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
