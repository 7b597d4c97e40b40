//! Remote-store client: SQLite-backed roster tables plus a realtime
//! change feed published after every committed write.

mod events;

pub use events::RowChange;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::NewCustomer;
use events::ChangeHub;

/// Raw `customers` row as persisted.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: String,
    pub name: String,
    pub contact: String,
    pub notes: Option<String>,
    pub customer_type: String,
    pub category: String,
    pub timestamp: String,
    pub assigned_staff: Option<String>,
    pub served_timestamp: Option<String>,
    pub appearance: Option<String>,
}

/// Raw `staff` row as persisted.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StaffRow {
    pub id: String,
    pub name: String,
    pub ready_timestamp: String,
    pub serving_customer: Option<String>,
    pub serving_start_time: Option<String>,
    pub on_lunch: bool,
    pub lunch_start_time: Option<String>,
}

/// Store client for the roster tables.
///
/// Every write publishes a [`RowChange`] on the matching table stream after
/// it commits, so subscribed sync engines converge without polling.
pub struct RosterStore {
    pool: SqlitePool,
    hub: ChangeHub,
}

impl RosterStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            hub: ChangeHub::new(64),
        }
    }

    /// Subscribes to the customers change stream.
    pub fn subscribe_customers(&self) -> broadcast::Receiver<RowChange<CustomerRow>> {
        self.hub.subscribe_customers()
    }

    /// Subscribes to the staff change stream.
    pub fn subscribe_staff(&self) -> broadcast::Receiver<RowChange<StaffRow>> {
        self.hub.subscribe_staff()
    }

    /// All customers, oldest arrival first.
    pub async fn list_customers(&self) -> Result<Vec<CustomerRow>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM customers ORDER BY timestamp ASC")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn list_staff(&self) -> Result<Vec<StaffRow>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM staff")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_customer(&self, id: Uuid) -> Result<Option<CustomerRow>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM customers WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_staff(&self, id: Uuid) -> Result<Option<StaffRow>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM staff WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
    }

    /// Customers currently assigned to the given staff member.
    pub async fn customers_assigned_to(
        &self,
        staff_id: Uuid,
    ) -> Result<Vec<CustomerRow>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM customers WHERE assigned_staff = ?")
            .bind(staff_id.to_string())
            .fetch_all(&self.pool)
            .await
    }

    /// Inserts a customer with a store-assigned identity.
    pub async fn insert_customer(
        &self,
        customer: &NewCustomer,
    ) -> Result<CustomerRow, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let appearance = customer
            .appearance
            .as_ref()
            .and_then(|a| serde_json::to_string(a).ok());

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, contact, notes, customer_type, category, timestamp, assigned_staff, served_timestamp, appearance)
            VALUES (?, ?, ?, ?, ?, ?, ?, NULL, NULL, ?)
            "#,
        )
        .bind(&id)
        .bind(&customer.name)
        .bind(&customer.contact)
        .bind(&customer.notes)
        .bind(customer.customer_type.to_string())
        .bind(&customer.category)
        .bind(customer.arrived_at.to_rfc3339())
        .bind(&appearance)
        .execute(&self.pool)
        .await?;

        let row = self.fetch_customer(&id).await?;
        self.hub.publish_customer(RowChange::Insert { new: row.clone() });
        Ok(row)
    }

    pub async fn update_customer_notes(
        &self,
        id: Uuid,
        notes: &str,
    ) -> Result<CustomerRow, sqlx::Error> {
        let id = id.to_string();
        let old = self.fetch_customer(&id).await?;

        sqlx::query("UPDATE customers SET notes = ? WHERE id = ?")
            .bind(notes)
            .bind(&id)
            .execute(&self.pool)
            .await?;

        let new = self.fetch_customer(&id).await?;
        self.hub
            .publish_customer(RowChange::Update { old, new: new.clone() });
        Ok(new)
    }

    /// Marks a customer as being served by the given staff member.
    pub async fn assign_customer(
        &self,
        id: Uuid,
        staff_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<CustomerRow, sqlx::Error> {
        let id = id.to_string();
        let old = self.fetch_customer(&id).await?;

        sqlx::query("UPDATE customers SET assigned_staff = ?, served_timestamp = ? WHERE id = ?")
            .bind(staff_id.to_string())
            .bind(at.to_rfc3339())
            .bind(&id)
            .execute(&self.pool)
            .await?;

        let new = self.fetch_customer(&id).await?;
        self.hub
            .publish_customer(RowChange::Update { old, new: new.clone() });
        Ok(new)
    }

    /// Returns a customer to the unassigned pool.
    pub async fn clear_assignment(&self, id: Uuid) -> Result<CustomerRow, sqlx::Error> {
        let id = id.to_string();
        let old = self.fetch_customer(&id).await?;

        sqlx::query(
            "UPDATE customers SET assigned_staff = NULL, served_timestamp = NULL WHERE id = ?",
        )
        .bind(&id)
        .execute(&self.pool)
        .await?;

        let new = self.fetch_customer(&id).await?;
        self.hub
            .publish_customer(RowChange::Update { old, new: new.clone() });
        Ok(new)
    }

    /// Deletes a customer. Deleting an absent id is a no-op.
    pub async fn delete_customer(&self, id: Uuid) -> Result<(), sqlx::Error> {
        let id = id.to_string();
        let Some(old) = sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers WHERE id = ?")
            .bind(&id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(());
        };

        sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(&id)
            .execute(&self.pool)
            .await?;

        self.hub.publish_customer(RowChange::Delete { old });
        Ok(())
    }

    pub async fn insert_staff(
        &self,
        name: &str,
        ready_at: DateTime<Utc>,
    ) -> Result<StaffRow, sqlx::Error> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO staff (id, name, ready_timestamp, serving_customer, serving_start_time, on_lunch, lunch_start_time)
            VALUES (?, ?, ?, NULL, NULL, 0, NULL)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(ready_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let row = self.fetch_staff(&id).await?;
        self.hub.publish_staff(RowChange::Insert { new: row.clone() });
        Ok(row)
    }

    /// Marks a staff member as serving the given customer.
    pub async fn start_serving(
        &self,
        staff_id: Uuid,
        customer_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<StaffRow, sqlx::Error> {
        let id = staff_id.to_string();
        let old = self.fetch_staff(&id).await?;

        sqlx::query("UPDATE staff SET serving_customer = ?, serving_start_time = ? WHERE id = ?")
            .bind(customer_id.to_string())
            .bind(at.to_rfc3339())
            .bind(&id)
            .execute(&self.pool)
            .await?;

        let new = self.fetch_staff(&id).await?;
        self.hub
            .publish_staff(RowChange::Update { old, new: new.clone() });
        Ok(new)
    }

    /// Clears the serving fields and marks the staff member ready again.
    pub async fn clear_serving(
        &self,
        staff_id: Uuid,
        ready_at: DateTime<Utc>,
    ) -> Result<StaffRow, sqlx::Error> {
        let id = staff_id.to_string();
        let old = self.fetch_staff(&id).await?;

        sqlx::query(
            "UPDATE staff SET serving_customer = NULL, serving_start_time = NULL, ready_timestamp = ? WHERE id = ?",
        )
        .bind(ready_at.to_rfc3339())
        .bind(&id)
        .execute(&self.pool)
        .await?;

        let new = self.fetch_staff(&id).await?;
        self.hub
            .publish_staff(RowChange::Update { old, new: new.clone() });
        Ok(new)
    }

    /// Sets or clears the lunch flag.
    ///
    /// Going on lunch records the start time and clears any serving fields;
    /// coming back clears the start time and bumps `ready_timestamp`.
    pub async fn set_staff_lunch(
        &self,
        staff_id: Uuid,
        on_lunch: bool,
        at: DateTime<Utc>,
    ) -> Result<StaffRow, sqlx::Error> {
        let id = staff_id.to_string();
        let old = self.fetch_staff(&id).await?;

        if on_lunch {
            sqlx::query(
                "UPDATE staff SET on_lunch = 1, lunch_start_time = ?, serving_customer = NULL, serving_start_time = NULL WHERE id = ?",
            )
            .bind(at.to_rfc3339())
            .bind(&id)
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query(
                "UPDATE staff SET on_lunch = 0, lunch_start_time = NULL, ready_timestamp = ?, serving_customer = NULL, serving_start_time = NULL WHERE id = ?",
            )
            .bind(at.to_rfc3339())
            .bind(&id)
            .execute(&self.pool)
            .await?;
        }

        let new = self.fetch_staff(&id).await?;
        self.hub
            .publish_staff(RowChange::Update { old, new: new.clone() });
        Ok(new)
    }

    /// Deletes a staff member. Deleting an absent id is a no-op.
    pub async fn delete_staff(&self, id: Uuid) -> Result<(), sqlx::Error> {
        let id = id.to_string();
        let Some(old) = sqlx::query_as::<_, StaffRow>("SELECT * FROM staff WHERE id = ?")
            .bind(&id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(());
        };

        sqlx::query("DELETE FROM staff WHERE id = ?")
            .bind(&id)
            .execute(&self.pool)
            .await?;

        self.hub.publish_staff(RowChange::Delete { old });
        Ok(())
    }

    async fn fetch_customer(&self, id: &str) -> Result<CustomerRow, sqlx::Error> {
        sqlx::query_as("SELECT * FROM customers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    async fn fetch_staff(&self, id: &str) -> Result<StaffRow, sqlx::Error> {
        sqlx::query_as("SELECT * FROM staff WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }
}
