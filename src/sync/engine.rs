//! The roster sync engine: command layer plus bootstrap/teardown.
//!
//! Commands write to the store and rely on the change listener to reflect
//! the result in the mirror. Multi-record commands order their writes so a
//! mid-sequence failure never loses a customer's place in the queue: the
//! customer-side write always precedes the staff-side write.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::timeout;
use uuid::Uuid;

use super::listener::{self, ListenerHandles};
use super::mirror::RosterMirror;
use crate::models::{Customer, NewCustomer, Staff};
use crate::store::RosterStore;

/// Errors surfaced by engine commands.
///
/// Commands referencing identities absent from the mirror are silent
/// no-ops, not errors. There are no retries; every failure is local to
/// one command invocation.
#[derive(Debug)]
pub enum EngineError {
    /// A snapshot or lookup failed; the mirror keeps its prior state.
    RemoteRead {
        op: &'static str,
        source: sqlx::Error,
    },
    /// The store rejected a write; the command may be partially applied.
    RemoteWrite {
        op: &'static str,
        source: sqlx::Error,
    },
    /// A remote call exceeded the configured command timeout.
    Timeout { op: &'static str },
    /// `toggle_lunch` was called with lunch tracking disabled.
    LunchTrackingDisabled,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::RemoteRead { op, source } => {
                write!(f, "Remote read failed ({}): {}", op, source)
            }
            EngineError::RemoteWrite { op, source } => {
                write!(f, "Remote write failed ({}): {}", op, source)
            }
            EngineError::Timeout { op } => write!(f, "Remote call timed out ({})", op),
            EngineError::LunchTrackingDisabled => {
                write!(f, "Lunch tracking is disabled in configuration")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::RemoteRead { source, .. } | EngineError::RemoteWrite { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

/// Engine tuning knobs, loaded from the `[sync]` config section.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Per-remote-call timeout applied to every command.
    pub command_timeout: Duration,
    /// Enables the lunch-break feature (`toggle_lunch`).
    pub lunch_tracking: bool,
    /// Clear orphaned assignments before deleting a staff row. `false`
    /// gives the delete-then-clear order instead.
    pub clear_assignments_before_delete: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(10),
            lunch_tracking: true,
            clear_assignments_before_delete: true,
        }
    }
}

/// Keeps the in-memory roster consistent with the store and exposes the
/// floor commands.
pub struct RosterSyncEngine {
    store: Arc<RosterStore>,
    mirror: Arc<RosterMirror>,
    options: SyncOptions,
    listeners: Mutex<Option<ListenerHandles>>,
}

impl RosterSyncEngine {
    pub fn new(store: Arc<RosterStore>, options: SyncOptions) -> Self {
        Self {
            store,
            mirror: Arc::new(RosterMirror::new()),
            options,
            listeners: Mutex::new(None),
        }
    }

    /// Loads a full snapshot and activates the change listeners.
    ///
    /// Idempotent: once the listeners are alive, later calls return
    /// immediately.
    pub async fn init(&self) -> Result<(), EngineError> {
        if self
            .listeners
            .lock()
            .expect("listener lock poisoned")
            .is_some()
        {
            return Ok(());
        }

        tracing::debug!("initializing roster sync");
        self.refresh().await?;

        let mut guard = self.listeners.lock().expect("listener lock poisoned");
        if guard.is_none() {
            *guard = Some(listener::spawn(self.store.clone(), self.mirror.clone()));
        }
        Ok(())
    }

    /// Stops the change listeners. Safe to call when never initialized.
    pub fn shutdown(&self) {
        let handles = self
            .listeners
            .lock()
            .expect("listener lock poisoned")
            .take();
        if let Some(handles) = handles {
            tracing::debug!("shutting down roster sync");
            handles.shutdown();
        }
    }

    /// Replaces both mirror collections with fresh store snapshots.
    pub async fn refresh(&self) -> Result<(), EngineError> {
        self.read(
            "customer snapshot",
            listener::resync_customers(&self.store, &self.mirror),
        )
        .await?;
        self.read(
            "staff snapshot",
            listener::resync_staff(&self.store, &self.mirror),
        )
        .await?;
        Ok(())
    }

    /// Read-only reactive view of the waiting list, in arrival order.
    pub fn waiting_customers(&self) -> watch::Receiver<Vec<Customer>> {
        self.mirror.waiting_customers()
    }

    /// Read-only reactive view of the staff roster.
    pub fn staff_roster(&self) -> watch::Receiver<Vec<Staff>> {
        self.mirror.staff_roster()
    }

    /// The local mirror (read-only access for collaborators).
    pub fn mirror(&self) -> &RosterMirror {
        &self.mirror
    }

    /// Adds a customer to the queue. The store assigns the identity; the
    /// listener reflects the new row into the mirror.
    pub async fn add_customer(&self, customer: NewCustomer) -> Result<Customer, EngineError> {
        let row = self
            .write("insert customer", self.store.insert_customer(&customer))
            .await?;
        tracing::info!(customer = %row.name, "customer added to queue");
        Ok(Customer::from_row(&row))
    }

    /// Removes a customer. If they were being served, their staff member
    /// is reset first; the customer row is only deleted once that reset
    /// committed.
    pub async fn remove_customer(&self, id: Uuid) -> Result<(), EngineError> {
        let Some(customer) = self.mirror.customer(id) else {
            tracing::debug!(%id, "remove_customer: not in mirror, nothing to do");
            return Ok(());
        };

        if let Some(staff_id) = customer.assigned_staff {
            self.write(
                "reset staff serving",
                self.store.clear_serving(staff_id, Utc::now()),
            )
            .await?;
        }

        self.write("delete customer", self.store.delete_customer(id))
            .await?;
        tracing::info!(customer = %customer.name, "customer removed from queue");
        Ok(())
    }

    /// Adds a staff member to the roster, ready as of now.
    pub async fn add_staff(&self, name: &str) -> Result<Staff, EngineError> {
        let row = self
            .write("insert staff", self.store.insert_staff(name, Utc::now()))
            .await?;
        tracing::info!(staff = %row.name, "staff member added");
        Ok(Staff::from_row(&row))
    }

    /// Removes a staff member and returns their customers to the
    /// unassigned pool. The compensation runs here, once, instead of in
    /// the event path; its order relative to the delete is configurable.
    pub async fn remove_staff(&self, id: Uuid) -> Result<(), EngineError> {
        let Some(staff) = self.mirror.staff_member(id) else {
            tracing::debug!(%id, "remove_staff: not in mirror, nothing to do");
            return Ok(());
        };

        if self.options.clear_assignments_before_delete {
            self.clear_orphaned_assignments(id).await?;
            self.write("delete staff", self.store.delete_staff(id))
                .await?;
        } else {
            self.write("delete staff", self.store.delete_staff(id))
                .await?;
            self.clear_orphaned_assignments(id).await?;
        }

        tracing::info!(staff = %staff.name, "staff member removed");
        Ok(())
    }

    /// Assigns a staff member to a customer.
    ///
    /// The customer-side write goes first: if the staff-side write then
    /// fails, the customer keeps their "being served" mark rather than
    /// silently re-entering the pool, and a later event or `refresh`
    /// reconverges both sides.
    pub async fn assign_staff_to_customer(
        &self,
        customer_id: Uuid,
        staff_id: Uuid,
    ) -> Result<(), EngineError> {
        let now = Utc::now();

        self.write(
            "assign customer",
            self.store.assign_customer(customer_id, staff_id, now),
        )
        .await?;
        self.write(
            "mark staff serving",
            self.store.start_serving(staff_id, customer_id, now),
        )
        .await?;

        tracing::info!(%customer_id, %staff_id, "staff assigned to customer");
        Ok(())
    }

    /// Updates a customer's free-text notes.
    pub async fn update_notes(&self, customer_id: Uuid, notes: &str) -> Result<(), EngineError> {
        self.write(
            "update notes",
            self.store.update_customer_notes(customer_id, notes),
        )
        .await?;
        Ok(())
    }

    /// Toggles a staff member's lunch break. Going on lunch drops any
    /// active assignment on both sides.
    pub async fn toggle_lunch(&self, staff_id: Uuid) -> Result<(), EngineError> {
        if !self.options.lunch_tracking {
            return Err(EngineError::LunchTrackingDisabled);
        }
        let Some(staff) = self.mirror.staff_member(staff_id) else {
            tracing::debug!(%staff_id, "toggle_lunch: not in mirror, nothing to do");
            return Ok(());
        };

        let going_on_lunch = !staff.on_lunch;
        self.write(
            "toggle lunch",
            self.store.set_staff_lunch(staff_id, going_on_lunch, Utc::now()),
        )
        .await?;

        if let Some(customer_id) = staff.serving_customer {
            self.write(
                "clear customer assignment",
                self.store.clear_assignment(customer_id),
            )
            .await?;
        }

        tracing::info!(staff = %staff.name, on_lunch = going_on_lunch, "lunch toggled");
        Ok(())
    }

    async fn clear_orphaned_assignments(&self, staff_id: Uuid) -> Result<(), EngineError> {
        let assigned = self
            .read(
                "list assigned customers",
                self.store.customers_assigned_to(staff_id),
            )
            .await?;

        for row in &assigned {
            if let Ok(customer_id) = Uuid::parse_str(&row.id) {
                self.write(
                    "clear customer assignment",
                    self.store.clear_assignment(customer_id),
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn read<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, EngineError> {
        match timeout(self.options.command_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => {
                tracing::error!("remote read failed ({}): {}", op, source);
                Err(EngineError::RemoteRead { op, source })
            }
            Err(_) => {
                tracing::error!("remote call timed out ({})", op);
                Err(EngineError::Timeout { op })
            }
        }
    }

    async fn write<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, EngineError> {
        match timeout(self.options.command_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => {
                tracing::error!("remote write failed ({}): {}", op, source);
                Err(EngineError::RemoteWrite { op, source })
            }
            Err(_) => {
                tracing::error!("remote call timed out ({})", op);
                Err(EngineError::Timeout { op })
            }
        }
    }
}

impl Drop for RosterSyncEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
