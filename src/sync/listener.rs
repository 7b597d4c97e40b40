//! Change listener: folds store row-change events into the local mirror.
//!
//! One task per table stream, owned by [`ListenerHandles`]. The listener
//! only mutates the mirror; compensating business writes (e.g. clearing
//! assignments when staff are removed) belong to the command layer.
//! Application is idempotent given the current mirror state, so replayed
//! events are safe.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::mirror::RosterMirror;
use crate::models::{Customer, Staff};
use crate::store::{CustomerRow, RosterStore, RowChange, StaffRow};

/// Owned handles for the two listener tasks.
///
/// At most one pair is alive per engine; dropping or shutting down the
/// handles stops event delivery.
pub(crate) struct ListenerHandles {
    customers: JoinHandle<()>,
    staff: JoinHandle<()>,
}

impl ListenerHandles {
    pub(crate) fn shutdown(self) {
        self.customers.abort();
        self.staff.abort();
    }
}

/// Subscribes to both streams and spawns the listener tasks.
pub(crate) fn spawn(store: Arc<RosterStore>, mirror: Arc<RosterMirror>) -> ListenerHandles {
    let customers = tokio::spawn(run_customer_listener(store.clone(), mirror.clone()));
    let staff = tokio::spawn(run_staff_listener(store, mirror));
    ListenerHandles { customers, staff }
}

async fn run_customer_listener(store: Arc<RosterStore>, mirror: Arc<RosterMirror>) {
    let mut rx = store.subscribe_customers();
    loop {
        match rx.recv().await {
            Ok(change) => apply_customer_change(&mirror, &change),
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "customer stream lagged, re-snapshotting");
                if let Err(e) = resync_customers(&store, &mirror).await {
                    tracing::error!("failed to re-snapshot customers: {}", e);
                }
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn run_staff_listener(store: Arc<RosterStore>, mirror: Arc<RosterMirror>) {
    let mut rx = store.subscribe_staff();
    loop {
        match rx.recv().await {
            Ok(RowChange::Update { new, .. }) => apply_staff_update(&store, &mirror, &new).await,
            Ok(change) => apply_staff_change(&mirror, &change),
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "staff stream lagged, re-snapshotting");
                if let Err(e) = resync_staff(&store, &mirror).await {
                    tracing::error!("failed to re-snapshot staff: {}", e);
                }
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Applies a customer event to the mirror.
pub(crate) fn apply_customer_change(mirror: &RosterMirror, change: &RowChange<CustomerRow>) {
    match change {
        RowChange::Insert { new } | RowChange::Update { new, .. } => {
            mirror.upsert_customer(Customer::from_row(new));
        }
        RowChange::Delete { old } => {
            if let Ok(id) = Uuid::parse_str(&old.id) {
                mirror.remove_customer(id);
            }
        }
    }
}

/// Applies a staff insert or delete event to the mirror.
pub(crate) fn apply_staff_change(mirror: &RosterMirror, change: &RowChange<StaffRow>) {
    match change {
        RowChange::Insert { new } | RowChange::Update { new, .. } => {
            mirror.upsert_staff(Staff::from_row(new));
        }
        RowChange::Delete { old } => {
            if let Ok(id) = Uuid::parse_str(&old.id) {
                mirror.remove_staff(id);
            }
        }
    }
}

/// On staff updates the row is re-read from the store rather than trusted
/// from the payload, so relationship changes committed between the event
/// and its delivery are not missed. A failed re-read falls back to the
/// payload after logging.
async fn apply_staff_update(store: &RosterStore, mirror: &RosterMirror, new: &StaffRow) {
    let Ok(id) = Uuid::parse_str(&new.id) else {
        return;
    };
    match store.get_staff(id).await {
        Ok(Some(row)) => mirror.upsert_staff(Staff::from_row(&row)),
        // Row deleted between the update and now; the delete event follows,
        // but removing here is already correct.
        Ok(None) => mirror.remove_staff(id),
        Err(e) => {
            tracing::warn!("staff re-read failed, applying event payload: {}", e);
            mirror.upsert_staff(Staff::from_row(new));
        }
    }
}

/// Replaces the mirror's waiting list with a fresh ordered snapshot.
pub(crate) async fn resync_customers(
    store: &RosterStore,
    mirror: &RosterMirror,
) -> Result<(), sqlx::Error> {
    let rows = store.list_customers().await?;
    mirror.replace_customers(rows.iter().map(Customer::from_row).collect());
    Ok(())
}

/// Replaces the mirror's staff roster with a fresh snapshot.
pub(crate) async fn resync_staff(
    store: &RosterStore,
    mirror: &RosterMirror,
) -> Result<(), sqlx::Error> {
    let rows = store.list_staff().await?;
    mirror.replace_staff(rows.iter().map(Staff::from_row).collect());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomerType;

    fn customer_row(name: &str, hour: u32) -> CustomerRow {
        CustomerRow {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            contact: "555".to_string(),
            notes: None,
            customer_type: "Consumer".to_string(),
            category: "general".to_string(),
            timestamp: format!("2026-03-01T{:02}:00:00+00:00", hour),
            assigned_staff: None,
            served_timestamp: None,
            appearance: None,
        }
    }

    fn staff_row(name: &str) -> StaffRow {
        StaffRow {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            ready_timestamp: "2026-03-01T09:00:00+00:00".to_string(),
            serving_customer: None,
            serving_start_time: None,
            on_lunch: false,
            lunch_start_time: None,
        }
    }

    #[test]
    fn test_insert_then_update_then_delete() {
        let mirror = RosterMirror::new();
        let row = customer_row("Bo", 10);

        apply_customer_change(&mirror, &RowChange::Insert { new: row.clone() });
        assert_eq!(mirror.customers_snapshot().len(), 1);
        assert_eq!(mirror.customers_snapshot()[0].customer_type, CustomerType::Consumer);

        let mut updated = row.clone();
        updated.notes = Some("vip guest".to_string());
        apply_customer_change(
            &mirror,
            &RowChange::Update {
                old: row.clone(),
                new: updated,
            },
        );
        assert_eq!(mirror.customers_snapshot()[0].notes, "vip guest");

        apply_customer_change(&mirror, &RowChange::Delete { old: row });
        assert!(mirror.customers_snapshot().is_empty());
    }

    #[test]
    fn test_replaying_events_is_idempotent() {
        let mirror = RosterMirror::new();
        let a = customer_row("A", 9);
        let b = customer_row("B", 10);
        let events = vec![
            RowChange::Insert { new: a.clone() },
            RowChange::Insert { new: b.clone() },
            RowChange::Delete { old: a },
        ];

        for event in &events {
            apply_customer_change(&mirror, event);
        }
        let once = mirror.customers_snapshot();

        // At-least-once delivery: the whole sequence may arrive again.
        for event in &events {
            apply_customer_change(&mirror, event);
        }
        assert_eq!(mirror.customers_snapshot(), once);
        assert_eq!(once.len(), 1);
        assert_eq!(once[0].name, "B");
    }

    #[test]
    fn test_delete_of_absent_staff_is_noop() {
        let mirror = RosterMirror::new();
        apply_staff_change(&mirror, &RowChange::Insert { new: staff_row("Ana") });

        apply_staff_change(
            &mirror,
            &RowChange::Delete {
                old: staff_row("Never Added"),
            },
        );
        assert_eq!(mirror.staff_snapshot().len(), 1);
    }

    #[test]
    fn test_realtime_customer_insert_lands_in_arrival_order() {
        let mirror = RosterMirror::new();
        apply_customer_change(&mirror, &RowChange::Insert { new: customer_row("Late", 15) });
        apply_customer_change(&mirror, &RowChange::Insert { new: customer_row("Early", 8) });

        let names: Vec<String> = mirror
            .customers_snapshot()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Early", "Late"]);
    }
}
