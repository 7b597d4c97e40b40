//! Row-change events published by the store after each committed write.
//!
//! One independent broadcast channel per table. Delivery within a channel
//! follows commit order; nothing is guaranteed across channels. A receiver
//! that falls behind observes `Lagged` and must re-snapshot.

use tokio::sync::broadcast;

use super::{CustomerRow, StaffRow};

/// A row-level change notification with before/after payloads.
#[derive(Debug, Clone)]
pub enum RowChange<T> {
    Insert { new: T },
    Update { old: T, new: T },
    Delete { old: T },
}

impl<T> RowChange<T> {
    /// The most current payload carried by the event: the new row for
    /// inserts and updates, the old row for deletes.
    pub fn row(&self) -> &T {
        match self {
            RowChange::Insert { new } | RowChange::Update { new, .. } => new,
            RowChange::Delete { old } => old,
        }
    }
}

/// Fan-out point for row changes, one channel per table.
pub(super) struct ChangeHub {
    customers: broadcast::Sender<RowChange<CustomerRow>>,
    staff: broadcast::Sender<RowChange<StaffRow>>,
}

impl ChangeHub {
    pub(super) fn new(capacity: usize) -> Self {
        let (customers, _) = broadcast::channel(capacity);
        let (staff, _) = broadcast::channel(capacity);
        Self { customers, staff }
    }

    pub(super) fn subscribe_customers(&self) -> broadcast::Receiver<RowChange<CustomerRow>> {
        self.customers.subscribe()
    }

    pub(super) fn subscribe_staff(&self) -> broadcast::Receiver<RowChange<StaffRow>> {
        self.staff.subscribe()
    }

    pub(super) fn publish_customer(&self, change: RowChange<CustomerRow>) {
        // Ignore send errors (no subscribers)
        let _ = self.customers.send(change);
    }

    pub(super) fn publish_staff(&self, change: RowChange<StaffRow>) {
        let _ = self.staff.send(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer_row(name: &str) -> CustomerRow {
        CustomerRow {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            contact: "555".to_string(),
            notes: None,
            customer_type: "Consumer".to_string(),
            category: "general".to_string(),
            timestamp: "2026-03-01T10:00:00+00:00".to_string(),
            assigned_staff: None,
            served_timestamp: None,
            appearance: None,
        }
    }

    #[tokio::test]
    async fn test_hub_delivers_to_subscriber() {
        let hub = ChangeHub::new(16);
        let mut rx = hub.subscribe_customers();

        hub.publish_customer(RowChange::Insert {
            new: customer_row("Bo"),
        });

        let change = rx.try_recv().unwrap();
        assert!(matches!(change, RowChange::Insert { ref new } if new.name == "Bo"));
    }

    #[tokio::test]
    async fn test_hub_streams_are_independent() {
        let hub = ChangeHub::new(16);
        let mut staff_rx = hub.subscribe_staff();

        hub.publish_customer(RowChange::Insert {
            new: customer_row("Bo"),
        });

        // Nothing crosses from the customers stream to the staff stream.
        assert!(staff_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let hub = ChangeHub::new(16);
        hub.publish_customer(RowChange::Delete {
            old: customer_row("Bo"),
        });
    }

    #[test]
    fn test_row_change_current_payload() {
        let old = customer_row("Bo");
        let mut new = old.clone();
        new.notes = Some("updated".to_string());

        let change = RowChange::Update {
            old,
            new: new.clone(),
        };
        assert_eq!(change.row().notes, new.notes);

        let change = RowChange::Delete { old: new.clone() };
        assert_eq!(change.row().id, new.id);
    }
}
