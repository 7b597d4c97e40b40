//! Local mirror of the roster: two reactive collections behind watch
//! channels. The store remains the source of truth; the mirror is a
//! disposable cache rebuilt from snapshots and change events.

use tokio::sync::watch;
use uuid::Uuid;

use crate::models::{Customer, Staff};

/// Reactive roster state.
///
/// `waiting_customers` is kept in ascending arrival order, including for
/// realtime inserts; `staff_roster` keeps insertion order. Every mutation
/// goes through `send_modify`, so watchers never observe a partial write.
pub struct RosterMirror {
    customers: watch::Sender<Vec<Customer>>,
    staff: watch::Sender<Vec<Staff>>,
}

impl RosterMirror {
    pub fn new() -> Self {
        let (customers, _) = watch::channel(Vec::new());
        let (staff, _) = watch::channel(Vec::new());
        Self { customers, staff }
    }

    /// Read-only reactive view of the waiting list.
    pub fn waiting_customers(&self) -> watch::Receiver<Vec<Customer>> {
        self.customers.subscribe()
    }

    /// Read-only reactive view of the staff roster.
    pub fn staff_roster(&self) -> watch::Receiver<Vec<Staff>> {
        self.staff.subscribe()
    }

    pub fn customers_snapshot(&self) -> Vec<Customer> {
        self.customers.borrow().clone()
    }

    pub fn staff_snapshot(&self) -> Vec<Staff> {
        self.staff.borrow().clone()
    }

    pub fn customer(&self, id: Uuid) -> Option<Customer> {
        self.customers.borrow().iter().find(|c| c.id == id).cloned()
    }

    pub fn staff_member(&self, id: Uuid) -> Option<Staff> {
        self.staff.borrow().iter().find(|s| s.id == id).cloned()
    }

    /// Inserts or replaces a customer by identity.
    ///
    /// New entries are placed by `(arrived_at, id)` so the waiting list
    /// stays sorted; existing entries are replaced in place. Re-applying
    /// the same customer is a no-op in effect.
    pub(crate) fn upsert_customer(&self, customer: Customer) {
        self.customers.send_modify(|list| {
            if let Some(existing) = list.iter_mut().find(|c| c.id == customer.id) {
                *existing = customer;
            } else {
                let key = (customer.arrived_at, customer.id);
                let pos = list.partition_point(|c| (c.arrived_at, c.id) < key);
                list.insert(pos, customer);
            }
        });
    }

    /// Removes a customer by identity. Absent ids are a no-op.
    pub(crate) fn remove_customer(&self, id: Uuid) {
        self.customers.send_modify(|list| list.retain(|c| c.id != id));
    }

    /// Replaces the whole waiting list (bootstrap and re-snapshot).
    pub(crate) fn replace_customers(&self, customers: Vec<Customer>) {
        self.customers.send_modify(|list| *list = customers);
    }

    pub(crate) fn upsert_staff(&self, staff: Staff) {
        self.staff.send_modify(|list| {
            if let Some(existing) = list.iter_mut().find(|s| s.id == staff.id) {
                *existing = staff;
            } else {
                list.push(staff);
            }
        });
    }

    pub(crate) fn remove_staff(&self, id: Uuid) {
        self.staff.send_modify(|list| list.retain(|s| s.id != id));
    }

    pub(crate) fn replace_staff(&self, staff: Vec<Staff>) {
        self.staff.send_modify(|list| *list = staff);
    }
}

impl Default for RosterMirror {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomerType;
    use chrono::{TimeZone, Utc};

    fn customer(name: &str, hour: u32) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            name: name.to_string(),
            contact: "555".to_string(),
            notes: String::new(),
            customer_type: CustomerType::Consumer,
            category: "general".to_string(),
            arrived_at: Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap(),
            assigned_staff: None,
            served_since: None,
            appearance: None,
        }
    }

    fn staff(name: &str) -> Staff {
        Staff {
            id: Uuid::new_v4(),
            name: name.to_string(),
            ready_since: Utc::now(),
            serving_customer: None,
            serving_since: None,
            on_lunch: false,
            lunch_started: None,
        }
    }

    #[test]
    fn test_upsert_keeps_waiting_list_sorted_by_arrival() {
        let mirror = RosterMirror::new();
        mirror.upsert_customer(customer("Noon", 12));
        mirror.upsert_customer(customer("Morning", 9));
        mirror.upsert_customer(customer("Evening", 17));

        let names: Vec<String> = mirror
            .customers_snapshot()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Morning", "Noon", "Evening"]);
    }

    #[test]
    fn test_upsert_replaces_existing_in_place() {
        let mirror = RosterMirror::new();
        let mut bo = customer("Bo", 10);
        mirror.upsert_customer(bo.clone());
        mirror.upsert_customer(customer("Cy", 11));

        bo.notes = "size 42".to_string();
        mirror.upsert_customer(bo.clone());

        let list = mirror.customers_snapshot();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, bo.id);
        assert_eq!(list[0].notes, "size 42");
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mirror = RosterMirror::new();
        let bo = customer("Bo", 10);
        mirror.upsert_customer(bo.clone());
        let once = mirror.customers_snapshot();

        mirror.upsert_customer(bo);
        assert_eq!(mirror.customers_snapshot(), once);
    }

    #[test]
    fn test_remove_absent_customer_is_noop() {
        let mirror = RosterMirror::new();
        mirror.upsert_customer(customer("Bo", 10));
        mirror.remove_customer(Uuid::new_v4());
        assert_eq!(mirror.customers_snapshot().len(), 1);
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mirror = RosterMirror::new();
        mirror.upsert_customer(customer("Old", 8));

        mirror.replace_customers(vec![customer("New A", 9), customer("New B", 10)]);

        let names: Vec<String> = mirror
            .customers_snapshot()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["New A", "New B"]);
    }

    #[test]
    fn test_staff_roster_keeps_insertion_order() {
        let mirror = RosterMirror::new();
        mirror.upsert_staff(staff("Ana"));
        mirror.upsert_staff(staff("Ben"));

        let names: Vec<String> = mirror
            .staff_snapshot()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Ana", "Ben"]);
    }

    #[tokio::test]
    async fn test_watchers_are_notified_on_mutation() {
        let mirror = RosterMirror::new();
        let mut rx = mirror.waiting_customers();
        assert!(rx.borrow_and_update().is_empty());

        mirror.upsert_customer(customer("Bo", 10));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 1);
    }

    #[test]
    fn test_point_lookups() {
        let mirror = RosterMirror::new();
        let bo = customer("Bo", 10);
        let ana = staff("Ana");
        mirror.upsert_customer(bo.clone());
        mirror.upsert_staff(ana.clone());

        assert_eq!(mirror.customer(bo.id).unwrap().name, "Bo");
        assert_eq!(mirror.staff_member(ana.id).unwrap().name, "Ana");
        assert!(mirror.customer(Uuid::new_v4()).is_none());
    }
}
