mod assign;
mod config_cmd;
mod customer;
mod staff;
mod watch;

pub use assign::AssignCommand;
pub use config_cmd::ConfigCommand;
pub use customer::CustomerCommand;
pub use staff::StaffCommand;
pub use watch::WatchCommand;

use uuid::Uuid;

use crate::models::{Customer, Staff};
use crate::sync::RosterSyncEngine;

/// Resolves a customer by UUID or (case-insensitive) name from the mirror.
fn resolve_customer(
    engine: &RosterSyncEngine,
    identifier: &str,
) -> Result<Customer, Box<dyn std::error::Error>> {
    let customers = engine.mirror().customers_snapshot();
    let found = if let Ok(uuid) = Uuid::parse_str(identifier) {
        customers.into_iter().find(|c| c.id == uuid)
    } else {
        customers
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(identifier))
    };
    found.ok_or_else(|| format!("Customer not found: {}", identifier).into())
}

/// Resolves a staff member by UUID or (case-insensitive) name.
fn resolve_staff(
    engine: &RosterSyncEngine,
    identifier: &str,
) -> Result<Staff, Box<dyn std::error::Error>> {
    let staff = engine.mirror().staff_snapshot();
    let found = if let Ok(uuid) = Uuid::parse_str(identifier) {
        staff.into_iter().find(|s| s.id == uuid)
    } else {
        staff
            .into_iter()
            .find(|s| s.name.eq_ignore_ascii_case(identifier))
    };
    found.ok_or_else(|| format!("Staff member not found: {}", identifier).into())
}
