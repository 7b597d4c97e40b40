use clap::Args;

use super::{resolve_customer, resolve_staff};
use crate::sync::RosterSyncEngine;

/// Assign a staff member to a waiting customer
#[derive(Args)]
pub struct AssignCommand {
    /// Customer ID (UUID) or name
    customer: String,

    /// Staff ID (UUID) or name
    staff: String,
}

impl AssignCommand {
    pub async fn run(&self, engine: &RosterSyncEngine) -> Result<(), Box<dyn std::error::Error>> {
        let customer = resolve_customer(engine, &self.customer)?;
        let staff = resolve_staff(engine, &self.staff)?;

        if staff.on_lunch {
            return Err(format!("{} is on lunch", staff.name).into());
        }

        engine.assign_staff_to_customer(customer.id, staff.id).await?;
        println!("{} is now serving {}", staff.name, customer.name);
        Ok(())
    }
}
