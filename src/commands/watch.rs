use clap::Args;

use crate::models::{Customer, Staff};
use crate::sync::RosterSyncEngine;

/// Follow roster changes live until interrupted
#[derive(Args)]
pub struct WatchCommand {}

impl WatchCommand {
    pub async fn run(&self, engine: &RosterSyncEngine) -> Result<(), Box<dyn std::error::Error>> {
        let mut customers = engine.waiting_customers();
        let mut staff = engine.staff_roster();

        print_customers(&customers.borrow_and_update());
        print_staff(&staff.borrow_and_update());
        println!("Watching for changes (Ctrl-C to stop)...");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                changed = customers.changed() => {
                    changed?;
                    print_customers(&customers.borrow_and_update());
                }
                changed = staff.changed() => {
                    changed?;
                    print_staff(&staff.borrow_and_update());
                }
            }
        }

        Ok(())
    }
}

fn print_customers(customers: &[Customer]) {
    let waiting = customers.iter().filter(|c| !c.is_assigned()).count();
    println!(
        "[customers] {} waiting, {} being served",
        waiting,
        customers.len() - waiting
    );
    for customer in customers {
        let status = match customer.assigned_staff {
            Some(staff) => format!("served by {}", staff),
            None => "waiting".to_string(),
        };
        println!("  {} ({}) - {}", customer.name, customer.customer_type, status);
    }
}

fn print_staff(staff: &[Staff]) {
    println!("[staff] {} on roster", staff.len());
    for member in staff {
        let status = if member.on_lunch {
            "on lunch".to_string()
        } else if let Some(customer) = member.serving_customer {
            format!("serving {}", customer)
        } else {
            "ready".to_string()
        };
        println!("  {} - {}", member.name, status);
    }
}
