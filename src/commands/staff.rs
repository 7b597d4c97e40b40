use clap::{Args, Subcommand};

use super::customer::OutputFormat;
use super::resolve_staff;
use crate::sync::RosterSyncEngine;

#[derive(Args)]
pub struct StaffCommand {
    #[command(subcommand)]
    pub command: StaffSubcommand,
}

#[derive(Subcommand)]
pub enum StaffSubcommand {
    /// Add a staff member to the roster
    Add {
        /// Staff member name
        name: String,
    },

    /// List the staff roster
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Remove a staff member from the roster
    Remove {
        /// Staff ID (UUID) or name
        identifier: String,
    },

    /// Toggle a staff member's lunch break
    Lunch {
        /// Staff ID (UUID) or name
        identifier: String,
    },
}

impl StaffCommand {
    pub async fn run(&self, engine: &RosterSyncEngine) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            StaffSubcommand::Add { name } => {
                if name.trim().is_empty() {
                    return Err("Staff name cannot be empty".into());
                }

                let created = engine.add_staff(name.trim()).await?;
                println!("Added staff member {} ({})", created.name, created.id);
                Ok(())
            }

            StaffSubcommand::List { format } => {
                let staff = engine.mirror().staff_snapshot();

                if staff.is_empty() {
                    println!("No staff on the roster");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&staff)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<36}  {:<20}  STATUS", "ID", "NAME");
                        println!("{}", "-".repeat(70));
                        for member in &staff {
                            let status = if member.on_lunch {
                                "on lunch".to_string()
                            } else if let Some(customer) = member.serving_customer {
                                format!("serving {}", customer)
                            } else {
                                "ready".to_string()
                            };
                            println!("{:<36}  {:<20}  {}", member.id, member.name, status);
                        }
                        println!("\nTotal: {} staff member(s)", staff.len());
                    }
                }
                Ok(())
            }

            StaffSubcommand::Remove { identifier } => {
                let staff = resolve_staff(engine, identifier)?;
                engine.remove_staff(staff.id).await?;
                println!("Removed staff member {}", staff.name);
                Ok(())
            }

            StaffSubcommand::Lunch { identifier } => {
                let staff = resolve_staff(engine, identifier)?;
                engine.toggle_lunch(staff.id).await?;
                if staff.on_lunch {
                    println!("{} is back from lunch", staff.name);
                } else {
                    println!("{} is on lunch", staff.name);
                }
                Ok(())
            }
        }
    }
}
