use clap::{Args, Subcommand, ValueEnum};

use super::resolve_customer;
use crate::models::{CustomerType, NewCustomer};
use crate::sync::RosterSyncEngine;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct CustomerCommand {
    #[command(subcommand)]
    pub command: CustomerSubcommand,
}

#[derive(Subcommand)]
pub enum CustomerSubcommand {
    /// Add a customer to the waiting list
    Add {
        /// Customer name
        name: String,

        /// Contact (phone or email)
        #[arg(long)]
        contact: String,

        /// Customer type: VIP, Consumer or Business
        #[arg(long = "type", default_value = "Consumer")]
        customer_type: CustomerType,

        /// What they are shopping for
        #[arg(long)]
        category: String,

        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List the waiting list in arrival order
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Remove a customer from the waiting list
    Remove {
        /// Customer ID (UUID) or name
        identifier: String,
    },

    /// Replace a customer's notes
    Notes {
        /// Customer ID (UUID) or name
        identifier: String,

        /// New notes text
        notes: String,
    },
}

impl CustomerCommand {
    pub async fn run(&self, engine: &RosterSyncEngine) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            CustomerSubcommand::Add {
                name,
                contact,
                customer_type,
                category,
                notes,
            } => {
                if name.trim().is_empty() {
                    return Err("Customer name cannot be empty".into());
                }

                let mut new =
                    NewCustomer::new(name.trim(), contact.as_str(), *customer_type, category.as_str());
                if let Some(notes) = notes {
                    new = new.with_notes(notes.as_str());
                }

                let created = engine.add_customer(new).await?;
                println!("Added customer {} ({})", created.name, created.id);
                Ok(())
            }

            CustomerSubcommand::List { format } => {
                let customers = engine.mirror().customers_snapshot();

                if customers.is_empty() {
                    println!("No customers waiting");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&customers)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "{:<36}  {:<20}  {:<8}  {:<12}  STATUS",
                            "ID", "NAME", "TYPE", "CATEGORY"
                        );
                        println!("{}", "-".repeat(90));
                        for customer in &customers {
                            let status = if customer.is_assigned() {
                                "being served"
                            } else {
                                "waiting"
                            };
                            println!(
                                "{:<36}  {:<20}  {:<8}  {:<12}  {}",
                                customer.id,
                                customer.name,
                                customer.customer_type.to_string(),
                                customer.category,
                                status
                            );
                        }
                        println!("\nTotal: {} customer(s)", customers.len());
                    }
                }
                Ok(())
            }

            CustomerSubcommand::Remove { identifier } => {
                let customer = resolve_customer(engine, identifier)?;
                engine.remove_customer(customer.id).await?;
                println!("Removed customer {}", customer.name);
                Ok(())
            }

            CustomerSubcommand::Notes { identifier, notes } => {
                let customer = resolve_customer(engine, identifier)?;
                engine.update_notes(customer.id, notes).await?;
                println!("Updated notes for {}", customer.name);
                Ok(())
            }
        }
    }
}
