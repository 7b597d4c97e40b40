use clap::{Args, Subcommand};

use super::customer::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the default config file path
    Path,
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        let path = Config::default_config_path();
                        if path.exists() {
                            println!("Config file: {}", path.display());
                        } else {
                            println!("Config file: {} (not found)", path.display());
                        }
                        println!();

                        println!("database_path: {}", config.database_path.display());
                        println!(
                            "sync.command_timeout_secs: {}",
                            config.sync.command_timeout_secs
                        );
                        println!("sync.lunch_tracking: {}", config.sync.lunch_tracking);
                        println!(
                            "sync.clear_assignments_before_delete: {}",
                            config.sync.clear_assignments_before_delete
                        );
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Path => {
                println!("{}", Config::default_config_path().display());
                Ok(())
            }
        }
    }
}
