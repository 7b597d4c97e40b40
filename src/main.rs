use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use floorsync::commands::{
    AssignCommand, ConfigCommand, CustomerCommand, StaffCommand, WatchCommand,
};
use floorsync::config::Config;
use floorsync::db::init_db;
use floorsync::store::RosterStore;
use floorsync::sync::RosterSyncEngine;

#[derive(Parser)]
#[command(name = "floorsync")]
#[command(version)]
#[command(about = "Front-of-house queue manager with realtime roster sync", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the customer waiting list
    Customer(CustomerCommand),

    /// Manage the staff roster
    Staff(StaffCommand),

    /// Assign a staff member to a customer
    Assign(AssignCommand),

    /// Follow roster changes live
    Watch(WatchCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        Some(command) => {
            let pool = init_db(Some(config.database_path.clone())).await?;
            let store = Arc::new(RosterStore::new(pool));
            let engine = RosterSyncEngine::new(store, config.sync.options());
            engine.init().await?;

            let result = match command {
                Commands::Customer(cmd) => cmd.run(&engine).await,
                Commands::Staff(cmd) => cmd.run(&engine).await,
                Commands::Assign(cmd) => cmd.run(&engine).await,
                Commands::Watch(cmd) => cmd.run(&engine).await,
                Commands::Config(_) => unreachable!(),
            };

            engine.shutdown();
            result?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
