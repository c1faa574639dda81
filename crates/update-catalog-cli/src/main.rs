//! The `catalog` administration binary.
//!
//! Resource management verbs over the store plus `serve` for the HTTP API
//! and `migrate` for the database schema.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::CommandContext;
use update_catalog_common::{init_tracing, Settings};

#[derive(Parser, Debug)]
#[command(name = "catalog")]
#[command(about = "software-update catalog server")]
#[command(propagate_version = true, version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP catalog API server
    Serve,

    /// Database schema management
    Migrate {
        #[command(subcommand)]
        command: MigrateCommands,
    },

    /// App management
    App {
        #[command(subcommand)]
        command: commands::app::AppCommands,
    },

    /// Variant management
    Variant {
        #[command(subcommand)]
        command: commands::variant::VariantCommands,
    },

    /// Group management
    Group {
        #[command(subcommand)]
        command: commands::group::GroupCommands,
    },

    /// Release management
    Release {
        #[command(subcommand)]
        command: commands::release::ReleaseCommands,
    },

    /// Client management
    Client {
        #[command(subcommand)]
        command: commands::client::ClientCommands,
    },
}

#[derive(Subcommand, Debug)]
enum MigrateCommands {
    /// Apply pending migrations
    Up,
    /// Show applied migrations
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load()?;
    init_tracing(&settings.log_level);

    let cli = Cli::parse();
    let ctx = CommandContext::connect(settings).await?;

    let result = match cli.command {
        Commands::Serve => ctx.serve().await,

        Commands::Migrate { command } => match command {
            MigrateCommands::Up => ctx.migrate_up().await,
            MigrateCommands::Status => ctx.migrate_status().await,
        },

        Commands::App { command } => commands::app::run(&ctx, command).await,
        Commands::Variant { command } => commands::variant::run(&ctx, command).await,
        Commands::Group { command } => commands::group::run(&ctx, command).await,
        Commands::Release { command } => commands::release::run(&ctx, command).await,
        Commands::Client { command } => commands::client::run(&ctx, command).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
