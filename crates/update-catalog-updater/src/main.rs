//! The `updater` client binary.
//!
//! Talks to a catalog server, keeps its identity and install state in a
//! flat state file, and reports whether (and how urgently) the managed
//! installation should move.

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use update_catalog_common::{init_tracing, Settings};
use update_catalog_updater::api::{CatalogClient, ClientStateRequest, RegisterRequest};
use update_catalog_updater::state::State;

#[derive(Parser, Debug)]
#[command(name = "updater")]
#[command(about = "update checker for catalog-managed installations")]
struct Cli {
    /// Path of the state file
    #[arg(long, global = true, default_value = "updater.state")]
    state_file: String,

    /// Catalog server base URL (overrides CATALOG_URL)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register this installation with the catalog
    Register {
        #[arg(long)]
        vendor: String,

        #[arg(long)]
        product: String,

        #[arg(long, default_value = "")]
        variant: String,

        /// Operating system of this installation
        #[arg(long, default_value = "")]
        os: String,

        /// Architecture of this installation
        #[arg(long, default_value = "")]
        arch: String,

        /// Currently installed version, if any
        #[arg(long, default_value = "")]
        version: String,

        /// Offer unstable releases too
        #[arg(long)]
        with_unstable: bool,
    },

    /// Ask the catalog for the next upgrade step
    Check,

    /// Print the persisted state
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().unwrap_or_default();
    init_tracing(&settings.log_level);

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Register {
            vendor,
            product,
            variant,
            os,
            arch,
            version,
            with_unstable,
        } => {
            let server = resolve_server(&cli.server, &settings)?;
            register(
                &cli.state_file,
                &server,
                RegisterRequest {
                    vendor,
                    product,
                    variant,
                },
                os,
                arch,
                version,
                with_unstable,
            )
            .await
        }
        Commands::Check => check(&cli.state_file, &cli.server, &settings).await,
        Commands::Status => status(&cli.state_file),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn resolve_server(flag: &Option<String>, settings: &Settings) -> Result<String> {
    if let Some(server) = flag {
        return Ok(server.clone());
    }

    Ok(settings.require_catalog_url()?.to_string())
}

async fn register(
    state_file: &str,
    server: &str,
    request: RegisterRequest,
    os: String,
    arch: String,
    version: String,
    with_unstable: bool,
) -> Result<()> {
    let client = CatalogClient::new(server);
    let response = client.register(&request).await?;

    let state = State {
        server: server.to_string(),
        client_id: response.client_id.clone(),
        vendor: response.vendor,
        product: response.product,
        variant: response.variant,
        os,
        arch,
        with_unstable,
        version,
        last_checked: None,
    };

    state.save_to_file(state_file)?;

    println!("Registered as client {}", response.client_id);

    Ok(())
}

async fn check(state_file: &str, server_flag: &Option<String>, settings: &Settings) -> Result<()> {
    let mut state = State::read_from_file(state_file)?;

    if let Some(server) = server_flag {
        state.server = server.clone();
    } else if state.server.is_empty() {
        state.server = settings.require_catalog_url()?.to_string();
    }

    if !state.is_valid() {
        bail!("state is not valid, please register first");
    }

    let client = CatalogClient::new(&state.server);
    let step = client
        .upgrade_step(&ClientStateRequest::from_state(&state))
        .await?;

    match step {
        Some(step) => {
            println!(
                "Upgrade to {} ({})",
                step.release.version, step.criticality
            );
            if !step.release.link.is_empty() {
                println!("Download: {}", step.release.link);
            }
            if !step.release.description.is_empty() {
                println!("{}", step.release.description);
            }
        }
        None => {
            if state.is_installed() {
                println!("{} {} is up to date.", state.vendor, state.product);
            } else {
                println!("Nothing available to install yet.");
            }
        }
    }

    state.last_checked = Some(Utc::now());
    state.save_to_file(state_file)?;

    Ok(())
}

fn status(state_file: &str) -> Result<()> {
    let state = State::read_from_file(state_file)?;

    println!("Server: {}", state.server);
    println!("Client: {}", state.client_id);
    println!("App: {} {}", state.vendor, state.product);
    println!("Variant: {}", state.variant);
    println!("OS/Arch: {}/{}", state.os, state.arch);
    println!("With unstable: {}", state.with_unstable);
    println!("Version: {}", state.version);
    match state.last_checked {
        Some(t) => println!("Last checked: {}", t.to_rfc3339()),
        None => println!("Last checked: never"),
    }

    Ok(())
}
