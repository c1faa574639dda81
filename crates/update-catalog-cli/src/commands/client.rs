//! `catalog client` subcommands.

use super::CommandContext;
use anyhow::Result;
use clap::Subcommand;
use update_catalog_application::CatalogStore;
use update_catalog_domain::check_group_names;

#[derive(Subcommand, Debug)]
pub enum ClientCommands {
    /// Register an app client
    Register {
        #[arg(long)]
        vendor: String,

        #[arg(long)]
        product: String,

        /// The variant of the product
        #[arg(long, default_value = "")]
        variant: String,

        /// Client group(s). Use none to put the client into the public
        /// group.
        #[arg(long = "group")]
        groups: Vec<String>,
    },
}

pub async fn run(ctx: &CommandContext, command: ClientCommands) -> Result<()> {
    match command {
        ClientCommands::Register {
            vendor,
            product,
            variant,
            groups,
        } => {
            if !groups.is_empty() {
                check_group_names(&groups)?;
            }

            // The admin surface registers directly through the store and
            // is not subject to the allow-register gate.
            let app = ctx.store.find_app(&vendor, &product).await?;
            let client = ctx.store.register_client(&app, &variant, &groups).await?;

            println!("Client registered: {}", client.uuid);

            Ok(())
        }
    }
}
