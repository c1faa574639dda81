//! `catalog variant` subcommands.

use super::CommandContext;
use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use update_catalog_application::CatalogStore;
use update_catalog_domain::{
    check_group_names, format_groups, UpgradeTarget, Variant, VariantFilter,
};

#[derive(Subcommand, Debug)]
pub enum VariantCommands {
    /// Create a new variant
    Create {
        #[arg(long)]
        vendor: String,

        #[arg(long)]
        product: String,

        /// Variant name (Pro, Free, ...)
        #[arg(long)]
        name: String,

        #[arg(long)]
        inactive: bool,

        #[arg(long)]
        locked: bool,

        /// Allow clients to register themselves for this variant
        #[arg(long)]
        allow_register: bool,

        /// Optional: upgrade target overriding the app's
        #[arg(long, default_value = "")]
        upgrade_target: String,

        /// Default group(s) overriding the app's
        #[arg(long = "default-group")]
        default_groups: Vec<String>,
    },

    /// List variants
    List {
        #[arg(long)]
        vendor: String,

        #[arg(long)]
        product: String,

        /// Optional: limit result set
        #[arg(long, default_value = "0")]
        limit: usize,
    },
}

pub async fn run(ctx: &CommandContext, command: VariantCommands) -> Result<()> {
    match command {
        VariantCommands::Create {
            vendor,
            product,
            name,
            inactive,
            locked,
            allow_register,
            upgrade_target,
            default_groups,
        } => {
            let target = UpgradeTarget::new(upgrade_target);
            target.validate()?;

            if !default_groups.is_empty() {
                check_group_names(&default_groups)?;
            }

            let now = Utc::now();
            let variant = Variant {
                vendor,
                product,
                name,
                active: !inactive,
                locked,
                allow_register,
                upgrade_target: target,
                default_groups,
                created: now,
                updated: now,
            };

            let stored = ctx.store.store_variant(&variant, false).await?;

            if stored.created.timestamp() < variant.created.timestamp() {
                println!("Variant has already been there.");
            } else {
                println!("Variant has been created: {stored}");
            }

            Ok(())
        }

        VariantCommands::List {
            vendor,
            product,
            limit,
        } => {
            let filter = VariantFilter {
                vendor,
                product,
                name: String::new(),
            };

            for variant in ctx.store.list_variants(&filter, limit).await? {
                println!(
                    "{}, default groups: {}",
                    variant,
                    format_groups(&variant.default_groups)
                );
            }

            Ok(())
        }
    }
}
