//! `catalog app` subcommands.

use super::CommandContext;
use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use update_catalog_application::CatalogStore;
use update_catalog_domain::{check_group_names, format_groups, App, UpgradeTarget};

#[derive(Subcommand, Debug)]
pub enum AppCommands {
    /// Create a new app
    Create {
        /// Vendor name
        #[arg(long)]
        vendor: String,

        /// Product name
        #[arg(long)]
        product: String,

        /// Product name (for printing)
        #[arg(long, default_value = "")]
        name: String,

        /// Do not deliver this app at all
        #[arg(long)]
        inactive: bool,

        /// Withhold upgrade answers
        #[arg(long)]
        locked: bool,

        /// Allow clients to register themselves
        #[arg(long)]
        allow_register: bool,

        /// Optional: upgrade target for the app
        #[arg(long, default_value = "")]
        upgrade_target: String,
    },

    /// List apps
    List {
        /// Optional: limit result set
        #[arg(long, default_value = "0")]
        limit: usize,
    },

    /// Show app details
    Show {
        #[arg(long)]
        vendor: String,

        #[arg(long)]
        product: String,
    },

    /// Set the default groups for an app
    SetDefaultGroups {
        #[arg(long)]
        vendor: String,

        #[arg(long)]
        product: String,

        /// Default group(s). Specify a single "public" group to unlink
        /// special groups.
        #[arg(long = "default-group", required = true)]
        default_groups: Vec<String>,
    },
}

pub async fn run(ctx: &CommandContext, command: AppCommands) -> Result<()> {
    match command {
        AppCommands::Create {
            vendor,
            product,
            name,
            inactive,
            locked,
            allow_register,
            upgrade_target,
        } => {
            let target = UpgradeTarget::new(upgrade_target);
            target.validate()?;

            let now = Utc::now();
            let app = App {
                vendor,
                product,
                name,
                active: !inactive,
                locked,
                allow_register,
                upgrade_target: target,
                default_groups: Vec::new(),
                created: now,
                updated: now,
            };

            let stored = ctx.store.store_app(&app, false).await?;

            // The database might drop fractional seconds, so compare whole
            // seconds only.
            if stored.created.timestamp() < app.created.timestamp() {
                println!("App has already been there.");
            } else {
                println!("App has been created: {stored}");
            }

            Ok(())
        }

        AppCommands::List { limit } => {
            for app in ctx.store.list_apps(limit).await? {
                print_app(&app);
            }
            Ok(())
        }

        AppCommands::Show { vendor, product } => {
            let app = ctx.store.find_app(&vendor, &product).await?;

            println!("Vendor: {}", app.vendor);
            println!("Product: {}", app.product);
            println!("Name: {}", app.name);
            println!("Active: {}", app.active);
            println!("Locked: {}", app.locked);
            println!("Allow register: {}", app.allow_register);
            println!("Upgrade target: {}", app.upgrade_target);
            println!("Default groups: {}", format_groups(&app.default_groups));
            println!("Created: {}", app.created.to_rfc2822());

            Ok(())
        }

        AppCommands::SetDefaultGroups {
            vendor,
            product,
            default_groups,
        } => {
            check_group_names(&default_groups)?;

            let mut app = ctx.store.find_app(&vendor, &product).await?;
            app.default_groups = default_groups;

            let stored = ctx.store.set_app_default_groups(&app).await?;
            print_app(&stored);

            Ok(())
        }
    }
}

fn print_app(app: &App) {
    println!("{}, default groups: {}", app, format_groups(&app.default_groups));
}
