//! `catalog group` subcommands.

use super::CommandContext;
use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use update_catalog_application::CatalogStore;
use update_catalog_domain::{Group, GroupFilter};

#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// Create a new group
    Create {
        #[arg(long)]
        vendor: String,

        #[arg(long)]
        product: String,

        /// Group name
        #[arg(long)]
        name: String,

        /// Mark as a default group for new releases
        #[arg(long)]
        default: bool,
    },

    /// List groups
    List {
        #[arg(long)]
        vendor: String,

        #[arg(long)]
        product: String,

        /// Optional: narrow to one group name
        #[arg(long, default_value = "")]
        name: String,

        /// Optional: limit result set
        #[arg(long, default_value = "0")]
        limit: usize,
    },
}

pub async fn run(ctx: &CommandContext, command: GroupCommands) -> Result<()> {
    match command {
        GroupCommands::Create {
            vendor,
            product,
            name,
            default,
        } => {
            let now = Utc::now();
            let group = Group {
                vendor,
                product,
                name,
                is_default: default,
                created: now,
                updated: now,
            };

            let stored = ctx.store.store_group(&group, false).await?;

            if stored.created.timestamp() < group.created.timestamp() {
                println!("Group has already been there.");
            } else {
                println!("Group \"{}\" has been created.", stored.name);
            }

            Ok(())
        }

        GroupCommands::List {
            vendor,
            product,
            name,
            limit,
        } => {
            let filter = GroupFilter {
                vendor,
                product,
                name,
            };

            for group in ctx.store.list_groups(&filter, limit).await? {
                println!("{}", group.name);
            }

            Ok(())
        }
    }
}
