//! `catalog release` subcommands.

use super::CommandContext;
use anyhow::Result;
use chrono::Utc;
use clap::{Args, Subcommand};
use update_catalog_application::CatalogStore;
use update_catalog_domain::{
    check_group_names, format_groups, Criticality, Release, ReleaseFilter, UpgradeTarget, Version,
};

/// The shared filter flags of the read and mutation verbs.
#[derive(Args, Debug)]
pub struct FilterArgs {
    #[arg(long)]
    pub vendor: String,

    #[arg(long)]
    pub product: String,

    /// Minimal version in semantic versioning scheme
    #[arg(long)]
    pub min_version: Option<String>,

    /// Minimal excluded version in semantic versioning scheme
    #[arg(long)]
    pub after_version: Option<String>,

    /// Maximum excluded version in semantic versioning scheme
    #[arg(long)]
    pub before_version: Option<String>,

    /// Maximum version in semantic versioning scheme
    #[arg(long)]
    pub max_version: Option<String>,

    /// Variant (Pro, Free, ...)
    #[arg(long, default_value = "")]
    pub variant: String,

    /// Operating system (darwin, linux, ...)
    #[arg(long, default_value = "")]
    pub os: String,

    /// Architecture (amd64, aarch64, ...)
    #[arg(long, default_value = "")]
    pub arch: String,

    /// Alias name for the release
    #[arg(long, default_value = "")]
    pub alias: String,

    /// Include unstable releases
    #[arg(long)]
    pub with_unstable: bool,

    /// Group(s). Use a single "public" group to specify the public group.
    #[arg(long = "group")]
    pub groups: Vec<String>,
}

impl FilterArgs {
    fn into_filter(self) -> Result<ReleaseFilter> {
        if !self.groups.is_empty() {
            check_group_names(&self.groups)?;
        }

        let parse = |value: Option<String>| -> Result<Option<Version>> {
            match value {
                Some(v) => Ok(Some(Version::parse(&v)?)),
                None => Ok(None),
            }
        };

        Ok(ReleaseFilter {
            vendor: self.vendor,
            product: self.product,
            variant: self.variant,
            os: self.os,
            arch: self.arch,
            alias: self.alias,
            min_version: parse(self.min_version)?,
            after_version: parse(self.after_version)?,
            before_version: parse(self.before_version)?,
            max_version: parse(self.max_version)?,
            with_unstable: self.with_unstable,
            groups: self.groups,
            ..Default::default()
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum ReleaseCommands {
    /// List recently published releases
    Latest {
        /// Optional: limit result set
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// List specific releases
    List {
        #[command(flatten)]
        filter: FilterArgs,

        /// Optional: limit result set
        #[arg(long, default_value = "0")]
        limit: usize,
    },

    /// Show release details
    Show {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Publish a new release
    Publish {
        #[arg(long)]
        vendor: String,

        #[arg(long)]
        product: String,

        /// Version in semantic versioning scheme
        #[arg(long)]
        version: String,

        /// Optional: variant (Pro, Free, ...)
        #[arg(long, default_value = "")]
        variant: String,

        /// Optional: operating system
        #[arg(long, default_value = "")]
        os: String,

        /// Optional: architecture
        #[arg(long, default_value = "")]
        arch: String,

        /// Optional: notes
        #[arg(long, default_value = "")]
        description: String,

        /// Optional: alias name for the release
        #[arg(long, default_value = "")]
        alias: String,

        /// Optional: download link
        #[arg(long, default_value = "")]
        link: String,

        /// Optional: package format
        #[arg(long, default_value = "")]
        format: String,

        /// Optional: signature of the artifact
        #[arg(long, default_value = "")]
        signature: String,

        /// Optional: upgrade target for the release
        #[arg(long, default_value = "")]
        upgrade_target: String,

        /// Mark release as unstable
        #[arg(long)]
        unstable: bool,

        /// Optional: tag(s)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Optional: group(s). Use a single "public" group to specify the
        /// public group.
        #[arg(long = "group")]
        groups: Vec<String>,
    },

    /// Set the upgrade target
    SetUpgradeTarget {
        #[command(flatten)]
        filter: FilterArgs,

        /// The desired upgrade target
        #[arg(long)]
        upgrade_target: String,
    },

    /// Set the authored criticality
    SetCriticality {
        #[command(flatten)]
        filter: FilterArgs,

        /// One of: None, Possible, Recommended, "Strongly Recommended",
        /// Critical, Enforced, Exceptional
        #[arg(long)]
        criticality: String,
    },

    /// Mark releases stable or unstable
    SetStability {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long)]
        unstable: bool,
    },

    /// Bind releases to a new set of groups or make them public
    SetGroups {
        #[command(flatten)]
        filter: FilterArgs,

        /// Group(s). Use a single "public" group to make releases public.
        #[arg(long = "set-group", required = true)]
        set_groups: Vec<String>,
    },
}

pub async fn run(ctx: &CommandContext, command: ReleaseCommands) -> Result<()> {
    match command {
        ReleaseCommands::Latest { limit } => {
            for release in ctx.store.latest_releases(limit).await? {
                println!("{release}");
            }
            Ok(())
        }

        ReleaseCommands::List { filter, limit } => {
            let filter = filter.into_filter()?;
            for release in ctx.store.fetch_releases(&filter, limit).await? {
                println!("{release}");
            }
            Ok(())
        }

        ReleaseCommands::Show { filter } => {
            let filter = filter.into_filter()?;
            let releases = ctx.store.fetch_releases(&filter, 0).await?;

            if releases.is_empty() {
                println!("No release found.");
                return Ok(());
            }

            if releases.len() > 1 {
                println!("Filter is ambiguous. Please set more specific filters.\n");
                println!("Candidates:");
                for release in &releases {
                    println!("{release}");
                }
                return Ok(());
            }

            print_release_details(&releases[0]);
            Ok(())
        }

        ReleaseCommands::Publish {
            vendor,
            product,
            version,
            variant,
            os,
            arch,
            description,
            alias,
            link,
            format,
            signature,
            upgrade_target,
            unstable,
            tags,
            groups,
        } => {
            if !groups.is_empty() {
                check_group_names(&groups)?;
            }

            let target = UpgradeTarget::new(upgrade_target);
            target.validate()?;

            let app = match ctx.store.find_app(&vendor, &product).await {
                Ok(app) => app,
                Err(_) => {
                    println!("App \"{vendor} {product}\" not found. Please create the app first.");
                    return Ok(());
                }
            };

            // Releases without an explicit group list inherit the app's
            // default groups.
            let groups = if groups.is_empty() {
                app.default_groups.clone()
            } else {
                groups
            };

            let release = Release {
                variant,
                description,
                os,
                arch,
                date: Utc::now(),
                unstable,
                alias,
                link,
                format,
                signature,
                tags,
                upgrade_target: target,
                groups,
                ..Release::new(vendor, product, Version::parse(&version)?)
            };

            let stored = ctx.store.store_release(&release, false).await?;

            if stored.date.timestamp() < release.date.timestamp() {
                println!("Release has already been there.");
            } else {
                println!("Release has been published: {stored}");
            }

            Ok(())
        }

        ReleaseCommands::SetUpgradeTarget {
            filter,
            upgrade_target,
        } => {
            let target = UpgradeTarget::new(upgrade_target);
            target.validate()?;

            let filter = filter.into_filter()?;
            let updated = ctx.store.set_upgrade_target(&filter, &target).await?;

            println!("Upgrade target set to \"{target}\" on {} release(s).", updated.len());
            Ok(())
        }

        ReleaseCommands::SetCriticality {
            filter,
            criticality,
        } => {
            let criticality: Criticality = criticality.parse()?;

            let filter = filter.into_filter()?;
            let updated = ctx.store.set_criticality(&filter, criticality).await?;

            println!("Criticality set to {criticality} on {} release(s).", updated.len());
            Ok(())
        }

        ReleaseCommands::SetStability { filter, unstable } => {
            let filter = filter.into_filter()?;
            let updated = ctx.store.set_stability(&filter, unstable).await?;

            println!(
                "Marked {} release(s) as {}.",
                updated.len(),
                if unstable { "unstable" } else { "stable" }
            );
            Ok(())
        }

        ReleaseCommands::SetGroups { filter, set_groups } => {
            check_group_names(&set_groups)?;

            let filter = filter.into_filter()?;
            let releases = ctx.store.fetch_releases(&filter, 0).await?;

            let mut count = 0;
            for mut release in releases {
                release.groups = set_groups.clone();
                ctx.store.store_release(&release, true).await?;
                count += 1;
            }

            println!("Groups set to {} on {count} release(s).", format_groups(&set_groups));
            Ok(())
        }
    }
}

fn print_release_details(release: &Release) {
    println!("Vendor: {}", release.vendor);
    println!("Product: {}", release.product);
    println!("Variant: {}", release.variant);
    println!("Version: {}", release.version);
    println!("Alias: {}", release.alias);
    println!("OS: {}", release.os);
    println!("Arch: {}", release.arch);
    println!("Published: {}", release.date.to_rfc2822());
    println!("Unstable: {}", release.unstable);
    println!("Groups: {}", format_groups(&release.groups));
    println!("Upgrade target: {}", release.upgrade_target);
    println!("Criticality: {}", release.should_upgrade);
    println!("Format: {}", release.format);
    println!("Link: {}", release.link);
}
