//! PostgreSQL implementation of the store contract.
//!
//! The SQL layer narrows by the columns it can express (app, variant, OS,
//! arch, alias, stability); version bounds and group visibility are applied
//! on the fetched rows via the domain filter, which also owns the
//! ascending version order of every result set.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};
use update_catalog_application::CatalogStore;
use update_catalog_domain::{
    App, CatalogError, CatalogResult, Client, Criticality, Group, GroupFilter, Release,
    ReleaseFilter, UpgradeTarget, Variant, VariantFilter, Version, PUBLIC_GROUP,
};
use uuid::Uuid;

use crate::database::DatabasePool;

/// The production store over a shared [`DatabasePool`].
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: &DatabasePool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }

    async fn app_id(&self, vendor: &str, product: &str) -> CatalogResult<i64> {
        sqlx::query_scalar("SELECT id FROM apps WHERE vendor = $1 AND product = $2")
            .bind(vendor)
            .bind(product)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?
            .ok_or_else(|| CatalogError::UnknownApp {
                vendor: vendor.to_string(),
                product: product.to_string(),
            })
    }

    /// Resolve group names to their ids, failing on the first unknown name.
    async fn group_ids(&self, app_id: i64, names: &[String]) -> CatalogResult<Vec<i64>> {
        let names: Vec<String> = names
            .iter()
            .filter(|n| n.as_str() != PUBLIC_GROUP)
            .cloned()
            .collect();
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query("SELECT id, name FROM groups WHERE app_id = $1 AND name = ANY($2)")
            .bind(app_id)
            .bind(&names)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        let found: Vec<(i64, String)> = rows
            .iter()
            .map(|row| (row.get("id"), row.get("name")))
            .collect();

        for name in &names {
            if !found.iter().any(|(_, n)| n == name) {
                return Err(CatalogError::UnknownGroup(name.clone()));
            }
        }

        Ok(found.into_iter().map(|(id, _)| id).collect())
    }

    /// Fetch matching release rows with their row ids, already post-filtered
    /// by version bounds and group visibility, ascending by version.
    async fn select_releases(
        &self,
        filter: &ReleaseFilter,
    ) -> CatalogResult<Vec<(i64, Release)>> {
        let mut conditions = vec!["a.vendor = $1".to_string(), "a.product = $2".to_string()];
        let mut next_param = 3;

        let filter_variant = filter.enforce_variant || !filter.variant.is_empty();
        if filter_variant {
            conditions.push(format!("r.variant = ${next_param}"));
            next_param += 1;
        }
        if !filter.os.is_empty() {
            conditions.push(format!("r.os = ${next_param}"));
            next_param += 1;
        }
        if !filter.arch.is_empty() {
            conditions.push(format!("r.arch = ${next_param}"));
            next_param += 1;
        }
        if !filter.alias.is_empty() {
            conditions.push(format!("r.alias = ${next_param}"));
        }
        if !filter.with_unstable {
            conditions.push("r.unstable = FALSE".to_string());
        }

        let sql = format!(
            r#"
            SELECT
                r.id, a.vendor, a.product, a.name AS app_name,
                r.variant, r.description, r.os, r.arch, r.released_at, r.version,
                r.unstable, r.alias, r.link, r.format, r.signature, r.tags,
                r.upgrade_target, r.should_upgrade,
                COALESCE(
                    (SELECT array_agg(g.name ORDER BY g.name)
                     FROM releases_groups rg
                     JOIN groups g ON g.id = rg.group_id
                     WHERE rg.release_id = r.id),
                    ARRAY[]::TEXT[]
                ) AS groups
            FROM releases r
            JOIN apps a ON a.id = r.app_id
            WHERE {}
            "#,
            conditions.join(" AND ")
        );

        let mut query = sqlx::query(&sql).bind(&filter.vendor).bind(&filter.product);
        if filter_variant {
            query = query.bind(&filter.variant);
        }
        if !filter.os.is_empty() {
            query = query.bind(&filter.os);
        }
        if !filter.arch.is_empty() {
            query = query.bind(&filter.arch);
        }
        if !filter.alias.is_empty() {
            query = query.bind(&filter.alias);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(store_err)?;

        let mut releases = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("id");
            let release = row_to_release(&row)?;

            if filter.filters_versions() && !filter.match_version(&release.version) {
                continue;
            }
            if !filter.matches_groups(&release.groups) {
                continue;
            }

            releases.push((id, release));
        }

        releases.sort_by(|(_, a), (_, b)| a.version.cmp(&b.version));

        Ok(releases)
    }

    async fn release_by_id(&self, id: i64) -> CatalogResult<Release> {
        let row = sqlx::query(
            r#"
            SELECT
                r.id, a.vendor, a.product, a.name AS app_name,
                r.variant, r.description, r.os, r.arch, r.released_at, r.version,
                r.unstable, r.alias, r.link, r.format, r.signature, r.tags,
                r.upgrade_target, r.should_upgrade,
                COALESCE(
                    (SELECT array_agg(g.name ORDER BY g.name)
                     FROM releases_groups rg
                     JOIN groups g ON g.id = rg.group_id
                     WHERE rg.release_id = r.id),
                    ARRAY[]::TEXT[]
                ) AS groups
            FROM releases r
            JOIN apps a ON a.id = r.app_id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        row_to_release(&row)
    }

    async fn link_release_groups(&self, release_id: i64, group_ids: &[i64]) -> CatalogResult<()> {
        sqlx::query("DELETE FROM releases_groups WHERE release_id = $1")
            .bind(release_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        for group_id in group_ids {
            sqlx::query(
                "INSERT INTO releases_groups (release_id, group_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(release_id)
            .bind(group_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        }

        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    #[instrument(skip(self))]
    async fn find_app(&self, vendor: &str, product: &str) -> CatalogResult<App> {
        let row = sqlx::query(&app_select("a.vendor = $1 AND a.product = $2"))
            .bind(vendor)
            .bind(product)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;

        match row {
            Some(row) => row_to_app(&row),
            None => Err(CatalogError::UnknownApp {
                vendor: vendor.to_string(),
                product: product.to_string(),
            }),
        }
    }

    #[instrument(skip(self))]
    async fn list_apps(&self, limit: usize) -> CatalogResult<Vec<App>> {
        let mut sql = format!("{} ORDER BY a.vendor, a.product", app_select("TRUE"));
        if limit > 0 {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        rows.iter().map(row_to_app).collect()
    }

    #[instrument(skip(self, app), fields(vendor = %app.vendor, product = %app.product))]
    async fn store_app(&self, app: &App, allow_update: bool) -> CatalogResult<App> {
        app.upgrade_target.validate()?;

        let update_clause = if allow_update {
            "DO UPDATE SET name = EXCLUDED.name, active = EXCLUDED.active, \
             locked = EXCLUDED.locked, allow_register = EXCLUDED.allow_register, \
             upgrade_target = EXCLUDED.upgrade_target, updated_at = now()"
        } else {
            "DO NOTHING"
        };

        let sql = format!(
            "INSERT INTO apps (vendor, product, name, active, locked, allow_register, \
             upgrade_target, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now()) \
             ON CONFLICT ON CONSTRAINT apps_ux {update_clause}"
        );

        sqlx::query(&sql)
            .bind(&app.vendor)
            .bind(&app.product)
            .bind(&app.name)
            .bind(app.active)
            .bind(app.locked)
            .bind(app.allow_register)
            .bind(app.upgrade_target.as_str())
            .bind(app.created)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        // The caller compares timestamps to detect a pre-existing record.
        self.find_app(&app.vendor, &app.product).await
    }

    #[instrument(skip(self, app), fields(vendor = %app.vendor, product = %app.product))]
    async fn set_app_default_groups(&self, app: &App) -> CatalogResult<App> {
        let app_id = self.app_id(&app.vendor, &app.product).await?;
        let group_ids = self.group_ids(app_id, &app.default_groups).await?;

        sqlx::query("DELETE FROM apps_default_groups WHERE app_id = $1")
            .bind(app_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        for group_id in &group_ids {
            sqlx::query(
                "INSERT INTO apps_default_groups (app_id, group_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(app_id)
            .bind(group_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        }

        self.find_app(&app.vendor, &app.product).await
    }

    #[instrument(skip(self, filter))]
    async fn list_variants(
        &self,
        filter: &VariantFilter,
        limit: usize,
    ) -> CatalogResult<Vec<Variant>> {
        let app_id = self.app_id(&filter.vendor, &filter.product).await?;

        let mut sql = format!(
            "{} AND v.app_id = $1 {} ORDER BY v.name",
            variant_select("TRUE"),
            if filter.name.is_empty() {
                ""
            } else {
                "AND v.name = $2"
            }
        );
        if limit > 0 {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut query = sqlx::query(&sql).bind(app_id);
        if !filter.name.is_empty() {
            query = query.bind(&filter.name);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(store_err)?;

        rows.iter().map(row_to_variant).collect()
    }

    #[instrument(skip(self, variant), fields(name = %variant.name))]
    async fn store_variant(&self, variant: &Variant, allow_update: bool) -> CatalogResult<Variant> {
        variant.upgrade_target.validate()?;

        let app_id = self.app_id(&variant.vendor, &variant.product).await?;

        // Check default groups before touching the variant.
        let group_ids = self.group_ids(app_id, &variant.default_groups).await?;

        let update_clause = if allow_update {
            "DO UPDATE SET active = EXCLUDED.active, locked = EXCLUDED.locked, \
             allow_register = EXCLUDED.allow_register, \
             upgrade_target = EXCLUDED.upgrade_target, updated_at = now()"
        } else {
            "DO NOTHING"
        };

        let sql = format!(
            "INSERT INTO variants (app_id, name, active, locked, allow_register, \
             upgrade_target, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, now()) \
             ON CONFLICT ON CONSTRAINT variants_ux {update_clause}"
        );

        let inserted = sqlx::query(&sql)
            .bind(app_id)
            .bind(&variant.name)
            .bind(variant.active)
            .bind(variant.locked)
            .bind(variant.allow_register)
            .bind(variant.upgrade_target.as_str())
            .bind(variant.created)
            .execute(&self.pool)
            .await
            .map_err(store_err)?
            .rows_affected()
            > 0;

        let variant_id: i64 =
            sqlx::query_scalar("SELECT id FROM variants WHERE app_id = $1 AND name = $2")
                .bind(app_id)
                .bind(&variant.name)
                .fetch_one(&self.pool)
                .await
                .map_err(store_err)?;

        if (inserted || allow_update) && !group_ids.is_empty() {
            sqlx::query("DELETE FROM variants_default_groups WHERE variant_id = $1")
                .bind(variant_id)
                .execute(&self.pool)
                .await
                .map_err(store_err)?;

            for group_id in &group_ids {
                sqlx::query(
                    "INSERT INTO variants_default_groups (variant_id, group_id) \
                     VALUES ($1, $2) ON CONFLICT DO NOTHING",
                )
                .bind(variant_id)
                .bind(group_id)
                .execute(&self.pool)
                .await
                .map_err(store_err)?;
            }
        }

        let stored = self
            .list_variants(
                &VariantFilter {
                    vendor: variant.vendor.clone(),
                    product: variant.product.clone(),
                    name: variant.name.clone(),
                },
                1,
            )
            .await?;

        stored
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::Store("stored variant vanished".to_string()))
    }

    #[instrument(skip(self, filter))]
    async fn list_groups(&self, filter: &GroupFilter, limit: usize) -> CatalogResult<Vec<Group>> {
        let app_id = self.app_id(&filter.vendor, &filter.product).await?;

        let mut sql = format!(
            "SELECT a.vendor, a.product, g.name, g.is_default, g.created_at, g.updated_at \
             FROM groups g JOIN apps a ON a.id = g.app_id \
             WHERE g.app_id = $1 {} ORDER BY g.name",
            if filter.name.is_empty() {
                ""
            } else {
                "AND g.name = $2"
            }
        );
        if limit > 0 {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut query = sqlx::query(&sql).bind(app_id);
        if !filter.name.is_empty() {
            query = query.bind(&filter.name);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(store_err)?;

        Ok(rows
            .iter()
            .map(|row| Group {
                vendor: row.get("vendor"),
                product: row.get("product"),
                name: row.get("name"),
                is_default: row.get("is_default"),
                created: row.get("created_at"),
                updated: row.get("updated_at"),
            })
            .collect())
    }

    #[instrument(skip(self, group), fields(name = %group.name))]
    async fn store_group(&self, group: &Group, allow_update: bool) -> CatalogResult<Group> {
        let app_id = self.app_id(&group.vendor, &group.product).await?;

        let update_clause = if allow_update {
            "DO UPDATE SET is_default = EXCLUDED.is_default, updated_at = now()"
        } else {
            "DO NOTHING"
        };

        let sql = format!(
            "INSERT INTO groups (app_id, name, is_default, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, now()) \
             ON CONFLICT ON CONSTRAINT groups_ux {update_clause}"
        );

        sqlx::query(&sql)
            .bind(app_id)
            .bind(&group.name)
            .bind(group.is_default)
            .bind(group.created)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        let stored = self
            .list_groups(
                &GroupFilter {
                    vendor: group.vendor.clone(),
                    product: group.product.clone(),
                    name: group.name.clone(),
                },
                1,
            )
            .await?;

        stored
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::Store("stored group vanished".to_string()))
    }

    #[instrument(skip(self, app, groups), fields(vendor = %app.vendor, product = %app.product))]
    async fn register_client(
        &self,
        app: &App,
        variant: &str,
        groups: &[String],
    ) -> CatalogResult<Client> {
        let app_id = self.app_id(&app.vendor, &app.product).await?;
        let group_ids = self.group_ids(app_id, groups).await?;

        let uuid = Uuid::new_v4();

        let client_id: i64 = sqlx::query_scalar(
            "INSERT INTO clients (app_id, variant, uuid, created_at, updated_at) \
             VALUES ($1, $2, $3, now(), now()) RETURNING id",
        )
        .bind(app_id)
        .bind(variant)
        .bind(uuid)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        for group_id in &group_ids {
            sqlx::query(
                "INSERT INTO clients_groups (client_id, group_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(client_id)
            .bind(group_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        }

        debug!(client_id = %uuid, "client registered");

        self.find_client(uuid)
            .await?
            .ok_or_else(|| CatalogError::Store("registered client vanished".to_string()))
    }

    #[instrument(skip(self))]
    async fn find_client(&self, uuid: Uuid) -> CatalogResult<Option<Client>> {
        let row = sqlx::query(
            r#"
            SELECT
                c.uuid, a.vendor, a.product, c.variant, c.name, c.active, c.locked,
                c.created_at, c.updated_at,
                COALESCE(
                    (SELECT array_agg(g.name ORDER BY g.name)
                     FROM clients_groups cg
                     JOIN groups g ON g.id = cg.group_id
                     WHERE cg.client_id = c.id),
                    ARRAY[]::TEXT[]
                ) AS groups
            FROM clients c
            JOIN apps a ON a.id = c.app_id
            WHERE c.uuid = $1
            "#,
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.map(|row| Client {
            uuid: row.get("uuid"),
            vendor: row.get("vendor"),
            product: row.get("product"),
            variant: row.get("variant"),
            name: row.get("name"),
            active: row.get("active"),
            locked: row.get("locked"),
            groups: row.get("groups"),
            created: row.get("created_at"),
            updated: row.get("updated_at"),
        }))
    }

    #[instrument(skip(self, release), fields(version = %release.version))]
    async fn store_release(&self, release: &Release, allow_update: bool) -> CatalogResult<Release> {
        release.upgrade_target.validate()?;

        let app_id = self.app_id(&release.vendor, &release.product).await?;

        // A non-empty variant must exist for the owning app.
        if !release.variant.is_empty() {
            let known: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM variants WHERE app_id = $1 AND name = $2)",
            )
            .bind(app_id)
            .bind(&release.variant)
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;

            if !known {
                return Err(CatalogError::UnknownVariant(release.variant.clone()));
            }
        }

        // Check group bindings before touching the release.
        let group_ids = self.group_ids(app_id, &release.groups).await?;

        let update_clause = if allow_update {
            "DO UPDATE SET description = EXCLUDED.description, \
             unstable = EXCLUDED.unstable, alias = EXCLUDED.alias, \
             link = EXCLUDED.link, format = EXCLUDED.format, \
             signature = EXCLUDED.signature, tags = EXCLUDED.tags, \
             upgrade_target = EXCLUDED.upgrade_target, \
             should_upgrade = EXCLUDED.should_upgrade, updated_at = now()"
        } else {
            "DO NOTHING"
        };

        let sql = format!(
            "INSERT INTO releases (app_id, variant, description, os, arch, released_at, \
             version, unstable, alias, link, format, signature, tags, upgrade_target, \
             should_upgrade, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, now()) \
             ON CONFLICT ON CONSTRAINT releases_ux {update_clause}"
        );

        let inserted = sqlx::query(&sql)
            .bind(app_id)
            .bind(&release.variant)
            .bind(&release.description)
            .bind(&release.os)
            .bind(&release.arch)
            .bind(release.date)
            .bind(release.version.to_string())
            .bind(release.unstable)
            .bind(&release.alias)
            .bind(&release.link)
            .bind(&release.format)
            .bind(&release.signature)
            .bind(&release.tags)
            .bind(release.upgrade_target.as_str())
            .bind(release.should_upgrade.level())
            .execute(&self.pool)
            .await
            .map_err(store_err)?
            .rows_affected()
            > 0;

        let release_id: i64 = sqlx::query_scalar(
            "SELECT id FROM releases WHERE app_id = $1 AND variant = $2 AND os = $3 \
             AND arch = $4 AND version = $5",
        )
        .bind(app_id)
        .bind(&release.variant)
        .bind(&release.os)
        .bind(&release.arch)
        .bind(release.version.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        if inserted || allow_update {
            self.link_release_groups(release_id, &group_ids).await?;
        }

        self.release_by_id(release_id).await
    }

    #[instrument(skip(self, filter))]
    async fn fetch_releases(
        &self,
        filter: &ReleaseFilter,
        limit: usize,
    ) -> CatalogResult<Vec<Release>> {
        let mut releases: Vec<Release> = self
            .select_releases(filter)
            .await?
            .into_iter()
            .map(|(_, release)| release)
            .collect();

        if limit > 0 {
            releases.truncate(limit);
        }

        Ok(releases)
    }

    #[instrument(skip(self))]
    async fn latest_releases(&self, limit: usize) -> CatalogResult<Vec<Release>> {
        let mut sql = String::from(
            r#"
            SELECT
                r.id, a.vendor, a.product, a.name AS app_name,
                r.variant, r.description, r.os, r.arch, r.released_at, r.version,
                r.unstable, r.alias, r.link, r.format, r.signature, r.tags,
                r.upgrade_target, r.should_upgrade,
                COALESCE(
                    (SELECT array_agg(g.name ORDER BY g.name)
                     FROM releases_groups rg
                     JOIN groups g ON g.id = rg.group_id
                     WHERE rg.release_id = r.id),
                    ARRAY[]::TEXT[]
                ) AS groups
            FROM releases r
            JOIN apps a ON a.id = r.app_id
            ORDER BY r.released_at DESC
            "#,
        );
        if limit > 0 {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        rows.iter().map(row_to_release).collect()
    }

    #[instrument(skip(self, filter))]
    async fn set_criticality(
        &self,
        filter: &ReleaseFilter,
        criticality: Criticality,
    ) -> CatalogResult<Vec<Release>> {
        let matching = self.select_releases(filter).await?;
        let ids: Vec<i64> = matching.iter().map(|(id, _)| *id).collect();

        sqlx::query(
            "UPDATE releases SET should_upgrade = $1, updated_at = now() WHERE id = ANY($2)",
        )
        .bind(criticality.level())
        .bind(&ids)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(matching
            .into_iter()
            .map(|(_, mut release)| {
                release.should_upgrade = criticality;
                release
            })
            .collect())
    }

    #[instrument(skip(self, filter))]
    async fn set_stability(
        &self,
        filter: &ReleaseFilter,
        unstable: bool,
    ) -> CatalogResult<Vec<Release>> {
        let matching = self.select_releases(filter).await?;
        let ids: Vec<i64> = matching.iter().map(|(id, _)| *id).collect();

        sqlx::query("UPDATE releases SET unstable = $1, updated_at = now() WHERE id = ANY($2)")
            .bind(unstable)
            .bind(&ids)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(matching
            .into_iter()
            .map(|(_, mut release)| {
                release.unstable = unstable;
                release
            })
            .collect())
    }

    #[instrument(skip(self, filter, target))]
    async fn set_upgrade_target(
        &self,
        filter: &ReleaseFilter,
        target: &UpgradeTarget,
    ) -> CatalogResult<Vec<Release>> {
        target.validate()?;

        let matching = self.select_releases(filter).await?;
        let ids: Vec<i64> = matching.iter().map(|(id, _)| *id).collect();

        sqlx::query(
            "UPDATE releases SET upgrade_target = $1, updated_at = now() WHERE id = ANY($2)",
        )
        .bind(target.as_str())
        .bind(&ids)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(matching
            .into_iter()
            .map(|(_, mut release)| {
                release.upgrade_target = target.clone();
                release
            })
            .collect())
    }
}

fn app_select(condition: &str) -> String {
    format!(
        r#"
        SELECT
            a.vendor, a.product, a.name, a.active, a.locked, a.allow_register,
            a.upgrade_target, a.created_at, a.updated_at,
            COALESCE(
                (SELECT array_agg(g.name ORDER BY g.name)
                 FROM apps_default_groups adg
                 JOIN groups g ON g.id = adg.group_id
                 WHERE adg.app_id = a.id),
                ARRAY[]::TEXT[]
            ) AS default_groups
        FROM apps a
        WHERE {condition}
        "#
    )
}

fn variant_select(condition: &str) -> String {
    format!(
        r#"
        SELECT
            a.vendor, a.product, v.name, v.active, v.locked, v.allow_register,
            v.upgrade_target, v.created_at, v.updated_at,
            COALESCE(
                (SELECT array_agg(g.name ORDER BY g.name)
                 FROM variants_default_groups vdg
                 JOIN groups g ON g.id = vdg.group_id
                 WHERE vdg.variant_id = v.id),
                ARRAY[]::TEXT[]
            ) AS default_groups
        FROM variants v
        JOIN apps a ON a.id = v.app_id
        WHERE {condition}
        "#
    )
}

fn row_to_app(row: &PgRow) -> CatalogResult<App> {
    Ok(App {
        vendor: row.get("vendor"),
        product: row.get("product"),
        name: row.get("name"),
        active: row.get("active"),
        locked: row.get("locked"),
        allow_register: row.get("allow_register"),
        upgrade_target: UpgradeTarget::new(row.get::<String, _>("upgrade_target")),
        default_groups: row.get("default_groups"),
        created: row.get("created_at"),
        updated: row.get("updated_at"),
    })
}

fn row_to_variant(row: &PgRow) -> CatalogResult<Variant> {
    Ok(Variant {
        vendor: row.get("vendor"),
        product: row.get("product"),
        name: row.get("name"),
        active: row.get("active"),
        locked: row.get("locked"),
        allow_register: row.get("allow_register"),
        upgrade_target: UpgradeTarget::new(row.get::<String, _>("upgrade_target")),
        default_groups: row.get("default_groups"),
        created: row.get("created_at"),
        updated: row.get("updated_at"),
    })
}

fn row_to_release(row: &PgRow) -> CatalogResult<Release> {
    let version = Version::parse(&row.get::<String, _>("version"))?;
    let should_upgrade = Criticality::from_level(row.get("should_upgrade"))?;

    Ok(Release {
        vendor: row.get("vendor"),
        product: row.get("product"),
        name: row.get("app_name"),
        variant: row.get("variant"),
        description: row.get("description"),
        os: row.get("os"),
        arch: row.get("arch"),
        date: row.get("released_at"),
        version,
        unstable: row.get("unstable"),
        alias: row.get("alias"),
        link: row.get("link"),
        format: row.get("format"),
        signature: row.get("signature"),
        tags: row.get("tags"),
        upgrade_target: UpgradeTarget::new(row.get::<String, _>("upgrade_target")),
        should_upgrade,
        groups: row.get("groups"),
    })
}

fn store_err(e: sqlx::Error) -> CatalogError {
    CatalogError::Store(e.to_string())
}
