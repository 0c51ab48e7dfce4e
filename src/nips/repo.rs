use anyhow::Context;
use axum::async_trait;
use sqlx::{types::Json, PgPool};
use tracing::warn;
use uuid::Uuid;

use crate::nips::model::{Region, TemplateType};
use crate::nips::repo_types::{
    NewNip, NipRecord, NipRow, NipUpdate, Product, ProductRow, RegionlessNip, Variant,
    VariantScope,
};

/// Document store for NIP records with lookups by product and variant.
#[async_trait]
pub trait NipStore: Send + Sync {
    async fn insert(&self, nip: NewNip) -> anyhow::Result<NipRecord>;
    async fn update(&self, id: Uuid, update: NipUpdate) -> anyhow::Result<Option<NipRecord>>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<NipRecord>>;
    /// Most recent record for a (product, variant, template type) tuple.
    async fn find_by_key(
        &self,
        product_id: Uuid,
        scope: VariantScope,
        template_type: TemplateType,
    ) -> anyhow::Result<Option<NipRecord>>;
    /// Rows that cannot be decoded are logged and left out.
    async fn list_by_product(&self, product_id: Uuid) -> anyhow::Result<Vec<NipRecord>>;
    async fn list_by_product_variant(
        &self,
        product_id: Uuid,
        scope: VariantScope,
    ) -> anyhow::Result<Vec<NipRecord>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Removes every record of a product in one step and returns how many went.
    async fn delete_by_product(&self, product_id: Uuid) -> anyhow::Result<u64>;
    async fn list_missing_region(&self) -> anyhow::Result<Vec<RegionlessNip>>;
    async fn set_region(&self, id: Uuid, region: Region) -> anyhow::Result<bool>;
}

/// Read access to the synced product catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get_product(&self, id: Uuid) -> anyhow::Result<Option<Product>>;
    async fn get_variant(&self, id: Uuid) -> anyhow::Result<Option<Variant>>;
}

const NIP_COLUMNS: &str = "id, product_id, variant_id, template_type, region, content, \
                           html_content, created_at, updated_at";

#[derive(Clone)]
pub struct PgNipStore {
    db: PgPool,
}

impl PgNipStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Decodes listed rows, skipping legacy rows whose template type or content
/// no longer parses so the rest of the product stays readable.
pub(crate) fn decode_rows(rows: Vec<NipRow>) -> Vec<NipRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let nip_id = row.id;
            let template_type = row.template_type.clone();
            match NipRecord::try_from(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(%nip_id, %template_type, error = %e, "skipping undecodable nip");
                    None
                }
            }
        })
        .collect()
}

fn into_record(row: Option<NipRow>) -> anyhow::Result<Option<NipRecord>> {
    row.map(NipRecord::try_from)
        .transpose()
        .map_err(anyhow::Error::from)
}

#[async_trait]
impl NipStore for PgNipStore {
    async fn insert(&self, nip: NewNip) -> anyhow::Result<NipRecord> {
        let body = nip.content.body()?;
        let row = sqlx::query_as::<_, NipRow>(&format!(
            r#"
            INSERT INTO nips (product_id, variant_id, template_type, region, content, html_content)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {NIP_COLUMNS}
            "#
        ))
        .bind(nip.product_id)
        .bind(nip.variant_id)
        .bind(nip.content.template_type().as_str())
        .bind(nip.region.map(Region::as_str))
        .bind(Json(body))
        .bind(&nip.html_content)
        .fetch_one(&self.db)
        .await
        .context("insert nip")?;
        Ok(NipRecord::try_from(row)?)
    }

    async fn update(&self, id: Uuid, update: NipUpdate) -> anyhow::Result<Option<NipRecord>> {
        let body = update.content.body()?;
        let row = sqlx::query_as::<_, NipRow>(&format!(
            r#"
            UPDATE nips
            SET template_type = $2, region = $3, content = $4, html_content = $5, updated_at = now()
            WHERE id = $1
            RETURNING {NIP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.content.template_type().as_str())
        .bind(update.region.map(Region::as_str))
        .bind(Json(body))
        .bind(&update.html_content)
        .fetch_optional(&self.db)
        .await
        .context("update nip")?;
        into_record(row)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<NipRecord>> {
        let row = sqlx::query_as::<_, NipRow>(&format!(
            "SELECT {NIP_COLUMNS} FROM nips WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        into_record(row)
    }

    async fn find_by_key(
        &self,
        product_id: Uuid,
        scope: VariantScope,
        template_type: TemplateType,
    ) -> anyhow::Result<Option<NipRecord>> {
        let row = sqlx::query_as::<_, NipRow>(&format!(
            r#"
            SELECT {NIP_COLUMNS}
            FROM nips
            WHERE product_id = $1
              AND (variant_id IS NOT DISTINCT FROM $2 OR ($3 AND variant_id IS NULL))
              AND template_type = $4
            ORDER BY COALESCE(updated_at, created_at) DESC
            LIMIT 1
            "#
        ))
        .bind(product_id)
        .bind(scope.variant_id)
        .bind(scope.include_unassigned)
        .bind(template_type.as_str())
        .fetch_optional(&self.db)
        .await?;
        into_record(row)
    }

    async fn list_by_product(&self, product_id: Uuid) -> anyhow::Result<Vec<NipRecord>> {
        let rows = sqlx::query_as::<_, NipRow>(&format!(
            "SELECT {NIP_COLUMNS} FROM nips WHERE product_id = $1 ORDER BY created_at ASC"
        ))
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;
        Ok(decode_rows(rows))
    }

    async fn list_by_product_variant(
        &self,
        product_id: Uuid,
        scope: VariantScope,
    ) -> anyhow::Result<Vec<NipRecord>> {
        let rows = sqlx::query_as::<_, NipRow>(&format!(
            r#"
            SELECT {NIP_COLUMNS}
            FROM nips
            WHERE product_id = $1
              AND (variant_id IS NOT DISTINCT FROM $2 OR ($3 AND variant_id IS NULL))
            ORDER BY created_at ASC
            "#
        ))
        .bind(product_id)
        .bind(scope.variant_id)
        .bind(scope.include_unassigned)
        .fetch_all(&self.db)
        .await?;
        Ok(decode_rows(rows))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM nips WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete nip")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_by_product(&self, product_id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM nips WHERE product_id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await
            .context("delete nips by product")?;
        Ok(res.rows_affected())
    }

    async fn list_missing_region(&self) -> anyhow::Result<Vec<RegionlessNip>> {
        let rows = sqlx::query_as::<_, RegionlessNip>(
            "SELECT id, template_type FROM nips WHERE region IS NULL ORDER BY created_at ASC",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn set_region(&self, id: Uuid, region: Region) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE nips SET region = $2 WHERE id = $1")
            .bind(id)
            .bind(region.as_str())
            .execute(&self.db)
            .await
            .context("set nip region")?;
        Ok(res.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct PgCatalog {
    db: PgPool,
}

impl PgCatalog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn get_product(&self, id: Uuid) -> anyhow::Result<Option<Product>> {
        let Some(product) = sqlx::query_as::<_, ProductRow>(
            "SELECT id, title, online_store_url FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        else {
            return Ok(None);
        };

        let variants = sqlx::query_as::<_, Variant>(
            r#"
            SELECT id, product_id, title
            FROM product_variants
            WHERE product_id = $1
            ORDER BY position ASC, title ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(Some(Product {
            id: product.id,
            title: product.title,
            online_store_url: product.online_store_url,
            variants,
        }))
    }

    async fn get_variant(&self, id: Uuid) -> anyhow::Result<Option<Variant>> {
        let variant = sqlx::query_as::<_, Variant>(
            "SELECT id, product_id, title FROM product_variants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(variant)
    }
}
