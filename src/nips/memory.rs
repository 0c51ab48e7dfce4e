//! In-memory `NipStore` and `Catalog` used by the test suite.
//!
//! Records are kept as raw rows, so legacy rows with an unknown template type
//! sit next to current ones and go through the same decoding as Postgres rows.

use std::collections::HashMap;

use axum::async_trait;
use sqlx::types::Json;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::nips::model::{Region, TemplateType};
use crate::nips::repo::{decode_rows, Catalog, NipStore};
use crate::nips::repo_types::{
    NewNip, NipRecord, NipRow, NipUpdate, Product, RegionlessNip, Variant, VariantScope,
};

#[derive(Default)]
pub struct MemoryNipStore {
    rows: RwLock<Vec<NipRow>>,
}

fn to_row(record: &NipRecord) -> NipRow {
    NipRow {
        id: record.id,
        product_id: record.product_id,
        variant_id: record.variant_id,
        template_type: record.template_type().as_str().to_string(),
        region: record.region.map(|r| r.as_str().to_string()),
        content: Json(record.content.body().expect("content serializes")),
        html_content: record.html_content.clone(),
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

impl MemoryNipStore {
    /// Stores a record as-is, keeping its timestamps.
    pub async fn put(&self, record: NipRecord) {
        self.rows.write().await.push(to_row(&record));
    }

    /// Stores a raw row, e.g. a legacy one the typed model can no longer read.
    pub async fn put_row(&self, row: NipRow) {
        self.rows.write().await.push(row);
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    async fn select(&self, keep: impl Fn(&NipRow) -> bool) -> Vec<NipRow> {
        self.rows.read().await.iter().filter(|r| keep(r)).cloned().collect()
    }
}

/// A variant-less row of `product_id` with no region and an arbitrary stored template type.
pub fn legacy_row(product_id: Uuid, template_type: &str) -> NipRow {
    NipRow {
        id: Uuid::new_v4(),
        product_id,
        variant_id: None,
        template_type: template_type.into(),
        region: None,
        content: Json(serde_json::json!({})),
        html_content: "<div>legacy</div>".into(),
        created_at: OffsetDateTime::now_utc(),
        updated_at: None,
    }
}

#[async_trait]
impl NipStore for MemoryNipStore {
    async fn insert(&self, nip: NewNip) -> anyhow::Result<NipRecord> {
        let now = OffsetDateTime::now_utc();
        let row = NipRow {
            id: Uuid::new_v4(),
            product_id: nip.product_id,
            variant_id: nip.variant_id,
            template_type: nip.content.template_type().as_str().to_string(),
            region: nip.region.map(|r| r.as_str().to_string()),
            content: Json(nip.content.body()?),
            html_content: nip.html_content,
            created_at: now,
            updated_at: Some(now),
        };
        self.rows.write().await.push(row.clone());
        Ok(NipRecord::try_from(row)?)
    }

    async fn update(&self, id: Uuid, update: NipUpdate) -> anyhow::Result<Option<NipRecord>> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        row.template_type = update.content.template_type().as_str().to_string();
        row.region = update.region.map(|r| r.as_str().to_string());
        row.content = Json(update.content.body()?);
        row.html_content = update.html_content;
        row.updated_at = Some(OffsetDateTime::now_utc());
        Ok(Some(NipRecord::try_from(row.clone())?))
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<NipRecord>> {
        let row = self.select(|r| r.id == id).await.into_iter().next();
        Ok(row.map(NipRecord::try_from).transpose()?)
    }

    async fn find_by_key(
        &self,
        product_id: Uuid,
        scope: VariantScope,
        template_type: TemplateType,
    ) -> anyhow::Result<Option<NipRecord>> {
        let latest = self
            .select(|r| {
                r.product_id == product_id
                    && scope.matches(r.variant_id)
                    && r.template_type == template_type.as_str()
            })
            .await
            .into_iter()
            .max_by_key(|r| r.updated_at.unwrap_or(r.created_at));
        Ok(latest.map(NipRecord::try_from).transpose()?)
    }

    async fn list_by_product(&self, product_id: Uuid) -> anyhow::Result<Vec<NipRecord>> {
        Ok(decode_rows(self.select(|r| r.product_id == product_id).await))
    }

    async fn list_by_product_variant(
        &self,
        product_id: Uuid,
        scope: VariantScope,
    ) -> anyhow::Result<Vec<NipRecord>> {
        let rows = self
            .select(|r| r.product_id == product_id && scope.matches(r.variant_id))
            .await;
        Ok(decode_rows(rows))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() < before)
    }

    async fn delete_by_product(&self, product_id: Uuid) -> anyhow::Result<u64> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| r.product_id != product_id);
        Ok((before - rows.len()) as u64)
    }

    async fn list_missing_region(&self) -> anyhow::Result<Vec<RegionlessNip>> {
        Ok(self
            .select(|r| r.region.is_none())
            .await
            .into_iter()
            .map(|r| RegionlessNip {
                id: r.id,
                template_type: r.template_type,
            })
            .collect())
    }

    async fn set_region(&self, id: Uuid, region: Region) -> anyhow::Result<bool> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.region = Some(region.as_str().to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryCatalog {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl MemoryCatalog {
    pub async fn add_product(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn get_product(&self, id: Uuid) -> anyhow::Result<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn get_variant(&self, id: Uuid) -> anyhow::Result<Option<Variant>> {
        Ok(self
            .products
            .read()
            .await
            .values()
            .flat_map(|p| p.variants.iter())
            .find(|v| v.id == id)
            .cloned())
    }
}

/// A product with `n` variants titled "Flavour 1".."Flavour n".
pub fn product_with_variants(title: &str, n: usize) -> Product {
    let id = Uuid::new_v4();
    Product {
        id,
        title: title.into(),
        online_store_url: Some(format!("https://shop.example.com/products/{}", id)),
        variants: (1..=n)
            .map(|i| Variant {
                id: Uuid::new_v4(),
                product_id: id,
                title: format!("Flavour {i}"),
            })
            .collect(),
    }
}
