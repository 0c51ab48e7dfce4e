use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::nips::model::{NipContent, Region, TemplateType};

/// A `nips` row as stored; `content` is the body without its template tag.
#[derive(Debug, Clone, FromRow)]
pub struct NipRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub template_type: String,
    pub region: Option<String>,
    pub content: Json<serde_json::Value>,
    pub html_content: String,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

/// A persisted NIP: structured content for re-editing plus the HTML rendered from it at save time.
#[derive(Debug, Clone, PartialEq)]
pub struct NipRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub region: Option<Region>,
    pub content: NipContent,
    pub html_content: String,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

impl NipRecord {
    pub fn template_type(&self) -> TemplateType {
        self.content.template_type()
    }

    /// Recency key: `updated_at`, falling back to `created_at` for legacy rows.
    pub fn last_modified(&self) -> OffsetDateTime {
        self.updated_at.unwrap_or(self.created_at)
    }
}

impl TryFrom<NipRow> for NipRecord {
    type Error = AppError;

    fn try_from(r: NipRow) -> Result<Self, Self::Error> {
        let content = NipContent::from_parts(&r.template_type, r.content.0)?;
        let region = r.region.as_deref().map(str::parse::<Region>).transpose()?;
        Ok(Self {
            id: r.id,
            product_id: r.product_id,
            variant_id: r.variant_id,
            region,
            content,
            html_content: r.html_content,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewNip {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub region: Option<Region>,
    pub content: NipContent,
    pub html_content: String,
}

/// Full replacement payload for an existing record.
#[derive(Debug, Clone)]
pub struct NipUpdate {
    pub region: Option<Region>,
    pub content: NipContent,
    pub html_content: String,
}

/// Record still lacking a region, with its raw stored template type.
#[derive(Debug, Clone, FromRow)]
pub struct RegionlessNip {
    pub id: Uuid,
    pub template_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Variant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub title: String,
    pub online_store_url: Option<String>,
}

/// Catalog product as synced from the store; variants are in display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub online_store_url: Option<String>,
    pub variants: Vec<Variant>,
}

impl Product {
    /// The variant a NIP without a `variant_id` applies to.
    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants.first()
    }

    pub fn variant(&self, id: Uuid) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Stored `variant_id` values that stand for the requested variant. The
    /// default variant also owns the records saved without a variant.
    pub fn resolve_variant(&self, requested: Option<Uuid>) -> VariantScope {
        let default_id = self.default_variant().map(|v| v.id);
        let variant_id = requested.or(default_id);
        VariantScope {
            variant_id,
            include_unassigned: variant_id == default_id,
        }
    }
}

/// One variant of a product as seen by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantScope {
    pub variant_id: Option<Uuid>,
    /// Also match records stored with `variant_id IS NULL`.
    pub include_unassigned: bool,
}

impl VariantScope {
    pub fn matches(&self, stored: Option<Uuid>) -> bool {
        stored == self.variant_id || (self.include_unassigned && stored.is_none())
    }
}
