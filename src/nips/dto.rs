use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::nips::model::{NipContent, PanelList, Region, TemplateType};
use crate::nips::repo_types::NipRecord;

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

/// Template type plus its content body, exactly as the builder edits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPayload {
    pub template_type: String,
    #[serde(default = "empty_object")]
    pub content: serde_json::Value,
}

impl ContentPayload {
    pub fn into_content(self) -> AppResult<NipContent> {
        NipContent::from_parts(&self.template_type, self.content)
    }

    pub fn from_content(content: &NipContent) -> AppResult<Self> {
        Ok(Self {
            template_type: content.template_type().as_str().to_string(),
            content: content.body()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveNipRequest {
    pub product_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    pub region: Option<Region>,
    #[serde(flatten)]
    pub payload: ContentPayload,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNipRequest {
    pub region: Option<Region>,
    #[serde(flatten)]
    pub payload: ContentPayload,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub list: PanelList,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub variant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ComposeQuery {
    pub template_type: Option<String>,
    pub region: Option<Region>,
}

/// Narrows the records considered by a composition.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposeFilter {
    pub template_type: Option<TemplateType>,
    pub region: Option<Region>,
}

impl TryFrom<ComposeQuery> for ComposeFilter {
    type Error = AppError;

    fn try_from(q: ComposeQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            template_type: q.template_type.as_deref().map(str::parse::<TemplateType>).transpose()?,
            region: q.region,
        })
    }
}

impl ComposeFilter {
    /// Records without a stored region match on the region their template implies.
    pub fn matches(&self, record: &NipRecord) -> bool {
        let template_type = record.template_type();
        let region = record.region.unwrap_or_else(|| template_type.region());
        self.template_type.map_or(true, |t| t == template_type)
            && self.region.map_or(true, |r| r == region)
    }
}

#[derive(Debug, Serialize)]
pub struct NipResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub region: Option<Region>,
    pub template_type: String,
    pub content: serde_json::Value,
    pub html_content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl TryFrom<NipRecord> for NipResponse {
    type Error = AppError;

    fn try_from(r: NipRecord) -> Result<Self, Self::Error> {
        let ContentPayload {
            template_type,
            content,
        } = ContentPayload::from_content(&r.content)?;
        Ok(Self {
            id: r.id,
            product_id: r.product_id,
            variant_id: r.variant_id,
            region: r.region,
            template_type,
            content,
            html_content: r.html_content,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteAllResponse {
    pub deleted_count: u64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SkippedNip {
    pub id: Uuid,
    pub template_type: String,
    pub reason: String,
}

#[derive(Debug, Default, Serialize)]
pub struct BackfillReport {
    pub updated: usize,
    pub skipped: Vec<SkippedNip>,
}
