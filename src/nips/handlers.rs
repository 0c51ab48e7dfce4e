use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{auth::AdminUser, error::AppError, state::AppState};

use super::compose::ComposeOutcome;
use super::dto::{
    BackfillReport, ComposeFilter, ComposeQuery, ContentPayload, DeleteAllResponse, ListQuery,
    NipResponse, PreviewResponse, ReorderRequest, SaveNipRequest, UpdateNipRequest,
};
use super::model::TemplateType;
use super::repo_types::NipRecord;
use super::seed::default_content;
use super::services::{self, ComposeMode};

// --- routers ---

pub fn read_router() -> Router<AppState> {
    Router::new()
        .route("/templates/:template_type/default", get(default_template))
        .route("/products/:product_id/nips", get(list_for_product))
        .route("/products/:product_id/nips/tabbed", get(tabbed))
        .route("/products/:product_id/nips/combined", get(combined))
        .route("/variants/:variant_id/nips", get(list_for_variant))
        .route("/nips/:id", get(get_nip))
}

pub fn write_router() -> Router<AppState> {
    Router::new()
        .route("/nips", post(save_nip))
        .route("/nips/preview", post(preview))
        .route("/nips/backfill-regions", post(backfill_regions))
        .route("/nips/:id", put(update_nip).delete(delete_nip))
        .route("/nips/:id/reorder", post(reorder))
        .route("/nips/:id/sections", post(add_custom_section))
        .route("/products/:product_id/nips", delete(delete_for_product))
}

fn respond(record: NipRecord) -> Result<Json<NipResponse>, AppError> {
    Ok(Json(NipResponse::try_from(record)?))
}

fn respond_all(records: Vec<NipRecord>) -> Result<Json<Vec<NipResponse>>, AppError> {
    let items = records
        .into_iter()
        .map(NipResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(items))
}

// --- handlers ---

#[instrument(skip_all)]
pub async fn default_template(
    _admin: AdminUser,
    Path(template_type): Path<String>,
) -> Result<Json<ContentPayload>, AppError> {
    let template_type: TemplateType = template_type.parse()?;
    Ok(Json(ContentPayload::from_content(&default_content(template_type))?))
}

#[instrument(skip_all)]
pub async fn preview(
    _admin: AdminUser,
    Json(payload): Json<ContentPayload>,
) -> Result<Json<PreviewResponse>, AppError> {
    let mut content = payload.into_content()?;
    let html = services::render(&mut content)?;
    Ok(Json(PreviewResponse { html }))
}

/// POST /nips: 201 with a Location header when created, 200 when an existing
/// record for the same product, variant and template type was updated.
#[instrument(skip(state, req))]
pub async fn save_nip(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
    Json(req): Json<SaveNipRequest>,
) -> Result<(StatusCode, HeaderMap, Json<NipResponse>), AppError> {
    let content = req.payload.into_content()?;
    let (record, created) =
        services::save_nip(&state, req.product_id, req.variant_id, req.region, content).await?;

    let mut headers = HeaderMap::new();
    let status = if created {
        let location = HeaderValue::from_str(&format!("/api/v1/nips/{}", record.id))
            .map_err(anyhow::Error::from)?;
        headers.insert(header::LOCATION, location);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, headers, respond(record)?))
}

#[instrument(skip(state))]
pub async fn get_nip(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<NipResponse>, AppError> {
    respond(services::get_nip(&state, id).await?)
}

#[instrument(skip(state, req))]
pub async fn update_nip(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNipRequest>,
) -> Result<Json<NipResponse>, AppError> {
    let content = req.payload.into_content()?;
    respond(services::update_nip(&state, id, req.region, content).await?)
}

/// POST /nips/:id/sections: appends an empty custom section.
#[instrument(skip(state))]
pub async fn add_custom_section(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<NipResponse>, AppError> {
    respond(services::add_custom_section(&state, id).await?)
}

#[instrument(skip(state))]
pub async fn delete_nip(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::delete_nip(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, req))]
pub async fn reorder(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<NipResponse>, AppError> {
    respond(services::reorder(&state, id, req.list, req.from, req.to).await?)
}

#[instrument(skip(state))]
pub async fn list_for_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(product_id): Path<Uuid>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<NipResponse>>, AppError> {
    respond_all(services::list_for_product(&state, product_id, q.variant_id).await?)
}

#[instrument(skip(state))]
pub async fn list_for_variant(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(variant_id): Path<Uuid>,
) -> Result<Json<Vec<NipResponse>>, AppError> {
    respond_all(services::list_for_variant(&state, variant_id).await?)
}

#[instrument(skip(state))]
pub async fn delete_for_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(product_id): Path<Uuid>,
) -> Result<Json<DeleteAllResponse>, AppError> {
    let deleted_count = services::delete_all_for_product(&state, product_id).await?;
    Ok(Json(DeleteAllResponse { deleted_count }))
}

#[instrument(skip(state))]
pub async fn tabbed(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(product_id): Path<Uuid>,
    Query(q): Query<ComposeQuery>,
) -> Result<Json<ComposeOutcome>, AppError> {
    let filter = ComposeFilter::try_from(q)?;
    Ok(Json(services::compose(&state, product_id, filter, ComposeMode::Tabbed).await?))
}

#[instrument(skip(state))]
pub async fn combined(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(product_id): Path<Uuid>,
    Query(q): Query<ComposeQuery>,
) -> Result<Json<ComposeOutcome>, AppError> {
    let filter = ComposeFilter::try_from(q)?;
    Ok(Json(services::compose(&state, product_id, filter, ComposeMode::Combined).await?))
}

#[instrument(skip(state))]
pub async fn backfill_regions(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
) -> Result<Json<BackfillReport>, AppError> {
    Ok(Json(services::backfill_regions(&state).await?))
}
