use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::nips::compose::{compose_combined, compose_tabbed, ComposeOutcome, PRODUCT_NOT_FOUND};
use crate::nips::dto::{BackfillReport, ComposeFilter, SkippedNip};
use crate::nips::model::{infer_region, NipContent, PanelList, Region, TextSection};
use crate::nips::repo_types::{NewNip, NipRecord, NipUpdate, Product};
use crate::nips::templates::render_html;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeMode {
    Tabbed,
    Combined,
}

/// Validates content, refreshes derived fields and renders the panel HTML.
pub fn render(content: &mut NipContent) -> AppResult<String> {
    content.validate()?;
    content.normalize();
    Ok(render_html(content))
}

/// Explicit override wins, then the stored region, then the template's region.
fn resolve_region(explicit: Option<Region>, existing: Option<Region>, content: &NipContent) -> Region {
    explicit
        .or(existing)
        .unwrap_or_else(|| content.template_type().region())
}

async fn require_product(state: &AppState, product_id: Uuid) -> AppResult<Product> {
    state
        .catalog
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::not_found(PRODUCT_NOT_FOUND))
}

/// Creates the NIP for (product, variant, template type) or updates it in place.
/// Returns the record and whether it was newly created.
pub async fn save_nip(
    state: &AppState,
    product_id: Option<Uuid>,
    variant_id: Option<Uuid>,
    region: Option<Region>,
    mut content: NipContent,
) -> AppResult<(NipRecord, bool)> {
    let product_id =
        product_id.ok_or_else(|| AppError::validation("product_id is required"))?;
    let product = require_product(state, product_id).await?;
    if let Some(variant_id) = variant_id {
        if product.variant(variant_id).is_none() {
            warn!(%product_id, %variant_id, "variant does not belong to product");
            return Err(AppError::validation(format!(
                "Variant {variant_id} does not belong to product {product_id}"
            )));
        }
    }

    let html_content = render(&mut content)?;
    let template_type = content.template_type();
    let scope = product.resolve_variant(variant_id);

    match state
        .nips
        .find_by_key(product_id, scope, template_type)
        .await?
    {
        Some(existing) => {
            let update = NipUpdate {
                region: Some(resolve_region(region, existing.region, &content)),
                content,
                html_content,
            };
            let record = state
                .nips
                .update(existing.id, update)
                .await?
                .ok_or_else(|| AppError::not_found("NIP not found"))?;
            info!(nip_id = %record.id, %product_id, %template_type, "nip updated");
            Ok((record, false))
        }
        None => {
            let record = state
                .nips
                .insert(NewNip {
                    product_id,
                    variant_id,
                    region: Some(resolve_region(region, None, &content)),
                    content,
                    html_content,
                })
                .await?;
            info!(nip_id = %record.id, %product_id, %template_type, "nip created");
            Ok((record, true))
        }
    }
}

pub async fn get_nip(state: &AppState, id: Uuid) -> AppResult<NipRecord> {
    state
        .nips
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("NIP not found"))
}

/// Full replacement of an existing record's content. The template type is fixed.
pub async fn update_nip(
    state: &AppState,
    id: Uuid,
    region: Option<Region>,
    mut content: NipContent,
) -> AppResult<NipRecord> {
    let existing = get_nip(state, id).await?;
    if existing.template_type() != content.template_type() {
        return Err(AppError::validation(format!(
            "Template type of NIP {id} is {}, not {}",
            existing.template_type(),
            content.template_type()
        )));
    }
    let html_content = render(&mut content)?;
    let update = NipUpdate {
        region: Some(resolve_region(region, existing.region, &content)),
        content,
        html_content,
    };
    let record = state
        .nips
        .update(id, update)
        .await?
        .ok_or_else(|| AppError::not_found("NIP not found"))?;
    info!(nip_id = %id, "nip updated");
    Ok(record)
}

/// Moves a row or section and regenerates the stored HTML.
pub async fn reorder(
    state: &AppState,
    id: Uuid,
    list: PanelList,
    from: usize,
    to: usize,
) -> AppResult<NipRecord> {
    let existing = get_nip(state, id).await?;
    let mut content = existing.content;
    content.move_item(list, from, to)?;
    update_nip(state, id, None, content).await
}

/// Appends an empty user section titled "Custom Section n" and re-renders.
pub async fn add_custom_section(state: &AppState, id: Uuid) -> AppResult<NipRecord> {
    let mut content = get_nip(state, id).await?.content;
    let sections = content.text_sections();
    let mut n = sections.iter().filter(|s| s.is_custom).count() + 1;
    while sections.iter().any(|s| s.id == TextSection::custom(n).id) {
        n += 1;
    }
    content.text_sections_mut().push(TextSection::custom(n));
    update_nip(state, id, None, content).await
}

pub async fn delete_nip(state: &AppState, id: Uuid) -> AppResult<()> {
    if !state.nips.delete(id).await? {
        return Err(AppError::not_found("NIP not found"));
    }
    info!(nip_id = %id, "nip deleted");
    Ok(())
}

/// Deletes every NIP of a product, across all its variants, in one step.
pub async fn delete_all_for_product(state: &AppState, product_id: Uuid) -> AppResult<u64> {
    let deleted = state.nips.delete_by_product(product_id).await?;
    info!(%product_id, deleted, "nips deleted for product");
    Ok(deleted)
}

/// With a variant filter, the default variant also lists records saved without one.
pub async fn list_for_product(
    state: &AppState,
    product_id: Uuid,
    variant_id: Option<Uuid>,
) -> AppResult<Vec<NipRecord>> {
    let Some(variant_id) = variant_id else {
        return Ok(state.nips.list_by_product(product_id).await?);
    };
    let product = require_product(state, product_id).await?;
    let scope = product.resolve_variant(Some(variant_id));
    Ok(state.nips.list_by_product_variant(product_id, scope).await?)
}

pub async fn list_for_variant(state: &AppState, variant_id: Uuid) -> AppResult<Vec<NipRecord>> {
    let variant = state
        .catalog
        .get_variant(variant_id)
        .await?
        .ok_or_else(|| AppError::not_found("Variant not found"))?;
    list_for_product(state, variant.product_id, Some(variant.id)).await
}

/// Recomposes the stored panels of every variant of a product into one document.
pub async fn compose(
    state: &AppState,
    product_id: Uuid,
    filter: ComposeFilter,
    mode: ComposeMode,
) -> AppResult<ComposeOutcome> {
    let Some(product) = state.catalog.get_product(product_id).await? else {
        return Ok(ComposeOutcome::failure(PRODUCT_NOT_FOUND));
    };
    let records: Vec<NipRecord> = state
        .nips
        .list_by_product(product_id)
        .await?
        .into_iter()
        .filter(|r| filter.matches(r))
        .collect();

    let now = OffsetDateTime::now_utc();
    let outcome = match mode {
        ComposeMode::Tabbed => compose_tabbed(&product, &records, now),
        ComposeMode::Combined => compose_combined(&product, &records, now),
    };
    if !outcome.success {
        warn!(%product_id, ?mode, message = ?outcome.message, "composition produced no document");
    }
    Ok(outcome)
}

/// Assigns a region to every record that has none. Unknown template types are
/// reported, never guessed.
pub async fn backfill_regions(state: &AppState) -> AppResult<BackfillReport> {
    let mut report = BackfillReport::default();
    for nip in state.nips.list_missing_region().await? {
        match infer_region(&nip.template_type) {
            Ok(region) => {
                if state.nips.set_region(nip.id, region).await? {
                    report.updated += 1;
                }
            }
            Err(e) => {
                warn!(nip_id = %nip.id, template_type = %nip.template_type, "region backfill skipped");
                report.skipped.push(SkippedNip {
                    id: nip.id,
                    template_type: nip.template_type,
                    reason: e.to_string(),
                });
            }
        }
    }
    info!(updated = report.updated, skipped = report.skipped.len(), "region backfill done");
    Ok(report)
}
