//! Multi-variant composition: picks the latest stored panel per variant and
//! wraps the result in a standalone document (single, tabbed or combined).

use serde::Serialize;
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};
use uuid::Uuid;

use crate::nips::html::{el, Element, Node};
use crate::nips::model::TemplateType;
use crate::nips::repo_types::{NipRecord, Product};

pub const NO_NIPS: &str = "No NIPs found for this product";
pub const NO_HTML: &str = "No NIPs with HTML content found for this product";
pub const PRODUCT_NOT_FOUND: &str = "Product not found";

const DATE_FORMAT: &[FormatItem<'_>] =
    format_description!("[month repr:long] [day padding:none], [year]");

/// Reported result of a composition. Failures are data, not errors.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ComposeOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    pub variant_count: usize,
}

impl ComposeOutcome {
    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
            html: None,
            variant_count: 0,
        }
    }

    fn document(html: String, variant_count: usize) -> Self {
        Self {
            success: true,
            message: None,
            html: Some(html),
            variant_count,
        }
    }
}

/// The panel chosen to represent one variant.
#[derive(Debug, Clone)]
pub struct VariantPanel<'a> {
    pub label: String,
    pub template_type: TemplateType,
    pub html: &'a str,
}

/// Groups records by variant (records without one belong to the product's default
/// variant) and keeps the most recently modified record with HTML in each group.
/// Groups follow the catalog's variant order; variants unknown to the catalog come last.
pub fn latest_per_variant<'a>(product: &Product, records: &'a [NipRecord]) -> Vec<VariantPanel<'a>> {
    let mut best: Vec<(Option<Uuid>, &'a NipRecord)> = Vec::new();
    for record in records.iter().filter(|r| !r.html_content.trim().is_empty()) {
        let key = product.resolve_variant(record.variant_id).variant_id;
        match best.iter_mut().find(|slot| slot.0 == key) {
            Some(slot) => {
                if record.last_modified() > slot.1.last_modified() {
                    slot.1 = record;
                }
            }
            None => best.push((key, record)),
        }
    }

    let rank = |key: Option<Uuid>| match key {
        None => 0,
        Some(id) => product
            .variants
            .iter()
            .position(|v| v.id == id)
            .map_or(usize::MAX, |i| i + 1),
    };
    best.sort_by_key(|(key, _)| rank(*key));

    best.into_iter()
        .enumerate()
        .map(|(i, (key, record))| VariantPanel {
            label: key
                .and_then(|id| product.variant(id))
                .map(|v| v.title.clone())
                .unwrap_or_else(|| format!("Variant {}", i + 1)),
            template_type: record.template_type(),
            html: &record.html_content,
        })
        .collect()
}

fn select_panels<'a>(
    product: &Product,
    records: &'a [NipRecord],
) -> Result<Vec<VariantPanel<'a>>, ComposeOutcome> {
    if records.is_empty() {
        return Err(ComposeOutcome::failure(NO_NIPS));
    }
    let panels = latest_per_variant(product, records);
    if panels.is_empty() {
        return Err(ComposeOutcome::failure(NO_HTML));
    }
    Ok(panels)
}

/// One variant: a plain document. Several: a `<select>`-driven tabbed document.
pub fn compose_tabbed(
    product: &Product,
    records: &[NipRecord],
    generated_at: OffsetDateTime,
) -> ComposeOutcome {
    let panels = match select_panels(product, records) {
        Ok(panels) => panels,
        Err(outcome) => return outcome,
    };
    let html = match panels.as_slice() {
        [only] => single_document(product, only, generated_at),
        _ => tabbed_document(product, &panels, generated_at),
    };
    ComposeOutcome::document(html, panels.len())
}

/// Every variant stacked vertically with a header banner each.
pub fn compose_combined(
    product: &Product,
    records: &[NipRecord],
    generated_at: OffsetDateTime,
) -> ComposeOutcome {
    let panels = match select_panels(product, records) {
        Ok(panels) => panels,
        Err(outcome) => return outcome,
    };
    let html = combined_document(product, &panels, generated_at);
    ComposeOutcome::document(html, panels.len())
}

const BASE_CSS: &str = "\
body { font-family: Arial, Helvetica, sans-serif; margin: 0; padding: 24px; background: #f5f5f5; color: #000; }
.nip-document { max-width: 480px; margin: 0 auto; }
.product-title { font-size: 20px; margin: 0 0 16px; }
.nip-footer { margin-top: 16px; font-size: 11px; color: #666; }
@media print {
  body { background: #fff; padding: 0; }
  .nip-footer { color: #000; }
}
";

const TABBED_CSS: &str = "\
.variant-selector { margin-bottom: 16px; }
.variant-selector select { padding: 6px 8px; font-size: 14px; }
.tab-content { display: none; }
.tab-content.active { display: block; }
@media print {
  .variant-selector { display: none; }
  .tab-content { display: block !important; page-break-after: always; }
  .tab-content:last-of-type { page-break-after: auto; }
}
";

const COMBINED_CSS: &str = "\
.variant-section { margin-bottom: 24px; }
.variant-header { display: flex; justify-content: space-between; align-items: baseline; background: #000; color: #fff; padding: 8px 12px; margin-bottom: 8px; }
.variant-header h2 { font-size: 16px; margin: 0; }
.variant-header .template-type { font-size: 12px; }
.variant-separator { border: 0; border-top: 2px dashed #999; margin: 24px 0; }
@media print {
  .variant-section { page-break-inside: avoid; }
  .variant-separator { display: none; }
}
";

const TAB_SCRIPT: &str = "\
(function () {
  function showVariant(id) {
    var tabs = document.querySelectorAll('.tab-content');
    for (var i = 0; i < tabs.length; i++) {
      tabs[i].classList.remove('active');
    }
    var target = document.getElementById(id);
    if (target) {
      target.classList.add('active');
    }
  }
  document.addEventListener('DOMContentLoaded', function () {
    var select = document.getElementById('variant-select');
    if (!select) {
      return;
    }
    showVariant(select.value);
    select.addEventListener('change', function () {
      showVariant(select.value);
    });
  });
})();
";

fn tab_id(index: usize) -> String {
    format!("variant-{}", index + 1)
}

fn footer(generated_at: OffsetDateTime) -> Element {
    let date = generated_at
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| generated_at.date().to_string());
    el("footer")
        .class("nip-footer")
        .text(format!("Generated on {date}"))
}

fn document(product: &Product, css: &[&str], body: Vec<Node>, script: Option<&str>) -> String {
    let head = el("head")
        .child(el("meta").attr("charset", "utf-8"))
        .child(
            el("meta")
                .attr("name", "viewport")
                .attr("content", "width=device-width, initial-scale=1"),
        )
        .child(el("title").text(format!("{} - Nutritional Information", product.title)))
        .child(el("style").raw(css.concat()));
    let body = el("body")
        .children(body)
        .children(script.map(|s| el("script").raw(s)));

    let mut out = String::from("<!DOCTYPE html>");
    el("html")
        .attr("lang", "en")
        .child(head)
        .child(body)
        .write_to(&mut out);
    out
}

fn product_title(product: &Product) -> Element {
    el("h1").class("product-title").text(product.title.clone())
}

fn single_document(product: &Product, panel: &VariantPanel<'_>, generated_at: OffsetDateTime) -> String {
    let body = el("div")
        .class("nip-document")
        .child(product_title(product))
        .child(el("div").class("nip-content").raw(panel.html))
        .child(footer(generated_at));
    document(product, &[BASE_CSS], vec![body.into()], None)
}

fn tabbed_document(product: &Product, panels: &[VariantPanel<'_>], generated_at: OffsetDateTime) -> String {
    let options = panels.iter().enumerate().map(|(i, panel)| {
        let option = el("option").attr("value", tab_id(i));
        let option = if i == 0 {
            option.attr("selected", "selected")
        } else {
            option
        };
        option.text(panel.label.clone())
    });
    let selector = el("div")
        .class("variant-selector")
        .child(el("label").attr("for", "variant-select").text("Variant: "))
        .child(el("select").id("variant-select").children(options));

    let tabs = panels.iter().enumerate().map(|(i, panel)| {
        el("div")
            .class(if i == 0 { "tab-content active" } else { "tab-content" })
            .id(tab_id(i))
            .attr("data-variant", panel.label.clone())
            .raw(panel.html)
    });

    let body = el("div")
        .class("nip-document nip-tabbed")
        .child(product_title(product))
        .child(selector)
        .children(tabs)
        .child(footer(generated_at));
    document(
        product,
        &[BASE_CSS, TABBED_CSS],
        vec![body.into()],
        Some(TAB_SCRIPT),
    )
}

fn combined_document(product: &Product, panels: &[VariantPanel<'_>], generated_at: OffsetDateTime) -> String {
    let mut body = el("div")
        .class("nip-document nip-combined")
        .child(product_title(product));
    for (i, panel) in panels.iter().enumerate() {
        if i > 0 {
            body = body.child(el("hr").class("variant-separator"));
        }
        body = body.child(
            el("section")
                .class("variant-section")
                .id(tab_id(i))
                .child(
                    el("div")
                        .class("variant-header")
                        .child(el("h2").text(panel.label.clone()))
                        .child(
                            el("span")
                                .class("template-type")
                                .text(panel.template_type.display_name()),
                        ),
                )
                .raw(panel.html),
        );
    }
    let body = body.child(footer(generated_at));
    document(product, &[BASE_CSS, COMBINED_CSS], vec![body.into()], None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nips::memory::product_with_variants;
    use crate::nips::model::Region;
    use crate::nips::seed::default_content;
    use time::macros::datetime;

    const GENERATED: OffsetDateTime = datetime!(2026-10-19 09:30 UTC);

    fn record(
        product: &Product,
        variant_id: Option<Uuid>,
        html: &str,
        updated_at: OffsetDateTime,
    ) -> NipRecord {
        NipRecord {
            id: Uuid::new_v4(),
            product_id: product.id,
            variant_id,
            region: Some(Region::Au),
            content: default_content(TemplateType::ProteinPowder),
            html_content: html.into(),
            created_at: datetime!(2026-01-01 00:00 UTC),
            updated_at: Some(updated_at),
        }
    }

    #[test]
    fn no_records_is_a_reported_failure() {
        let product = product_with_variants("Whey", 2);
        let outcome = compose_tabbed(&product, &[], GENERATED);
        assert!(!outcome.success);
        assert_eq!(outcome.message.as_deref(), Some(NO_NIPS));
        assert!(outcome.html.is_none());
    }

    #[test]
    fn records_without_html_are_a_reported_failure() {
        let product = product_with_variants("Whey", 2);
        let records = vec![record(&product, None, "   ", GENERATED)];
        let outcome = compose_combined(&product, &records, GENERATED);
        assert!(!outcome.success);
        assert_eq!(outcome.message.as_deref(), Some(NO_HTML));
    }

    #[test]
    fn single_variant_is_a_plain_document() {
        let product = product_with_variants("Whey", 2);
        let v1 = product.variants[0].id;
        let records = vec![record(&product, Some(v1), "<div>PANEL-A</div>", GENERATED)];
        let outcome = compose_tabbed(&product, &records, GENERATED);
        assert!(outcome.success);
        assert_eq!(outcome.variant_count, 1);
        let html = outcome.html.unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches("PANEL-A").count(), 1);
        assert!(!html.contains("<select"));
        assert!(!html.contains("tab-content"));
        assert!(html.contains("Generated on October 19, 2026"));
        assert!(html.contains("<title>Whey - Nutritional Information</title>"));
    }

    #[test]
    fn multiple_variants_become_tabs() {
        let product = product_with_variants("Whey", 3);
        let records: Vec<NipRecord> = product
            .variants
            .iter()
            .map(|v| record(&product, Some(v.id), &format!("<div>{}</div>", v.title), GENERATED))
            .collect();
        let outcome = compose_tabbed(&product, &records, GENERATED);
        assert!(outcome.success);
        assert_eq!(outcome.variant_count, 3);

        let html = outcome.html.unwrap();
        assert_eq!(html.matches("<div class=\"tab-content").count(), 3);
        assert_eq!(html.matches("<option").count(), 3);
        assert_eq!(html.matches("class=\"tab-content active\"").count(), 1);
        assert!(html.contains(r#"<div class="tab-content active" id="variant-1""#));
        assert!(html.contains(r#"<option value="variant-1" selected="selected">Flavour 1</option>"#));
        assert!(html.contains(r#"<option value="variant-3">Flavour 3</option>"#));
        assert!(html.contains("DOMContentLoaded"));
        assert!(html.contains("@media print"));
    }

    #[test]
    fn latest_record_wins_within_a_variant() {
        let product = product_with_variants("Whey", 2);
        let v2 = product.variants[1].id;
        let older = record(&product, Some(v2), "<div>OLD</div>", datetime!(2026-03-01 00:00 UTC));
        let newer = record(&product, Some(v2), "<div>NEW</div>", datetime!(2026-06-01 00:00 UTC));
        let blank = record(&product, Some(v2), "", datetime!(2026-09-01 00:00 UTC));
        let records = vec![older, newer, blank];

        let panels = latest_per_variant(&product, &records);
        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0].html, "<div>NEW</div>");
        assert_eq!(panels[0].label, "Flavour 2");
    }

    #[test]
    fn variantless_records_belong_to_the_default_variant() {
        let product = product_with_variants("Whey", 2);
        let v1 = product.variants[0].id;
        let v2 = product.variants[1].id;
        let records = vec![
            record(&product, Some(v2), "<div>B</div>", GENERATED),
            record(&product, None, "<div>LEGACY</div>", datetime!(2026-02-01 00:00 UTC)),
            record(&product, Some(v1), "<div>A</div>", datetime!(2026-04-01 00:00 UTC)),
        ];
        let panels = latest_per_variant(&product, &records);
        let labels: Vec<&str> = panels.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Flavour 1", "Flavour 2"]);
        assert_eq!(panels[0].html, "<div>A</div>");
    }

    #[test]
    fn unknown_variants_fall_back_to_numbered_labels() {
        let product = product_with_variants("Bars", 0);
        let records = vec![
            record(&product, None, "<div>X</div>", GENERATED),
            record(&product, Some(Uuid::new_v4()), "<div>Y</div>", GENERATED),
        ];
        let panels = latest_per_variant(&product, &records);
        let labels: Vec<&str> = panels.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Variant 1", "Variant 2"]);
    }

    #[test]
    fn combined_stacks_every_variant_with_banners() {
        let product = product_with_variants("Whey & Co", 2);
        let records: Vec<NipRecord> = product
            .variants
            .iter()
            .map(|v| record(&product, Some(v.id), "<div>PANEL</div>", GENERATED))
            .collect();
        let outcome = compose_combined(&product, &records, GENERATED);
        assert!(outcome.success);
        let html = outcome.html.unwrap();
        assert_eq!(html.matches("<section class=\"variant-section\"").count(), 2);
        assert_eq!(html.matches("<hr class=\"variant-separator\">").count(), 1);
        assert_eq!(html.matches("Protein Powder</span>").count(), 2);
        assert!(html.contains("<h1 class=\"product-title\">Whey &amp; Co</h1>"));
        assert!(!html.contains("<select"));
    }
}
