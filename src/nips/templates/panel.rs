//! Scaffolding shared by every panel: header bar, serving lines, the row table
//! and the trailing text sections.

use crate::nips::format::{prepare_for_html, INDENT_STEP_PX};
use crate::nips::html::{el, Element};
use crate::nips::model::{
    AuPanelContent, NutritionRow, TextSection, Thickness, UsNutritionRow, INGREDIENTS_SECTION_ID,
    SERVINGS_PER_CONTAINER_SECTION_ID, SERVINGS_PER_PACK_SECTION_ID, SERVING_INFO_ROW_ID,
    SERVING_SIZE_SECTION_ID,
};

pub const CELL_PADDING: &str = "4px 8px";
const FONT_STACK: &str = "Arial, Helvetica, sans-serif";

pub trait PanelRow {
    fn id(&self) -> &str;
    fn thickness(&self) -> Thickness;
}

impl PanelRow for NutritionRow {
    fn id(&self) -> &str {
        &self.id
    }
    fn thickness(&self) -> Thickness {
        self.thickness
    }
}

impl PanelRow for UsNutritionRow {
    fn id(&self) -> &str {
        &self.id
    }
    fn thickness(&self) -> Thickness {
        self.thickness
    }
}

/// Rows that render in the table body, each paired with its `border-bottom`.
pub fn table_rows<R: PanelRow>(rows: &[R]) -> Vec<(&R, String)> {
    let visible: Vec<&R> = rows.iter().filter(|r| r.id() != SERVING_INFO_ROW_ID).collect();
    let last = visible.len().saturating_sub(1);
    visible
        .into_iter()
        .enumerate()
        .map(|(i, row)| (row, row_border(row.thickness(), i == last)))
        .collect()
}

/// `border-bottom` value for a row; the last row never has one.
pub fn row_border(thickness: Thickness, is_last: bool) -> String {
    if is_last {
        "none".to_string()
    } else {
        format!("{}px solid black", thickness.border_width_px())
    }
}

pub fn cell(border: &str) -> Element {
    el("td")
        .style("padding", CELL_PADDING)
        .style("border-bottom", border)
        .style("vertical-align", "top")
}

pub fn value_cell(border: &str, value: &str) -> Element {
    cell(border)
        .style("text-align", "right")
        .raw(prepare_for_html(value))
}

/// Wrapper for US row labels: indent padding plus bold/italic flags.
pub fn us_label(row: &UsNutritionRow) -> Element {
    el("span")
        .style("display", "inline-block")
        .style("padding-left", format!("{}px", row.indent_level * INDENT_STEP_PX))
        .style("font-weight", if row.bold { "bold" } else { "normal" })
        .style("font-style", if row.italic { "italic" } else { "normal" })
        .raw(prepare_for_html(row.nutrient.trim_start()))
}

pub struct ServingLine {
    pub label: String,
    pub value: String,
}

/// Which serving-count section id a template prefers, and the labels used when
/// falling back to a legacy `serving-info` row.
pub struct ServingLabels {
    pub count_section_ids: &'static [&'static str],
    pub size_label: &'static str,
    pub count_label: &'static str,
}

pub const AU_SERVING: ServingLabels = ServingLabels {
    count_section_ids: &[SERVINGS_PER_PACK_SECTION_ID, SERVINGS_PER_CONTAINER_SECTION_ID],
    size_label: "Serving Size",
    count_label: "Servings per Pack",
};

pub const US_SERVING: ServingLabels = ServingLabels {
    count_section_ids: &[SERVINGS_PER_CONTAINER_SECTION_ID, SERVINGS_PER_PACK_SECTION_ID],
    size_label: "Serving Size",
    count_label: "Servings per Container",
};

/// Resolves the serving lines from the reserved sections, falling back per line
/// to the two fields of a legacy `serving-info` row.
pub fn serving_lines(
    sections: &[TextSection],
    labels: &ServingLabels,
    legacy: Option<(&str, &str)>,
) -> Vec<ServingLine> {
    let find = |ids: &[&str]| {
        ids.iter()
            .find_map(|id| sections.iter().find(|s| s.id == *id))
            .map(|s| ServingLine {
                label: prepare_for_html(&s.title),
                value: prepare_for_html(&s.content),
            })
    };
    let fallback = |label: &str, value: Option<&str>| {
        value.filter(|v| !v.trim().is_empty()).map(|v| ServingLine {
            label: label.to_string(),
            value: prepare_for_html(v),
        })
    };

    let size = find(&[SERVING_SIZE_SECTION_ID])
        .or_else(|| fallback(labels.size_label, legacy.map(|(size, _)| size)));
    let count = find(labels.count_section_ids)
        .or_else(|| fallback(labels.count_label, legacy.map(|(_, count)| count)));
    size.into_iter().chain(count).collect()
}

pub fn serving_table(lines: &[ServingLine]) -> Option<Element> {
    if lines.is_empty() {
        return None;
    }
    let rows = lines.iter().map(|line| {
        el("tr")
            .child(
                el("td")
                    .style("padding", CELL_PADDING)
                    .style("font-weight", "bold")
                    .raw(line.label.clone()),
            )
            .child(
                el("td")
                    .style("padding", CELL_PADDING)
                    .style("text-align", "right")
                    .raw(line.value.clone()),
            )
    });
    Some(
        table("nip-serving")
            .style("border-bottom", "4px solid black")
            .children(rows),
    )
}

pub fn table(class: &str) -> Element {
    el("table")
        .class(class)
        .style("width", "100%")
        .style("border-collapse", "collapse")
}

/// Column heading row. Empty headings still produce a cell.
pub fn heading_row(headings: &[&str]) -> Element {
    let cells = headings.iter().enumerate().map(|(i, heading)| {
        el("th")
            .style("padding", CELL_PADDING)
            .style("text-align", if i == 0 { "left" } else { "right" })
            .style("font-weight", "bold")
            .style("border-bottom", "2px solid black")
            .text(*heading)
    });
    el("thead").child(el("tr").children(cells))
}

/// Main row table: optional heading row plus one body row per table row.
pub fn nutrition_table(head: Option<Element>, body: Vec<Element>) -> Element {
    let mut table = table("nip-table");
    if let Some(head) = head {
        table = table.child(head);
    }
    table.child(el("tbody").children(body))
}

/// Trailing sections. With `show_all` off only the ingredients section renders.
pub fn text_sections_block(sections: &[TextSection], show_all: bool) -> Option<Element> {
    let blocks: Vec<Element> = sections
        .iter()
        .filter(|s| !s.is_serving_line())
        .filter(|s| show_all || s.id == INGREDIENTS_SECTION_ID)
        .map(|s| {
            el("div")
                .class("nip-text-section")
                .id(s.id.clone())
                .style("padding", "6px 8px")
                .style("border-top", "1px solid black")
                .child(
                    el("div")
                        .style("font-weight", "bold")
                        .style("margin-bottom", "2px")
                        .raw(prepare_for_html(&s.title)),
                )
                .child(el("div").raw(prepare_for_html(&s.content)))
        })
        .collect();
    if blocks.is_empty() {
        return None;
    }
    Some(el("div").class("nip-text-sections").children(blocks))
}

/// Outer frame and black title bar; `body` follows the bar in order.
pub fn panel(class: &str, title: &str, body: Vec<Option<Element>>) -> Element {
    el("div")
        .class(format!("nip-panel {class}"))
        .style("font-family", FONT_STACK)
        .style("font-size", "14px")
        .style("max-width", "420px")
        .style("border", "2px solid black")
        .style("background-color", "#ffffff")
        .style("color", "#000000")
        .style("box-sizing", "border-box")
        .child(
            el("div")
                .class("nip-header")
                .style("background-color", "#000000")
                .style("color", "#ffffff")
                .style("font-weight", "bold")
                .style("font-size", "18px")
                .style("letter-spacing", "1px")
                .style("padding", "8px")
                .style("text-align", "center")
                .text(title),
        )
        .children(body.into_iter().flatten())
}

pub struct AuLayout {
    pub class: &'static str,
    pub title: &'static str,
    pub headings: [&'static str; 3],
}

pub type AuRowFn = fn(&NutritionRow, &str) -> Element;

/// label | per serve | per 100g
pub fn standard_au_row(row: &NutritionRow, border: &str) -> Element {
    el("tr")
        .child(cell(border).raw(prepare_for_html(&row.label)))
        .child(value_cell(border, &row.per_serving))
        .child(value_cell(border, &row.per_100g))
}

/// Frame shared by the three AU templates; only the layout and row rule differ.
pub fn render_au(content: &AuPanelContent, layout: &AuLayout, row_fn: AuRowFn) -> String {
    let legacy = content
        .nutritional_rows
        .iter()
        .find(|r| r.id == SERVING_INFO_ROW_ID)
        .map(|r| (r.per_serving.as_str(), r.per_100g.as_str()));
    let lines = serving_lines(&content.text_sections, &AU_SERVING, legacy);

    let body = table_rows(&content.nutritional_rows)
        .into_iter()
        .map(|(row, border)| row_fn(row, &border))
        .collect();

    panel(
        layout.class,
        layout.title,
        vec![
            serving_table(&lines),
            Some(nutrition_table(Some(heading_row(&layout.headings)), body)),
            text_sections_block(&content.text_sections, content.show_text_sections),
        ],
    )
    .render()
}

/// Legacy `serving-info` fields of a US row list: (serving size, servings per container).
pub fn us_legacy_serving(rows: &[UsNutritionRow]) -> Option<(&str, &str)> {
    rows.iter()
        .find(|r| r.id == SERVING_INFO_ROW_ID)
        .map(|r| (r.amount.as_str(), r.percent_daily_value.as_str()))
}

/// Daily-value footnote paragraph; `text` falls back to `default_text` when blank.
pub fn footnote(show: bool, text: &str, default_text: &str) -> Option<Element> {
    if !show {
        return None;
    }
    let text = if text.trim().is_empty() { default_text } else { text };
    Some(
        el("p")
            .class("nip-footnote")
            .style("margin", "0")
            .style("padding", "6px 8px")
            .style("font-size", "11px")
            .style("border-top", "1px solid black")
            .raw(prepare_for_html(text)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_row_has_no_border_and_sentinel_is_skipped() {
        let rows = vec![
            NutritionRow {
                thickness: Thickness::Thick,
                ..NutritionRow::new("energy", "Energy", "1", "2")
            },
            NutritionRow {
                thickness: Thickness::LargeThick,
                ..NutritionRow::new("sodium", "Sodium", "1", "2")
            },
            NutritionRow::new(SERVING_INFO_ROW_ID, "Serving", "30g", "10"),
        ];
        let visible = table_rows(&rows);
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].0.id, "energy");
        assert_eq!(visible[0].1, "2px solid black");
        assert_eq!(visible[1].0.id, "sodium");
        assert_eq!(visible[1].1, "none");
    }

    #[test]
    fn border_values() {
        assert_eq!(row_border(Thickness::Normal, false), "1px solid black");
        assert_eq!(row_border(Thickness::ExtraLargeThick, false), "5px solid black");
        assert_eq!(row_border(Thickness::ExtraLargeThick, true), "none");
    }

    #[test]
    fn serving_lines_prefer_sections_over_legacy_row() {
        let sections = vec![
            TextSection::new(SERVING_SIZE_SECTION_ID, "Serving size", "30g"),
            TextSection::new(SERVINGS_PER_PACK_SECTION_ID, "Servings per pack", "33"),
        ];
        let lines = serving_lines(&sections, &AU_SERVING, Some(("25g", "40")));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].value, "30g");
        assert_eq!(lines[1].label, "Servings per pack");
    }

    #[test]
    fn serving_lines_fall_back_to_legacy_row() {
        let lines = serving_lines(&[], &US_SERVING, Some(("2 scoops", "20")));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].label, "Serving Size");
        assert_eq!(lines[1].label, "Servings per Container");
        assert_eq!(lines[1].value, "20");
        assert!(serving_lines(&[], &US_SERVING, None).is_empty());
    }

    #[test]
    fn hidden_sections_keep_only_ingredients() {
        let sections = vec![
            TextSection::new(SERVING_SIZE_SECTION_ID, "Serving size", "30g"),
            TextSection::new("directions", "Directions", "Mix"),
            TextSection::new(INGREDIENTS_SECTION_ID, "Ingredients", "Whey"),
        ];
        let html = text_sections_block(&sections, false).unwrap().render();
        assert!(html.contains("Whey"));
        assert!(!html.contains("Mix"));
        assert!(!html.contains("30g"));

        let html = text_sections_block(&sections, true).unwrap().render();
        assert!(html.contains("Mix"));
        assert!(html.find("Mix").unwrap() < html.find("Whey").unwrap());
    }

    #[test]
    fn no_sections_means_no_block() {
        assert!(text_sections_block(&[], true).is_none());
        let only_directions = vec![TextSection::new("directions", "Directions", "Mix")];
        assert!(text_sections_block(&only_directions, false).is_none());
    }
}
