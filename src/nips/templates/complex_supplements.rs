use crate::nips::format::prepare_for_html;
use crate::nips::html::{el, Element};
use crate::nips::model::{AuPanelContent, NutritionRow};
use crate::nips::templates::panel::{cell, render_au, standard_au_row, AuLayout};

const LAYOUT: AuLayout = AuLayout {
    class: "nip-complex-supplements",
    title: "NUTRITIONAL INFORMATION",
    headings: ["", "Per Serve", "Per 100g"],
};

/// Rows with neither value collapse into one spanning cell, used as in-table sub-headings.
fn row(row: &NutritionRow, border: &str) -> Element {
    if row.per_serving.is_empty() && row.per_100g.is_empty() {
        return el("tr").child(
            cell(border)
                .attr("colspan", "3")
                .raw(prepare_for_html(&row.label)),
        );
    }
    standard_au_row(row, border)
}

pub fn render(content: &AuPanelContent) -> String {
    render_au(content, &LAYOUT, row)
}
