use crate::nips::model::AuPanelContent;
use crate::nips::templates::panel::{render_au, standard_au_row, AuLayout};

const LAYOUT: AuLayout = AuLayout {
    class: "nip-supplements",
    title: "NUTRITIONAL INFORMATION",
    headings: ["", "Avg Qty per Serve", "Avg Qty per 100g"],
};

pub fn render(content: &AuPanelContent) -> String {
    render_au(content, &LAYOUT, standard_au_row)
}
