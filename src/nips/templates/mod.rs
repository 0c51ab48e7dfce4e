//! One renderer per template type, all built on the shared `panel` scaffolding.
//! Output is a self-contained fragment with inline styles only.

mod complex_supplements;
mod panel;
mod protein_powder;
mod supplements;
mod us_nutrition_facts;
mod us_supplements;

use crate::nips::model::NipContent;

pub fn render_html(content: &NipContent) -> String {
    match content {
        NipContent::ProteinPowder(c) => protein_powder::render(c),
        NipContent::ComplexSupplements(c) => complex_supplements::render(c),
        NipContent::Supplements(c) => supplements::render(c),
        NipContent::UsNutritionFacts(c) => us_nutrition_facts::render(c),
        NipContent::UsSupplements(c) => us_supplements::render(c),
    }
}
