use crate::nips::format::prepare_for_html;
use crate::nips::html::{el, Element};
use crate::nips::model::{UsNutritionFactsContent, UsNutritionRow};
use crate::nips::templates::panel::{
    cell, footnote, heading_row, nutrition_table, panel, serving_lines,
    serving_table, table_rows, text_sections_block, us_label, us_legacy_serving, US_SERVING,
};

pub const DEFAULT_FOOTNOTE: &str = "* The % Daily Value (DV) tells you how much a nutrient in a \
serving of food contributes to a daily diet. 2,000 calories a day is used for general nutrition advice.";

fn calories_block(calories: &str) -> Element {
    el("div")
        .class("nip-calories")
        .style("display", "flex")
        .style("justify-content", "space-between")
        .style("align-items", "flex-end")
        .style("padding", "4px 8px")
        .style("border-bottom", "5px solid black")
        .child(
            el("div")
                .child(
                    el("div")
                        .style("font-size", "12px")
                        .style("font-weight", "bold")
                        .text("Amount per serving"),
                )
                .child(
                    el("div")
                        .style("font-size", "26px")
                        .style("font-weight", "900")
                        .text("Calories"),
                ),
        )
        .child(
            el("div")
                .style("font-size", "32px")
                .style("font-weight", "900")
                .raw(prepare_for_html(calories)),
        )
}

fn row(row: &UsNutritionRow, border: &str) -> Element {
    let mut label = cell(border).child(us_label(row));
    if !row.amount.is_empty() {
        label = label.raw(format!(" {}", prepare_for_html(&row.amount)));
    }
    el("tr").child(label).child(
        cell(border)
            .style("text-align", "right")
            .style("font-weight", "bold")
            .raw(prepare_for_html(&row.percent_daily_value)),
    )
}

pub fn render(content: &UsNutritionFactsContent) -> String {
    let lines = serving_lines(
        &content.text_sections,
        &US_SERVING,
        us_legacy_serving(&content.nutritional_rows),
    );
    let body = table_rows(&content.nutritional_rows)
        .into_iter()
        .map(|(r, border)| row(r, &border))
        .collect();

    panel(
        "nip-us-nutrition-facts",
        "NUTRITION FACTS",
        vec![
            serving_table(&lines),
            Some(calories_block(&content.calories)),
            Some(nutrition_table(Some(heading_row(&["", "% Daily Value*"])), body)),
            footnote(
                content.show_daily_value_footnote,
                &content.daily_value_footnote,
                DEFAULT_FOOTNOTE,
            ),
            text_sections_block(&content.text_sections, content.show_text_sections),
        ],
    )
    .render()
}
