use crate::nips::format::prepare_for_html;
use crate::nips::html::{el, Element};
use crate::nips::model::{UsNutritionRow, UsSupplementsContent};
use crate::nips::templates::panel::{
    cell, footnote, heading_row, nutrition_table, panel, serving_lines,
    serving_table, table_rows, text_sections_block, us_label, us_legacy_serving, value_cell,
    CELL_PADDING, US_SERVING,
};

pub const DEFAULT_FOOTNOTE: &str = "† Daily Value not established.";

fn calories_line(calories: &str) -> Option<Element> {
    if calories.trim().is_empty() {
        return None;
    }
    Some(
        el("div")
            .class("nip-calories")
            .style("display", "flex")
            .style("justify-content", "space-between")
            .style("padding", CELL_PADDING)
            .style("font-weight", "bold")
            .style("border-bottom", "2px solid black")
            .child(el("span").text("Calories"))
            .child(el("span").raw(prepare_for_html(calories))),
    )
}

fn other_ingredients(text: &str) -> Option<Element> {
    if text.trim().is_empty() {
        return None;
    }
    Some(
        el("div")
            .class("nip-other-ingredients")
            .style("background-color", "#000000")
            .style("color", "#ffffff")
            .style("padding", "6px 8px")
            .child(el("strong").text("Other Ingredients: "))
            .raw(prepare_for_html(text)),
    )
}

fn row(row: &UsNutritionRow, border: &str) -> Element {
    el("tr")
        .child(cell(border).child(us_label(row)))
        .child(value_cell(border, &row.amount))
        .child(
            value_cell(border, &row.percent_daily_value).style("font-weight", "bold"),
        )
}

pub fn render(content: &UsSupplementsContent) -> String {
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
        "nip-us-supplements",
        "SUPPLEMENT FACTS",
        vec![
            serving_table(&lines),
            calories_line(&content.calories),
            Some(nutrition_table(
                Some(heading_row(&["", "Amount Per Serving", "% Daily Value"])),
                body,
            )),
            other_ingredients(&content.other_ingredients),
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
