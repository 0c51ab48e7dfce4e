use crate::nips::model::AuPanelContent;
use crate::nips::templates::panel::{render_au, standard_au_row, AuLayout};

const LAYOUT: AuLayout = AuLayout {
    class: "nip-protein-powder",
    title: "NUTRITIONAL INFORMATION",
    headings: ["", "Per Serve", "Per 100g"],
};

pub fn render(content: &AuPanelContent) -> String {
    render_au(content, &LAYOUT, standard_au_row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nips::model::{NutritionRow, TextSection, Thickness, SERVING_INFO_ROW_ID};

    fn content() -> AuPanelContent {
        AuPanelContent {
            text_sections: vec![
                TextSection::new("serving-size-line", "Serving Size", "30g"),
                TextSection::new("servings-per-pack-line", "Servings per Pack", "33"),
                TextSection::new("ingredients", "Ingredients", "Whey protein <b>(milk)</b>"),
            ],
            nutritional_rows: vec![
                NutritionRow {
                    thickness: Thickness::MediumThick,
                    ..NutritionRow::new("energy", "Energy", "490kJ", "1630kJ")
                },
                NutritionRow::new("protein", "Protein", "24g", "80g"),
                NutritionRow {
                    thickness: Thickness::ExtraLargeThick,
                    ..NutritionRow::new("sodium", "Sodium", "45mg", "150mg")
                },
            ],
            show_text_sections: true,
        }
    }

    #[test]
    fn renders_header_serving_lines_and_rows() {
        let html = render(&content());
        assert!(html.contains("NUTRITIONAL INFORMATION"));
        assert!(html.contains("Per Serve"));
        assert!(html.contains("Per 100g"));
        assert!(html.contains("30g"));
        assert!(html.contains("1630kJ"));
        assert_eq!(html.matches("<tr>").count(), 2 + 1 + 3);
        assert!(html.contains("Whey protein <strong>(milk)</strong>"));
    }

    #[test]
    fn borders_follow_thickness_except_last_row() {
        let html = render(&content());
        assert!(html.contains("border-bottom: 3px solid black"));
        assert!(html.contains("border-bottom: 1px solid black"));
        assert!(!html.contains("border-bottom: 5px solid black"));
        assert!(html.contains("border-bottom: none"));
    }

    #[test]
    fn legacy_serving_row_feeds_header_and_is_not_a_table_row() {
        let mut c = content();
        c.text_sections.clear();
        c.nutritional_rows
            .insert(0, NutritionRow::new(SERVING_INFO_ROW_ID, "Serving", "25g", "40"));
        let html = render(&c);
        assert!(html.contains("Servings per Pack"));
        assert!(html.contains("25g"));
        assert!(!html.contains(">Serving<"));
    }

    #[test]
    fn empty_content_still_renders_a_panel() {
        let html = render(&AuPanelContent {
            text_sections: vec![],
            nutritional_rows: vec![],
            show_text_sections: true,
        });
        assert!(html.starts_with("<div class=\"nip-panel nip-protein-powder\""));
        assert!(html.contains("<tbody></tbody>"));
        assert!(html.ends_with("</div>"));
    }
}
