//! Starting content the builder opens with for a fresh NIP of each template type.

use crate::nips::model::{
    AuPanelContent, NipContent, NutritionRow, TemplateType, TextSection, Thickness,
    UsNutritionFactsContent, UsNutritionRow, UsSupplementsContent, INGREDIENTS_SECTION_ID,
    SERVINGS_PER_CONTAINER_SECTION_ID, SERVINGS_PER_PACK_SECTION_ID, SERVING_SIZE_SECTION_ID,
};

fn au_sections() -> Vec<TextSection> {
    vec![
        TextSection::new(SERVING_SIZE_SECTION_ID, "Serving Size", ""),
        TextSection::new(SERVINGS_PER_PACK_SECTION_ID, "Servings per Pack", ""),
        TextSection::new(INGREDIENTS_SECTION_ID, "Ingredients", ""),
        TextSection::new("directions", "Directions", ""),
        TextSection::new("allergens", "Allergen Advice", ""),
    ]
}

fn us_sections() -> Vec<TextSection> {
    vec![
        TextSection::new(SERVING_SIZE_SECTION_ID, "Serving size", ""),
        TextSection::new(SERVINGS_PER_CONTAINER_SECTION_ID, "Servings per container", ""),
        TextSection::new(INGREDIENTS_SECTION_ID, "Ingredients", ""),
    ]
}

fn au_rows() -> Vec<NutritionRow> {
    vec![
        NutritionRow::new("energy", "Energy", "", ""),
        NutritionRow::new("protein", "Protein", "", ""),
        NutritionRow::new("fat-total", "Fat, total", "", ""),
        NutritionRow::new("fat-saturated", "    - saturated", "", ""),
        NutritionRow::new("carbohydrate", "Carbohydrate", "", ""),
        NutritionRow::new("sugars", "    - sugars", "", ""),
        NutritionRow::new("sodium", "Sodium", "", ""),
    ]
}

fn us_nutrition_rows() -> Vec<UsNutritionRow> {
    vec![
        UsNutritionRow::new("total-fat", "Total Fat", "", "").bold(),
        UsNutritionRow::new("saturated-fat", "    Saturated Fat", "", ""),
        UsNutritionRow::new("trans-fat", "    Trans Fat", "", "").italic(),
        UsNutritionRow::new("cholesterol", "Cholesterol", "", "").bold(),
        UsNutritionRow::new("sodium", "Sodium", "", "").bold(),
        UsNutritionRow::new("total-carbohydrate", "Total Carbohydrate", "", "").bold(),
        UsNutritionRow::new("dietary-fiber", "    Dietary Fiber", "", ""),
        UsNutritionRow::new("total-sugars", "    Total Sugars", "", ""),
        UsNutritionRow::new("added-sugars", "        Includes Added Sugars", "", ""),
        UsNutritionRow::new("protein", "Protein", "", "")
            .bold()
            .with_thickness(Thickness::ExtraLargeThick),
        UsNutritionRow::new("vitamin-d", "Vitamin D", "", ""),
        UsNutritionRow::new("calcium", "Calcium", "", ""),
        UsNutritionRow::new("iron", "Iron", "", ""),
        UsNutritionRow::new("potassium", "Potassium", "", ""),
    ]
}

pub fn default_content(template_type: TemplateType) -> NipContent {
    let au = || AuPanelContent {
        text_sections: au_sections(),
        nutritional_rows: au_rows(),
        show_text_sections: true,
    };
    match template_type {
        TemplateType::ProteinPowder => NipContent::ProteinPowder(au()),
        TemplateType::ComplexSupplements => NipContent::ComplexSupplements(au()),
        TemplateType::Supplements => NipContent::Supplements(au()),
        TemplateType::UsNutritionFacts => NipContent::UsNutritionFacts(UsNutritionFactsContent {
            text_sections: us_sections(),
            nutritional_rows: us_nutrition_rows(),
            calories: String::new(),
            show_daily_value_footnote: true,
            daily_value_footnote: String::new(),
            show_text_sections: true,
        }),
        TemplateType::UsSupplements => NipContent::UsSupplements(UsSupplementsContent {
            text_sections: us_sections(),
            nutritional_rows: vec![
                UsNutritionRow::new("vitamin-c", "Vitamin C", "", ""),
                UsNutritionRow::new("vitamin-d", "Vitamin D", "", ""),
                UsNutritionRow::new("zinc", "Zinc", "", ""),
            ],
            calories: String::new(),
            other_ingredients: String::new(),
            show_daily_value_footnote: true,
            daily_value_footnote: String::new(),
            show_text_sections: true,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_are_valid_and_match_their_type() {
        for template_type in TemplateType::ALL {
            let content = default_content(template_type);
            assert_eq!(content.template_type(), template_type);
            content.validate().unwrap();
        }
    }

    #[test]
    fn us_seed_indents_are_derived_from_labels() {
        let NipContent::UsNutritionFacts(c) = default_content(TemplateType::UsNutritionFacts) else {
            panic!("wrong template");
        };
        let added = c.nutritional_rows.iter().find(|r| r.id == "added-sugars").unwrap();
        assert_eq!(added.indent_level, 2);
        assert!(c.nutritional_rows[0].bold);
    }
}
