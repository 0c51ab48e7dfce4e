use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::nips::format::infer_indent_level;

/// Row id whose two value fields carry the legacy serving-size header.
pub const SERVING_INFO_ROW_ID: &str = "serving-info";
pub const SERVING_SIZE_SECTION_ID: &str = "serving-size-line";
pub const SERVINGS_PER_PACK_SECTION_ID: &str = "servings-per-pack-line";
pub const SERVINGS_PER_CONTAINER_SECTION_ID: &str = "servings-per-container-line";
pub const INGREDIENTS_SECTION_ID: &str = "ingredients";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    ProteinPowder,
    ComplexSupplements,
    Supplements,
    UsNutritionFacts,
    UsSupplements,
}

impl TemplateType {
    pub const ALL: [TemplateType; 5] = [
        TemplateType::ProteinPowder,
        TemplateType::ComplexSupplements,
        TemplateType::Supplements,
        TemplateType::UsNutritionFacts,
        TemplateType::UsSupplements,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateType::ProteinPowder => "protein_powder",
            TemplateType::ComplexSupplements => "complex_supplements",
            TemplateType::Supplements => "supplements",
            TemplateType::UsNutritionFacts => "us_nutrition_facts",
            TemplateType::UsSupplements => "us_supplements",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TemplateType::ProteinPowder => "Protein Powder",
            TemplateType::ComplexSupplements => "Complex Supplements",
            TemplateType::Supplements => "Supplements",
            TemplateType::UsNutritionFacts => "US Nutrition Facts",
            TemplateType::UsSupplements => "US Supplements",
        }
    }

    pub fn region(self) -> Region {
        match self {
            TemplateType::ProteinPowder
            | TemplateType::ComplexSupplements
            | TemplateType::Supplements => Region::Au,
            TemplateType::UsNutritionFacts | TemplateType::UsSupplements => Region::Us,
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown template type: {s}")))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Region {
    #[serde(rename = "AU")]
    Au,
    #[serde(rename = "US")]
    Us,
}

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Au => "AU",
            Region::Us => "US",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AU" => Ok(Region::Au),
            "US" => Ok(Region::Us),
            other => Err(AppError::validation(format!("Unknown region: {other}"))),
        }
    }
}

/// Region a template type is labelled for. Unknown strings are rejected, never guessed.
pub fn infer_region(template_type: &str) -> Result<Region, AppError> {
    Ok(template_type.parse::<TemplateType>()?.region())
}

/// Bottom border weight of a table row.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Thickness {
    #[default]
    Normal,
    Thick,
    MediumThick,
    LargeThick,
    ExtraLargeThick,
}

impl Thickness {
    pub fn border_width_px(self) -> u8 {
        match self {
            Thickness::Normal => 1,
            Thickness::Thick => 2,
            Thickness::MediumThick => 3,
            Thickness::LargeThick => 4,
            Thickness::ExtraLargeThick => 5,
        }
    }
}

/// Row of an AU panel: label plus per-serve and per-100g values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NutritionRow {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub per_serving: String,
    #[serde(default)]
    pub per_100g: String,
    #[serde(default)]
    pub thickness: Thickness,
}

impl NutritionRow {
    pub fn new(id: &str, label: &str, per_serving: &str, per_100g: &str) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            per_serving: per_serving.into(),
            per_100g: per_100g.into(),
            thickness: Thickness::Normal,
        }
    }
}

/// Row of a US panel. `indent_level` is derived from the nutrient's leading whitespace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsNutritionRow {
    pub id: String,
    pub nutrient: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub percent_daily_value: String,
    #[serde(default)]
    pub thickness: Thickness,
    #[serde(default)]
    pub indent_level: u32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl UsNutritionRow {
    pub fn new(id: &str, nutrient: &str, amount: &str, percent_daily_value: &str) -> Self {
        Self {
            id: id.into(),
            nutrient: nutrient.into(),
            amount: amount.into(),
            percent_daily_value: percent_daily_value.into(),
            thickness: Thickness::Normal,
            indent_level: infer_indent_level(nutrient),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_thickness(mut self, thickness: Thickness) -> Self {
        self.thickness = thickness;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_custom: bool,
}

impl TextSection {
    pub fn new(id: &str, title: &str, content: &str) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            is_custom: false,
        }
    }

    /// A user-added section; `n` is its 1-based position among custom sections.
    pub fn custom(n: usize) -> Self {
        Self {
            id: format!("custom-{n}"),
            title: format!("Custom Section {n}"),
            content: String::new(),
            is_custom: true,
        }
    }

    pub fn is_serving_line(&self) -> bool {
        matches!(
            self.id.as_str(),
            SERVING_SIZE_SECTION_ID | SERVINGS_PER_PACK_SECTION_ID | SERVINGS_PER_CONTAINER_SECTION_ID
        )
    }
}

fn default_true() -> bool {
    true
}

/// Content shared by the three AU panel templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuPanelContent {
    #[serde(default)]
    pub text_sections: Vec<TextSection>,
    #[serde(default)]
    pub nutritional_rows: Vec<NutritionRow>,
    #[serde(default = "default_true")]
    pub show_text_sections: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsNutritionFactsContent {
    #[serde(default)]
    pub text_sections: Vec<TextSection>,
    #[serde(default)]
    pub nutritional_rows: Vec<UsNutritionRow>,
    #[serde(default)]
    pub calories: String,
    #[serde(default = "default_true")]
    pub show_daily_value_footnote: bool,
    /// Empty means the standard FDA footnote wording.
    #[serde(default)]
    pub daily_value_footnote: String,
    #[serde(default = "default_true")]
    pub show_text_sections: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsSupplementsContent {
    #[serde(default)]
    pub text_sections: Vec<TextSection>,
    #[serde(default)]
    pub nutritional_rows: Vec<UsNutritionRow>,
    #[serde(default)]
    pub calories: String,
    #[serde(default)]
    pub other_ingredients: String,
    #[serde(default = "default_true")]
    pub show_daily_value_footnote: bool,
    #[serde(default)]
    pub daily_value_footnote: String,
    #[serde(default = "default_true")]
    pub show_text_sections: bool,
}

/// Structured, re-editable NIP content keyed by its template type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "template_type", content = "content", rename_all = "snake_case")]
pub enum NipContent {
    ProteinPowder(AuPanelContent),
    ComplexSupplements(AuPanelContent),
    Supplements(AuPanelContent),
    UsNutritionFacts(UsNutritionFactsContent),
    UsSupplements(UsSupplementsContent),
}

/// Which ordered list of a panel an edit applies to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PanelList {
    Rows,
    Sections,
}

impl NipContent {
    pub fn template_type(&self) -> TemplateType {
        match self {
            NipContent::ProteinPowder(_) => TemplateType::ProteinPowder,
            NipContent::ComplexSupplements(_) => TemplateType::ComplexSupplements,
            NipContent::Supplements(_) => TemplateType::Supplements,
            NipContent::UsNutritionFacts(_) => TemplateType::UsNutritionFacts,
            NipContent::UsSupplements(_) => TemplateType::UsSupplements,
        }
    }

    /// Rebuilds typed content from a stored template type string and content body.
    pub fn from_parts(template_type: &str, body: serde_json::Value) -> Result<Self, AppError> {
        let template_type: TemplateType = template_type.parse()?;
        let tagged = serde_json::json!({
            "template_type": template_type.as_str(),
            "content": body,
        });
        serde_json::from_value(tagged)
            .map_err(|e| AppError::validation(format!("invalid {template_type} content: {e}")))
    }

    /// The content body without its template tag, as persisted.
    pub fn body(&self) -> anyhow::Result<serde_json::Value> {
        let mut tagged = serde_json::to_value(self)?;
        Ok(tagged["content"].take())
    }

    pub fn text_sections(&self) -> &[TextSection] {
        match self {
            NipContent::ProteinPowder(c)
            | NipContent::ComplexSupplements(c)
            | NipContent::Supplements(c) => &c.text_sections,
            NipContent::UsNutritionFacts(c) => &c.text_sections,
            NipContent::UsSupplements(c) => &c.text_sections,
        }
    }

    pub fn text_sections_mut(&mut self) -> &mut Vec<TextSection> {
        match self {
            NipContent::ProteinPowder(c)
            | NipContent::ComplexSupplements(c)
            | NipContent::Supplements(c) => &mut c.text_sections,
            NipContent::UsNutritionFacts(c) => &mut c.text_sections,
            NipContent::UsSupplements(c) => &mut c.text_sections,
        }
    }

    pub fn row_ids(&self) -> Vec<&str> {
        match self {
            NipContent::ProteinPowder(c)
            | NipContent::ComplexSupplements(c)
            | NipContent::Supplements(c) => c.nutritional_rows.iter().map(|r| r.id.as_str()).collect(),
            NipContent::UsNutritionFacts(c) => {
                c.nutritional_rows.iter().map(|r| r.id.as_str()).collect()
            }
            NipContent::UsSupplements(c) => c.nutritional_rows.iter().map(|r| r.id.as_str()).collect(),
        }
    }

    /// Checks the identity invariants: every row and section id is non-empty and unique.
    pub fn validate(&self) -> Result<(), AppError> {
        check_ids("row", self.row_ids())?;
        check_ids(
            "section",
            self.text_sections().iter().map(|s| s.id.as_str()).collect(),
        )
    }

    /// Re-derives cached properties (US indent levels) from the editable text.
    pub fn normalize(&mut self) {
        let rows = match self {
            NipContent::UsNutritionFacts(c) => &mut c.nutritional_rows,
            NipContent::UsSupplements(c) => &mut c.nutritional_rows,
            _ => return,
        };
        for row in rows {
            row.indent_level = infer_indent_level(&row.nutrient);
        }
    }

    /// Moves one row or section to a new position, shifting the others.
    pub fn move_item(&mut self, list: PanelList, from: usize, to: usize) -> Result<(), AppError> {
        match list {
            PanelList::Sections => move_item(self.text_sections_mut(), from, to),
            PanelList::Rows => match self {
                NipContent::ProteinPowder(c)
                | NipContent::ComplexSupplements(c)
                | NipContent::Supplements(c) => move_item(&mut c.nutritional_rows, from, to),
                NipContent::UsNutritionFacts(c) => move_item(&mut c.nutritional_rows, from, to),
                NipContent::UsSupplements(c) => move_item(&mut c.nutritional_rows, from, to),
            },
        }
    }
}

fn check_ids(kind: &str, ids: Vec<&str>) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(AppError::validation(format!("{kind} id must not be empty")));
        }
        if !seen.insert(id) {
            return Err(AppError::validation(format!("duplicate {kind} id: {id}")));
        }
    }
    Ok(())
}

/// Removes the element at `from` and reinserts it at `to`.
pub fn move_item<T>(list: &mut Vec<T>, from: usize, to: usize) -> Result<(), AppError> {
    let len = list.len();
    if from >= len || to >= len {
        return Err(AppError::validation(format!(
            "cannot move item {from} to {to} in a list of {len}"
        )));
    }
    let item = list.remove(from);
    list.insert(to, item);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_inference_follows_template_family() {
        assert_eq!(infer_region("protein_powder").unwrap(), Region::Au);
        assert_eq!(infer_region("supplements").unwrap(), Region::Au);
        assert_eq!(infer_region("complex_supplements").unwrap(), Region::Au);
        assert_eq!(infer_region("us_nutrition_facts").unwrap(), Region::Us);
        assert_eq!(infer_region("us_supplements").unwrap(), Region::Us);
    }

    #[test]
    fn region_inference_rejects_unknown_type() {
        let err = infer_region("unknown_type").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn thickness_widths() {
        let widths: Vec<u8> = [
            Thickness::Normal,
            Thickness::Thick,
            Thickness::MediumThick,
            Thickness::LargeThick,
            Thickness::ExtraLargeThick,
        ]
        .into_iter()
        .map(Thickness::border_width_px)
        .collect();
        assert_eq!(widths, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn thickness_uses_kebab_case_and_defaults_to_normal() {
        let row: NutritionRow =
            serde_json::from_str(r#"{"id":"a","label":"Energy","thickness":"extra-large-thick"}"#)
                .unwrap();
        assert_eq!(row.thickness, Thickness::ExtraLargeThick);

        let row: NutritionRow = serde_json::from_str(r#"{"id":"a","label":"Energy"}"#).unwrap();
        assert_eq!(row.thickness, Thickness::Normal);
        assert_eq!(row.per_serving, "");
    }

    #[test]
    fn content_round_trips_through_stored_parts() {
        let content = NipContent::ProteinPowder(AuPanelContent {
            text_sections: vec![
                TextSection::new("ingredients", "Ingredients", "Whey <b>(milk)</b>"),
                TextSection::custom(1),
            ],
            nutritional_rows: vec![
                NutritionRow::new("energy", "Energy", "500kJ", "1600kJ"),
                NutritionRow {
                    thickness: Thickness::Thick,
                    ..NutritionRow::new("protein", "Protein", "24g", "80g")
                },
            ],
            show_text_sections: false,
        });

        let body = content.body().unwrap();
        assert!(body.get("template_type").is_none());
        let restored = NipContent::from_parts("protein_powder", body).unwrap();
        assert_eq!(restored, content);
    }

    #[test]
    fn from_parts_rejects_unknown_type() {
        let err = NipContent::from_parts("granola", serde_json::json!({})).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn show_text_sections_defaults_to_true() {
        let content = NipContent::from_parts("supplements", serde_json::json!({})).unwrap();
        match content {
            NipContent::Supplements(c) => assert!(c.show_text_sections),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_empty_and_duplicate_ids() {
        let mut content = AuPanelContent {
            text_sections: vec![],
            nutritional_rows: vec![NutritionRow::new("", "Energy", "", "")],
            show_text_sections: true,
        };
        assert!(NipContent::Supplements(content.clone()).validate().is_err());

        content.nutritional_rows = vec![
            NutritionRow::new("a", "Energy", "", ""),
            NutritionRow::new("a", "Protein", "", ""),
        ];
        let err = NipContent::Supplements(content.clone()).validate().unwrap_err();
        assert!(err.to_string().contains("duplicate row id"));

        content.nutritional_rows.pop();
        assert!(NipContent::Supplements(content).validate().is_ok());
    }

    #[test]
    fn normalize_rederives_indent_levels() {
        let mut row = UsNutritionRow::new("sat", "    Saturated Fat", "1g", "5%");
        row.indent_level = 7;
        let mut content = NipContent::UsNutritionFacts(UsNutritionFactsContent {
            text_sections: vec![],
            nutritional_rows: vec![row],
            calories: "120".into(),
            show_daily_value_footnote: true,
            daily_value_footnote: String::new(),
            show_text_sections: true,
        });
        content.normalize();
        match content {
            NipContent::UsNutritionFacts(c) => assert_eq!(c.nutritional_rows[0].indent_level, 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn move_item_shifts_neighbours() {
        let mut list = vec!["a", "b", "c", "d"];
        move_item(&mut list, 0, 2).unwrap();
        assert_eq!(list, vec!["b", "c", "a", "d"]);
        move_item(&mut list, 3, 0).unwrap();
        assert_eq!(list, vec!["d", "b", "c", "a"]);
        assert!(move_item(&mut list, 4, 0).is_err());
    }

    #[test]
    fn custom_sections_get_default_titles() {
        let section = TextSection::custom(3);
        assert_eq!(section.title, "Custom Section 3");
        assert!(section.is_custom);
        assert!(!section.is_serving_line());
    }
}
