//! Text preparation applied to every user-entered string right before it is
//! embedded in panel markup. Stored content is never kept in converted form.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

pub const DEFAULT_TAB_SIZE: usize = 4;

/// Pixels of left padding per US indent level.
pub const INDENT_STEP_PX: u32 = 16;

/// Expands tabs to `tab_size` spaces, then turns every run of N >= 2 spaces into
/// N-1 `&nbsp;` entities followed by one plain space. Single spaces are untouched.
pub fn convert_tabs_for_html(text: &str, tab_size: usize) -> String {
    lazy_static! {
        static ref SPACE_RUN: Regex = Regex::new(r" {2,}").unwrap();
    }
    let expanded = text.replace('\t', &" ".repeat(tab_size));
    SPACE_RUN
        .replace_all(&expanded, |caps: &Captures| {
            let run = caps[0].len();
            format!("{} ", "&nbsp;".repeat(run - 1))
        })
        .into_owned()
}

/// Rewrites the editor's `<b>`/`<i>` markers as `<strong>`/`<em>`.
pub fn convert_formatting_for_html(text: &str) -> String {
    text.replace("<b>", "<strong>")
        .replace("</b>", "</strong>")
        .replace("<i>", "<em>")
        .replace("</i>", "</em>")
}

/// Both conversions, in the order they must run. Apply exactly once per field.
pub fn prepare_for_html(text: &str) -> String {
    convert_formatting_for_html(&convert_tabs_for_html(text, DEFAULT_TAB_SIZE))
}

/// Indent level of a US label: leading tabs count 4, leading spaces 1, divided by 4.
pub fn infer_indent_level(label: &str) -> u32 {
    let width: usize = label
        .chars()
        .take_while(|c| *c == '\t' || *c == ' ')
        .map(|c| if c == '\t' { DEFAULT_TAB_SIZE } else { 1 })
        .sum();
    (width / DEFAULT_TAB_SIZE) as u32
}
