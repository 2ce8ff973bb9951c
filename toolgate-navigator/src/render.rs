//! Plain-text results of the navigation tools.

use std::fmt::Write as _;

use toolgate_catalog::{Category, CategoryIndex};
use toolgate_primitives::HttpMethod;

pub(crate) const RETURNED: &str =
    "Returned to category browser. Use browse_categories() to pick a new category.";

pub(crate) const NO_SELECTION: &str = "No category selected. Use browse_categories() to explore.";

/// Category list with per-category and total counts.
pub(crate) fn category_list(index: &CategoryIndex) -> String {
    if index.is_empty() {
        return "No categories found.".to_owned();
    }

    let mut out = String::from("Available Categories:\n\n");
    for category in index.categories() {
        let _ = writeln!(out, "- {}: {} tools", category.name(), category.len());
    }
    let _ = write!(
        out,
        "\nTotal: {} categories, {} tools\n\nUse select_category(\"Category Name\") to explore a category.",
        index.categories().len(),
        index.operation_count()
    );
    out
}

/// Operations of one category grouped by method.
pub(crate) fn category_tools(category: &Category) -> String {
    let mut out = format!("{} Tools ({} available):\n", category.name(), category.len());

    for method in HttpMethod::ALL {
        let mut members = category
            .operations()
            .iter()
            .filter(|op| op.method() == method)
            .peekable();
        if members.peek().is_none() {
            continue;
        }
        let _ = writeln!(out, "\n{method} Operations:");
        for op in members {
            let _ = writeln!(out, "  - {}: {}", op.id(), op.display_summary());
        }
    }

    out.push_str("\nUse back_to_categories() to return to the category list.");
    out
}
