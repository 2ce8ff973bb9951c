//! Browse → select → operate surface.

use serde_json::Value;
use toolgate_catalog::CategoryIndex;

use crate::dispatch::{CallOutcome, ToolOutput};
use crate::error::{ErrorKind, ToolFailure};
use crate::navigation::{NavigationEvent, NavigationState};
use crate::render;
use crate::tools::{NavigationTool, ToolDescriptor};

/// Whether `tool` is offered in `state`.
#[must_use]
pub fn offered(state: &NavigationState, tool: NavigationTool) -> bool {
    match state {
        NavigationState::AtTop => matches!(
            tool,
            NavigationTool::BrowseCategories | NavigationTool::SelectCategory
        ),
        NavigationState::InCategory(_) => matches!(
            tool,
            NavigationTool::GetCurrentCategory | NavigationTool::BackToCategories
        ),
    }
}

/// Tools listed for `state` over the visible index.
#[must_use]
pub fn list(index: &CategoryIndex, state: &NavigationState) -> Vec<ToolDescriptor> {
    let mut tools: Vec<ToolDescriptor> = NavigationTool::ALL
        .into_iter()
        .filter(|tool| offered(state, *tool))
        .map(ToolDescriptor::navigation)
        .collect();

    if let Some(category) = state.category().and_then(|name| index.get(name)) {
        tools.extend(
            category
                .operations()
                .iter()
                .map(AsRef::as_ref)
                .map(ToolDescriptor::operation),
        );
    }
    tools
}

/// Runs one navigation tool, updating `state` in place.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidArguments`] when `select_category` lacks a
/// `category` string and [`ErrorKind::CategoryNotFound`] for an unknown or
/// fully hidden category.
pub fn navigate(
    index: &CategoryIndex,
    state: &mut NavigationState,
    tool: NavigationTool,
    arguments: &Value,
) -> Result<CallOutcome, ToolFailure> {
    match tool {
        NavigationTool::BrowseCategories => Ok(CallOutcome::new(
            ToolOutput::Text(render::category_list(index)),
            false,
        )),
        NavigationTool::SelectCategory => {
            let name = arguments
                .get("category")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| {
                    ToolFailure::invalid_arguments("Missing required argument 'category'")
                })?;

            let before = state.clone();
            state
                .transition(NavigationEvent::Select(name.to_owned()), index)
                .map_err(|err| ToolFailure::new(ErrorKind::CategoryNotFound, err.to_string()))?;

            let text = index
                .get(name)
                .map_or_else(|| render::NO_SELECTION.to_owned(), render::category_tools);
            Ok(CallOutcome::new(ToolOutput::Text(text), *state != before))
        }
        NavigationTool::GetCurrentCategory => {
            let text = state
                .category()
                .and_then(|name| index.get(name))
                .map_or_else(|| render::NO_SELECTION.to_owned(), render::category_tools);
            Ok(CallOutcome::new(ToolOutput::Text(text), false))
        }
        NavigationTool::BackToCategories => {
            let changed = *state != NavigationState::AtTop;
            state
                .transition(NavigationEvent::Return, index)
                .map_err(|err| ToolFailure::new(ErrorKind::CategoryNotFound, err.to_string()))?;
            Ok(CallOutcome::new(
                ToolOutput::Text(render::RETURNED.to_owned()),
                changed,
            ))
        }
    }
}
