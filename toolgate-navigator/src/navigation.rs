//! Per-session position in the category hierarchy.

use serde::Serialize;
use thiserror::Error;
use toolgate_catalog::{Category, CategoryIndex};
use tracing::debug;

/// Where an agent currently is in the hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", content = "category", rename_all = "snake_case")]
pub enum NavigationState {
    /// Browsing the category list.
    #[default]
    AtTop,
    /// Inside one category.
    InCategory(String),
}

impl NavigationState {
    /// Name of the selected category, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::AtTop => None,
            Self::InCategory(name) => Some(name),
        }
    }

    /// Applies a navigation event against the visible index.
    ///
    /// The state is replaced only when the transition succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::CategoryNotFound`] when selecting a name
    /// that has no visible members; the state is left unchanged.
    pub fn transition(
        &mut self,
        event: NavigationEvent,
        index: &CategoryIndex,
    ) -> NavigationResult<&Self> {
        let next = match event {
            NavigationEvent::Select(name) => {
                if index.get(&name).is_none() {
                    let mut available: Vec<&str> =
                        index.categories().iter().map(Category::name).collect();
                    available.sort_unstable();
                    return Err(NavigationError::CategoryNotFound {
                        name,
                        available: available.into_iter().map(str::to_owned).collect(),
                    });
                }
                Self::InCategory(name)
            }
            NavigationEvent::Return => Self::AtTop,
        };

        if next != *self {
            debug!(from = ?self, to = ?next, "navigation transition");
            *self = next;
        }
        Ok(self)
    }
}

/// Events that move between navigation states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// Enter the named category.
    Select(String),
    /// Go back to the category list.
    Return,
}

/// Errors emitted by navigation transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    /// The category does not exist or has no visible members.
    #[error("Category '{name}' not found. Available categories: {}", display_list(.available))]
    CategoryNotFound {
        /// Requested name.
        name: String,
        /// Visible category names, sorted.
        available: Vec<String>,
    },
}

fn display_list(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_owned()
    } else {
        names.join(", ")
    }
}

/// Result alias used for navigation.
pub type NavigationResult<T> = Result<T, NavigationError>;
