//! Externally visible tool descriptors.

use serde::Serialize;
use serde_json::{Value, json};
use toolgate_catalog::OperationDescriptor;
use toolgate_primitives::OperationId;

/// Fixed navigation actions of the hierarchical surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationTool {
    /// List visible categories with counts.
    BrowseCategories,
    /// Enter a category.
    SelectCategory,
    /// Describe the selected category.
    GetCurrentCategory,
    /// Return to the category list.
    BackToCategories,
}

impl NavigationTool {
    /// Every navigation tool.
    pub const ALL: [Self; 4] = [
        Self::BrowseCategories,
        Self::SelectCategory,
        Self::GetCurrentCategory,
        Self::BackToCategories,
    ];

    /// Tool name as listed to agents.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BrowseCategories => "browse_categories",
            Self::SelectCategory => "select_category",
            Self::GetCurrentCategory => "get_current_category",
            Self::BackToCategories => "back_to_categories",
        }
    }

    /// Parses a tool name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    fn description(self) -> &'static str {
        match self {
            Self::BrowseCategories => "Show all available API categories with tool counts",
            Self::SelectCategory => "Switch to the tools for a specific category",
            Self::GetCurrentCategory => "Get the currently selected category",
            Self::BackToCategories => "Return to browsing all categories",
        }
    }

    fn input_schema(self) -> Value {
        match self {
            Self::SelectCategory => json!({
                "type": "object",
                "properties": {
                    "category": {
                        "type": "string",
                        "description": "Category name returned by browse_categories"
                    }
                },
                "required": ["category"],
                "additionalProperties": false
            }),
            _ => json!({"type": "object", "properties": {}, "additionalProperties": false}),
        }
    }
}

/// What a tool does when called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum ToolBinding {
    /// A navigation action.
    Navigation(NavigationTool),
    /// A catalog operation.
    Operation(OperationId),
}

/// One listed tool. Built fresh for every listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    input_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_schema: Option<Value>,
    binding: ToolBinding,
}

impl ToolDescriptor {
    /// Descriptor of a navigation tool.
    #[must_use]
    pub fn navigation(tool: NavigationTool) -> Self {
        Self {
            name: tool.name().to_owned(),
            description: tool.description().to_owned(),
            input_schema: tool.input_schema(),
            output_schema: None,
            binding: ToolBinding::Navigation(tool),
        }
    }

    /// Descriptor of an operation tool.
    #[must_use]
    pub fn operation(operation: &OperationDescriptor) -> Self {
        Self {
            name: operation.id().to_string(),
            description: operation.display_description(),
            input_schema: operation.input_schema().clone(),
            output_schema: operation.response_schema().cloned(),
            binding: ToolBinding::Operation(operation.id().clone()),
        }
    }

    /// Tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tool description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// JSON schema of accepted arguments.
    #[must_use]
    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// JSON schema of a successful result, when known.
    #[must_use]
    pub fn output_schema(&self) -> Option<&Value> {
        self.output_schema.as_ref()
    }

    /// What the tool is bound to.
    #[must_use]
    pub fn binding(&self) -> &ToolBinding {
        &self.binding
    }
}
