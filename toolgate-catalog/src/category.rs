//! Grouping of operations into tag-derived categories.

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::OperationCatalog;
use crate::descriptor::OperationDescriptor;

/// Bucket for operations that declare no usable tag.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// One named group of operations, sharing descriptors with the catalog.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Category {
    name: String,
    operations: Vec<Arc<OperationDescriptor>>,
}

impl Category {
    /// Category name, taken from the trimmed primary tag.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member operations in declaration order.
    #[must_use]
    pub fn operations(&self) -> &[Arc<OperationDescriptor>] {
        &self.operations
    }

    /// Number of member operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the category has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Ordered partition of a catalog into categories.
///
/// Every operation belongs to exactly one category. Categories appear in
/// the order their first member was declared.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CategoryIndex {
    categories: Vec<Category>,
}

impl CategoryIndex {
    /// Partitions the catalog by primary tag.
    #[must_use]
    pub fn build(catalog: &OperationCatalog) -> Self {
        Self::from_operations(catalog.operations().iter())
    }

    fn from_operations<'a>(operations: impl Iterator<Item = &'a Arc<OperationDescriptor>>) -> Self {
        let mut categories: Vec<Category> = Vec::new();
        for operation in operations {
            let name = operation.primary_tag().unwrap_or(UNCATEGORIZED);
            match categories.iter_mut().find(|category| category.name == name) {
                Some(category) => category.operations.push(Arc::clone(operation)),
                None => categories.push(Category {
                    name: name.to_owned(),
                    operations: vec![Arc::clone(operation)],
                }),
            }
        }
        Self { categories }
    }

    /// Returns a view keeping only operations accepted by `keep`.
    ///
    /// Categories left without members are dropped; relative order is kept.
    #[must_use]
    pub fn filtered(&self, mut keep: impl FnMut(&OperationDescriptor) -> bool) -> Self {
        let categories = self
            .categories
            .iter()
            .filter_map(|category| {
                let operations: Vec<_> = category
                    .operations
                    .iter()
                    .filter(|operation| keep(operation))
                    .map(Arc::clone)
                    .collect();
                (!operations.is_empty()).then(|| Category {
                    name: category.name.clone(),
                    operations,
                })
            })
            .collect();
        Self { categories }
    }

    /// Categories in first-occurrence order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Looks up a category by exact, case-sensitive name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    /// Total number of operations across all categories.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.categories.iter().map(Category::len).sum()
    }

    /// Whether the index holds no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
