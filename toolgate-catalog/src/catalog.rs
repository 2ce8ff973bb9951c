//! The immutable set of operations described by one loaded document.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use toolgate_primitives::{HttpMethod, OperationId};
use tracing::{debug, warn};

use crate::descriptor::{OperationDescriptor, describe};
use crate::error::{CatalogError, CatalogResult, RejectedOperation};
use crate::resolver::RefResolver;

/// Path item keys that never name an operation.
const NON_OPERATION_KEYS: [&str; 5] = ["parameters", "summary", "description", "servers", "$ref"];

/// Tool names owned by the navigation surface. Operations may not reuse them.
pub const RESERVED_TOOL_NAMES: [&str; 4] = [
    "browse_categories",
    "select_category",
    "get_current_category",
    "back_to_categories",
];

/// Operations described by an API document, in declaration order.
///
/// Built once per load and shared read-only afterwards. Descriptors are
/// reference counted so category views share them with the catalog.
#[derive(Debug, Clone, Default)]
pub struct OperationCatalog {
    title: Option<String>,
    version: Option<String>,
    operations: Vec<Arc<OperationDescriptor>>,
    index: HashMap<OperationId, usize>,
    rejected: Vec<RejectedOperation>,
}

impl OperationCatalog {
    /// Builds the catalog from a parsed document.
    ///
    /// Operations that cannot be described are skipped and recorded in
    /// [`OperationCatalog::rejected`]; the remaining ones are still loaded.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] when the root is not an object or
    /// lacks the `openapi`, `info`, or `paths` fields.
    pub fn from_document(document: &Value) -> CatalogResult<Self> {
        let Some(root) = document.as_object() else {
            return Err(CatalogError::invalid("document root must be an object"));
        };
        if !root.get("openapi").is_some_and(Value::is_string) {
            return Err(CatalogError::invalid("missing `openapi` version field"));
        }
        let Some(info) = root.get("info").and_then(Value::as_object) else {
            return Err(CatalogError::invalid("missing `info` object"));
        };
        let Some(paths) = root.get("paths").and_then(Value::as_object) else {
            return Err(CatalogError::invalid("missing `paths` object"));
        };

        let resolver = RefResolver::new(document);
        let mut catalog = Self {
            title: info.get("title").and_then(Value::as_str).map(str::to_owned),
            version: info.get("version").and_then(Value::as_str).map(str::to_owned),
            ..Self::default()
        };

        for (path, item) in paths {
            let item = match resolver.follow(item) {
                Ok(item) => item,
                Err(err) => {
                    catalog.reject(None, path, None, err.to_string());
                    continue;
                }
            };
            let Some(entries) = item.as_object() else {
                catalog.reject(None, path, None, "path item must be an object".into());
                continue;
            };

            for (key, operation) in entries {
                if NON_OPERATION_KEYS.contains(&key.as_str()) || key.starts_with("x-") {
                    continue;
                }
                let Ok(method) = key.parse::<HttpMethod>() else {
                    debug!(path = %path, key = %key, "ignoring unknown path item key");
                    continue;
                };

                match describe(&resolver, method, path, item, operation) {
                    Ok(descriptor) => catalog.insert(descriptor),
                    Err(err) => {
                        let declared = operation
                            .get("operationId")
                            .and_then(Value::as_str)
                            .map(str::to_owned);
                        catalog.reject(Some(method), path, declared, err.to_string());
                    }
                }
            }
        }

        debug!(
            operations = catalog.operations.len(),
            rejected = catalog.rejected.len(),
            "operation catalog built"
        );
        Ok(catalog)
    }

    fn insert(&mut self, descriptor: OperationDescriptor) {
        let id = descriptor.id().to_string();
        let conflict = if RESERVED_TOOL_NAMES.contains(&id.as_str()) {
            Some(format!("operation id `{id}` collides with a navigation tool"))
        } else if self.index.contains_key(descriptor.id()) {
            Some(format!("duplicate operation id `{id}`"))
        } else {
            None
        };
        if let Some(reason) = conflict {
            self.reject(Some(descriptor.method()), descriptor.path(), Some(id), reason);
            return;
        }
        self.index
            .insert(descriptor.id().clone(), self.operations.len());
        self.operations.push(Arc::new(descriptor));
    }

    fn reject(
        &mut self,
        method: Option<HttpMethod>,
        path: &str,
        operation_id: Option<String>,
        reason: String,
    ) {
        let method = method.map_or("*", HttpMethod::as_str);
        warn!(method, path, reason = %reason, "operation rejected");
        self.rejected.push(RejectedOperation {
            method: method.to_owned(),
            path: path.to_owned(),
            operation_id,
            reason,
        });
    }

    /// Returns the descriptor with the given identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&OperationDescriptor> {
        let id = OperationId::new(id).ok()?;
        self.index.get(&id).map(|&position| &*self.operations[position])
    }

    /// All loaded operations in declaration order.
    #[must_use]
    pub fn operations(&self) -> &[Arc<OperationDescriptor>] {
        &self.operations
    }

    /// Operations excluded during load.
    #[must_use]
    pub fn rejected(&self) -> &[RejectedOperation] {
        &self.rejected
    }

    /// Document title from `info.title`.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Document version from `info.version`.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Number of loaded operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether no operation was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
