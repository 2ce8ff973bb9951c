//! Local `$ref` resolution against the loaded document.

use serde_json::{Map, Value};
use thiserror::Error;

const MAX_DEPTH: usize = 64;

/// Reference failures. Each one disqualifies only the operation that hit it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefError {
    /// The pointer does not lead anywhere inside the document.
    #[error("unresolved reference `{0}`")]
    Dangling(String),
    /// References into other documents are not followed.
    #[error("external reference `{0}` is not supported")]
    External(String),
    /// Reference chain nested beyond the supported depth.
    #[error("reference `{0}` nests too deeply")]
    TooDeep(String),
}

/// Resolves `#/...` JSON pointers inside one document.
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    root: &'a Value,
}

impl<'a> RefResolver<'a> {
    /// Creates a resolver over the document root.
    #[must_use]
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// Looks up the target of a single reference string.
    ///
    /// # Errors
    ///
    /// Returns [`RefError::External`] for references that do not start with
    /// `#`, and [`RefError::Dangling`] when the pointer has no target.
    pub fn lookup(&self, reference: &str) -> Result<&'a Value, RefError> {
        let Some(pointer) = reference.strip_prefix('#') else {
            return Err(RefError::External(reference.to_owned()));
        };
        if pointer.is_empty() {
            return Ok(self.root);
        }
        self.root
            .pointer(pointer)
            .ok_or_else(|| RefError::Dangling(reference.to_owned()))
    }

    /// Follows a chain of `$ref` objects until a concrete value is reached.
    ///
    /// # Errors
    ///
    /// Propagates lookup failures, and returns [`RefError::TooDeep`] for
    /// chains that never terminate.
    pub fn follow(&self, value: &'a Value) -> Result<&'a Value, RefError> {
        let mut current = value;
        for _ in 0..MAX_DEPTH {
            match ref_target(current) {
                Some(reference) => current = self.lookup(reference)?,
                None => return Ok(current),
            }
        }
        Err(RefError::TooDeep(
            ref_target(current).unwrap_or_default().to_owned(),
        ))
    }

    /// Returns a copy of `value` with every nested reference inlined.
    ///
    /// Self-referential schemas are cut at the point of recursion and replaced
    /// by an open schema.
    ///
    /// # Errors
    ///
    /// Fails on the first dangling or external reference found anywhere in
    /// the tree.
    pub fn inline(&self, value: &Value) -> Result<Value, RefError> {
        let mut stack = Vec::new();
        self.inline_inner(value, &mut stack)
    }

    fn inline_inner(&self, value: &Value, stack: &mut Vec<String>) -> Result<Value, RefError> {
        match value {
            Value::Object(map) => {
                if let Some(reference) = ref_target(value) {
                    if stack.iter().any(|seen| seen == reference) {
                        return Ok(Value::Object(Map::new()));
                    }
                    if stack.len() >= MAX_DEPTH {
                        return Err(RefError::TooDeep(reference.to_owned()));
                    }
                    let target = self.lookup(reference)?;
                    stack.push(reference.to_owned());
                    let resolved = self.inline_inner(target, stack);
                    stack.pop();
                    let mut resolved = resolved?;

                    if let Value::Object(resolved_map) = &mut resolved {
                        for (key, sibling) in map.iter().filter(|(key, _)| *key != "$ref") {
                            resolved_map.insert(key.clone(), self.inline_inner(sibling, stack)?);
                        }
                    }
                    return Ok(resolved);
                }

                let mut out = Map::with_capacity(map.len());
                for (key, child) in map {
                    out.insert(key.clone(), self.inline_inner(child, stack)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.inline_inner(item, stack))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }
}

fn ref_target(value: &Value) -> Option<&str> {
    value.get("$ref").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "components": {
                "schemas": {
                    "Dag": {
                        "type": "object",
                        "properties": {
                            "dag_id": {"type": "string"},
                            "owner": {"$ref": "#/components/schemas/Owner"}
                        }
                    },
                    "Owner": {"type": "string"},
                    "Node": {
                        "type": "object",
                        "properties": {"children": {"type": "array", "items": {"$ref": "#/components/schemas/Node"}}}
                    },
                    "Alias": {"$ref": "#/components/schemas/Owner"}
                }
            }
        })
    }

    #[test]
    fn inlines_nested_references() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        let inlined = resolver
            .inline(&json!({"$ref": "#/components/schemas/Dag"}))
            .unwrap();
        assert_eq!(inlined["properties"]["owner"], json!({"type": "string"}));
    }

    #[test]
    fn dangling_reference_reported() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        let err = resolver
            .inline(&json!({"items": {"$ref": "#/components/schemas/Missing"}}))
            .expect_err("dangling");
        assert_eq!(
            err,
            RefError::Dangling("#/components/schemas/Missing".into())
        );
    }

    #[test]
    fn external_reference_rejected() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        let err = resolver.lookup("other.yaml#/Foo").expect_err("external");
        assert!(matches!(err, RefError::External(_)));
    }

    #[test]
    fn recursive_schema_is_cut() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        let inlined = resolver
            .inline(&json!({"$ref": "#/components/schemas/Node"}))
            .unwrap();
        assert_eq!(
            inlined["properties"]["children"]["items"],
            json!({})
        );
    }

    #[test]
    fn follow_walks_alias_chain() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        let alias = json!({"$ref": "#/components/schemas/Alias"});
        let target = resolver.follow(&alias).unwrap();
        assert_eq!(target, &json!({"type": "string"}));
    }
}
