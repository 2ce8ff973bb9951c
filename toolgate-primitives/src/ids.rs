//! Operation and session identifier types.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

const MAX_OPERATION_ID_LEN: usize = 256;
const MAX_SESSION_ID_LEN: usize = 128;

/// Stable identifier of one described operation, unique within a loaded catalog.
///
/// Doubles as the externally visible tool name for that operation.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OperationId(String);

impl OperationId {
    /// Creates a new operation identifier after validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperationId`] if the identifier is empty, too
    /// long, or contains characters outside `[A-Za-z0-9_.-]`.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        validate_operation_id(&id)?;
        Ok(Self(id))
    }

    /// Derives an identifier for an operation that declares no `operationId`.
    ///
    /// The method is lower-cased and joined to the path with slashes turned
    /// into underscores and template braces removed, so `POST /dags/{id}`
    /// becomes `post_dags_id`. Characters that are not valid in an identifier
    /// are replaced by underscores.
    #[must_use]
    pub fn fallback(method: &str, path: &str) -> Self {
        let trimmed = path.trim_matches('/');
        let mut id = method.to_ascii_lowercase();
        id.push('_');
        for c in trimmed.chars() {
            match c {
                '{' | '}' => {}
                c if is_id_char(c) => id.push(c),
                _ => id.push('_'),
            }
        }
        id.truncate(MAX_OPERATION_ID_LEN);
        Self(id)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OperationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<OperationId> for String {
    fn from(value: OperationId) -> Self {
        value.0
    }
}

impl TryFrom<String> for OperationId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn validate_operation_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::InvalidOperationId {
            id: String::new(),
            reason: "identifier cannot be empty".into(),
        });
    }

    if id.len() > MAX_OPERATION_ID_LEN {
        return Err(Error::InvalidOperationId {
            id: id.into(),
            reason: format!("identifier length must be <= {MAX_OPERATION_ID_LEN}"),
        });
    }

    if !id.chars().all(is_id_char) {
        return Err(Error::InvalidOperationId {
            id: id.into(),
            reason: "identifier must contain only alphanumeric, dash, underscore, or dot".into(),
        });
    }

    Ok(())
}

/// Identity of one logical caller (connection or protocol session).
///
/// Navigation state is keyed by this value so concurrent callers never
/// observe each other's category selection.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a transport-supplied session identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSessionId`] if the identity is blank or longer
    /// than the supported maximum.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::InvalidSessionId {
                reason: "session id cannot be empty".into(),
            });
        }
        if id.len() > MAX_SESSION_ID_LEN {
            return Err(Error::InvalidSessionId {
                reason: format!("session id length must be <= {MAX_SESSION_ID_LEN}"),
            });
        }
        Ok(Self(id))
    }

    /// Generates a random session identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::random()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_id_accepts_common_styles() {
        assert!(OperationId::new("get_dags").is_ok());
        assert!(OperationId::new("listPetsByTag").is_ok());
        assert!(OperationId::new("v1.dags-list").is_ok());
    }

    #[test]
    fn operation_id_rejects_bad_input() {
        let err = OperationId::new("").expect_err("empty id");
        assert!(matches!(err, Error::InvalidOperationId { .. }));

        let err = OperationId::new("get dags").expect_err("space");
        assert!(matches!(err, Error::InvalidOperationId { id, .. } if id == "get dags"));
    }

    #[test]
    fn fallback_strips_template_braces() {
        let id = OperationId::fallback("POST", "/api/v1/dags/{dag_id}");
        assert_eq!(id.as_str(), "post_api_v1_dags_dag_id");
    }

    #[test]
    fn fallback_for_root_path() {
        assert_eq!(OperationId::fallback("get", "/").as_str(), "get_");
    }

    #[test]
    fn operation_id_deserialization_validates() {
        let ok: OperationId = serde_json::from_str("\"get_dag\"").expect("valid");
        assert_eq!(ok.as_str(), "get_dag");
        assert!(serde_json::from_str::<OperationId>("\"bad id\"").is_err());
    }

    #[test]
    fn random_session_ids_differ() {
        assert_ne!(SessionId::random(), SessionId::random());
    }

    #[test]
    fn blank_session_id_rejected() {
        assert!(" ".parse::<SessionId>().is_err());
        assert_eq!("conn-7".parse::<SessionId>().unwrap().as_str(), "conn-7");
    }
}
