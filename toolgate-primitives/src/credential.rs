//! Bearer credential forwarded verbatim to the described API.

use std::fmt::{self, Debug, Formatter};

use crate::error::{Error, Result};

/// Caller-supplied bearer token.
///
/// The token is never inspected, only attached to outbound requests. Its
/// `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] if the token is blank or contains
    /// characters that cannot appear in an HTTP header value.
    pub fn bearer(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::InvalidCredential {
                reason: "token cannot be empty",
            });
        }
        if token.chars().any(|c| c.is_control()) {
            return Err(Error::InvalidCredential {
                reason: "token contains control characters",
            });
        }
        Ok(Self(token.to_owned()))
    }

    /// Parses an `Authorization` header value of the form `Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] when the scheme is not `Bearer` or
    /// the token is blank.
    pub fn from_authorization_header(value: &str) -> Result<Self> {
        let value = value.trim();
        match value.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => Self::bearer(token),
            _ => Err(Error::InvalidCredential {
                reason: "authorization header must use the Bearer scheme",
            }),
        }
    }

    /// Returns the raw token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.0
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
