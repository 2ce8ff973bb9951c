//! Structural safety classification of operations.

use toolgate_primitives::{HttpMethod, SafetyClass};

/// Classifies an operation by its HTTP method alone.
///
/// `GET` is the only read verb; everything else is treated as mutating.
/// There are no per-path overrides.
#[must_use]
pub const fn classify(method: HttpMethod) -> SafetyClass {
    match method {
        HttpMethod::Get => SafetyClass::Safe,
        HttpMethod::Post
        | HttpMethod::Put
        | HttpMethod::Patch
        | HttpMethod::Delete
        | HttpMethod::Head
        | HttpMethod::Options
        | HttpMethod::Trace => SafetyClass::Unsafe,
    }
}
