//! API description loading and operation indexing.
//!
//! A document is fetched or read once by [`SpecLoader`], parsed into an
//! immutable [`OperationCatalog`] of [`OperationDescriptor`]s, and grouped
//! into a [`CategoryIndex`] by primary tag. Every descriptor carries a
//! [`toolgate_primitives::SafetyClass`] computed by [`classify`].

#![warn(missing_docs, clippy::pedantic)]

pub mod catalog;
pub mod category;
pub mod classifier;
pub mod descriptor;
pub mod error;
pub mod loader;
pub mod resolver;

pub use catalog::{OperationCatalog, RESERVED_TOOL_NAMES};
pub use category::{Category, CategoryIndex, UNCATEGORIZED};
pub use classifier::classify;
pub use descriptor::{
    BodyShape, OperationDescriptor, ParameterLocation, ParameterSpec, RequestBodySpec,
};
pub use error::{CatalogError, CatalogResult, RejectedOperation};
pub use loader::{DocumentFetcher, SpecLoader, SpecSource, parse_document};
pub use resolver::{RefError, RefResolver};
