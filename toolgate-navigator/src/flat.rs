//! One tool per visible operation, no navigation.

use toolgate_catalog::OperationDescriptor;

use crate::tools::ToolDescriptor;

/// Lists `operations` in the order given.
#[must_use]
pub fn list<'a>(operations: impl IntoIterator<Item = &'a OperationDescriptor>) -> Vec<ToolDescriptor> {
    operations.into_iter().map(ToolDescriptor::operation).collect()
}
