//! Dictionary (low-cardinality) normalization.
//!
//! Dictionary-encoded arguments and results are expanded to plain
//! columns before any type or execution logic runs, so the rest of the
//! engine never sees the encoding. This is the single normalization
//! point; call sites must not unwrap dictionaries themselves.

use arrow::array::ArrayRef;
use arrow::compute::cast;
use arrow::datatypes::DataType;

use crate::error::Result;

/// Removes dictionary encoding from a type descriptor, recursively.
#[must_use]
pub fn strip_dictionary(data_type: &DataType) -> DataType {
    match data_type {
        DataType::Dictionary(_, value_type) => strip_dictionary(value_type),
        other => other.clone(),
    }
}

/// Expands a dictionary-encoded column to its value type.
///
/// Non-dictionary columns are returned unchanged.
pub fn expand_dictionary(column: &ArrayRef) -> Result<ArrayRef> {
    match column.data_type() {
        DataType::Dictionary(_, _) => {
            let target = strip_dictionary(column.data_type());
            Ok(cast(column.as_ref(), &target)?)
        }
        _ => Ok(column.clone()),
    }
}
