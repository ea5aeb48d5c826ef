//! Runtime column values passed to a transform call.
//!
//! Columns are supplied immutable by the caller and only read by the
//! engine; every output is a newly constructed column.

pub mod dictionary;
pub mod ragged;

use std::sync::Arc;

use arrow::array::{ArrayRef, UInt32Array};
use arrow::compute::take;

use crate::closure::ClosureColumn;
use crate::error::{Result, TransformError};
use crate::types::ArgType;

pub use ragged::RaggedArray;

/// The runtime value of one call argument.
#[derive(Clone)]
pub enum Column {
    /// A full column with one value per row. Array arguments are
    /// `ListArray`-typed values.
    Values(ArrayRef),
    /// A single-row value broadcast over the whole batch; must be
    /// expanded to a full column before any processing.
    Constant { row: ArrayRef, row_count: usize },
    /// A bound closure value, usable only through the
    /// replicate/append/reduce protocol.
    Closure(Arc<dyn ClosureColumn>),
}

impl Column {
    /// Materializes the column as a full Arrow array of `row_count` rows.
    ///
    /// Constants are expanded by repeating their single row; closure
    /// columns have no value representation.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::ColumnKind`] for closure columns or a
    /// constant whose row is not exactly one value long.
    pub fn to_values(&self) -> Result<ArrayRef> {
        match self {
            Column::Values(array) => Ok(array.clone()),
            Column::Constant { row, row_count } => {
                if row.len() != 1 {
                    return Err(TransformError::ColumnKind(format!(
                        "constant column must hold exactly one row, found {}",
                        row.len()
                    )));
                }
                let indices = UInt32Array::from(vec![0u32; *row_count]);
                Ok(take(row.as_ref(), &indices, None)?)
            }
            Column::Closure(_) => Err(TransformError::ColumnKind(
                "closure column has no value representation".into(),
            )),
        }
    }

    /// Returns the closure value, or a [`TransformError::Type`] if the
    /// column is not a closure.
    pub fn as_closure(&self) -> Result<&Arc<dyn ClosureColumn>> {
        match self {
            Column::Closure(closure) => Ok(closure),
            _ => Err(TransformError::Type(
                "first argument must be a function".into(),
            )),
        }
    }

    /// Materializes the column and reinterprets it as a ragged array.
    pub fn to_ragged(&self) -> Result<RaggedArray> {
        RaggedArray::try_from_arrow(&self.to_values()?)
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Column::Values(array) => f
                .debug_tuple("Values")
                .field(&array.data_type())
                .field(&array.len())
                .finish(),
            Column::Constant { row, row_count } => f
                .debug_struct("Constant")
                .field("type", &row.data_type())
                .field("row_count", row_count)
                .finish(),
            Column::Closure(closure) => f
                .debug_tuple("Closure")
                .field(closure.signature())
                .finish(),
        }
    }
}

/// The `(column, type, name)` triple of the execution-phase contract.
#[derive(Debug, Clone)]
pub struct ColumnWithType {
    pub column: Column,
    pub data_type: ArgType,
    pub name: String,
}

impl ColumnWithType {
    pub fn new(column: Column, data_type: ArgType, name: impl Into<String>) -> Self {
        ColumnWithType {
            column,
            data_type,
            name: name.into(),
        }
    }
}
