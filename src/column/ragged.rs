//! Ragged (variable-length row) array representation.
//!
//! A ragged array stores a batch of variable-length rows as a single
//! flat value buffer plus a non-decreasing offsets sequence delimiting
//! row boundaries — the same encoding Arrow uses for `ListArray`, which
//! this type converts to and from losslessly.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, ListArray};
use arrow::buffer::{OffsetBuffer, ScalarBuffer};
use arrow::datatypes::Field;

use crate::error::{Result, TransformError};

/// Columnar encoding of variable-length rows: flat values + offsets.
///
/// Row `i` holds the values in `values[offsets[i] .. offsets[i + 1])`.
/// The offsets sequence always starts at zero and its last entry equals
/// the total value count.
#[derive(Debug, Clone)]
pub struct RaggedArray {
    values: ArrayRef,
    offsets: OffsetBuffer<i32>,
}

impl RaggedArray {
    /// Creates a ragged array from flat values and row offsets.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::ColumnKind`] if the offsets do not
    /// start at zero or do not end at the value count.
    pub fn new(values: ArrayRef, offsets: OffsetBuffer<i32>) -> Result<Self> {
        let first = offsets.first().copied().unwrap_or(0);
        let last = offsets.last().copied().unwrap_or(0);
        if first != 0 {
            return Err(TransformError::ColumnKind(format!(
                "ragged array offsets must start at 0, found {first}"
            )));
        }
        if last as usize != values.len() {
            return Err(TransformError::ColumnKind(format!(
                "ragged array offsets end at {last} but {} values are present",
                values.len()
            )));
        }
        Ok(RaggedArray { values, offsets })
    }

    /// Creates a ragged array from raw `i32` offsets.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::ColumnKind`] if the offsets are empty,
    /// decreasing, or inconsistent with the value count.
    pub fn try_new(values: ArrayRef, offsets: Vec<i32>) -> Result<Self> {
        if offsets.is_empty() {
            return Err(TransformError::ColumnKind(
                "ragged array offsets must hold at least the leading 0".into(),
            ));
        }
        if offsets.windows(2).any(|w| w[1] < w[0]) || offsets[0] < 0 {
            return Err(TransformError::ColumnKind(
                "ragged array offsets must be non-decreasing".into(),
            ));
        }
        Self::new(values, OffsetBuffer::new(ScalarBuffer::from(offsets)))
    }

    /// Creates a ragged array from per-row lengths.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::ColumnKind`] if the lengths do not sum
    /// to the value count.
    pub fn from_lengths(values: ArrayRef, lengths: impl IntoIterator<Item = usize>) -> Result<Self> {
        Self::new(values, OffsetBuffer::from_lengths(lengths))
    }

    /// Reinterprets an Arrow array as a ragged array.
    ///
    /// Sliced list arrays are rebased so the offsets start at zero and
    /// the flat values cover exactly the listed elements.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::ColumnKind`] if the column is not a
    /// `ListArray`.
    pub fn try_from_arrow(array: &ArrayRef) -> Result<Self> {
        let list = array
            .as_any()
            .downcast_ref::<ListArray>()
            .ok_or_else(|| {
                TransformError::ColumnKind(format!(
                    "expected array column, found {:?}",
                    array.data_type()
                ))
            })?;

        let offsets = list.offsets();
        let first = offsets[0];
        let last = offsets[offsets.len() - 1];
        let values = list.values();

        if first == 0 && last as usize == values.len() {
            return Ok(RaggedArray {
                values: values.clone(),
                offsets: offsets.clone(),
            });
        }

        // Rebase a sliced list so the flat representation is self-contained.
        let rebased: Vec<i32> = offsets.iter().map(|o| o - first).collect();
        let values = values.slice(first as usize, (last - first) as usize);
        Ok(RaggedArray {
            values,
            offsets: OffsetBuffer::new(ScalarBuffer::from(rebased)),
        })
    }

    /// Converts back into an Arrow `ListArray` sharing the same buffers.
    pub fn to_list(&self) -> Result<ListArray> {
        let field = Arc::new(Field::new("item", self.values.data_type().clone(), true));
        Ok(ListArray::try_new(
            field,
            self.offsets.clone(),
            self.values.clone(),
            None,
        )?)
    }

    /// The flat value column.
    #[must_use]
    pub fn values(&self) -> &ArrayRef {
        &self.values
    }

    /// The row-boundary offsets (length `row_count + 1`, starts at 0).
    #[must_use]
    pub fn offsets(&self) -> &OffsetBuffer<i32> {
        &self.offsets
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of values across all rows.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// True if the array holds no values at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Per-row lengths, in row order.
    #[must_use]
    pub fn row_lengths(&self) -> Vec<usize> {
        self.offsets
            .windows(2)
            .map(|w| (w[1] - w[0]) as usize)
            .collect()
    }

    /// Half-open value range `[start, end)` of row `i`.
    #[must_use]
    pub fn row_bounds(&self, i: usize) -> (usize, usize) {
        (self.offsets[i] as usize, self.offsets[i + 1] as usize)
    }

    /// The values of row `i` as a zero-copy slice.
    #[must_use]
    pub fn row(&self, i: usize) -> ArrayRef {
        let (start, end) = self.row_bounds(i);
        self.values.slice(start, end - start)
    }

    /// Compares row boundaries with another ragged array.
    ///
    /// The pointer comparison is an optimization: offsets that share a
    /// buffer need no element-wise comparison.
    #[must_use]
    pub fn offsets_match(&self, other: &RaggedArray) -> bool {
        let a = &self.offsets;
        let b = &other.offsets;
        if a.len() == b.len() && std::ptr::eq(a.as_ptr(), b.as_ptr()) {
            return true;
        }
        a[..] == b[..]
    }
}
