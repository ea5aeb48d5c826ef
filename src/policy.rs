//! Per-operation transform policies.
//!
//! The set of operations is closed and known at compile time, so the
//! policy is a tagged union dispatched with `match` rather than a trait
//! object. A policy decides what the engine demands of the call shape
//! (`needs_*` predicates), how the return type derives from the closure
//! and element types, and how the flat mapped column is reshaped into
//! the final result.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Float64Array, Int64Array, UInt32Array, UInt64Array, UInt8Array,
};
use arrow::array::BooleanArray;
use arrow::compute::{cast, filter};
use arrow::datatypes::DataType;

use crate::column::RaggedArray;
use crate::error::{Result, TransformError};
use crate::types::list_of;

/// The pluggable, operation-specific behavior of one transform call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformPolicy {
    /// Replace each element with the closure result; keep row shape.
    Map,
    /// Keep the elements whose predicate result is non-zero.
    Filter,
    /// Count the elements whose predicate result is non-zero, per row.
    Count,
    /// True (as `UInt8`) if any element's predicate result is non-zero.
    Exists,
    /// True (as `UInt8`) if every element's predicate result is non-zero.
    All,
    /// Sum the mapped elements of a single array, per row.
    Sum,
    /// Left fold: thread an accumulator through each row's elements.
    Fold,
}

impl TransformPolicy {
    /// Operation name used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TransformPolicy::Map => "map",
            TransformPolicy::Filter => "filter",
            TransformPolicy::Count => "count",
            TransformPolicy::Exists => "exists",
            TransformPolicy::All => "all",
            TransformPolicy::Sum => "sum",
            TransformPolicy::Fold => "fold",
        }
    }

    /// True for the sequential fold path.
    #[must_use]
    pub fn is_folding(self) -> bool {
        matches!(self, TransformPolicy::Fold)
    }

    /// True if the closure (or single-array element type) must produce
    /// `UInt8` used as a boolean.
    #[must_use]
    pub fn needs_boolean_result(self) -> bool {
        matches!(
            self,
            TransformPolicy::Filter
                | TransformPolicy::Count
                | TransformPolicy::Exists
                | TransformPolicy::All
        )
    }

    /// True if the operation has no single-array overload and always
    /// requires an explicit closure.
    #[must_use]
    pub fn needs_expression(self) -> bool {
        matches!(
            self,
            TransformPolicy::Map | TransformPolicy::Filter | TransformPolicy::Fold
        )
    }

    /// True if the operation accepts exactly one array argument.
    #[must_use]
    pub fn needs_single_array(self) -> bool {
        matches!(self, TransformPolicy::Sum)
    }

    /// Derives the call's return type.
    ///
    /// `expr_type` is the closure's return type (or the element type on
    /// the single-array overload); `elem_or_accum_type` is the first
    /// array's element type, or the accumulator's declared type when
    /// folding.
    pub fn compute_return_type(
        self,
        expr_type: &DataType,
        elem_or_accum_type: &DataType,
    ) -> Result<DataType> {
        match self {
            TransformPolicy::Map => Ok(list_of(expr_type.clone())),
            TransformPolicy::Filter => Ok(list_of(elem_or_accum_type.clone())),
            TransformPolicy::Count => Ok(DataType::UInt32),
            TransformPolicy::Exists | TransformPolicy::All => Ok(DataType::UInt8),
            TransformPolicy::Sum => promote_sum_type(expr_type),
            TransformPolicy::Fold => Ok(elem_or_accum_type.clone()),
        }
    }

    /// Reshapes the flat per-element results into the final column.
    ///
    /// `array` supplies the original row boundaries; `mapped` holds one
    /// closure result per element, in the same flat order.
    pub fn execute(self, array: &RaggedArray, mapped: ArrayRef) -> Result<ArrayRef> {
        match self {
            TransformPolicy::Map => {
                let result = RaggedArray::new(mapped, array.offsets().clone())?;
                Ok(Arc::new(result.to_list()?))
            }
            TransformPolicy::Filter => execute_filter(array, &mapped),
            TransformPolicy::Count => {
                let predicate = boolean_mask(&mapped)?;
                let counts: Vec<u32> = per_row(array, &predicate, |row| {
                    row.iter().filter(|&&kept| kept).count() as u32
                });
                Ok(Arc::new(UInt32Array::from(counts)))
            }
            TransformPolicy::Exists => {
                let predicate = boolean_mask(&mapped)?;
                let flags: Vec<u8> = per_row(array, &predicate, |row| {
                    u8::from(row.iter().any(|&kept| kept))
                });
                Ok(Arc::new(UInt8Array::from(flags)))
            }
            TransformPolicy::All => {
                let predicate = boolean_mask(&mapped)?;
                let flags: Vec<u8> = per_row(array, &predicate, |row| {
                    u8::from(row.iter().all(|&kept| kept))
                });
                Ok(Arc::new(UInt8Array::from(flags)))
            }
            TransformPolicy::Sum => execute_sum(array, &mapped),
            // The fold loop owns the shaping; pass the closure result through.
            TransformPolicy::Fold => Ok(mapped),
        }
    }
}

/// Widened accumulation type for the sum reducer.
fn promote_sum_type(expr_type: &DataType) -> Result<DataType> {
    match expr_type {
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => Ok(DataType::Int64),
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            Ok(DataType::UInt64)
        }
        DataType::Float16 | DataType::Float32 | DataType::Float64 => Ok(DataType::Float64),
        other => Err(TransformError::Type(format!(
            "sum expects a numeric expression, found {other:?}"
        ))),
    }
}

/// Interprets a flat `UInt8` predicate column as booleans (null = false).
fn boolean_mask(mapped: &ArrayRef) -> Result<Vec<bool>> {
    let flags = mapped
        .as_any()
        .downcast_ref::<UInt8Array>()
        .ok_or_else(|| {
            TransformError::ColumnKind(format!(
                "expected UInt8 predicate column, found {:?}",
                mapped.data_type()
            ))
        })?;
    Ok((0..flags.len())
        .map(|i| flags.is_valid(i) && flags.value(i) != 0)
        .collect())
}

/// Applies `f` to each row's slice of a flat per-element buffer.
fn per_row<T, F: Fn(&[bool]) -> T>(array: &RaggedArray, flat: &[bool], f: F) -> Vec<T> {
    (0..array.row_count())
        .map(|i| {
            let (start, end) = array.row_bounds(i);
            f(&flat[start..end])
        })
        .collect()
}

fn execute_filter(array: &RaggedArray, mapped: &ArrayRef) -> Result<ArrayRef> {
    let predicate = boolean_mask(mapped)?;
    let kept = filter(
        array.values().as_ref(),
        &BooleanArray::from(predicate.clone()),
    )?;
    let lengths = per_row(array, &predicate, |row| {
        row.iter().filter(|&&keep| keep).count()
    });
    let result = RaggedArray::from_lengths(kept, lengths)?;
    Ok(Arc::new(result.to_list()?))
}

fn downcast_lane<'a, T: Array + 'static>(widened: &'a ArrayRef) -> Result<&'a T> {
    widened.as_any().downcast_ref::<T>().ok_or_else(|| {
        TransformError::ColumnKind(format!(
            "sum widening produced an unexpected {:?} column",
            widened.data_type()
        ))
    })
}

fn execute_sum(array: &RaggedArray, mapped: &ArrayRef) -> Result<ArrayRef> {
    let target = promote_sum_type(mapped.data_type())?;
    let widened = cast(mapped.as_ref(), &target)?;
    let rows = array.row_count();

    match target {
        DataType::Int64 => {
            let values = downcast_lane::<Int64Array>(&widened)?;
            let sums: Vec<i64> = (0..rows)
                .map(|i| {
                    let (start, end) = array.row_bounds(i);
                    (start..end)
                        .filter(|&j| values.is_valid(j))
                        .fold(0i64, |acc, j| acc.wrapping_add(values.value(j)))
                })
                .collect();
            Ok(Arc::new(Int64Array::from(sums)))
        }
        DataType::UInt64 => {
            let values = downcast_lane::<UInt64Array>(&widened)?;
            let sums: Vec<u64> = (0..rows)
                .map(|i| {
                    let (start, end) = array.row_bounds(i);
                    (start..end)
                        .filter(|&j| values.is_valid(j))
                        .fold(0u64, |acc, j| acc.wrapping_add(values.value(j)))
                })
                .collect();
            Ok(Arc::new(UInt64Array::from(sums)))
        }
        DataType::Float64 => {
            let values = downcast_lane::<Float64Array>(&widened)?;
            let sums: Vec<f64> = (0..rows)
                .map(|i| {
                    let (start, end) = array.row_bounds(i);
                    (start..end)
                        .filter(|&j| values.is_valid(j))
                        .map(|j| values.value(j))
                        .sum()
                })
                .collect();
            Ok(Arc::new(Float64Array::from(sums)))
        }
        _ => unreachable!("promote_sum_type only yields 64-bit lanes"),
    }
}
