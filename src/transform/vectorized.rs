//! Vectorized execution path.
//!
//! The whole batch is evaluated with a single closure invocation: the
//! closure is replicated once per element according to the first
//! array's row lengths, the flat element columns are appended, and one
//! `reduce` call produces one result element per input element. The
//! policy then reshapes the flat results using the original row
//! boundaries.

use arrow::array::ArrayRef;

use crate::closure::ClosureColumn;
use crate::column::ColumnWithType;
use crate::column::RaggedArray;
use crate::error::Result;
use crate::policy::TransformPolicy;

/// Single-array overload: `f(array)` with no closure involved.
///
/// The flat element column doubles as the mapped column, matching the
/// behavior of `f(x -> x, array)`.
pub(super) fn execute_single_array(
    policy: TransformPolicy,
    argument: &ColumnWithType,
) -> Result<ArrayRef> {
    let array = argument.column.to_ragged()?;
    policy.execute(&array, array.values().clone())
}

/// Closure overload over pre-collected, shape-checked array arguments.
pub(super) fn execute(
    policy: TransformPolicy,
    closure: &dyn ClosureColumn,
    first_array: &RaggedArray,
    flat_columns: Vec<ArrayRef>,
) -> Result<ArrayRef> {
    let mapped = super::apply_closure(closure, &first_array.row_lengths(), flat_columns)?;
    policy.execute(first_array, mapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closure::BoundClosure;
    use crate::types::ClosureType;
    use arrow::array::{Array, Int64Array, UInt8Array};
    use arrow::datatypes::DataType;
    use std::sync::Arc;

    fn ragged(values: &[i64], offsets: Vec<i32>) -> RaggedArray {
        let values: ArrayRef = Arc::new(Int64Array::from(values.to_vec()));
        RaggedArray::try_new(values, offsets).unwrap()
    }

    fn identity_closure() -> BoundClosure {
        BoundClosure::from_fn(
            |columns| Ok(columns[0].clone()),
            ClosureType::new(vec![DataType::Int64], DataType::Int64),
        )
    }

    #[test]
    fn test_map_identity_preserves_array() {
        let array = ragged(&[1, 2, 3, 4, 5], vec![0, 3, 3, 5]);
        let closure = identity_closure();
        let flats = vec![array.values().clone()];
        let result = execute(TransformPolicy::Map, &closure, &array, flats).unwrap();
        let result = RaggedArray::try_from_arrow(&result).unwrap();
        assert!(result.offsets_match(&array));
        let values = result.values();
        let values = values.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(&values.values()[..], &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_count_with_always_true_predicate_yields_row_lengths() {
        let array = ragged(&[1, 2, 3, 4, 5, 6], vec![0, 2, 2, 6]);
        let closure = BoundClosure::from_fn(
            |columns| {
                let len = columns[0].len();
                Ok(Arc::new(UInt8Array::from(vec![1u8; len])) as ArrayRef)
            },
            ClosureType::new(vec![DataType::Int64], DataType::UInt8),
        );
        let flats = vec![array.values().clone()];
        let result = execute(TransformPolicy::Count, &closure, &array, flats).unwrap();
        let result = result
            .as_any()
            .downcast_ref::<arrow::array::UInt32Array>()
            .unwrap();
        assert_eq!(&result.values()[..], &[2, 0, 4]);
    }
}
