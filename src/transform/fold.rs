//! Sequential fold execution path.
//!
//! Folding is genuinely sequential: each element's closure result is
//! the accumulator fed to the next element, so rows are walked in
//! ascending order and each row's elements strictly left to right over
//! the flat value stream. The loop carries explicit `(cursor,
//! accumulator)` state instead of mutating captures across nested
//! loops; the cursor indexes the flat, cross-row element stream shared
//! by all array arguments.

use arrow::array::{Array, ArrayRef};
use arrow::compute::concat;

use crate::closure::ClosureColumn;
use crate::column::{ColumnWithType, RaggedArray};
use crate::error::{Result, TransformError};
use crate::policy::TransformPolicy;

/// Folds the closure through every row of the batch.
///
/// `accumulator` supplies one initial value per row; the output holds
/// one final accumulator per row, in row order.
pub(super) fn execute(
    policy: TransformPolicy,
    closure: &dyn ClosureColumn,
    first_array: &RaggedArray,
    flat_columns: &[ArrayRef],
    accumulator: &ColumnWithType,
) -> Result<ArrayRef> {
    let initial = accumulator.column.to_values()?;
    if initial.len() != first_array.row_count() {
        return Err(TransformError::ColumnKind(format!(
            "fold accumulator holds {} initial value(s) for {} row(s)",
            initial.len(),
            first_array.row_count()
        )));
    }
    let row_lengths = first_array.row_lengths();

    tracing::debug!(
        rows = first_array.row_count(),
        elements = first_array.value_count(),
        "sequential fold"
    );

    // An all-empty batch skips the row loop: one vectorized round over
    // the empty flat columns yields an empty, correctly typed result.
    if first_array.is_empty() {
        let mut columns: Vec<ArrayRef> = flat_columns.to_vec();
        columns.push(initial.slice(0, 0));
        let mapped = super::apply_closure(closure, &row_lengths, columns)?;
        return policy.execute(first_array, mapped);
    }

    let mut cursor = 0usize;
    let mut output: Vec<ArrayRef> = Vec::with_capacity(first_array.row_count());

    for row in 0..first_array.row_count() {
        // The current fold state for this row, starting from the
        // caller-supplied initial value.
        let mut accumulator_slice = initial.slice(row, 1);
        let (_, row_end) = first_array.row_bounds(row);

        while cursor < row_end {
            let mut columns: Vec<ArrayRef> = Vec::with_capacity(flat_columns.len() + 1);
            for column in flat_columns {
                columns.push(column.slice(cursor, 1));
            }
            columns.push(accumulator_slice.clone());

            // Replication here is shape bookkeeping for the invocation
            // machinery; the appended columns are single-element.
            let mapped = super::apply_closure(closure, &row_lengths, columns)?;
            accumulator_slice = policy.execute(first_array, mapped)?;
            cursor += 1;
        }

        output.push(accumulator_slice);
    }

    let parts: Vec<&dyn Array> = output.iter().map(AsRef::as_ref).collect();
    Ok(concat(&parts)?)
}
