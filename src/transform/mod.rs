//! Higher-order array transform engine.
//!
//! An [`ArrayTransform`] evaluates one call of the shape
//! `op(closure, array_1, ..., array_n[, initial_value])` over a batch
//! of rows. Type resolution runs in two phases before execution (see
//! [`resolve`]); execution dispatches to the vectorized path, or to the
//! sequential fold path when the policy folds an accumulator through
//! each row.

mod fold;
mod resolve;
mod vectorized;

use arrow::array::ArrayRef;

use crate::closure::ClosureColumn;
use crate::column::dictionary::expand_dictionary;
use crate::column::{ColumnWithType, RaggedArray};
use crate::error::{Result, TransformError};
use crate::policy::TransformPolicy;

/// One higher-order array operation, parameterized by its policy.
///
/// The transform is stateless: a single instance can resolve and
/// execute any number of calls, concurrently, because every invocation
/// works exclusively on caller-supplied immutable inputs and its own
/// freshly allocated output.
#[derive(Debug, Clone, Copy)]
pub struct ArrayTransform {
    policy: TransformPolicy,
}

impl ArrayTransform {
    #[must_use]
    pub fn new(policy: TransformPolicy) -> Self {
        ArrayTransform { policy }
    }

    /// The operation-specific behavior of this transform.
    #[must_use]
    pub fn policy(&self) -> TransformPolicy {
        self.policy
    }

    /// Executes one resolved call over a batch of `row_count` rows.
    ///
    /// `arguments` must match the signature produced by the resolution
    /// phases: a closure in position 0 followed by array columns (and a
    /// trailing accumulator column when folding), or a single array
    /// column for the closure-free overload.
    pub fn execute(&self, arguments: &[ColumnWithType], row_count: usize) -> Result<ArrayRef> {
        let name = self.policy.name();
        tracing::debug!(
            function = name,
            arguments = arguments.len(),
            rows = row_count,
            "executing array transform"
        );

        if arguments.is_empty() {
            return Err(TransformError::ArgumentCount {
                function: name,
                message: "needs at least 1 argument; passed 0".into(),
            });
        }

        if arguments.len() == 1 {
            return vectorized::execute_single_array(self.policy, &arguments[0]);
        }

        let closure = arguments[0].column.as_closure()?;

        let arguments_to_skip = usize::from(self.policy.is_folding());
        let array_arguments = &arguments[1..arguments.len() - arguments_to_skip];
        if array_arguments.is_empty() {
            return Err(TransformError::ArgumentCount {
                function: name,
                message: "needs at least one array argument".into(),
            });
        }

        let (first_array, flat_columns) = collect_array_arguments(name, array_arguments)?;

        if self.policy.is_folding() {
            fold::execute(
                self.policy,
                closure.as_ref(),
                &first_array,
                &flat_columns,
                &arguments[arguments.len() - 1],
            )
        } else {
            vectorized::execute(self.policy, closure.as_ref(), &first_array, flat_columns)
        }
    }
}

/// Normalizes the array arguments of a call: expands constants and
/// dictionary-encoded element columns, checks that every array shares
/// the first array's row boundaries, and collects the flat element
/// columns in argument order.
fn collect_array_arguments(
    function: &'static str,
    arguments: &[ColumnWithType],
) -> Result<(RaggedArray, Vec<ArrayRef>)> {
    let (head, tail) = arguments
        .split_first()
        .ok_or_else(|| TransformError::ArgumentCount {
            function,
            message: "needs at least one array argument".into(),
        })?;

    let first_array = normalize_array_argument(head)?;
    let mut flat_columns = Vec::with_capacity(arguments.len());
    flat_columns.push(first_array.values().clone());

    for argument in tail {
        let ragged = normalize_array_argument(argument)?;
        if !first_array.offsets_match(&ragged) {
            return Err(TransformError::SizeMismatch { function });
        }
        flat_columns.push(ragged.values().clone());
    }

    Ok((first_array, flat_columns))
}

/// Expands a constant array column and decodes dictionary-encoded
/// element values, yielding a plain ragged array.
fn normalize_array_argument(argument: &ColumnWithType) -> Result<RaggedArray> {
    let ragged = argument.column.to_ragged()?;
    let values = expand_dictionary(ragged.values())?;
    RaggedArray::new(values, ragged.offsets().clone())
}

/// Replicates the closure over the batch's row lengths, appends the
/// flat argument columns, and reduces to one flat result column.
fn apply_closure(
    closure: &dyn ClosureColumn,
    row_lengths: &[usize],
    columns: Vec<ArrayRef>,
) -> Result<ArrayRef> {
    let mut replica = closure.replicate(row_lengths);
    replica.append_arguments(columns);
    let mapped = replica.reduce()?;
    expand_dictionary(&mapped)
}
