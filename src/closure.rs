//! Closure application primitive.
//!
//! The engine drives closures exclusively through the
//! replicate/append/reduce protocol: [`ClosureColumn::replicate`]
//! expands one closure binding into one invocation site per element
//! according to row lengths, [`ClosureReplica::append_arguments`]
//! attaches the flat argument columns, and [`ClosureReplica::reduce`]
//! produces one flat result column with exactly one element per input
//! element. The engine never depends on closure internals.

use std::sync::Arc;

use arrow::array::ArrayRef;

use crate::error::{Result, TransformError};
use crate::types::ClosureType;

/// Vectorized closure kernel: maps equal-length argument columns to one
/// result column of the same length.
pub type RowKernel = Arc<dyn Fn(&[ArrayRef]) -> Result<ArrayRef> + Send + Sync>;

/// A closure value bound to captured state and a declared signature.
pub trait ClosureColumn: Send + Sync {
    /// The closure's declared argument and return types.
    fn signature(&self) -> &ClosureType;

    /// Expands the closure into one invocation site per element.
    ///
    /// `row_lengths` carries the per-row element counts of the first
    /// array argument; the replica uses it for shape bookkeeping only.
    fn replicate(&self, row_lengths: &[usize]) -> Box<dyn ClosureReplica>;
}

/// A replicated closure accumulating its flat argument columns.
pub trait ClosureReplica {
    /// Appends flat argument columns, in argument order.
    fn append_arguments(&mut self, columns: Vec<ArrayRef>);

    /// Invokes the closure over all appended elements.
    ///
    /// The result holds exactly one element per appended element: the
    /// sum of the replicated row lengths on the vectorized path, or a
    /// single element per invocation on the fold path.
    fn reduce(self: Box<Self>) -> Result<ArrayRef>;
}

/// The concrete closure-application type: a vectorized kernel plus its
/// declared signature. Captured values live inside the kernel.
#[derive(Clone)]
pub struct BoundClosure {
    kernel: RowKernel,
    signature: ClosureType,
}

impl BoundClosure {
    pub fn new(kernel: RowKernel, signature: ClosureType) -> Self {
        BoundClosure { kernel, signature }
    }

    /// Convenience constructor wrapping a plain function.
    pub fn from_fn<F>(kernel: F, signature: ClosureType) -> Self
    where
        F: Fn(&[ArrayRef]) -> Result<ArrayRef> + Send + Sync + 'static,
    {
        BoundClosure {
            kernel: Arc::new(kernel),
            signature,
        }
    }
}

impl ClosureColumn for BoundClosure {
    fn signature(&self) -> &ClosureType {
        &self.signature
    }

    fn replicate(&self, row_lengths: &[usize]) -> Box<dyn ClosureReplica> {
        Box::new(BoundClosureReplica {
            kernel: Arc::clone(&self.kernel),
            element_count: row_lengths.iter().sum(),
            columns: Vec::new(),
        })
    }
}

struct BoundClosureReplica {
    kernel: RowKernel,
    /// Total invocation sites from replication; on the fold path the
    /// appended columns are single-element regardless of this count.
    element_count: usize,
    columns: Vec<ArrayRef>,
}

impl ClosureReplica for BoundClosureReplica {
    fn append_arguments(&mut self, mut columns: Vec<ArrayRef>) {
        self.columns.append(&mut columns);
    }

    fn reduce(self: Box<Self>) -> Result<ArrayRef> {
        let Some(first) = self.columns.first() else {
            return Err(TransformError::ColumnKind(
                "closure invoked without argument columns".into(),
            ));
        };
        let width = first.len();
        if self.columns.iter().any(|c| c.len() != width) {
            return Err(TransformError::ColumnKind(
                "closure argument columns must have equal length".into(),
            ));
        }
        debug_assert!(width == self.element_count || width <= 1);

        let result = (self.kernel)(&self.columns)?;
        if result.len() != width {
            return Err(TransformError::ColumnKind(format!(
                "closure produced {} elements for {width} inputs",
                result.len()
            )));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use arrow::datatypes::DataType;

    fn identity_closure() -> BoundClosure {
        BoundClosure::from_fn(
            |columns| Ok(columns[0].clone()),
            ClosureType::new(vec![DataType::Int64], DataType::Int64),
        )
    }

    #[test]
    fn test_replicate_append_reduce() {
        let closure = identity_closure();
        let mut replica = closure.replicate(&[2, 1]);
        let input: ArrayRef = Arc::new(Int64Array::from(vec![1, 2, 3]));
        replica.append_arguments(vec![input]);
        let result = replica.reduce().unwrap();
        let result = result.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(&result.values()[..], &[1, 2, 3]);
    }

    #[test]
    fn test_reduce_rejects_mismatched_argument_lengths() {
        let closure = identity_closure();
        let mut replica = closure.replicate(&[2]);
        replica.append_arguments(vec![
            Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef,
            Arc::new(Int64Array::from(vec![1])) as ArrayRef,
        ]);
        assert!(matches!(
            replica.reduce().unwrap_err(),
            TransformError::ColumnKind(_)
        ));
    }

    #[test]
    fn test_reduce_rejects_missing_arguments() {
        let closure = identity_closure();
        let replica = closure.replicate(&[1]);
        assert!(matches!(
            replica.reduce().unwrap_err(),
            TransformError::ColumnKind(_)
        ));
    }

    #[test]
    fn test_reduce_checks_result_length() {
        let bad = BoundClosure::from_fn(
            |columns| Ok(columns[0].slice(0, 1)),
            ClosureType::new(vec![DataType::Int64], DataType::Int64),
        );
        let mut replica = bad.replicate(&[3]);
        replica.append_arguments(vec![Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef]);
        assert!(matches!(
            replica.reduce().unwrap_err(),
            TransformError::ColumnKind(_)
        ));
    }
}
