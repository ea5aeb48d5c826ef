//! mapfold - Higher-order array transforms for columnar batches
//!
//! Evaluates `op(closure, array_1, ..., array_n[, initial])` over ragged
//! columnar arrays (flat values plus row offsets): a vectorized path for
//! element-wise policies such as map and filter, and a sequential fold
//! path threading an accumulator through each row.

pub mod closure;
pub mod column;
pub mod error;
pub mod policy;
pub mod transform;
pub mod types;

pub use closure::{BoundClosure, ClosureColumn, ClosureReplica, RowKernel};
pub use column::{Column, ColumnWithType, RaggedArray};
pub use error::{Result, TransformError};
pub use policy::TransformPolicy;
pub use transform::ArrayTransform;
pub use types::{ArgType, ClosureType};
