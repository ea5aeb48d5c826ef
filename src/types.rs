//! Argument type descriptors for transform calls.
//!
//! A transform call is described by an ordered list of [`ArgType`]s:
//! a closure descriptor in position 0 followed by array types (plus a
//! trailing accumulator type for folding operations). The engine's
//! type-resolution phase rewrites the closure placeholder in place once
//! the array element types are known.

use arrow::datatypes::DataType;

/// Static type of one call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgType {
    /// A concrete column type, including `List` for array arguments.
    Value(DataType),
    /// A closure value with a declared signature.
    Closure(ClosureType),
}

impl ArgType {
    /// Returns the inner value type, or `None` for closures.
    #[must_use]
    pub fn as_value(&self) -> Option<&DataType> {
        match self {
            ArgType::Value(dt) => Some(dt),
            ArgType::Closure(_) => None,
        }
    }

    /// Returns the closure signature, or `None` for value types.
    #[must_use]
    pub fn as_closure(&self) -> Option<&ClosureType> {
        match self {
            ArgType::Closure(sig) => Some(sig),
            ArgType::Value(_) => None,
        }
    }
}

/// Declared signature of a closure argument.
///
/// Before type resolution a closure is a placeholder that only carries
/// its arity: the argument types are `DataType::Null` and the return
/// type is unknown. Resolution rewrites the argument types with the
/// element types inferred from the array arguments; the caller then
/// binds the closure body and supplies the return type.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureType {
    /// Expected argument types, one per closure parameter.
    pub argument_types: Vec<DataType>,
    /// Declared return type; `None` until the closure body is bound.
    pub return_type: Option<DataType>,
}

impl ClosureType {
    /// Creates a fully resolved signature.
    #[must_use]
    pub fn new(argument_types: Vec<DataType>, return_type: DataType) -> Self {
        ClosureType {
            argument_types,
            return_type: Some(return_type),
        }
    }

    /// Creates an unresolved placeholder with the given parameter count.
    #[must_use]
    pub fn placeholder(arity: usize) -> Self {
        ClosureType {
            argument_types: vec![DataType::Null; arity],
            return_type: None,
        }
    }

    /// Number of parameters the closure declares.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.argument_types.len()
    }
}

/// Returns the element type of a list type, if `data_type` is a list.
#[must_use]
pub fn element_type(data_type: &DataType) -> Option<&DataType> {
    match data_type {
        DataType::List(field) | DataType::LargeList(field) => Some(field.data_type()),
        _ => None,
    }
}

/// Wraps an element type into the engine's list type.
#[must_use]
pub fn list_of(element: DataType) -> DataType {
    DataType::List(std::sync::Arc::new(arrow::datatypes::Field::new(
        "item", element, true,
    )))
}
