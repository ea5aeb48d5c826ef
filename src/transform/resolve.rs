//! Two-phase argument and type resolution.
//!
//! The surrounding engine binds closure arguments in two passes. First
//! it asks [`ArrayTransform::infer_closure_argument_types`] to rewrite
//! the closure placeholder with the argument types inferred from the
//! array element types; with those in hand it compiles the closure body
//! and calls [`ArrayTransform::resolve_return_type`] to obtain the
//! call's overall return type.

use arrow::datatypes::DataType;

use crate::column::dictionary::strip_dictionary;
use crate::error::{Result, TransformError};
use crate::types::{element_type, ArgType, ClosureType};

use super::ArrayTransform;

impl ArrayTransform {
    /// Phase 1: infers the closure's expected argument types.
    ///
    /// `arguments[0]` must be a closure placeholder; positions `1..`
    /// are array types, with the trailing position holding the
    /// accumulator's declared type when folding. On success the
    /// placeholder is rewritten in place with the resolved signature.
    pub fn infer_closure_argument_types(&self, arguments: &mut [ArgType]) -> Result<()> {
        let name = self.policy().name();
        if arguments.is_empty() {
            return Err(TransformError::ArgumentCount {
                function: name,
                message: "needs at least 1 argument; passed 0".into(),
            });
        }
        if arguments.len() == 1 {
            return Err(TransformError::ArgumentCount {
                function: name,
                message: "needs at least one array argument".into(),
            });
        }

        // The trailing argument of a fold is the accumulator, not an array.
        let arguments_to_skip = usize::from(self.policy().is_folding());
        let array_count = arguments.len() - 1 - arguments_to_skip;

        let mut inferred: Vec<DataType> = Vec::with_capacity(arguments.len() - 1);
        for (i, argument) in arguments[1..=array_count].iter().enumerate() {
            let data_type = argument.as_value().ok_or_else(|| {
                TransformError::Type(format!(
                    "argument {} of {name} must be array, found a function",
                    i + 2
                ))
            })?;
            let element = element_type(data_type).ok_or_else(|| {
                TransformError::Type(format!(
                    "argument {} of {name} must be array, found {data_type:?}",
                    i + 2
                ))
            })?;
            inferred.push(strip_dictionary(element));
        }

        if self.policy().is_folding() {
            // The accumulator's own declared type, unmodified.
            let accumulator = arguments[arguments.len() - 1].as_value().ok_or_else(|| {
                TransformError::Type(format!(
                    "accumulator argument of {name} must not be a function"
                ))
            })?;
            inferred.push(accumulator.clone());
        }

        let placeholder = arguments[0].as_closure().ok_or_else(|| {
            TransformError::Type(format!("first argument for {name} must be a function"))
        })?;
        if placeholder.arity() != inferred.len() {
            return Err(TransformError::ArgumentCount {
                function: name,
                message: format!(
                    "closure must take {} argument(s), found {}",
                    inferred.len(),
                    placeholder.arity()
                ),
            });
        }

        tracing::debug!(
            function = name,
            arguments = inferred.len(),
            "resolved closure argument types"
        );
        arguments[0] = ArgType::Closure(ClosureType {
            argument_types: inferred,
            return_type: placeholder.return_type.clone(),
        });
        Ok(())
    }

    /// Phase 2: derives the call's return type from the resolved
    /// argument types.
    pub fn resolve_return_type(&self, arguments: &[ArgType]) -> Result<DataType> {
        let name = self.policy().name();
        let min_args = if self.policy().needs_expression() { 2 } else { 1 };
        if arguments.len() < min_args {
            return Err(TransformError::ArgumentCount {
                function: name,
                message: format!(
                    "needs at least {min_args} argument(s); passed {}",
                    arguments.len()
                ),
            });
        }

        if arguments.len() == 1 {
            return self.resolve_single_array(&arguments[0]);
        }

        let closure = arguments[0].as_closure().ok_or_else(|| {
            TransformError::Type(format!("first argument for {name} must be a function"))
        })?;

        if self.policy().needs_single_array() && arguments.len() > 2 {
            return Err(TransformError::ArgumentCount {
                function: name,
                message: "needs exactly one array argument".into(),
            });
        }

        let return_type = closure.return_type.as_ref().ok_or_else(|| {
            TransformError::Type(format!("closure passed to {name} has no resolved return type"))
        })?;
        let return_type = strip_dictionary(return_type);
        if self.policy().needs_boolean_result() && return_type != DataType::UInt8 {
            return Err(TransformError::Type(format!(
                "expression for {name} must return UInt8, found {return_type:?}"
            )));
        }

        let result = if self.policy().is_folding() {
            let accumulator = arguments[arguments.len() - 1].as_value().ok_or_else(|| {
                TransformError::Type(format!(
                    "accumulator argument of {name} must not be a function"
                ))
            })?;
            self.policy().compute_return_type(&return_type, accumulator)
        } else {
            let first = arguments[1].as_value().and_then(element_type).ok_or_else(|| {
                TransformError::Type(format!("argument 2 of {name} must be array"))
            })?;
            self.policy().compute_return_type(&return_type, first)
        }?;

        tracing::debug!(function = name, return_type = ?result, "resolved return type");
        Ok(result)
    }

    /// Single-array overload: `f(array)` behaves as `f(x -> x, array)`.
    fn resolve_single_array(&self, argument: &ArgType) -> Result<DataType> {
        let name = self.policy().name();
        let data_type = argument.as_value().ok_or_else(|| {
            TransformError::Type(format!(
                "the only argument for {name} must be array, found a function"
            ))
        })?;
        let element = element_type(data_type).ok_or_else(|| {
            TransformError::Type(format!(
                "the only argument for {name} must be array, found {data_type:?}"
            ))
        })?;
        if self.policy().needs_boolean_result() && *element != DataType::UInt8 {
            return Err(TransformError::Type(format!(
                "the only argument for {name} must be an array of UInt8, found {element:?}"
            )));
        }
        self.policy().compute_return_type(element, element)
    }
}
