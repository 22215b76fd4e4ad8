// Type inference: the tightest type describing a host value
//
// Inference asks one question of a value: what structure does it expose?
//
//   Scalar(dtype)          fixed-width scalars, and plain host numbers
//                          typed through the configuration
//   Array { dtype, shape } typed host arrays
//   Opaque                 everything else: sequences (even numeric ones),
//                          strings, mappings
//
// and maps the answer to a type. Scalars become rank-0 tensor types, arrays
// get one broadcastable flag per dimension set exactly where the extent is
// 1, and opaque values get the generic type. Sequences are deliberately
// opaque: their element kind would have to be guessed, and a shared
// variable's type must never be a guess.
//
// Symbolic graph nodes have no host structure at all; inferring their
// type is an error rather than a fallback to Generic.

use crate::config::{self, Config};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::shape::Shape;
use crate::types::{TensorType, Type};
use crate::value::Value;

/// What a host value exposes about its element kind and shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Structure {
    Scalar(DType),
    Array { dtype: DType, shape: Shape },
    Opaque,
}

/// Introspect `value` under `config`.
pub fn structure(value: &Value, config: &Config) -> Result<Structure> {
    Ok(match value {
        Value::Int(_) => Structure::Scalar(config.default_int()),
        Value::Float(_) => Structure::Scalar(config.default_float()),
        Value::Scalar(s) => Structure::Scalar(s.dtype()),
        Value::Array(a) => Structure::Array {
            dtype: a.dtype(),
            shape: a.shape(),
        },
        Value::List(_) | Value::Str(_) | Value::Map(_) => Structure::Opaque,
        Value::Symbolic(s) => return Err(Error::SymbolicValue(s.to_string())),
    })
}

/// Infer the type of `value` under the current configuration.
pub fn infer_type(value: &Value) -> Result<Type> {
    infer_type_with(value, &config::current())
}

/// Infer the type of `value` under an explicit configuration.
pub fn infer_type_with(value: &Value, config: &Config) -> Result<Type> {
    Ok(match structure(value, config)? {
        Structure::Scalar(dtype) => Type::Tensor(TensorType::scalar(dtype)),
        Structure::Array { dtype, shape } => {
            Type::Tensor(TensorType::new(dtype, shape.broadcast_pattern()))
        }
        Structure::Opaque => Type::Generic,
    })
}
