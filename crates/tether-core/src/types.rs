//! Tensor types and the generic type.
//!
//! A [`TensorType`] fixes an element kind and a broadcastable flag per
//! dimension; extents are left open so the same type describes every value
//! a variable may hold over its lifetime. [`Type::Generic`] is the escape
//! hatch for values with no array structure.

use std::fmt;

use crate::coerce::{self, Policy};
use crate::config;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::value::Value;

/// Concrete array type: element kind plus per-dimension broadcastability.
///
/// Two tensor types are equal iff their dtypes and full broadcastable
/// patterns are equal (equal rank follows).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TensorType {
    dtype: DType,
    broadcastable: Vec<bool>,
}

impl TensorType {
    pub fn new(dtype: DType, broadcastable: impl Into<Vec<bool>>) -> Self {
        TensorType {
            dtype,
            broadcastable: broadcastable.into(),
        }
    }

    /// Rank-0 type.
    pub fn scalar(dtype: DType) -> Self {
        Self::new(dtype, Vec::new())
    }

    /// Rank-1 type with a non-broadcastable dimension.
    pub fn vector(dtype: DType) -> Self {
        Self::new(dtype, [false])
    }

    /// Rank-2 type with non-broadcastable dimensions.
    pub fn matrix(dtype: DType) -> Self {
        Self::new(dtype, [false, false])
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn broadcastable(&self) -> &[bool] {
        &self.broadcastable
    }

    pub fn ndim(&self) -> usize {
        self.broadcastable.len()
    }

    /// Check that an array of the given extents fits this type: same rank,
    /// and extent 1 wherever the type is broadcastable.
    pub fn check_dims(&self, dims: &[usize]) -> Result<()> {
        if dims.len() != self.ndim() {
            return Err(Error::RankMismatch {
                expected: self.ndim(),
                got: dims.len(),
            });
        }
        for (dim, (&extent, &bcast)) in dims.iter().zip(&self.broadcastable).enumerate() {
            if bcast && extent != 1 {
                return Err(Error::BroadcastMismatch {
                    dim,
                    shape: dims.into(),
                });
            }
        }
        Ok(())
    }

    /// Validate `value` and return it in this type's representation.
    ///
    /// See [`coerce::filter_tensor`] for the rules each policy applies.
    pub fn filter(
        &self,
        value: Value,
        strict: bool,
        allow_downcast: Option<bool>,
    ) -> Result<crate::HostArray> {
        coerce::filter_tensor(
            self,
            value,
            Policy::resolve(strict, allow_downcast),
            &config::current(),
        )
    }
}

impl fmt::Display for TensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TensorType({}, (", self.dtype)?;
        for (i, b) in self.broadcastable.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", b)?;
        }
        write!(f, "))")
    }
}

/// The type of a shared variable: a tensor type or the generic type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Tensor(TensorType),
    /// Accepts any value without structural validation.
    Generic,
}

impl Type {
    pub fn is_generic(&self) -> bool {
        matches!(self, Type::Generic)
    }

    pub fn as_tensor(&self) -> Option<&TensorType> {
        match self {
            Type::Tensor(t) => Some(t),
            Type::Generic => None,
        }
    }

    pub fn dtype(&self) -> Option<DType> {
        self.as_tensor().map(TensorType::dtype)
    }

    pub fn ndim(&self) -> Option<usize> {
        self.as_tensor().map(TensorType::ndim)
    }

    /// Validate `value` against this type. Generic accepts everything;
    /// tensor types defer to [`TensorType::filter`].
    pub fn filter(&self, value: Value, strict: bool, allow_downcast: Option<bool>) -> Result<Value> {
        match self {
            Type::Generic => Ok(value),
            Type::Tensor(t) => t.filter(value, strict, allow_downcast).map(Value::Array),
        }
    }

    /// Whether `value` already is in this type's exact representation.
    pub fn is_valid_value(&self, value: &Value) -> bool {
        self.filter(value.clone(), true, None).is_ok()
    }
}

impl From<TensorType> for Type {
    fn from(t: TensorType) -> Self {
        Type::Tensor(t)
    }
}

impl PartialEq<TensorType> for Type {
    fn eq(&self, other: &TensorType) -> bool {
        self.as_tensor() == Some(other)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Tensor(t) => write!(f, "{}", t),
            Type::Generic => write!(f, "Generic"),
        }
    }
}

/// The generic type.
pub fn generic() -> Type {
    Type::Generic
}

// Named shorthands
//
//   b = int8, w = int16, i = int32, l = int64, f = float32, d = float64
//
//   scalar: rank 0, vector: [false], matrix: [false, false]

macro_rules! shorthands {
    ($($dtype:ident => $scalar:ident, $vector:ident, $matrix:ident;)*) => {
        $(
            #[doc = concat!("Rank-0 `", stringify!($dtype), "` tensor type.")]
            pub fn $scalar() -> TensorType {
                TensorType::scalar(DType::$dtype)
            }

            #[doc = concat!("Rank-1 `", stringify!($dtype), "` tensor type.")]
            pub fn $vector() -> TensorType {
                TensorType::vector(DType::$dtype)
            }

            #[doc = concat!("Rank-2 `", stringify!($dtype), "` tensor type.")]
            pub fn $matrix() -> TensorType {
                TensorType::matrix(DType::$dtype)
            }
        )*
    };
}

shorthands! {
    I8 => bscalar, bvector, bmatrix;
    I16 => wscalar, wvector, wmatrix;
    I32 => iscalar, ivector, imatrix;
    I64 => lscalar, lvector, lmatrix;
    F32 => fscalar, fvector, fmatrix;
    F64 => dscalar, dvector, dmatrix;
}
