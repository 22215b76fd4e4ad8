// Coercion: the rules a value must pass to be stored under a tensor type
//
// Two questions are answered separately:
//
//   1. Is the *conversion* between two dtypes safe? That is a property of
//      the dtypes alone and is read off CAST_TABLE, a total table keyed by
//      (source dtype, target dtype). A conversion is Safe when every value
//      of the source is representable in the target, following the usual
//      array promotion rules (so every integer converts safely to float64).
//
//   2. Which conversions does the variable *allow*? That is the Policy,
//      derived from the variable's (strict, allow_downcast) pair:
//
//        strict   allow_downcast   policy
//        true     any              Strict          exact representation only
//        false    Some(true)       AllowDowncast   any conversion, `as` semantics
//        false    Some(false)      RejectDowncast  safe conversions, exact values
//        false    None             Default         as RejectDowncast, plus exactly
//                                                  representable arrays and host
//                                                  floats into a float_x type
//
// Structure (rank and broadcastable extents) is checked before any element
// is converted, so a wrong-rank value reports a structural error even when
// its elements would also have been lossy.

use crate::array::HostArray;
use crate::config::Config;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::scalar::Scalar;
use crate::shape::Shape;
use crate::types::TensorType;
use crate::value::Value;

/// Classification of a dtype-to-dtype conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cast {
    /// Same dtype, nothing to do.
    Identity,
    /// Every source value is representable in the target.
    Safe,
    /// Some source values lose precision or range.
    Lossy,
}

use Cast::{Identity as I, Lossy as L, Safe as S};

/// Rows are source dtypes, columns target dtypes, both in [`DType::ALL`] order:
/// i8 i16 i32 i64 u8 u16 u32 u64 f32 f64.
#[rustfmt::skip]
const CAST_TABLE: [[Cast; 10]; 10] = [
    //        i8 i16 i32 i64  u8 u16 u32 u64 f32 f64
    /* i8  */ [I, S, S, S, L, L, L, L, S, S],
    /* i16 */ [L, I, S, S, L, L, L, L, S, S],
    /* i32 */ [L, L, I, S, L, L, L, L, L, S],
    /* i64 */ [L, L, L, I, L, L, L, L, L, S],
    /* u8  */ [L, S, S, S, I, S, S, S, S, S],
    /* u16 */ [L, L, S, S, L, I, S, S, S, S],
    /* u32 */ [L, L, L, S, L, L, I, S, L, S],
    /* u64 */ [L, L, L, L, L, L, L, I, L, S],
    /* f32 */ [L, L, L, L, L, L, L, L, I, S],
    /* f64 */ [L, L, L, L, L, L, L, L, L, I],
];

/// How converting a `from` value into `to` behaves.
pub fn classify(from: DType, to: DType) -> Cast {
    CAST_TABLE[from.index()][to.index()]
}

/// Which conversions a filter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    Strict,
    AllowDowncast,
    RejectDowncast,
    Default,
}

impl Policy {
    pub fn resolve(strict: bool, allow_downcast: Option<bool>) -> Self {
        match (strict, allow_downcast) {
            (true, _) => Policy::Strict,
            (false, Some(true)) => Policy::AllowDowncast,
            (false, Some(false)) => Policy::RejectDowncast,
            (false, None) => Policy::Default,
        }
    }
}

/// Validate `value` against `ty` under `policy` and return the array to store.
///
/// An array that already has the right dtype is returned as the same handle,
/// so callers control aliasing by copying (or not) before filtering.
pub fn filter_tensor(
    ty: &TensorType,
    value: Value,
    policy: Policy,
    config: &Config,
) -> Result<HostArray> {
    let dtype = ty.dtype();
    match value {
        Value::Symbolic(s) => Err(Error::SymbolicValue(s.to_string())),
        Value::Array(a) if a.dtype() == dtype => {
            ty.check_dims(a.dims())?;
            Ok(a)
        }
        other if policy == Policy::Strict => Err(Error::StrictMismatch {
            expected: dtype.to_string(),
            got: other.describe(),
        }),
        Value::Array(a) => {
            ty.check_dims(a.dims())?;
            coerce_array(a, dtype, policy)
        }
        Value::Float(x) if policy == Policy::Default && dtype == config.float_x() => {
            ty.check_dims(&[])?;
            Ok(HostArray::from_scalar(Scalar::F64(x).cast(dtype)))
        }
        other => {
            let (shape, leaves) = flatten(&other)?;
            ty.check_dims(shape.dims())?;
            let exact = policy != Policy::AllowDowncast;
            HostArray::from_scalars(&leaves, &shape, dtype, exact).ok_or_else(|| {
                Error::LossyDowncast {
                    from: other.describe(),
                    to: dtype,
                }
            })
        }
    }
}

fn coerce_array(a: HostArray, dtype: DType, policy: Policy) -> Result<HostArray> {
    let from = a.dtype();
    let lossy = || Error::LossyDowncast {
        from: format!("{} array", from),
        to: dtype,
    };
    match (classify(from, dtype), policy) {
        (Cast::Identity, _) => Ok(a),
        (Cast::Safe, _) => {
            tracing::trace!(%from, to = %dtype, "safe array cast");
            Ok(a.cast(dtype))
        }
        (Cast::Lossy, Policy::AllowDowncast) => {
            tracing::debug!(%from, to = %dtype, "downcasting array");
            Ok(a.cast(dtype))
        }
        (Cast::Lossy, Policy::Default) => a.cast_exact(dtype).ok_or_else(lossy),
        (Cast::Lossy, _) => Err(lossy()),
    }
}

/// Shape and row-major scalar leaves of an array-convertible host value.
///
/// Plain numbers and scalars are rank 0, sequences add one leading
/// dimension per nesting level and must be rectangular; arrays nested in
/// sequences contribute their own dimensions.
pub(crate) fn flatten(value: &Value) -> Result<(Shape, Vec<Scalar>)> {
    let mut leaves = Vec::new();
    let dims = flatten_into(value, &mut leaves)?;
    Ok((Shape::new(dims), leaves))
}

fn flatten_into(value: &Value, leaves: &mut Vec<Scalar>) -> Result<Vec<usize>> {
    match value {
        Value::Int(v) => {
            leaves.push(Scalar::I64(*v));
            Ok(Vec::new())
        }
        Value::Float(v) => {
            leaves.push(Scalar::F64(*v));
            Ok(Vec::new())
        }
        Value::Scalar(s) => {
            leaves.push(*s);
            Ok(Vec::new())
        }
        Value::Array(a) => {
            leaves.extend(a.scalars());
            Ok(a.dims().to_vec())
        }
        Value::List(items) => {
            let mut inner: Option<Vec<usize>> = None;
            for item in items {
                let dims = flatten_into(item, leaves)?;
                match &inner {
                    Some(expected) if *expected != dims => {
                        return Err(Error::NotArrayLike(format!(
                            "ragged sequence: item of shape {} after items of shape {}",
                            Shape::new(dims),
                            Shape::new(expected.clone())
                        )));
                    }
                    Some(_) => {}
                    None => inner = Some(dims),
                }
            }
            let mut dims = vec![items.len()];
            dims.extend(inner.unwrap_or_default());
            Ok(dims)
        }
        Value::Str(_) | Value::Map(_) | Value::Symbolic(_) => {
            Err(Error::NotArrayLike(value.describe()))
        }
    }
}
