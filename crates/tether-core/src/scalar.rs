use std::fmt;

use crate::dtype::{DType, Element};

/// A single value with a fixed-width element kind.
///
/// This is the host-side counterpart of a rank-0 tensor: `Scalar::I16(7)`
/// always infers an `int16` type, unlike a plain host integer whose width
/// comes from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl Scalar {
    pub fn dtype(&self) -> DType {
        match self {
            Scalar::I8(_) => DType::I8,
            Scalar::I16(_) => DType::I16,
            Scalar::I32(_) => DType::I32,
            Scalar::I64(_) => DType::I64,
            Scalar::U8(_) => DType::U8,
            Scalar::U16(_) => DType::U16,
            Scalar::U32(_) => DType::U32,
            Scalar::U64(_) => DType::U64,
            Scalar::F32(_) => DType::F32,
            Scalar::F64(_) => DType::F64,
        }
    }

    /// Convert to another dtype with `as` semantics.
    pub fn cast(self, dtype: DType) -> Scalar {
        with_dtype!(dtype, T => T::from_scalar(self).into_scalar())
    }

    /// Convert to another dtype only if no precision or range is lost.
    pub fn cast_exact(self, dtype: DType) -> Option<Scalar> {
        with_dtype!(dtype, T => T::from_scalar_exact(self).map(Element::into_scalar))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        with_scalar!(self, x => write!(f, "{}", x))
    }
}

macro_rules! impl_from_primitive {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Scalar {
                fn from(v: $t) -> Self {
                    v.into_scalar()
                }
            }
        )*
    };
}

impl_from_primitive!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);
