use std::fmt;
use std::str::FromStr;

use ndarray::ArrayD;
use num_traits::{AsPrimitive, NumCast};

use crate::array::ArrayData;
use crate::error::{Error, Result};
use crate::scalar::Scalar;

// DType: element kinds of host arrays and tensor types
//
// Every tensor type names exactly one element kind with a fixed bit width.
// Host values that carry their own width (i8, f32, an int32 array, ...)
// map onto these 1:1, so the type inferred for a value never has to guess:
//
//   I8  I16 I32 I64   - signed integers
//   U8  U16 U32 U64   - unsigned integers
//   F32 F64           - IEEE floats
//
// Plain host numbers (no width of their own) are mapped through the
// configuration: integers to the platform default width, floats to F64.

/// Enum of all supported element data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl DType {
    /// Every dtype, in coercion-table order.
    pub const ALL: [DType; 10] = [
        DType::I8,
        DType::I16,
        DType::I32,
        DType::I64,
        DType::U8,
        DType::U16,
        DType::U32,
        DType::U64,
        DType::F32,
        DType::F64,
    ];

    /// Position of this dtype in [`DType::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Width of one element in bits.
    pub fn bits(&self) -> u32 {
        match self {
            DType::I8 | DType::U8 => 8,
            DType::I16 | DType::U16 => 16,
            DType::I32 | DType::U32 | DType::F32 => 32,
            DType::I64 | DType::U64 | DType::F64 => 64,
        }
    }

    /// Size of one element in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.bits() as usize / 8
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }

    pub fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// Whether negative values are representable (signed ints and floats).
    pub fn is_signed(&self) -> bool {
        !matches!(self, DType::U8 | DType::U16 | DType::U32 | DType::U64)
    }

    /// Canonical name, as used in `Display` and configuration flags.
    pub fn name(&self) -> &'static str {
        match self {
            DType::I8 => "int8",
            DType::I16 => "int16",
            DType::I32 => "int32",
            DType::I64 => "int64",
            DType::U8 => "uint8",
            DType::U16 => "uint16",
            DType::U32 => "uint32",
            DType::U64 => "uint64",
            DType::F32 => "float32",
            DType::F64 => "float64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "int8" | "i8" => Ok(DType::I8),
            "int16" | "i16" => Ok(DType::I16),
            "int32" | "i32" => Ok(DType::I32),
            "int64" | "i64" => Ok(DType::I64),
            "uint8" | "u8" => Ok(DType::U8),
            "uint16" | "u16" => Ok(DType::U16),
            "uint32" | "u32" => Ok(DType::U32),
            "uint64" | "u64" => Ok(DType::U64),
            "float32" | "f32" => Ok(DType::F32),
            "float64" | "f64" => Ok(DType::F64),
            _ => crate::bail!("unknown dtype: {}", s),
        }
    }
}

// Element: Trait that connects Rust types to the DType enum
//
// Implemented for the ten primitive types backing the dtypes. Lets generic
// code build typed arrays (`HostArray::from_vec::<f32>`) and read them back
// (`array.view::<f32>()`) without matching on ArrayData by hand.

/// Trait implemented by Rust types that can be stored in a host array.
pub trait Element:
    Copy
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + 'static
    + num_traits::Zero
    + num_traits::One
    + NumCast
    + AsPrimitive<f64>
{
    /// The corresponding DType enum variant.
    const DTYPE: DType;

    /// Convert any scalar to this type with `as` semantics (truncating,
    /// wrapping or saturating as the primitive cast does).
    fn from_scalar(s: Scalar) -> Self;

    /// Convert a scalar to this type only if the value survives the round trip.
    fn from_scalar_exact(s: Scalar) -> Option<Self>;

    fn into_scalar(self) -> Scalar;

    fn into_data(array: ArrayD<Self>) -> ArrayData;

    fn data_ref(data: &ArrayData) -> Option<&ArrayD<Self>>;
}

/// `v` converted to `T`, or `None` if the value does not survive the trip.
///
/// Both directions are range-checked, so saturation (`i64::MAX` to `f64`
/// and back) is not mistaken for an exact conversion. NaN never equals
/// itself; it counts as exact when the target can represent NaN too.
pub(crate) fn exact_cast<S, T>(v: S) -> Option<T>
where
    S: NumCast + PartialEq + Copy,
    T: NumCast + PartialEq + Copy,
{
    let t = <T as NumCast>::from(v)?;
    let back = <S as NumCast>::from(t)?;
    #[allow(clippy::eq_op)]
    let nan = v != v && t != t;
    (back == v || nan).then_some(t)
}

macro_rules! impl_element {
    ($t:ty, $variant:ident) => {
        impl Element for $t {
            const DTYPE: DType = DType::$variant;

            fn from_scalar(s: Scalar) -> Self {
                with_scalar!(s, x => x.as_())
            }

            fn from_scalar_exact(s: Scalar) -> Option<Self> {
                with_scalar!(s, x => exact_cast(x))
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn into_data(array: ArrayD<Self>) -> ArrayData {
                ArrayData::$variant(array)
            }

            fn data_ref(data: &ArrayData) -> Option<&ArrayD<Self>> {
                match data {
                    ArrayData::$variant(a) => Some(a),
                    _ => None,
                }
            }
        }
    };
}

impl_element!(i8, I8);
impl_element!(i16, I16);
impl_element!(i32, I32);
impl_element!(i64, I64);
impl_element!(u8, U8);
impl_element!(u16, U16);
impl_element!(u32, U32);
impl_element!(u64, U64);
impl_element!(f32, F32);
impl_element!(f64, F64);
