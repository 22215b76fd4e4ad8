// Dispatch macros
//
// Host arrays and scalars are enums with one variant per DType. These macros
// expand a body once per variant so generic code can be written against a
// concrete element type without a trait object:
//
//   with_dtype!(dtype, T => ArrayD::<T>::zeros(dims))
//   with_scalar!(scalar, x => x.as_())
//   with_array!(&data, a => a.len())
//
// Every arm is monomorphic, which is what lets num_traits::AsPrimitive
// resolve for any (source, target) pair.

/// Bind `$T` to the Rust element type of a runtime [`DType`](crate::DType).
macro_rules! with_dtype {
    ($dtype:expr, $T:ident => $body:expr) => {
        match $dtype {
            $crate::DType::I8 => {
                type $T = i8;
                $body
            }
            $crate::DType::I16 => {
                type $T = i16;
                $body
            }
            $crate::DType::I32 => {
                type $T = i32;
                $body
            }
            $crate::DType::I64 => {
                type $T = i64;
                $body
            }
            $crate::DType::U8 => {
                type $T = u8;
                $body
            }
            $crate::DType::U16 => {
                type $T = u16;
                $body
            }
            $crate::DType::U32 => {
                type $T = u32;
                $body
            }
            $crate::DType::U64 => {
                type $T = u64;
                $body
            }
            $crate::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::DType::F64 => {
                type $T = f64;
                $body
            }
        }
    };
}

/// Bind `$x` to the payload of a [`Scalar`](crate::Scalar).
macro_rules! with_scalar {
    ($scalar:expr, $x:ident => $body:expr) => {
        match $scalar {
            $crate::Scalar::I8($x) => $body,
            $crate::Scalar::I16($x) => $body,
            $crate::Scalar::I32($x) => $body,
            $crate::Scalar::I64($x) => $body,
            $crate::Scalar::U8($x) => $body,
            $crate::Scalar::U16($x) => $body,
            $crate::Scalar::U32($x) => $body,
            $crate::Scalar::U64($x) => $body,
            $crate::Scalar::F32($x) => $body,
            $crate::Scalar::F64($x) => $body,
        }
    };
}

/// Bind `$a` to the typed `ArrayD` inside an [`ArrayData`](crate::ArrayData).
macro_rules! with_array {
    ($data:expr, $a:ident => $body:expr) => {
        match $data {
            $crate::ArrayData::I8($a) => $body,
            $crate::ArrayData::I16($a) => $body,
            $crate::ArrayData::I32($a) => $body,
            $crate::ArrayData::I64($a) => $body,
            $crate::ArrayData::U8($a) => $body,
            $crate::ArrayData::U16($a) => $body,
            $crate::ArrayData::U32($a) => $body,
            $crate::ArrayData::U64($a) => $body,
            $crate::ArrayData::F32($a) => $body,
            $crate::ArrayData::F64($a) => $body,
        }
    };
}
