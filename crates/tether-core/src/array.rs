use std::fmt;
use std::sync::Arc;

use ndarray::{ArrayD, IxDyn};
use num_traits::AsPrimitive;
use rand::Rng;

use crate::dtype::{exact_cast, DType, Element};
use crate::error::{Error, Result};
use crate::scalar::Scalar;
use crate::shape::Shape;

// HostArray: typed n-d array living in host memory
//
// This is the representation a tensor-typed shared variable stores. The
// element buffer is an ndarray::ArrayD of one of the ten element types,
// wrapped in an enum so the dtype is known at runtime.
//
// MEMORY MODEL:
//
//   HostArray is a handle: Arc<ArrayData>. Cloning the handle aliases the
//   same buffer, exactly like holding a second reference to a host array.
//   This is what makes `borrow` observable: a borrowed value is stored as
//   the caller's own handle (ptr_eq holds), an unborrowed one goes through
//   deep_copy() first.
//
//   Arrays are never mutated in place through a handle, so aliasing is safe;
//   replacing a shared variable's value swaps the handle.

/// Element buffer of a host array, one variant per [`DType`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    I8(ArrayD<i8>),
    I16(ArrayD<i16>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    U32(ArrayD<u32>),
    U64(ArrayD<u64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

impl ArrayData {
    pub fn dtype(&self) -> DType {
        match self {
            ArrayData::I8(_) => DType::I8,
            ArrayData::I16(_) => DType::I16,
            ArrayData::I32(_) => DType::I32,
            ArrayData::I64(_) => DType::I64,
            ArrayData::U8(_) => DType::U8,
            ArrayData::U16(_) => DType::U16,
            ArrayData::U32(_) => DType::U32,
            ArrayData::U64(_) => DType::U64,
            ArrayData::F32(_) => DType::F32,
            ArrayData::F64(_) => DType::F64,
        }
    }

    pub fn dims(&self) -> &[usize] {
        with_array!(self, a => a.shape())
    }
}

/// A reference-counted handle to a typed host array.
#[derive(Clone)]
pub struct HostArray {
    data: Arc<ArrayData>,
}

impl HostArray {
    // Creation

    /// Wrap a typed ndarray.
    pub fn new<T: Element>(array: ArrayD<T>) -> Self {
        Self::from_data(T::into_data(array))
    }

    pub fn from_data(data: ArrayData) -> Self {
        HostArray {
            data: Arc::new(data),
        }
    }

    /// Build an array from row-major elements and a shape.
    pub fn from_vec<T: Element>(data: Vec<T>, shape: impl Into<Shape>) -> Result<Self> {
        let shape = shape.into();
        if data.len() != shape.elem_count() {
            return Err(Error::ElementCountMismatch {
                expected: shape.elem_count(),
                got: data.len(),
                shape,
            });
        }
        let array = ArrayD::from_shape_vec(IxDyn(shape.dims()), data)
            .map_err(|e| Error::msg(e.to_string()))?;
        Ok(Self::new(array))
    }

    /// Rank-0 array holding a single element.
    pub fn scalar<T: Element>(v: T) -> Self {
        Self::new(ArrayD::from_elem(IxDyn(&[]), v))
    }

    pub fn from_scalar(s: Scalar) -> Self {
        with_scalar!(s, x => Self::scalar(x))
    }

    pub fn zeros(shape: impl Into<Shape>, dtype: DType) -> Self {
        let shape = shape.into();
        with_dtype!(dtype, T => Self::new(ArrayD::<T>::zeros(IxDyn(shape.dims()))))
    }

    pub fn ones(shape: impl Into<Shape>, dtype: DType) -> Self {
        let shape = shape.into();
        with_dtype!(dtype, T => Self::new(ArrayD::<T>::ones(IxDyn(shape.dims()))))
    }

    /// `float64` array with elements drawn uniformly from `[0, 1)`.
    pub fn rand(shape: impl Into<Shape>) -> Self {
        Self::rand_with(shape, &mut rand::thread_rng())
    }

    /// Like [`HostArray::rand`] with a caller-supplied generator.
    pub fn rand_with<R: Rng + ?Sized>(shape: impl Into<Shape>, rng: &mut R) -> Self {
        let shape = shape.into();
        let array = ArrayD::from_shape_simple_fn(IxDyn(shape.dims()), || rng.gen::<f64>());
        Self::new(array)
    }

    /// Build an array of `dtype` from row-major scalars of any kind.
    ///
    /// With `exact` set, returns `None` as soon as one element would lose
    /// precision or range; otherwise converts with `as` semantics.
    pub(crate) fn from_scalars(
        scalars: &[Scalar],
        shape: &Shape,
        dtype: DType,
        exact: bool,
    ) -> Option<Self> {
        with_dtype!(dtype, T => {
            let elems: Vec<T> = if exact {
                scalars
                    .iter()
                    .map(|s| T::from_scalar_exact(*s))
                    .collect::<Option<Vec<T>>>()?
            } else {
                scalars.iter().map(|s| T::from_scalar(*s)).collect()
            };
            ArrayD::from_shape_vec(IxDyn(shape.dims()), elems)
                .ok()
                .map(Self::new)
        })
    }

    // Accessors

    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    pub fn dims(&self) -> &[usize] {
        self.data.dims()
    }

    pub fn shape(&self) -> Shape {
        Shape::from(self.dims())
    }

    pub fn rank(&self) -> usize {
        self.dims().len()
    }

    pub fn elem_count(&self) -> usize {
        self.dims().iter().product()
    }

    /// Typed view of the elements, if `T` matches the dtype.
    pub fn view<T: Element>(&self) -> Option<&ArrayD<T>> {
        T::data_ref(&self.data)
    }

    /// All elements in row-major order as scalars.
    pub fn scalars(&self) -> Vec<Scalar> {
        with_array!(&*self.data, a => a.iter().map(|&x| x.into_scalar()).collect())
    }

    /// The single element of a one-element array.
    pub fn item(&self) -> Option<Scalar> {
        if self.elem_count() != 1 {
            return None;
        }
        self.scalars().into_iter().next()
    }

    /// All elements converted to f64, in row-major order.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        with_array!(&*self.data, a => a.iter().map(|&x| AsPrimitive::<f64>::as_(x)).collect())
    }

    // Identity and copies

    /// Whether both handles alias the same buffer.
    pub fn ptr_eq(&self, other: &HostArray) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// A handle to a fresh, unaliased copy of the elements.
    pub fn deep_copy(&self) -> Self {
        Self::from_data((*self.data).clone())
    }

    // Conversions

    /// Convert every element to `dtype` with `as` semantics: float to int
    /// truncates toward zero, narrowing ints wrap, out-of-range floats
    /// saturate.
    pub fn cast(&self, dtype: DType) -> Self {
        if dtype == self.dtype() {
            return self.clone();
        }
        with_dtype!(dtype, T => {
            let out: ArrayD<T> = with_array!(&*self.data, a => a.mapv(|x| AsPrimitive::<T>::as_(x)));
            Self::new(out)
        })
    }

    /// Convert to `dtype` only if every element survives the round trip.
    pub fn cast_exact(&self, dtype: DType) -> Option<Self> {
        if dtype == self.dtype() {
            return Some(self.clone());
        }
        with_dtype!(dtype, T => {
            let mut lossless = true;
            let out: ArrayD<T> = with_array!(&*self.data, a => a.mapv(|x| {
                exact_cast::<_, T>(x).unwrap_or_else(|| {
                    lossless = false;
                    AsPrimitive::<T>::as_(x)
                })
            }));
            lossless.then(|| Self::new(out))
        })
    }
}

/// Value equality: same dtype, same shape, same elements.
impl PartialEq for HostArray {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.data == *other.data
    }
}

impl fmt::Debug for HostArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostArray(dtype={}, shape={}, ", self.dtype(), self.shape())?;
        with_array!(&*self.data, a => write!(f, "{:?})", a.as_slice_memory_order()))
    }
}

impl<T: Element> From<ArrayD<T>> for HostArray {
    fn from(array: ArrayD<T>) -> Self {
        Self::new(array)
    }
}
