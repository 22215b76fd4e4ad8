//! # tether-core
//!
//! Host values, tensor types, and shared variables for Tether.
//!
//! This crate provides:
//! - [`HostArray`] - typed n-dimensional host array with handle semantics
//! - [`DType`] / [`Scalar`] - element kinds and fixed-width scalars
//! - [`TensorType`] / [`Type`] - the types a shared variable can be declared with
//! - [`infer_type`] - the tightest type describing a host value
//! - [`SharedVariable`] / [`shared`] - persistent, type-stable host storage
// - DType, Scalar: supported element kinds (signed/unsigned ints, f32, f64)
// - Shape: n-dimensional extents
// - HostArray: ndarray-backed storage shared through an Arc handle
// - Value: everything a caller can hand to a shared variable
// - coerce: cast classification and the filter policies
// - config: floatX / int_bitwidth preferences (TETHER_FLAGS)

#[macro_use]
mod macros;

pub mod array;
pub mod coerce;
pub mod config;
pub mod dtype;
pub mod error;
pub mod graph;
pub mod infer;
pub mod scalar;
pub mod shape;
pub mod shared;
pub mod types;
pub mod value;

pub use array::{ArrayData, HostArray};
pub use coerce::{classify, filter_tensor, Cast, Policy};
pub use config::{with_config, Config};
pub use dtype::{DType, Element};
pub use error::{Error, ErrorKind, Result};
pub use graph::{Origin, Symbolic, VariableId};
pub use infer::{infer_type, infer_type_with, structure, Structure};
pub use scalar::Scalar;
pub use shape::Shape;
pub use shared::{shared, shared_with, OptionValue, SharedOptions, SharedVariable};
pub use types::{
    bmatrix, bscalar, bvector, dmatrix, dscalar, dvector, fmatrix, fscalar, fvector, generic,
    imatrix, iscalar, ivector, lmatrix, lscalar, lvector, wmatrix, wscalar, wvector, TensorType,
    Type,
};
pub use value::Value;
