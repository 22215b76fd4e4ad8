//! # Tether
//!
//! Persistent, host-resident shared variables for symbolic tensor graphs.
//!
//! This is the top-level facade crate that re-exports everything you need.
//!
//! ## Usage
//!
//! ```rust
//! use tether::prelude::*;
//!
//! let mut w = shared(HostArray::zeros((2, 3), DType::F32)).unwrap();
//! assert_eq!(w.ty(), &TensorType::matrix(DType::F32));
//! w.set_value(HostArray::ones((2, 3), DType::F32), false).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`graph`] - symbolic nodes a shared variable can be seen as
//! - [`types`] - tensor types and the `bscalar` .. `dmatrix` shorthands
//! - [`coerce`] - cast classification and filter policies
//! - [`config`] - `floatX` / `int_bitwidth` preferences

/// Re-export core types.
pub use tether_core::{
    infer_type, infer_type_with, shared, shared_with, ArrayData, Config, DType, Element, Error,
    ErrorKind, HostArray, OptionValue, Result, Scalar, Shape, SharedOptions, SharedVariable,
    Symbolic, TensorType, Type, Value, VariableId,
};

/// Symbolic graph nodes.
pub mod graph {
    pub use tether_core::graph::{ones, Origin, Symbolic, VariableId};
}

/// Tensor types and named shorthands.
pub mod types {
    pub use tether_core::types::*;
}

/// Coercion rules.
pub mod coerce {
    pub use tether_core::coerce::{classify, filter_tensor, Cast, Policy};
}

/// Typing preferences.
pub mod config {
    pub use tether_core::config::{current, with_config, Config, FLAGS_ENV};
}

/// Prelude: import this for the most common types.
pub mod prelude {
    pub use crate::types::{
        bmatrix, bscalar, bvector, dmatrix, dscalar, dvector, fmatrix, fscalar, fvector, generic,
        imatrix, iscalar, ivector, lmatrix, lscalar, lvector, wmatrix, wscalar, wvector,
    };
    pub use crate::{
        shared, shared_with, DType, Error, ErrorKind, HostArray, Result, Scalar, Shape,
        SharedOptions, SharedVariable, Symbolic, TensorType, Type, Value,
    };
}
