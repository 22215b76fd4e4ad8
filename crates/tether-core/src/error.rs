use crate::dtype::DType;
use crate::shape::Shape;

/// All errors that can occur within Tether.
///
/// Every failure is raised synchronously by the call that violated a rule;
/// a failed construction produces no variable and a failed `set_value`
/// leaves the previous value in place.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A keyword-style constructor option that no constructor understands.
    #[error("unknown shared variable option `{0}`")]
    UnknownOption(String),

    /// A known option given a value of the wrong kind.
    #[error("option `{key}` expects {expected}")]
    InvalidOption { key: String, expected: &'static str },

    /// Shared variables wrap host values only, never graph nodes.
    #[error("shared variables need host values, not symbolic variables (got {0})")]
    SymbolicValue(String),

    /// Malformed configuration flag.
    #[error("invalid configuration flag `{flag}`: {reason}")]
    InvalidConfig { flag: String, reason: String },

    /// Strict mode requires the exact array representation of the type.
    #[error("strict mode: expected a {expected} array, got {got}")]
    StrictMismatch { expected: String, got: String },

    /// Value has a different number of dimensions than the type.
    #[error("rank mismatch: expected rank {expected}, got {got}")]
    RankMismatch { expected: usize, got: usize },

    /// A broadcastable dimension of the type has a non-unit extent in the value.
    #[error("dimension {dim} is broadcastable but value has shape {shape}")]
    BroadcastMismatch { dim: usize, shape: Shape },

    /// The value has no array structure at all.
    #[error("value is not array-like: {0}")]
    NotArrayLike(String),

    /// Element count mismatch when creating an array from a vec.
    #[error("element count mismatch: shape {shape} requires {expected} elements, got {got}")]
    ElementCountMismatch {
        shape: Shape,
        expected: usize,
        got: usize,
    },

    /// Coercion would lose precision or range and downcasting is not allowed.
    #[error("cannot convert {from} to {to} without loss; pass allow_downcast=true to force it")]
    LossyDowncast { from: String, to: DType },

    /// Generic message for cases not covered above.
    #[error("{0}")]
    Msg(String),
}

/// Coarse classification of [`Error`]s.
///
/// Structural mismatches and lossy downcasts are both type errors from the
/// caller's point of view, but they are kept apart here so callers can tell
/// "no coercion could ever work" from "coercion was refused".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Misconfiguration: bad options, bad flags, symbolic values.
    Configuration,
    /// Strict mode rejected a value that is not already exactly representable.
    StrictTypeMismatch,
    /// Shape, rank or array-ness that no coercion can repair.
    StructuralMismatch,
    /// A lossy coercion that was not allowed.
    LossyDowncast,
    Other,
}

impl Error {
    /// Create an error from any string message.
    pub fn msg(s: impl Into<String>) -> Self {
        Error::Msg(s.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownOption(_)
            | Error::InvalidOption { .. }
            | Error::SymbolicValue(_)
            | Error::InvalidConfig { .. } => ErrorKind::Configuration,
            Error::StrictMismatch { .. } => ErrorKind::StrictTypeMismatch,
            Error::RankMismatch { .. }
            | Error::BroadcastMismatch { .. }
            | Error::NotArrayLike(_)
            | Error::ElementCountMismatch { .. } => ErrorKind::StructuralMismatch,
            Error::LossyDowncast { .. } => ErrorKind::LossyDowncast,
            Error::Msg(_) => ErrorKind::Other,
        }
    }
}

/// Convenience Result type used throughout Tether.
pub type Result<T> = std::result::Result<T, Error>;

/// Macro for early return with a formatted error message.
/// Usage: `bail!("something went wrong: {}", detail)`
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::Msg(format!($($arg)*)))
    };
}
