// SharedVariable: a persistent, host-resident value addressable from a graph
//
// A shared variable pairs a fixed type with a value that can be replaced
// any number of times. Every value it ever holds has passed the type's
// filter (see coerce.rs) under the variable's own (strict, allow_downcast)
// pair, so readers can rely on the stored representation:
//
//   - tensor-typed variables always store a HostArray of exactly the
//     declared dtype, whose extents fit the broadcastable pattern;
//   - generic variables store whatever they were given.
//
// The declared type never changes. In particular it is never widened to
// the float_x preference: a variable built from an f32 stays float32, and
// later float64 values are coerced down to it (or rejected).
//
// BORROWING:
//
//   set_value(v, borrow = false) deep-copies v before filtering, so the
//   caller keeps no alias into the variable. With borrow = true a value
//   already in the exact representation is stored as the caller's own
//   handle. get_value mirrors this: borrow = true hands out the stored
//   handle, borrow = false a deep copy.
//
// FAILURE:
//
//   Filtering happens before the stored value is touched, so a failed
//   set_value leaves the variable exactly as it was.

use std::fmt;

use crate::coerce::{self, Policy};
use crate::config;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::graph::{Origin, Symbolic, VariableId};
use crate::infer::infer_type;
use crate::types::{TensorType, Type};
use crate::value::Value;

/// A graph variable holding a persistent host value.
#[derive(Debug)]
pub struct SharedVariable {
    id: VariableId,
    name: Option<String>,
    ty: Type,
    value: Value,
    strict: bool,
    allow_downcast: Option<bool>,
}

impl SharedVariable {
    /// Create a shared variable of an explicit type.
    ///
    /// `value` is filtered against `ty` under `strict` / `allow_downcast`;
    /// it is stored without copying when already in exact representation.
    pub fn new(
        name: Option<String>,
        ty: Type,
        value: impl Into<Value>,
        strict: bool,
        allow_downcast: Option<bool>,
    ) -> Result<Self> {
        let value = value.into();
        reject_symbolic(&value)?;
        let value = ty.filter(value, strict, allow_downcast)?;
        tracing::debug!(
            name = name.as_deref().unwrap_or("<unnamed>"),
            ty = %ty,
            strict,
            ?allow_downcast,
            "created shared variable"
        );
        Ok(SharedVariable {
            id: VariableId::new(),
            name,
            ty,
            value,
            strict,
            allow_downcast,
        })
    }

    // Accessors

    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The declared type, fixed for the variable's lifetime.
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Element dtype of a tensor-typed variable.
    pub fn dtype(&self) -> Option<DType> {
        self.ty.dtype()
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn allow_downcast(&self) -> Option<bool> {
        self.allow_downcast
    }

    // Value access

    /// Current value. With `borrow` the internal handle is returned and
    /// aliases the stored array; otherwise a deep copy.
    pub fn get_value(&self, borrow: bool) -> Value {
        if borrow {
            self.value.clone()
        } else {
            self.value.deep_copy()
        }
    }

    /// Replace the current value.
    ///
    /// The new value is validated exactly as at construction; on error the
    /// previous value is kept.
    pub fn set_value(&mut self, value: impl Into<Value>, borrow: bool) -> Result<()> {
        let value = value.into();
        reject_symbolic(&value)?;
        let value = if borrow { value } else { value.deep_copy() };
        let filtered = self.ty.filter(value, self.strict, self.allow_downcast)?;
        if borrow {
            tracing::trace!(id = self.id.0, "storing borrowed value");
        }
        self.value = filtered;
        Ok(())
    }

    /// This variable as a node of a computation graph.
    pub fn as_symbolic(&self) -> Symbolic {
        Symbolic::from_parts(self.id, self.name.clone(), self.ty.clone(), Origin::Shared)
    }
}

impl fmt::Display for SharedVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "<{}>", self.ty),
        }
    }
}

fn reject_symbolic(value: &Value) -> Result<()> {
    match value {
        Value::Symbolic(s) => Err(Error::SymbolicValue(s.to_string())),
        _ => Ok(()),
    }
}

// SharedOptions: constructor options for shared()
//
// Options can be set through the builder methods, or keyword-style through
// set() / from_pairs() when they come from somewhere untyped. Keyword-style
// configuration fails fast: an unknown key or a value of the wrong kind is
// an error, never silently ignored.

/// Value of a keyword-style option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
    Pattern(Vec<bool>),
    Null,
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<Option<bool>> for OptionValue {
    fn from(b: Option<bool>) -> Self {
        b.map_or(OptionValue::Null, OptionValue::Bool)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<Vec<bool>> for OptionValue {
    fn from(p: Vec<bool>) -> Self {
        OptionValue::Pattern(p)
    }
}

/// Options accepted by [`shared_with`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedOptions {
    pub name: Option<String>,
    /// Require values to already be in the exact representation.
    pub strict: bool,
    /// `Some(true)` permits lossy coercions, `Some(false)` forbids them,
    /// `None` defers to the default policy.
    pub allow_downcast: Option<bool>,
    /// Store the given value without copying it first.
    pub borrow: bool,
    /// Override the inferred broadcastable pattern (tensor values only).
    pub broadcastable: Option<Vec<bool>>,
}

impl SharedOptions {
    /// Names accepted by [`SharedOptions::set`].
    pub const KEYS: [&'static str; 5] = ["name", "strict", "allow_downcast", "borrow", "broadcastable"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn allow_downcast(mut self, allow: impl Into<Option<bool>>) -> Self {
        self.allow_downcast = allow.into();
        self
    }

    pub fn borrow(mut self, borrow: bool) -> Self {
        self.borrow = borrow;
        self
    }

    pub fn broadcastable(mut self, pattern: impl Into<Vec<bool>>) -> Self {
        self.broadcastable = Some(pattern.into());
        self
    }

    /// Set an option by name.
    pub fn set(mut self, key: &str, value: impl Into<OptionValue>) -> Result<Self> {
        let value = value.into();
        let invalid = |expected| Error::InvalidOption {
            key: key.to_string(),
            expected,
        };
        match (key, value) {
            ("name", OptionValue::Str(s)) => self.name = Some(s),
            ("name", OptionValue::Null) => self.name = None,
            ("name", _) => return Err(invalid("a string or null")),
            ("strict", OptionValue::Bool(b)) => self.strict = b,
            ("strict", _) => return Err(invalid("a bool")),
            ("allow_downcast", OptionValue::Bool(b)) => self.allow_downcast = Some(b),
            ("allow_downcast", OptionValue::Null) => self.allow_downcast = None,
            ("allow_downcast", _) => return Err(invalid("a bool or null")),
            ("borrow", OptionValue::Bool(b)) => self.borrow = b,
            ("borrow", _) => return Err(invalid("a bool")),
            ("broadcastable", OptionValue::Pattern(p)) => self.broadcastable = Some(p),
            ("broadcastable", OptionValue::Null) => self.broadcastable = None,
            ("broadcastable", _) => return Err(invalid("a list of bools or null")),
            (other, _) => return Err(Error::UnknownOption(other.to_string())),
        }
        Ok(self)
    }

    /// Build options from `(key, value)` pairs, failing on the first bad one.
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<OptionValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .try_fold(Self::default(), |opts, (k, v)| opts.set(k.as_ref(), v))
    }
}

/// Create a shared variable with default options, inferring its type.
pub fn shared(value: impl Into<Value>) -> Result<SharedVariable> {
    shared_with(value, SharedOptions::default())
}

/// Create a shared variable, inferring its type from `value`.
///
/// Scalar host values are stored as rank-0 arrays of their inferred dtype,
/// so they satisfy `strict` like any array of the right dtype.
pub fn shared_with(value: impl Into<Value>, options: SharedOptions) -> Result<SharedVariable> {
    let value = value.into();
    reject_symbolic(&value)?;

    let ty = match (infer_type(&value)?, options.broadcastable) {
        (Type::Tensor(t), Some(pattern)) => {
            if pattern.len() != t.ndim() {
                return Err(Error::RankMismatch {
                    expected: pattern.len(),
                    got: t.ndim(),
                });
            }
            Type::Tensor(TensorType::new(t.dtype(), pattern))
        }
        (Type::Generic, Some(_)) => {
            return Err(Error::InvalidOption {
                key: "broadcastable".to_string(),
                expected: "a tensor-valued shared variable",
            })
        }
        (ty, None) => ty,
    };

    let value = match (&ty, value) {
        (Type::Tensor(t), v @ (Value::Int(_) | Value::Float(_) | Value::Scalar(_))) => {
            // a fresh array, so there is nothing left to copy
            let array = coerce::filter_tensor(t, v, Policy::RejectDowncast, &config::current())?;
            Value::Array(array)
        }
        (_, v) if options.borrow => v,
        (_, v) => v.deep_copy(),
    };

    SharedVariable::new(
        options.name,
        ty,
        value,
        options.strict,
        options.allow_downcast,
    )
}
