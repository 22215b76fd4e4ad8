use std::fmt;

use crate::dtype::DType;
use crate::types::{TensorType, Type};

// Symbolic graph nodes
//
// The graph itself (ops, compilation, evaluation) lives elsewhere. What
// this crate needs is just enough of a node to tell it apart from a host
// value: a shared variable wraps concrete data, and handing it a symbolic
// expression instead is always an error.
//
// Every node gets a VariableId from a global counter, the same scheme the
// shared variables themselves use, so a shared variable viewed as a graph
// node (SharedVariable::as_symbolic) keeps its identity.

/// Unique identifier for a graph variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub(crate) u64);

impl Default for VariableId {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableId {
    /// Generate a new unique variable ID (uses a global atomic counter).
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        VariableId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Where a symbolic variable comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A free input supplied at evaluation time.
    Input,
    /// A shared variable seen from inside the graph.
    Shared,
    /// Output of the named operation.
    Op(String),
}

/// A typed node of a computation graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbolic {
    id: VariableId,
    name: Option<String>,
    ty: Type,
    origin: Origin,
}

impl Symbolic {
    pub fn new(ty: impl Into<Type>, origin: Origin) -> Self {
        Symbolic {
            id: VariableId::new(),
            name: None,
            ty: ty.into(),
            origin,
        }
    }

    /// A free graph input of the given type.
    pub fn input(ty: impl Into<Type>) -> Self {
        Self::new(ty, Origin::Input)
    }

    pub(crate) fn from_parts(
        id: VariableId,
        name: Option<String>,
        ty: Type,
        origin: Origin,
    ) -> Self {
        Symbolic {
            id,
            name,
            ty,
            origin,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }
}

impl fmt::Display for Symbolic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.origin) {
            (Some(name), _) => write!(f, "{}", name),
            (None, Origin::Op(op)) => write!(f, "{}.out", op),
            (None, _) => write!(f, "<{}>", self.ty),
        }
    }
}

/// Symbolic tensor of ones with the given extents.
///
/// Only the type is tracked: extents of 1 become broadcastable dimensions.
pub fn ones(dims: &[usize], dtype: DType) -> Symbolic {
    let pattern = dims.iter().map(|&d| d == 1).collect::<Vec<_>>();
    Symbolic::new(TensorType::new(dtype, pattern), Origin::Op("alloc".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = VariableId::new();
        let b = VariableId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_ones_type() {
        let s = ones(&[2, 1], DType::F64);
        assert_eq!(s.ty(), &Type::Tensor(TensorType::new(DType::F64, [false, true])));
        assert_eq!(s.origin(), &Origin::Op("alloc".into()));
        assert_eq!(s.to_string(), "alloc.out");
    }

    #[test]
    fn test_named_input() {
        let x = Symbolic::input(TensorType::vector(DType::F32)).with_name("x");
        assert_eq!(x.name(), Some("x"));
        assert_eq!(x.to_string(), "x");
    }
}
