use std::collections::BTreeMap;

use ndarray::ArrayD;

use crate::array::HostArray;
use crate::dtype::Element;
use crate::graph::Symbolic;
use crate::scalar::Scalar;

// Value: everything a caller can hand to a shared variable
//
// Host values come in several shapes, and the distinctions matter for
// typing and coercion:
//
//   Int / Float  - plain host numbers with no width of their own; typed
//                  through the configuration (default int width, float64)
//   Scalar       - fixed-width scalars (i16, f32, ...), typed exactly
//   Array        - typed n-d arrays, the only representation strict mode
//                  accepts for tensor types
//   List         - nested sequences; array-convertible when rectangular
//                  and numeric, never typed as tensors by themselves
//   Str / Map    - opaque objects, only generic-typed variables hold them
//   Symbolic     - graph nodes, never accepted as shared values

/// A host value or a symbolic graph node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Scalar(Scalar),
    Array(HostArray),
    List(Vec<Value>),
    Str(String),
    Map(BTreeMap<String, Value>),
    Symbolic(Symbolic),
}

impl Value {
    /// Plain host integer.
    pub fn int(v: i64) -> Self {
        Value::Int(v)
    }

    /// Plain host float.
    pub fn float(v: f64) -> Self {
        Value::Float(v)
    }

    pub fn list(items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Empty mapping.
    pub fn map() -> Self {
        Value::Map(BTreeMap::new())
    }

    pub fn as_array(&self) -> Option<&HostArray> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Short human-readable description, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Value::Int(v) => format!("host int {}", v),
            Value::Float(v) => format!("host float {}", v),
            Value::Scalar(s) => format!("{} scalar {}", s.dtype(), s),
            Value::Array(a) => format!("{} array of shape {}", a.dtype(), a.shape()),
            Value::List(items) => format!("sequence of {} items", items.len()),
            Value::Str(s) => format!("string {:?}", s),
            Value::Map(m) => format!("mapping with {} entries", m.len()),
            Value::Symbolic(s) => format!("symbolic variable {}", s),
        }
    }

    /// Copy that shares no array storage with `self`.
    pub fn deep_copy(&self) -> Self {
        match self {
            Value::Array(a) => Value::Array(a.deep_copy()),
            Value::List(items) => Value::List(items.iter().map(Value::deep_copy).collect()),
            Value::Map(m) => Value::Map(
                m.iter()
                    .map(|(k, v)| (k.clone(), v.deep_copy()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

// Conversions: fixed-width primitives become Scalars, `isize` is the plain
// host integer (its width is the platform's, like the default int dtype).

macro_rules! impl_from_scalar_primitive {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Scalar(Scalar::from(v))
                }
            }
        )*
    };
}

impl_from_scalar_primitive!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<HostArray> for Value {
    fn from(a: HostArray) -> Self {
        Value::Array(a)
    }
}

impl<T: Element> From<ArrayD<T>> for Value {
    fn from(a: ArrayD<T>) -> Self {
        Value::Array(HostArray::new(a))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(m: BTreeMap<String, Value>) -> Self {
        Value::Map(m)
    }
}

impl From<Symbolic> for Value {
    fn from(s: Symbolic) -> Self {
        Value::Symbolic(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DType;

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(7i16), Value::Scalar(Scalar::I16(7)));
        assert_eq!(Value::from(7isize), Value::Int(7));
        assert_eq!(Value::from(2.5f32), Value::Scalar(Scalar::F32(2.5)));
    }

    #[test]
    fn test_list_builder() {
        let v = Value::list([Value::float(1.0), Value::float(2.0)]);
        assert_eq!(v, Value::List(vec![Value::Float(1.0), Value::Float(2.0)]));
    }

    #[test]
    fn test_deep_copy_unaliases_nested_arrays() {
        let a = HostArray::zeros(3, DType::F32);
        let v = Value::List(vec![Value::Array(a.clone())]);
        let copy = v.deep_copy();
        let Value::List(items) = copy else {
            panic!("expected list")
        };
        let inner = items[0].as_array().unwrap();
        assert!(!inner.ptr_eq(&a));
        assert_eq!(inner, &a);
    }

    #[test]
    fn test_describe() {
        assert_eq!(Value::from("asdf").describe(), "string \"asdf\"");
        assert_eq!(Value::map().describe(), "mapping with 0 entries");
        assert_eq!(
            Value::from(HostArray::zeros((5, 5), DType::F32)).describe(),
            "float32 array of shape [5, 5]"
        );
    }
}
