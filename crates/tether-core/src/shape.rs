use std::fmt;

// Shape: extents of a host array
//
// A Shape lists the extent of every dimension of a host value:
//   - Scalar: Shape([])        - 0 dimensions, 1 element
//   - Vector: Shape([5])       - 1 dimension, 5 elements
//   - Matrix: Shape([5, 5])    - 2 dimensions, 25 elements
//
// Tensor types do not carry extents, only a broadcastable flag per
// dimension. A dimension with extent 1 is the only kind a broadcastable
// flag admits, so broadcast_pattern() is the bridge from a concrete shape
// to the pattern of the tightest type that describes it.

/// N-dimensional shape of a host array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Create a new shape from a vector of dimension sizes.
    pub fn new(dims: Vec<usize>) -> Self {
        Shape(dims)
    }

    /// The dimension sizes as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of dimensions (0 for scalar, 1 for vector, 2 for matrix, etc.).
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements (product of all dimensions).
    /// A scalar shape [] has 1 element, any zero extent gives 0.
    pub fn elem_count(&self) -> usize {
        self.0.iter().product::<usize>()
    }

    /// Size of a specific dimension.
    pub fn dim(&self, d: usize) -> Option<usize> {
        self.0.get(d).copied()
    }

    /// Broadcastable flag per dimension: `true` exactly where the extent is 1.
    ///
    /// ```
    /// use tether_core::Shape;
    /// assert_eq!(Shape::from((5, 1, 2)).broadcast_pattern(), vec![false, true, false]);
    /// ```
    pub fn broadcast_pattern(&self) -> Vec<bool> {
        self.0.iter().map(|&d| d == 1).collect()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

// Convenient From implementations
// These let you write: Shape::from((3, 4)) instead of Shape::new(vec![3, 4])

impl From<()> for Shape {
    /// Scalar shape (0 dimensions).
    fn from(_: ()) -> Self {
        Shape(vec![])
    }
}

impl From<usize> for Shape {
    /// 1-D shape.
    fn from(d: usize) -> Self {
        Shape(vec![d])
    }
}

impl From<(usize, usize)> for Shape {
    fn from((d0, d1): (usize, usize)) -> Self {
        Shape(vec![d0, d1])
    }
}

impl From<(usize, usize, usize)> for Shape {
    fn from((d0, d1, d2): (usize, usize, usize)) -> Self {
        Shape(vec![d0, d1, d2])
    }
}

impl From<Vec<usize>> for Shape {
    fn from(v: Vec<usize>) -> Self {
        Shape(v)
    }
}

impl From<&[usize]> for Shape {
    fn from(s: &[usize]) -> Self {
        Shape(s.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(s: [usize; N]) -> Self {
        Shape(s.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shape() {
        let s = Shape::from(());
        assert_eq!(s.rank(), 0);
        assert_eq!(s.elem_count(), 1);
        assert!(s.broadcast_pattern().is_empty());
    }

    #[test]
    fn test_empty_vector_shape() {
        let s = Shape::from(0);
        assert_eq!(s.rank(), 1);
        assert_eq!(s.elem_count(), 0);
        assert_eq!(s.broadcast_pattern(), vec![false]);
    }

    #[test]
    fn test_matrix_shape() {
        let s = Shape::from((3, 4));
        assert_eq!(s.rank(), 2);
        assert_eq!(s.elem_count(), 12);
        assert_eq!(s.dim(1), Some(4));
        assert_eq!(s.dim(2), None);
    }

    #[test]
    fn test_broadcast_pattern() {
        assert_eq!(
            Shape::from([1, 1, 3, 1]).broadcast_pattern(),
            vec![true, true, false, true]
        );
    }

    #[test]
    fn test_display() {
        let s = Shape::from((3, 4));
        assert_eq!(format!("{}", s), "[3, 4]");
        assert_eq!(format!("{}", Shape::from(())), "[]");
    }
}
