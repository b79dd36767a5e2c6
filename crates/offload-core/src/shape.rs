//! Array shapes and memory layouts

use crate::error::{Error, Result};
use std::fmt;

/// Order in which a multi-dimensional array is laid out in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum Layout {
    /// Last index varies fastest (C order)
    #[default]
    RowMajor,
    /// First index varies fastest (Fortran order)
    ColumnMajor,
}

/// Ordered sequence of positive extents
///
/// An empty shape is a rank-0 array holding a single element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Build a shape, rejecting zero extents
    pub fn new(dims: impl Into<Vec<usize>>) -> Result<Self> {
        let dims = dims.into();
        if let Some(axis) = dims.iter().position(|&d| d == 0) {
            return Err(Error::InvalidArgument(format!(
                "extent of axis {axis} must be positive in shape {dims:?}"
            )));
        }
        if dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d)).is_none() {
            return Err(Error::InvalidArgument(format!(
                "element count of shape {dims:?} overflows usize"
            )));
        }
        Ok(Self(dims))
    }

    /// Rank-0 shape
    pub fn scalar() -> Self {
        Self(Vec::new())
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Number of elements (1 for rank 0)
    pub fn size(&self) -> usize {
        self.0.iter().product()
    }

    /// Element strides for `layout`
    pub fn strides(&self, layout: Layout) -> Vec<usize> {
        let mut strides = vec![0; self.rank()];
        let mut acc = 1;
        match layout {
            Layout::RowMajor => {
                for (stride, &dim) in strides.iter_mut().zip(&self.0).rev() {
                    *stride = acc;
                    acc *= dim;
                }
            }
            Layout::ColumnMajor => {
                for (stride, &dim) in strides.iter_mut().zip(&self.0) {
                    *stride = acc;
                    acc *= dim;
                }
            }
        }
        strides
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dim}")?;
        }
        if self.0.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

/// Conversion into a validated [`Shape`]
///
/// A single integer is a 1-tuple; slices, arrays and vectors give one extent
/// per axis.
pub trait IntoShape {
    fn into_shape(self) -> Result<Shape>;
}

impl IntoShape for Shape {
    fn into_shape(self) -> Result<Shape> {
        Ok(self)
    }
}

impl IntoShape for &Shape {
    fn into_shape(self) -> Result<Shape> {
        Ok(self.clone())
    }
}

impl IntoShape for usize {
    fn into_shape(self) -> Result<Shape> {
        Shape::new(vec![self])
    }
}

impl IntoShape for Vec<usize> {
    fn into_shape(self) -> Result<Shape> {
        Shape::new(self)
    }
}

impl IntoShape for &[usize] {
    fn into_shape(self) -> Result<Shape> {
        Shape::new(self.to_vec())
    }
}

impl<const N: usize> IntoShape for [usize; N] {
    fn into_shape(self) -> Result<Shape> {
        Shape::new(self.to_vec())
    }
}

impl<const N: usize> IntoShape for &[usize; N] {
    fn into_shape(self) -> Result<Shape> {
        Shape::new(self.to_vec())
    }
}
