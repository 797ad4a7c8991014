#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Dimensions of a dense row-major tensor, last axis fastest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    pub fn from_slice(dims: &[usize]) -> Self {
        Self {
            dims: dims.to_vec(),
        }
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Number of elements, saturating at `usize::MAX`.
    pub fn size(&self) -> usize {
        self.checked_size().unwrap_or(usize::MAX)
    }

    /// Number of elements, or `None` if the product overflows `usize`.
    pub fn checked_size(&self) -> Option<usize> {
        self.dims
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Row-major strides in elements.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.dims.len()];
        for axis in (0..self.dims.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * self.dims[axis + 1];
        }
        strides
    }

    /// Flat offset of `coords`, or `None` if the rank differs or any
    /// coordinate is out of range.
    pub fn ravel(&self, coords: &[usize]) -> Option<usize> {
        if coords.len() != self.dims.len() {
            return None;
        }
        let mut offset = 0;
        for (&coord, &dim) in coords.iter().zip(&self.dims) {
            if coord >= dim {
                return None;
            }
            offset = offset * dim + coord;
        }
        Some(offset)
    }

    /// Inverse of [`Shape::ravel`].
    pub fn unravel(&self, mut offset: usize) -> Option<Vec<usize>> {
        if offset >= self.checked_size()? {
            return None;
        }
        let mut coords = vec![0; self.dims.len()];
        for axis in (0..self.dims.len()).rev() {
            coords[axis] = offset % self.dims[axis];
            offset /= self.dims[axis];
        }
        Some(coords)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::from_slice(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims.to_vec())
    }
}

impl Index<usize> for Shape {
    type Output = usize;

    fn index(&self, index: usize) -> &Self::Output {
        &self.dims[index]
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dim}")?;
        }
        write!(f, "]")
    }
}
