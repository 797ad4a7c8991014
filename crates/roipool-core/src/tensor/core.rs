//! Core Tensor Structure and Properties
//!
//! A dense, contiguous, row-major CPU buffer paired with its [`Shape`]. This is
//! the boundary type the pooling ops accept from and hand back to a host.

use crate::Shape;

/// Core tensor structure that holds data and metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    pub(in crate::tensor) data: Vec<T>,
    pub(in crate::tensor) shape: Shape,
}

impl<T> Tensor<T> {
    /// Get the shape of the tensor
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Get a reference to the underlying flat data
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consume the tensor and return buffer and shape
    pub fn into_parts(self) -> (Vec<T>, Shape) {
        (self.data, self.shape)
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the element at a multi-dimensional index
    pub fn get(&self, index: &[usize]) -> Option<T>
    where
        T: Copy,
    {
        self.shape.ravel(index).map(|offset| self.data[offset])
    }
}
