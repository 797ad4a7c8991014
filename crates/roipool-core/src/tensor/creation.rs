//! Tensor Creation and Construction

use super::core::Tensor;
use crate::{Result, Shape, TensorError};

impl<T: Clone> Tensor<T> {
    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize]) -> Self
    where
        T: num_traits::Zero,
    {
        Self::full(shape, T::zero())
    }

    /// Create a tensor with every element set to `value`
    pub fn full(shape: &[usize], value: T) -> Self {
        let shape = Shape::from_slice(shape);
        Self {
            data: vec![value; shape.size()],
            shape,
        }
    }
}

impl<T> Tensor<T> {
    /// Create a tensor from raw data vector with specified shape
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        let total_elements = Shape::from_slice(shape).checked_size().ok_or_else(|| {
            TensorError::invalid_shape_dims("from_vec", "element count overflows usize", shape)
        })?;
        if data.len() != total_elements {
            return Err(TensorError::shape_mismatch(
                "from_vec",
                &format!("{} elements for shape {:?}", total_elements, shape),
                &format!("{} elements", data.len()),
            ));
        }

        Ok(Self {
            data,
            shape: Shape::from_slice(shape),
        })
    }
}
