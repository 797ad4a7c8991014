//! Region-of-interest max pooling.
//!
//! Pools variable-sized regions of a `[batch, height, width, channels]`
//! feature map onto a fixed grid and records the source offset of every
//! pooled maximum.
//!
//! ```rust
//! use roipool_core::{roi_pool, Shape};
//!
//! # fn main() -> roipool_core::Result<()> {
//! let feature_map: Vec<f32> = (0..16).map(|v| v as f32).collect();
//! let shape = Shape::from([1, 4, 4, 1]);
//! let rois = [0, 0, 0, 3, 3];
//!
//! let (output, indices) = roi_pool(&feature_map, &shape, &rois, 2, 2)?;
//! assert_eq!(output, vec![5.0, 7.0, 13.0, 15.0]);
//! assert_eq!(indices, vec![5, 7, 13, 15]);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::result_large_err)]

pub mod config;
pub mod error;
pub mod ops;
pub mod shape;
pub mod tensor;

pub use config::{ExecutionStrategy, RoiPoolConfig};
pub use error::{Result, TensorError};
pub use ops::{
    parse_regions, roi_pool, roi_pool2d, roi_pool2d_with_config, roi_pool_into,
    roi_pool_output_shape, roi_pool_with_config, Region, RoiPoolOutput, RoiWindow,
};
pub use shape::Shape;
pub use tensor::Tensor;
