//! # roipool
//!
//! Region-of-interest max pooling for detection-style network heads.
//!
//! - **core**: the pooling kernel over flat NHWC buffers and tensors, with the
//!   argmax index map a backward pass needs
//! - **neural**: the `RoiPool2D` layer with its pool size fixed at construction
//!
//! ## Quick Start
//!
//! ```rust
//! use roipool::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let features = Tensor::from_vec((0..16).map(|v| v as f32).collect(), &[1, 4, 4, 1])?;
//! let rois = Tensor::from_vec(vec![0, 0, 0, 3, 3], &[1, 5])?;
//!
//! let pooled = RoiPool2D::default().forward_with_indices(&features, &rois)?;
//! assert_eq!(pooled.output.data(), &[5.0, 7.0, 13.0, 15.0]);
//! assert_eq!(pooled.indices.data(), &[5, 7, 13, 15]);
//! # Ok(())
//! # }
//! ```

pub use roipool_core as core;
pub use roipool_neural as neural;

/// Prelude module for convenient imports
pub mod prelude {
    // Core types
    pub use crate::core::ops;
    pub use crate::core::{
        roi_pool, roi_pool2d, ExecutionStrategy, Region, RoiPoolConfig, RoiPoolOutput, Shape,
        Tensor, TensorError,
    };

    // Layers
    pub use crate::neural::RoiPool2D;
}
