//! # roipool-neural
//!
//! Layer wrappers around the `roipool-core` kernel for detection heads.
//!
//! ```rust
//! use roipool_core::Tensor;
//! use roipool_neural::RoiPool2D;
//!
//! # fn main() -> roipool_core::Result<()> {
//! let features = Tensor::<f32>::zeros(&[1, 14, 14, 64]);
//! let rois = Tensor::from_vec(vec![0, 2, 2, 9, 11], &[1, 5])?;
//!
//! let layer = RoiPool2D::square(7)?;
//! let pooled = layer.forward(&features, &rois)?;
//! assert_eq!(pooled.shape().dims(), &[1, 7, 7, 64]);
//! # Ok(())
//! # }
//! ```

pub mod layers;

pub use layers::pooling::RoiPool2D;
