use num_traits::Float;
use roipool_core::{
    roi_pool2d_with_config, roi_pool_output_shape, Result, RoiPoolConfig, RoiPoolOutput, Shape,
    Tensor, TensorError,
};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use tracing::trace;

/// ROI (Region of Interest) Pooling Layer
/// Used in object detection models like Fast R-CNN
///
/// The pooled size is fixed when the layer is built; every call pools each
/// region of a `[batch, height, width, channels]` feature map onto that grid.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct RoiPool2D {
    pooled_size: (usize, usize),
    #[cfg_attr(feature = "serialize", serde(default))]
    config: RoiPoolConfig,
}

impl RoiPool2D {
    pub fn new(pooled_size: (usize, usize)) -> Result<Self> {
        let (pool_height, pool_width) = pooled_size;
        if pool_height == 0 || pool_width == 0 {
            return Err(TensorError::invalid_argument_op(
                "RoiPool2D::new",
                &format!(
                    "pool size must be positive, got {}x{}",
                    pool_height, pool_width
                ),
            ));
        }
        Ok(Self {
            pooled_size,
            config: RoiPoolConfig::default(),
        })
    }

    /// Square pooled size constructor
    pub fn square(size: usize) -> Result<Self> {
        Self::new((size, size))
    }

    pub fn with_config(mut self, config: RoiPoolConfig) -> Self {
        self.config = config;
        self
    }

    pub fn pooled_size(&self) -> (usize, usize) {
        self.pooled_size
    }

    pub fn config(&self) -> &RoiPoolConfig {
        &self.config
    }

    /// Output shape for `n_rois` regions over a feature map of `input_shape`
    pub fn output_shape(&self, input_shape: &Shape, n_rois: usize) -> Result<Shape> {
        roi_pool_output_shape(input_shape, n_rois, self.pooled_size)
    }

    /// Pooled values only
    pub fn forward<T>(&self, feature_maps: &Tensor<T>, rois: &Tensor<i32>) -> Result<Tensor<T>>
    where
        T: Float + Send + Sync,
    {
        Ok(self.forward_with_indices(feature_maps, rois)?.output)
    }

    /// Pooled values together with the argmax index map
    pub fn forward_with_indices<T>(
        &self,
        feature_maps: &Tensor<T>,
        rois: &Tensor<i32>,
    ) -> Result<RoiPoolOutput<T>>
    where
        T: Float + Send + Sync,
    {
        trace!(
            input = %feature_maps.shape(),
            rois = %rois.shape(),
            "RoiPool2D forward"
        );
        roi_pool2d_with_config(feature_maps, rois, self.pooled_size, &self.config)
    }
}

impl Default for RoiPool2D {
    fn default() -> Self {
        Self {
            pooled_size: (2, 2),
            config: RoiPoolConfig::default(),
        }
    }
}
