pub mod pooling;

pub use pooling::{
    parse_regions, roi_pool, roi_pool2d, roi_pool2d_with_config, roi_pool_into,
    roi_pool_output_shape, roi_pool_with_config, Region, RoiPoolOutput, RoiWindow,
};
