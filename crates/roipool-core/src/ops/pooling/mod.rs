//! Pooling operations
//!
//! - ROI max pooling with argmax bookkeeping for detection heads
//! - Region parsing and per-bin window geometry

pub mod region;
pub mod roi_pooling;

pub use region::{parse_regions, Region, RoiWindow, REGION_LEN};
pub use roi_pooling::{
    roi_pool, roi_pool2d, roi_pool2d_with_config, roi_pool_into, roi_pool_output_shape,
    roi_pool_with_config, RoiPoolOutput, EMPTY_INDEX, WINDOW_MAX_SENTINEL,
};
