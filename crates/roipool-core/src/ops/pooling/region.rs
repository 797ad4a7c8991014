//! Regions of interest and the per-bin window geometry.
//!
//! A region is `(batch_index, top, left, bottom, right)` with inclusive pixel
//! bounds in `(row, col)` order. Each output bin `(ph, pw)` maps onto a
//! sub-window of the feature map:
//!
//! ```text
//! bin_h  = max(1, bottom - top + 1) / pool_height        (f32)
//! hstart = floor(ph * bin_h)       + top    clamped to [0, height]
//! hend   = ceil((ph + 1) * bin_h)  + top    clamped to [0, height]
//! ```
//!
//! and symmetrically for columns. The window is `[hstart, hend) x [wstart, wend)`.

use crate::{Result, TensorError};

/// Number of `i32` values describing one region.
pub const REGION_LEN: usize = 5;

/// One region of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    pub batch_index: i32,
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl Region {
    pub fn new(batch_index: i32, top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            batch_index,
            top,
            left,
            bottom,
            right,
        }
    }

    /// Read a region from exactly five values.
    pub fn from_slice(values: &[i32]) -> Result<Self> {
        match *values {
            [batch_index, top, left, bottom, right] => {
                Ok(Self::new(batch_index, top, left, bottom, right))
            }
            _ => Err(TensorError::shape_mismatch(
                "Region::from_slice",
                &format!("{REGION_LEN} values"),
                &format!("{} values", values.len()),
            )),
        }
    }

    pub fn to_array(&self) -> [i32; REGION_LEN] {
        [
            self.batch_index,
            self.top,
            self.left,
            self.bottom,
            self.right,
        ]
    }

    /// Row extent, at least 1 for inverted or zero-extent regions.
    pub fn height(&self) -> i64 {
        (i64::from(self.bottom) - i64::from(self.top) + 1).max(1)
    }

    /// Column extent, at least 1 for inverted or zero-extent regions.
    pub fn width(&self) -> i64 {
        (i64::from(self.right) - i64::from(self.left) + 1).max(1)
    }
}

impl From<[i32; REGION_LEN]> for Region {
    fn from(v: [i32; REGION_LEN]) -> Self {
        Self::new(v[0], v[1], v[2], v[3], v[4])
    }
}

/// Split a flat `[n_rois * 5]` buffer into regions.
pub fn parse_regions(rois: &[i32]) -> Result<Vec<Region>> {
    if rois.len() % REGION_LEN != 0 {
        return Err(TensorError::invalid_shape(
            "parse_regions",
            &format!("a multiple of {REGION_LEN} region values"),
            &format!("{} values", rois.len()),
        ));
    }
    rois.chunks_exact(REGION_LEN).map(Region::from_slice).collect()
}

/// Clamped source window of one output bin. Bounds are half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiWindow {
    pub hstart: usize,
    pub hend: usize,
    pub wstart: usize,
    pub wend: usize,
}

impl RoiWindow {
    /// Window of bin `(ph, pw)` of `region` on a `height x width` map.
    ///
    /// Bin sizes are computed in `f32` so rounding at the bin edges is the
    /// same for every element type.
    pub fn compute(
        region: &Region,
        ph: usize,
        pw: usize,
        pooled_size: (usize, usize),
        height: usize,
        width: usize,
    ) -> Self {
        let (pool_height, pool_width) = pooled_size;
        let bin_h = region.height() as f32 / pool_height as f32;
        let bin_w = region.width() as f32 / pool_width as f32;

        let hstart = (ph as f32 * bin_h).floor() as i64;
        let wstart = (pw as f32 * bin_w).floor() as i64;
        let hend = ((ph + 1) as f32 * bin_h).ceil() as i64;
        let wend = ((pw + 1) as f32 * bin_w).ceil() as i64;

        let top = i64::from(region.top);
        let left = i64::from(region.left);

        Self {
            hstart: force_within(hstart + top, height),
            hend: force_within(hend + top, height),
            wstart: force_within(wstart + left, width),
            wend: force_within(wend + left, width),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hend <= self.hstart || self.wend <= self.wstart
    }

    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.hend - self.hstart) * (self.wend - self.wstart)
        }
    }
}

#[inline]
fn force_within(x: i64, upper: usize) -> usize {
    x.clamp(0, upper as i64) as usize
}
