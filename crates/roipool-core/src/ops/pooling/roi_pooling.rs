//! ROI (Region of Interest) max pooling for object detection heads
//!
//! Every region of a `[batch, height, width, channels]` feature map is pooled
//! onto a fixed `[pool_height, pool_width]` grid. Besides the pooled values the
//! op records, per output cell, the flat feature-map offset of the element that
//! won the max (or `-1` for an empty window) so that a backward pass can route
//! gradients back to their source.
//!
//! Output layout for both buffers: `[n_rois, pool_height, pool_width, channels]`,
//! row-major, channel fastest.

use super::region::{parse_regions, Region, RoiWindow, REGION_LEN};
use crate::config::RoiPoolConfig;
use crate::{Result, Shape, Tensor, TensorError};
use num_traits::{Float, NumCast};
use tracing::{debug, debug_span, warn};

/// Running-max seed for non-empty windows.
///
/// Windows whose values never exceed it keep it as output with index `-1`.
pub const WINDOW_MAX_SENTINEL: f32 = -99999999.0;

/// Index written for cells whose window is empty.
pub const EMPTY_INDEX: i32 = -1;

/// Pooled values plus the argmax index map of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiPoolOutput<T> {
    /// `[n_rois, pool_height, pool_width, channels]`
    pub output: Tensor<T>,
    /// Same shape as `output`; flat offsets into the input feature map
    pub indices: Tensor<i32>,
    input_shape: Shape,
}

impl<T> RoiPoolOutput<T> {
    /// Shape of the feature map the indices point into
    pub fn input_shape(&self) -> &Shape {
        &self.input_shape
    }

    /// Decode the argmax of output cell `cell` (flat offset into `output`) into
    /// `[n, h, w, c]` coordinates of the feature map.
    ///
    /// Returns `None` for out-of-range cells and for the `-1` sentinel.
    pub fn argmax_coords(&self, cell: usize) -> Option<[usize; 4]> {
        let index = *self.indices.data().get(cell)?;
        let offset = usize::try_from(index).ok()?;
        self.input_shape.unravel(offset)?.try_into().ok()
    }

    pub fn into_parts(self) -> (Tensor<T>, Tensor<i32>) {
        (self.output, self.indices)
    }
}

/// Validated dimensions of one pooling call.
#[derive(Debug, Clone, Copy)]
struct PoolGeometry {
    height: usize,
    width: usize,
    channels: usize,
    pool_height: usize,
    pool_width: usize,
}

impl PoolGeometry {
    fn cells_per_region(&self) -> usize {
        self.pool_height * self.pool_width * self.channels
    }
}

/// Shape of the pooled output for `n_rois` regions over `input_shape`.
pub fn roi_pool_output_shape(
    input_shape: &Shape,
    n_rois: usize,
    pooled_size: (usize, usize),
) -> Result<Shape> {
    if input_shape.rank() != 4 {
        return Err(TensorError::invalid_shape_dims(
            "roi_pool",
            &format!(
                "feature map must be 4D [batch, height, width, channels], got {}D",
                input_shape.rank()
            ),
            input_shape.dims(),
        ));
    }
    check_pooled_size(pooled_size)?;
    let out_shape = Shape::from([n_rois, pooled_size.0, pooled_size.1, input_shape[3]]);
    if out_shape.checked_size().is_none() {
        return Err(TensorError::invalid_argument_op(
            "roi_pool",
            &format!("pooled output {} overflows usize", out_shape),
        ));
    }
    Ok(out_shape)
}

fn check_pooled_size((pool_height, pool_width): (usize, usize)) -> Result<()> {
    if pool_height == 0 || pool_width == 0 {
        return Err(TensorError::invalid_argument_op(
            "roi_pool",
            &format!(
                "pool size must be positive, got {}x{}",
                pool_height, pool_width
            ),
        ));
    }
    Ok(())
}

fn check_inputs(
    feature_len: usize,
    shape: &Shape,
    regions: &[Region],
    pooled_size: (usize, usize),
) -> Result<PoolGeometry> {
    roi_pool_output_shape(shape, regions.len(), pooled_size)?;

    let expected_len = shape.checked_size().ok_or_else(|| {
        TensorError::invalid_shape_dims(
            "roi_pool",
            "feature map element count overflows usize",
            shape.dims(),
        )
    })?;
    if feature_len != expected_len {
        return Err(TensorError::shape_mismatch(
            "roi_pool",
            &format!("{} feature values for shape {}", expected_len, shape),
            &format!("{} values", feature_len),
        ));
    }
    if feature_len > i32::MAX as usize {
        return Err(TensorError::index_overflow("roi_pool", feature_len));
    }

    let batch_size = shape[0];
    for (n, region) in regions.iter().enumerate() {
        let in_range = usize::try_from(region.batch_index).is_ok_and(|b| b < batch_size);
        if !in_range {
            return Err(TensorError::batch_index_out_of_range(
                "roi_pool",
                n,
                region.batch_index,
                batch_size,
            ));
        }
    }

    Ok(PoolGeometry {
        height: shape[1],
        width: shape[2],
        channels: shape[3],
        pool_height: pooled_size.0,
        pool_width: pooled_size.1,
    })
}

/// Pool every region of a flat NHWC feature map into caller-owned buffers.
///
/// `rois` holds `n_rois * 5` values `(batch_index, top, left, bottom, right)`.
/// `output` and `indices` must both hold `n_rois * pool_height * pool_width *
/// channels` elements. All preconditions are checked before anything is
/// written.
pub fn roi_pool_into<T>(
    feature_map: &[T],
    shape: &Shape,
    rois: &[i32],
    pooled_size: (usize, usize),
    output: &mut [T],
    indices: &mut [i32],
    config: &RoiPoolConfig,
) -> Result<()>
where
    T: Float + Send + Sync,
{
    let _span = debug_span!(
        "roi_pool",
        n_rois = rois.len() / REGION_LEN,
        pool_height = pooled_size.0,
        pool_width = pooled_size.1
    )
    .entered();

    let regions = parse_regions(rois).inspect_err(|e| warn!(error = %e, "rejected rois"))?;
    let geometry = check_inputs(feature_map.len(), shape, &regions, pooled_size)
        .inspect_err(|e| warn!(error = %e, "rejected roi_pool inputs"))?;

    let expected = regions.len() * geometry.cells_per_region();
    for (name, len) in [("output", output.len()), ("indices", indices.len())] {
        if len != expected {
            let err = TensorError::shape_mismatch(
                "roi_pool",
                &format!("{} {} elements", expected, name),
                &format!("{} elements", len),
            );
            warn!(error = %err, "rejected roi_pool buffers");
            return Err(err);
        }
    }

    run_kernel(feature_map, &regions, &geometry, output, indices, config);
    Ok(())
}

/// Pool a flat NHWC feature map with the default configuration.
///
/// Returns `(output, indices)`, both shaped `[n_rois, pool_height, pool_width,
/// channels]`.
pub fn roi_pool<T>(
    feature_map: &[T],
    shape: &Shape,
    rois: &[i32],
    pool_height: usize,
    pool_width: usize,
) -> Result<(Vec<T>, Vec<i32>)>
where
    T: Float + Send + Sync,
{
    roi_pool_with_config(
        feature_map,
        shape,
        rois,
        pool_height,
        pool_width,
        &RoiPoolConfig::default(),
    )
}

/// [`roi_pool`] with an explicit execution configuration.
pub fn roi_pool_with_config<T>(
    feature_map: &[T],
    shape: &Shape,
    rois: &[i32],
    pool_height: usize,
    pool_width: usize,
    config: &RoiPoolConfig,
) -> Result<(Vec<T>, Vec<i32>)>
where
    T: Float + Send + Sync,
{
    let n_rois = rois.len() / REGION_LEN;
    let out_shape = roi_pool_output_shape(shape, n_rois, (pool_height, pool_width))
        .inspect_err(|e| warn!(error = %e, "rejected roi_pool inputs"))?;
    let mut output = filled_buffer(out_shape.size(), T::zero())?;
    let mut indices = filled_buffer(out_shape.size(), EMPTY_INDEX)?;
    roi_pool_into(
        feature_map,
        shape,
        rois,
        (pool_height, pool_width),
        &mut output,
        &mut indices,
        config,
    )?;
    Ok((output, indices))
}

/// Allocate `len` copies of `value`, reporting allocation failure as an error.
fn filled_buffer<V: Clone>(len: usize, value: V) -> Result<Vec<V>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|e| {
        let err = TensorError::invalid_argument_op(
            "roi_pool",
            &format!("cannot allocate {} output elements: {}", len, e),
        );
        warn!(error = %err, "rejected roi_pool inputs");
        err
    })?;
    buffer.resize(len, value);
    Ok(buffer)
}

/// ROI max pooling over tensors.
///
/// Input: `feature_maps [batch, height, width, channels]`, `rois [n_rois, 5]`
/// with rows `(batch_index, top, left, bottom, right)` in feature-map pixels.
/// Output: pooled values and argmax indices, both `[n_rois, pool_height,
/// pool_width, channels]`.
pub fn roi_pool2d<T>(
    feature_maps: &Tensor<T>,
    rois: &Tensor<i32>,
    pooled_size: (usize, usize),
) -> Result<RoiPoolOutput<T>>
where
    T: Float + Send + Sync,
{
    roi_pool2d_with_config(feature_maps, rois, pooled_size, &RoiPoolConfig::default())
}

pub fn roi_pool2d_with_config<T>(
    feature_maps: &Tensor<T>,
    rois: &Tensor<i32>,
    pooled_size: (usize, usize),
    config: &RoiPoolConfig,
) -> Result<RoiPoolOutput<T>>
where
    T: Float + Send + Sync,
{
    let roi_shape = rois.shape();
    if roi_shape.rank() != 2 || roi_shape[1] != REGION_LEN {
        let err = TensorError::invalid_shape_dims(
            "roi_pool2d",
            &format!("ROIs must be [num_rois, {REGION_LEN}]"),
            roi_shape.dims(),
        );
        warn!(error = %err, "rejected roi_pool2d inputs");
        return Err(err);
    }

    let out_shape = roi_pool_output_shape(feature_maps.shape(), roi_shape[0], pooled_size)
        .inspect_err(|e| warn!(error = %e, "rejected roi_pool2d inputs"))?;
    let (output, indices) = roi_pool_with_config(
        feature_maps.data(),
        feature_maps.shape(),
        rois.data(),
        pooled_size.0,
        pooled_size.1,
        config,
    )?;

    Ok(RoiPoolOutput {
        output: Tensor::from_vec(output, out_shape.dims())?,
        indices: Tensor::from_vec(indices, out_shape.dims())?,
        input_shape: feature_maps.shape().clone(),
    })
}

fn run_kernel<T>(
    feature_map: &[T],
    regions: &[Region],
    geometry: &PoolGeometry,
    output: &mut [T],
    indices: &mut [i32],
    config: &RoiPoolConfig,
) where
    T: Float + Send + Sync,
{
    let cells = geometry.cells_per_region();
    if cells == 0 || regions.is_empty() {
        return;
    }

    let sentinel = <T as NumCast>::from(WINDOW_MAX_SENTINEL).unwrap_or_else(T::min_value);

    if config.use_parallel(output.len()) {
        debug!(cells = output.len(), "roi_pool running in parallel");
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            output
                .par_chunks_mut(cells)
                .zip(indices.par_chunks_mut(cells))
                .zip(regions.par_iter())
                .for_each(|((out, idx), region)| {
                    pool_region(feature_map, region, geometry, sentinel, out, idx)
                });
            return;
        }
    }

    debug!(cells = output.len(), "roi_pool running sequentially");
    for ((out, idx), region) in output
        .chunks_mut(cells)
        .zip(indices.chunks_mut(cells))
        .zip(regions)
    {
        pool_region(feature_map, region, geometry, sentinel, out, idx);
    }
}

/// Fill the `[pool_height, pool_width, channels]` block of one region.
fn pool_region<T: Float>(
    feature_map: &[T],
    region: &Region,
    geometry: &PoolGeometry,
    sentinel: T,
    output: &mut [T],
    indices: &mut [i32],
) {
    let PoolGeometry {
        height,
        width,
        channels,
        pool_height,
        pool_width,
    } = *geometry;
    // batch_index was range checked against batch_size
    let batch = region.batch_index as usize;
    let batch_offset = batch * height * width * channels;

    for ph in 0..pool_height {
        for pw in 0..pool_width {
            let window =
                RoiWindow::compute(region, ph, pw, (pool_height, pool_width), height, width);
            let cell_base = (ph * pool_width + pw) * channels;

            for c in 0..channels {
                let (value, index) = if window.is_empty() {
                    (T::zero(), EMPTY_INDEX)
                } else {
                    window_max(feature_map, &window, batch_offset, width, channels, c, sentinel)
                };
                output[cell_base + c] = value;
                indices[cell_base + c] = index;
            }
        }
    }
}

/// Row-major scan with strict `>`: ties keep the lowest flat index.
#[inline]
fn window_max<T: Float>(
    feature_map: &[T],
    window: &RoiWindow,
    batch_offset: usize,
    width: usize,
    channels: usize,
    c: usize,
    sentinel: T,
) -> (T, i32) {
    let mut max_val = sentinel;
    let mut max_idx = EMPTY_INDEX;
    for h in window.hstart..window.hend {
        let row_offset = batch_offset + h * width * channels;
        for w in window.wstart..window.wend {
            let input_idx = row_offset + w * channels + c;
            let val = feature_map[input_idx];
            if val > max_val {
                max_val = val;
                // feature map length was checked to fit in i32
                max_idx = input_idx as i32;
            }
        }
    }
    (max_val, max_idx)
}
