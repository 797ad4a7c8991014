use approx::assert_relative_eq;
use roipool_core::{
    roi_pool, roi_pool2d, roi_pool2d_with_config, roi_pool_into, roi_pool_with_config,
    ExecutionStrategy, RoiPoolConfig, Shape, Tensor, TensorError,
};

/// Reference results computed cell by cell over the flat output index
mod reference_implementations {
    /// Direct per-cell evaluation of the pooling geometry
    pub fn roi_pool_reference(
        input: &[f32],
        dims: [usize; 4],
        rois: &[i32],
        pool_height: usize,
        pool_width: usize,
    ) -> (Vec<f32>, Vec<i32>) {
        let [_, height, width, channels] = dims;
        let n_rois = rois.len() / 5;
        let total = n_rois * pool_height * pool_width * channels;
        let mut output = vec![0.0; total];
        let mut indices = vec![-1; total];

        for i in 0..total {
            let n = i / channels / pool_width / pool_height % n_rois;
            let h = i / channels / pool_width % pool_height;
            let w = i / channels % pool_width;
            let c = i % channels;

            let roi = &rois[n * 5..n * 5 + 5];
            let roi_height = (roi[3] - roi[1] + 1).max(1);
            let roi_width = (roi[4] - roi[2] + 1).max(1);
            let bin_h = roi_height as f32 / pool_height as f32;
            let bin_w = roi_width as f32 / pool_width as f32;

            let clamp = |x: i32, hi: usize| x.clamp(0, hi as i32) as usize;
            let hstart = clamp((h as f32 * bin_h).floor() as i32 + roi[1], height);
            let hend = clamp(((h + 1) as f32 * bin_h).ceil() as i32 + roi[1], height);
            let wstart = clamp((w as f32 * bin_w).floor() as i32 + roi[2], width);
            let wend = clamp(((w + 1) as f32 * bin_w).ceil() as i32 + roi[2], width);

            let empty = hend <= hstart || wend <= wstart;
            let mut max_val = if empty { 0.0 } else { -99999999.0 };
            let mut max_idx = -1;
            for y in hstart..hend {
                for x in wstart..wend {
                    let idx = ((roi[0] as usize * height + y) * width + x) * channels + c;
                    if input[idx] > max_val {
                        max_val = input[idx];
                        max_idx = idx as i32;
                    }
                }
            }
            output[i] = max_val;
            indices[i] = max_idx;
        }
        (output, indices)
    }
}

/// Deterministic pseudo-random feature values
fn lcg_values(len: usize, seed: u64) -> Vec<f32> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 40) % 1000) as f32 / 10.0 - 50.0
        })
        .collect()
}

fn sample_rois(batch: usize, height: i32, width: i32) -> Vec<i32> {
    let mut rois = Vec::new();
    for b in 0..batch as i32 {
        rois.extend_from_slice(&[b, 0, 0, height - 1, width - 1]);
        rois.extend_from_slice(&[b, 1, 2, height / 2, width / 2 + 3]);
        rois.extend_from_slice(&[b, 3, 3, 3, 3]);
        rois.extend_from_slice(&[b, -4, -2, 2, 5]);
        rois.extend_from_slice(&[b, height - 3, width - 3, height + 6, width + 6]);
        rois.extend_from_slice(&[b, 7, 9, 2, 1]);
        rois.extend_from_slice(&[b, height + 2, 0, height + 8, width - 1]);
    }
    rois
}

#[test]
fn test_reference_forward_pass() {
    #[rustfmt::skip]
    let input = vec![
        1.0, 2.0, 4.0, 4.0,
        3.0, 4.0, 1.0, 2.0,
        6.0, 2.0, 1.0, 7.0,
        1.0, 3.0, 2.0, 8.0f32,
    ];
    let shape = Shape::from([1, 4, 4, 1]);
    let rois = [0, 0, 0, 3, 1, 0, 2, 2, 3, 3, 0, 1, 0, 3, 2];

    let (output, indices) = roi_pool(&input, &shape, &rois, 2, 2).unwrap();

    #[rustfmt::skip]
    let expected = vec![
        3.0, 4.0, 6.0, 3.0,
        1.0, 7.0, 2.0, 8.0,
        6.0, 4.0, 6.0, 3.0,
    ];
    assert_eq!(output, expected);
    for (cell, &idx) in indices.iter().enumerate() {
        assert_eq!(input[idx as usize], output[cell], "cell {cell}");
    }
}

#[test]
fn test_output_shape() {
    let shape = Shape::from([2, 6, 5, 3]);
    let input = lcg_values(shape.size(), 1);
    let rois = Tensor::from_vec(sample_rois(2, 6, 5), &[14, 5]).unwrap();
    let features = Tensor::from_vec(input, shape.dims()).unwrap();

    let pooled = roi_pool2d(&features, &rois, (3, 2)).unwrap();
    assert_eq!(pooled.output.shape().dims(), &[14, 3, 2, 3]);
    assert_eq!(pooled.indices.shape().dims(), &[14, 3, 2, 3]);
}

#[test]
fn test_matches_reference_implementation() {
    let dims = [2, 9, 11, 3];
    let shape = Shape::from(dims);
    let input = lcg_values(shape.size(), 7);
    let rois = sample_rois(2, 9, 11);

    for (ph, pw) in [(1, 1), (2, 2), (3, 4), (7, 7)] {
        let (output, indices) = roi_pool(&input, &shape, &rois, ph, pw).unwrap();
        let (ref_out, ref_idx) =
            reference_implementations::roi_pool_reference(&input, dims, &rois, ph, pw);
        assert_eq!(output, ref_out, "pool {ph}x{pw}");
        assert_eq!(indices, ref_idx, "pool {ph}x{pw}");
    }
}

#[test]
fn test_argmax_is_window_maximum() {
    let dims = [1, 8, 8, 2];
    let shape = Shape::from(dims);
    let input = lcg_values(shape.size(), 3);
    let rois = sample_rois(1, 8, 8);
    let features = Tensor::from_vec(input.clone(), shape.dims()).unwrap();
    let roi_tensor = Tensor::from_vec(rois.clone(), &[rois.len() / 5, 5]).unwrap();

    let pooled = roi_pool2d(&features, &roi_tensor, (2, 3)).unwrap();
    let out = pooled.output.data();
    let idx = pooled.indices.data();

    for cell in 0..out.len() {
        if idx[cell] < 0 {
            continue;
        }
        assert_eq!(input[idx[cell] as usize], out[cell]);
        let coords = pooled.argmax_coords(cell).unwrap();
        let out_coords = pooled.output.shape().unravel(cell).unwrap();
        let region = &rois[out_coords[0] * 5..out_coords[0] * 5 + 5];
        assert_eq!(coords[0] as i32, region[0]);
        assert_eq!(coords[3], out_coords[3]);
    }
}

#[test]
fn test_degenerate_region_broadcasts_single_value() {
    let input: Vec<f32> = (0..16).map(|v| v as f32).collect();
    let shape = Shape::from([1, 4, 4, 1]);

    let (output, indices) = roi_pool(&input, &shape, &[0, 2, 3, 2, 3], 3, 3).unwrap();
    assert_eq!(output, vec![11.0; 9]);
    assert_eq!(indices, vec![11; 9]);

    // inverted bounds clamp to a 1x1 region anchored at (top, left)
    let (output, indices) = roi_pool(&input, &shape, &[0, 2, 1, 0, 0], 2, 2).unwrap();
    assert_eq!(output, vec![9.0; 4]);
    assert_eq!(indices, vec![9; 4]);
}

#[test]
fn test_degenerate_region_clipped_away() {
    let input: Vec<f32> = (0..16).map(|v| v as f32).collect();
    let shape = Shape::from([1, 4, 4, 1]);
    let (output, indices) = roi_pool(&input, &shape, &[0, 4, 4, 4, 4], 2, 2).unwrap();
    assert_eq!(output, vec![0.0; 4]);
    assert_eq!(indices, vec![-1; 4]);
}

#[test]
fn test_region_outside_map_is_zero() {
    let shape = Shape::from([1, 5, 5, 2]);
    let input = vec![3.5f32; shape.size()];
    let rois = [0, -20, -20, -10, -10, 0, 0, 7, 4, 12];
    let (output, indices) = roi_pool(&input, &shape, &rois, 2, 2).unwrap();
    assert!(output.iter().all(|&v| v == 0.0));
    assert!(indices.iter().all(|&i| i == -1));
}

#[test]
fn test_ties_keep_lowest_index() {
    let shape = Shape::from([1, 3, 3, 1]);
    let input = vec![1.0, 9.0, 9.0, 9.0, 2.0, 9.0, 0.0, 9.0, 3.0f32];
    let (output, indices) = roi_pool(&input, &shape, &[0, 0, 0, 2, 2], 1, 1).unwrap();
    assert_eq!(output, vec![9.0]);
    assert_eq!(indices, vec![1]);
}

#[test]
fn test_batch_selection() {
    let shape = Shape::from([3, 2, 2, 1]);
    let input: Vec<f32> = (0..12).map(|v| v as f32).collect();
    let rois = [2, 0, 0, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0, 1, 1];
    let (output, indices) = roi_pool(&input, &shape, &rois, 1, 1).unwrap();
    assert_eq!(output, vec![11.0, 3.0, 7.0]);
    assert_eq!(indices, vec![11, 3, 7]);
}

#[test]
fn test_repeated_calls_are_identical() {
    let shape = Shape::from([2, 10, 10, 4]);
    let input = lcg_values(shape.size(), 11);
    let rois = sample_rois(2, 10, 10);

    let first = roi_pool(&input, &shape, &rois, 3, 3).unwrap();
    let second = roi_pool(&input, &shape, &rois, 3, 3).unwrap();
    assert_eq!(first.1, second.1);
    let bits = |v: &[f32]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&first.0), bits(&second.0));
}

#[test]
fn test_sequential_and_parallel_agree() {
    let shape = Shape::from([2, 16, 12, 8]);
    let input = lcg_values(shape.size(), 5);
    let rois = sample_rois(2, 16, 12);

    let sequential =
        roi_pool_with_config(&input, &shape, &rois, 4, 4, &RoiPoolConfig::sequential()).unwrap();
    let parallel =
        roi_pool_with_config(&input, &shape, &rois, 4, 4, &RoiPoolConfig::parallel()).unwrap();
    let auto = roi_pool_with_config(
        &input,
        &shape,
        &rois,
        4,
        4,
        &RoiPoolConfig::default()
            .with_execution(ExecutionStrategy::Auto)
            .with_parallel_threshold(1),
    )
    .unwrap();

    assert_eq!(sequential, parallel);
    assert_eq!(sequential, auto);
}

#[test]
fn test_f64_feature_map() {
    let shape = Shape::from([1, 3, 3, 1]);
    let input: Vec<f64> = (0..9).map(|v| v as f64 * 0.1).collect();
    let (output, indices) = roi_pool(&input, &shape, &[0, 0, 0, 2, 2], 2, 2).unwrap();
    assert_relative_eq!(output[0], 0.4, epsilon = 1e-12);
    assert_relative_eq!(output[3], 0.8, epsilon = 1e-12);
    assert_eq!(indices, vec![4, 5, 7, 8]);
}

#[test]
fn test_into_caller_buffers() {
    let shape = Shape::from([1, 4, 4, 1]);
    let input: Vec<f32> = (0..16).map(|v| v as f32).collect();
    let mut output = vec![f32::NAN; 4];
    let mut indices = vec![i32::MIN; 4];
    roi_pool_into(
        &input,
        &shape,
        &[0, 0, 0, 3, 3],
        (2, 2),
        &mut output,
        &mut indices,
        &RoiPoolConfig::default(),
    )
    .unwrap();
    assert_eq!(output, vec![5.0, 7.0, 13.0, 15.0]);
    assert_eq!(indices, vec![5, 7, 13, 15]);
}

#[test]
fn test_empty_region_list() {
    let shape = Shape::from([1, 4, 4, 1]);
    let input = vec![1.0f32; 16];
    let (output, indices) = roi_pool(&input, &shape, &[], 2, 2).unwrap();
    assert!(output.is_empty());
    assert!(indices.is_empty());
}

mod error_paths {
    use super::*;

    #[test]
    fn test_batch_index_out_of_range() {
        let shape = Shape::from([2, 4, 4, 1]);
        let input = vec![0.0f32; shape.size()];
        let err = roi_pool(&input, &shape, &[0, 0, 0, 1, 1, 2, 0, 0, 1, 1], 2, 2).unwrap_err();
        assert_eq!(
            err,
            TensorError::BatchIndexOutOfRange {
                operation: "roi_pool".to_string(),
                region: 1,
                batch_index: 2,
                batch_size: 2,
            }
        );

        let err = roi_pool(&input, &shape, &[-1, 0, 0, 1, 1], 2, 2).unwrap_err();
        assert!(matches!(err, TensorError::BatchIndexOutOfRange { batch_index: -1, .. }));
    }

    #[test]
    fn test_feature_rank_checked() {
        let shape = Shape::from([4, 4, 1]);
        let input = vec![0.0f32; 16];
        let err = roi_pool(&input, &shape, &[0, 0, 0, 1, 1], 2, 2).unwrap_err();
        assert!(matches!(err, TensorError::InvalidShape { .. }));
    }

    #[test]
    fn test_feature_length_checked() {
        let shape = Shape::from([1, 4, 4, 1]);
        let input = vec![0.0f32; 15];
        let err = roi_pool(&input, &shape, &[0, 0, 0, 1, 1], 2, 2).unwrap_err();
        assert!(matches!(err, TensorError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_ragged_rois_rejected() {
        let shape = Shape::from([1, 4, 4, 1]);
        let input = vec![0.0f32; 16];
        let err = roi_pool(&input, &shape, &[0, 0, 0, 1, 1, 0], 2, 2).unwrap_err();
        assert!(matches!(err, TensorError::InvalidShape { .. }));
    }

    #[test]
    fn test_roi_tensor_shape_checked() {
        let features = Tensor::<f32>::zeros(&[1, 4, 4, 1]);
        let rois = Tensor::from_vec(vec![0, 0, 0, 1, 1, 0, 0, 0], &[2, 4]).unwrap();
        let err = roi_pool2d(&features, &rois, (2, 2)).unwrap_err();
        assert_eq!(err.operation(), "roi_pool2d");
    }

    #[test]
    fn test_zero_pool_width_rejected() {
        let features = Tensor::<f32>::zeros(&[1, 4, 4, 1]);
        let rois = Tensor::from_vec(vec![0, 0, 0, 1, 1], &[1, 5]).unwrap();
        let err =
            roi_pool2d_with_config(&features, &rois, (2, 0), &RoiPoolConfig::sequential())
                .unwrap_err();
        assert!(matches!(err, TensorError::InvalidArgument { .. }));
    }
}
