//! 帧栈缩放.
//!
//! 使用面积平均插值: 每个目标像素取其在源图上覆盖区域内所有源像素的加权平均,
//! 权重为覆盖面积. 该方法同时适用于放大和缩小, 且不会产生振铃.
//! 目标尺寸与源尺寸相同时, 每个目标像素恰好覆盖一个源像素, 因此缩放是恒等的.

use ndarray::{Array2, Array3, ArrayD, ArrayView2};

use crate::error::{BerryError, BerryResult};
use crate::{FrameStack, Resolution};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use ndarray::Axis;
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
    }
}

/// 小于该值的覆盖面积视为浮点误差.
const EPS: f64 = 1e-9;

/// 一维覆盖表: 第 `i` 项为目标索引 `i` 所覆盖的 `(源索引, 权重)` 列表, 权重和为 1.
fn coverage(src: usize, dst: usize) -> Vec<Vec<(usize, f32)>> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|i| {
            let start = i as f64 * scale;
            let end = ((i + 1) as f64 * scale).min(src as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src);
            (first..last)
                .filter_map(|j| {
                    let overlap = (end.min((j + 1) as f64) - start.max(j as f64)).max(0.0);
                    (overlap > EPS).then_some((j, (overlap / scale) as f32))
                })
                .collect()
        })
        .collect()
}

/// 将单帧缩放到 `target` 分辨率.
///
/// `target` 或 `frame` 含零边长时程序 panic. 需要错误返回时使用 [`resize_stack`].
pub fn resize_frame(frame: ArrayView2<u8>, target: Resolution) -> Array2<u8> {
    let (h, w) = frame.dim();
    assert!(h > 0 && w > 0 && !target.is_empty(), "缩放尺寸不能为零");
    if (h, w) == target.as_idx() {
        return frame.to_owned();
    }

    let rows = coverage(h, target.height);
    let cols = coverage(w, target.width);
    Array2::from_shape_fn(target.as_idx(), |(y, x)| {
        let mut acc = 0.0f32;
        for &(sy, wy) in rows[y].iter() {
            for &(sx, wx) in cols[x].iter() {
                acc += wy * wx * frame[(sy, sx)] as f32;
            }
        }
        acc.round().clamp(0.0, 255.0) as u8
    })
}

/// 将帧栈的每一帧独立缩放到 `target` 分辨率, 返回新栈. 帧序保持不变.
///
/// `target` 含零边长, 或栈中帧含零边长时返回 [`BerryError::Shape`].
pub fn resize_stack(stack: &FrameStack, target: Resolution) -> BerryResult<FrameStack> {
    if target.is_empty() {
        return Err(BerryError::shape(format!(
            "cannot resample to empty resolution {target}"
        )));
    }
    if stack.frame_shape().is_empty() {
        return Err(BerryError::shape(format!(
            "cannot resample frames of empty resolution {}",
            stack.frame_shape()
        )));
    }
    if stack.is_empty() {
        return Ok(FrameStack::new(Array3::zeros((
            target.height,
            target.width,
            0,
        ))));
    }

    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            let frames: Vec<Array2<u8>> = stack
                .data()
                .axis_iter(Axis(2))
                .into_par_iter()
                .map(|f| resize_frame(f, target))
                .collect();
        } else {
            let frames: Vec<Array2<u8>> = stack
                .frames()
                .map(|f| resize_frame(f, target))
                .collect();
        }
    }
    FrameStack::from_frames(frames)
}

/// 同 [`resize_stack`], 但接受任意维度的输入. 输入不是三维时返回 [`BerryError::Shape`].
pub fn resize_dyn(data: ArrayD<u8>, target: Resolution) -> BerryResult<FrameStack> {
    resize_stack(&FrameStack::from_dyn(data)?, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, IxDyn};

    #[test]
    fn test_coverage_weights_sum_to_one() {
        for (src, dst) in [(4, 2), (2, 4), (5, 3), (3, 7), (512, 256), (7, 7)] {
            for cells in coverage(src, dst) {
                let sum: f32 = cells.iter().map(|&(_, w)| w).sum();
                assert!((sum - 1.0).abs() < 1e-4, "{src} -> {dst}: {sum}");
            }
        }
    }

    #[test]
    fn test_downsample_averages_blocks() {
        let f = array![
            [0u8, 10, 100, 100],
            [20, 30, 100, 100],
            [255, 255, 0, 0],
            [255, 255, 0, 2],
        ];
        let out = resize_frame(f.view(), Resolution::new(2, 2));
        assert_eq!(out, array![[15u8, 100], [255, 1]]);
    }

    #[test]
    fn test_upsample_replicates_pixels() {
        let f = array![[0u8, 200], [50, 100]];
        let out = resize_frame(f.view(), Resolution::new(4, 4));
        assert_eq!(
            out,
            array![
                [0u8, 0, 200, 200],
                [0, 0, 200, 200],
                [50, 50, 100, 100],
                [50, 50, 100, 100],
            ]
        );
    }

    #[test]
    fn test_resample_same_resolution_is_idempotent() {
        let data = Array3::from_shape_fn((9, 5, 3), |(h, w, n)| (h * 31 + w * 7 + n * 13) as u8);
        let stack = FrameStack::new(data);
        let target = Resolution::new(6, 4);
        let once = resize_stack(&stack, target).unwrap();
        let twice = resize_stack(&once, target).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.shape(), (6, 4, 3));
    }

    #[test]
    fn test_resample_keeps_frame_order() {
        let frames = (0..6u8).map(|v| ndarray::Array2::from_elem((8, 8), v * 40));
        let stack = FrameStack::from_frames(frames).unwrap();
        let out = resize_stack(&stack, Resolution::new(3, 5)).unwrap();
        for (i, f) in out.frames().enumerate() {
            assert!(f.iter().all(|&p| p == i as u8 * 40));
        }
    }

    #[test]
    fn test_resample_rejects_bad_input() {
        let stack = FrameStack::new(Array3::zeros((4, 4, 1)));
        assert!(matches!(
            resize_stack(&stack, Resolution::new(0, 4)),
            Err(BerryError::Shape(_))
        ));
        let flat = ArrayD::<u8>::zeros(IxDyn(&[4, 4]));
        assert!(matches!(
            resize_dyn(flat, Resolution::new(2, 2)),
            Err(BerryError::Shape(_))
        ));
    }
}
