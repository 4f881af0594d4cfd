//! 推理适配层.
//!
//! 训练好的网络对本 crate 是不透明的. 它只需满足如下约定:
//!
//! - 输入: 形状为 `(1, 高, 宽, 1)` 的 `f32` 张量 (批维度, 单通道), 高宽等于网络输入分辨率,
//!   像素值为原始灰度 (0 ~ 255);
//! - 输出: 形状为 `(1, 高, 宽, 类别数)` 的 `f32` 张量, 每个类别一张概率图.
//!
//! [`predict_stack`] 逐帧调用推理后端, 并按帧序拼接为 [`ProbVolume`].

use ndarray::{s, Array4, ArrayView2, ArrayView4, Axis};
use tracing::{debug, info};

use crate::error::{BerryError, BerryResult};
use crate::{FrameStack, ProbVolume};

cfg_if::cfg_if! {
    if #[cfg(feature = "onnx")] {
        mod onnx;

        pub use onnx::OnnxEngine;
    }
}

/// 推理后端.
pub trait InferenceEngine {
    /// 对单帧 `(1, 高, 宽, 1)` 输入做推理, 返回 `(1, 高, 宽, 类别数)` 的概率图.
    fn predict(&self, input: ArrayView4<f32>) -> BerryResult<Array4<f32>>;
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for &E {
    #[inline]
    fn predict(&self, input: ArrayView4<f32>) -> BerryResult<Array4<f32>> {
        (**self).predict(input)
    }
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for Box<E> {
    #[inline]
    fn predict(&self, input: ArrayView4<f32>) -> BerryResult<Array4<f32>> {
        (**self).predict(input)
    }
}

/// 为单帧添加批维度与通道维度: `(高, 宽)` -> `(1, 高, 宽, 1)`.
pub fn frame_to_input(frame: ArrayView2<u8>) -> Array4<f32> {
    let (h, w) = frame.dim();
    Array4::from_shape_fn((1, h, w, 1), |(_, y, x, _)| frame[(y, x)] as f32)
}

/// 对整个帧栈逐帧推理, 返回 `(高, 宽, 类别数, 帧数)` 的概率体.
///
/// `stack` 应当已经缩放到网络输入分辨率. 推理后端返回的形状不符合约定,
/// 或各帧类别数不一致时, 返回 [`BerryError::Inference`].
pub fn predict_stack<E: InferenceEngine + ?Sized>(
    engine: &E,
    stack: &FrameStack,
) -> BerryResult<ProbVolume> {
    let (h, w, n) = stack.shape();
    if n == 0 {
        return Err(BerryError::shape("cannot run inference on an empty frame stack"));
    }

    let mut volume: Option<Array4<f32>> = None;
    for (i, frame) in stack.frames().enumerate() {
        let pred = engine
            .predict(frame_to_input(frame).view())
            .map_err(|e| BerryError::Inference {
                frame: i,
                message: match e {
                    BerryError::Inference { message, .. } => message,
                    other => other.to_string(),
                },
            })?;

        let (batch, ph, pw, classes) = pred.dim();
        if batch != 1 || (ph, pw) != (h, w) || classes == 0 {
            return Err(BerryError::Inference {
                frame: i,
                message: format!(
                    "expected output shape (1, {h}, {w}, classes >= 1), got {:?}",
                    pred.shape()
                ),
            });
        }

        let volume = volume.get_or_insert_with(|| Array4::zeros((h, w, classes, n)));
        if volume.len_of(Axis(2)) != classes {
            return Err(BerryError::Inference {
                frame: i,
                message: format!(
                    "model returned {classes} classes, previous frames had {}",
                    volume.len_of(Axis(2))
                ),
            });
        }
        volume
            .slice_mut(s![.., .., .., i])
            .assign(&pred.index_axis(Axis(0), 0));
        debug!("Predicted frame {}/{n}", i + 1);
    }

    // n > 0, 因此至少完成了一帧.
    let volume = volume.ok_or_else(|| BerryError::shape("no frame was predicted"))?;
    info!(
        "Inference finished: {n} frames, {} classes",
        volume.len_of(Axis(2))
    );
    Ok(ProbVolume::new(volume))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// 每个类别输出 `帧均值 / 255 * (类别 + 1)`, 便于校验帧序.
    struct MeanEngine {
        classes: usize,
    }

    impl InferenceEngine for MeanEngine {
        fn predict(&self, input: ArrayView4<f32>) -> BerryResult<Array4<f32>> {
            let (_, h, w, _) = input.dim();
            let mean = input.mean().unwrap_or(0.0) / 255.0;
            Ok(Array4::from_shape_fn((1, h, w, self.classes), |(_, _, _, c)| {
                mean * (c + 1) as f32 / self.classes as f32
            }))
        }
    }

    struct BadShapeEngine;

    impl InferenceEngine for BadShapeEngine {
        fn predict(&self, _input: ArrayView4<f32>) -> BerryResult<Array4<f32>> {
            Ok(Array4::zeros((1, 1, 1, 2)))
        }
    }

    #[test]
    fn test_frame_to_input_adds_dims() {
        let frame = ndarray::array![[1u8, 2, 3], [4, 5, 6]];
        let input = frame_to_input(frame.view());
        assert_eq!(input.shape(), &[1, 2, 3, 1]);
        assert_eq!(input[(0, 1, 2, 0)], 6.0);
        assert!(input.is_standard_layout());
    }

    #[test]
    fn test_predict_stack_orders_frames_last() {
        let data = Array3::from_shape_fn((4, 3, 3), |(_, _, n)| (n as u8) * 100);
        let stack = FrameStack::new(data);
        let prob = predict_stack(&MeanEngine { classes: 2 }, &stack).unwrap();
        assert_eq!(prob.shape(), (4, 3, 2, 3));
        for n in 0..3 {
            let expected = n as f32 * 100.0 / 255.0;
            assert!((prob.data()[(0, 0, 1, n)] - expected).abs() < 1e-5);
            assert!((prob.data()[(3, 2, 0, n)] - expected / 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_predict_stack_rejects_bad_output() {
        let stack = FrameStack::new(Array3::zeros((4, 4, 2)));
        let err = predict_stack(&BadShapeEngine, &stack).unwrap_err();
        assert!(matches!(err, BerryError::Inference { frame: 0, .. }));
    }
}
