//! 帧栈、概率体与掩码体等基础数据结构.
//!
//! 所有三维数据都按 `(高, 宽, 帧)` 排列, 四维数据都按 `(高, 宽, 类别, 帧)` 排列.
//! 帧索引永远位于最后一维.

use ndarray::{Array2, Array3, Array4, ArrayD, ArrayView2, ArrayView3, Axis, Ix3};
use serde::{Deserialize, Serialize};

use crate::error::{BerryError, BerryResult};
use crate::{Idx2d, Idx3d};

/// 二维分辨率, `(高, 宽)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    /// 高 (图像的垂直方向).
    pub height: usize,
    /// 宽 (图像的水平方向).
    pub width: usize,
}

impl Resolution {
    /// 构建分辨率.
    #[inline]
    pub const fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// 是否包含零边长.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0
    }

    /// 以 `(高, 宽)` 形式返回.
    #[inline]
    pub const fn as_idx(&self) -> Idx2d {
        (self.height, self.width)
    }
}

impl From<Idx2d> for Resolution {
    #[inline]
    fn from((height, width): Idx2d) -> Self {
        Self { height, width }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// 流水线的三组分辨率: 原始采集尺寸、网络输入尺寸、输出 (复核) 尺寸.
///
/// 该结构在流水线构建时确定, 之后只读.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resolutions {
    /// 原始 B-scan 尺寸. 加载时只接受该尺寸的图片.
    pub raw: Resolution,
    /// 网络输入尺寸.
    pub net: Resolution,
    /// 输出及复核尺寸.
    pub output: Resolution,
}

impl Default for Resolutions {
    fn default() -> Self {
        Self {
            raw: Resolution::new(1024, 512),
            net: Resolution::new(512, 256),
            output: Resolution::new(1024, 512),
        }
    }
}

/// 有序的二维灰度帧栈, 形状为 `(高, 宽, 帧数)`.
///
/// 所有帧尺寸一致由 `Array3` 本身保证. 栈是只读的, 缩放等操作总是生成新栈.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStack {
    data: Array3<u8>,
}

impl FrameStack {
    /// 直接由三维数组构建.
    #[inline]
    pub fn new(data: Array3<u8>) -> Self {
        Self { data }
    }

    /// 由任意维度的数组构建. 只接受恰好三维的输入, 否则返回 [`BerryError::Shape`].
    pub fn from_dyn(data: ArrayD<u8>) -> BerryResult<Self> {
        let ndim = data.ndim();
        let data = data.into_dimensionality::<Ix3>().map_err(|_| {
            BerryError::shape(format!(
                "frame stack must be 3-dimensional (height, width, frames), got {ndim} dimensions"
            ))
        })?;
        Ok(Self { data })
    }

    /// 按顺序堆叠若干二维帧.
    ///
    /// `frames` 不能为空, 且所有帧尺寸必须一致, 否则返回 [`BerryError::Shape`].
    pub fn from_frames<I: IntoIterator<Item = Array2<u8>>>(frames: I) -> BerryResult<Self> {
        let frames: Vec<Array2<u8>> = frames.into_iter().collect();
        let first = frames
            .first()
            .ok_or_else(|| BerryError::shape("cannot stack zero frames"))?;
        let (h, w) = first.dim();
        if let Some((i, f)) = frames.iter().enumerate().find(|(_, f)| f.dim() != (h, w)) {
            return Err(BerryError::shape(format!(
                "frame {i} has size {:?}, expected ({h}, {w})",
                f.dim()
            )));
        }
        let mut data = Array3::<u8>::zeros((h, w, frames.len()));
        for (mut slot, f) in data.axis_iter_mut(Axis(2)).zip(frames.iter()) {
            slot.assign(f);
        }
        Ok(Self { data })
    }

    /// 形状 `(高, 宽, 帧数)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 单帧分辨率.
    #[inline]
    pub fn frame_shape(&self) -> Resolution {
        let (h, w, _) = self.shape();
        Resolution::new(h, w)
    }

    /// 帧数.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// 是否没有任何帧.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 获取第 `index` 帧的视图. 越界时 panic.
    #[inline]
    pub fn frame_at(&self, index: usize) -> ArrayView2<'_, u8> {
        self.data.index_axis(Axis(2), index)
    }

    /// 按帧序迭代所有帧.
    #[inline]
    pub fn frames(&self) -> impl ExactSizeIterator<Item = ArrayView2<'_, u8>> {
        self.data.axis_iter(Axis(2))
    }

    /// 获得底层数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    /// 取出底层数据.
    #[inline]
    pub fn into_inner(self) -> Array3<u8> {
        self.data
    }
}

/// 概率体, 形状为 `(高, 宽, 类别, 帧数)`, 取值位于 `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbVolume {
    data: Array4<f32>,
}

/// 掩码体, 形状为 `(高, 宽, 类别, 帧数)`, 取值仅为 `0` 或 `1`.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskVolume {
    data: Array4<u8>,
}

macro_rules! impl_volume {
    ($($volume: ty => $elem: ty),+) => {
        $(
            impl $volume {
                /// 直接由四维数组构建.
                #[inline]
                pub fn new(data: Array4<$elem>) -> Self {
                    Self { data }
                }

                /// 形状 `(高, 宽, 类别, 帧数)`.
                #[inline]
                pub fn shape(&self) -> (usize, usize, usize, usize) {
                    self.data.dim()
                }

                /// 类别数.
                #[inline]
                pub fn classes(&self) -> usize {
                    self.data.len_of(Axis(2))
                }

                /// 帧数.
                #[inline]
                pub fn len(&self) -> usize {
                    self.data.len_of(Axis(3))
                }

                /// 是否没有任何帧.
                #[inline]
                pub fn is_empty(&self) -> bool {
                    self.len() == 0
                }

                /// 获取第 `class` 个类别的三维视图 `(高, 宽, 帧数)`. 越界时 panic.
                #[inline]
                pub fn channel(&self, class: usize) -> ArrayView3<'_, $elem> {
                    self.data.index_axis(Axis(2), class)
                }

                /// 获得底层数据的一份不可变 shallow copy.
                #[inline]
                pub fn data(&self) -> ndarray::ArrayView4<'_, $elem> {
                    self.data.view()
                }

                /// 取出底层数据.
                #[inline]
                pub fn into_inner(self) -> Array4<$elem> {
                    self.data
                }
            }
        )+
    };
}

impl_volume!(ProbVolume => f32, MaskVolume => u8);

impl MaskVolume {
    /// 将第 `class` 个类别复制为独立的帧栈, 以便缩放.
    ///
    /// `class` 越界时返回 [`BerryError::Shape`].
    pub fn channel_stack(&self, class: usize) -> BerryResult<FrameStack> {
        if class >= self.classes() {
            return Err(BerryError::shape(format!(
                "mask channel {class} requested, but volume only has {} channels",
                self.classes()
            )));
        }
        Ok(FrameStack::new(self.channel(class).to_owned()))
    }

    /// 由各类别帧栈重新组装掩码体. 所有帧栈形状必须一致且至少有一个.
    pub fn from_channels(channels: &[FrameStack]) -> BerryResult<Self> {
        let first = channels
            .first()
            .ok_or_else(|| BerryError::shape("cannot assemble a mask volume from zero channels"))?;
        let (h, w, n) = first.shape();
        if let Some((i, c)) = channels
            .iter()
            .enumerate()
            .find(|(_, c)| c.shape() != (h, w, n))
        {
            return Err(BerryError::shape(format!(
                "mask channel {i} has shape {:?}, expected ({h}, {w}, {n})",
                c.shape()
            )));
        }
        let mut data = Array4::<u8>::zeros((h, w, channels.len(), n));
        for (mut slot, c) in data.axis_iter_mut(Axis(2)).zip(channels) {
            slot.assign(&c.data());
        }
        Ok(Self { data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, IxDyn};

    #[test]
    fn test_from_dyn_rejects_wrong_rank() {
        let two = ArrayD::<u8>::zeros(IxDyn(&[4, 4]));
        assert!(matches!(
            FrameStack::from_dyn(two),
            Err(BerryError::Shape(_))
        ));
        let four = ArrayD::<u8>::zeros(IxDyn(&[4, 4, 1, 2]));
        assert!(matches!(
            FrameStack::from_dyn(four),
            Err(BerryError::Shape(_))
        ));
        let three = ArrayD::<u8>::zeros(IxDyn(&[4, 5, 2]));
        assert_eq!(FrameStack::from_dyn(three).unwrap().shape(), (4, 5, 2));
    }

    #[test]
    fn test_from_frames_keeps_order() {
        let frames = (0..3u8).map(|v| Array2::from_elem((2, 3), v));
        let stack = FrameStack::from_frames(frames).unwrap();
        assert_eq!(stack.shape(), (2, 3, 3));
        for (i, f) in stack.frames().enumerate() {
            assert!(f.iter().all(|&p| p == i as u8));
        }
    }

    #[test]
    fn test_from_frames_rejects_mismatch() {
        let frames = vec![Array2::zeros((2, 3)), Array2::zeros((3, 2))];
        assert!(FrameStack::from_frames(frames).is_err());
        assert!(FrameStack::from_frames(Vec::new()).is_err());
    }

    #[test]
    fn test_mask_channel_roundtrip() {
        let mut data = Array4::<u8>::zeros((2, 2, 2, 3));
        data.index_axis_mut(Axis(2), 1).fill(1);
        let masks = MaskVolume::new(data);
        assert_eq!(masks.classes(), 2);
        assert_eq!(masks.len(), 3);

        let c0 = masks.channel_stack(0).unwrap();
        let c1 = masks.channel_stack(1).unwrap();
        assert!(c0.data().iter().all(|&p| p == 0));
        assert!(c1.data().iter().all(|&p| p == 1));
        assert!(masks.channel_stack(2).is_err());

        let back = MaskVolume::from_channels(&[c0, c1]).unwrap();
        assert_eq!(back, masks);
    }
}
