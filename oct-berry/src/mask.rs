//! 概率体二值化.
//!
//! 所有类别共用同一个阈值. 若将来需要逐类别阈值, 应在此处扩展 [`MaskBuilder`].

use crate::{MaskVolume, ProbVolume};

/// 掩码构建器, 持有一个只读阈值.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MaskBuilder {
    threshold: f32,
}

impl MaskBuilder {
    /// 构建掩码构建器.
    ///
    /// `threshold` 必须是 `[0, 1]` 内的有限值, 否则返回 `None`.
    pub fn new(threshold: f32) -> Option<Self> {
        if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
            Some(Self { threshold })
        } else {
            None
        }
    }

    /// 阈值.
    #[inline]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// 二值化: 概率严格大于阈值的体素为 `1`, 其余为 `0`. 输出形状与输入相同.
    ///
    /// `NaN` 概率总被视为 `0`.
    pub fn build(&self, prob: &ProbVolume) -> MaskVolume {
        let t = self.threshold;
        MaskVolume::new(prob.data().mapv(|p| u8::from(p > t)))
    }
}
