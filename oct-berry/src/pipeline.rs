//! 完整流水线: 加载 -> 缩放 -> 推理 -> 二值化 -> 缩放 -> 复核.

use std::path::Path;

use tracing::info;

use crate::config::PipelineConfig;
use crate::dataset::{load_frames, LoadOutcome};
use crate::error::{BerryError, BerryResult};
use crate::infer::{predict_stack, InferenceEngine};
use crate::mask::MaskBuilder;
use crate::resample::resize_stack;
use crate::review::{ReviewOutcome, ReviewSession, ReviewSurface};
use crate::{FrameStack, MaskVolume, Resolutions};

/// 流水线. 构建时校验配置, 之后配置只读.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    masker: MaskBuilder,
}

impl Pipeline {
    /// 构建流水线. 配置非法时返回 [`BerryError::Config`].
    pub fn new(config: PipelineConfig) -> BerryResult<Self> {
        config.validate()?;
        let masker = MaskBuilder::new(config.segmentation.threshold).ok_or_else(|| {
            BerryError::Config(format!(
                "invalid threshold {}",
                config.segmentation.threshold
            ))
        })?;
        Ok(Self { config, masker })
    }

    /// 配置.
    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 三组分辨率.
    #[inline]
    pub fn resolutions(&self) -> Resolutions {
        self.config.resolution
    }

    /// 加载目录下的原始 B-scan, 见 [`load_frames`].
    pub fn load<P: AsRef<Path>>(&self, dir: P) -> BerryResult<LoadOutcome> {
        load_frames(dir, self.config.resolution.raw)
    }

    /// 对原始扫描栈做自动分割, 返回输出分辨率下的掩码体.
    ///
    /// 原始分辨率 -> 网络分辨率 -> 推理 -> 二值化 -> 每个类别缩放到输出分辨率.
    pub fn segment<E: InferenceEngine + ?Sized>(
        &self,
        scans: &FrameStack,
        engine: &E,
    ) -> BerryResult<MaskVolume> {
        let res = self.resolutions();
        let net_input = resize_stack(scans, res.net)?;
        info!(
            "Resampled {} frames from {} to network size {}",
            scans.len(),
            scans.frame_shape(),
            res.net
        );

        let prob = predict_stack(engine, &net_input)?;
        let masks = self.masker.build(&prob);
        info!(
            "Thresholded {} classes at {}",
            masks.classes(),
            self.masker.threshold()
        );

        let channels = (0..masks.classes())
            .map(|c| resize_stack(&masks.channel_stack(c)?, res.output))
            .collect::<BerryResult<Vec<_>>>()?;
        MaskVolume::from_channels(&channels)
    }

    /// 准备复核会话, 输出目录位于 `root` 下.
    pub fn prepare_review<P: AsRef<Path>>(
        &self,
        root: P,
        scans: &FrameStack,
        masks: &MaskVolume,
    ) -> BerryResult<ReviewSession> {
        ReviewSession::prepare(
            root,
            scans,
            masks,
            self.config.resolution.output,
            &self.config.review,
        )
    }

    /// 准备并运行复核.
    pub fn review<P: AsRef<Path>, S: ReviewSurface + ?Sized>(
        &self,
        root: P,
        scans: &FrameStack,
        masks: &MaskVolume,
        surface: &mut S,
    ) -> BerryResult<ReviewOutcome> {
        self.prepare_review(root, scans, masks)?.run(surface)
    }
}
