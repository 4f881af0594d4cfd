use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::{debug, info, warn};

use super::overlay::{blend, compose_overlay, to_gray_image};
use super::progress::{check_conflict, gaps_before, reviewed_union, Conflict};
use super::{ReviewSurface, SurfaceGuard, Verdict};
use crate::config::ReviewConfig;
use crate::consts::{channel, frame_file_name};
use crate::error::{BerryError, BerryResult};
use crate::resample::{resize_frame, resize_stack};
use crate::{FrameStack, MaskVolume, Resolution};

/// 一次复核的统计.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ReviewSummary {
    /// 本次运行的起始帧索引.
    pub start: usize,
    /// 本次写入确认目录的帧数.
    pub accepted: usize,
    /// 本次写入拒绝目录的帧数.
    pub rejected: usize,
    /// 因冲突而未写入的帧数.
    pub skipped: usize,
}

/// 复核结束方式.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReviewOutcome {
    /// 所有帧都已处理.
    Completed(ReviewSummary),

    /// 操作者在第 `at` 帧按下了无效键. 该帧及其后的帧留待下次运行.
    Aborted {
        /// 中止时所在的帧索引.
        at: usize,
        /// 中止前的统计.
        summary: ReviewSummary,
    },
}

impl ReviewOutcome {
    /// 统计信息.
    #[inline]
    pub fn summary(&self) -> &ReviewSummary {
        match self {
            Self::Completed(s) | Self::Aborted { summary: s, .. } => s,
        }
    }

    /// 是否被操作者中止.
    #[inline]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

/// 单帧处理结果.
enum Step {
    Accepted,
    Rejected,
    Skipped,
    Abort,
}

/// 复核会话.
///
/// 由 [`ReviewSession::prepare`] 完成目录创建、缩放与起始索引推算,
/// 再由 [`ReviewSession::run`] 驱动逐帧的展示与写入.
#[derive(Debug)]
pub struct ReviewSession {
    accept_dir: PathBuf,
    reject_dir: PathBuf,
    scans: FrameStack,
    structure: FrameStack,
    secondary: FrameStack,
    alpha: f32,
    display: Resolution,
    start: usize,
    gaps: Vec<usize>,
}

impl ReviewSession {
    /// 准备复核.
    ///
    /// 1. 在 `root` 下创建确认/拒绝目录 (已存在时不做任何事);
    /// 2. 将扫描栈以及掩码的主要结构、次要结构两个通道缩放到 `output` 分辨率;
    /// 3. 从两个目录的内容推算起始帧索引. 起始索引之前两个目录中都没有的帧
    ///   (见 [`ReviewSession::gaps`]) 逐个告警.
    ///
    /// `config` 非法时返回 [`BerryError::Config`].
    /// 掩码通道少于两个, 或掩码帧数与扫描帧数不一致时返回 [`BerryError::Shape`].
    pub fn prepare<P: AsRef<Path>>(
        root: P,
        scans: &FrameStack,
        masks: &MaskVolume,
        output: Resolution,
        config: &ReviewConfig,
    ) -> BerryResult<Self> {
        config.validate()?;
        if output.is_empty() {
            return Err(BerryError::Config(format!(
                "output resolution must be non-zero, got {output}"
            )));
        }
        if masks.classes() < channel::REQUIRED {
            return Err(BerryError::shape(format!(
                "review needs {} mask channels, got {}",
                channel::REQUIRED,
                masks.classes()
            )));
        }
        if masks.len() != scans.len() {
            return Err(BerryError::shape(format!(
                "mask volume has {} frames, scan stack has {}",
                masks.len(),
                scans.len()
            )));
        }

        let root = root.as_ref();
        let accept_dir = root.join(&config.accept_dir);
        let reject_dir = root.join(&config.reject_dir);
        fs::create_dir_all(&accept_dir)?;
        fs::create_dir_all(&reject_dir)?;
        info!(
            "Sorting into {} and {}",
            accept_dir.display(),
            reject_dir.display()
        );

        let scans = resize_stack(scans, output)?;
        let structure = resize_stack(&masks.channel_stack(channel::STRUCTURE)?, output)?;
        let secondary = resize_stack(&masks.channel_stack(channel::SECONDARY)?, output)?;

        let done = reviewed_union(&accept_dir, &reject_dir)?;
        let start = done.len();
        info!("Resuming review at frame {start} of {}", scans.len());
        let gaps = gaps_before(&done, start.min(scans.len()));
        for i in gaps.iter() {
            warn!(
                "Frame {i} has no output in either directory but lies before frame {start}, \
                 it will not be reviewed in this run"
            );
        }

        Ok(Self {
            accept_dir,
            reject_dir,
            scans,
            structure,
            secondary,
            alpha: config.alpha,
            display: config.display,
            start,
            gaps,
        })
    }

    /// 起始帧索引.
    #[inline]
    pub fn start_index(&self) -> usize {
        self.start
    }

    /// 起始索引之前, 两个目录中都没有产物的帧索引. 本次运行不会展示这些帧.
    #[inline]
    pub fn gaps(&self) -> &[usize] {
        &self.gaps
    }

    /// 总帧数.
    #[inline]
    pub fn len(&self) -> usize {
        self.scans.len()
    }

    /// 是否没有任何帧.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// 确认目录.
    #[inline]
    pub fn accept_dir(&self) -> &Path {
        &self.accept_dir
    }

    /// 拒绝目录.
    #[inline]
    pub fn reject_dir(&self) -> &Path {
        &self.reject_dir
    }

    /// 第 `index` 帧的叠加掩码 (主要结构全亮度 + 次要结构部分亮度). 确认时写入的就是它.
    pub fn overlay_at(&self, index: usize) -> Array2<u8> {
        compose_overlay(
            self.structure.frame_at(index),
            self.secondary.frame_at(index),
        )
    }

    /// 第 `index` 帧展示给操作者的图像: 原图与叠加掩码按 `alpha` 混合后缩放到展示尺寸.
    pub fn display_at(&self, index: usize) -> Array2<u8> {
        let blended = blend(
            self.scans.frame_at(index),
            self.overlay_at(index).view(),
            self.alpha,
        );
        resize_frame(blended.view(), self.display)
    }

    /// 从起始帧开始逐帧复核, 直到所有帧处理完毕或操作者中止.
    ///
    /// 每帧结束时 (包括中止与出错) 都会关闭复核窗口.
    pub fn run<S: ReviewSurface + ?Sized>(&self, surface: &mut S) -> BerryResult<ReviewOutcome> {
        let mut summary = ReviewSummary {
            start: self.start,
            ..Default::default()
        };

        info!("Please review automatically segmented images...");
        for i in self.start..self.len() {
            match self.review_frame(i, surface)? {
                Step::Accepted => summary.accepted += 1,
                Step::Rejected => summary.rejected += 1,
                Step::Skipped => summary.skipped += 1,
                Step::Abort => {
                    info!("Invalid key pressed at frame {i}, stopping review");
                    return Ok(ReviewOutcome::Aborted { at: i, summary });
                }
            }
        }

        info!(
            "Done reviewing: {} accepted, {} rejected, {} skipped",
            summary.accepted, summary.rejected, summary.skipped
        );
        Ok(ReviewOutcome::Completed(summary))
    }

    fn review_frame<S: ReviewSurface + ?Sized>(
        &self,
        i: usize,
        surface: &mut S,
    ) -> BerryResult<Step> {
        let key = {
            let mut guard = SurfaceGuard::acquire(surface);
            let title = format!("B-scan {i}: structure/secondary boundary overlay");
            guard.show_and_wait(&title, self.display_at(i).view())?
        };

        let verdict = Verdict::from_key(key);
        if verdict == Verdict::Abort {
            return Ok(Step::Abort);
        }

        let name = frame_file_name(i);
        let good = self.accept_dir.join(&name);
        let bad = self.reject_dir.join(&name);
        match check_conflict(&good, &bad) {
            Conflict::Free => {}
            Conflict::Duplicate => {
                warn!("Frame {i}: `{name}` exists in both output directories, skipping");
                return Ok(Step::Skipped);
            }
            Conflict::Reviewed => {
                warn!("Frame {i}: `{name}` was already reviewed, skipping");
                return Ok(Step::Skipped);
            }
        }

        match verdict {
            Verdict::Accept => {
                to_gray_image(self.overlay_at(i).view()).save(&good)?;
                debug!("Frame {i} accepted -> {}", good.display());
                Ok(Step::Accepted)
            }
            Verdict::Reject => {
                to_gray_image(self.scans.frame_at(i)).save(&bad)?;
                debug!("Frame {i} rejected -> {}", bad.display());
                Ok(Step::Rejected)
            }
            Verdict::Abort => Ok(Step::Abort),
        }
    }
}
