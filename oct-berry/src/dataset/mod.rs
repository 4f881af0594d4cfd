//! 原始 B-scan 目录加载.
//!
//! 目录下的所有 `*.bmp` 文件按文件名中的数字排序, 解码后只保留尺寸等于原始分辨率的图片,
//! 最后堆叠为一个 [`FrameStack`].

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use image::DynamicImage;
use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::consts::{ACCEPT_DIR, BITMAP_EXT, REJECT_DIR, SEGMENTED_MARKER};
use crate::error::{BerryError, BerryResult};
use crate::{FrameStack, Resolution};

/// 加载结果.
#[derive(Debug)]
pub enum LoadOutcome {
    /// 成功加载.
    Loaded {
        /// 按帧序排列的原始扫描栈.
        stack: FrameStack,
        /// 实际读取的目录.
        path: PathBuf,
    },

    /// 目录已被标记为分割过, 跳过.
    Skipped(PathBuf),
}

impl LoadOutcome {
    /// 若已加载, 返回扫描栈.
    #[inline]
    pub fn stack(&self) -> Option<&FrameStack> {
        match self {
            Self::Loaded { stack, .. } => Some(stack),
            Self::Skipped(_) => None,
        }
    }

    /// 读取 (或跳过) 的目录.
    #[inline]
    pub fn path(&self) -> &Path {
        match self {
            Self::Loaded { path, .. } | Self::Skipped(path) => path,
        }
    }
}

/// 文件名中所有数字字符依次拼接而成的整数, 以去掉前导零的十进制串保存,
/// 因此比较时不会溢出.
///
/// 不含数字的文件名对应空串, 排在最前.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DigitKey(String);

impl DigitKey {
    /// 从文件名构建.
    pub fn from_name(name: &str) -> Self {
        let digits: String = name.chars().filter(char::is_ascii_digit).collect();
        Self(digits.trim_start_matches('0').to_owned())
    }
}

impl Ord for DigitKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for DigitKey {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[inline]
fn file_name(p: &Path) -> &str {
    p.file_name().and_then(|s| s.to_str()).unwrap_or_default()
}

#[inline]
fn is_bitmap(p: &Path) -> bool {
    p.is_file()
        && p
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(BITMAP_EXT))
}

/// 目录是否已被标记为分割过.
///
/// 目录本身名为复核输出目录 (`CorrectScans`, `IncorrectScans`),
/// 或名字中含有 `segmented` (大小写不敏感) 时返回 `true`.
pub fn is_segmented_dir<P: AsRef<Path>>(path: P) -> bool {
    let name = file_name(path.as_ref());
    name == ACCEPT_DIR
        || name == REJECT_DIR
        || name.to_ascii_lowercase().contains(SEGMENTED_MARKER)
}

/// 列出目录下所有 `*.bmp` 文件, 按 [`DigitKey`] 升序排列.
/// 数字键相同的文件按文件名排序.
pub fn list_bitmaps<P: AsRef<Path>>(path: P) -> BerryResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(path.as_ref())? {
        let p = entry?.path();
        if is_bitmap(&p) {
            files.push(p);
        }
    }
    Ok(files
        .into_iter()
        .sorted_by_cached_key(|p| (DigitKey::from_name(file_name(p)), file_name(p).to_owned()))
        .collect())
}

/// 解码单个 bitmap 为单通道帧.
///
/// 调色板或三通道编码的灰度图 (每个像素三个通道相等) 按单通道处理.
/// 真彩色图片返回 `None`, 由调用方决定如何处理.
pub fn read_frame<P: AsRef<Path>>(path: P) -> BerryResult<Option<Array2<u8>>> {
    let (w, h, data) = match image::open(path.as_ref())? {
        DynamicImage::ImageLuma8(img) => (img.width(), img.height(), img.into_raw()),
        other => {
            let rgb = other.into_rgb8();
            if rgb.pixels().any(|p| p.0[0] != p.0[1] || p.0[1] != p.0[2]) {
                return Ok(None);
            }
            let data = rgb.pixels().map(|p| p.0[0]).collect();
            (rgb.width(), rgb.height(), data)
        }
    };
    Array2::from_shape_vec((h as usize, w as usize), data)
        .map(Some)
        .map_err(|e| BerryError::shape(e.to_string()))
}

/// 加载目录下的原始 B-scan.
///
/// # 注意
///
/// 1. 已分割过的目录 (见 [`is_segmented_dir`]) 返回 [`LoadOutcome::Skipped`], 不视为错误.
/// 2. 目录下没有 `*.bmp` 文件时返回 [`BerryError::NoImagesFound`].
/// 3. 只有尺寸恰为 `raw` 的单通道图片会被接受, 用以排除缩略图与彩色图.
///   若没有任何图片符合, 返回 [`BerryError::NoMatchingFrames`].
pub fn load_frames<P: AsRef<Path>>(path: P, raw: Resolution) -> BerryResult<LoadOutcome> {
    let path = path.as_ref().to_owned();
    if is_segmented_dir(&path) {
        info!("Skipping already segmented directory {}", path.display());
        return Ok(LoadOutcome::Skipped(path));
    }

    let files = list_bitmaps(&path)?;
    if files.is_empty() {
        return Err(BerryError::NoImagesFound(path));
    }

    let total = files.len();
    let mut frames = Vec::with_capacity(total);
    for (i, f) in files.iter().enumerate() {
        let Some(frame) = read_frame(f)? else {
            warn!("[{}/{total}] ignoring {}: not a single-channel image", i + 1, f.display());
            continue;
        };
        if frame.dim() == raw.as_idx() {
            debug!("[{}/{total}] loaded {}", i + 1, f.display());
            frames.push(frame);
        } else {
            warn!(
                "[{}/{total}] ignoring {}: size {:?} differs from raw size {raw}",
                i + 1,
                f.display(),
                frame.dim()
            );
        }
    }

    if frames.is_empty() {
        return Err(BerryError::NoMatchingFrames {
            path,
            height: raw.height,
            width: raw.width,
        });
    }

    info!(
        "Loaded {} of {total} bitmaps from {}",
        frames.len(),
        path.display()
    );
    let stack = FrameStack::from_frames(frames)?;
    Ok(LoadOutcome::Loaded { stack, path })
}
