//! 流水线配置.
//!
//! 配置在运行开始时读取 (TOML), 之后只读. 所有字段都有默认值, 配置文件可以只写需要覆盖的部分:
//!
//! ```toml
//! [resolution]
//! raw = { height = 1024, width = 512 }
//! net = { height = 512, width = 256 }
//! output = { height = 1024, width = 512 }
//!
//! [segmentation]
//! threshold = 0.5
//! model_path = "/models/anterior_segment.onnx"
//!
//! [review]
//! alpha = 0.6
//! display = { height = 900, width = 450 }
//! accept_dir = "CorrectScans"
//! reject_dir = "IncorrectScans"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{ACCEPT_DIR, DEFAULT_ALPHA, DEFAULT_THRESHOLD, REJECT_DIR};
use crate::error::{BerryError, BerryResult};
use crate::{Resolution, Resolutions};

/// 配置根结构.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 原始、网络、输出三组分辨率.
    pub resolution: Resolutions,
    /// 推理与二值化设置.
    pub segmentation: SegmentationConfig,
    /// 人工复核设置.
    pub review: ReviewConfig,
}

/// 推理与二值化设置.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// 二值化阈值, 对所有类别一致.
    pub threshold: f32,
    /// 模型文件路径. 为空时由调用方决定 (命令行参数或环境变量).
    pub model_path: Option<PathBuf>,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            model_path: None,
        }
    }
}

/// 人工复核设置.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// 展示时原图的权重. 叠加图的权重为 `1 - alpha`.
    pub alpha: f32,
    /// 复核窗口中图像的展示尺寸.
    pub display: Resolution,
    /// "确认" 目录名, 位于输入目录下.
    pub accept_dir: String,
    /// "拒绝" 目录名, 位于输入目录下.
    pub reject_dir: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            display: Resolution::new(900, 450),
            accept_dir: ACCEPT_DIR.to_owned(),
            reject_dir: REJECT_DIR.to_owned(),
        }
    }
}

impl PipelineConfig {
    /// 从 TOML 文件读取配置. 读取后会立即校验.
    pub fn from_file<P: AsRef<Path>>(path: P) -> BerryResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// 从 TOML 文本读取配置. 读取后会立即校验.
    pub fn from_toml_str(text: &str) -> BerryResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| BerryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置.
    ///
    /// 1. 所有分辨率不能含零边长;
    /// 2. `threshold` 必须是 `[0, 1]` 内的有限值;
    /// 3. 复核设置见 [`ReviewConfig::validate`].
    pub fn validate(&self) -> BerryResult<()> {
        let r = &self.resolution;
        for (name, res) in [("raw", r.raw), ("net", r.net), ("output", r.output)] {
            non_empty(name, res)?;
        }
        unit("threshold", self.segmentation.threshold)?;
        self.review.validate()
    }
}

impl ReviewConfig {
    /// 校验复核设置.
    ///
    /// 1. 展示尺寸不能含零边长;
    /// 2. `alpha` 必须是 `[0, 1]` 内的有限值;
    /// 3. 两个复核目录名不能为空, 不能相同, 不能包含路径分隔符.
    pub fn validate(&self) -> BerryResult<()> {
        non_empty("display", self.display)?;
        unit("alpha", self.alpha)?;

        let (a, b) = (&self.accept_dir, &self.reject_dir);
        if a.is_empty() || b.is_empty() {
            return Err(BerryError::Config("review directory names must not be empty".into()));
        }
        if a == b {
            return Err(BerryError::Config(format!(
                "accept and reject directories must differ, both are `{a}`"
            )));
        }
        if [a, b].iter().any(|d| d.contains(['/', '\\'])) {
            return Err(BerryError::Config(
                "review directory names must be plain names, not paths".into(),
            ));
        }
        Ok(())
    }
}

fn non_empty(name: &str, res: Resolution) -> BerryResult<()> {
    if res.is_empty() {
        return Err(BerryError::Config(format!(
            "{name} resolution must be non-zero, got {res}"
        )));
    }
    Ok(())
}

fn unit(name: &str, v: f32) -> BerryResult<()> {
    if v.is_finite() && (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(BerryError::Config(format!("{name} must be in [0, 1], got {v}")))
    }
}
