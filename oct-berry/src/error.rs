//! 运行时错误.

use std::path::PathBuf;
use thiserror::Error;

/// 流水线各阶段的统一错误类型.
///
/// 除 [`BerryError::ModelLoad`] 外, 所有错误都意味着输入有误,
/// 调用方应修正输入后重新运行. 模型加载失败对本次运行是致命的, 不会重试.
#[derive(Error, Debug)]
pub enum BerryError {
    /// 目录中没有任何 `*.bmp` 文件.
    #[error("directory `{0}` does not contain any *.bmp images")]
    NoImagesFound(PathBuf),

    /// 目录中有 `*.bmp` 文件, 但没有一个符合原始分辨率.
    #[error("directory `{path}` has no *.bmp image of raw size {height}x{width}")]
    NoMatchingFrames {
        /// 扫描的目录.
        path: PathBuf,
        /// 期望高度.
        height: usize,
        /// 期望宽度.
        width: usize,
    },

    /// 数据维度或形状不符.
    #[error("shape error: {0}")]
    Shape(String),

    /// 推理后端无法加载.
    #[error("failed to load model `{path}`: {message}")]
    ModelLoad {
        /// 模型文件路径.
        path: PathBuf,
        /// 底层原因.
        message: String,
    },

    /// 推理失败, 或推理结果不符合约定.
    #[error("inference error on frame {frame}: {message}")]
    Inference {
        /// 出错帧索引.
        frame: usize,
        /// 底层原因.
        message: String,
    },

    /// 配置非法.
    #[error("configuration error: {0}")]
    Config(String),

    /// 复核窗口出错.
    #[error("review surface error: {0}")]
    Surface(String),

    /// 底层 I/O 错误.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// 图像编解码错误.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// 流水线运行结果.
pub type BerryResult<T> = Result<T, BerryError>;

impl BerryError {
    /// 构造形状错误.
    #[inline]
    pub(crate) fn shape<S: Into<String>>(msg: S) -> Self {
        Self::Shape(msg.into())
    }
}
