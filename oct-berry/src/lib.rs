#![warn(missing_docs)]

//! 核心库. 负责眼前节 OCT B-scan 的自动分割及其人工复核流程.
//!
//! 一次完整运行由如下几步组成:
//!
//! 1. 从目录中加载 `*.bmp` 原始 B-scan, 按文件名中的数字排序, 并过滤缩略图
//!   等尺寸不符的图片 ([`dataset`]);
//! 2. 将扫描栈缩放到网络输入分辨率 ([`resample`]);
//! 3. 逐帧送入训练好的网络, 获得每个类别的概率图 ([`infer`]);
//! 4. 以单一阈值将概率图二值化 ([`mask`]);
//! 5. 缩放回输出分辨率, 交由操作者逐帧确认或拒绝 ([`review`]).
//!
//! 复核结果以 `{index:03}.bmp` 的形式写入输入目录下的两个子目录中.
//! 每次启动时, 进度都会从这两个目录的内容重新推算, 因此中断后可以直接续做.
//!
//! # 注意
//!
//! 1. 网络本身 (训练、评估) 不在本 crate 的范围内. 推理后端通过
//!   [`infer::InferenceEngine`] trait 接入, `onnx` feature 提供基于 ONNX Runtime 的实现.
//! 2. 复核窗口通过 [`review::ReviewSurface`] trait 接入, `plot` feature 提供
//!   基于 OpenCV highgui 的实现.

/// 二维形状, 按 `(高, 宽)` 排列.
pub type Idx2d = (usize, usize);

/// 三维形状, 按 `(高, 宽, 帧)` 排列.
pub type Idx3d = (usize, usize, usize);

pub mod consts;
pub mod config;

mod data;
mod error;

pub use data::{FrameStack, MaskVolume, ProbVolume, Resolution, Resolutions};
pub use error::{BerryError, BerryResult};

pub mod dataset;
pub mod infer;
pub mod mask;
pub mod pipeline;
pub mod resample;
pub mod review;

pub mod prelude;
