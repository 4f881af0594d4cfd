//! 基于 ONNX Runtime 的推理后端.
//!
//! # 注意
//!
//! 需要 `onnx` feature.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::{Array4, ArrayView4};
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::TensorRef;
use tracing::info;

use super::InferenceEngine;
use crate::error::{BerryError, BerryResult};

/// 从 ONNX 文件加载的推理后端.
///
/// 会话在加载时创建一次, 之后每帧复用. `Session::run` 需要独占访问, 因此以互斥锁包装.
pub struct OnnxEngine {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    model_path: PathBuf,
}

impl OnnxEngine {
    /// 从 `path` 加载模型.
    ///
    /// 文件不存在、损坏, 或模型没有输入/输出时返回 [`BerryError::ModelLoad`].
    /// 该错误对本次运行是致命的, 调用方不应重试.
    pub fn load<P: AsRef<Path>>(path: P) -> BerryResult<Self> {
        let path = path.as_ref();
        let load_err = |message: String| BerryError::ModelLoad {
            path: path.to_owned(),
            message,
        };

        if !path.is_file() {
            return Err(load_err("model file does not exist".to_owned()));
        }

        let session = Session::builder()
            .and_then(|b| b.with_log_level(LogLevel::Error))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| load_err(e.to_string()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| load_err("model declares no input".to_owned()))?;
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| load_err("model declares no output".to_owned()))?;

        info!(
            "Loaded model {} (input `{input_name}`, output `{output_name}`)",
            path.display()
        );
        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            model_path: path.to_owned(),
        })
    }

    /// 模型文件路径.
    #[inline]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl InferenceEngine for OnnxEngine {
    fn predict(&self, input: ArrayView4<f32>) -> BerryResult<Array4<f32>> {
        // 帧索引由调用方 `predict_stack` 填写.
        let infer_err = |message: String| BerryError::Inference { frame: 0, message };

        let input = input.as_standard_layout();
        let dims: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let data = input
            .as_slice()
            .ok_or_else(|| infer_err("input tensor is not contiguous".to_owned()))?;
        let tensor =
            TensorRef::from_array_view((dims, data)).map_err(|e| infer_err(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| infer_err("session lock poisoned".to_owned()))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| infer_err(e.to_string()))?;
        let (shape, values) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| infer_err(e.to_string()))?;

        let shape: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();
        Array4::from_shape_vec(
            <[usize; 4]>::try_from(shape.as_slice())
                .map_err(|_| infer_err(format!("expected 4-D output, got shape {shape:?}")))?,
            values.to_vec(),
        )
        .map_err(|e| infer_err(e.to_string()))
    }
}
