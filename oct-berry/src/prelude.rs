//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::config::PipelineConfig;
pub use crate::dataset::{load_frames, LoadOutcome};
pub use crate::infer::{predict_stack, InferenceEngine};
pub use crate::mask::MaskBuilder;
pub use crate::pipeline::Pipeline;
pub use crate::resample::resize_stack;
pub use crate::review::{ReviewOutcome, ReviewSession, ReviewSummary, ReviewSurface, Verdict};
pub use crate::{BerryError, BerryResult};
pub use crate::{FrameStack, MaskVolume, ProbVolume, Resolution, Resolutions};

#[cfg(feature = "onnx")]
pub use crate::infer::OnnxEngine;

#[cfg(feature = "plot")]
pub use crate::review::OpenCvSurface;
