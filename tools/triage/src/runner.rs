//! 程序运行函数.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use oct_berry::prelude::*;
use tracing::{info, warn};
use utils::paths;

use crate::cli::Cli;

/// 读取配置, 命令行参数覆盖配置文件中的对应项.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let path = cli.config.clone().or_else(paths::config_from_env_or_home);
    let mut config = match path {
        Some(p) => {
            info!("Loading configuration from {}", p.display());
            PipelineConfig::from_file(&p)
                .with_context(|| format!("Cannot load configuration {}", p.display()))?
        }
        None => PipelineConfig::default(),
    };
    if let Some(t) = cli.threshold {
        config.segmentation.threshold = t;
    }
    if let Some(a) = cli.alpha {
        config.review.alpha = a;
    }
    if cli.model.is_some() {
        config.segmentation.model_path = cli.model.clone();
    }
    Ok(config)
}

/// 模型路径: 命令行/配置文件, 否则环境变量或主目录下的默认位置.
pub fn resolve_model(config: &PipelineConfig) -> anyhow::Result<PathBuf> {
    config
        .segmentation
        .model_path
        .clone()
        .or_else(paths::model_from_env_or_home)
        .ok_or_else(|| anyhow!("Cannot determine model path, pass --model"))
}

/// 实际运行. 操作员中止时返回 `Ok(None)`.
pub fn run(cli: &Cli) -> anyhow::Result<Option<ReviewSummary>> {
    let pipeline = Pipeline::new(resolve_config(cli)?).context("Invalid configuration")?;

    let stack = match pipeline.load(&cli.input)? {
        LoadOutcome::Loaded { stack, .. } => stack,
        LoadOutcome::Skipped(p) => {
            info!("{} is an output directory, nothing to do", p.display());
            return Ok(Some(ReviewSummary::default()));
        }
    };
    info!(
        "Loaded {} frames of {} from {}",
        stack.len(),
        stack.frame_shape(),
        cli.input.display()
    );

    let model = resolve_model(pipeline.config())?;
    let engine = OnnxEngine::load(&model)
        .with_context(|| format!("Cannot load model {}", model.display()))?;
    info!("Segmenting with {}", engine.model_path().display());
    let masks = pipeline.segment(&stack, &engine)?;

    let mut surface = OpenCvSurface::new();
    match pipeline.review(&cli.input, &stack, &masks, &mut surface)? {
        ReviewOutcome::Completed(summary) => Ok(Some(summary)),
        ReviewOutcome::Aborted { at, summary } => {
            warn!(
                "Review aborted at frame {at} ({} accepted, {} rejected)",
                summary.accepted, summary.rejected
            );
            Ok(None)
        }
    }
}
