//! 命令行参数.

use std::path::PathBuf;

use clap::Parser;

/// OCT B-scan 自动分割与人工复核.
#[derive(Debug, Parser)]
#[command(name = "triage", version, about)]
pub struct Cli {
    /// 存放原始 B-scan 位图的目录.
    pub input: PathBuf,

    /// ONNX 分割模型路径. 默认依次取配置文件, `$OCT_BERRY_MODEL`, `~/models/oct-berry/segmentation.onnx`.
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// TOML 配置文件路径. 默认取 `$OCT_BERRY_CONFIG`.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 覆盖配置中的二值化阈值.
    #[arg(long)]
    pub threshold: Option<f32>,

    /// 覆盖配置中的展示混合系数.
    #[arg(long)]
    pub alpha: Option<f32>,

    /// 日志级别, `$RUST_LOG` 优先.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// 以 JSON 行格式输出日志.
    #[arg(long)]
    pub json_log: bool,
}
