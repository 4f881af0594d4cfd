//! 命令行工具依赖的通用组件.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod paths;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 初始化日志 (标准错误输出).
///
/// 1. 若环境变量 `$RUST_LOG` 合法, 则以其为准;
/// 2. 否则使用 `level` (如 `"info"`, `"debug"`).
///
/// `json` 为 `true` 时以 JSON 行格式输出. 重复初始化时返回 `false`.
pub fn init_logging(level: &str, json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.is_ok()
}
