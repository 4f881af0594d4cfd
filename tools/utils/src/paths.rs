//! 模型与配置文件的默认路径.

use std::env;
use std::path::PathBuf;

use tracing::debug;

/// 模型路径环境变量.
pub const MODEL_ENV: &str = "OCT_BERRY_MODEL";

/// 配置文件路径环境变量.
pub const CONFIG_ENV: &str = "OCT_BERRY_CONFIG";

/// 获取 `{用户主目录}/models/oct-berry` 目录下给定继续项组成的全路径.
pub fn home_model_dir_with<P: AsRef<std::path::Path>, I: IntoIterator<Item = P>>(
    it: I,
) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("models");
    ans.push("oct-berry");
    ans.extend(it);
    Some(ans)
}

/// 获取模型路径.
///
/// 1. 若环境变量 `$OCT_BERRY_MODEL` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/models/oct-berry/segmentation.onnx`;
/// 3. 无法确定主目录时返回 `None`.
pub fn model_from_env_or_home() -> Option<PathBuf> {
    match env::var(MODEL_ENV) {
        Ok(p) if !p.is_empty() => {
            debug!("Model path taken from ${MODEL_ENV}: {p}");
            Some(PathBuf::from(p))
        }
        _ => {
            let p = home_model_dir_with(["segmentation.onnx"]);
            debug!("${MODEL_ENV} not set, falling back to {p:?}");
            p
        }
    }
}

/// 获取配置文件路径.
///
/// 1. 若环境变量 `$OCT_BERRY_CONFIG` 非空, 则返回其值;
/// 2. 否则, 若 `{配置目录}/oct-berry/config.toml` 存在, 则返回它;
/// 3. 否则返回 `None`, 调用方应使用默认配置.
pub fn config_from_env_or_home() -> Option<PathBuf> {
    match env::var(CONFIG_ENV) {
        Ok(p) if !p.is_empty() => {
            debug!("Config path taken from ${CONFIG_ENV}: {p}");
            Some(PathBuf::from(p))
        }
        _ => {
            let mut p = dirs::config_dir()?;
            p.push("oct-berry");
            p.push("config.toml");
            if p.is_file() {
                Some(p)
            } else {
                debug!("No config file at {}, using defaults", p.display());
                None
            }
        }
    }
}
