use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 模型资源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// 资源根目录
    pub base_dir: PathBuf,

    /// 模型文件（相对 `base_dir`），第 i 个注册为 `model{i}`
    pub models: Vec<String>,

    /// 采样前的统一缩放
    pub scale: f32,
}

impl_default!(AssetConfig {
    base_dir: PathBuf::from("assets"),
    models: vec![
        "model/go.glb".to_string(),
        "model/number1.glb".to_string(),
        "model/number2.glb".to_string(),
        "model/number3.glb".to_string(),
    ],
    scale: 100.0,
});

impl AssetConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.models.is_empty() {
            return Err(ConfigError::ValidationError(
                "At least one model is required".to_string(),
            ));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "Invalid model scale: {}",
                self.scale
            )));
        }
        Ok(())
    }
}
