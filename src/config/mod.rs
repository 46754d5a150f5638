//! 统一配置系统
//!
//! 提供TOML/JSON配置文件与环境变量覆盖
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod assets;
pub mod particles;
pub mod scroll;

pub use assets::AssetConfig;
pub use particles::ParticleConfig;
pub use scroll::{LayoutElement, ScrollConfig};

use crate::animation::Easing;
use crate::core::viewport::Viewport;
use crate::impl_default;
use crate::particles::{MorphTiming, RandomCloudConfig};

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 变形引擎主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphConfig {
    /// 粒子配置
    pub particles: ParticleConfig,

    /// 变形时序
    pub morph: MorphTiming,

    /// 随机点云
    pub random_cloud: RandomCloudConfig,

    /// 模型资源
    pub assets: AssetConfig,

    /// 滚动区域与布局
    pub scroll: ScrollConfig,

    /// 初始视口
    pub viewport: Viewport,

    /// 无界面运行
    pub headless: HeadlessConfig,

    /// 日志配置
    pub logging: LoggingConfig,
}

impl MorphConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 保存为JSON文件
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // 粒子配置
        if let Some(count) = lookup("PARTICLE_MORPH_COUNT").and_then(|v| v.parse().ok()) {
            self.particles.count = count;
        }
        if let Some(seed) = lookup("PARTICLE_MORPH_SEED").and_then(|v| v.parse().ok()) {
            self.particles.seed = Some(seed);
        }
        if let Some(amplitude) = lookup("PARTICLE_MORPH_NOISE").and_then(|v| v.parse().ok()) {
            self.particles.noise_amplitude = Some(amplitude);
        }

        // 变形时序
        if let Some(duration) = lookup("PARTICLE_MORPH_DURATION").and_then(|v| v.parse().ok()) {
            self.morph.base_duration = duration;
        }
        if let Some(easing) = lookup("PARTICLE_MORPH_EASING").and_then(|v| parse_easing(&v)) {
            self.morph.easing = easing;
        }

        // 资源与视口
        if let Some(dir) = lookup("PARTICLE_MORPH_ASSET_DIR") {
            self.assets.base_dir = PathBuf::from(dir);
        }
        if let Some(width) = lookup("PARTICLE_MORPH_VIEWPORT_WIDTH").and_then(|v| v.parse().ok()) {
            self.viewport.width = width;
        }
        if let Some(height) = lookup("PARTICLE_MORPH_VIEWPORT_HEIGHT").and_then(|v| v.parse().ok())
        {
            self.viewport.height = height;
        }

        // 日志
        if let Some(level) = lookup("PARTICLE_MORPH_LOG_LEVEL").and_then(|v| LogLevel::parse(&v)) {
            self.logging.level = level;
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.particles.validate()?;
        self.assets.validate()?;
        self.scroll.validate()?;
        self.headless.validate()?;

        let timing = &self.morph;
        if !(timing.base_duration.is_finite() && timing.base_duration >= 0.0)
            || !(timing.duration_jitter.is_finite() && timing.duration_jitter >= 0.0)
            || !(timing.delay_jitter.is_finite() && timing.delay_jitter >= 0.0)
        {
            return Err(ConfigError::ValidationError(
                "Morph durations must be finite and non-negative".to_string(),
            ));
        }
        if !self.viewport.is_valid() {
            return Err(ConfigError::ValidationError(
                "Invalid viewport".to_string(),
            ));
        }
        if !(self.random_cloud.horizontal_scale.is_finite()
            && self.random_cloud.vertical_extent.is_finite())
        {
            return Err(ConfigError::ValidationError(
                "Invalid random cloud extents".to_string(),
            ));
        }
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./particle_morph.toml
    /// 2. ./particle_morph.json
    /// 3. 系统配置目录下的 particle_morph/config.toml
    /// 4. 使用默认配置
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::from_toml_file("particle_morph.toml") {
            tracing::info!(target: "engine", "Loaded config from particle_morph.toml");
            return config;
        }

        if let Ok(config) = Self::from_json_file("particle_morph.json") {
            tracing::info!(target: "engine", "Loaded config from particle_morph.json");
            return config;
        }

        if let Some(config_path) = user_config_path() {
            if let Ok(config) = Self::from_toml_file(&config_path) {
                tracing::info!(target: "engine", path = ?config_path, "Loaded config");
                return config;
            }
        }

        tracing::info!(target: "engine", "Using default configuration");
        Self::default()
    }
}

/// 用户级配置文件路径
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("particle_morph").join("config.toml"))
}

fn parse_easing(value: &str) -> Option<Easing> {
    serde_json::from_value(serde_json::Value::String(value.to_string())).ok()
}

/// 无界面运行配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    /// 模拟帧率
    pub frame_rate: u32,

    /// 滚动速度（像素/秒）
    pub scroll_speed: f32,

    /// 每段扫描结束后的停留时间（秒）
    pub settle_seconds: f32,
}

impl_default!(HeadlessConfig {
    frame_rate: 60,
    scroll_speed: 1500.0,
    settle_seconds: 2.0,
});

impl HeadlessConfig {
    /// 单帧时长（秒）
    pub fn frame_delta(&self) -> f32 {
        1.0 / self.frame_rate.max(1) as f32
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.frame_rate == 0 || self.frame_rate > 1000 {
            return Err(ConfigError::ValidationError(
                "Invalid frame rate".to_string(),
            ));
        }
        if !self.scroll_speed.is_finite() || self.scroll_speed <= 0.0 {
            return Err(ConfigError::ValidationError(
                "Invalid scroll speed".to_string(),
            ));
        }
        if !self.settle_seconds.is_finite() || self.settle_seconds < 0.0 {
            return Err(ConfigError::ValidationError(
                "Invalid settle time".to_string(),
            ));
        }
        Ok(())
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出 target
    pub show_target: bool,
}

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    show_target: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    /// 对应的 `EnvFilter` 指令
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = MorphConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particles.count, 5000);
        assert_eq!(config.morph.base_duration, 1.2);
        assert_eq!(config.morph.easing, Easing::ExpoOut);
        assert_eq!(config.assets.models.len(), 4);
        assert_eq!(config.assets.scale, 100.0);
        assert_eq!(config.scroll.regions.len(), 4);
    }

    #[test]
    fn test_toml_serialization() {
        let config = MorphConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: MorphConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.particles.count, parsed.particles.count);
        assert_eq!(config.scroll.regions, parsed.scroll.regions);
        assert_eq!(config.scroll.layout, parsed.scroll.layout);
    }

    #[test]
    fn test_json_serialization() {
        let config = MorphConfig::default();
        let json_str = serde_json::to_string(&config).unwrap();
        let parsed: MorphConfig = serde_json::from_str(&json_str).unwrap();
        assert_eq!(config.assets.models, parsed.assets.models);
        assert_eq!(config.morph, parsed.morph);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = MorphConfig::from_toml_str(
            r#"
            [particles]
            count = 128
            seed = 7

            [morph]
            easing = "power4.inOut"
            "#,
        )
        .unwrap();
        assert_eq!(config.particles.count, 128);
        assert_eq!(config.particles.seed, Some(7));
        assert_eq!(config.morph.easing, Easing::Power4InOut);
        assert_eq!(config.morph.base_duration, 1.2);
        assert_eq!(config.assets.scale, 100.0);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = MorphConfig::default();
        config.particles.count = 321;
        config.assets.base_dir = PathBuf::from("/srv/models");

        let toml_path = dir.path().join("particle_morph.toml");
        config.save_toml(&toml_path).unwrap();
        let loaded = MorphConfig::from_toml_file(&toml_path).unwrap();
        assert_eq!(loaded.particles.count, 321);
        assert_eq!(loaded.assets.base_dir, PathBuf::from("/srv/models"));

        let json_path = dir.path().join("particle_morph.json");
        config.save_json(&json_path).unwrap();
        let loaded = MorphConfig::from_json_file(&json_path).unwrap();
        assert_eq!(loaded.particles.count, 321);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            MorphConfig::from_toml_file("/nonexistent/particle_morph.toml"),
            Err(ConfigError::FileError(_))
        ));
        assert!(matches!(
            MorphConfig::from_toml_str("particles = 3"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PARTICLE_MORPH_COUNT", "64"),
            ("PARTICLE_MORPH_SEED", "42"),
            ("PARTICLE_MORPH_EASING", "expo.out"),
            ("PARTICLE_MORPH_DURATION", "0.5"),
            ("PARTICLE_MORPH_LOG_LEVEL", "DEBUG"),
            ("PARTICLE_MORPH_VIEWPORT_WIDTH", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = MorphConfig::default();
        config.morph.easing = Easing::Linear;
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.particles.count, 64);
        assert_eq!(config.particles.seed, Some(42));
        assert_eq!(config.morph.easing, Easing::ExpoOut);
        assert_eq!(config.morph.base_duration, 0.5);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.viewport.width, 1280.0);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = MorphConfig::default();
        config.particles.count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let mut config = MorphConfig::default();
        config.scroll.regions[1].leave_back = "model0".to_string();
        assert!(config.validate().is_err());

        let mut config = MorphConfig::default();
        config.morph.base_duration = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_referenced_shapes() {
        let config = MorphConfig::default();
        assert_eq!(
            config.scroll.referenced_shapes(),
            vec!["random", "model3", "model2", "model1", "model0"]
        );
    }
}
