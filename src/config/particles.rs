use super::{ConfigError, ConfigResult};
use crate::impl_default;
use crate::particles::NoisePerturbation;
use glam::Mat4;
use serde::{Deserialize, Serialize};

/// 粒子配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// 粒子数量 N，所有形状共享
    pub count: usize,

    /// 随机种子；未设置时每次运行不同
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// 模型根节点绕 X 轴的旋转（弧度）
    pub rotation_x: f32,

    /// 过渡扰动幅度；未设置时关闭
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_amplitude: Option<f32>,
}

impl_default!(ParticleConfig {
    count: 5000,
    seed: None,
    rotation_x: std::f32::consts::FRAC_PI_2,
    noise_amplitude: None,
});

impl ParticleConfig {
    /// 渲染外壳使用的模型根节点变换
    pub fn root_transform(&self) -> Mat4 {
        Mat4::from_rotation_x(self.rotation_x)
    }

    pub fn noise(&self) -> Option<NoisePerturbation> {
        self.noise_amplitude
            .map(|amplitude| NoisePerturbation { amplitude })
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.count == 0 {
            return Err(ConfigError::ValidationError(
                "Particle count must be positive".to_string(),
            ));
        }
        if !self.rotation_x.is_finite() {
            return Err(ConfigError::ValidationError(
                "Invalid root rotation".to_string(),
            ));
        }
        if let Some(amplitude) = self.noise_amplitude {
            if !amplitude.is_finite() || amplitude < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid noise amplitude: {}",
                    amplitude
                )));
            }
        }
        Ok(())
    }
}
