use serde::{Deserialize, Serialize};

/// 缓动曲线
///
/// 所有曲线满足 `apply(0) == 0`、`apply(1) == 1`，输入会被钳制到 `[0, 1]`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// 线性
    #[serde(alias = "none")]
    Linear,
    /// 二次减速
    #[serde(alias = "power1.out")]
    QuadOut,
    /// 三次减速
    #[serde(alias = "power2.out")]
    CubicOut,
    /// 指数减速，粒子快速离开并缓慢贴合目标
    #[default]
    #[serde(alias = "expo.out")]
    ExpoOut,
    /// 四次加速-减速
    #[serde(alias = "power4.inOut")]
    Power4InOut,
}

impl Easing {
    /// 计算缓动后的进度
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0f32.powf(-10.0 * t)
                }
            }
            Easing::Power4InOut => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
        }
    }

    /// 是否为减速型曲线（末端斜率小于起始斜率）
    pub fn is_decelerating(self) -> bool {
        matches!(self, Easing::QuadOut | Easing::CubicOut | Easing::ExpoOut)
    }
}
