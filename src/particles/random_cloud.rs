//! 随机点云
//!
//! 初始排布：在包围盒内均匀分布，X/Z 范围随视口宽度缩放，Y 范围固定。

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::PointSet;
use crate::impl_default;

/// 随机点云参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomCloudConfig {
    /// X/Z 范围 = 视口宽度 × 该系数
    pub horizontal_scale: f32,
    /// Y 方向总范围
    pub vertical_extent: f32,
}

impl_default!(RandomCloudConfig {
    horizontal_scale: 1.2,
    vertical_extent: 1000.0,
});

impl RandomCloudConfig {
    /// 给定视口宽度时的包围盒半尺寸
    pub fn half_extents(&self, viewport_width: f32) -> Vec3 {
        let horizontal = viewport_width * self.horizontal_scale * 0.5;
        Vec3::new(horizontal, self.vertical_extent * 0.5, horizontal)
    }
}

/// 生成 `count` 个以原点为中心均匀分布的随机点
pub fn random_cloud<R: Rng + ?Sized>(
    count: usize,
    viewport_width: f32,
    config: &RandomCloudConfig,
    rng: &mut R,
) -> PointSet {
    let horizontal = viewport_width * config.horizontal_scale;
    let vertical = config.vertical_extent;
    let points = (0..count)
        .map(|_| {
            Vec3::new(
                (rng.gen::<f32>() - 0.5) * horizontal,
                (rng.gen::<f32>() - 0.5) * vertical,
                (rng.gen::<f32>() - 0.5) * horizontal,
            )
        })
        .collect();
    PointSet::from_points(points)
}
