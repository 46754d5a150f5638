//! 视口与相机适配
//!
//! 相机距离取视口高度的一半除以半视场角正切，使一个世界单位对应一个像素。

use bevy_ecs::prelude::*;
use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::impl_default;

/// 视口尺寸（像素）
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl_default!(Viewport {
    width: 1280.0,
    height: 800.0,
});

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// 像素对齐的透视相机参数
    pub fn camera_fit(&self, fov_degrees: f32) -> CameraFit {
        let half_fov = (fov_degrees * 0.5).to_radians();
        let distance = self.height * 0.5 / half_fov.tan();
        CameraFit {
            fov_degrees,
            aspect: self.aspect(),
            near: 1.0,
            far: distance * 2.0,
            distance,
        }
    }
}

/// 透视相机参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFit {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// 相机到原点的距离（沿 +Z）
    pub distance: f32,
}

impl CameraFit {
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(
            glam::Vec3::new(0.0, 0.0, self.distance),
            glam::Vec3::ZERO,
            glam::Vec3::Y,
        )
    }
}
