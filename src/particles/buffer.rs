//! 实时粒子缓冲
//!
//! 渲染外壳每帧读取的唯一位置数组。只有变形控制器会写入它，
//! 每次写入都会置脏，外壳据此决定是否重新上传。

use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::geometry::PointSet;

/// 粒子位置缓冲
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ParticleBuffer {
    positions: Vec<Vec3>,
    dirty: bool,
    /// 每次置脏递增，便于外壳判断是否错过了上传
    version: u64,
}

impl ParticleBuffer {
    /// 以给定点集作为初始排布
    pub fn from_point_set(points: &PointSet) -> Self {
        Self {
            positions: points.points().to_vec(),
            dirty: true,
            version: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.positions.get(index).copied()
    }

    /// 写入单个粒子位置并置脏；越界写入被忽略
    pub fn set(&mut self, index: usize, value: Vec3) {
        if let Some(slot) = self.positions.get_mut(index) {
            *slot = value;
            self.mark_dirty();
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// 扁平坐标视图 `[x0, y0, z0, x1, ...]`
    pub fn as_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// 上传用字节视图
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn mark_dirty(&mut self) {
        if !self.dirty {
            self.version += 1;
        }
        self.dirty = true;
    }

    /// 读取并清除脏标记，返回清除前的状态
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// 当前排布的快照
    pub fn snapshot(&self) -> PointSet {
        PointSet::from_points(self.positions.clone())
    }
}
