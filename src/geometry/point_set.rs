//! 索引对齐的点集
//!
//! 第 i 个点在所有点集以及实时粒子缓冲中都对应同一个粒子，变形完全依赖这一对应关系。

use glam::Vec3;
use std::ops::Index;

use crate::core::error::{MorphError, MorphResult};

/// 固定长度的三维点集
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    points: Vec<Vec3>,
}

impl PointSet {
    pub fn from_points(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    /// 从扁平坐标数组 `[x0, y0, z0, x1, ...]` 构造
    pub fn from_flat(coords: &[f32]) -> MorphResult<Self> {
        if coords.len() % 3 != 0 {
            return Err(MorphError::InvalidMesh(format!(
                "flat coordinate count {} is not a multiple of 3",
                coords.len()
            )));
        }
        let points = coords
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect();
        Ok(Self { points })
    }

    /// 点的数量 N
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.points.get(index).copied()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// 扁平视图，长度为 `3 * N`
    pub fn as_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.points)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec3> {
        self.points.iter()
    }

    pub fn into_points(self) -> Vec<Vec3> {
        self.points
    }

    /// 轴对齐包围盒 `(min, max)`，空点集返回 `None`
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))),
        )
    }
}

impl Index<usize> for PointSet {
    type Output = Vec3;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl From<Vec<Vec3>> for PointSet {
    fn from(points: Vec<Vec3>) -> Self {
        Self::from_points(points)
    }
}
