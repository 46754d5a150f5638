//! 网格表面采样器
//!
//! 按三角形面积加权选面，再在三角形内做均匀的重心坐标采样。
//! 面积为零的三角形在累积分布中不占区间，因此永远不会被选中。

use glam::Vec3;
use rand::Rng;

use super::mesh::{triangle_area, TriangleMesh};
use super::point_set::PointSet;
use crate::core::error::{MorphError, MorphResult};

/// 面积加权的表面采样器
///
/// 构建时计算累积面积分布，之后每次采样为 O(log F)。
#[derive(Debug)]
pub struct SurfaceSampler<'a> {
    mesh: &'a TriangleMesh,
    /// 第 i 个元素为前 i+1 个三角形的面积和
    cumulative: Vec<f64>,
    total_area: f64,
    /// 最后一个非退化三角形，用于吸收浮点舍入落在分布末端的情况
    last_valid_face: usize,
}

impl<'a> SurfaceSampler<'a> {
    /// 构建采样器
    ///
    /// 网格结构非法时返回 `InvalidMesh`，总面积为零时返回 `DegenerateGeometry`。
    pub fn new(mesh: &'a TriangleMesh) -> MorphResult<Self> {
        mesh.validate()?;

        let mut cumulative = Vec::with_capacity(mesh.triangle_count());
        let mut total = 0.0f64;
        let mut last_valid_face = None;
        for (face, [a, b, c]) in mesh.triangles().enumerate() {
            let area = triangle_area(a, b, c) as f64;
            if area > 0.0 {
                last_valid_face = Some(face);
            }
            total += area;
            cumulative.push(total);
        }

        let last_valid_face = match last_valid_face {
            Some(face) if total > 0.0 => face,
            _ => return Err(MorphError::DegenerateGeometry),
        };

        Ok(Self {
            mesh,
            cumulative,
            total_area: total,
            last_valid_face,
        })
    }

    /// 网格总表面积
    pub fn total_area(&self) -> f64 {
        self.total_area
    }

    /// 按面积加权随机选择一个三角形
    pub fn sample_face<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let r = rng.gen::<f64>() * self.total_area;
        let face = self.cumulative.partition_point(|&c| c <= r);
        face.min(self.last_valid_face)
    }

    /// 采样一个表面点，同时返回其所在三角形
    pub fn sample_with_face<R: Rng + ?Sized>(&self, rng: &mut R) -> (usize, Vec3) {
        let face = self.sample_face(rng);
        // validate() 已保证索引有效
        let [a, b, c] = self.mesh.triangle(face).unwrap_or([Vec3::ZERO; 3]);

        let mut u = rng.gen::<f32>();
        let mut v = rng.gen::<f32>();
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        (face, a + (b - a) * u + (c - a) * v)
    }

    /// 采样一个表面点
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        self.sample_with_face(rng).1
    }

    /// 采样恰好 `count` 个点
    pub fn sample_points<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> PointSet {
        let points = (0..count).map(|_| self.sample(rng)).collect();
        PointSet::from_points(points)
    }
}
