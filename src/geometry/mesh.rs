//! 三角网格数据
//!
//! 网格只保存顶点位置与可选的面索引，法线、UV 等属性与表面采样无关。

use glam::Vec3;

use crate::core::error::{MorphError, MorphResult};

/// 三角网格
///
/// `indices` 为 `None` 时按连续三个顶点组成一个三角形（非索引几何体）。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// 顶点位置
    pub positions: Vec<Vec3>,
    /// 三角形索引（每三个一组）
    pub indices: Option<Vec<u32>>,
}

impl TriangleMesh {
    pub fn new(positions: Vec<Vec3>, indices: Option<Vec<u32>>) -> Self {
        Self { positions, indices }
    }

    /// 创建非索引网格
    pub fn non_indexed(positions: Vec<Vec3>) -> Self {
        Self {
            positions,
            indices: None,
        }
    }

    /// 三角形数量
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// 获取第 `face` 个三角形的三个顶点
    ///
    /// 调用前应通过 [`TriangleMesh::validate`] 保证索引有效，越界时返回 `None`。
    pub fn triangle(&self, face: usize) -> Option<[Vec3; 3]> {
        let base = face * 3;
        match &self.indices {
            Some(indices) => {
                let i = indices.get(base..base + 3)?;
                Some([
                    *self.positions.get(i[0] as usize)?,
                    *self.positions.get(i[1] as usize)?,
                    *self.positions.get(i[2] as usize)?,
                ])
            }
            None => {
                let p = self.positions.get(base..base + 3)?;
                Some([p[0], p[1], p[2]])
            }
        }
    }

    /// 遍历所有三角形
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        (0..self.triangle_count()).filter_map(move |face| self.triangle(face))
    }

    /// 检查网格结构是否合法
    pub fn validate(&self) -> MorphResult<()> {
        match &self.indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    return Err(MorphError::InvalidMesh(format!(
                        "index count {} is not a multiple of 3",
                        indices.len()
                    )));
                }
                if let Some(bad) = indices
                    .iter()
                    .find(|&&i| i as usize >= self.positions.len())
                {
                    return Err(MorphError::InvalidMesh(format!(
                        "index {} out of range for {} vertices",
                        bad,
                        self.positions.len()
                    )));
                }
            }
            None => {
                if self.positions.len() % 3 != 0 {
                    return Err(MorphError::InvalidMesh(format!(
                        "vertex count {} is not a multiple of 3",
                        self.positions.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// 原地缩放所有顶点
    pub fn scale_in_place(&mut self, factor: f32) {
        for p in &mut self.positions {
            *p *= factor;
        }
    }

    /// 返回缩放后的副本，不修改原网格
    pub fn scaled(&self, factor: f32) -> Self {
        let mut mesh = self.clone();
        mesh.scale_in_place(factor);
        mesh
    }

    /// 网格总表面积
    pub fn surface_area(&self) -> f32 {
        self.triangles()
            .map(|[a, b, c]| triangle_area(a, b, c))
            .sum()
    }
}

/// 三角形面积；非有限值视为退化（面积为零）
pub fn triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    let area = (b - a).cross(c - a).length() * 0.5;
    if area.is_finite() {
        area
    } else {
        0.0
    }
}
