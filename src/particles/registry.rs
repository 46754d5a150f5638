//! 形状注册表
//!
//! 注册阶段使用 `ShapeRegistryBuilder`，全部期望形状到齐后 `build()`
//! 得到不可变的 `ShapeRegistry`。构建前不可查询，避免部分就绪。

use bevy_ecs::prelude::*;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::error::{MorphError, MorphResult};
use crate::geometry::{PointSet, SurfaceSampler, TriangleMesh};

/// 形状的来源
#[derive(Debug, Clone)]
pub enum ShapeSource {
    /// 由网格表面采样得到
    Mesh(Arc<TriangleMesh>),
    /// 程序生成（随机点云等）
    Procedural,
}

/// 注册输入：网格或现成坐标
#[derive(Debug, Clone)]
pub enum ShapeInput {
    Mesh(TriangleMesh),
    Points(PointSet),
}

/// 已注册形状
#[derive(Debug, Clone)]
pub struct ShapeEntry {
    pub points: PointSet,
    pub source: ShapeSource,
}

/// 注册表构建器
#[derive(Debug)]
pub struct ShapeRegistryBuilder {
    particle_count: usize,
    expected: Vec<String>,
    shapes: HashMap<String, ShapeEntry>,
}

impl ShapeRegistryBuilder {
    /// `expected` 为就绪前必须全部注册的形状名
    pub fn new<I, S>(particle_count: usize, expected: I) -> MorphResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if particle_count == 0 {
            return Err(MorphError::EmptyParticleCount);
        }
        Ok(Self {
            particle_count,
            expected: expected.into_iter().map(Into::into).collect(),
            shapes: HashMap::new(),
        })
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    /// 注册一个形状
    ///
    /// 网格经表面采样转换为 N 个点；点集长度必须等于 N，否则立即失败。
    pub fn register<R: Rng + ?Sized>(
        &mut self,
        name: impl Into<String>,
        input: ShapeInput,
        rng: &mut R,
    ) -> MorphResult<()> {
        let name = name.into();
        if self.shapes.contains_key(&name) {
            return Err(MorphError::DuplicateShape(name));
        }

        let entry = match input {
            ShapeInput::Mesh(mesh) => {
                let points = SurfaceSampler::new(&mesh)?.sample_points(self.particle_count, rng);
                ShapeEntry {
                    points,
                    source: ShapeSource::Mesh(Arc::new(mesh)),
                }
            }
            ShapeInput::Points(points) => {
                if points.len() != self.particle_count {
                    return Err(MorphError::LengthMismatch {
                        name,
                        expected: self.particle_count,
                        actual: points.len(),
                    });
                }
                ShapeEntry {
                    points,
                    source: ShapeSource::Procedural,
                }
            }
        };

        tracing::debug!(
            target: "morph",
            shape = %name,
            points = entry.points.len(),
            "Registered shape"
        );
        self.shapes.insert(name, entry);
        Ok(())
    }

    /// 尚未注册的期望形状
    pub fn missing(&self) -> Vec<String> {
        self.expected
            .iter()
            .filter(|name| !self.shapes.contains_key(*name))
            .cloned()
            .collect()
    }

    /// 所有期望形状到齐后生成注册表
    pub fn build(self) -> MorphResult<ShapeRegistry> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(MorphError::MissingShapes(missing));
        }
        Ok(ShapeRegistry {
            particle_count: self.particle_count,
            shapes: self.shapes,
        })
    }
}

/// 不可变的形状注册表
#[derive(Resource, Debug, Clone)]
pub struct ShapeRegistry {
    particle_count: usize,
    shapes: HashMap<String, ShapeEntry>,
}

impl ShapeRegistry {
    /// 查询形状点集
    pub fn get(&self, name: &str) -> MorphResult<&PointSet> {
        self.entry(name).map(|entry| &entry.points)
    }

    pub fn entry(&self, name: &str) -> MorphResult<&ShapeEntry> {
        self.shapes
            .get(name)
            .ok_or_else(|| MorphError::UnknownShape(name.to_string()))
    }

    /// 产生该形状的源网格（程序生成的形状返回 `None`）
    pub fn source_mesh(&self, name: &str) -> Option<&TriangleMesh> {
        match &self.shapes.get(name)?.source {
            ShapeSource::Mesh(mesh) => Some(mesh.as_ref()),
            ShapeSource::Procedural => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    /// 形状名（已排序）
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.shapes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
