//! 几何模块
//!
//! 提供表面采样所需的几何数据结构：
//! - `mesh` - 三角网格（顶点位置 + 可选索引）
//! - `point_set` - 索引对齐的固定长度点集
//! - `sampler` - 面积加权的表面采样器
//!
//! ## 使用示例
//!
//! ```rust
//! use particle_morph::geometry::{SurfaceSampler, TriangleMesh};
//! use glam::Vec3;
//! use rand::SeedableRng;
//!
//! let mesh = TriangleMesh::non_indexed(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
//! let sampler = SurfaceSampler::new(&mesh).unwrap();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let points = sampler.sample_points(5000, &mut rng);
//! assert_eq!(points.len(), 5000);
//! ```

pub mod mesh;
pub mod point_set;
pub mod sampler;


pub use mesh::{triangle_area, TriangleMesh};
pub use point_set::PointSet;
pub use sampler::SurfaceSampler;
