//! 粒子模块
//!
//! 变形引擎的核心：
//! - `buffer` - 渲染外壳读取的实时位置缓冲
//! - `registry` - 形状注册表（N 个点的目标点集）
//! - `random_cloud` - 初始随机点云
//! - `morph` - 逐粒子补间的变形控制器
//!
//! ## 数据流
//!
//! ```text
//! 网格资源 → SurfaceSampler → ShapeRegistry
//!                                  │
//!          滚动过渡 → MorphController::morph_to
//!                                  │ 每帧 tick
//!                                  ▼
//!                            ParticleBuffer → 渲染外壳
//! ```

pub mod buffer;
pub mod morph;
pub mod random_cloud;
pub mod registry;

pub use buffer::ParticleBuffer;
pub use morph::{
    MorphController, MorphStats, MorphTiming, NoisePerturbation, ParticleKey, TransitionRequest,
};
pub use random_cloud::{random_cloud, RandomCloudConfig};
pub use registry::{ShapeEntry, ShapeInput, ShapeRegistry, ShapeRegistryBuilder, ShapeSource};

/// 随机点云的形状名
pub const RANDOM_SHAPE: &str = "random";

/// 第 `index` 个模型的形状名
pub fn model_shape_name(index: usize) -> String {
    format!("model{}", index)
}
