//! 统一错误处理模块
//!
//! 提供粒子变形引擎范围内的错误类型定义
//!
//! ## 错误类型分层
//!
//! - `AssetError`: 网格资源加载失败（包括不可采样的退化几何体）
//! - `MorphError`: 形状注册表与变形控制器的契约错误
//! - `ScrollError`: 滚动触发区域的解析与排序错误
//!
//! `EngineError` 聚合以上所有错误，用于初始化流程向调用方报告。

use thiserror::Error;

use crate::config::ConfigError;

/// 引擎核心错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Initialization error: {0}")]
    Init(String),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Morph error: {0}")]
    Morph(#[from] MorphError),

    #[error("Scroll error: {0}")]
    Scroll(#[from] ScrollError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 资源加载错误
///
/// 任意一个网格加载失败都会使就绪汇合失败，不产生部分注册表。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("Asset not found: {path}")]
    NotFound { path: String },

    #[error("Failed to load asset: {path}, reason: {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("Asset contains no triangle mesh: {path}")]
    NoMesh { path: String },

    #[error("Degenerate geometry in {path}: total surface area is zero")]
    DegenerateGeometry { path: String },

    #[error("Invalid mesh in {path}: {reason}")]
    InvalidMesh { path: String, reason: String },
}

/// 变形领域错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MorphError {
    /// 请求了未注册的形状
    #[error("Unknown shape requested: {0}")]
    UnknownShape(String),

    /// 点集长度与粒子数不一致
    #[error("Point set length mismatch for '{name}': expected {expected}, got {actual}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// 同名形状重复注册
    #[error("Shape already registered: {0}")]
    DuplicateShape(String),

    /// 注册表未完成（仍有期望的形状缺失）
    #[error("Shape registry incomplete, missing: {0:?}")]
    MissingShapes(Vec<String>),

    /// 网格不可采样
    #[error("Degenerate geometry: mesh has zero surface area")]
    DegenerateGeometry,

    /// 网格数据不合法（索引越界、三角形不完整等）
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// 粒子数必须大于零
    #[error("Particle count must be greater than zero")]
    EmptyParticleCount,
}

/// 滚动触发错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScrollError {
    #[error("Invalid trigger offset keyword: '{0}'")]
    InvalidOffset(String),

    #[error("Trigger element not found: {0}")]
    UnknownElement(String),

    #[error("Scroll regions are not ordered: '{later}' starts before '{earlier}'")]
    UnorderedRegions { earlier: String, later: String },

    #[error(
        "Broken region chain at '{region}': leaves back to '{leave_target}', previous shape is '{expected}'"
    )]
    BrokenChain {
        region: String,
        leave_target: String,
        expected: String,
    },
}

/// 引擎结果类型
pub type EngineResult<T> = Result<T, EngineError>;
/// 资源结果类型
pub type AssetResult<T> = Result<T, AssetError>;
/// 变形结果类型
pub type MorphResult<T> = Result<T, MorphError>;
/// 滚动结果类型
pub type ScrollResult<T> = Result<T, ScrollError>;

impl AssetError {
    /// 将采样阶段的领域错误映射为资源错误（退化几何体视同加载失败）
    pub fn from_morph(path: impl Into<String>, err: MorphError) -> Self {
        let path = path.into();
        match err {
            MorphError::DegenerateGeometry => AssetError::DegenerateGeometry { path },
            MorphError::InvalidMesh(reason) => AssetError::InvalidMesh { path, reason },
            other => AssetError::LoadFailed {
                path,
                reason: other.to_string(),
            },
        }
    }
}
