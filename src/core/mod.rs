//! 核心模块
//!
//! 包含引擎的核心功能：
//! - `engine` - 无界面运行入口
//! - `systems` - ECS系统定义
//! - `resources` - ECS资源定义
//! - `viewport` - 视口与相机适配
//! - `error` - 错误类型定义

pub mod engine;
pub mod error;
pub mod resources;
pub mod systems;
pub mod viewport;
#[macro_use]
pub mod macros;

// 重新导出错误类型
pub use error::{
    AssetError, AssetResult, EngineError, EngineResult, MorphError, MorphResult, ScrollError,
    ScrollResult,
};

// 重新导出主要类型
pub use engine::{Engine, SweepReport};
pub use resources::{ScrollInput, Time, TransitionLog};
pub use systems::{morph_update_system, scroll_trigger_system};
pub use viewport::{CameraFit, Viewport};
