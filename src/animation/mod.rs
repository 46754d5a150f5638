//! 动画模块
//!
//! 提供粒子变形使用的补间基础设施。
//!
//! ## 功能特性
//!
//! - 缓动曲线（线性、二次/三次减速、指数减速、四次加减速）
//! - 帧驱动的补间引擎，每帧由调度器推进一次
//! - 通过 `TweenSink` 把插值结果交还调用方，不持有回调闭包
//!
//! ## 使用示例
//!
//! ```rust
//! use particle_morph::animation::{Easing, Interpolator, Tween, TweenSink};
//! use glam::Vec3;
//!
//! struct Print;
//! impl TweenSink<usize> for Print {
//!     fn on_step(&mut self, _key: &usize, _value: Vec3, _progress: f32) -> bool {
//!         true
//!     }
//! }
//!
//! let mut engine = Interpolator::new();
//! engine.start(Tween::new(0usize, Vec3::ZERO, Vec3::ONE, 1.2, Easing::ExpoOut));
//! engine.tick(1.0 / 60.0, &mut Print);
//! assert_eq!(engine.len(), 1);
//! ```

pub mod easing;
pub mod tween;

pub use easing::Easing;
pub use tween::{Interpolator, TickReport, Tween, TweenSink};
