//! 滚动触发模块
//!
//! 把滚动位置映射为形状过渡：
//! - `trigger` - 起点关键字解析、元素布局来源
//! - `timeline` - 有序区域链与进入/退出状态机
//!
//! 默认区域链（与页面上 `#section02`..`#section04` 对应）：
//!
//! ```text
//! random → model3 → model2 → model1 → model0
//! ```
//!
//! 向上滚动时按完全相反的顺序回退。

pub mod timeline;
pub mod trigger;

pub use timeline::{Direction, RegionTransition, ScrollRegion, ScrollTimeline};
pub use trigger::{resolve_start, Anchor, ElementRect, LayoutSource, StaticLayout, TriggerStart};
