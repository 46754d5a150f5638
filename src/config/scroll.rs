use super::{ConfigError, ConfigResult};
use crate::core::error::ScrollResult;
use crate::impl_default;
use crate::particles::RANDOM_SHAPE;
use crate::scroll::{ElementRect, ScrollRegion, ScrollTimeline, StaticLayout, TriggerStart};
use serde::{Deserialize, Serialize};

/// 滚动配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// 未进入任何区域时的形状
    pub initial_shape: String,

    /// 按起点排序的区域链
    pub regions: Vec<ScrollRegion>,

    /// 无界面运行时使用的页面布局
    pub layout: Vec<LayoutElement>,
}

/// 布局中的一个元素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutElement {
    pub selector: String,
    pub top: f32,
    pub height: f32,
}

impl LayoutElement {
    fn new(selector: &str, top: f32, height: f32) -> Self {
        Self {
            selector: selector.to_string(),
            top,
            height,
        }
    }
}

impl_default!(ScrollConfig {
    initial_shape: RANDOM_SHAPE.to_string(),
    regions: vec![
        ScrollRegion::new("section02-top", "#section02", TriggerStart::TOP_BOTTOM, "model3", RANDOM_SHAPE),
        ScrollRegion::new("section03-top", "#section03", TriggerStart::TOP_BOTTOM, "model2", "model3"),
        ScrollRegion::new("section03-bottom", "#section03", TriggerStart::BOTTOM_BOTTOM, "model1", "model2"),
        ScrollRegion::new("section04-bottom", "#section04", TriggerStart::BOTTOM_BOTTOM, "model0", "model1"),
    ],
    layout: vec![
        LayoutElement::new("#section01", 0.0, 800.0),
        LayoutElement::new("#section02", 800.0, 1200.0),
        LayoutElement::new("#section03", 2000.0, 1200.0),
        LayoutElement::new("#section04", 3200.0, 1200.0),
    ],
});

impl ScrollConfig {
    /// 配置中的静态布局
    pub fn static_layout(&self) -> StaticLayout {
        let mut layout = StaticLayout::new();
        for element in &self.layout {
            layout.insert(
                element.selector.clone(),
                ElementRect {
                    top: element.top,
                    height: element.height,
                },
            );
        }
        layout
    }

    /// 静态布局下的最大滚动位置（文档高度减视口高度）
    pub fn max_scroll(&self, viewport_height: f32) -> f32 {
        (self.static_layout().document_height() - viewport_height).max(0.0)
    }

    /// 构建（未解析起点的）区域链
    pub fn timeline(&self) -> ScrollResult<ScrollTimeline> {
        ScrollTimeline::new(self.initial_shape.clone(), self.regions.clone())
    }

    /// 所有区域引用的形状名（含初始形状），去重且保持首次出现顺序
    pub fn referenced_shapes(&self) -> Vec<String> {
        let mut names = vec![self.initial_shape.clone()];
        for region in &self.regions {
            for name in [&region.enter, &region.leave_back] {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.timeline()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        for element in &self.layout {
            if !element.top.is_finite() || !element.height.is_finite() || element.height < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid layout element: {}",
                    element.selector
                )));
            }
        }
        Ok(())
    }
}
