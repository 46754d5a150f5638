//! 触发起点
//!
//! 起点关键字形如 `"top bottom"`：第一个锚点落在元素上，第二个落在视口上，
//! 两者重合时的滚动位置即为触发位置。锚点支持 `top`/`center`/`bottom`、
//! 像素值（`120px` 或 `120`）以及百分比（`25%`）。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::core::error::{ScrollError, ScrollResult};

/// 元素或视口上的锚点
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    Top,
    Center,
    Bottom,
    /// 距顶部的像素
    Pixels(f32),
    /// 距顶部的百分比
    Percent(f32),
}

impl Anchor {
    /// 锚点距顶部的偏移
    pub fn resolve(self, extent: f32) -> f32 {
        match self {
            Anchor::Top => 0.0,
            Anchor::Center => extent * 0.5,
            Anchor::Bottom => extent,
            Anchor::Pixels(px) => px,
            Anchor::Percent(pct) => extent * pct / 100.0,
        }
    }
}

impl FromStr for Anchor {
    type Err = ScrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScrollError::InvalidOffset(s.to_string());
        match s {
            "top" => Ok(Anchor::Top),
            "center" => Ok(Anchor::Center),
            "bottom" => Ok(Anchor::Bottom),
            _ => {
                let parsed = if let Some(pct) = s.strip_suffix('%') {
                    pct.parse::<f32>().map(Anchor::Percent)
                } else {
                    s.strip_suffix("px").unwrap_or(s).parse::<f32>().map(Anchor::Pixels)
                };
                match parsed {
                    Ok(Anchor::Percent(v)) | Ok(Anchor::Pixels(v)) if !v.is_finite() => Err(invalid()),
                    Ok(anchor) => Ok(anchor),
                    Err(_) => Err(invalid()),
                }
            }
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Top => write!(f, "top"),
            Anchor::Center => write!(f, "center"),
            Anchor::Bottom => write!(f, "bottom"),
            Anchor::Pixels(px) => write!(f, "{}px", px),
            Anchor::Percent(pct) => write!(f, "{}%", pct),
        }
    }
}

/// 触发起点：元素锚点与视口锚点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TriggerStart {
    pub element: Anchor,
    pub viewport: Anchor,
}

impl TriggerStart {
    pub const TOP_BOTTOM: TriggerStart = TriggerStart {
        element: Anchor::Top,
        viewport: Anchor::Bottom,
    };
    pub const BOTTOM_BOTTOM: TriggerStart = TriggerStart {
        element: Anchor::Bottom,
        viewport: Anchor::Bottom,
    };

    /// 计算触发时的滚动位置
    pub fn resolve(&self, rect: ElementRect, viewport_height: f32) -> f32 {
        rect.top + self.element.resolve(rect.height) - self.viewport.resolve(viewport_height)
    }
}

impl FromStr for TriggerStart {
    type Err = ScrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(element), Some(viewport), None) => Ok(TriggerStart {
                element: element.parse()?,
                viewport: viewport.parse()?,
            }),
            _ => Err(ScrollError::InvalidOffset(s.to_string())),
        }
    }
}

impl TryFrom<String> for TriggerStart {
    type Error = ScrollError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TriggerStart> for String {
    fn from(value: TriggerStart) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TriggerStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

/// 元素在文档中的纵向位置（像素）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRect {
    pub top: f32,
    pub height: f32,
}

impl ElementRect {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// 元素布局来源（由页面外壳提供）
pub trait LayoutSource {
    fn element_rect(&self, selector: &str) -> Option<ElementRect>;

    /// 文档可滚动总高度；未知时为 `None`
    fn scroll_height(&self) -> Option<f32> {
        None
    }
}

/// 固定布局，用于无界面运行和测试
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticLayout {
    rects: HashMap<String, ElementRect>,
}

impl StaticLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, selector: impl Into<String>, top: f32, height: f32) -> Self {
        self.insert(selector, ElementRect { top, height });
        self
    }

    pub fn insert(&mut self, selector: impl Into<String>, rect: ElementRect) {
        self.rects.insert(selector.into(), rect);
    }

    /// 文档总高度（最低元素的底边）
    pub fn document_height(&self) -> f32 {
        self.rects
            .values()
            .map(ElementRect::bottom)
            .fold(0.0, f32::max)
    }
}

impl LayoutSource for StaticLayout {
    fn element_rect(&self, selector: &str) -> Option<ElementRect> {
        self.rects.get(selector).copied()
    }

    fn scroll_height(&self) -> Option<f32> {
        Some(self.document_height())
    }
}

/// 解析选择器并计算起点
pub fn resolve_start(
    layout: &dyn LayoutSource,
    selector: &str,
    start: TriggerStart,
    viewport_height: f32,
) -> ScrollResult<f32> {
    let rect = layout
        .element_rect(selector)
        .ok_or_else(|| ScrollError::UnknownElement(selector.to_string()))?;
    Ok(start.resolve(rect, viewport_height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!("top bottom".parse::<TriggerStart>().unwrap(), TriggerStart::TOP_BOTTOM);
        assert_eq!(
            "bottom  bottom".parse::<TriggerStart>().unwrap(),
            TriggerStart::BOTTOM_BOTTOM
        );
        let mixed: TriggerStart = "25% 100px".parse().unwrap();
        assert_eq!(mixed.element, Anchor::Percent(25.0));
        assert_eq!(mixed.viewport, Anchor::Pixels(100.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("top".parse::<TriggerStart>().is_err());
        assert!("top bottom center".parse::<TriggerStart>().is_err());
        assert!("middle bottom".parse::<TriggerStart>().is_err());
        assert!("NaN% bottom".parse::<TriggerStart>().is_err());
    }

    #[test]
    fn test_resolve_positions() {
        let rect = ElementRect {
            top: 2000.0,
            height: 1200.0,
        };
        assert_eq!(TriggerStart::TOP_BOTTOM.resolve(rect, 800.0), 1200.0);
        assert_eq!(TriggerStart::BOTTOM_BOTTOM.resolve(rect, 800.0), 2400.0);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&TriggerStart::BOTTOM_BOTTOM).unwrap();
        assert_eq!(json, "\"bottom bottom\"");
        let back: TriggerStart = serde_json::from_str("\"top 50%\"").unwrap();
        assert_eq!(back.viewport, Anchor::Percent(50.0));
    }

    #[test]
    fn test_unknown_element() {
        let layout = StaticLayout::new().with("#section02", 800.0, 1200.0);
        assert_eq!(
            resolve_start(&layout, "#missing", TriggerStart::TOP_BOTTOM, 800.0),
            Err(ScrollError::UnknownElement("#missing".to_string()))
        );
        assert_eq!(layout.document_height(), 2000.0);
        assert_eq!(layout.scroll_height(), Some(2000.0));
    }
}
