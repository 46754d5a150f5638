//! 滚动状态机
//!
//! 每个区域独立记录是否已进入：向下越过起点触发一次 enter，
//! 向上退回起点触发一次 leave-back，同方向继续滚动不会重复触发。
//! 区域按起点排序串成一条链，链上相邻区域的形状必须首尾相接：
//! 第 i 个区域的 leave-back 目标等于第 i-1 个区域的 enter 目标（首个区域对应初始形状）。
//!
//! 起点不小于最大滚动位置的区域在滚到底时视为已越过，否则末尾区域永远无法进入。

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use super::trigger::{resolve_start, LayoutSource, TriggerStart};
use crate::core::error::{ScrollError, ScrollResult};

/// 滚动触发区域
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollRegion {
    /// 区域名（用于日志）
    pub name: String,
    /// 触发元素选择器
    pub trigger: String,
    /// 起点关键字
    pub start: TriggerStart,
    /// 向下进入时的目标形状
    pub enter: String,
    /// 向上退出时的目标形状
    pub leave_back: String,
}

impl ScrollRegion {
    pub fn new(
        name: impl Into<String>,
        trigger: impl Into<String>,
        start: TriggerStart,
        enter: impl Into<String>,
        leave_back: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            trigger: trigger.into(),
            start,
            enter: enter.into(),
            leave_back: leave_back.into(),
        }
    }
}

/// 过渡方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// 向下进入
    Enter,
    /// 向上退出
    LeaveBack,
}

/// 一次区域过渡
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTransition {
    pub region: usize,
    pub name: String,
    pub direction: Direction,
    pub target: String,
}

/// 有序区域链
#[derive(Resource, Debug, Clone)]
pub struct ScrollTimeline {
    initial_shape: String,
    regions: Vec<ScrollRegion>,
    /// 解析后的起点滚动位置；未解析时为 `None`
    starts: Option<Vec<f32>>,
    /// 文档高度减视口高度；布局未提供文档高度时为 `None`
    max_scroll: Option<f32>,
    entered: Vec<bool>,
    last_scroll: Option<f32>,
}

impl ScrollTimeline {
    /// 创建区域链并校验形状首尾相接
    pub fn new(initial_shape: impl Into<String>, regions: Vec<ScrollRegion>) -> ScrollResult<Self> {
        let initial_shape = initial_shape.into();

        let mut previous = initial_shape.as_str();
        for region in &regions {
            if region.leave_back != previous {
                return Err(ScrollError::BrokenChain {
                    region: region.name.clone(),
                    leave_target: region.leave_back.clone(),
                    expected: previous.to_string(),
                });
            }
            previous = region.enter.as_str();
        }

        let entered = vec![false; regions.len()];
        Ok(Self {
            initial_shape,
            regions,
            starts: None,
            max_scroll: None,
            entered,
            last_scroll: None,
        })
    }

    /// 根据布局计算所有起点
    ///
    /// 失败时保留之前的起点；起点必须随区域顺序单调不减。
    pub fn resolve(&mut self, layout: &dyn LayoutSource, viewport_height: f32) -> ScrollResult<()> {
        let starts = self
            .regions
            .iter()
            .map(|region| resolve_start(layout, &region.trigger, region.start, viewport_height))
            .collect::<ScrollResult<Vec<f32>>>()?;
        let max_scroll = layout
            .scroll_height()
            .map(|height| (height - viewport_height).max(0.0));
        self.set_starts(starts)?;
        self.max_scroll = max_scroll;
        Ok(())
    }

    /// 直接设置起点（已按区域顺序排列）
    ///
    /// 下一次 [`update`](Self::update) 会按新起点重新检查所有区域，即使滚动位置未变。
    pub fn set_starts(&mut self, starts: Vec<f32>) -> ScrollResult<()> {
        if starts.len() != self.regions.len() {
            return Err(ScrollError::InvalidOffset(format!(
                "expected {} start positions, got {}",
                self.regions.len(),
                starts.len()
            )));
        }
        for (i, pair) in starts.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(ScrollError::UnorderedRegions {
                    earlier: self.regions[i].name.clone(),
                    later: self.regions[i + 1].name.clone(),
                });
            }
        }
        tracing::debug!(target: "scroll", ?starts, "Scroll trigger positions resolved");
        self.starts = Some(starts);
        self.max_scroll = None;
        self.last_scroll = None;
        Ok(())
    }

    /// 处理新的滚动位置，返回按触发顺序排列的过渡
    ///
    /// 滚动位置严格大于起点时视为已进入；起点位于最大滚动位置或之后时，
    /// 滚动到最大位置即视为已进入。一次跨越多个起点时，
    /// 退出按区域倒序、进入按区域正序依次给出。未解析起点时不触发任何过渡。
    pub fn update(&mut self, scroll_y: f32) -> Vec<RegionTransition> {
        let Some(starts) = &self.starts else {
            return Vec::new();
        };
        if !scroll_y.is_finite() || self.last_scroll == Some(scroll_y) {
            return Vec::new();
        }
        self.last_scroll = Some(scroll_y);

        let max_scroll = self.max_scroll;
        let past = |start: f32| {
            scroll_y > start
                || max_scroll.is_some_and(|max| max > 0.0 && start >= max && scroll_y >= max)
        };
        let mut transitions = Vec::new();

        for i in (0..self.regions.len()).rev() {
            if self.entered[i] && !past(starts[i]) {
                self.entered[i] = false;
                transitions.push(self.transition(i, Direction::LeaveBack));
            }
        }
        for i in 0..self.regions.len() {
            if !self.entered[i] && past(starts[i]) {
                self.entered[i] = true;
                transitions.push(self.transition(i, Direction::Enter));
            }
        }

        for t in &transitions {
            tracing::info!(
                target: "scroll",
                region = %t.name,
                direction = ?t.direction,
                target_shape = %t.target,
                scroll_y,
                "Scroll region toggled"
            );
        }
        transitions
    }

    fn transition(&self, region: usize, direction: Direction) -> RegionTransition {
        let r = &self.regions[region];
        let target = match direction {
            Direction::Enter => r.enter.clone(),
            Direction::LeaveBack => r.leave_back.clone(),
        };
        RegionTransition {
            region,
            name: r.name.clone(),
            direction,
            target,
        }
    }

    /// 当前滚动位置对应的形状
    pub fn current_shape(&self) -> &str {
        self.entered
            .iter()
            .rposition(|&entered| entered)
            .map(|i| self.regions[i].enter.as_str())
            .unwrap_or(self.initial_shape.as_str())
    }

    pub fn initial_shape(&self) -> &str {
        &self.initial_shape
    }

    pub fn regions(&self) -> &[ScrollRegion] {
        &self.regions
    }

    pub fn starts(&self) -> Option<&[f32]> {
        self.starts.as_deref()
    }

    pub fn is_entered(&self, region: usize) -> bool {
        self.entered.get(region).copied().unwrap_or(false)
    }

    pub fn max_scroll(&self) -> Option<f32> {
        self.max_scroll
    }

    pub fn is_resolved(&self) -> bool {
        self.starts.is_some()
    }
}
