//! 核心资源类型
//!
//! 定义每帧调度使用的ECS资源

use bevy_ecs::prelude::*;
use std::collections::VecDeque;

use crate::scroll::RegionTransition;

/// 帧时间
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct Time {
    /// 本帧时长（秒）
    pub delta_seconds: f32,
    /// 累计时长（秒）
    pub elapsed_seconds: f64,
    /// 帧序号
    pub frame: u64,
}

impl Time {
    /// 推进一帧
    pub fn advance(&mut self, delta_seconds: f32) {
        let delta_seconds = if delta_seconds.is_finite() {
            delta_seconds.max(0.0)
        } else {
            0.0
        };
        self.delta_seconds = delta_seconds;
        self.elapsed_seconds += delta_seconds as f64;
        self.frame += 1;
    }
}

/// 外壳写入的当前滚动位置
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollInput {
    pub scroll_y: f32,
}

/// 最近触发的区域过渡
#[derive(Resource, Debug, Default)]
pub struct TransitionLog {
    /// 过渡队列
    pub entries: VecDeque<RegionTransition>,
    /// 最大容量
    pub capacity: usize,
    /// 累计过渡数（不受容量限制）
    pub total: u64,
}

impl TransitionLog {
    /// 创建具有指定容量的过渡记录
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    /// 添加过渡
    pub fn push(&mut self, transition: RegionTransition) {
        self.total += 1;
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(transition);
    }

    /// 清空记录
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::Direction;

    fn transition(name: &str) -> RegionTransition {
        RegionTransition {
            region: 0,
            name: name.to_string(),
            direction: Direction::Enter,
            target: "model3".to_string(),
        }
    }

    #[test]
    fn test_transition_log_capacity() {
        let mut log = TransitionLog::with_capacity(3);
        for name in ["a", "b", "c", "d"] {
            log.push(transition(name));
        }

        assert_eq!(log.entries.len(), 3);
        assert_eq!(log.entries[0].name, "b");
        assert_eq!(log.total, 4);
    }

    #[test]
    fn test_time_advance() {
        let mut time = Time::default();
        time.advance(0.5);
        time.advance(f32::NAN);
        assert_eq!(time.frame, 2);
        assert_eq!(time.delta_seconds, 0.0);
        assert!((time.elapsed_seconds - 0.5).abs() < 1e-9);
    }
}
