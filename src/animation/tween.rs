//! 帧驱动的补间引擎
//!
//! `Interpolator` 不持有任何回调闭包：每个补间带一个键 `K`，
//! 每帧通过 [`TweenSink`] 把插值结果交给调用方写回。
//! 调用方在 `on_step` 中返回 `false` 即可丢弃该补间，
//! 这就是"被新补间取代"的唯一取消方式。

use glam::Vec3;

use super::easing::Easing;

/// 补间结果接收方
pub trait TweenSink<K> {
    /// 写回一步插值；返回 `false` 表示该补间已失效，应立即丢弃
    fn on_step(&mut self, key: &K, value: Vec3, progress: f32) -> bool;

    /// 补间到达终点
    fn on_done(&mut self, _key: &K) {}
}

/// 单个三维值补间
#[derive(Debug, Clone, PartialEq)]
pub struct Tween<K> {
    pub key: K,
    pub from: Vec3,
    pub to: Vec3,
    /// 持续时间（秒）
    pub duration: f32,
    /// 启动前的等待时间（秒）
    pub delay: f32,
    pub easing: Easing,
    elapsed: f32,
}

impl<K> Tween<K> {
    pub fn new(key: K, from: Vec3, to: Vec3, duration: f32, easing: Easing) -> Self {
        Self {
            key,
            from,
            to,
            duration: duration.max(0.0),
            delay: 0.0,
            easing,
            elapsed: 0.0,
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    /// 已经过的时间（含延迟）
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// 线性进度 `[0, 1]`；延迟阶段为 0
    pub fn progress(&self) -> f32 {
        if self.is_waiting() {
            0.0
        } else if self.duration <= 0.0 {
            1.0
        } else {
            ((self.elapsed - self.delay) / self.duration).clamp(0.0, 1.0)
        }
    }

    /// 当前插值；终点精确返回 `to`
    pub fn value(&self) -> Vec3 {
        let progress = self.progress();
        if progress >= 1.0 {
            self.to
        } else {
            self.from.lerp(self.to, self.easing.apply(progress))
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.elapsed < self.delay
    }

    pub fn is_finished(&self) -> bool {
        !self.is_waiting() && self.progress() >= 1.0
    }
}

/// 一次 `tick` 的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// 写回了插值的补间数
    pub stepped: usize,
    /// 本帧完成的补间数
    pub completed: usize,
    /// 被接收方拒绝（已被取代）的补间数
    pub dropped: usize,
}

/// 补间引擎
#[derive(Debug, Clone)]
pub struct Interpolator<K> {
    tweens: Vec<Tween<K>>,
}

impl<K> Default for Interpolator<K> {
    fn default() -> Self {
        Self { tweens: Vec::new() }
    }
}

impl<K> Interpolator<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tweens: Vec::with_capacity(capacity),
        }
    }

    /// 启动补间，不会阻塞；下一次 `tick` 开始推进
    pub fn start(&mut self, tween: Tween<K>) {
        self.tweens.push(tween);
    }

    /// 推进所有补间 `delta_time` 秒
    pub fn tick<S: TweenSink<K>>(&mut self, delta_time: f32, sink: &mut S) -> TickReport {
        let dt = if delta_time.is_finite() {
            delta_time.max(0.0)
        } else {
            0.0
        };
        let mut report = TickReport::default();

        self.tweens.retain_mut(|tween| {
            tween.elapsed += dt;
            if tween.is_waiting() {
                return true;
            }

            let progress = tween.progress();
            if !sink.on_step(&tween.key, tween.value(), progress) {
                report.dropped += 1;
                return false;
            }
            report.stepped += 1;

            if progress >= 1.0 {
                sink.on_done(&tween.key);
                report.completed += 1;
                false
            } else {
                true
            }
        });

        report
    }

    /// 正在运行（含等待中）的补间数量
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn tweens(&self) -> &[Tween<K>] {
        &self.tweens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Recorder {
        values: HashMap<u32, Vec3>,
        done: Vec<u32>,
        reject: Option<u32>,
    }

    impl TweenSink<u32> for Recorder {
        fn on_step(&mut self, key: &u32, value: Vec3, _progress: f32) -> bool {
            if self.reject == Some(*key) {
                return false;
            }
            self.values.insert(*key, value);
            true
        }

        fn on_done(&mut self, key: &u32) {
            self.done.push(*key);
        }
    }

    #[test]
    fn test_tween_reaches_exact_target() {
        let mut engine = Interpolator::new();
        let to = Vec3::new(0.3, -7.1, 1e-3);
        engine.start(Tween::new(1u32, Vec3::new(100.0, 5.0, -2.0), to, 1.0, Easing::ExpoOut));

        let mut sink = Recorder::default();
        for _ in 0..70 {
            engine.tick(1.0 / 60.0, &mut sink);
        }
        assert_eq!(sink.values[&1], to);
        assert_eq!(sink.done, vec![1]);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_delay_holds_writes() {
        let mut engine = Interpolator::new();
        engine.start(Tween::new(7u32, Vec3::ZERO, Vec3::ONE, 0.5, Easing::Linear).with_delay(0.25));

        let mut sink = Recorder::default();
        let report = engine.tick(0.2, &mut sink);
        assert_eq!(report.stepped, 0);
        assert!(sink.values.is_empty());

        engine.tick(0.3, &mut sink);
        let v = sink.values[&7];
        assert!((v.x - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_rejected_tween_is_dropped() {
        let mut engine = Interpolator::new();
        engine.start(Tween::new(1u32, Vec3::ZERO, Vec3::ONE, 1.0, Easing::Linear));
        engine.start(Tween::new(2u32, Vec3::ZERO, Vec3::ONE, 1.0, Easing::Linear));

        let mut sink = Recorder {
            reject: Some(1),
            ..Default::default()
        };
        let report = engine.tick(0.1, &mut sink);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.stepped, 1);
        assert_eq!(engine.len(), 1);
        assert!(!sink.values.contains_key(&1));
    }

    #[test]
    fn test_zero_duration_completes_on_first_tick() {
        let mut engine = Interpolator::new();
        engine.start(Tween::new(3u32, Vec3::ZERO, Vec3::X, 0.0, Easing::ExpoOut));
        let mut sink = Recorder::default();
        let report = engine.tick(0.0, &mut sink);
        assert_eq!(report.completed, 1);
        assert_eq!(sink.values[&3], Vec3::X);
    }
}
