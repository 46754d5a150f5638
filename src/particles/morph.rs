//! 变形控制器
//!
//! `morph_to` 为每个粒子启动一个独立补间：起点是调用时缓冲中的位置，
//! 终点是目标点集同一索引的坐标，持续时间 = 基础时长 + 独立随机抖动。
//!
//! 每个粒子维护一个代数计数器。启动新补间时计数器递增并记录在补间键中；
//! 推进时键中的代数与当前代数不一致的补间会被丢弃，从而实现"最后一次变形生效"：
//! 被取代的补间把粒子留在它最后插值到的位置，新补间从那里重新开始。

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::buffer::ParticleBuffer;
use super::registry::ShapeRegistry;
use crate::animation::{Easing, Interpolator, TickReport, Tween, TweenSink};
use crate::core::error::{MorphError, MorphResult};
use crate::impl_default;

/// 单次变形的时序策略
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphTiming {
    /// 基础时长（秒）
    pub base_duration: f32,
    /// 时长抖动上限（秒），每个粒子独立取 `[0, duration_jitter)`
    pub duration_jitter: f32,
    /// 延迟抖动上限（秒），每个粒子独立取 `[0, delay_jitter)`
    pub delay_jitter: f32,
    /// 缓动曲线
    pub easing: Easing,
}

impl_default!(MorphTiming {
    base_duration: 1.2,
    duration_jitter: 0.3,
    delay_jitter: 0.0,
    easing: Easing::ExpoOut,
});

impl MorphTiming {
    /// 最长可能的完成时间（含延迟）
    pub fn max_total(&self) -> f32 {
        self.base_duration + self.duration_jitter + self.delay_jitter
    }

    fn sample_duration<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.base_duration + jitter(self.duration_jitter, rng)
    }

    fn sample_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        jitter(self.delay_jitter, rng)
    }
}

fn jitter<R: Rng + ?Sized>(max: f32, rng: &mut R) -> f32 {
    if max > 0.0 {
        rng.gen_range(0.0..max)
    } else {
        0.0
    }
}

/// 变形请求
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    pub target: String,
    pub timing: MorphTiming,
}

impl TransitionRequest {
    pub fn new(target: impl Into<String>, timing: MorphTiming) -> Self {
        Self {
            target: target.into(),
            timing,
        }
    }
}

/// 过渡过程中的随机扰动
///
/// 偏移量随线性进度衰减，终点写入时为零，因此不影响收敛。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoisePerturbation {
    /// 每轴最大偏移
    pub amplitude: f32,
}

/// 补间键：粒子索引 + 启动时的代数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleKey {
    pub index: usize,
    pub generation: u64,
}

/// 累计统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MorphStats {
    /// 已发起的变形次数
    pub transitions: u64,
    /// 已完成的粒子补间数
    pub completed: u64,
    /// 被取代而丢弃的粒子补间数
    pub superseded: u64,
}

/// 变形控制器
#[derive(Resource, Debug)]
pub struct MorphController {
    timing: MorphTiming,
    noise: Option<NoisePerturbation>,
    interpolator: Interpolator<ParticleKey>,
    generations: Vec<u64>,
    rng: StdRng,
    stats: MorphStats,
    current_target: Option<String>,
}

impl MorphController {
    /// `seed` 为 `None` 时使用系统熵
    pub fn new(particle_count: usize, timing: MorphTiming, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            timing,
            noise: None,
            interpolator: Interpolator::with_capacity(particle_count),
            generations: vec![0; particle_count],
            rng,
            stats: MorphStats::default(),
            current_target: None,
        }
    }

    pub fn with_noise(mut self, noise: Option<NoisePerturbation>) -> Self {
        self.noise = noise.filter(|n| n.amplitude > 0.0 && n.amplitude.is_finite());
        self
    }

    pub fn timing(&self) -> &MorphTiming {
        &self.timing
    }

    /// 使用默认时序变形到目标形状
    pub fn morph_to(
        &mut self,
        registry: &ShapeRegistry,
        buffer: &ParticleBuffer,
        target: &str,
    ) -> MorphResult<usize> {
        let request = TransitionRequest::new(target, self.timing);
        self.request(registry, buffer, &request)
    }

    /// 发起变形请求，返回启动的补间数量
    ///
    /// 目标未注册时返回 `UnknownShape`，不修改任何状态。
    pub fn request(
        &mut self,
        registry: &ShapeRegistry,
        buffer: &ParticleBuffer,
        request: &TransitionRequest,
    ) -> MorphResult<usize> {
        let targets = match registry.get(&request.target) {
            Ok(points) => points,
            Err(err) => {
                tracing::warn!(target: "morph", shape = %request.target, "Unknown shape requested, ignoring");
                return Err(err);
            }
        };

        if targets.len() != buffer.len() || buffer.len() != self.generations.len() {
            return Err(MorphError::LengthMismatch {
                name: request.target.clone(),
                expected: self.generations.len(),
                actual: targets.len().min(buffer.len()),
            });
        }

        let timing = request.timing;
        for (index, (&from, &to)) in buffer.positions().iter().zip(targets.iter()).enumerate() {
            let generation = self.generations[index] + 1;
            self.generations[index] = generation;

            let duration = timing.sample_duration(&mut self.rng);
            let delay = timing.sample_delay(&mut self.rng);
            self.interpolator.start(
                Tween::new(ParticleKey { index, generation }, from, to, duration, timing.easing)
                    .with_delay(delay),
            );
        }

        self.stats.transitions += 1;
        self.current_target = Some(request.target.clone());
        tracing::info!(
            target: "morph",
            shape = %request.target,
            particles = buffer.len(),
            "Morph started"
        );
        Ok(buffer.len())
    }

    /// 推进一帧并写回缓冲
    pub fn tick(&mut self, delta_time: f32, buffer: &mut ParticleBuffer) -> TickReport {
        if self.interpolator.is_empty() {
            return TickReport::default();
        }

        let mut sink = BufferSink {
            buffer,
            generations: &self.generations,
            noise: self.noise.map(|n| (n.amplitude, &mut self.rng)),
        };
        let report = self.interpolator.tick(delta_time, &mut sink);

        self.stats.completed += report.completed as u64;
        self.stats.superseded += report.dropped as u64;
        if report.completed > 0 && self.interpolator.is_empty() {
            tracing::debug!(target: "morph", shape = ?self.current_target, "Morph settled");
        }
        report
    }

    /// 运行中（含等待中和尚未被丢弃的已取代）补间数量
    pub fn active_tweens(&self) -> usize {
        self.interpolator.len()
    }

    pub fn is_idle(&self) -> bool {
        self.interpolator.is_empty()
    }

    pub fn generation(&self, index: usize) -> Option<u64> {
        self.generations.get(index).copied()
    }

    pub fn stats(&self) -> MorphStats {
        self.stats
    }

    /// 最近一次请求的目标形状
    pub fn current_target(&self) -> Option<&str> {
        self.current_target.as_deref()
    }
}

struct BufferSink<'a> {
    buffer: &'a mut ParticleBuffer,
    generations: &'a [u64],
    noise: Option<(f32, &'a mut StdRng)>,
}

impl TweenSink<ParticleKey> for BufferSink<'_> {
    fn on_step(&mut self, key: &ParticleKey, value: Vec3, progress: f32) -> bool {
        if self.generations.get(key.index) != Some(&key.generation) {
            return false;
        }

        let value = match &mut self.noise {
            Some((amplitude, rng)) if progress < 1.0 => {
                let offset = Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                );
                value + offset * *amplitude * (1.0 - progress)
            }
            _ => value,
        };
        self.buffer.set(key.index, value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PointSet;
    use crate::particles::registry::{ShapeInput, ShapeRegistryBuilder};

    const FRAME: f32 = 1.0 / 60.0;

    fn registry(n: usize) -> ShapeRegistry {
        let mut rng = StdRng::seed_from_u64(1);
        let mut builder = ShapeRegistryBuilder::new(n, ["a", "b", "origin"]).unwrap();
        let a = (0..n).map(|i| Vec3::new(i as f32, 100.0, 0.0)).collect();
        let b = (0..n).map(|i| Vec3::new(-(i as f32), -50.0, 25.0)).collect();
        builder
            .register("a", ShapeInput::Points(PointSet::from_points(a)), &mut rng)
            .unwrap();
        builder
            .register("b", ShapeInput::Points(PointSet::from_points(b)), &mut rng)
            .unwrap();
        builder
            .register(
                "origin",
                ShapeInput::Points(PointSet::from_points(vec![Vec3::ZERO; n])),
                &mut rng,
            )
            .unwrap();
        builder.build().unwrap()
    }

    fn run(controller: &mut MorphController, buffer: &mut ParticleBuffer, seconds: f32) {
        let frames = (seconds / FRAME).ceil() as usize;
        for _ in 0..frames {
            controller.tick(FRAME, buffer);
        }
    }

    #[test]
    fn test_morph_converges_exactly() {
        let registry = registry(32);
        let mut buffer = ParticleBuffer::from_point_set(registry.get("origin").unwrap());
        let mut controller = MorphController::new(32, MorphTiming::default(), Some(4));

        assert_eq!(controller.morph_to(&registry, &buffer, "a").unwrap(), 32);
        run(&mut controller, &mut buffer, 1.6);

        assert!(controller.is_idle());
        assert_eq!(buffer.positions(), registry.get("a").unwrap().points());
        assert_eq!(controller.stats().completed, 32);
    }

    #[test]
    fn test_later_morph_wins() {
        let registry = registry(16);
        let mut buffer = ParticleBuffer::from_point_set(registry.get("origin").unwrap());
        let mut controller = MorphController::new(16, MorphTiming::default(), Some(8));

        controller.morph_to(&registry, &buffer, "a").unwrap();
        run(&mut controller, &mut buffer, 0.4);
        let interrupted = buffer.snapshot();

        controller.morph_to(&registry, &buffer, "b").unwrap();
        // 新补间从被打断的位置出发
        assert_eq!(buffer.snapshot(), interrupted);
        run(&mut controller, &mut buffer, 1.6);

        assert_eq!(buffer.positions(), registry.get("b").unwrap().points());
        assert_eq!(controller.stats().superseded, 16);
        assert_eq!(controller.stats().completed, 16);
    }

    #[test]
    fn test_unknown_shape_leaves_buffer_untouched() {
        let registry = registry(8);
        let mut buffer = ParticleBuffer::from_point_set(registry.get("a").unwrap());
        buffer.take_dirty();
        let before = buffer.as_flat().to_vec();
        let mut controller = MorphController::new(8, MorphTiming::default(), Some(0));

        let err = controller
            .morph_to(&registry, &buffer, "nonexistent")
            .unwrap_err();
        assert_eq!(err, MorphError::UnknownShape("nonexistent".to_string()));

        run(&mut controller, &mut buffer, 0.5);
        assert_eq!(buffer.as_flat(), before.as_slice());
        assert!(!buffer.is_dirty());
        assert_eq!(controller.generation(0), Some(0));
        assert_eq!(controller.stats().transitions, 0);
    }

    #[test]
    fn test_steps_mark_buffer_dirty() {
        let registry = registry(4);
        let mut buffer = ParticleBuffer::from_point_set(registry.get("origin").unwrap());
        buffer.take_dirty();
        let mut controller = MorphController::new(4, MorphTiming::default(), Some(0));
        controller.morph_to(&registry, &buffer, "a").unwrap();
        controller.tick(FRAME, &mut buffer);
        assert!(buffer.take_dirty());
    }

    #[test]
    fn test_noise_does_not_break_convergence() {
        let registry = registry(16);
        let mut buffer = ParticleBuffer::from_point_set(registry.get("origin").unwrap());
        let mut controller = MorphController::new(16, MorphTiming::default(), Some(2))
            .with_noise(Some(NoisePerturbation { amplitude: 5.0 }));
        controller.morph_to(&registry, &buffer, "b").unwrap();
        run(&mut controller, &mut buffer, 1.6);
        assert_eq!(buffer.positions(), registry.get("b").unwrap().points());
    }

    #[test]
    fn test_delay_jitter_postpones_motion() {
        let registry = registry(8);
        let mut buffer = ParticleBuffer::from_point_set(registry.get("origin").unwrap());
        let timing = MorphTiming {
            delay_jitter: 0.5,
            ..MorphTiming::default()
        };
        let mut controller = MorphController::new(8, timing, Some(6));
        controller.morph_to(&registry, &buffer, "a").unwrap();
        run(&mut controller, &mut buffer, timing.max_total() + 0.1);
        assert_eq!(buffer.positions(), registry.get("a").unwrap().points());
    }
}
