//! 核心ECS系统
//!
//! 每帧按顺序运行：先根据滚动位置触发区域过渡，再推进补间写回缓冲。

use bevy_ecs::prelude::*;

use crate::particles::{MorphController, ParticleBuffer, ShapeRegistry};
use crate::scroll::ScrollTimeline;

use super::resources::{ScrollInput, Time, TransitionLog};

/// 滚动触发系统 - 将滚动位置的变化转换为变形请求
pub fn scroll_trigger_system(
    input: Res<ScrollInput>,
    registry: Res<ShapeRegistry>,
    buffer: Res<ParticleBuffer>,
    mut timeline: ResMut<ScrollTimeline>,
    mut controller: ResMut<MorphController>,
    mut log: ResMut<TransitionLog>,
) {
    for transition in timeline.update(input.scroll_y) {
        if let Err(e) = controller.morph_to(&registry, &buffer, &transition.target) {
            tracing::warn!(
                target: "scroll",
                region = %transition.name,
                "Transition ignored: {}",
                e
            );
        }
        log.push(transition);
    }
}

/// 变形更新系统 - 推进所有补间
pub fn morph_update_system(
    time: Res<Time>,
    mut controller: ResMut<MorphController>,
    mut buffer: ResMut<ParticleBuffer>,
) {
    let report = controller.tick(time.delta_seconds, &mut buffer);
    if report.stepped > 0 {
        tracing::trace!(
            target: "morph",
            frame = time.frame,
            stepped = report.stepped,
            completed = report.completed,
            dropped = report.dropped,
            "Morph tick"
        );
    }
}
