//! 变形场景
//!
//! 将注册表、滚动区域链、变形控制器与粒子缓冲装配进一个 `World`，
//! 外壳每帧调用 [`MorphScene::frame`] 写入滚动位置与帧时长，
//! 然后读取 [`MorphScene::buffer`] 上传到 GPU。
//!
//! ```no_run
//! # use particle_morph::scene::MorphScene;
//! # fn upload(_: &[u8]) {}
//! # fn demo(scene: &mut MorphScene) {
//! scene.frame(1300.0, 1.0 / 60.0);
//! if scene.take_dirty() {
//!     upload(scene.buffer().as_bytes());
//! }
//! # }
//! ```

use bevy_ecs::prelude::*;
use glam::Mat4;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::MorphConfig;
use crate::core::error::{EngineResult, MorphResult};
use crate::core::resources::{ScrollInput, Time, TransitionLog};
use crate::core::systems::{morph_update_system, scroll_trigger_system};
use crate::core::viewport::{CameraFit, Viewport};
use crate::particles::{MorphController, ParticleBuffer, ShapeRegistry};
use crate::resources::{load_shape_registry, MeshLoader, RegistryRequest};
use crate::scroll::{LayoutSource, RegionTransition, ScrollTimeline};

/// 过渡记录保留条数
const TRANSITION_LOG_CAPACITY: usize = 64;

/// 透视相机的垂直视场角（度）
pub const CAMERA_FOV_DEGREES: f32 = 45.0;

/// 运行中的变形场景
pub struct MorphScene {
    world: World,
    schedule: Schedule,
    root_transform: Mat4,
}

impl MorphScene {
    /// 由就绪的注册表装配场景
    ///
    /// 缓冲初始化为区域链初始形状的点集。
    pub fn new(
        registry: ShapeRegistry,
        timeline: ScrollTimeline,
        controller: MorphController,
        viewport: Viewport,
    ) -> MorphResult<Self> {
        let buffer = ParticleBuffer::from_point_set(registry.get(timeline.initial_shape())?);

        for region in timeline.regions() {
            for shape in [&region.enter, &region.leave_back] {
                if !registry.contains(shape) {
                    tracing::warn!(
                        target: "scroll",
                        region = %region.name,
                        shape = %shape,
                        "Region targets an unregistered shape"
                    );
                }
            }
        }

        let mut world = World::new();
        world.insert_resource(registry);
        world.insert_resource(timeline);
        world.insert_resource(controller);
        world.insert_resource(buffer);
        world.insert_resource(viewport);
        world.insert_resource(ScrollInput::default());
        world.insert_resource(Time::default());
        world.insert_resource(TransitionLog::with_capacity(TRANSITION_LOG_CAPACITY));

        let mut schedule = Schedule::default();
        schedule.add_systems((scroll_trigger_system, morph_update_system).chain());

        Ok(Self {
            world,
            schedule,
            root_transform: Mat4::IDENTITY,
        })
    }

    /// 按配置装配场景，并用配置中的布局解析触发位置
    pub fn from_config(config: &MorphConfig, registry: ShapeRegistry) -> EngineResult<Self> {
        let mut timeline = config.scroll.timeline()?;
        timeline.resolve(&config.scroll.static_layout(), config.viewport.height)?;

        let controller = MorphController::new(
            registry.particle_count(),
            config.morph,
            config.particles.seed.map(|seed| seed.wrapping_add(1)),
        )
        .with_noise(config.particles.noise());

        let mut scene = Self::new(registry, timeline, controller, config.viewport)?;
        scene.root_transform = config.particles.root_transform();
        Ok(scene)
    }

    /// 加载全部网格后装配场景
    pub async fn load<L>(loader: &L, config: &MorphConfig) -> EngineResult<Self>
    where
        L: MeshLoader + ?Sized,
    {
        let request = RegistryRequest {
            particle_count: config.particles.count,
            models: config.assets.models.clone(),
            scale: config.assets.scale,
            viewport_width: config.viewport.width,
            random_cloud: config.random_cloud,
        };
        let mut rng = match config.particles.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let registry = load_shape_registry(loader, &request, &mut rng).await?;
        Self::from_config(config, registry)
    }

    /// 推进一帧：先处理滚动位置，再推进补间
    pub fn frame(&mut self, scroll_y: f32, delta_seconds: f32) {
        self.world.resource_mut::<ScrollInput>().scroll_y = scroll_y;
        self.world.resource_mut::<Time>().advance(delta_seconds);
        self.schedule.run(&mut self.world);
    }

    /// 视口变化后重新计算触发位置
    ///
    /// 布局解析失败时保留原触发位置。随机点云不重新生成。
    pub fn resize(&mut self, viewport: Viewport, layout: &dyn LayoutSource) {
        *self.world.resource_mut::<Viewport>() = viewport;
        if let Err(e) = self
            .world
            .resource_mut::<ScrollTimeline>()
            .resolve(layout, viewport.height)
        {
            tracing::warn!(target: "scroll", "Keeping previous trigger positions: {}", e);
        }
    }

    /// 直接发起变形
    pub fn morph_to(&mut self, target: &str) -> MorphResult<usize> {
        self.world
            .resource_scope(|world, mut controller: Mut<MorphController>| {
                controller.morph_to(
                    world.resource::<ShapeRegistry>(),
                    world.resource::<ParticleBuffer>(),
                    target,
                )
            })
    }

    pub fn buffer(&self) -> &ParticleBuffer {
        self.world.resource::<ParticleBuffer>()
    }

    /// 读取并清除缓冲的脏标记
    pub fn take_dirty(&mut self) -> bool {
        self.world.resource_mut::<ParticleBuffer>().take_dirty()
    }

    pub fn timeline(&self) -> &ScrollTimeline {
        self.world.resource::<ScrollTimeline>()
    }

    pub fn controller(&self) -> &MorphController {
        self.world.resource::<MorphController>()
    }

    pub fn registry(&self) -> &ShapeRegistry {
        self.world.resource::<ShapeRegistry>()
    }

    pub fn viewport(&self) -> Viewport {
        *self.world.resource::<Viewport>()
    }

    pub fn camera(&self) -> CameraFit {
        self.viewport().camera_fit(CAMERA_FOV_DEGREES)
    }

    /// 模型根节点变换，由渲染外壳作用于粒子点云
    pub fn root_transform(&self) -> Mat4 {
        self.root_transform
    }

    pub fn time(&self) -> Time {
        *self.world.resource::<Time>()
    }

    /// 最近的区域过渡（旧的在前）
    pub fn transitions(&self) -> impl Iterator<Item = &RegionTransition> {
        self.world.resource::<TransitionLog>().entries.iter()
    }

    /// 累计区域过渡数
    pub fn transition_count(&self) -> u64 {
        self.world.resource::<TransitionLog>().total
    }

    /// 所有补间均已完成
    pub fn is_settled(&self) -> bool {
        self.controller().is_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::MorphError;
    use crate::geometry::{PointSet, TriangleMesh};
    use crate::particles::{ShapeInput, ShapeRegistryBuilder};
    use crate::scroll::{Direction, StaticLayout};
    use glam::Vec3;

    fn registry(count: usize) -> ShapeRegistry {
        let mut rng = StdRng::seed_from_u64(11);
        let names = ["model0", "model1", "model2", "model3", "random"];
        let mut builder = ShapeRegistryBuilder::new(count, names).unwrap();
        for (i, name) in names[..4].iter().enumerate() {
            let offset = Vec3::X * (i as f32 * 10.0);
            let mesh = TriangleMesh::non_indexed(vec![offset, offset + Vec3::X, offset + Vec3::Y]);
            builder.register(*name, ShapeInput::Mesh(mesh), &mut rng).unwrap();
        }
        builder
            .register(
                "random",
                ShapeInput::Points(PointSet::from_points(vec![Vec3::splat(-5.0); count])),
                &mut rng,
            )
            .unwrap();
        builder.build().unwrap()
    }

    fn scene() -> MorphScene {
        let mut config = MorphConfig::default();
        config.particles.count = 16;
        config.particles.seed = Some(9);
        MorphScene::from_config(&config, registry(16)).unwrap()
    }

    #[test]
    fn test_initial_buffer_is_random_cloud() {
        let scene = scene();
        assert!(scene.buffer().positions().iter().all(|p| *p == Vec3::splat(-5.0)));
        assert_eq!(scene.timeline().starts().unwrap(), &[0.0, 1200.0, 2400.0, 3600.0]);
    }

    #[test]
    fn test_scroll_drives_buffer() {
        let mut scene = scene();
        for _ in 0..120 {
            scene.frame(1300.0, 1.0 / 60.0);
        }
        assert_eq!(scene.transitions().count(), 2);
        assert_eq!(
            scene.buffer().positions(),
            scene.registry().get("model2").unwrap().points()
        );
        assert!(scene.is_settled());
        assert!(scene.take_dirty());
        assert!(!scene.take_dirty());
    }

    #[test]
    fn test_resize_recomputes_starts() {
        let mut scene = scene();
        let layout = StaticLayout::new()
            .with("#section02", 1000.0, 1000.0)
            .with("#section03", 2000.0, 1000.0)
            .with("#section04", 3000.0, 1000.0);
        scene.resize(Viewport::new(800.0, 600.0), &layout);
        assert_eq!(scene.timeline().starts().unwrap(), &[400.0, 1400.0, 2400.0, 3400.0]);

        // 缺少元素时保留原触发位置
        scene.resize(Viewport::new(800.0, 500.0), &StaticLayout::new());
        assert_eq!(scene.timeline().starts().unwrap(), &[400.0, 1400.0, 2400.0, 3400.0]);
        assert_eq!(scene.viewport().height, 500.0);
    }

    #[test]
    fn test_resize_rechecks_regions_at_current_scroll() {
        let mut scene = scene();
        scene.frame(1300.0, 1.0 / 60.0);
        assert_eq!(scene.timeline().current_shape(), "model2");

        let layout = StaticLayout::new()
            .with("#section01", 0.0, 800.0)
            .with("#section02", 800.0, 1200.0)
            .with("#section03", 2300.0, 1200.0)
            .with("#section04", 3500.0, 1200.0);
        scene.resize(Viewport::new(1280.0, 800.0), &layout);
        assert_eq!(scene.timeline().starts().unwrap(), &[0.0, 1500.0, 2700.0, 3900.0]);

        for _ in 0..120 {
            scene.frame(1300.0, 1.0 / 60.0);
        }
        let last = scene.transitions().last().unwrap();
        assert_eq!(last.direction, Direction::LeaveBack);
        assert_eq!(last.target, "model3");
        assert_eq!(scene.transition_count(), 3);
        assert_eq!(
            scene.buffer().positions(),
            scene.registry().get("model3").unwrap().points()
        );
    }

    #[test]
    fn test_root_transform_rotates_about_x() {
        let scene = scene();
        let up = scene.root_transform().transform_vector3(Vec3::Y);
        assert!(up.abs_diff_eq(Vec3::Z, 1e-6));

        let config = MorphConfig::default();
        let bare = MorphScene::new(
            registry(16),
            config.scroll.timeline().unwrap(),
            MorphController::new(16, config.morph, Some(1)),
            config.viewport,
        )
        .unwrap();
        assert_eq!(bare.root_transform(), Mat4::IDENTITY);
    }

    #[test]
    fn test_unknown_shape_is_ignored() {
        let mut scene = scene();
        let before = scene.buffer().snapshot();
        assert_eq!(
            scene.morph_to("model9"),
            Err(MorphError::UnknownShape("model9".to_string()))
        );
        scene.frame(0.0, 0.5);
        assert_eq!(scene.buffer().snapshot(), before);
    }

    #[test]
    fn test_transition_directions() {
        let mut scene = scene();
        scene.frame(100.0, 0.0);
        scene.frame(0.0, 0.0);
        let directions: Vec<Direction> = scene.transitions().map(|t| t.direction).collect();
        assert_eq!(directions, vec![Direction::Enter, Direction::LeaveBack]);
    }
}
