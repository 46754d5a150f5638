//! 引擎主入口
//!
//! 无界面运行：加载配置与模型，按固定帧率把页面从顶部滚到最大滚动位置再滚回顶部，
//! 记录每次区域过渡与缓冲上传。

use crate::config::{HeadlessConfig, LoggingConfig, MorphConfig};
use crate::scene::MorphScene;

use super::error::EngineResult;

/// 变形引擎主结构
///
/// # 示例
///
/// ```no_run
/// use particle_morph::core::Engine;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     Engine::run()?;
///     Ok(())
/// }
/// ```
pub struct Engine;

/// 一次扫描的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// 运行的帧数
    pub frames: u64,
    /// 触发的区域过渡数
    pub transitions: usize,
    /// 缓冲变脏（需要上传）的帧数
    pub uploads: u64,
}

impl Engine {
    /// 运行引擎
    pub fn run() -> EngineResult<()> {
        let mut config = MorphConfig::load_or_default();
        config.apply_env_overrides();
        Self::initialize_logging(&config.logging);
        config.validate()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let mut scene = runtime.block_on(Self::load_scene(&config))?;
        tracing::info!(
            target: "engine",
            particles = scene.buffer().len(),
            shapes = ?scene.registry().names(),
            "Scene ready"
        );

        let scroll_end = config.scroll.max_scroll(config.viewport.height);
        let report = Self::sweep(&mut scene, &config.headless, scroll_end);

        let stats = scene.controller().stats();
        tracing::info!(
            target: "engine",
            frames = report.frames,
            transitions = report.transitions,
            uploads = report.uploads,
            morphs = stats.transitions,
            completed = stats.completed,
            superseded = stats.superseded,
            "Engine shutting down"
        );
        Ok(())
    }

    /// 初始化日志系统
    ///
    /// 默认使用配置中的级别，`RUST_LOG` 存在时以其为准。
    pub fn initialize_logging(config: &LoggingConfig) {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.level.as_filter()));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(config.show_target)
            .try_init();
        tracing::info!(target: "engine", "Engine starting");
    }

    #[cfg(feature = "gltf")]
    async fn load_scene(config: &MorphConfig) -> EngineResult<MorphScene> {
        let loader = crate::resources::GltfMeshLoader::new(config.assets.base_dir.clone());
        MorphScene::load(&loader, config).await
    }

    #[cfg(not(feature = "gltf"))]
    async fn load_scene(_config: &MorphConfig) -> EngineResult<MorphScene> {
        Err(super::error::EngineError::Init(
            "built without the `gltf` feature, no mesh loader available".to_string(),
        ))
    }

    /// 向下扫描到 `scroll_end`，停留，再扫描回顶部并停留
    pub fn sweep(scene: &mut MorphScene, config: &HeadlessConfig, scroll_end: f32) -> SweepReport {
        let delta = config.frame_delta();
        let step = config.scroll_speed * delta;
        let settle_frames = (config.settle_seconds / delta).ceil() as u64;
        let mut report = SweepReport::default();

        let run_frame = |scene: &mut MorphScene, scroll_y: f32, report: &mut SweepReport| {
            let before = scene.transition_count();
            scene.frame(scroll_y, delta);
            report.frames += 1;
            report.transitions += (scene.transition_count() - before) as usize;
            if scene.take_dirty() {
                report.uploads += 1;
            }
        };

        let mut scroll_y = 0.0f32;
        while scroll_y < scroll_end {
            scroll_y = (scroll_y + step).min(scroll_end);
            run_frame(scene, scroll_y, &mut report);
        }
        for _ in 0..settle_frames {
            run_frame(scene, scroll_y, &mut report);
        }
        tracing::info!(target: "engine", shape = scene.timeline().current_shape(), "Reached bottom");

        while scroll_y > 0.0 {
            scroll_y = (scroll_y - step).max(0.0);
            run_frame(scene, scroll_y, &mut report);
        }
        for _ in 0..settle_frames {
            run_frame(scene, scroll_y, &mut report);
        }
        tracing::info!(target: "engine", shape = scene.timeline().current_shape(), "Back at top");

        report
    }
}
