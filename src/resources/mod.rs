//! 资源加载
//!
//! 网格通过 `MeshLoader` 异步加载，全部完成后才汇合成 `ShapeRegistry`。
//! 任意一个加载失败都会使整个就绪流程失败，不会产生部分可用的注册表。
//!
//! ```text
//! load(model0) ─┐
//! load(model1) ─┤ try_join_all → 缩放 → 表面采样 → ShapeRegistry
//! load(model2) ─┤                          ↑
//! load(model3) ─┘               random_cloud（程序生成）
//! ```

#[cfg(feature = "gltf")]
pub mod gltf_loader;

#[cfg(feature = "gltf")]
pub use gltf_loader::GltfMeshLoader;

use futures::future::{try_join_all, BoxFuture};
use rand::Rng;

use crate::core::error::{AssetError, AssetResult};
use crate::geometry::TriangleMesh;
use crate::particles::{
    model_shape_name, random_cloud, RandomCloudConfig, ShapeInput, ShapeRegistry,
    ShapeRegistryBuilder, RANDOM_SHAPE,
};

/// 网格加载器
///
/// 返回资源中第一个网格的三角形数据（未缩放）。
pub trait MeshLoader: Send + Sync {
    fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, AssetResult<TriangleMesh>>;
}

/// 构建注册表所需的参数
#[derive(Debug, Clone)]
pub struct RegistryRequest {
    /// 粒子数量 N
    pub particle_count: usize,
    /// 模型路径，第 i 个注册为 `model{i}`
    pub models: Vec<String>,
    /// 采样前的统一缩放
    pub scale: f32,
    /// 随机点云使用的视口宽度
    pub viewport_width: f32,
    pub random_cloud: RandomCloudConfig,
}

/// 并发加载所有网格
///
/// 结果顺序与 `paths` 一致；任一失败即返回该错误。
pub async fn load_meshes<L>(loader: &L, paths: &[String]) -> AssetResult<Vec<TriangleMesh>>
where
    L: MeshLoader + ?Sized,
{
    let loads = paths.iter().map(|path| async move {
        let mesh = loader.load(path).await.inspect_err(|e| {
            tracing::error!(target: "assets", path = %path, "Mesh load failed: {}", e);
        })?;
        tracing::debug!(
            target: "assets",
            path = %path,
            triangles = mesh.triangle_count(),
            "Mesh loaded"
        );
        Ok::<_, AssetError>(mesh)
    });
    try_join_all(loads).await
}

/// 由已加载的网格构建注册表
pub fn build_registry<R: Rng + ?Sized>(
    request: &RegistryRequest,
    meshes: Vec<TriangleMesh>,
    rng: &mut R,
) -> AssetResult<ShapeRegistry> {
    let mut expected: Vec<String> = (0..request.models.len()).map(model_shape_name).collect();
    expected.push(RANDOM_SHAPE.to_string());

    let mut builder = ShapeRegistryBuilder::new(request.particle_count, expected)
        .map_err(|e| AssetError::from_morph("<registry>", e))?;

    for (index, (path, mut mesh)) in request.models.iter().zip(meshes).enumerate() {
        mesh.scale_in_place(request.scale);
        builder
            .register(model_shape_name(index), ShapeInput::Mesh(mesh), rng)
            .map_err(|e| AssetError::from_morph(path.as_str(), e))?;
    }

    let cloud = random_cloud(
        request.particle_count,
        request.viewport_width,
        &request.random_cloud,
        rng,
    );
    builder
        .register(RANDOM_SHAPE, ShapeInput::Points(cloud), rng)
        .map_err(|e| AssetError::from_morph(RANDOM_SHAPE, e))?;

    let registry = builder
        .build()
        .map_err(|e| AssetError::from_morph("<registry>", e))?;
    tracing::info!(
        target: "assets",
        shapes = registry.len(),
        particles = registry.particle_count(),
        "Shape registry ready"
    );
    Ok(registry)
}

/// 加载全部网格并构建注册表
pub async fn load_shape_registry<L, R>(
    loader: &L,
    request: &RegistryRequest,
    rng: &mut R,
) -> AssetResult<ShapeRegistry>
where
    L: MeshLoader + ?Sized,
    R: Rng + ?Sized,
{
    let meshes = load_meshes(loader, &request.models).await?;
    build_registry(request, meshes, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    /// 内存中的网格表
    struct MemoryLoader {
        meshes: HashMap<String, TriangleMesh>,
    }

    impl MeshLoader for MemoryLoader {
        fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, AssetResult<TriangleMesh>> {
            Box::pin(async move {
                self.meshes
                    .get(path)
                    .cloned()
                    .ok_or_else(|| AssetError::NotFound {
                        path: path.to_string(),
                    })
            })
        }
    }

    fn unit_triangle() -> TriangleMesh {
        TriangleMesh::non_indexed(vec![Vec3::ZERO, Vec3::X, Vec3::Y])
    }

    fn request(models: &[&str]) -> RegistryRequest {
        RegistryRequest {
            particle_count: 32,
            models: models.iter().map(|m| m.to_string()).collect(),
            scale: 100.0,
            viewport_width: 1000.0,
            random_cloud: RandomCloudConfig::default(),
        }
    }

    fn loader() -> MemoryLoader {
        let mut meshes = HashMap::new();
        meshes.insert("a.glb".to_string(), unit_triangle());
        meshes.insert("b.glb".to_string(), unit_triangle());
        meshes.insert(
            "flat.glb".to_string(),
            TriangleMesh::non_indexed(vec![Vec3::ZERO, Vec3::X, Vec3::X * 3.0]),
        );
        MemoryLoader { meshes }
    }

    #[test]
    fn test_registry_ready_after_all_loads() {
        let mut rng = StdRng::seed_from_u64(5);
        let registry =
            block_on(load_shape_registry(&loader(), &request(&["a.glb", "b.glb"]), &mut rng))
                .unwrap();

        assert_eq!(registry.names(), vec!["model0", "model1", "random"]);
        for name in registry.names() {
            assert_eq!(registry.get(name).unwrap().len(), 32);
        }

        // 缩放在采样前生效
        let mesh = registry.source_mesh("model0").unwrap();
        assert_eq!(mesh.positions[1], Vec3::new(100.0, 0.0, 0.0));
        for p in registry.get("model0").unwrap().iter() {
            assert!(p.x >= -1e-3 && p.y >= -1e-3 && p.x + p.y <= 100.0 + 1e-2);
        }
    }

    #[test]
    fn test_single_failure_fails_the_join() {
        let mut rng = StdRng::seed_from_u64(5);
        let err = block_on(load_shape_registry(
            &loader(),
            &request(&["a.glb", "missing.glb"]),
            &mut rng,
        ))
        .unwrap_err();
        assert_eq!(
            err,
            AssetError::NotFound {
                path: "missing.glb".to_string()
            }
        );
    }

    #[test]
    fn test_degenerate_mesh_is_asset_failure() {
        let mut rng = StdRng::seed_from_u64(5);
        let err = block_on(load_shape_registry(
            &loader(),
            &request(&["a.glb", "flat.glb"]),
            &mut rng,
        ))
        .unwrap_err();
        assert_eq!(
            err,
            AssetError::DegenerateGeometry {
                path: "flat.glb".to_string()
            }
        );
    }
}
