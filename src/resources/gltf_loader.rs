//! glTF 网格加载
//!
//! 文件读取走 `tokio::fs`，解码在阻塞线程池中完成。取默认场景（没有则取第一个场景）
//! 的第一个根节点；该节点不带网格时按深度优先找第一个带网格的后代。
//! 网格中所有三角形图元合并为一个 `TriangleMesh`，不应用节点变换。

use futures::future::BoxFuture;
use glam::Vec3;
use gltf::mesh::Mode;
use std::path::{Path, PathBuf};

use super::MeshLoader;
use crate::core::error::{AssetError, AssetResult};
use crate::geometry::TriangleMesh;

/// 从磁盘加载 glTF/GLB
#[derive(Debug, Clone)]
pub struct GltfMeshLoader {
    base_dir: PathBuf,
}

impl GltfMeshLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    async fn load_file(&self, path: &str) -> AssetResult<TriangleMesh> {
        let full_path = self.base_dir.join(path);
        let bytes = tokio::fs::read(&full_path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound {
                path: path.to_string(),
            },
            _ => AssetError::LoadFailed {
                path: path.to_string(),
                reason: e.to_string(),
            },
        })?;

        let owned_path = path.to_string();
        tokio::task::spawn_blocking(move || parse_first_mesh(&bytes, &owned_path))
            .await
            .map_err(|e| AssetError::LoadFailed {
                path: path.to_string(),
                reason: e.to_string(),
            })?
    }
}

impl MeshLoader for GltfMeshLoader {
    fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, AssetResult<TriangleMesh>> {
        Box::pin(self.load_file(path))
    }
}

/// 解析 glTF/GLB 字节并提取第一个网格
pub fn parse_first_mesh(bytes: &[u8], path: &str) -> AssetResult<TriangleMesh> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).map_err(|e| AssetError::LoadFailed {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
    extract_first_mesh(&document, &buffers, path)
}

/// 从已导入的文档中提取第一个网格
pub fn extract_first_mesh(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    path: &str,
) -> AssetResult<TriangleMesh> {
    let mesh = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .and_then(|scene| scene.nodes().next())
        .and_then(|root| first_mesh_in(&root))
        .or_else(|| document.meshes().next())
        .ok_or_else(|| AssetError::NoMesh {
            path: path.to_string(),
        })?;

    let mut positions: Vec<Vec3> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for primitive in mesh.primitives() {
        if primitive.mode() != Mode::Triangles {
            tracing::debug!(
                target: "assets",
                path = %path,
                mode = ?primitive.mode(),
                "Skipping non-triangle primitive"
            );
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));
        let Some(primitive_positions) = reader.read_positions() else {
            continue;
        };

        let base = positions.len() as u32;
        positions.extend(primitive_positions.map(Vec3::from_array));
        let vertex_count = positions.len() as u32 - base;

        match reader.read_indices() {
            Some(read) => indices.extend(read.into_u32().map(|i| base + i)),
            None => indices.extend(base..base + vertex_count - vertex_count % 3),
        }
    }

    if indices.is_empty() {
        return Err(AssetError::NoMesh {
            path: path.to_string(),
        });
    }

    let mesh = TriangleMesh::new(positions, Some(indices));
    mesh.validate()
        .map_err(|e| AssetError::from_morph(path, e))?;
    Ok(mesh)
}

fn first_mesh_in<'a>(node: &gltf::Node<'a>) -> Option<gltf::Mesh<'a>> {
    if let Some(mesh) = node.mesh() {
        return Some(mesh);
    }
    node.children().find_map(|child| first_mesh_in(&child))
}
