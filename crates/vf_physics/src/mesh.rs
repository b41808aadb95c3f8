// crates/vf_physics/src/mesh.rs

//! 粘性求解用网格图
//!
//! 顶点中心对偶网格：每个顶点是一个控制体，每条边对应一个对偶面。
//!
//! # 约定
//!
//! - 边法向量 `normal` 的模为对偶面面积，方向从 `i` 指向 `j`
//! - 边界顶点法向量的模为对偶边界面积，方向指向流体内部；
//!   壁面处理使用的单位外法向为 `-normal / |normal|`
//! - 二维网格的所有向量 z 分量为 0
//!
//! 拓扑不变量在 [`ViscousMeshBuilder::build`] 中一次性检查，
//! 热循环内部不再做越界校验。

use glam::DVec3;
use thiserror::Error;
use vf_foundation::{EdgeIndex, MarkerIndex, VertexIndex};

/// 网格错误
#[derive(Debug, Error)]
pub enum MeshError {
    /// 维数不支持
    #[error("不支持的维数: {0} (仅支持 2 或 3)")]
    InvalidDimension(usize),

    /// 边两端点相同
    #[error("边 {edge} 两端点相同: {vertex}")]
    DegenerateEdge {
        /// 边索引
        edge: usize,
        /// 顶点索引
        vertex: usize,
    },

    /// 顶点索引越界
    #[error("{context}: 顶点索引 {vertex} 越界 (顶点数 {n_vertices})")]
    VertexOutOfRange {
        /// 出错位置
        context: String,
        /// 顶点索引
        vertex: usize,
        /// 顶点数
        n_vertices: usize,
    },

    /// 同一标记上顶点重复
    #[error("标记 '{marker}' 上顶点 {vertex} 重复出现")]
    DuplicateBoundaryVertex {
        /// 标记名
        marker: String,
        /// 顶点索引
        vertex: usize,
    },

    /// 标记名重复
    #[error("标记名重复: {0}")]
    DuplicateMarker(String),
}

/// 网格顶点
#[derive(Debug, Clone, Copy)]
pub struct MeshVertex {
    /// 坐标
    pub coord: DVec3,
    /// 是否为本分区拥有（false 表示 halo 副本）
    pub is_domain: bool,
    /// 网格运动速度（静止网格为零）
    pub grid_velocity: DVec3,
}

/// 网格边（对偶面）
#[derive(Debug, Clone, Copy)]
pub struct MeshEdge {
    /// 起点
    pub i: usize,
    /// 终点
    pub j: usize,
    /// 面积加权法向量（i → j）
    pub normal: DVec3,
}

/// 边界标记上的顶点
#[derive(Debug, Clone, Copy)]
pub struct BoundaryVertex {
    /// 网格顶点索引
    pub vertex: usize,
    /// 面积加权法向量（指向流体内部）
    pub normal: DVec3,
    /// 最近的内部法向邻点
    pub normal_neighbor: usize,
}

impl BoundaryVertex {
    /// 对偶边界面积
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal.length()
    }

    /// 单位外法向（指出流体）
    #[inline]
    pub fn unit_outward_normal(&self) -> DVec3 {
        let area = self.area();
        if area > 0.0 {
            -self.normal / area
        } else {
            DVec3::ZERO
        }
    }
}

/// 边界标记
#[derive(Debug, Clone)]
pub struct BoundaryMarker {
    /// 标记名
    pub tag: String,
    /// 有序边界顶点
    pub vertices: Vec<BoundaryVertex>,
}

/// 粘性求解网格
#[derive(Debug, Clone)]
pub struct ViscousMesh {
    n_dim: usize,
    vertices: Vec<MeshVertex>,
    edges: Vec<MeshEdge>,
    markers: Vec<BoundaryMarker>,
    /// 顶点 → 关联边（升序）
    vertex_edges: Vec<Vec<usize>>,
    dynamic: bool,
}

impl ViscousMesh {
    /// 空间维数
    #[inline]
    pub fn n_dim(&self) -> usize {
        self.n_dim
    }

    /// 每个顶点的方程数
    #[inline]
    pub fn n_var(&self) -> usize {
        self.n_dim + 2
    }

    /// 顶点数（含 halo）
    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// 边数
    #[inline]
    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// 标记数
    #[inline]
    pub fn n_markers(&self) -> usize {
        self.markers.len()
    }

    /// 是否为运动网格
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// 全部顶点
    #[inline]
    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    /// 单个顶点
    #[inline]
    pub fn vertex(&self, v: VertexIndex) -> &MeshVertex {
        &self.vertices[v.get()]
    }

    /// 全部边
    #[inline]
    pub fn edges(&self) -> &[MeshEdge] {
        &self.edges
    }

    /// 单条边
    #[inline]
    pub fn edge(&self, e: EdgeIndex) -> &MeshEdge {
        &self.edges[e.get()]
    }

    /// 全部标记
    #[inline]
    pub fn markers(&self) -> &[BoundaryMarker] {
        &self.markers
    }

    /// 单个标记
    #[inline]
    pub fn marker(&self, m: MarkerIndex) -> &BoundaryMarker {
        &self.markers[m.get()]
    }

    /// 按名称查找标记
    pub fn find_marker(&self, tag: &str) -> Option<MarkerIndex> {
        self.markers
            .iter()
            .position(|m| m.tag == tag)
            .map(MarkerIndex::new)
    }

    /// 顶点的关联边（升序）
    #[inline]
    pub fn vertex_edges(&self, v: usize) -> &[usize] {
        &self.vertex_edges[v]
    }

    /// 两顶点间距离
    #[inline]
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        self.vertices[a].coord.distance(self.vertices[b].coord)
    }

    /// 设置网格运动速度（启用运动网格）
    pub fn set_grid_velocity(&mut self, v: VertexIndex, velocity: DVec3) {
        self.vertices[v.get()].grid_velocity = velocity;
        self.dynamic = true;
    }
}

/// 网格构建器
///
/// # 示例
///
/// ```
/// use glam::DVec3;
/// use vf_physics::mesh::ViscousMeshBuilder;
///
/// let mut b = ViscousMeshBuilder::new(2);
/// let a = b.add_vertex(DVec3::new(0.0, 0.0, 0.0));
/// let c = b.add_vertex(DVec3::new(0.0, 1.0, 0.0));
/// b.add_edge(a, c, DVec3::new(0.0, 1.0, 0.0));
/// let wall = b.add_marker("wall");
/// b.add_boundary_vertex(wall, a, DVec3::new(0.0, 0.5, 0.0), c);
/// let mesh = b.build().unwrap();
/// assert_eq!(mesh.n_var(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct ViscousMeshBuilder {
    n_dim: usize,
    vertices: Vec<MeshVertex>,
    edges: Vec<MeshEdge>,
    markers: Vec<BoundaryMarker>,
    dynamic: bool,
}

impl ViscousMeshBuilder {
    /// 创建构建器
    pub fn new(n_dim: usize) -> Self {
        Self {
            n_dim,
            vertices: Vec::new(),
            edges: Vec::new(),
            markers: Vec::new(),
            dynamic: false,
        }
    }

    /// 添加本分区顶点
    pub fn add_vertex(&mut self, coord: DVec3) -> usize {
        self.push_vertex(coord, true)
    }

    /// 添加 halo 顶点
    pub fn add_halo_vertex(&mut self, coord: DVec3) -> usize {
        self.push_vertex(coord, false)
    }

    fn push_vertex(&mut self, coord: DVec3, is_domain: bool) -> usize {
        self.vertices.push(MeshVertex {
            coord,
            is_domain,
            grid_velocity: DVec3::ZERO,
        });
        self.vertices.len() - 1
    }

    /// 设置顶点网格速度
    pub fn set_grid_velocity(&mut self, vertex: usize, velocity: DVec3) -> &mut Self {
        if let Some(v) = self.vertices.get_mut(vertex) {
            v.grid_velocity = velocity;
            self.dynamic = true;
        }
        self
    }

    /// 添加边
    pub fn add_edge(&mut self, i: usize, j: usize, normal: DVec3) -> usize {
        self.edges.push(MeshEdge { i, j, normal });
        self.edges.len() - 1
    }

    /// 添加边界标记
    pub fn add_marker(&mut self, tag: impl Into<String>) -> usize {
        self.markers.push(BoundaryMarker {
            tag: tag.into(),
            vertices: Vec::new(),
        });
        self.markers.len() - 1
    }

    /// 向标记添加边界顶点
    pub fn add_boundary_vertex(
        &mut self,
        marker: usize,
        vertex: usize,
        normal: DVec3,
        normal_neighbor: usize,
    ) -> &mut Self {
        if let Some(m) = self.markers.get_mut(marker) {
            m.vertices.push(BoundaryVertex {
                vertex,
                normal,
                normal_neighbor,
            });
        }
        self
    }

    /// 检查拓扑并构建网格
    pub fn build(self) -> Result<ViscousMesh, MeshError> {
        if self.n_dim != 2 && self.n_dim != 3 {
            return Err(MeshError::InvalidDimension(self.n_dim));
        }

        let n = self.vertices.len();
        let check = |vertex: usize, context: &dyn Fn() -> String| -> Result<(), MeshError> {
            if vertex >= n {
                return Err(MeshError::VertexOutOfRange {
                    context: context(),
                    vertex,
                    n_vertices: n,
                });
            }
            Ok(())
        };

        let mut vertex_edges = vec![Vec::new(); n];
        for (e, edge) in self.edges.iter().enumerate() {
            check(edge.i, &|| format!("边 {}", e))?;
            check(edge.j, &|| format!("边 {}", e))?;
            if edge.i == edge.j {
                return Err(MeshError::DegenerateEdge {
                    edge: e,
                    vertex: edge.i,
                });
            }
            vertex_edges[edge.i].push(e);
            vertex_edges[edge.j].push(e);
        }

        let mut tags = std::collections::HashSet::new();
        for marker in &self.markers {
            if !tags.insert(marker.tag.as_str()) {
                return Err(MeshError::DuplicateMarker(marker.tag.clone()));
            }
            let mut seen = std::collections::HashSet::new();
            for bv in &marker.vertices {
                let context = || format!("标记 '{}'", marker.tag);
                check(bv.vertex, &context)?;
                check(bv.normal_neighbor, &context)?;
                if !seen.insert(bv.vertex) {
                    return Err(MeshError::DuplicateBoundaryVertex {
                        marker: marker.tag.clone(),
                        vertex: bv.vertex,
                    });
                }
            }
        }

        Ok(ViscousMesh {
            n_dim: self.n_dim,
            vertices: self.vertices,
            edges: self.edges,
            markers: self.markers,
            vertex_edges,
            dynamic: self.dynamic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_vertex_builder() -> ViscousMeshBuilder {
        let mut b = ViscousMeshBuilder::new(2);
        b.add_vertex(DVec3::ZERO);
        b.add_vertex(DVec3::new(1.0, 0.0, 0.0));
        b
    }

    #[test]
    fn test_degenerate_edge_rejected() {
        let mut b = two_vertex_builder();
        b.add_edge(1, 1, DVec3::X);
        assert!(matches!(b.build(), Err(MeshError::DegenerateEdge { .. })));
    }

    #[test]
    fn test_edge_out_of_range() {
        let mut b = two_vertex_builder();
        b.add_edge(0, 5, DVec3::X);
        assert!(matches!(b.build(), Err(MeshError::VertexOutOfRange { vertex: 5, .. })));
    }

    #[test]
    fn test_duplicate_boundary_vertex() {
        let mut b = two_vertex_builder();
        let m = b.add_marker("wall");
        b.add_boundary_vertex(m, 0, DVec3::Y, 1);
        b.add_boundary_vertex(m, 0, DVec3::Y, 1);
        assert!(matches!(
            b.build(),
            Err(MeshError::DuplicateBoundaryVertex { vertex: 0, .. })
        ));
    }

    #[test]
    fn test_adjacency_and_unit_normal() {
        let mut b = two_vertex_builder();
        b.add_vertex(DVec3::new(2.0, 0.0, 0.0));
        b.add_edge(0, 1, DVec3::X);
        b.add_edge(1, 2, DVec3::X);
        let m = b.add_marker("wall");
        b.add_boundary_vertex(m, 1, DVec3::new(0.0, 2.0, 0.0), 0);
        let mesh = b.build().unwrap();

        assert_eq!(mesh.vertex_edges(1), &[0, 1]);
        assert_eq!(mesh.find_marker("wall"), Some(MarkerIndex::new(0)));
        let bv = mesh.marker(MarkerIndex::new(0)).vertices[0];
        assert!((bv.area() - 2.0).abs() < 1e-14);
        assert!((bv.unit_outward_normal() - DVec3::new(0.0, -1.0, 0.0)).length() < 1e-14);
        assert!(!mesh.is_dynamic());
    }

    #[test]
    fn test_invalid_dimension() {
        assert!(matches!(
            ViscousMeshBuilder::new(1).build(),
            Err(MeshError::InvalidDimension(1))
        ));
    }
}
