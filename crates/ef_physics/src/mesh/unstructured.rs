// crates/ef_physics/src/mesh/unstructured.rs

//! 非结构化多边形网格
//!
//! 从节点坐标和多边形单元（节点索引环）构建网格。
//! 边按排序后的节点对去重：出现两次为内部面，出现一次为边界面，
//! 边界标签由调用方提供的闭包根据面中心和外法向决定。

use glam::DVec2;
use std::collections::HashMap;

use super::fv_mesh::MeshBuilder;
use super::topology::{MeshGeometry, MeshKind};
use crate::error::PhysicsError;

/// 从多边形构建网格构建器
///
/// 顺时针给出的单元会被自动翻转为逆时针。
pub fn polygon_mesh<F>(nodes: &[DVec2], polygons: &[Vec<usize>], tag_boundary: F) -> Result<MeshBuilder, PhysicsError>
where
    F: Fn(DVec2, DVec2) -> u32,
{
    let mut builder = MeshBuilder::new(MeshKind::Unstructured);
    // 每个单元逆时针排列的节点环
    let mut rings: Vec<Vec<usize>> = Vec::with_capacity(polygons.len());

    for (ci, poly) in polygons.iter().enumerate() {
        if poly.len() < 3 {
            return Err(PhysicsError::invalid_mesh(format!("单元 {ci} 顶点数不足")));
        }
        if let Some(&bad) = poly.iter().find(|&&v| v >= nodes.len()) {
            return Err(PhysicsError::invalid_mesh(format!("单元 {ci} 引用不存在的节点 {bad}")));
        }
        let vertices: Vec<DVec2> = poly.iter().map(|&v| nodes[v]).collect();
        let (area, centroid) = MeshGeometry::polygon_area_centroid(&vertices);
        let mut ring = poly.clone();
        if area < 0.0 {
            ring.reverse();
        }
        builder.add_cell(centroid, area.abs());
        rings.push(ring);
    }

    // 边 → (首次出现的单元, 有向起点, 有向终点)
    let mut first_seen: HashMap<(usize, usize), (usize, usize, usize)> = HashMap::new();
    let mut shared: HashMap<(usize, usize), usize> = HashMap::new();
    let mut order: Vec<(usize, usize)> = Vec::new();

    for (ci, ring) in rings.iter().enumerate() {
        let n = ring.len();
        for k in 0..n {
            let (a, b) = (ring[k], ring[(k + 1) % n]);
            let key = (a.min(b), a.max(b));
            match first_seen.get(&key) {
                None => {
                    first_seen.insert(key, (ci, a, b));
                    order.push(key);
                }
                Some(&(other, _, _)) => {
                    if shared.insert(key, ci).is_some() || other == ci {
                        return Err(PhysicsError::invalid_mesh(format!(
                            "边 ({}, {}) 被两个以上单元共享",
                            key.0, key.1
                        )));
                    }
                }
            }
        }
    }

    for key in order {
        let (owner, a, b) = first_seen[&key];
        let (pa, pb) = (nodes[a], nodes[b]);
        let normal = MeshGeometry::unit_normal(pa, pb);
        let length = (pb - pa).length();
        let center = 0.5 * (pa + pb);
        match shared.get(&key) {
            Some(&other) => {
                builder.add_interior_face(owner, other, normal, length, center);
            }
            None => {
                let tag = tag_boundary(center, normal);
                builder.add_boundary_face(owner, tag, normal, length, center);
            }
        }
    }

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshTopology;

    /// 单位正方形剖分为两个三角形
    fn two_triangles() -> (Vec<DVec2>, Vec<Vec<usize>>) {
        let nodes = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ];
        // 第二个三角形顺时针给出
        let polys = vec![vec![0, 1, 2], vec![0, 3, 2]];
        (nodes, polys)
    }

    #[test]
    fn test_triangles() {
        let (nodes, polys) = two_triangles();
        let mesh = polygon_mesh(&nodes, &polys, |c, _| if c.y < 1e-12 { 1 } else { 2 })
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(mesh.n_cells(), 2);
        assert_eq!(mesh.n_faces(), 5);
        assert!((mesh.cell_area(0) - 0.5).abs() < 1e-14);
        assert!((mesh.cell_area(1) - 0.5).abs() < 1e-14);
        assert_eq!(mesh.boundary_tags(), vec![1, 2]);

        let interior: Vec<usize> = (0..mesh.n_faces()).filter(|&f| !mesh.is_boundary_face(f)).collect();
        assert_eq!(interior.len(), 1);
        let f = interior[0];
        // 法向从单元 0 指向单元 1
        let d = mesh.cell_center(1) - mesh.cell_center(0);
        assert!(mesh.face_normal(f).dot(d) > 0.0);
        assert!((mesh.face_length(f) - 2f64.sqrt()).abs() < 1e-14);
    }

    #[test]
    fn test_bad_node_index() {
        let nodes = vec![DVec2::ZERO, DVec2::X];
        let res = polygon_mesh(&nodes, &[vec![0, 1, 5]], |_, _| 1);
        assert!(res.is_err());
    }
}
