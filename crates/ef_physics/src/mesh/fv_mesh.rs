// crates/ef_physics/src/mesh/fv_mesh.rs

//! 有限体积网格存储
//!
//! 单元与面分别存放在两个 arena 中，面以整数索引引用相邻单元，
//! 单元以整数索引引用所属面，不存在循环所有权。
//!
//! [`MeshBuilder`] 被笛卡尔网格和多边形网格共用：先逐个添加单元和面，
//! 再按需配对周期边界，最后 `build` 生成单元-面映射并校验几何闭合。

use glam::DVec2;
use std::collections::BTreeSet;

use super::topology::{MeshKind, MeshTopology};
use crate::error::PhysicsError;

/// 单元几何
#[derive(Debug, Clone)]
pub struct Cell {
    /// 形心
    pub center: DVec2,
    /// 面积
    pub area: f64,
    /// 所属面（按添加顺序）
    pub faces: Vec<usize>,
}

/// 面几何与连接
#[derive(Debug, Clone)]
pub struct Face {
    /// owner 单元
    pub owner: usize,
    /// neighbor 单元，边界面为 None
    pub neighbor: Option<usize>,
    /// 单位法向（owner → neighbor 或指向域外）
    pub normal: DVec2,
    /// 面长度
    pub length: f64,
    /// 面中心（owner 坐标系）
    pub center: DVec2,
    /// 边界标签
    pub boundary: Option<u32>,
    /// 周期平移：neighbor 中心 + shift = owner 坐标系中的位置
    pub periodic_shift: DVec2,
}

/// 二维有限体积网格
#[derive(Debug, Clone)]
pub struct FvMesh {
    kind: MeshKind,
    cells: Vec<Cell>,
    faces: Vec<Face>,
    tags: Vec<u32>,
}

impl FvMesh {
    /// 全部单元
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// 全部面
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// 指定标签的边界面
    pub fn boundary_faces(&self, tag: u32) -> impl Iterator<Item = usize> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(move |(_, f)| f.boundary == Some(tag))
            .map(|(i, _)| i)
    }

    /// 全域面积
    pub fn total_area(&self) -> f64 {
        self.cells.iter().map(|c| c.area).sum()
    }

    /// 参考网格尺度 sqrt(总面积 / 单元数)
    pub fn reference_length(&self) -> f64 {
        (self.total_area() / self.cells.len().max(1) as f64).sqrt()
    }
}

impl MeshTopology for FvMesh {
    fn n_cells(&self) -> usize {
        self.cells.len()
    }

    fn n_faces(&self) -> usize {
        self.faces.len()
    }

    fn mesh_kind(&self) -> MeshKind {
        self.kind
    }

    #[inline]
    fn cell_center(&self, cell: usize) -> DVec2 {
        self.cells[cell].center
    }

    #[inline]
    fn cell_area(&self, cell: usize) -> f64 {
        self.cells[cell].area
    }

    #[inline]
    fn face_normal(&self, face: usize) -> DVec2 {
        self.faces[face].normal
    }

    #[inline]
    fn face_length(&self, face: usize) -> f64 {
        self.faces[face].length
    }

    #[inline]
    fn face_center(&self, face: usize) -> DVec2 {
        self.faces[face].center
    }

    #[inline]
    fn face_owner(&self, face: usize) -> usize {
        self.faces[face].owner
    }

    #[inline]
    fn face_neighbor(&self, face: usize) -> Option<usize> {
        self.faces[face].neighbor
    }

    #[inline]
    fn cell_faces(&self, cell: usize) -> &[usize] {
        &self.cells[cell].faces
    }

    #[inline]
    fn face_boundary(&self, face: usize) -> Option<u32> {
        self.faces[face].boundary
    }

    #[inline]
    fn periodic_shift(&self, face: usize) -> DVec2 {
        self.faces[face].periodic_shift
    }

    fn boundary_tags(&self) -> Vec<u32> {
        self.tags.clone()
    }
}

/// 网格构建器
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    kind: MeshKind,
    cells: Vec<Cell>,
    faces: Vec<Face>,
}

impl MeshBuilder {
    /// 创建空构建器
    pub fn new(kind: MeshKind) -> Self {
        Self {
            kind,
            cells: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// 添加单元，返回单元编号
    pub fn add_cell(&mut self, center: DVec2, area: f64) -> usize {
        self.cells.push(Cell {
            center,
            area,
            faces: Vec::new(),
        });
        self.cells.len() - 1
    }

    /// 添加内部面，`normal` 从 `a` 指向 `b`
    ///
    /// 自动交换使 owner 为较小编号。
    pub fn add_interior_face(&mut self, a: usize, b: usize, normal: DVec2, length: f64, center: DVec2) -> usize {
        let (owner, neighbor, normal) = if a < b { (a, b, normal) } else { (b, a, -normal) };
        self.faces.push(Face {
            owner,
            neighbor: Some(neighbor),
            normal,
            length,
            center,
            boundary: None,
            periodic_shift: DVec2::ZERO,
        });
        self.faces.len() - 1
    }

    /// 添加边界面，`normal` 指向域外
    pub fn add_boundary_face(&mut self, owner: usize, tag: u32, normal: DVec2, length: f64, center: DVec2) -> usize {
        self.faces.push(Face {
            owner,
            neighbor: None,
            normal,
            length,
            center,
            boundary: Some(tag),
            periodic_shift: DVec2::ZERO,
        });
        self.faces.len() - 1
    }

    /// 配对周期边界
    ///
    /// 标签为 `tag` 的边界面中，中心满足 `c_b = c_a + shift` 的面两两合并为
    /// 一个内部面。存在无法配对的面时报错。
    pub fn pair_periodic(mut self, tag: u32, shift: DVec2) -> Result<Self, PhysicsError> {
        let candidates: Vec<usize> = self
            .faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.boundary == Some(tag))
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            return Err(PhysicsError::invalid_mesh(format!("周期边界 {tag} 没有边界面")));
        }

        let mut partner: Vec<Option<usize>> = vec![None; self.faces.len()];
        for &a in &candidates {
            if partner[a].is_some() {
                continue;
            }
            let fa = &self.faces[a];
            let target = fa.center + shift;
            let tol = 1e-8 * fa.length.max(1.0);
            let found = candidates.iter().copied().find(|&b| {
                b != a && partner[b].is_none() && (self.faces[b].center - target).length() < tol
            });
            if let Some(b) = found {
                partner[a] = Some(b);
                partner[b] = Some(a);
            }
        }

        if let Some(&lonely) = candidates.iter().find(|&&f| partner[f].is_none()) {
            let c = self.faces[lonely].center;
            return Err(PhysicsError::invalid_mesh(format!(
                "周期边界 {tag} 的面 ({:.4}, {:.4}) 在平移 ({:.4}, {:.4}) 下无对应面",
                c.x, c.y, shift.x, shift.y
            )));
        }

        // 面 a 的中心平移 shift 后落在面 b 上：从 a 的 owner 看，
        // b 的 owner 位于 c_B - shift。只在 a 一侧生成合并面。
        let mut merged = Vec::with_capacity(self.faces.len() - candidates.len() / 2);
        for (i, face) in self.faces.iter().enumerate() {
            let Some(b) = partner[i] else {
                merged.push(face.clone());
                continue;
            };
            let other = &self.faces[b];
            if (other.center - (face.center + shift)).length() >= 1e-8 * face.length.max(1.0) {
                continue;
            }
            if face.owner == other.owner {
                return Err(PhysicsError::invalid_mesh(format!(
                    "周期边界 {tag} 两侧属于同一单元 {}",
                    face.owner
                )));
            }
            let merged_face = if face.owner < other.owner {
                Face {
                    owner: face.owner,
                    neighbor: Some(other.owner),
                    normal: face.normal,
                    length: face.length,
                    center: face.center,
                    boundary: None,
                    periodic_shift: -shift,
                }
            } else {
                Face {
                    owner: other.owner,
                    neighbor: Some(face.owner),
                    normal: -face.normal,
                    length: face.length,
                    center: face.center + shift,
                    boundary: None,
                    periodic_shift: shift,
                }
            };
            merged.push(merged_face);
        }
        self.faces = merged;
        Ok(self)
    }

    /// 生成单元-面映射并校验
    pub fn build(mut self) -> Result<FvMesh, PhysicsError> {
        for cell in &mut self.cells {
            cell.faces.clear();
        }
        for (i, face) in self.faces.iter().enumerate() {
            self.cells[face.owner].faces.push(i);
            if let Some(nb) = face.neighbor {
                self.cells[nb].faces.push(i);
            }
        }
        let tags: BTreeSet<u32> = self.faces.iter().filter_map(|f| f.boundary).collect();
        let mesh = FvMesh {
            kind: self.kind,
            cells: self.cells,
            faces: self.faces,
            tags: tags.into_iter().collect(),
        };
        validate_mesh(&mesh)?;
        log::debug!(
            "网格构建完成: {} 个单元, {} 个面, 边界标签 {:?}",
            mesh.n_cells(),
            mesh.n_faces(),
            mesh.tags
        );
        Ok(mesh)
    }
}

/// 校验面积、法向、编号约定与单元闭合 Σ n L = 0
fn validate_mesh(mesh: &FvMesh) -> Result<(), PhysicsError> {
    if mesh.cells.is_empty() {
        return Err(PhysicsError::invalid_mesh("网格没有单元"));
    }
    for (i, cell) in mesh.cells.iter().enumerate() {
        if !(cell.area > 0.0) {
            return Err(PhysicsError::invalid_mesh(format!("单元 {i} 面积非正 ({})", cell.area)));
        }
        if cell.faces.len() < 3 {
            return Err(PhysicsError::invalid_mesh(format!("单元 {i} 只有 {} 个面", cell.faces.len())));
        }
        let closure: DVec2 = cell
            .faces
            .iter()
            .map(|&f| mesh.outward_normal(f, i) * mesh.faces[f].length)
            .sum();
        let scale = cell.faces.iter().map(|&f| mesh.faces[f].length).sum::<f64>();
        if closure.length() > 1e-9 * scale {
            return Err(PhysicsError::invalid_mesh(format!(
                "单元 {i} 不闭合 (|Σ nL| = {:.3e})",
                closure.length()
            )));
        }
    }
    for (i, face) in mesh.faces.iter().enumerate() {
        if (face.normal.length() - 1.0).abs() > 1e-10 || !(face.length > 0.0) {
            return Err(PhysicsError::invalid_mesh(format!("面 {i} 法向或长度无效")));
        }
        match (face.neighbor, face.boundary) {
            (Some(nb), None) if face.owner < nb => {}
            (None, Some(_)) => {}
            _ => {
                return Err(PhysicsError::invalid_mesh(format!(
                    "面 {i} 连接无效 (owner {}, neighbor {:?})",
                    face.owner, face.neighbor
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 两个单位正方形单元 [0,1]x[0,1] 和 [1,2]x[0,1]
    fn two_cells() -> MeshBuilder {
        let mut b = MeshBuilder::new(MeshKind::Unstructured);
        let c0 = b.add_cell(DVec2::new(0.5, 0.5), 1.0);
        let c1 = b.add_cell(DVec2::new(1.5, 0.5), 1.0);
        b.add_interior_face(c1, c0, -DVec2::X, 1.0, DVec2::new(1.0, 0.5));
        b.add_boundary_face(c0, 3, -DVec2::X, 1.0, DVec2::new(0.0, 0.5));
        b.add_boundary_face(c1, 3, DVec2::X, 1.0, DVec2::new(2.0, 0.5));
        for (c, x) in [(c0, 0.5), (c1, 1.5)] {
            b.add_boundary_face(c, 1, -DVec2::Y, 1.0, DVec2::new(x, 0.0));
            b.add_boundary_face(c, 1, DVec2::Y, 1.0, DVec2::new(x, 1.0));
        }
        b
    }

    #[test]
    fn test_interior_face_owner_is_lower() {
        let mesh = two_cells().build().unwrap();
        let f = &mesh.faces()[0];
        assert_eq!(f.owner, 0);
        assert_eq!(f.neighbor, Some(1));
        assert!((f.normal - DVec2::X).length() < 1e-14);
        assert_eq!(mesh.boundary_tags(), vec![1, 3]);
    }

    #[test]
    fn test_periodic_pairing() {
        let mesh = two_cells()
            .pair_periodic(3, DVec2::new(2.0, 0.0))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(mesh.boundary_tags(), vec![1]);
        let periodic: Vec<&Face> = mesh
            .faces()
            .iter()
            .filter(|f| f.periodic_shift != DVec2::ZERO)
            .collect();
        assert_eq!(periodic.len(), 1);
        let f = periodic[0];
        assert_eq!(f.owner, 0);
        assert_eq!(f.neighbor, Some(1));
        // 从单元 0 看，单元 1 位于 x = -0.5
        let idx = mesh.faces().iter().position(|g| g.periodic_shift != DVec2::ZERO).unwrap();
        assert!((mesh.neighbor_center(idx, 0) - DVec2::new(-0.5, 0.5)).length() < 1e-14);
        assert!((mesh.neighbor_center(idx, 1) - DVec2::new(2.5, 0.5)).length() < 1e-14);
        assert!((mesh.face_center_from(idx, 1) - DVec2::new(2.0, 0.5)).length() < 1e-14);
        // 法向从 owner 指出
        assert!((mesh.outward_normal(idx, 0) + DVec2::X).length() < 1e-14);
    }

    #[test]
    fn test_periodic_unmatched_fails() {
        let res = two_cells().pair_periodic(3, DVec2::new(1.5, 0.0));
        assert!(matches!(res, Err(PhysicsError::InvalidMesh { .. })));
    }

    #[test]
    fn test_open_cell_rejected() {
        let mut b = MeshBuilder::new(MeshKind::Unstructured);
        let c = b.add_cell(DVec2::new(0.5, 0.5), 1.0);
        b.add_boundary_face(c, 1, -DVec2::Y, 1.0, DVec2::new(0.5, 0.0));
        b.add_boundary_face(c, 1, DVec2::X, 1.0, DVec2::new(1.0, 0.5));
        b.add_boundary_face(c, 1, DVec2::Y, 1.0, DVec2::new(0.5, 1.0));
        assert!(b.build().is_err());
    }
}
