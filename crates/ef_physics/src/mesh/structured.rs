// crates/ef_physics/src/mesh/structured.rs

//! 笛卡尔结构网格
//!
//! 单元编号 `i + j * nx`。边界标签按 下、右、上、左 的顺序给出。
//! 内部面法向为 +x 或 +y，天然满足 owner 编号小于 neighbor。

use glam::DVec2;

use super::fv_mesh::{FvMesh, MeshBuilder};
use super::topology::MeshKind;
use crate::error::PhysicsError;

/// 笛卡尔网格构建器
#[derive(Debug, Clone)]
pub struct CartesianMesh {
    nx: usize,
    ny: usize,
    lower: DVec2,
    upper: DVec2,
    sides: [u32; 4],
    periodic: Vec<(u32, DVec2)>,
}

impl CartesianMesh {
    /// 创建 `nx × ny` 均匀网格，四边默认标签 1
    pub fn new(nx: usize, ny: usize, lower: DVec2, upper: DVec2) -> Self {
        Self {
            nx,
            ny,
            lower,
            upper,
            sides: [1; 4],
            periodic: Vec::new(),
        }
    }

    /// 设置四边标签（下、右、上、左）
    pub fn with_sides(mut self, sides: [u32; 4]) -> Self {
        self.sides = sides;
        self
    }

    /// 将标签 `tag` 的边界按平移 `shift` 配对为周期面
    pub fn with_periodic(mut self, tag: u32, shift: DVec2) -> Self {
        self.periodic.push((tag, shift));
        self
    }

    /// 单元 (i, j) 的编号
    #[inline]
    pub fn cell_index(&self, i: usize, j: usize) -> usize {
        i + j * self.nx
    }

    /// 网格间距
    pub fn spacing(&self) -> DVec2 {
        (self.upper - self.lower) / DVec2::new(self.nx as f64, self.ny as f64)
    }

    /// 生成构建器（尚未配对周期边界）
    pub fn builder(&self) -> Result<MeshBuilder, PhysicsError> {
        if self.nx == 0 || self.ny == 0 {
            return Err(PhysicsError::invalid_mesh(format!("单元数无效 {}x{}", self.nx, self.ny)));
        }
        let h = self.spacing();
        if !(h.x > 0.0 && h.y > 0.0) {
            return Err(PhysicsError::invalid_mesh("网格范围无效"));
        }
        let (nx, ny) = (self.nx, self.ny);
        let [bottom, right, top, left] = self.sides;
        let mut b = MeshBuilder::new(MeshKind::Structured { nx, ny });

        for j in 0..ny {
            for i in 0..nx {
                let center = self.lower + DVec2::new((i as f64 + 0.5) * h.x, (j as f64 + 0.5) * h.y);
                b.add_cell(center, h.x * h.y);
            }
        }

        let x = |i: usize| self.lower.x + i as f64 * h.x;
        let y = |j: usize| self.lower.y + j as f64 * h.y;

        // 竖直面
        for j in 0..ny {
            let yc = y(j) + 0.5 * h.y;
            b.add_boundary_face(self.cell_index(0, j), left, -DVec2::X, h.y, DVec2::new(x(0), yc));
            for i in 1..nx {
                b.add_interior_face(
                    self.cell_index(i - 1, j),
                    self.cell_index(i, j),
                    DVec2::X,
                    h.y,
                    DVec2::new(x(i), yc),
                );
            }
            b.add_boundary_face(self.cell_index(nx - 1, j), right, DVec2::X, h.y, DVec2::new(x(nx), yc));
        }

        // 水平面
        for i in 0..nx {
            let xc = x(i) + 0.5 * h.x;
            b.add_boundary_face(self.cell_index(i, 0), bottom, -DVec2::Y, h.x, DVec2::new(xc, y(0)));
            for j in 1..ny {
                b.add_interior_face(
                    self.cell_index(i, j - 1),
                    self.cell_index(i, j),
                    DVec2::Y,
                    h.x,
                    DVec2::new(xc, y(j)),
                );
            }
            b.add_boundary_face(self.cell_index(i, ny - 1), top, DVec2::Y, h.x, DVec2::new(xc, y(ny)));
        }

        Ok(b)
    }

    /// 构建网格（含周期配对）
    pub fn build(&self) -> Result<FvMesh, PhysicsError> {
        let mut b = self.builder()?;
        for &(tag, shift) in &self.periodic {
            b = b.pair_periodic(tag, shift)?;
        }
        b.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshTopology;

    #[test]
    fn test_counts() {
        let mesh = CartesianMesh::new(4, 3, DVec2::ZERO, DVec2::new(4.0, 3.0)).build().unwrap();
        assert_eq!(mesh.n_cells(), 12);
        // 竖直面 (nx+1)*ny + 水平面 nx*(ny+1)
        assert_eq!(mesh.n_faces(), 5 * 3 + 4 * 4);
        assert!((mesh.cell_area(0) - 1.0).abs() < 1e-14);
        assert_eq!(mesh.mesh_kind(), MeshKind::Structured { nx: 4, ny: 3 });
    }

    #[test]
    fn test_sides_tags() {
        let mesh = CartesianMesh::new(2, 2, DVec2::ZERO, DVec2::ONE)
            .with_sides([1, 2, 3, 4])
            .build()
            .unwrap();
        assert_eq!(mesh.boundary_tags(), vec![1, 2, 3, 4]);
        for f in mesh.boundary_faces(2) {
            assert!((mesh.face_normal(f) - DVec2::X).length() < 1e-14);
        }
        for f in mesh.boundary_faces(4) {
            assert!((mesh.face_normal(f) + DVec2::X).length() < 1e-14);
        }
    }

    #[test]
    fn test_fully_periodic() {
        let mesh = CartesianMesh::new(4, 4, DVec2::ZERO, DVec2::ONE)
            .with_sides([1, 2, 1, 2])
            .with_periodic(2, DVec2::new(1.0, 0.0))
            .with_periodic(1, DVec2::new(0.0, 1.0))
            .build()
            .unwrap();
        assert!(mesh.boundary_tags().is_empty());
        assert_eq!(mesh.n_faces(), 2 * 16);
        for c in 0..mesh.n_cells() {
            assert_eq!(mesh.cell_faces(c).len(), 4);
        }
    }
}
