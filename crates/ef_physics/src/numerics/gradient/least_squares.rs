// crates/ef_physics/src/numerics/gradient/least_squares.rs

//! 最小二乘梯度计算
//!
//! 通过最小化加权最小二乘误差来计算梯度:
//! min Σ w_j * (φ_j - φ_i - ∇φ_i · r_ij)²，w_j = 1/|r_ij|²
//!
//! 对于 2D 情况，求解 2x2 法方程：
//! [a11 a12] [∂φ/∂x]   [b1]
//! [a12 a22] [∂φ/∂y] = [b2]
//!
//! 四个原始变量共用同一系数矩阵。法方程奇异时回退到 Green-Gauss。

use glam::DVec2;

use super::green_gauss::GreenGaussGradient;
use super::traits::{CellGradient, FieldView, GradientMethod};
use crate::state::NVAR;

/// 最小二乘梯度计算器
#[derive(Debug, Clone, Copy)]
pub struct LeastSquaresGradient {
    /// 行列式最小值（判断奇异性）
    det_min: f64,
    /// 回退方法
    fallback: GreenGaussGradient,
}

impl Default for LeastSquaresGradient {
    fn default() -> Self {
        Self {
            det_min: 1e-12,
            fallback: GreenGaussGradient::new(),
        }
    }
}

impl LeastSquaresGradient {
    /// 创建新实例
    pub fn new() -> Self {
        Self::default()
    }

    /// 求解 2x2 对称系统
    #[inline]
    fn solve_2x2(a11: f64, a12: f64, a22: f64, b: DVec2, det_min: f64) -> Option<DVec2> {
        let det = a11 * a22 - a12 * a12;
        if det.abs() < det_min {
            return None;
        }
        let x = DVec2::new(a22 * b.x - a12 * b.y, a11 * b.y - a12 * b.x) / det;
        x.is_finite().then_some(x)
    }
}

impl GradientMethod for LeastSquaresGradient {
    fn cell_gradient(&self, view: &FieldView<'_>, cell: usize) -> CellGradient {
        let center = view.mesh.cell_center(cell);
        let w_c = view.cells[cell].to_array();

        let (mut a11, mut a12, mut a22) = (0.0, 0.0, 0.0);
        let mut b = [DVec2::ZERO; NVAR];
        let mut count = 0usize;

        for &face in view.mesh.cell_faces(cell) {
            let Some((nb_center, nb)) = view.neighbor(face, cell) else {
                continue;
            };
            let d = nb_center - center;
            let dist_sq = d.length_squared();
            if dist_sq < 1e-20 {
                continue;
            }
            // 距离平方反比加权
            let w = 1.0 / dist_sq;
            a11 += w * d.x * d.x;
            a12 += w * d.x * d.y;
            a22 += w * d.y * d.y;
            let q = nb.to_array();
            for k in 0..NVAR {
                b[k] += w * (q[k] - w_c[k]) * d;
            }
            count += 1;
        }

        if count < 2 {
            return self.fallback.cell_gradient(view, cell);
        }

        let mut grad = [DVec2::ZERO; NVAR];
        for k in 0..NVAR {
            match Self::solve_2x2(a11, a12, a22, b[k], self.det_min) {
                Some(g) => grad[k] = g,
                None => return self.fallback.cell_gradient(view, cell),
            }
        }
        grad
    }

    fn name(&self) -> &'static str {
        "LeastSquares"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{polygon_mesh, MeshTopology};
    use crate::numerics::gradient::GradientField;
    use crate::state::Primitive;

    #[test]
    fn test_linear_field_exact_on_triangles() {
        // 2x2 方块剖分为 8 个三角形
        let mut nodes = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                nodes.push(DVec2::new(i as f64 * 0.5, j as f64 * 0.5));
            }
        }
        let mut tris = Vec::new();
        for j in 0..2 {
            for i in 0..2 {
                let n0 = i + 3 * j;
                tris.push(vec![n0, n0 + 1, n0 + 4]);
                tris.push(vec![n0, n0 + 4, n0 + 3]);
            }
        }
        let mesh = polygon_mesh(&nodes, &tris, |_, _| 1).unwrap().build().unwrap();

        let f = |p: DVec2| Primitive::new(2.0 + 0.5 * p.x + 3.0 * p.y, 0.1 * p.x, 0.0, 1.0);
        let cells: Vec<Primitive> = (0..mesh.n_cells()).map(|i| f(mesh.cell_center(i))).collect();
        let ghosts: Vec<Option<Primitive>> = (0..mesh.n_faces())
            .map(|face| {
                mesh.face_neighbor(face)
                    .is_none()
                    .then(|| f(mesh.neighbor_center(face, mesh.face_owner(face))))
            })
            .collect();

        let view = FieldView::new(&mesh, &cells, &ghosts);
        let mut out = GradientField::new(0);
        LeastSquaresGradient::new().compute(&view, &mut out);
        for i in 0..mesh.n_cells() {
            let g = out.get(i);
            assert!((g[0] - DVec2::new(0.5, 3.0)).length() < 1e-10, "cell {i}: {:?}", g[0]);
            assert!((g[1] - DVec2::new(0.1, 0.0)).length() < 1e-10);
            assert!(g[3].length() < 1e-10);
        }
    }
}
