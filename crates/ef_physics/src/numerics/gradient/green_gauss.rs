// crates/ef_physics/src/numerics/gradient/green_gauss.rs

//! Green-Gauss 梯度计算
//!
//! 使用 Green 定理将体积分转化为面积分:
//! ∇φ ≈ (1/A) ∮ φ·n dS
//!
//! 对于离散网格:
//! ∇φ_i ≈ (1/A_i) Σ_f φ_f · n_f · L_f
//!
//! 面值 φ_f 由两侧单元（或幽灵状态）插值得到。

use glam::DVec2;

use super::traits::{CellGradient, FieldView, GradientMethod};
use crate::state::NVAR;

/// 面插值方法
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FaceInterpolation {
    /// 简单算术平均
    #[default]
    Arithmetic,
    /// 距离加权插值（非均匀网格）
    DistanceWeighted,
}

/// Green-Gauss 梯度计算器
#[derive(Debug, Clone, Copy, Default)]
pub struct GreenGaussGradient {
    interpolation: FaceInterpolation,
}

impl GreenGaussGradient {
    /// 创建新实例
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置面插值方法
    pub fn with_face_interpolation(mut self, method: FaceInterpolation) -> Self {
        self.interpolation = method;
        self
    }

    /// 当前单元一侧的插值权重
    #[inline]
    fn weight(&self, d_cell: f64, d_nb: f64) -> f64 {
        match self.interpolation {
            FaceInterpolation::Arithmetic => 0.5,
            FaceInterpolation::DistanceWeighted => {
                let total = d_cell + d_nb;
                if total > 1e-14 {
                    d_nb / total
                } else {
                    0.5
                }
            }
        }
    }
}

impl GradientMethod for GreenGaussGradient {
    fn cell_gradient(&self, view: &FieldView<'_>, cell: usize) -> CellGradient {
        let mesh = view.mesh;
        let area = mesh.cell_area(cell);
        let mut grad = [DVec2::ZERO; NVAR];
        if area < 1e-14 {
            return grad;
        }

        let center = mesh.cell_center(cell);
        let w_c = view.cells[cell].to_array();
        for &face in mesh.cell_faces(cell) {
            let ds = mesh.outward_normal(face, cell) * mesh.face_length(face);
            // 缺少邻居值时按零梯度外推处理
            let (w, w_nb) = match view.neighbor(face, cell) {
                Some((nb_center, nb)) => {
                    let face_center = mesh.face_center_from(face, cell);
                    let w = self.weight(
                        (face_center - center).length(),
                        (nb_center - face_center).length(),
                    );
                    (w, nb.to_array())
                }
                None => (1.0, w_c),
            };
            for k in 0..NVAR {
                grad[k] += ds * (w * w_c[k] + (1.0 - w) * w_nb[k]);
            }
        }

        for g in grad.iter_mut() {
            *g /= area;
        }
        grad
    }

    fn name(&self) -> &'static str {
        "GreenGauss"
    }
}
