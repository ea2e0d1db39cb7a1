// crates/ef_physics/src/numerics/reconstruction/muscl.rs

//! MUSCL 重构器实现

use rayon::prelude::*;

use super::config::MusclConfig;
use super::traits::Reconstructor;
use crate::numerics::gradient::{create_gradient, FieldView, GradientField, GradientMethod};
use crate::numerics::limiter::{create_limiter, LimiterContext, SlopeLimiter};
use crate::state::{Primitive, NVAR};

/// MUSCL 重构器
///
/// 实现完整的二阶 MUSCL 重构流程：
/// 1. 以最小二乘或 Green-Gauss 计算原始变量梯度
/// 2. 逐变量取各面限制因子的最小值
/// 3. 线性外推到面中心；外推结果非物理时退回单元中心值
pub struct MusclReconstructor {
    config: MusclConfig,
    gradients: GradientField,
    limiters: Vec<[f64; NVAR]>,
    gradient_method: Box<dyn GradientMethod>,
    limiter: Box<dyn SlopeLimiter>,
}

impl MusclReconstructor {
    /// 创建新的 MUSCL 重构器
    pub fn new(config: MusclConfig) -> Self {
        Self {
            config,
            gradients: GradientField::default(),
            limiters: Vec::new(),
            gradient_method: create_gradient(config.gradient_type),
            limiter: create_limiter(config.limiter, config.venkat_k),
        }
    }

    /// 获取配置
    pub fn config(&self) -> &MusclConfig {
        &self.config
    }

    /// 限制后的单元梯度
    pub fn gradients(&self) -> &GradientField {
        &self.gradients
    }

    /// 逐变量限制因子
    pub fn limiters(&self) -> &[[f64; NVAR]] {
        &self.limiters
    }

    /// 单个单元的逐变量限制因子
    fn cell_limiter(limiter: &dyn SlopeLimiter, view: &FieldView<'_>, grad: &[glam::DVec2; NVAR], cell: usize) -> [f64; NVAR] {
        let mesh = view.mesh;
        let center = mesh.cell_center(cell);
        let h = mesh.cell_length(cell);
        let w = view.cells[cell].to_array();
        let (lo, hi) = view.neighbor_extrema(cell);

        let mut phi = [1.0_f64; NVAR];
        for &face in mesh.cell_faces(cell) {
            let r = mesh.face_center_from(face, cell) - center;
            for k in 0..NVAR {
                let ctx = LimiterContext::new(w[k], grad[k].dot(r), lo[k], hi[k], h);
                phi[k] = phi[k].min(limiter.compute_limiter(&ctx));
            }
        }
        phi
    }
}

impl Reconstructor for MusclReconstructor {
    fn prepare(&mut self, view: &FieldView<'_>) {
        let n = view.cells.len();
        if !self.config.second_order {
            self.gradients.resize(n);
            self.gradients.reset();
            return;
        }

        self.gradient_method.compute(view, &mut self.gradients);

        self.limiters.resize(n, [1.0; NVAR]);
        let limiter = self.limiter.as_ref();
        let gradients = &self.gradients;
        self.limiters
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, phi)| *phi = Self::cell_limiter(limiter, view, gradients.get(i), i));

        self.gradients.apply_limiter(&self.limiters);
    }

    fn extrapolate(&self, view: &FieldView<'_>, cell: usize, face: usize) -> Primitive {
        let w = view.cells[cell];
        if !self.config.second_order {
            return w;
        }
        let r = view.mesh.face_center_from(face, cell) - view.mesh.cell_center(cell);
        let g = self.gradients.get(cell);
        let mut q = w.to_array();
        for k in 0..NVAR {
            q[k] += g[k].dot(r);
        }
        let face_state = Primitive::from_array(q);
        if face_state.is_physical() {
            face_state
        } else {
            w
        }
    }

    fn is_second_order(&self) -> bool {
        self.config.second_order
    }

    fn name(&self) -> &'static str {
        if self.config.second_order {
            "MUSCL"
        } else {
            "FirstOrder"
        }
    }
}
