// crates/ef_physics/src/numerics/gradient/traits.rs

//! 梯度计算 trait 和存储类型
//!
//! 梯度按原始变量 (ρ, u, v, p) 逐单元存储。边界面的幽灵状态
//! 作为虚拟邻居参与梯度估计，其位置取单元中心关于边界面的镜像点。

use glam::DVec2;

use crate::mesh::MeshTopology;
use crate::state::{Primitive, NVAR};

/// 单元梯度：每个原始变量一个 DVec2
pub type CellGradient = [DVec2; NVAR];

// ============================================================
// 梯度存储
// ============================================================

/// 全场梯度存储
#[derive(Debug, Clone, Default)]
pub struct GradientField {
    data: Vec<CellGradient>,
}

impl GradientField {
    /// 创建指定大小的零梯度存储
    pub fn new(n: usize) -> Self {
        Self {
            data: vec![[DVec2::ZERO; NVAR]; n],
        }
    }

    /// 单元梯度
    #[inline]
    pub fn get(&self, i: usize) -> &CellGradient {
        &self.data[i]
    }

    /// 设置单元梯度
    #[inline]
    pub fn set(&mut self, i: usize, g: CellGradient) {
        self.data[i] = g;
    }

    /// 可变切片（并行填充）
    pub fn as_mut_slice(&mut self) -> &mut [CellGradient] {
        &mut self.data
    }

    /// 重置所有梯度为零
    pub fn reset(&mut self) {
        self.data.fill([DVec2::ZERO; NVAR]);
    }

    /// 存储大小
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 调整大小
    pub fn resize(&mut self, n: usize) {
        self.data.resize(n, [DVec2::ZERO; NVAR]);
    }

    /// 应用逐变量限制因子
    pub fn apply_limiter(&mut self, limiters: &[[f64; NVAR]]) {
        for (g, phi) in self.data.iter_mut().zip(limiters) {
            for k in 0..NVAR {
                g[k] *= phi[k];
            }
        }
    }
}

// ============================================================
// 场视图
// ============================================================

/// 梯度与重构所需的只读场视图
#[derive(Clone, Copy)]
pub struct FieldView<'a> {
    /// 网格
    pub mesh: &'a dyn MeshTopology,
    /// 单元原始变量
    pub cells: &'a [Primitive],
    /// 按面编号的幽灵状态，仅边界面为 Some
    pub ghosts: &'a [Option<Primitive>],
}

impl<'a> FieldView<'a> {
    /// 创建视图
    pub fn new(mesh: &'a dyn MeshTopology, cells: &'a [Primitive], ghosts: &'a [Option<Primitive>]) -> Self {
        Self { mesh, cells, ghosts }
    }

    /// 单元 `cell` 经面 `face` 看到的相邻值及其中心位置
    ///
    /// 周期面的相邻中心已按平移修正；缺少幽灵状态的边界面返回 None。
    #[inline]
    pub fn neighbor(&self, face: usize, cell: usize) -> Option<(DVec2, Primitive)> {
        let owner = self.mesh.face_owner(face);
        let value = match self.mesh.face_neighbor(face) {
            Some(nb) => self.cells[if cell == owner { nb } else { owner }],
            None => self.ghosts.get(face).copied().flatten()?,
        };
        Some((self.mesh.neighbor_center(face, cell), value))
    }

    /// 单元及其所有相邻值的逐变量极值 (min, max)
    pub fn neighbor_extrema(&self, cell: usize) -> ([f64; NVAR], [f64; NVAR]) {
        let w = self.cells[cell].to_array();
        let (mut lo, mut hi) = (w, w);
        for &face in self.mesh.cell_faces(cell) {
            if let Some((_, nb)) = self.neighbor(face, cell) {
                let q = nb.to_array();
                for k in 0..NVAR {
                    lo[k] = lo[k].min(q[k]);
                    hi[k] = hi[k].max(q[k]);
                }
            }
        }
        (lo, hi)
    }
}

// ============================================================
// 梯度方法 Trait
// ============================================================

/// 梯度计算方法
pub trait GradientMethod: Send + Sync {
    /// 单个单元的梯度
    fn cell_gradient(&self, view: &FieldView<'_>, cell: usize) -> CellGradient;

    /// 方法名称
    fn name(&self) -> &'static str;

    /// 计算所有单元的梯度（rayon 并行）
    fn compute(&self, view: &FieldView<'_>, output: &mut GradientField) {
        use rayon::prelude::*;
        output.resize(view.cells.len());
        output
            .as_mut_slice()
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, g)| *g = self.cell_gradient(view, i));
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_field_storage() {
        let mut field = GradientField::new(3);
        assert_eq!(field.len(), 3);
        field.set(1, [DVec2::new(1.0, 2.0), DVec2::X, DVec2::Y, DVec2::ONE]);
        assert_eq!(field.get(1)[0], DVec2::new(1.0, 2.0));
        field.reset();
        assert_eq!(field.get(1)[0], DVec2::ZERO);
    }

    #[test]
    fn test_apply_limiter() {
        let mut field = GradientField::new(2);
        field.set(0, [DVec2::new(2.0, 4.0); NVAR]);
        field.set(1, [DVec2::new(6.0, 8.0); NVAR]);
        field.apply_limiter(&[[0.5, 1.0, 0.0, 0.25], [1.0; NVAR]]);
        assert_eq!(field.get(0)[0], DVec2::new(1.0, 2.0));
        assert_eq!(field.get(0)[1], DVec2::new(2.0, 4.0));
        assert_eq!(field.get(0)[2], DVec2::ZERO);
        assert_eq!(field.get(0)[3], DVec2::new(0.5, 1.0));
        assert_eq!(field.get(1)[0], DVec2::new(6.0, 8.0));
    }
}
