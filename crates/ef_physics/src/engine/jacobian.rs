// crates/ef_physics/src/engine/jacobian.rs

//! 隐式系统矩阵组装
//!
//! 后向欧拉线性化后的系统矩阵：
//!
//! $$ M = \mathrm{diag}(A_i / \Delta t_i) - \frac{\partial R}{\partial U} $$
//!
//! R 使用一阶界面通量。每个界面的 ∂(F·L)/∂U_L 与 ∂(F·L)/∂U_R
//! 以有限差分求得：对第 k 个守恒量扰动 h = √ε (1 + |U_k|)，
//! 扰动后状态非物理时改用 -h。边界面的右状态为幽灵状态，
//! 差分时随左状态一起重算，得到复合导数。
//!
//! 界面块并行计算，之后串行散布到块 CSR 矩阵。

use rayon::prelude::*;

use super::residual::{first_error, FluxContext};
use crate::error::{PhysicsError, PhysicsResult};
use crate::mesh::MeshTopology;
use crate::numerics::linear_algebra::{Block, BlockCsrMatrix, ZERO_BLOCK};
use crate::state::{Conserved, Primitive, NVAR};

/// 单个界面的通量导数块
#[derive(Debug, Clone, Copy)]
pub struct FaceBlocks {
    /// ∂(F·L)/∂U_owner
    pub d_owner: Block,
    /// ∂(F·L)/∂U_neighbor，边界面为 None
    pub d_neighbor: Option<Block>,
}

/// 有限差分 Jacobian 组装器
#[derive(Debug, Clone, Copy)]
pub struct JacobianAssembler {
    rel_step: f64,
}

impl Default for JacobianAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl JacobianAssembler {
    /// 创建组装器，步长系数 √ε
    pub fn new() -> Self {
        Self {
            rel_step: f64::EPSILON.sqrt(),
        }
    }

    /// 第 k 个分量的差分步长
    #[inline]
    fn step(&self, value: f64) -> f64 {
        self.rel_step * (1.0 + value.abs())
    }

    /// 对 `w` 的守恒量逐分量差分，返回 ∂F/∂U（列 k 对应分量 k）
    fn differentiate<F>(&self, ctx: &FluxContext, w: &Primitive, base: Conserved, flux: F) -> PhysicsResult<Block>
    where
        F: Fn(&Primitive) -> PhysicsResult<Conserved>,
    {
        let gas = ctx.gas();
        let u = gas.to_conservative(w).to_array();
        let mut block = ZERO_BLOCK;
        for k in 0..NVAR {
            let h = self.step(u[k]);
            let perturbed = |h: f64| {
                let mut up = u;
                up[k] += h;
                gas.to_primitive(&Conserved::from_array(up)).ok()
            };
            let (wp, h) = match perturbed(h) {
                Some(wp) => (wp, h),
                None => match perturbed(-h) {
                    Some(wp) => (wp, -h),
                    None => {
                        return Err(PhysicsError::invalid_flux_input(usize::MAX, "Jacobian 扰动后状态非物理"));
                    }
                },
            };
            let col = ((flux(&wp)? - base) * (1.0 / h)).to_array();
            for (row, value) in col.into_iter().enumerate() {
                block[row][k] = value;
            }
        }
        Ok(block)
    }

    /// 计算界面 `face` 的通量导数块
    pub fn face_blocks(
        &self,
        ctx: &FluxContext,
        mesh: &dyn MeshTopology,
        face: usize,
        cells: &[Primitive],
        time: f64,
    ) -> PhysicsResult<FaceBlocks> {
        let length = mesh.face_length(face);
        let owner = cells[mesh.face_owner(face)];
        let neighbor = mesh.face_neighbor(face).map(|nb| cells[nb]);
        let eval = |l: &Primitive, r: Option<&Primitive>| -> PhysicsResult<Conserved> {
            Ok(ctx.face_flux(mesh, face, l, r, time)?.flux * length)
        };

        let base = eval(&owner, neighbor.as_ref())?;
        let relabel = |e: PhysicsError| match e {
            PhysicsError::InvalidFluxInput { step, message, .. } => PhysicsError::InvalidFluxInput { face, step, message },
            other => other,
        };
        let d_owner = self
            .differentiate(ctx, &owner, base, |wp| eval(wp, neighbor.as_ref()))
            .map_err(relabel)?;
        let d_neighbor = match neighbor {
            Some(nb) => Some(
                self.differentiate(ctx, &nb, base, |wp| eval(&owner, Some(wp)))
                    .map_err(relabel)?,
            ),
            None => None,
        };
        Ok(FaceBlocks { d_owner, d_neighbor })
    }

    /// 组装 M = diag(A/Δt) - ∂R/∂U
    ///
    /// `diagonal[i]` 为 A_i/Δt_i。矩阵稀疏模式须包含所有内部面的单元对。
    pub fn assemble(
        &self,
        ctx: &FluxContext,
        mesh: &dyn MeshTopology,
        cells: &[Primitive],
        time: f64,
        diagonal: &[f64],
        matrix: &mut BlockCsrMatrix,
    ) -> PhysicsResult<()> {
        let blocks = first_error(
            (0..mesh.n_faces())
                .into_par_iter()
                .map(|face| self.face_blocks(ctx, mesh, face, cells, time))
                .collect(),
        )?;

        matrix.clear_values();
        for (i, &d) in diagonal.iter().enumerate() {
            let diag = matrix.diagonal_block_mut(i);
            for (k, row) in diag.iter_mut().enumerate() {
                row[k] += d;
            }
        }

        // R_o = -F·L, R_n = +F·L，M 取 -∂R/∂U
        for (face, fb) in blocks.iter().enumerate() {
            let o = mesh.face_owner(face);
            add_scaled(matrix, o, o, &fb.d_owner, 1.0)?;
            if let (Some(n), Some(d_nb)) = (mesh.face_neighbor(face), fb.d_neighbor.as_ref()) {
                add_scaled(matrix, o, n, d_nb, 1.0)?;
                add_scaled(matrix, n, o, &fb.d_owner, -1.0)?;
                add_scaled(matrix, n, n, d_nb, -1.0)?;
            }
        }
        Ok(())
    }
}

fn add_scaled(matrix: &mut BlockCsrMatrix, row: usize, col: usize, block: &Block, scale: f64) -> PhysicsResult<()> {
    let mut scaled = *block;
    for r in scaled.iter_mut() {
        for v in r.iter_mut() {
            *v *= scale;
        }
    }
    if matrix.add_block(row, col, &scaled) {
        Ok(())
    } else {
        Err(PhysicsError::invalid_mesh(format!("稀疏模式缺少块 ({row}, {col})")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use glam::DVec2;

    use crate::boundary::{BoundaryCondition, BoundaryManager};
    use crate::engine::residual::ResidualAssembler;
    use crate::mesh::CartesianMesh;
    use crate::numerics::linear_algebra::BlockCsrPattern;
    use crate::numerics::reconstruction::{MusclConfig, MusclReconstructor};
    use crate::schemes::{create_riemann_solver, FluxKind, SolverParams};
    use crate::state::{FlowState, GasModel};

    fn context(kind: FluxKind, bc: BoundaryCondition) -> FluxContext {
        let gas = GasModel::default();
        let mut boundaries = BoundaryManager::new(gas);
        boundaries.add_condition(1, bc);
        FluxContext::new(gas, create_riemann_solver(kind, gas, SolverParams::default()), Arc::new(boundaries))
    }

    fn smooth_state(mesh: &dyn MeshTopology, gas: &GasModel) -> FlowState {
        FlowState::from_fn(mesh.n_cells(), |i| {
            let c = mesh.cell_center(i);
            gas.to_conservative(&Primitive::new(1.0 + 0.2 * c.x, 0.3 + 0.1 * c.y, 0.1, 1.0 + 0.3 * c.y))
        })
    }

    #[test]
    fn test_jacobian_matches_residual_directional_derivative() {
        let mesh = CartesianMesh::new(3, 3, DVec2::ZERO, DVec2::ONE).build().unwrap();
        let gas = GasModel::default();
        let ctx = context(FluxKind::LaxFriedrichs, BoundaryCondition::outflow());
        let state = smooth_state(&mesh, &gas);
        let cells = state.primitives(&gas).unwrap();

        let mut matrix = BlockCsrMatrix::new(BlockCsrPattern::from_mesh(&mesh));
        let diagonal = vec![0.0; mesh.n_cells()];
        JacobianAssembler::new()
            .assemble(&ctx, &mesh, &cells, 0.0, &diagonal, &mut matrix)
            .unwrap();

        let n = mesh.n_cells() * NVAR;
        let x: Vec<f64> = (0..n).map(|k| 1e-3 * (((k * 7) % 5) as f64 - 2.0)).collect();
        let mut mx = vec![0.0; n];
        matrix.mul_vec(&x, &mut mx);

        // -(R(U + x) - R(U)) ≈ M x
        let mut asm = ResidualAssembler::new(ctx, Box::new(MusclReconstructor::new(MusclConfig::first_order())));
        let mut r0 = vec![Conserved::ZERO; mesh.n_cells()];
        let mut r1 = vec![Conserved::ZERO; mesh.n_cells()];
        asm.assemble(&mesh, &state, 0.0, &mut r0).unwrap();
        let mut flat = state.to_flat();
        for (u, dx) in flat.iter_mut().zip(&x) {
            *u += dx;
        }
        asm.assemble(&mesh, &FlowState::from_flat(&flat), 0.0, &mut r1).unwrap();

        for i in 0..mesh.n_cells() {
            let fd = (r0[i] - r1[i]).to_array();
            for k in 0..NVAR {
                let diff = (fd[k] - mx[NVAR * i + k]).abs();
                assert!(diff < 1e-5, "cell {i} var {k}: {} vs {}", fd[k], mx[NVAR * i + k]);
            }
        }
    }

    #[test]
    fn test_diagonal_term_is_added() {
        let mesh = CartesianMesh::new(2, 1, DVec2::ZERO, DVec2::new(2.0, 1.0)).build().unwrap();
        let ctx = context(FluxKind::Hll, BoundaryCondition::slip_wall());
        let cells = vec![Primitive::new(1.0, 0.0, 0.0, 1.0); 2];
        let pattern = BlockCsrPattern::from_mesh(&mesh);

        let mut m0 = BlockCsrMatrix::new(pattern.clone());
        let mut m1 = BlockCsrMatrix::new(pattern);
        let jac = JacobianAssembler::new();
        jac.assemble(&ctx, &mesh, &cells, 0.0, &[0.0, 0.0], &mut m0).unwrap();
        jac.assemble(&ctx, &mesh, &cells, 0.0, &[10.0, 20.0], &mut m1).unwrap();
        for k in 0..NVAR {
            assert!((m1.diagonal_block(0)[k][k] - m0.diagonal_block(0)[k][k] - 10.0).abs() < 1e-12);
            assert!((m1.diagonal_block(1)[k][k] - m0.diagonal_block(1)[k][k] - 20.0).abs() < 1e-12);
        }
        let interior = (0..mesh.n_faces()).find(|&f| mesh.face_neighbor(f).is_some()).unwrap();
        let boundary = (0..mesh.n_faces()).find(|&f| mesh.face_neighbor(f).is_none()).unwrap();
        assert!(jac.face_blocks(&ctx, &mesh, interior, &cells, 0.0).unwrap().d_neighbor.is_some());
        assert!(jac.face_blocks(&ctx, &mesh, boundary, &cells, 0.0).unwrap().d_neighbor.is_none());
    }
}
