// crates/ef_physics/src/engine/residual.rs

//! 空间残差组装
//!
//! 对每个界面取重构后的左右状态（边界面右状态为幽灵状态），
//! 调用数值通量，得到 `R_i = −Σ_f F_f·n_f L_f`（owner 取负、neighbor 取正）。
//!
//! 组装分两阶段：
//! 1. 并行计算所有界面的 `F·L`，写入按界面编号的缓冲区
//! 2. 按单元并行收集所属界面的贡献
//!
//! 第二阶段每个单元只写自己的累加器，且按 `cell_faces` 的固定顺序求和，
//! 结果与线程数无关。

use std::sync::Arc;

use rayon::prelude::*;

use crate::boundary::BoundaryManager;
use crate::error::PhysicsResult;
use crate::mesh::MeshTopology;
use crate::numerics::gradient::FieldView;
use crate::numerics::reconstruction::Reconstructor;
use crate::schemes::{RiemannFlux, RiemannSolver};
use crate::state::{Conserved, FlowState, GasModel, Primitive};

/// 界面通量求值上下文：气体、数值通量与边界条件
///
/// 三者在初始化时选定，全程对所有界面统一使用。
#[derive(Clone)]
pub struct FluxContext {
    gas: GasModel,
    riemann: Arc<dyn RiemannSolver>,
    boundaries: Arc<BoundaryManager>,
}

impl FluxContext {
    /// 创建上下文
    pub fn new(gas: GasModel, riemann: Arc<dyn RiemannSolver>, boundaries: Arc<BoundaryManager>) -> Self {
        Self {
            gas,
            riemann,
            boundaries,
        }
    }

    /// 气体模型
    pub fn gas(&self) -> &GasModel {
        &self.gas
    }

    /// 数值通量
    pub fn riemann(&self) -> &dyn RiemannSolver {
        self.riemann.as_ref()
    }

    /// 边界条件
    pub fn boundaries(&self) -> &BoundaryManager {
        &self.boundaries
    }

    /// 界面通量
    ///
    /// `right` 为 None 时该面是边界面，右状态由 `left` 生成幽灵状态。
    pub fn face_flux(
        &self,
        mesh: &dyn MeshTopology,
        face: usize,
        left: &Primitive,
        right: Option<&Primitive>,
        time: f64,
    ) -> PhysicsResult<RiemannFlux> {
        let ghost;
        let right = match right {
            Some(r) => r,
            None => {
                ghost = self.boundaries.ghost_state(mesh, face, left, time)?;
                &ghost
            }
        };
        self.riemann
            .solve(left, right, mesh.face_normal(face))
            .map_err(|e| e.at_face(face))
    }
}

/// 按单元收集界面贡献 R_i = Σ ±(F·L)_f
pub fn gather_residual(mesh: &dyn MeshTopology, face_fluxes: &[Conserved], residual: &mut [Conserved]) {
    residual.par_iter_mut().enumerate().for_each(|(cell, r)| {
        let mut sum = Conserved::ZERO;
        for &face in mesh.cell_faces(cell) {
            if mesh.face_owner(face) == cell {
                sum -= face_fluxes[face];
            } else {
                sum += face_fluxes[face];
            }
        }
        *r = sum;
    });
}

/// 取编号最小的错误
pub(crate) fn first_error<T>(results: Vec<PhysicsResult<T>>) -> PhysicsResult<Vec<T>> {
    results.into_iter().collect()
}

/// 残差组装器
pub struct ResidualAssembler {
    ctx: FluxContext,
    reconstructor: Box<dyn Reconstructor>,
    primitives: Vec<Primitive>,
    ghosts: Vec<Option<Primitive>>,
    face_fluxes: Vec<Conserved>,
}

impl ResidualAssembler {
    /// 创建组装器
    pub fn new(ctx: FluxContext, reconstructor: Box<dyn Reconstructor>) -> Self {
        Self {
            ctx,
            reconstructor,
            primitives: Vec::new(),
            ghosts: Vec::new(),
            face_fluxes: Vec::new(),
        }
    }

    /// 通量上下文
    pub fn context(&self) -> &FluxContext {
        &self.ctx
    }

    /// 重构器
    pub fn reconstructor(&self) -> &dyn Reconstructor {
        self.reconstructor.as_ref()
    }

    /// 最近一次组装使用的单元原始变量
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// 最近一次组装的界面通量 F·L
    pub fn face_fluxes(&self) -> &[Conserved] {
        &self.face_fluxes
    }

    /// 组装空间残差
    ///
    /// # 返回
    /// 全场最大波速
    ///
    /// # 错误
    /// - 单元状态非物理：`NegativeDensity` / `NegativePressure`（编号最小的单元）
    /// - 通量输入非法：`InvalidFluxInput`（编号最小的界面）
    pub fn assemble(
        &mut self,
        mesh: &dyn MeshTopology,
        state: &FlowState,
        time: f64,
        residual: &mut [Conserved],
    ) -> PhysicsResult<f64> {
        let ctx = &self.ctx;
        self.primitives = state.primitives(&ctx.gas)?;
        let cells = &self.primitives;

        // 梯度与极值用的幽灵状态，由单元中心值生成
        self.ghosts = first_error(
            (0..mesh.n_faces())
                .into_par_iter()
                .map(|face| match mesh.face_neighbor(face) {
                    Some(_) => Ok(None),
                    None => ctx
                        .boundaries
                        .ghost_state(mesh, face, &cells[mesh.face_owner(face)], time)
                        .map(Some),
                })
                .collect(),
        )?;

        let view = FieldView::new(mesh, cells, &self.ghosts);
        self.reconstructor.prepare(&view);
        let recon = self.reconstructor.as_ref();

        let fluxes = first_error(
            (0..mesh.n_faces())
                .into_par_iter()
                .map(|face| {
                    let owner = mesh.face_owner(face);
                    let left = recon.extrapolate(&view, owner, face);
                    let right = mesh
                        .face_neighbor(face)
                        .map(|nb| recon.extrapolate(&view, nb, face));
                    let flux = ctx.face_flux(mesh, face, &left, right.as_ref(), time)?;
                    Ok((flux.flux * mesh.face_length(face), flux.max_wave_speed))
                })
                .collect(),
        )?;

        let mut max_wave_speed = 0.0f64;
        self.face_fluxes.clear();
        self.face_fluxes.extend(fluxes.into_iter().map(|(f, s)| {
            max_wave_speed = max_wave_speed.max(s);
            f
        }));

        gather_residual(mesh, &self.face_fluxes, residual);
        Ok(max_wave_speed)
    }
}

/// 一阶界面通量 F·L
///
/// 左右状态直接取单元值，边界面由左状态生成幽灵状态。Jacobian 差分使用。
pub fn first_order_face_flux(
    ctx: &FluxContext,
    mesh: &dyn MeshTopology,
    face: usize,
    cells: &[Primitive],
    time: f64,
) -> PhysicsResult<Conserved> {
    let left = cells[mesh.face_owner(face)];
    let right = mesh.face_neighbor(face).map(|nb| cells[nb]);
    let flux = ctx.face_flux(mesh, face, &left, right.as_ref(), time)?;
    Ok(flux.flux * mesh.face_length(face))
}

impl std::fmt::Debug for ResidualAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResidualAssembler")
            .field("flux", &self.ctx.riemann.name())
            .field("reconstruction", &self.reconstructor.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryCondition;
    use crate::error::PhysicsError;
    use crate::mesh::CartesianMesh;
    use crate::numerics::reconstruction::{MusclConfig, MusclReconstructor};
    use crate::schemes::{create_riemann_solver, FluxKind, SolverParams};
    use glam::DVec2;

    fn assembler(kind: FluxKind, config: MusclConfig, bc: BoundaryCondition) -> ResidualAssembler {
        let gas = GasModel::default();
        let mut boundaries = BoundaryManager::new(gas);
        boundaries.add_condition(1, bc);
        let ctx = FluxContext::new(
            gas,
            create_riemann_solver(kind, gas, SolverParams::default()),
            Arc::new(boundaries),
        );
        ResidualAssembler::new(ctx, Box::new(MusclReconstructor::new(config)))
    }

    #[test]
    fn test_uniform_state_has_zero_residual() {
        let mesh = CartesianMesh::new(4, 3, DVec2::ZERO, DVec2::ONE).build().unwrap();
        let gas = GasModel::default();
        let state = FlowState::uniform(mesh.n_cells(), gas.to_conservative(&Primitive::new(1.0, 0.0, 0.0, 1.0)));
        let mut asm = assembler(FluxKind::Hllc, MusclConfig::default(), BoundaryCondition::slip_wall());
        let mut residual = vec![Conserved::ZERO; mesh.n_cells()];
        let speed = asm.assemble(&mesh, &state, 0.0, &mut residual).unwrap();

        assert!((speed - 1.4f64.sqrt()).abs() < 1e-12);
        for r in &residual {
            assert!(r.max_abs() < 1e-13, "{r:?}");
        }
    }

    #[test]
    fn test_face_fluxes_cancel_in_total() {
        // 超音速出口上任意分布：内部面贡献两两抵消，总残差等于边界通量之和
        let mesh = CartesianMesh::new(5, 4, DVec2::ZERO, DVec2::ONE).build().unwrap();
        let gas = GasModel::default();
        let state = FlowState::from_fn(mesh.n_cells(), |i| {
            let c = mesh.cell_center(i);
            gas.to_conservative(&Primitive::new(1.0 + 0.3 * c.x, 0.2 * c.y, -0.1, 1.0 + 0.5 * c.x * c.y))
        });
        let mut asm = assembler(FluxKind::Roe, MusclConfig::default(), BoundaryCondition::outflow());
        let mut residual = vec![Conserved::ZERO; mesh.n_cells()];
        asm.assemble(&mesh, &state, 0.0, &mut residual).unwrap();

        let mut total = Conserved::ZERO;
        for r in &residual {
            total += *r;
        }
        let mut boundary = Conserved::ZERO;
        for face in (0..mesh.n_faces()).filter(|&f| mesh.face_neighbor(f).is_none()) {
            boundary -= asm.face_fluxes()[face];
        }
        assert!((total - boundary).max_abs() < 1e-12);
    }

    #[test]
    fn test_negative_pressure_reports_cell() {
        let mesh = CartesianMesh::new(3, 1, DVec2::ZERO, DVec2::new(3.0, 1.0)).build().unwrap();
        let gas = GasModel::default();
        let mut state = FlowState::uniform(mesh.n_cells(), gas.to_conservative(&Primitive::new(1.0, 0.0, 0.0, 1.0)));
        state.rho_e[2] = -1.0;
        let mut asm = assembler(FluxKind::Hll, MusclConfig::first_order(), BoundaryCondition::slip_wall());
        let mut residual = vec![Conserved::ZERO; mesh.n_cells()];
        let err = asm.assemble(&mesh, &state, 0.0, &mut residual).unwrap_err();
        assert!(matches!(err, PhysicsError::NegativePressure { cell: 2, .. }));
    }

    #[test]
    fn test_first_order_face_flux_matches_assembly() {
        let mesh = CartesianMesh::new(4, 1, DVec2::ZERO, DVec2::new(4.0, 1.0)).build().unwrap();
        let gas = GasModel::default();
        let state = FlowState::from_fn(mesh.n_cells(), |i| {
            gas.to_conservative(&Primitive::new(1.0 + i as f64, 0.1, 0.0, 1.0 + 0.5 * i as f64))
        });
        let mut asm = assembler(FluxKind::Hllc, MusclConfig::first_order(), BoundaryCondition::slip_wall());
        let mut residual = vec![Conserved::ZERO; mesh.n_cells()];
        asm.assemble(&mesh, &state, 0.0, &mut residual).unwrap();

        let cells = asm.primitives().to_vec();
        for face in 0..mesh.n_faces() {
            let f = first_order_face_flux(asm.context(), &mesh, face, &cells, 0.0).unwrap();
            assert!((f - asm.face_fluxes()[face]).max_abs() < 1e-14);
        }
    }
}
