// crates/ef_physics/src/analysis.rs

//! 收敛与气动力分析
//!
//! - 残差范数：每个守恒量 sqrt(Σ (R_i/A_i)² / N)
//! - 气动力：固壁标签上的压力积分 F = Σ p n L，按来流攻角
//!   分解为阻力与升力，以 ½ρ∞|v∞|² L_ref 无量纲化
//! - 相邻两步 cl/cd 的变化量，供稳态收敛判断
//! - 误差范数：相对参考解的面积加权 L1 / L2 与最大误差

use std::fmt;

use ef_foundation::float::{safe_div, KahanSum};
use glam::DVec2;
use serde::Serialize;

use ef_foundation::EfError;

use crate::boundary::Freestream;
use crate::error::PhysicsResult;
use crate::exact::ExactSolution;
use crate::mesh::MeshTopology;
use crate::state::{Conserved, FlowState, GasModel, Primitive, NVAR};

// ============================================================
// 残差范数
// ============================================================

/// 各守恒量的残差范数
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ResidualNorms {
    /// [ρ, ρu, ρv, ρE]
    pub values: [f64; NVAR],
}

impl ResidualNorms {
    /// 由未除以面积的残差计算
    pub fn compute(residual: &[Conserved], areas: &[f64]) -> Self {
        let n = residual.len();
        if n == 0 {
            return Self::default();
        }
        let mut sums = [KahanSum::new(), KahanSum::new(), KahanSum::new(), KahanSum::new()];
        for (r, &a) in residual.iter().zip(areas) {
            for (k, sum) in sums.iter_mut().enumerate() {
                let v = r.component(k) / a;
                sum.add(v * v);
            }
        }
        let mut values = [0.0; NVAR];
        for (v, sum) in values.iter_mut().zip(&sums) {
            *v = (sum.value() / n as f64).sqrt();
        }
        Self { values }
    }

    /// 密度残差
    pub fn density(&self) -> f64 {
        self.values[0]
    }

    /// 最大分量
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// 相对 `reference` 归一化（参考为零的分量保持原值）
    pub fn normalized(&self, reference: &ResidualNorms) -> Self {
        let mut values = self.values;
        for (v, r) in values.iter_mut().zip(&reference.values) {
            *v = safe_div(*v, *r, *v);
        }
        Self { values }
    }
}

impl fmt::Display for ResidualNorms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ρ={:.4e} ρu={:.4e} ρv={:.4e} ρE={:.4e}",
            self.values[0], self.values[1], self.values[2], self.values[3]
        )
    }
}

// ============================================================
// 误差范数
// ============================================================

/// 各守恒量相对参考解的误差
///
/// L1 与 L2 以单元面积加权并除以总面积，L∞ 取单元最大值。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ErrorNorms {
    /// L1 误差 [ρ, ρu, ρv, ρE]
    pub l1: [f64; NVAR],
    /// L2 误差
    pub l2: [f64; NVAR],
    /// 最大误差
    pub linf: [f64; NVAR],
}

impl ErrorNorms {
    /// 比较两个全场状态
    pub fn compute(state: &FlowState, reference: &FlowState, areas: &[f64]) -> PhysicsResult<Self> {
        EfError::check_size("reference", state.n_cells(), reference.n_cells())?;
        EfError::check_size("areas", state.n_cells(), areas.len())?;

        let mut abs_sums = [KahanSum::new(); NVAR];
        let mut sq_sums = [KahanSum::new(); NVAR];
        let mut linf = [0.0f64; NVAR];
        let total_area = KahanSum::sum_iter(areas.iter().copied());
        for (i, &a) in areas.iter().enumerate() {
            let (u, r) = (state.get(i), reference.get(i));
            for k in 0..NVAR {
                let e = (u.component(k) - r.component(k)).abs();
                abs_sums[k].add(e * a);
                sq_sums[k].add(e * e * a);
                linf[k] = linf[k].max(e);
            }
        }

        let mut l1 = [0.0; NVAR];
        let mut l2 = [0.0; NVAR];
        for k in 0..NVAR {
            l1[k] = safe_div(abs_sums[k].value(), total_area, 0.0);
            l2[k] = safe_div(sq_sums[k].value(), total_area, 0.0).sqrt();
        }
        Ok(Self { l1, l2, linf })
    }

    /// 与参考解在时刻 `t` 的单元中心值比较
    pub fn against_exact<M: MeshTopology + ?Sized>(
        exact: &ExactSolution,
        mesh: &M,
        state: &FlowState,
        t: f64,
    ) -> PhysicsResult<Self> {
        let reference = exact.fill(mesh, t)?;
        Self::compute(state, &reference, &mesh.cell_areas())
    }

    /// 密度 L1 误差
    pub fn density_l1(&self) -> f64 {
        self.l1[0]
    }
}

impl fmt::Display for ErrorNorms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = ["ρ", "ρu", "ρv", "ρE"];
        for (k, name) in names.iter().enumerate() {
            if k > 0 {
                write!(f, " ")?;
            }
            write!(f, "{name}: L1={:.4e} L2={:.4e} L∞={:.4e}", self.l1[k], self.l2[k], self.linf[k])?;
        }
        Ok(())
    }
}

// ============================================================
// 气动力系数
// ============================================================

/// 气动力系数
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ForceCoefficients {
    /// 升力系数
    pub cl: f64,
    /// 阻力系数
    pub cd: f64,
    /// 与上一步的升力系数差
    pub cl_residual: f64,
    /// 与上一步的阻力系数差
    pub cd_residual: f64,
}

/// 气动力积分设置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceSettings {
    /// 固壁边界标签
    pub wall_tag: u32,
    /// 参考长度
    pub reference_length: f64,
    /// 来流状态
    pub freestream: Freestream,
}

/// 气动力监测器
#[derive(Debug, Clone)]
pub struct ForceMonitor {
    settings: ForceSettings,
    gas: GasModel,
    previous: Option<(f64, f64)>,
}

impl ForceMonitor {
    /// 创建监测器
    pub fn new(settings: ForceSettings, gas: GasModel) -> Self {
        Self {
            settings,
            gas,
            previous: None,
        }
    }

    /// 设置
    pub fn settings(&self) -> &ForceSettings {
        &self.settings
    }

    /// 固壁压力合力 Σ p n L
    pub fn pressure_force(&self, mesh: &dyn MeshTopology, cells: &[Primitive]) -> DVec2 {
        let tag = self.settings.wall_tag;
        let mut fx = KahanSum::new();
        let mut fy = KahanSum::new();
        for face in (0..mesh.n_faces()).filter(|&f| mesh.face_boundary(f) == Some(tag)) {
            let p = cells[mesh.face_owner(face)].p;
            let f = mesh.face_normal(face) * (p * mesh.face_length(face));
            fx.add(f.x);
            fy.add(f.y);
        }
        DVec2::new(fx.value(), fy.value())
    }

    /// 计算 (cl, cd)
    pub fn coefficients(&self, mesh: &dyn MeshTopology, cells: &[Primitive]) -> (f64, f64) {
        let force = self.pressure_force(mesh, cells);
        let drag_dir = self.settings.freestream.direction();
        let lift_dir = drag_dir.perp();
        let q = self.settings.freestream.dynamic_pressure(&self.gas) * self.settings.reference_length;
        (safe_div(force.dot(lift_dir), q, 0.0), safe_div(force.dot(drag_dir), q, 0.0))
    }

    /// 计算系数并与上一次调用比较
    pub fn update(&mut self, mesh: &dyn MeshTopology, cells: &[Primitive]) -> ForceCoefficients {
        let (cl, cd) = self.coefficients(mesh, cells);
        let (cl_residual, cd_residual) = match self.previous {
            Some((cl0, cd0)) => ((cl - cl0).abs(), (cd - cd0).abs()),
            None => (0.0, 0.0),
        };
        self.previous = Some((cl, cd));
        ForceCoefficients {
            cl,
            cd,
            cl_residual,
            cd_residual,
        }
    }

    /// 清除历史
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
