// crates/ef_physics/src/schemes/riemann/roe.rs

//! Roe 近似黎曼求解器
//!
//! F = (F_L + F_R)/2 - Σ α_k |λ̃_k| r̃_k / 2，
//! 特征值 |λ̃| 在 |λ̃| < δ 时采用 Harten 熵修正 (λ̃² + δ²)/(2δ)，
//! δ = entropy_ratio · c̃。

use super::traits::{
    rotated_flux, FluxKind, RiemannError, RiemannFlux, RiemannSolver, RoeAverage, SolverCapabilities,
    SolverParams,
};
use crate::state::{Conserved, GasModel, Primitive};

/// Roe 求解器
#[derive(Debug, Clone)]
pub struct RoeSolver {
    gas: GasModel,
    params: SolverParams,
}

impl RoeSolver {
    /// 创建求解器
    pub fn new(gas: GasModel, params: SolverParams) -> Self {
        Self { gas, params }
    }

    /// Harten 熵修正
    #[inline]
    fn harten(&self, lambda: f64, delta: f64) -> f64 {
        let a = lambda.abs();
        if a < delta {
            0.5 * (lambda * lambda + delta * delta) / delta
        } else {
            a
        }
    }
}

impl RiemannSolver for RoeSolver {
    fn name(&self) -> &'static str {
        "Roe"
    }

    fn kind(&self) -> FluxKind {
        FluxKind::Roe
    }

    fn capabilities(&self) -> SolverCapabilities {
        SolverCapabilities {
            has_entropy_fix: true,
            resolves_contact: true,
            exact: false,
            upwind: true,
        }
    }

    fn gas(&self) -> &GasModel {
        &self.gas
    }

    fn solve_rotated(&self, l: &Primitive, r: &Primitive) -> Result<RiemannFlux, RiemannError> {
        let (fl, ul) = rotated_flux(&self.gas, l);
        let (fr, ur) = rotated_flux(&self.gas, r);
        let avg = RoeAverage::new(&self.gas, l, r);
        let (u, v, h, c) = (avg.u, avg.v, avg.h, avg.c);
        if !(c > 0.0) {
            return Err(RiemannError::Numerical {
                message: format!("Roe 平均声速非正 (c={c:.3e})"),
            });
        }

        let d = ur - ul;
        // 剪切波强度与去除剪切能量后的能量差
        let alpha3 = d.rho_v - v * d.rho;
        let de = d.rho_e - alpha3 * v;
        let alpha2 = self.gas.gm1() / (c * c) * (d.rho * (h - u * u) + u * d.rho_u - de);
        let alpha1 = 0.5 / c * (d.rho * (u + c) - d.rho_u - c * alpha2);
        let alpha4 = d.rho - alpha1 - alpha2;

        let delta = self.params.entropy_threshold(c);
        let l1 = self.harten(u - c, delta);
        let l2 = self.harten(u, delta);
        let l4 = self.harten(u + c, delta);

        let r1 = Conserved::new(1.0, u - c, v, h - u * c);
        let r2 = Conserved::new(1.0, u, v, 0.5 * (u * u + v * v));
        let r3 = Conserved::new(0.0, 0.0, 1.0, v);
        let r4 = Conserved::new(1.0, u + c, v, h + u * c);

        let dissipation = r1 * (alpha1 * l1) + r2 * (alpha2 * l2) + r3 * (alpha3 * l2) + r4 * (alpha4 * l4);
        let flux = (fl + fr - dissipation) * 0.5;
        Ok(RiemannFlux::new(flux, u.abs() + c))
    }
}
