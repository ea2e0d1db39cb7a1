// crates/ef_physics/src/schemes/riemann/hllc.rs

//! HLLC 近似黎曼求解器
//!
//! HLLC (Harten-Lax-van Leer-Contact) 在 HLL 两波模型中恢复接触波，
//! 能精确保持静止接触间断和剪切层。
//!
//! # 核心算法
//!
//! 外侧波速取 Davis/Roe 估计，接触波速
//! ```text
//! S* = (p_R - p_L + ρ_L u_L (S_L - u_L) - ρ_R u_R (S_R - u_R))
//!      / (ρ_L (S_L - u_L) - ρ_R (S_R - u_R))
//! ```
//! 星区状态 U*_K = ρ_K (S_K - u_K)/(S_K - S*) · [1, S*, v_K, E_K/ρ_K + (S* - u_K)(S* + p_K/(ρ_K (S_K - u_K)))]。

use super::traits::{
    rotated_flux, FluxKind, RiemannError, RiemannFlux, RiemannSolver, RoeAverage, SolverCapabilities,
};
use crate::state::{Conserved, GasModel, Primitive};

/// HLLC 求解器
#[derive(Debug, Clone)]
pub struct HllcSolver {
    gas: GasModel,
}

impl HllcSolver {
    /// 创建新的 HLLC 求解器
    pub fn new(gas: GasModel) -> Self {
        Self { gas }
    }

    /// Davis/Roe 波速估计
    #[inline]
    fn wave_speeds(&self, l: &Primitive, r: &Primitive) -> (f64, f64) {
        let cl = self.gas.sound_speed(l);
        let cr = self.gas.sound_speed(r);
        let avg = RoeAverage::new(&self.gas, l, r);
        ((l.u - cl).min(avg.u - avg.c), (r.u + cr).max(avg.u + avg.c))
    }

    /// 星区守恒状态
    #[inline]
    fn star_state(&self, w: &Primitive, u: &Conserved, s_k: f64, s_star: f64) -> Conserved {
        let fac = w.rho * (s_k - w.u) / (s_k - s_star);
        Conserved::new(
            fac,
            s_star * fac,
            w.v * fac,
            fac * (u.rho_e / w.rho + (s_star - w.u) * (s_star + w.p / (w.rho * (s_k - w.u)))),
        )
    }
}

impl RiemannSolver for HllcSolver {
    fn name(&self) -> &'static str {
        "HLLC"
    }

    fn kind(&self) -> FluxKind {
        FluxKind::Hllc
    }

    fn capabilities(&self) -> SolverCapabilities {
        SolverCapabilities {
            has_entropy_fix: false,
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
        let (s_l, s_r) = self.wave_speeds(l, r);
        let max_speed = s_l.abs().max(s_r.abs());

        if s_l > 0.0 {
            return Ok(RiemannFlux::new(fl, max_speed));
        }
        if s_r < 0.0 {
            return Ok(RiemannFlux::new(fr, max_speed));
        }

        let denom = l.rho * (s_l - l.u) - r.rho * (s_r - r.u);
        let s_star = (r.p - l.p + ul.rho_u * (s_l - l.u) - ur.rho_u * (s_r - r.u)) / denom;
        if !s_star.is_finite() {
            return Err(RiemannError::Numerical {
                message: "HLLC 接触波速无效".to_string(),
            });
        }

        let flux = if s_star >= 0.0 {
            fl + (self.star_state(l, &ul, s_l, s_star) - ul) * s_l
        } else {
            fr + (self.star_state(r, &ur, s_r, s_star) - ur) * s_r
        };
        Ok(RiemannFlux::new(flux, max_speed))
    }
}
