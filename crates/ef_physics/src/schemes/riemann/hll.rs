// crates/ef_physics/src/schemes/riemann/hll.rs

//! HLL 族求解器
//!
//! 两波近似：
//! ```text
//! F = F_L                                           S_L > 0
//! F = (S_R F_L - S_L F_R + S_L S_R (U_R - U_L)) / (S_R - S_L)
//! F = F_R                                           S_R < 0
//! ```
//! - [`HllSolver`]: S_L = min(u_L - c_L, ũ - c̃)，S_R = max(u_R + c_R, ũ + c̃)（Davis/Roe）
//! - [`HlleSolver`]: Einfeldt 波速，d̄² = (√ρ_L c_L² + √ρ_R c_R²)/(√ρ_L + √ρ_R) + η₂ (u_R - u_L)²

use super::traits::{
    rotated_flux, FluxKind, RiemannError, RiemannFlux, RiemannSolver, RoeAverage, SolverCapabilities,
};
use crate::state::{Conserved, GasModel, Primitive};

/// 给定波速的 HLL 通量
#[inline]
pub(crate) fn hll_flux(
    fl: Conserved,
    fr: Conserved,
    ul: Conserved,
    ur: Conserved,
    s_l: f64,
    s_r: f64,
) -> Result<Conserved, RiemannError> {
    if s_l > 0.0 {
        return Ok(fl);
    }
    if s_r < 0.0 {
        return Ok(fr);
    }
    let width = s_r - s_l;
    if !(width > 0.0) {
        return Err(RiemannError::Numerical {
            message: format!("HLL 波速区间退化 (S_L={s_l:.3e}, S_R={s_r:.3e})"),
        });
    }
    Ok((fl * s_r - fr * s_l + (ur - ul) * (s_l * s_r)) * (1.0 / width))
}

/// HLL 求解器（Davis/Roe 波速）
#[derive(Debug, Clone)]
pub struct HllSolver {
    gas: GasModel,
}

impl HllSolver {
    /// 创建求解器
    pub fn new(gas: GasModel) -> Self {
        Self { gas }
    }
}

impl RiemannSolver for HllSolver {
    fn name(&self) -> &'static str {
        "HLL"
    }

    fn kind(&self) -> FluxKind {
        FluxKind::Hll
    }

    fn capabilities(&self) -> SolverCapabilities {
        SolverCapabilities {
            has_entropy_fix: false,
            resolves_contact: false,
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
        let cl = self.gas.sound_speed(l);
        let cr = self.gas.sound_speed(r);
        let avg = RoeAverage::new(&self.gas, l, r);
        let s_r = (r.u + cr).max(avg.u + avg.c);
        let s_l = (l.u - cl).min(avg.u - avg.c);
        let flux = hll_flux(fl, fr, ul, ur, s_l, s_r)?;
        Ok(RiemannFlux::new(flux, s_l.abs().max(s_r.abs())))
    }
}

/// HLLE 求解器（Einfeldt 波速）
#[derive(Debug, Clone)]
pub struct HlleSolver {
    gas: GasModel,
}

impl HlleSolver {
    /// 创建求解器
    pub fn new(gas: GasModel) -> Self {
        Self { gas }
    }

    /// Einfeldt 波速估计
    #[inline]
    pub fn einfeldt_speeds(&self, l: &Primitive, r: &Primitive) -> (f64, f64) {
        let cl = self.gas.sound_speed(l);
        let cr = self.gas.sound_speed(r);
        let sl = l.rho.sqrt();
        let sr = r.rho.sqrt();
        let sum = sl + sr;
        let u_m = (sl * l.u + sr * r.u) / sum;
        let eta2 = 0.5 * sl * sr / (sum * sum);
        let du = r.u - l.u;
        let d = ((sl * cl * cl + sr * cr * cr) / sum + eta2 * du * du).sqrt();
        ((l.u - cl).min(u_m - d), (r.u + cr).max(u_m + d))
    }
}

impl RiemannSolver for HlleSolver {
    fn name(&self) -> &'static str {
        "HLLE"
    }

    fn kind(&self) -> FluxKind {
        FluxKind::Hlle
    }

    fn capabilities(&self) -> SolverCapabilities {
        SolverCapabilities {
            has_entropy_fix: false,
            resolves_contact: false,
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
        let (s_l, s_r) = self.einfeldt_speeds(l, r);
        let flux = hll_flux(fl, fr, ul, ur, s_l, s_r)?;
        Ok(RiemannFlux::new(flux, s_l.abs().max(s_r.abs())))
    }
}
