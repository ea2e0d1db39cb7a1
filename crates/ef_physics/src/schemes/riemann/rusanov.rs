// crates/ef_physics/src/schemes/riemann/rusanov.rs

//! Rusanov（局部 Lax-Friedrichs）与中心通量
//!
//! Rusanov 使用单一最大波速 a = max(|u_L| + c_L, |u_R| + c_R)：
//! F = (F_L + F_R)/2 - a (U_R - U_L)/2。
//! 耗散最大、最鲁棒，适合强间断。
//!
//! 中心通量 F = (F_L + F_R)/2 不含耗散，仅用于光滑问题与验证。

use super::traits::{rotated_flux, FluxKind, RiemannError, RiemannFlux, RiemannSolver, SolverCapabilities};
use crate::state::{GasModel, Primitive};

/// Rusanov 求解器
#[derive(Debug, Clone)]
pub struct RusanovSolver {
    gas: GasModel,
}

impl RusanovSolver {
    /// 创建求解器
    pub fn new(gas: GasModel) -> Self {
        Self { gas }
    }
}

impl RiemannSolver for RusanovSolver {
    fn name(&self) -> &'static str {
        "Rusanov"
    }

    fn kind(&self) -> FluxKind {
        FluxKind::LaxFriedrichs
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
        let a = (l.u.abs() + self.gas.sound_speed(l)).max(r.u.abs() + self.gas.sound_speed(r));
        let flux = (fl + fr) * 0.5 - (ur - ul) * (0.5 * a);
        Ok(RiemannFlux::new(flux, a))
    }
}

/// 中心通量
#[derive(Debug, Clone)]
pub struct CentralSolver {
    gas: GasModel,
}

impl CentralSolver {
    /// 创建求解器
    pub fn new(gas: GasModel) -> Self {
        Self { gas }
    }
}

impl RiemannSolver for CentralSolver {
    fn name(&self) -> &'static str {
        "Central"
    }

    fn kind(&self) -> FluxKind {
        FluxKind::Central
    }

    fn capabilities(&self) -> SolverCapabilities {
        SolverCapabilities::default()
    }

    fn gas(&self) -> &GasModel {
        &self.gas
    }

    fn solve_rotated(&self, l: &Primitive, r: &Primitive) -> Result<RiemannFlux, RiemannError> {
        let (fl, _) = rotated_flux(&self.gas, l);
        let (fr, _) = rotated_flux(&self.gas, r);
        let a = (l.u.abs() + self.gas.sound_speed(l)).max(r.u.abs() + self.gas.sound_speed(r));
        Ok(RiemannFlux::new((fl + fr) * 0.5, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rusanov_more_dissipative_than_central() {
        let gas = GasModel::default();
        let l = Primitive::new(1.0, 0.0, 0.0, 1.0);
        let r = Primitive::new(0.5, 0.0, 0.0, 0.5);
        let rus = RusanovSolver::new(gas).solve_rotated(&l, &r).unwrap();
        let cen = CentralSolver::new(gas).solve_rotated(&l, &r).unwrap();
        assert!(cen.flux.rho.abs() < 1e-15);
        assert!(rus.flux.rho > 0.0);
        assert_eq!(rus.max_wave_speed, gas.sound_speed(&l).max(gas.sound_speed(&r)));
    }
}
