// crates/ef_physics/src/schemes/riemann/splitting.rs

//! 通量矢量分裂格式
//!
//! F = F⁺(U_L) + F⁻(U_R)，分裂满足 F⁺(U) + F⁻(U) = F(U)。
//!
//! - [`StegerWarmingSolver`]: 按特征值正负部分分裂
//! - [`VanLeerSolver`]: 按法向马赫数分裂，|M| < 1 时为光滑多项式

use super::traits::{rotated_flux, FluxKind, RiemannError, RiemannFlux, RiemannSolver, SolverCapabilities};
use crate::state::{Conserved, GasModel, Primitive};

/// Steger-Warming 求解器
#[derive(Debug, Clone)]
pub struct StegerWarmingSolver {
    gas: GasModel,
}

impl StegerWarmingSolver {
    /// 创建求解器
    pub fn new(gas: GasModel) -> Self {
        Self { gas }
    }

    /// 给定特征值 (λ₁, λ₂, λ₄) 的分裂通量
    #[inline]
    fn split(&self, w: &Primitive, c: f64, l1: f64, l2: f64, l4: f64) -> Conserved {
        let g = self.gas.gamma;
        let g2q = 0.5 / g;
        let mass = w.rho * g2q * (2.0 * self.gas.gm1() * l2 + l1 + l4);
        Conserved::new(
            mass,
            mass * w.u + (l4 - l1) * w.rho * c * g2q,
            mass * w.v,
            mass * 0.5 * (w.u * w.u + w.v * w.v)
                + (l4 - l1) * w.rho * c * w.u * g2q
                + (l4 + l1) * w.rho * c * c * g2q / self.gas.gm1(),
        )
    }
}

impl RiemannSolver for StegerWarmingSolver {
    fn name(&self) -> &'static str {
        "Steger-Warming"
    }

    fn kind(&self) -> FluxKind {
        FluxKind::StegerWarming
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
        let cl = self.gas.sound_speed(l);
        let cr = self.gas.sound_speed(r);
        let plus = self.split(l, cl, (l.u - cl).max(0.0), l.u.max(0.0), (l.u + cl).max(0.0));
        let minus = self.split(r, cr, (r.u - cr).min(0.0), r.u.min(0.0), (r.u + cr).min(0.0));
        Ok(RiemannFlux::new(plus + minus, (l.u.abs() + cl).max(r.u.abs() + cr)))
    }
}

/// Van Leer 求解器
#[derive(Debug, Clone)]
pub struct VanLeerSolver {
    gas: GasModel,
}

impl VanLeerSolver {
    /// 创建求解器
    pub fn new(gas: GasModel) -> Self {
        Self { gas }
    }

    /// 正通量 F⁺
    fn plus(&self, w: &Primitive) -> Conserved {
        let g = self.gas.gamma;
        let c = self.gas.sound_speed(w);
        let m = w.u / c;
        if m >= 1.0 {
            rotated_flux(&self.gas, w).0
        } else if m > -1.0 {
            let cx = self.gas.gm1() * w.u + 2.0 * c;
            let mass = 0.25 * w.rho * c * (m + 1.0) * (m + 1.0);
            Conserved::new(
                mass,
                mass * cx / g,
                mass * w.v,
                0.5 * mass * (cx * cx / (g * g - 1.0) + w.v * w.v),
            )
        } else {
            Conserved::ZERO
        }
    }

    /// 负通量 F⁻
    fn minus(&self, w: &Primitive) -> Conserved {
        let g = self.gas.gamma;
        let c = self.gas.sound_speed(w);
        let m = w.u / c;
        if m <= -1.0 {
            rotated_flux(&self.gas, w).0
        } else if m < 1.0 {
            let cx = self.gas.gm1() * w.u - 2.0 * c;
            let mass = -0.25 * w.rho * c * (1.0 - m) * (1.0 - m);
            Conserved::new(
                mass,
                mass * cx / g,
                mass * w.v,
                0.5 * mass * (cx * cx / (g * g - 1.0) + w.v * w.v),
            )
        } else {
            Conserved::ZERO
        }
    }
}

impl RiemannSolver for VanLeerSolver {
    fn name(&self) -> &'static str {
        "Van Leer"
    }

    fn kind(&self) -> FluxKind {
        FluxKind::VanLeer
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
        let a = self.gas.spectral_radius(l, glam::DVec2::X).max(self.gas.spectral_radius(r, glam::DVec2::X));
        Ok(RiemannFlux::new(self.plus(l) + self.minus(r), a))
    }
}
