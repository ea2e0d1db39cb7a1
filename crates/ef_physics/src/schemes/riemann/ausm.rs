// crates/ef_physics/src/schemes/riemann/ausm.rs

//! AUSM 族求解器（Wada & Liou）
//!
//! 对流项与压力项分别迎风：
//! ```text
//! (ρu)_{1/2} = u⁺_L ρ_L + u⁻_R ρ_R
//! p_{1/2}    = p⁺_L + p⁻_R
//! ```
//! 速度分裂以 c_m = max(c_L, c_R) 为参考声速，并按 α = 2(p/ρ)_K / ((p/ρ)_L + (p/ρ)_R) 加权。
//!
//! - [`AusmdSolver`]: 动量通量为通量差分形式 (AUSMD)
//! - [`AusmdvSolver`]: 动量通量在 AUSMV 与 AUSMD 之间按压力跳跃切换，并对声速点做熵修正

use super::traits::{FluxKind, RiemannError, RiemannFlux, RiemannSolver, SolverCapabilities};
use crate::state::{Conserved, GasModel, Primitive};

/// 左右分裂量
#[derive(Debug, Clone, Copy)]
struct AusmSplit {
    u_plus: f64,
    u_minus: f64,
    p_plus: f64,
    p_minus: f64,
    cl: f64,
    cr: f64,
}

fn split(gas: &GasModel, l: &Primitive, r: &Primitive) -> AusmSplit {
    let cl = gas.sound_speed(l);
    let cr = gas.sound_speed(r);
    let cm = cl.max(cr);
    let (pl_rho, pr_rho) = (l.p / l.rho, r.p / r.rho);
    let alpha_l = 2.0 * pl_rho / (pl_rho + pr_rho);
    let alpha_r = 2.0 * pr_rho / (pl_rho + pr_rho);

    let (u_plus, p_plus) = if l.u.abs() < cm {
        let a = l.u + cm;
        (
            0.25 * alpha_l * a * a / cm + 0.5 * (1.0 - alpha_l) * (l.u + l.u.abs()),
            0.25 * l.p * a * a / (cm * cm) * (2.0 - l.u / cm),
        )
    } else if l.u > 0.0 {
        (l.u, l.p)
    } else {
        (0.0, 0.0)
    };

    let (u_minus, p_minus) = if r.u.abs() < cm {
        let a = r.u - cm;
        (
            -0.25 * alpha_r * a * a / cm + 0.5 * (1.0 - alpha_r) * (r.u - r.u.abs()),
            0.25 * r.p * a * a / (cm * cm) * (2.0 + r.u / cm),
        )
    } else if r.u < 0.0 {
        (r.u, r.p)
    } else {
        (0.0, 0.0)
    };

    AusmSplit {
        u_plus,
        u_minus,
        p_plus,
        p_minus,
        cl,
        cr,
    }
}

/// 以质量通量迎风的输运量：0.5 (ṁ (φ_R + φ_L) - |ṁ| (φ_R - φ_L))
#[inline]
fn upwind(mass: f64, phi_l: f64, phi_r: f64) -> f64 {
    0.5 * (mass * (phi_r + phi_l) - mass.abs() * (phi_r - phi_l))
}

/// AUSMD 求解器
#[derive(Debug, Clone)]
pub struct AusmdSolver {
    gas: GasModel,
}

impl AusmdSolver {
    /// 创建求解器
    pub fn new(gas: GasModel) -> Self {
        Self { gas }
    }
}

impl RiemannSolver for AusmdSolver {
    fn name(&self) -> &'static str {
        "AUSMD"
    }

    fn kind(&self) -> FluxKind {
        FluxKind::Ausmd
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
        let s = split(&self.gas, l, r);
        let mass = s.u_plus * l.rho + s.u_minus * r.rho;
        let hl = self.gas.total_enthalpy(l);
        let hr = self.gas.total_enthalpy(r);
        let flux = Conserved::new(
            mass,
            upwind(mass, l.u, r.u) + s.p_plus + s.p_minus,
            upwind(mass, l.v, r.v),
            upwind(mass, hl, hr),
        );
        Ok(RiemannFlux::new(flux, (l.u.abs() + s.cl).max(r.u.abs() + s.cr)))
    }
}

/// AUSMDV 求解器
#[derive(Debug, Clone)]
pub struct AusmdvSolver {
    gas: GasModel,
}

impl AusmdvSolver {
    /// 压力跳跃切换系数
    const SWITCH_K: f64 = 10.0;

    /// 创建求解器
    pub fn new(gas: GasModel) -> Self {
        Self { gas }
    }
}

impl RiemannSolver for AusmdvSolver {
    fn name(&self) -> &'static str {
        "AUSMDV"
    }

    fn kind(&self) -> FluxKind {
        FluxKind::Ausmdv
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
        let s = split(&self.gas, l, r);
        let mass = s.u_plus * l.rho + s.u_minus * r.rho;
        let hl = self.gas.total_enthalpy(l);
        let hr = self.gas.total_enthalpy(r);

        let switch = (Self::SWITCH_K * (r.p - l.p).abs() / l.p.min(r.p)).min(1.0);
        let ausmv = l.rho * l.u * s.u_plus + r.rho * r.u * s.u_minus;
        let ausmd = upwind(mass, l.u, r.u);
        let momentum = 0.5 * (1.0 + switch) * ausmv + 0.5 * (1.0 - switch) * ausmd;

        let mut flux = Conserved::new(
            mass,
            momentum + s.p_plus + s.p_minus,
            upwind(mass, l.v, r.v),
            upwind(mass, hl, hr),
        );

        // 声速点熵修正：仅一族声波跨越零时生效
        let expansion_1 = l.u - s.cl < 0.0 && r.u - s.cr > 0.0;
        let expansion_4 = l.u + s.cl < 0.0 && r.u + s.cr > 0.0;
        let jump = Conserved::new(
            r.rho - l.rho,
            r.rho * r.u - l.rho * l.u,
            r.rho * r.v - l.rho * l.v,
            r.rho * hr - l.rho * hl,
        );
        if expansion_1 && !expansion_4 {
            flux -= jump * (0.125 * ((r.u - s.cr) - (l.u - s.cl)));
        } else if expansion_4 && !expansion_1 {
            flux -= jump * (0.125 * ((r.u + s.cr) - (l.u + s.cl)));
        }

        Ok(RiemannFlux::new(flux, (l.u.abs() + s.cl).max(r.u.abs() + s.cr)))
    }
}
