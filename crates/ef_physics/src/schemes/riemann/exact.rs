// crates/ef_physics/src/schemes/riemann/exact.rs

//! 精确黎曼求解器与 Godunov 通量
//!
//! 一维 Euler 方程的精确解：Newton 迭代求星区压力，
//! 再按相似变量 s = x/t 采样激波、稀疏波和接触间断结构。
//!
//! # 算法
//!
//! 1. 初值：PVRS 近似，视压力比切换到双稀疏波或双激波近似
//! 2. Newton 迭代 f_L(p) + f_R(p) + Δu = 0，相对变化小于 1e-12 停止
//! 3. u* = (u_L + u_R)/2 + (f_R(p*) - f_L(p*))/2
//!
//! 左右两侧同时产生稀疏波并出现真空时视为数值错误。

use super::traits::{RiemannError, RiemannFlux, RiemannSolver, SolverCapabilities, FluxKind};
use crate::state::{Conserved, GasModel, Primitive};

const MAX_NEWTON_ITER: usize = 100;
const NEWTON_TOL: f64 = 1e-12;
const MIN_PRESSURE: f64 = 1e-12;

/// 采样结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiemannSample {
    /// 密度
    pub rho: f64,
    /// 法向速度
    pub u: f64,
    /// 压力
    pub p: f64,
    /// 采样点是否位于接触间断左侧
    pub left_of_contact: bool,
}

/// 星区状态
#[derive(Debug, Clone, Copy)]
pub struct StarState {
    /// 星区压力
    pub p: f64,
    /// 星区速度
    pub u: f64,
}

/// 一维精确黎曼求解器
#[derive(Debug, Clone, Copy)]
pub struct ExactRiemann {
    gas: GasModel,
}

impl ExactRiemann {
    /// 创建求解器
    pub fn new(gas: GasModel) -> Self {
        Self { gas }
    }

    /// 单侧压力函数及其导数
    #[inline]
    fn pressure_function(&self, p: f64, rho_k: f64, p_k: f64, c_k: f64) -> (f64, f64) {
        let g = self.gas.gamma;
        if p > p_k {
            // 激波
            let a = 2.0 / ((g + 1.0) * rho_k);
            let b = (g - 1.0) / (g + 1.0) * p_k;
            let q = (a / (p + b)).sqrt();
            let f = (p - p_k) * q;
            let df = (1.0 - 0.5 * (p - p_k) / (b + p)) * q;
            (f, df)
        } else {
            // 稀疏波
            let ratio = p / p_k;
            let f = 2.0 * c_k / (g - 1.0) * (ratio.powf((g - 1.0) / (2.0 * g)) - 1.0);
            let df = 1.0 / (rho_k * c_k) * ratio.powf(-(g + 1.0) / (2.0 * g));
            (f, df)
        }
    }

    /// 星区压力初值
    fn initial_guess(&self, l: &Primitive, r: &Primitive, cl: f64, cr: f64) -> f64 {
        let g = self.gas.gamma;
        let p_pv = (0.5 * (l.p + r.p) - 0.125 * (r.u - l.u) * (l.rho + r.rho) * (cl + cr)).max(0.0);
        let p_min = l.p.min(r.p);
        let p_max = l.p.max(r.p);

        if p_max / p_min <= 2.0 && (p_min..=p_max).contains(&p_pv) {
            return p_pv.max(MIN_PRESSURE);
        }
        if p_pv < p_min {
            // 双稀疏波近似
            let z = (g - 1.0) / (2.0 * g);
            let num = cl + cr - 0.5 * (g - 1.0) * (r.u - l.u);
            let den = cl / l.p.powf(z) + cr / r.p.powf(z);
            (num / den).powf(1.0 / z).max(MIN_PRESSURE)
        } else {
            // 双激波近似
            let gl = (2.0 / ((g + 1.0) * l.rho) / (p_pv + (g - 1.0) / (g + 1.0) * l.p)).sqrt();
            let gr = (2.0 / ((g + 1.0) * r.rho) / (p_pv + (g - 1.0) / (g + 1.0) * r.p)).sqrt();
            ((gl * l.p + gr * r.p - (r.u - l.u)) / (gl + gr)).max(MIN_PRESSURE)
        }
    }

    /// 求星区压力与速度
    pub fn star_state(&self, l: &Primitive, r: &Primitive) -> Result<StarState, RiemannError> {
        let g = self.gas.gamma;
        let cl = self.gas.sound_speed(l);
        let cr = self.gas.sound_speed(r);

        if 2.0 / (g - 1.0) * (cl + cr) <= r.u - l.u {
            return Err(RiemannError::Numerical {
                message: "精确黎曼解产生真空".to_string(),
            });
        }

        let du = r.u - l.u;
        let mut p = self.initial_guess(l, r, cl, cr);
        let mut converged = false;
        for _ in 0..MAX_NEWTON_ITER {
            let (fl, dfl) = self.pressure_function(p, l.rho, l.p, cl);
            let (fr, dfr) = self.pressure_function(p, r.rho, r.p, cr);
            let p_new = (p - (fl + fr + du) / (dfl + dfr)).max(MIN_PRESSURE);
            let change = 2.0 * (p_new - p).abs() / (p_new + p);
            p = p_new;
            if change < NEWTON_TOL {
                converged = true;
                break;
            }
        }
        if !converged || !p.is_finite() {
            return Err(RiemannError::Numerical {
                message: format!("星区压力 Newton 迭代未收敛 (p={p:.6e})"),
            });
        }

        let (fl, _) = self.pressure_function(p, l.rho, l.p, cl);
        let (fr, _) = self.pressure_function(p, r.rho, r.p, cr);
        Ok(StarState {
            p,
            u: 0.5 * (l.u + r.u) + 0.5 * (fr - fl),
        })
    }

    /// 在相似变量 s = x/t 处采样
    pub fn sample(&self, l: &Primitive, r: &Primitive, s: f64) -> Result<RiemannSample, RiemannError> {
        let star = self.star_state(l, r)?;
        Ok(self.sample_with_star(l, r, &star, s))
    }

    /// 给定星区状态采样
    pub fn sample_with_star(&self, l: &Primitive, r: &Primitive, star: &StarState, s: f64) -> RiemannSample {
        let g = self.gas.gamma;
        let g1 = (g - 1.0) / (g + 1.0);
        let (pm, um) = (star.p, star.u);

        if s <= um {
            let cl = self.gas.sound_speed(l);
            let (rho, u, p) = if pm > l.p {
                // 左激波
                let ratio = pm / l.p;
                let sl = l.u - cl * ((g + 1.0) / (2.0 * g) * ratio + (g - 1.0) / (2.0 * g)).sqrt();
                if s <= sl {
                    (l.rho, l.u, l.p)
                } else {
                    (l.rho * (ratio + g1) / (ratio * g1 + 1.0), um, pm)
                }
            } else {
                // 左稀疏波
                let shl = l.u - cl;
                let cml = cl * (pm / l.p).powf((g - 1.0) / (2.0 * g));
                let stl = um - cml;
                if s <= shl {
                    (l.rho, l.u, l.p)
                } else if s > stl {
                    (l.rho * (pm / l.p).powf(1.0 / g), um, pm)
                } else {
                    let u = 2.0 / (g + 1.0) * (cl + (g - 1.0) / 2.0 * l.u + s);
                    let c = 2.0 / (g + 1.0) * (cl + (g - 1.0) / 2.0 * (l.u - s));
                    let rho = l.rho * (c / cl).powf(2.0 / (g - 1.0));
                    let p = l.p * (c / cl).powf(2.0 * g / (g - 1.0));
                    (rho, u, p)
                }
            };
            RiemannSample { rho, u, p, left_of_contact: true }
        } else {
            let cr = self.gas.sound_speed(r);
            let (rho, u, p) = if pm > r.p {
                // 右激波
                let ratio = pm / r.p;
                let sr = r.u + cr * ((g + 1.0) / (2.0 * g) * ratio + (g - 1.0) / (2.0 * g)).sqrt();
                if s >= sr {
                    (r.rho, r.u, r.p)
                } else {
                    (r.rho * (ratio + g1) / (ratio * g1 + 1.0), um, pm)
                }
            } else {
                // 右稀疏波
                let shr = r.u + cr;
                let cmr = cr * (pm / r.p).powf((g - 1.0) / (2.0 * g));
                let str_ = um + cmr;
                if s >= shr {
                    (r.rho, r.u, r.p)
                } else if s <= str_ {
                    (r.rho * (pm / r.p).powf(1.0 / g), um, pm)
                } else {
                    let u = 2.0 / (g + 1.0) * (-cr + (g - 1.0) / 2.0 * r.u + s);
                    let c = 2.0 / (g + 1.0) * (cr - (g - 1.0) / 2.0 * (r.u - s));
                    let rho = r.rho * (c / cr).powf(2.0 / (g - 1.0));
                    let p = r.p * (c / cr).powf(2.0 * g / (g - 1.0));
                    (rho, u, p)
                }
            };
            RiemannSample { rho, u, p, left_of_contact: false }
        }
    }
}

/// Godunov 通量（界面处精确黎曼解）
#[derive(Debug, Clone)]
pub struct GodunovSolver {
    gas: GasModel,
    exact: ExactRiemann,
}

impl GodunovSolver {
    /// 创建求解器
    pub fn new(gas: GasModel) -> Self {
        Self {
            gas,
            exact: ExactRiemann::new(gas),
        }
    }
}

impl RiemannSolver for GodunovSolver {
    fn name(&self) -> &'static str {
        "Godunov"
    }

    fn kind(&self) -> FluxKind {
        FluxKind::Godunov
    }

    fn capabilities(&self) -> SolverCapabilities {
        SolverCapabilities {
            has_entropy_fix: false,
            resolves_contact: true,
            exact: true,
            upwind: true,
        }
    }

    fn gas(&self) -> &GasModel {
        &self.gas
    }

    fn solve_rotated(&self, l: &Primitive, r: &Primitive) -> Result<RiemannFlux, RiemannError> {
        let sample = self.exact.sample(l, r, 0.0)?;
        let v = if sample.left_of_contact { l.v } else { r.v };
        let w = Primitive::new(sample.rho, sample.u, v, sample.p);
        let mass = w.rho * w.u;
        let flux = Conserved::new(
            mass,
            mass * w.u + w.p,
            mass * w.v,
            w.u * (self.gas.gamma / self.gas.gm1() * w.p + 0.5 * w.rho * (w.u * w.u + w.v * w.v)),
        );
        let max_speed = self
            .gas
            .spectral_radius(l, glam::DVec2::X)
            .max(self.gas.spectral_radius(r, glam::DVec2::X));
        Ok(RiemannFlux::new(flux, max_speed))
    }
}
