// crates/ef_physics/src/boundary/ghost.rs

//! 幽灵状态计算
//!
//! 边界面上的外部状态按边界类型构造，随后与内部状态一起
//! 交给黎曼求解器，如同普通相邻单元。内部单元状态从不被修改。
//!
//! # 公式
//!
//! 记 n 为外法向，u_n = u·n：
//!
//! | 类型 | 幽灵状态 |
//! |------|---------|
//! | SlipWall | (ρ, u - 2 u_n n, p) |
//! | Wall | (ρ 或 p/T_w, -u, p) |
//! | Inflow | 来流 |
//! | Outflow | 内部状态 |
//! | PressureOutflow | (ρ, u, p_b)，超音速出流时 p 取内部值 |
//! | Characteristic | 线化黎曼不变量按波速符号选取 |
//! | ExactSolution | 面心处精确解 |

use glam::DVec2;

use super::types::BoundaryCondition;
use crate::error::PhysicsError;
use crate::state::{GasModel, Primitive};

/// 幽灵状态计算的几何与时间上下文
#[derive(Debug, Clone, Copy)]
pub struct GhostContext {
    /// 面外法向（单位向量）
    pub normal: DVec2,
    /// 面中心
    pub center: DVec2,
    /// 当前时间
    pub time: f64,
}

impl GhostContext {
    /// 创建上下文
    pub fn new(normal: DVec2, center: DVec2, time: f64) -> Self {
        Self { normal, center, time }
    }
}

/// 幽灵状态计算器
#[derive(Debug, Clone, Copy, Default)]
pub struct GhostStateCalculator {
    gas: GasModel,
}

impl GhostStateCalculator {
    /// 创建计算器
    pub fn new(gas: GasModel) -> Self {
        Self { gas }
    }

    /// 气体模型
    pub fn gas(&self) -> &GasModel {
        &self.gas
    }

    /// 计算幽灵单元的原始状态
    ///
    /// 周期边界已在网格中配对为内部面，到达此处说明网格与边界配置不一致。
    pub fn ghost_state(
        &self,
        bc: &BoundaryCondition,
        interior: &Primitive,
        ctx: &GhostContext,
    ) -> Result<Primitive, PhysicsError> {
        let n = ctx.normal;
        let ghost = match bc {
            BoundaryCondition::SlipWall => {
                let v = reflect_velocity(interior.velocity(), n);
                Primitive::new(interior.rho, v.x, v.y, interior.p)
            }
            BoundaryCondition::Wall { temperature } => {
                let rho = match temperature {
                    Some(t) => interior.p / t,
                    None => interior.rho,
                };
                Primitive::new(rho, -interior.u, -interior.v, interior.p)
            }
            BoundaryCondition::Inflow { state } => *state,
            BoundaryCondition::Outflow => *interior,
            BoundaryCondition::PressureOutflow { back_pressure } => {
                let un = interior.normal_velocity(n);
                let p = if un >= self.gas.sound_speed(interior) {
                    interior.p
                } else {
                    *back_pressure
                };
                Primitive::new(interior.rho, interior.u, interior.v, p)
            }
            BoundaryCondition::Characteristic { freestream } => self.characteristic(interior, freestream, n),
            BoundaryCondition::ExactSolution { solution } => solution.primitive(ctx.center, ctx.time)?,
            BoundaryCondition::Periodic { .. } => {
                return Err(PhysicsError::invalid_mesh("周期边界面未配对，不能计算幽灵状态"));
            }
        };
        Ok(ghost)
    }

    /// 特征远场边界
    ///
    /// 以来流 (ρ̄, c̄) 线化，在旋转坐标系中使用
    /// - 熵 s = p - c̄²ρ 与切向速度 u_t，波速 u_n
    /// - 声学不变量 R± = p ± ρ̄c̄ u_n，波速 u_n ± c̄
    ///
    /// 波速为正（离开计算域）时取内部值，否则取来流值。
    /// 内部状态远离来流时线化结果可能失去正性，此时按法向来流速度
    /// 退回迎风侧的完整状态。
    fn characteristic(&self, interior: &Primitive, freestream: &Primitive, n: DVec2) -> Primitive {
        let wi = interior.rotate(n);
        let wf = freestream.rotate(n);
        let c = self.gas.sound_speed(freestream);
        let rc = freestream.rho * c;
        let pick = |speed: f64, inner: f64, outer: f64| if speed > 0.0 { inner } else { outer };

        let un = wf.u;
        let entropy = pick(un, wi.p - c * c * wi.rho, wf.p - c * c * wf.rho);
        let tangential = pick(un, wi.v, wf.v);
        let r_plus = pick(un + c, wi.p + rc * wi.u, wf.p + rc * wf.u);
        let r_minus = pick(un - c, wi.p - rc * wi.u, wf.p - rc * wf.u);

        let p = 0.5 * (r_plus + r_minus);
        let u = 0.5 * (r_plus - r_minus) / rc;
        let rho = (p - entropy) / (c * c);
        let ghost = Primitive::new(rho, u, tangential, p).unrotate(n);
        if ghost.is_physical() {
            return ghost;
        }

        let fallback = if un > 0.0 { *interior } else { *freestream };
        log::debug!(
            "特征边界幽灵状态非物理 (ρ={:.3e}, p={:.3e})，退回{}状态",
            ghost.rho,
            ghost.p,
            if un > 0.0 { "内部" } else { "来流" }
        );
        fallback
    }
}

/// 关于法向反射速度
#[inline]
pub fn reflect_velocity(velocity: DVec2, normal: DVec2) -> DVec2 {
    let un = velocity.dot(normal);
    velocity - 2.0 * un * normal
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exact::{ExactFunction, ExactSolution};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn ctx(normal: DVec2) -> GhostContext {
        GhostContext::new(normal, DVec2::ZERO, 0.0)
    }

    #[test]
    fn test_slip_wall_mirrors_normal_velocity() {
        let calc = GhostStateCalculator::default();
        let n = DVec2::new(0.6, 0.8);
        let w = Primitive::new(1.2, 0.3, -0.4, 0.9);
        let g = calc.ghost_state(&BoundaryCondition::slip_wall(), &w, &ctx(n)).unwrap();

        assert!(approx_eq(g.normal_velocity(n), -w.normal_velocity(n)));
        let t = DVec2::new(-n.y, n.x);
        assert!(approx_eq(g.velocity().dot(t), w.velocity().dot(t)));
        assert_eq!(g.rho, w.rho);
        assert_eq!(g.p, w.p);
    }

    #[test]
    fn test_wall_reverses_velocity() {
        let calc = GhostStateCalculator::default();
        let w = Primitive::new(1.0, 0.5, 0.25, 2.0);
        let g = calc.ghost_state(&BoundaryCondition::wall(), &w, &ctx(DVec2::X)).unwrap();
        assert_eq!((g.u, g.v), (-0.5, -0.25));

        let g = calc
            .ghost_state(&BoundaryCondition::isothermal_wall(4.0), &w, &ctx(DVec2::X))
            .unwrap();
        assert!(approx_eq(g.p / g.rho, 4.0));
    }

    #[test]
    fn test_pressure_outflow() {
        let calc = GhostStateCalculator::default();
        let bc = BoundaryCondition::pressure_outflow(0.7);
        let sub = Primitive::new(1.0, 0.2, 0.1, 1.0);
        let g = calc.ghost_state(&bc, &sub, &ctx(DVec2::X)).unwrap();
        assert_eq!((g.rho, g.u, g.v, g.p), (1.0, 0.2, 0.1, 0.7));

        let sup = Primitive::new(1.0, 3.0, 0.0, 1.0);
        let g = calc.ghost_state(&bc, &sup, &ctx(DVec2::X)).unwrap();
        assert_eq!(g.p, 1.0);
    }

    #[test]
    fn test_characteristic_freestream_is_fixed_point() {
        let calc = GhostStateCalculator::default();
        let fs = Primitive::new(1.0, 0.5, 0.1, 1.0 / 1.4);
        let bc = BoundaryCondition::characteristic(fs);
        for n in [DVec2::X, DVec2::NEG_X, DVec2::new(0.6, -0.8)] {
            let g = calc.ghost_state(&bc, &fs, &ctx(n)).unwrap();
            assert!((g.rho - fs.rho).abs() < 1e-12);
            assert!((g.u - fs.u).abs() < 1e-12);
            assert!((g.v - fs.v).abs() < 1e-12);
            assert!((g.p - fs.p).abs() < 1e-12);
        }
    }

    #[test]
    fn test_characteristic_supersonic_selection() {
        let calc = GhostStateCalculator::default();
        let fs = Primitive::new(1.0, 3.0, 0.0, 1.0 / 1.4);
        let interior = Primitive::new(1.1, 2.9, 0.05, 0.8);
        let bc = BoundaryCondition::characteristic(fs);

        // 超音速入流：全部取来流
        let g = calc.ghost_state(&bc, &interior, &ctx(DVec2::NEG_X)).unwrap();
        assert!((g.rho - fs.rho).abs() < 1e-12 && (g.p - fs.p).abs() < 1e-12);

        // 超音速出流：全部取内部
        let g = calc.ghost_state(&bc, &interior, &ctx(DVec2::X)).unwrap();
        assert!((g.rho - interior.rho).abs() < 1e-12);
        assert!((g.u - interior.u).abs() < 1e-12);
        assert!((g.p - interior.p).abs() < 1e-12);
    }

    #[test]
    fn test_characteristic_keeps_positivity_far_from_freestream() {
        let calc = GhostStateCalculator::default();
        let fs = Primitive::new(1.0, 0.0, 0.0, 1.0 / 1.4);
        let bc = BoundaryCondition::characteristic(fs);
        // 低压强入流：线化后 p = (p_i - 3 + p_∞) / 2 < 0
        let interior = Primitive::new(1.0, -3.0, 0.0, 0.01);

        let g = calc.ghost_state(&bc, &interior, &ctx(DVec2::X)).unwrap();
        assert!(g.is_physical());
        assert_eq!((g.rho, g.u, g.v, g.p), (fs.rho, fs.u, fs.v, fs.p));

        // 出流来流：退回内部状态
        let fs_out = Primitive::new(1.0, 0.5, 0.0, 1.0 / 1.4);
        let g = calc
            .ghost_state(&BoundaryCondition::characteristic(fs_out), &interior, &ctx(DVec2::X))
            .unwrap();
        assert!(g.is_physical());
    }

    #[test]
    fn test_exact_and_periodic() {
        let gas = GasModel::default();
        let calc = GhostStateCalculator::new(gas);
        let solution = ExactSolution::new(ExactFunction::SineWave, gas);
        let w = Primitive::new(1.0, 0.0, 0.0, 1.0);
        let c = GhostContext::new(DVec2::X, DVec2::new(0.25, 0.25), 0.0);
        let g = calc.ghost_state(&BoundaryCondition::exact(solution), &w, &c).unwrap();
        assert!((g.rho - 2.1).abs() < 1e-12);

        assert!(calc
            .ghost_state(&BoundaryCondition::periodic(DVec2::X), &w, &c)
            .is_err());
    }
}
