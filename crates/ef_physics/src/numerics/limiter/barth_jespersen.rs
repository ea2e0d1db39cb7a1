// crates/ef_physics/src/numerics/limiter/barth_jespersen.rs

//! Barth-Jespersen 限制器
//!
//! 面增量不得越过单元与相邻单元（含幽灵状态）的极值：
//!
//! ```text
//! α_f = clamp(Δ_allowed / Δ_f, 0, 1)
//! ```
//!
//! Δ_allowed 为 Δ_f 方向上的 Δ_max 或 Δ_min。单元限制因子由重构器取各面最小值。
//!
//! 重构对 ρ、u、v、p 逐量限制，各量量级可差数个数量级（压力可达 1e5），
//! 因此零增量判据按 ε (1 + |q_i|) 缩放。
//!
//! 参考：Barth & Jespersen (1989), AIAA Paper 89-0366。

use super::traits::{LimiterContext, SlopeLimiter};

/// Barth-Jespersen 限制器
#[derive(Debug, Clone, Copy)]
pub struct BarthJespersen {
    rel_tol: f64,
}

impl Default for BarthJespersen {
    fn default() -> Self {
        Self::new()
    }
}

impl BarthJespersen {
    /// 创建限制器，相对容差 1e-12
    pub fn new() -> Self {
        Self { rel_tol: 1e-12 }
    }

    #[inline]
    fn tolerance(&self, ctx: &LimiterContext) -> f64 {
        self.rel_tol * (1.0 + ctx.cell_value.abs())
    }
}

impl SlopeLimiter for BarthJespersen {
    fn compute_limiter(&self, ctx: &LimiterContext) -> f64 {
        let tol = self.tolerance(ctx);
        if ctx.is_delta_zero(tol) {
            return 1.0;
        }
        // 单元已是该方向上的极值
        let allowed = ctx.allowed_delta();
        if allowed.abs() <= tol {
            return 0.0;
        }
        (allowed / ctx.face_delta).clamp(0.0, 1.0)
    }

    fn name(&self) -> &'static str {
        "BarthJespersen"
    }
}
