// crates/ef_physics/src/numerics/limiter/venkatakrishnan.rs

//! Venkatakrishnan 限制器
//!
//! 光滑的梯度限制器，避免 Barth-Jespersen 的限制因子突变，
//! 有利于定常问题的残差收敛。
//!
//! 记 Δ₂ = Δ_f，Δ₁ = Δ_max（Δ₂ > 0）或 Δ_min（Δ₂ < 0）：
//!
//! ```text
//! α_f = min(1, [(Δ₁² + ε²) + 2Δ₂Δ₁] / [Δ₁² + 2Δ₂² + Δ₁Δ₂ + ε²])
//! ε²  = (K h)³
//! ```
//!
//! h 为单元特征长度。ε = 0 时重构值不越过邻居极值；ε > 0 允许
//! 在光滑区域出现 O(ε²) 的越界，换取光滑性。
//!
//! # K 参数选择
//! - 0.1-0.3: 强限制，适用于强激波
//! - 0.3-1.0: 中等限制，通用场景
//! - 1.0-5.0: 弱限制，适用于光滑流动
//!
//! # 参考文献
//! Venkatakrishnan, V. (1993). "On the accuracy of limiters and convergence to steady state solutions".
//! AIAA Paper 93-0880.

use super::traits::{LimiterContext, SlopeLimiter};

/// Venkatakrishnan 限制器
#[derive(Debug, Clone, Copy)]
pub struct Venkatakrishnan {
    k: f64,
    tol: f64,
}

impl Default for Venkatakrishnan {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Venkatakrishnan {
    /// 创建新的限制器
    #[inline]
    pub fn new(k: f64) -> Self {
        Self { k, tol: 1e-12 }
    }

    /// 获取 K 参数
    #[inline]
    pub fn k(&self) -> f64 {
        self.k
    }

    /// 给定单元特征长度的 ε²
    #[inline]
    pub fn eps_squared(&self, cell_length: f64) -> f64 {
        let kh = self.k * cell_length;
        kh * kh * kh
    }

    /// 光滑限制函数
    #[inline]
    fn phi(&self, d1: f64, d2: f64, eps2: f64) -> f64 {
        let numerator = d1 * d1 + eps2 + 2.0 * d2 * d1;
        let denominator = d1 * d1 + 2.0 * d2 * d2 + d1 * d2 + eps2;
        if denominator.abs() < self.tol {
            1.0
        } else {
            (numerator / denominator).min(1.0)
        }
    }
}

impl SlopeLimiter for Venkatakrishnan {
    #[inline]
    fn compute_limiter(&self, ctx: &LimiterContext) -> f64 {
        if ctx.is_delta_zero(self.tol) {
            return 1.0;
        }
        let eps2 = self.eps_squared(ctx.cell_length);
        let d2 = ctx.face_delta;
        let d1 = ctx.allowed_delta();
        self.phi(d1, d2, eps2).max(0.0)
    }

    #[inline]
    fn name(&self) -> &'static str {
        "Venkatakrishnan"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eps_squared() {
        let limiter = Venkatakrishnan::new(5.0);
        assert!((limiter.eps_squared(0.1) - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_zero_delta() {
        let limiter = Venkatakrishnan::new(1.0);
        assert_eq!(limiter.compute_limiter(&LimiterContext::new(1.0, 0.0, 0.5, 1.5, 0.1)), 1.0);
    }

    #[test]
    fn test_bounded_without_eps() {
        // K = 0 时满足 α Δ_f ≤ Δ_max
        let limiter = Venkatakrishnan::new(0.0);
        for delta in [0.1, 0.5, 1.0, 3.0, 50.0] {
            let ctx = LimiterContext::new(1.0, delta, 0.5, 1.5, 0.1);
            let alpha = limiter.compute_limiter(&ctx);
            assert!((0.0..=1.0).contains(&alpha));
            assert!(alpha * delta <= ctx.delta_max() + 1e-12, "delta = {delta}");

            let ctx = LimiterContext::new(1.0, -delta, 0.5, 1.5, 0.1);
            let alpha = limiter.compute_limiter(&ctx);
            assert!(alpha * -delta >= ctx.delta_min() - 1e-12, "delta = {delta}");
        }
    }

    #[test]
    fn test_smooth_region_unlimited() {
        // 小增量时 α → 1
        let limiter = Venkatakrishnan::new(1.0);
        let alpha = limiter.compute_limiter(&LimiterContext::new(1.0, 0.01, 0.5, 1.5, 0.1));
        assert!(alpha > 0.99);
    }

    #[test]
    fn test_extremum_limited() {
        let limiter = Venkatakrishnan::new(0.1);
        let alpha = limiter.compute_limiter(&LimiterContext::new(1.5, 0.3, 0.5, 1.5, 0.1));
        // Δ₁ = 0，ε² = 1e-6 → α ≈ ε²/(2Δ₂²)
        assert!(alpha < 1e-4);
    }
}
