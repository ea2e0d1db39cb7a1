// crates/ef_physics/src/numerics/limiter/mod.rs

//! # 梯度限制器模块
//!
//! 提供梯度限制器用于控制二阶精度重构的振荡:
//!
//! - `SlopeLimiter` - 限制器 trait 定义
//! - `NoLimiter` - 无限制
//! - `BarthJespersen` - Barth-Jespersen 限制器（严格保界）
//! - `Venkatakrishnan` - Venkatakrishnan 限制器（光滑）
//!
//! ## 限制器选择指南
//!
//! | 限制器 | 耗散性 | 光滑性 | 适用场景 |
//! |--------|--------|--------|----------|
//! | Barth-Jespersen | 中等 | 不光滑 | 需要严格保界 |
//! | Venkatakrishnan | 低 | 光滑 | 定常收敛、光滑流动 |

mod barth_jespersen;
mod traits;
mod venkatakrishnan;

use std::fmt;
use std::str::FromStr;

pub use barth_jespersen::BarthJespersen;
pub use traits::{LimiterContext, NoLimiter, SlopeLimiter};
pub use venkatakrishnan::Venkatakrishnan;

use crate::error::PhysicsError;

/// 限制器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LimiterKind {
    /// 不限制
    None,
    /// Barth-Jespersen
    #[default]
    BarthJespersen,
    /// Venkatakrishnan
    Venkatakrishnan,
}

impl LimiterKind {
    /// 配置文件中的名称
    pub fn short_name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BarthJespersen => "barth_jespersen",
            Self::Venkatakrishnan => "venkatakrishnan",
        }
    }
}

impl fmt::Display for LimiterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl FromStr for LimiterKind {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "none" | "off" | "unlimited" => Ok(Self::None),
            "barth_jespersen" | "barthjespersen" | "barth" | "bj" => Ok(Self::BarthJespersen),
            "venkatakrishnan" | "venkat" | "vk" => Ok(Self::Venkatakrishnan),
            _ => Err(PhysicsError::UnknownLimiterKind { name: s.to_string() }),
        }
    }
}

/// 根据配置创建限制器实例
///
/// `k` 为 Venkatakrishnan K 参数，对其他类型忽略。
pub fn create_limiter(kind: LimiterKind, k: f64) -> Box<dyn SlopeLimiter> {
    match kind {
        LimiterKind::None => Box::new(NoLimiter),
        LimiterKind::BarthJespersen => Box::new(BarthJespersen::new()),
        LimiterKind::Venkatakrishnan => Box::new(Venkatakrishnan::new(k)),
    }
}
