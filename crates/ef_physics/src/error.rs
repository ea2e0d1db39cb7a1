// crates/ef_physics/src/error.rs

//! 物理层错误类型
//!
//! 数值失效（负密度、负压力、NaN/Inf 状态、非有限通量输入）均为致命错误，
//! 立即中止当前时间步，并携带出错单元/界面编号和步号。
//! 线性求解停滞不是致命错误，以 [`PhysicsError::LinearSolverStagnation`]
//! 的形式出现在时间步结果的警告列表中。
//!
//! 配置类错误（未知通量、边界、限制器名称）在初始化阶段一次性检查。

use ef_foundation::EfError;
use thiserror::Error;

/// 物理层结果类型
pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// 物理层错误
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// 密度非正
    #[error("单元 {cell} 密度非正 (rho={value:.6e})，最后有效步 {step}")]
    NegativeDensity {
        /// 出错单元
        cell: usize,
        /// 最后有效步号
        step: usize,
        /// 密度值
        value: f64,
    },

    /// 压力非正
    #[error("单元 {cell} 压力非正 (p={value:.6e})，最后有效步 {step}")]
    NegativePressure {
        /// 出错单元
        cell: usize,
        /// 最后有效步号
        step: usize,
        /// 压力值
        value: f64,
    },

    /// 单元状态出现 NaN/Inf
    #[error("单元 {cell} 状态含 NaN/Inf，最后有效步 {step}")]
    NonFiniteState {
        /// 出错单元
        cell: usize,
        /// 最后有效步号
        step: usize,
    },

    /// 通量输入无效（NaN/Inf 或非物理状态）
    #[error("界面 {face} 通量输入无效: {message}，最后有效步 {step}")]
    InvalidFluxInput {
        /// 出错界面
        face: usize,
        /// 最后有效步号
        step: usize,
        /// 详细信息
        message: String,
    },

    /// 线性求解达到迭代上限（非致命）
    #[error("线性求解停滞: {iterations} 次迭代后相对残差 {achieved:.3e}，目标 {target:.3e}")]
    LinearSolverStagnation {
        /// 已执行迭代次数
        iterations: usize,
        /// 达到的相对残差
        achieved: f64,
        /// 目标容差
        target: f64,
    },

    /// 未知边界类型
    #[error("未知边界类型: {name}")]
    UnknownBoundaryKind {
        /// 配置中的名称
        name: String,
    },

    /// 未知通量类型
    #[error("未知数值通量: {name}")]
    UnknownFluxKind {
        /// 配置中的名称
        name: String,
    },

    /// 未知限制器类型
    #[error("未知限制器: {name}")]
    UnknownLimiterKind {
        /// 配置中的名称
        name: String,
    },

    /// 网格无效（边界标签缺少条件、周期边界未配对等）
    #[error("网格无效: {message}")]
    InvalidMesh {
        /// 详细信息
        message: String,
    },

    /// 配置无效
    #[error("配置无效 '{key}': {reason}")]
    InvalidConfig {
        /// 配置键
        key: String,
        /// 原因
        reason: String,
    },

    /// 基础层错误（网格拓扑、尺寸等）
    #[error(transparent)]
    Foundation(#[from] EfError),
}

impl PhysicsError {
    /// 构造配置无效错误
    pub fn invalid_config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// 构造网格无效错误
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// 构造通量输入错误
    pub fn invalid_flux_input(face: usize, message: impl Into<String>) -> Self {
        Self::InvalidFluxInput {
            face,
            step: 0,
            message: message.into(),
        }
    }

    /// 附加最后有效步号
    pub fn at_step(self, last_valid_step: usize) -> Self {
        match self {
            Self::NegativeDensity { cell, value, .. } => Self::NegativeDensity {
                cell,
                step: last_valid_step,
                value,
            },
            Self::NegativePressure { cell, value, .. } => Self::NegativePressure {
                cell,
                step: last_valid_step,
                value,
            },
            Self::NonFiniteState { cell, .. } => Self::NonFiniteState {
                cell,
                step: last_valid_step,
            },
            Self::InvalidFluxInput { face, message, .. } => Self::InvalidFluxInput {
                face,
                step: last_valid_step,
                message,
            },
            other => other,
        }
    }

    /// 是否为致命错误
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::LinearSolverStagnation { .. })
    }
}

impl From<ef_config::ConfigError> for PhysicsError {
    fn from(err: ef_config::ConfigError) -> Self {
        match err {
            ef_config::ConfigError::InvalidValue { key, reason, .. } => {
                Self::InvalidConfig { key, reason }
            }
            other => Self::InvalidConfig {
                key: "config".to_string(),
                reason: other.to_string(),
            },
        }
    }
}
