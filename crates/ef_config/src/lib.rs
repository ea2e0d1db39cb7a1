// crates/ef_config/src/lib.rs

//! EulerFlow Config Layer
//!
//! 算例配置层。配置以 JSON 存储，所有字段都有默认值，
//! 数值格式、限制器和边界类型以字符串名称给出，
//! 由 `ef_physics` 在初始化阶段统一解析和校验。
//!
//! # 模块概览
//!
//! - [`case_config`]: CaseConfig 算例配置
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! ef_cli      ─> 读取 CaseConfig，驱动时间推进
//! ef_config   ─> CaseConfig (本层)
//! ef_physics  ─> SolverSettings::from_config 解析名称
//! ef_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod case_config;
pub mod error;

pub use case_config::{
    AnalysisConfig, BoundaryConfig, CaseConfig, FreestreamConfig, GasConfig, GradientMethod,
    ImplicitConfig,
    InitialConfig, JacobianMode, KrylovMethod, MeshConfig, NumericsConfig, PreconditionerKind,
    PrimitiveConfig, TimeConfig, TimeMode, TimeStepping,
};
pub use error::ConfigError;
