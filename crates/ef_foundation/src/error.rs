// crates/ef_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `EfError` 枚举和 `EfResult` 类型别名。
//!
//! 基础层只定义与物理无关的错误（网格、输入、配置、IO、尺寸），
//! 数值计算相关错误在 `ef_physics` 中定义，并通过 `From` 包装本类型。
//!
//! # 示例
//!
//! ```
//! use ef_foundation::error::{EfError, EfResult};
//!
//! fn build() -> EfResult<()> {
//!     Err(EfError::invalid_mesh("单元没有面"))
//! }
//! assert!(build().is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type EfResult<T> = Result<T, EfError>;

/// EulerFlow 基础错误类型
#[derive(Error, Debug)]
pub enum EfError {
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 无效网格拓扑
    #[error("无效的网格拓扑: {message}")]
    InvalidMesh {
        /// 具体错误信息
        message: String,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },
}

impl EfError {
    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 无效网格
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 检查数组长度，不匹配时返回 `SizeMismatch`
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> EfResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::size_mismatch(name, expected, actual))
        }
    }
}

impl From<std::io::Error> for EfError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
