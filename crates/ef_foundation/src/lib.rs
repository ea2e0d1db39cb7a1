// crates/ef_foundation/src/lib.rs

//! EulerFlow Foundation Layer
//!
//! 基础层，提供整个项目共享的错误类型与数值辅助工具。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`float`]: 安全除法和 Kahan 求和
//!
//! # 示例
//!
//! ```
//! use ef_foundation::{EfError, EfResult};
//! use ef_foundation::float::{safe_div, KahanSum};
//!
//! fn ratio(a: f64, b: f64) -> EfResult<f64> {
//!     if b == 0.0 {
//!         return Err(EfError::invalid_input("除数为零"));
//!     }
//!     Ok(safe_div(a, b, 0.0))
//! }
//!
//! assert_eq!(ratio(1.0, 2.0).unwrap(), 0.5);
//! assert_eq!(KahanSum::sum_iter([0.5, 0.25, 0.25]), 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod float;

pub use error::{EfError, EfResult};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{EfError, EfResult};
    pub use crate::float::{safe_div, KahanSum};
}
