// crates/ef_physics/src/numerics/gradient/mod.rs

//! 梯度计算模块
//!
//! 提供两种单元梯度计算方法：
//! - Green-Gauss 梯度 (面积分法)
//! - 最小二乘梯度 (距离平方反比加权，奇异时回退 Green-Gauss)

mod green_gauss;
mod least_squares;
mod traits;

pub use green_gauss::{FaceInterpolation, GreenGaussGradient};
pub use least_squares::LeastSquaresGradient;
pub use traits::{CellGradient, FieldView, GradientField, GradientMethod};

/// 按配置创建梯度方法
pub fn create_gradient(method: ef_config::GradientMethod) -> Box<dyn GradientMethod> {
    match method {
        ef_config::GradientMethod::LeastSquares => Box::new(LeastSquaresGradient::new()),
        ef_config::GradientMethod::GreenGauss => Box::new(GreenGaussGradient::new()),
    }
}
