// crates/ef_physics/src/numerics/reconstruction/traits.rs

//! 重构 trait 定义

use crate::numerics::gradient::FieldView;
use crate::state::Primitive;

/// 重构器 trait
///
/// 每次残差计算前调用一次 [`Reconstructor::prepare`]，
/// 随后对每个面的两侧调用 [`Reconstructor::extrapolate`]。
pub trait Reconstructor: Send + Sync {
    /// 计算并限制所有单元的梯度
    fn prepare(&mut self, view: &FieldView<'_>);

    /// 单元 `cell` 在面 `face` 上的外推状态
    fn extrapolate(&self, view: &FieldView<'_>, cell: usize, face: usize) -> Primitive;

    /// 是否启用二阶精度
    fn is_second_order(&self) -> bool;

    /// 重构器名称
    fn name(&self) -> &'static str;
}
