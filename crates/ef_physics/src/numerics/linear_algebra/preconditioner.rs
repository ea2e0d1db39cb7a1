// crates/ef_physics/src/numerics/linear_algebra/preconditioner.rs

//! 预条件器
//!
//! 预条件器将 Ax = b 转换为条件数更好的问题。核心操作是 `apply`: z = M⁻¹ r。
//!
//! # 预条件器类型
//!
//! - [`IdentityPreconditioner`]: 恒等预条件器（无预条件）
//! - [`BlockJacobiPreconditioner`]: 块 Jacobi，每个单元的 4×4 对角块求逆

use super::block_csr::{block_identity, block_inverse, block_mul_vec, Block, BlockCsrMatrix};
use crate::state::NVAR;

/// 预条件器 trait
pub trait Preconditioner: Send + Sync {
    /// 应用预条件器: z = M⁻¹ r
    fn apply(&self, r: &[f64], z: &mut [f64]);

    /// 预条件器名称
    fn name(&self) -> &'static str;
}

/// 恒等预条件器（无预条件）
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPreconditioner;

impl IdentityPreconditioner {
    /// 创建恒等预条件器
    pub fn new() -> Self {
        Self
    }
}

impl Preconditioner for IdentityPreconditioner {
    fn apply(&self, r: &[f64], z: &mut [f64]) {
        z.copy_from_slice(r);
    }

    fn name(&self) -> &'static str {
        "Identity"
    }
}

/// 块 Jacobi 预条件器
///
/// M = blockdiag(A)。奇异对角块退化为单位块。
#[derive(Debug, Clone)]
pub struct BlockJacobiPreconditioner {
    inv_blocks: Vec<Block>,
}

impl BlockJacobiPreconditioner {
    /// 从块矩阵的对角块创建
    pub fn from_matrix(matrix: &BlockCsrMatrix) -> Self {
        Self::from_diagonal_blocks((0..matrix.n_rows()).map(|i| *matrix.diagonal_block(i)))
    }

    /// 从对角块序列创建（无矩阵模式）
    pub fn from_diagonal_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut singular = 0usize;
        let inv_blocks = blocks
            .into_iter()
            .map(|b| {
                block_inverse(&b).unwrap_or_else(|| {
                    singular += 1;
                    block_identity(1.0)
                })
            })
            .collect();
        if singular > 0 {
            log::debug!("块 Jacobi: {} 个对角块奇异，以单位块代替", singular);
        }
        Self { inv_blocks }
    }

    /// 对角块逆
    pub fn inv_blocks(&self) -> &[Block] {
        &self.inv_blocks
    }
}

impl Preconditioner for BlockJacobiPreconditioner {
    fn apply(&self, r: &[f64], z: &mut [f64]) {
        debug_assert_eq!(r.len(), z.len());
        debug_assert_eq!(r.len(), self.inv_blocks.len() * NVAR);

        for ((zc, rc), inv) in z
            .chunks_exact_mut(NVAR)
            .zip(r.chunks_exact(NVAR))
            .zip(&self.inv_blocks)
        {
            zc.copy_from_slice(&block_mul_vec(inv, rc));
        }
    }

    fn name(&self) -> &'static str {
        "BlockJacobi"
    }
}
