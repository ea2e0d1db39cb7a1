// crates/ef_physics/src/numerics/linear_algebra/block_csr.rs

//! 4×4 块压缩稀疏行（BCSR）矩阵
//!
//! 隐式时间推进的 Jacobian 每个单元一个对角块、每个内部界面两个非对角块，
//! 块大小等于守恒变量个数。稀疏结构在网格构建后固定，
//! 每次 Newton 迭代只重写块值。
//!
//! # 格式说明
//!
//! - `row_ptr`: 块行指针，长度 n_rows + 1
//! - `col_idx`: 块列索引，每行升序
//! - `values`: 与 `col_idx` 一一对应的 4×4 块
//!
//! 向量按单元交错存储：`x[NVAR * cell + k]`。

use rayon::prelude::*;

use crate::mesh::MeshTopology;
use crate::state::NVAR;

/// 4×4 稠密块
pub type Block = [[f64; NVAR]; NVAR];

/// 零块
pub const ZERO_BLOCK: Block = [[0.0; NVAR]; NVAR];

// =============================================================================
// 块运算
// =============================================================================

/// 标量乘单位块
#[inline]
pub fn block_identity(scale: f64) -> Block {
    let mut b = ZERO_BLOCK;
    for (k, row) in b.iter_mut().enumerate() {
        row[k] = scale;
    }
    b
}

/// 块乘向量 y = B x
#[inline]
pub fn block_mul_vec(b: &Block, x: &[f64]) -> [f64; NVAR] {
    let mut y = [0.0; NVAR];
    for (yi, row) in y.iter_mut().zip(b.iter()) {
        *yi = row.iter().zip(x).map(|(a, xj)| a * xj).sum();
    }
    y
}

/// 带列主元的 Gauss-Jordan 块求逆
///
/// 主元绝对值低于 `1e-14 × 最大行范数` 时视为奇异，返回 None。
pub fn block_inverse(b: &Block) -> Option<Block> {
    let scale = b
        .iter()
        .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0, f64::max);
    if !(scale > 0.0) || !scale.is_finite() {
        return None;
    }
    let tol = 1e-14 * scale;

    let mut a = *b;
    let mut inv = block_identity(1.0);
    for col in 0..NVAR {
        let pivot = (col..NVAR)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < tol {
            return None;
        }
        a.swap(col, pivot);
        inv.swap(col, pivot);

        let d = 1.0 / a[col][col];
        for k in 0..NVAR {
            a[col][k] *= d;
            inv[col][k] *= d;
        }
        for row in 0..NVAR {
            if row == col {
                continue;
            }
            let f = a[row][col];
            if f == 0.0 {
                continue;
            }
            for k in 0..NVAR {
                a[row][k] -= f * a[col][k];
                inv[row][k] -= f * inv[col][k];
            }
        }
    }
    Some(inv)
}

// =============================================================================
// 稀疏模式
// =============================================================================

/// 块稀疏模式（与值分离，可在多次组装间复用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockCsrPattern {
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    diag_idx: Vec<usize>,
}

impl BlockCsrPattern {
    /// 从相邻对构建模式，每行总含对角块
    ///
    /// `pairs` 中的每个 (i, j) 同时生成 (i, j) 与 (j, i) 两个块。
    pub fn from_pairs(n: usize, pairs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut rows: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
        for (i, j) in pairs {
            if i == j {
                continue;
            }
            rows[i].push(j);
            rows[j].push(i);
        }

        let mut row_ptr = Vec::with_capacity(n + 1);
        let mut col_idx = Vec::new();
        let mut diag_idx = Vec::with_capacity(n);
        row_ptr.push(0);
        for (i, mut cols) in rows.into_iter().enumerate() {
            cols.sort_unstable();
            cols.dedup();
            let start = col_idx.len();
            // 对角块必在行内
            let offset = cols.binary_search(&i).unwrap_or(0);
            diag_idx.push(start + offset);
            col_idx.extend(cols);
            row_ptr.push(col_idx.len());
        }

        Self {
            row_ptr,
            col_idx,
            diag_idx,
        }
    }

    /// 从网格内部界面构建模式（含周期界面）
    pub fn from_mesh(mesh: &dyn MeshTopology) -> Self {
        let pairs = (0..mesh.n_faces())
            .filter_map(|f| mesh.face_neighbor(f).map(|nb| (mesh.face_owner(f), nb)));
        Self::from_pairs(mesh.n_cells(), pairs)
    }

    /// 块行数
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.row_ptr.len() - 1
    }

    /// 非零块数
    #[inline]
    pub fn nnz(&self) -> usize {
        self.col_idx.len()
    }

    /// 行内块列索引
    #[inline]
    pub fn row_indices(&self, row: usize) -> &[usize] {
        &self.col_idx[self.row_ptr[row]..self.row_ptr[row + 1]]
    }

    /// 查找 (row, col) 块在值数组中的位置
    pub fn find_index(&self, row: usize, col: usize) -> Option<usize> {
        let start = self.row_ptr[row];
        self.row_indices(row)
            .binary_search(&col)
            .ok()
            .map(|offset| start + offset)
    }
}

// =============================================================================
// 块矩阵
// =============================================================================

/// 4×4 块 CSR 矩阵
#[derive(Debug, Clone)]
pub struct BlockCsrMatrix {
    pattern: BlockCsrPattern,
    values: Vec<Block>,
}

impl BlockCsrMatrix {
    /// 以零块创建
    pub fn new(pattern: BlockCsrPattern) -> Self {
        let values = vec![ZERO_BLOCK; pattern.nnz()];
        Self { pattern, values }
    }

    /// 块行数（单元数）
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.pattern.n_rows()
    }

    /// 标量维数
    #[inline]
    pub fn dim(&self) -> usize {
        self.n_rows() * NVAR
    }

    /// 稀疏模式
    pub fn pattern(&self) -> &BlockCsrPattern {
        &self.pattern
    }

    /// 所有块置零，保留结构
    pub fn clear_values(&mut self) {
        self.values.fill(ZERO_BLOCK);
    }

    /// 读取块；不在模式中时返回 None
    pub fn block(&self, row: usize, col: usize) -> Option<&Block> {
        self.pattern.find_index(row, col).map(|idx| &self.values[idx])
    }

    /// 可变块引用
    pub fn block_mut(&mut self, row: usize, col: usize) -> Option<&mut Block> {
        self.pattern
            .find_index(row, col)
            .map(move |idx| &mut self.values[idx])
    }

    /// 累加块；不在模式中时返回 false
    pub fn add_block(&mut self, row: usize, col: usize, b: &Block) -> bool {
        match self.block_mut(row, col) {
            Some(dst) => {
                for (d, s) in dst.iter_mut().zip(b) {
                    for (dk, sk) in d.iter_mut().zip(s) {
                        *dk += sk;
                    }
                }
                true
            }
            None => false,
        }
    }

    /// 对角块
    #[inline]
    pub fn diagonal_block(&self, row: usize) -> &Block {
        &self.values[self.pattern.diag_idx[row]]
    }

    /// 对角块（可变）
    #[inline]
    pub fn diagonal_block_mut(&mut self, row: usize) -> &mut Block {
        let idx = self.pattern.diag_idx[row];
        &mut self.values[idx]
    }

    /// 矩阵-向量乘法 y = A x（按块行并行）
    ///
    /// # Panics
    /// - `x.len() != self.dim()`
    /// - `y.len() != self.dim()`
    pub fn mul_vec(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.dim(), "x 长度必须等于矩阵维数");
        assert_eq!(y.len(), self.dim(), "y 长度必须等于矩阵维数");

        let p = &self.pattern;
        y.par_chunks_mut(NVAR).enumerate().for_each(|(row, out)| {
            let mut sum = [0.0; NVAR];
            for idx in p.row_ptr[row]..p.row_ptr[row + 1] {
                let col = p.col_idx[idx];
                let bx = block_mul_vec(&self.values[idx], &x[NVAR * col..NVAR * col + NVAR]);
                for k in 0..NVAR {
                    sum[k] += bx[k];
                }
            }
            out.copy_from_slice(&sum);
        });
    }
}
