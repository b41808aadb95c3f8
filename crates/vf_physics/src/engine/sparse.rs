// crates/vf_physics/src/engine/sparse.rs

//! 块稀疏雅可比（块 CSR）
//!
//! 稀疏模式由网格边一次性生成：每个顶点一个对角块，每条边两个非对角块。
//! 列索引按行有序，定位使用二分查找；每条边的四个块位置预先缓存。
//!
//! # 格式
//!
//! - `row_ptr`: 长度 n_rows + 1
//! - `col_idx`: 块列索引
//! - `blocks`: 与 `col_idx` 一一对应的稠密块

use crate::engine::block::Block;
use crate::mesh::ViscousMesh;

/// 块稀疏模式
#[derive(Debug, Clone)]
pub struct BlockPattern {
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    diag: Vec<usize>,
}

impl BlockPattern {
    /// 由网格边构建（含对角）
    pub fn from_mesh(mesh: &ViscousMesh) -> Self {
        let n = mesh.n_vertices();
        let mut rows: Vec<Vec<usize>> = (0..n).map(|v| vec![v]).collect();
        for e in mesh.edges() {
            rows[e.i].push(e.j);
            rows[e.j].push(e.i);
        }

        let mut row_ptr = Vec::with_capacity(n + 1);
        let mut col_idx = Vec::new();
        let mut diag = Vec::with_capacity(n);
        row_ptr.push(0);
        for (v, mut cols) in rows.into_iter().enumerate() {
            cols.sort_unstable();
            cols.dedup();
            let start = col_idx.len();
            // 对角必然存在
            let local = cols.binary_search(&v).unwrap_or(0);
            diag.push(start + local);
            col_idx.extend(cols);
            row_ptr.push(col_idx.len());
        }

        Self {
            row_ptr,
            col_idx,
            diag,
        }
    }

    /// 行数
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.row_ptr.len() - 1
    }

    /// 非零块数
    #[inline]
    pub fn nnz(&self) -> usize {
        self.col_idx.len()
    }

    /// 第 row 行的块列索引
    #[inline]
    pub fn row_indices(&self, row: usize) -> &[usize] {
        &self.col_idx[self.row_ptr[row]..self.row_ptr[row + 1]]
    }

    /// 查找 (row, col) 对应的块位置
    pub fn find_index(&self, row: usize, col: usize) -> Option<usize> {
        let start = self.row_ptr[row];
        self.row_indices(row)
            .binary_search(&col)
            .ok()
            .map(|local| start + local)
    }

    /// 对角块位置
    #[inline]
    pub fn diag_index(&self, row: usize) -> usize {
        self.diag[row]
    }
}

/// 一条边在块 CSR 中的四个块位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSlots {
    /// (i, i)
    pub ii: usize,
    /// (i, j)
    pub ij: usize,
    /// (j, i)
    pub ji: usize,
    /// (j, j)
    pub jj: usize,
}

/// 块稀疏雅可比
#[derive(Debug, Clone)]
pub struct BlockJacobian {
    n_var: usize,
    pattern: BlockPattern,
    blocks: Vec<Block>,
    edge_slots: Vec<EdgeSlots>,
}

impl BlockJacobian {
    /// 由网格创建零矩阵
    pub fn new(mesh: &ViscousMesh) -> Self {
        let pattern = BlockPattern::from_mesh(mesh);
        let edge_slots = mesh
            .edges()
            .iter()
            .map(|e| EdgeSlots {
                ii: pattern.diag_index(e.i),
                ij: pattern.find_index(e.i, e.j).unwrap_or(usize::MAX),
                ji: pattern.find_index(e.j, e.i).unwrap_or(usize::MAX),
                jj: pattern.diag_index(e.j),
            })
            .collect();
        Self {
            n_var: mesh.n_var(),
            blocks: vec![Block::ZERO; pattern.nnz()],
            pattern,
            edge_slots,
        }
    }

    /// 方程数
    #[inline]
    pub fn n_var(&self) -> usize {
        self.n_var
    }

    /// 稀疏模式
    #[inline]
    pub fn pattern(&self) -> &BlockPattern {
        &self.pattern
    }

    /// 清零
    pub fn set_zero(&mut self) {
        self.blocks.fill(Block::ZERO);
    }

    /// 读取块
    pub fn block(&self, row: usize, col: usize) -> Option<&Block> {
        self.pattern.find_index(row, col).map(|k| &self.blocks[k])
    }

    /// 读取标量元素（不存在的块返回 0）
    pub fn value(&self, row: usize, col: usize, r: usize, c: usize) -> f64 {
        self.block(row, col).map_or(0.0, |b| b.get(r, c))
    }

    /// 对角块
    #[inline]
    pub fn diag_block(&self, row: usize) -> &Block {
        &self.blocks[self.pattern.diag_index(row)]
    }

    /// 将块加到对角块
    #[inline]
    pub fn add_block_to_diag(&mut self, row: usize, block: &Block) {
        let k = self.pattern.diag_index(row);
        self.blocks[k] += block;
    }

    /// 边的块更新：`J_ii -= A_i, J_ij -= A_j, J_ji += A_i, J_jj += A_j`
    #[inline]
    pub fn update_blocks_sub(&mut self, edge: usize, jac_i: &Block, jac_j: &Block) {
        let s = self.edge_slots[edge];
        self.blocks[s.ii] -= jac_i;
        self.blocks[s.ij] -= jac_j;
        self.blocks[s.ji] += jac_i;
        self.blocks[s.jj] += jac_j;
    }

    /// 删除标量行 `(row, var)`：整行清零，对角元置 1
    pub fn delete_vals_row(&mut self, row: usize, var: usize) {
        let start = self.pattern.row_ptr[row];
        let end = self.pattern.row_ptr[row + 1];
        for block in &mut self.blocks[start..end] {
            block.0[var] = [0.0; crate::MAX_VAR];
        }
        let d = self.pattern.diag_index(row);
        self.blocks[d].0[var][var] = 1.0;
    }

    /// 按行切分的可变视图 `(row, 列索引, 块)`，供逐行并行归约
    pub fn rows_mut(&mut self) -> Vec<(usize, &[usize], &mut [Block])> {
        let n = self.pattern.n_rows();
        let mut out = Vec::with_capacity(n);
        let mut rest: &mut [Block] = &mut self.blocks;
        for row in 0..n {
            let len = self.pattern.row_ptr[row + 1] - self.pattern.row_ptr[row];
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(len);
            out.push((row, self.pattern.row_indices(row), head));
            rest = tail;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::ViscousMeshBuilder;
    use glam::DVec3;

    fn chain(n: usize) -> ViscousMesh {
        let mut b = ViscousMeshBuilder::new(2);
        for k in 0..n {
            b.add_vertex(DVec3::new(k as f64, 0.0, 0.0));
        }
        for k in 0..n - 1 {
            b.add_edge(k, k + 1, DVec3::X);
        }
        b.build().unwrap()
    }

    #[test]
    fn test_pattern_from_edges() {
        let p = BlockPattern::from_mesh(&chain(4));
        assert_eq!(p.nnz(), 4 + 2 * 3);
        assert_eq!(p.row_indices(1), &[0, 1, 2]);
        assert_eq!(p.find_index(0, 3), None);
        assert_eq!(p.diag_index(2), p.find_index(2, 2).unwrap());
    }

    #[test]
    fn test_update_blocks_sub() {
        let mesh = chain(3);
        let mut jac = BlockJacobian::new(&mesh);
        let a = Block::identity(4);
        let mut b = Block::ZERO;
        b.set(1, 2, 3.0);
        jac.update_blocks_sub(1, &a, &b);
        assert_eq!(jac.value(1, 1, 0, 0), -1.0);
        assert_eq!(jac.value(1, 2, 1, 2), -3.0);
        assert_eq!(jac.value(2, 1, 3, 3), 1.0);
        assert_eq!(jac.value(2, 2, 1, 2), 3.0);
        assert_eq!(jac.value(0, 0, 0, 0), 0.0);
    }

    #[test]
    fn test_delete_vals_row() {
        let mesh = chain(3);
        let mut jac = BlockJacobian::new(&mesh);
        let full = {
            let mut f = Block::ZERO;
            for r in 0..4 {
                for c in 0..4 {
                    f.set(r, c, 2.0);
                }
            }
            f
        };
        jac.update_blocks_sub(0, &full, &full);
        jac.update_blocks_sub(1, &full, &full);
        jac.delete_vals_row(1, 2);

        assert_eq!(jac.value(1, 0, 2, 1), 0.0);
        assert_eq!(jac.value(1, 2, 2, 3), 0.0);
        assert_eq!(jac.value(1, 1, 2, 2), 1.0);
        assert_eq!(jac.value(1, 1, 2, 0), 0.0);
        // 同块其他变量行与相邻块行不受影响（(1,1) 块两条边相消，取非对角块）
        assert_eq!(jac.value(1, 0, 1, 1), 2.0);
        assert_eq!(jac.value(1, 2, 3, 3), -2.0);
        assert_eq!(jac.value(2, 1, 2, 2), 2.0);
    }

    #[test]
    fn test_rows_mut_covers_all_blocks() {
        let mesh = chain(4);
        let mut jac = BlockJacobian::new(&mesh);
        let rows = jac.rows_mut();
        assert_eq!(rows.len(), 4);
        let total: usize = rows.iter().map(|(_, cols, blocks)| {
            assert_eq!(cols.len(), blocks.len());
            blocks.len()
        }).sum();
        assert_eq!(total, 10);
    }
}
