// crates/vf_physics/src/engine/block.rs

//! 定长稠密块
//!
//! 三维最多 5 个方程，块按 `MAX_VAR × MAX_VAR` 定长存储，
//! 二维问题只使用左上 4×4 部分。

use std::ops::{AddAssign, Neg, SubAssign};

use crate::MAX_VAR;

/// 雅可比稠密块
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Block(pub [[f64; MAX_VAR]; MAX_VAR]);

impl Block {
    /// 零块
    pub const ZERO: Self = Self([[0.0; MAX_VAR]; MAX_VAR]);

    /// 单位块（前 `n_var` 个对角元为 1）
    pub fn identity(n_var: usize) -> Self {
        let mut b = Self::ZERO;
        for k in 0..n_var.min(MAX_VAR) {
            b.0[k][k] = 1.0;
        }
        b
    }

    /// 读取元素
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[row][col]
    }

    /// 写入元素
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.0[row][col] = value;
    }

    /// 可变行
    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f64; MAX_VAR] {
        &mut self.0[row]
    }

    /// 最大绝对值
    pub fn max_abs(&self) -> f64 {
        self.0
            .iter()
            .flat_map(|r| r.iter())
            .fold(0.0_f64, |m, x| m.max(x.abs()))
    }
}

impl AddAssign<&Block> for Block {
    #[inline]
    fn add_assign(&mut self, rhs: &Block) {
        for (r, rr) in self.0.iter_mut().zip(rhs.0.iter()) {
            for (x, y) in r.iter_mut().zip(rr.iter()) {
                *x += *y;
            }
        }
    }
}

impl SubAssign<&Block> for Block {
    #[inline]
    fn sub_assign(&mut self, rhs: &Block) {
        for (r, rr) in self.0.iter_mut().zip(rhs.0.iter()) {
            for (x, y) in r.iter_mut().zip(rr.iter()) {
                *x -= *y;
            }
        }
    }
}

impl Neg for Block {
    type Output = Block;

    #[inline]
    fn neg(mut self) -> Block {
        for r in self.0.iter_mut() {
            for x in r.iter_mut() {
                *x = -*x;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_ops() {
        let mut a = Block::identity(4);
        let b = Block::identity(4);
        a += &b;
        assert_eq!(a.get(3, 3), 2.0);
        assert_eq!(a.get(4, 4), 0.0);
        a -= &b;
        assert_eq!(a, Block::identity(4));
        assert_eq!((-a).get(0, 0), -1.0);
        assert_eq!((-a).max_abs(), 1.0);
    }
}
