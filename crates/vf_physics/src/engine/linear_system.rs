// crates/vf_physics/src/engine/linear_system.rs

//! 残差向量与线性系统
//!
//! 残差按顶点块存储 `[ρ, ρu.., ρE]`；显式时间积分不分配雅可比。

use crate::engine::block::Block;
use crate::engine::sparse::BlockJacobian;
use crate::mesh::ViscousMesh;
use crate::state::BlockVec;
use crate::MAX_VAR;

/// 块残差向量
#[derive(Debug, Clone)]
pub struct BlockResidual {
    n_var: usize,
    rows: Vec<BlockVec>,
}

impl BlockResidual {
    /// 创建零残差
    pub fn new(n_vertices: usize, n_var: usize) -> Self {
        Self {
            n_var,
            rows: vec![[0.0; MAX_VAR]; n_vertices],
        }
    }

    /// 方程数
    #[inline]
    pub fn n_var(&self) -> usize {
        self.n_var
    }

    /// 顶点数
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 清零
    pub fn set_zero(&mut self) {
        self.rows.fill([0.0; MAX_VAR]);
    }

    /// 顶点块
    #[inline]
    pub fn block(&self, v: usize) -> &BlockVec {
        &self.rows[v]
    }

    /// 单个分量
    #[inline]
    pub fn value(&self, v: usize, var: usize) -> f64 {
        self.rows[v][var]
    }

    /// 全部行
    #[inline]
    pub fn rows(&self) -> &[BlockVec] {
        &self.rows
    }

    /// 全部行（可变）
    #[inline]
    pub fn rows_mut(&mut self) -> &mut [BlockVec] {
        &mut self.rows
    }

    /// 块加
    #[inline]
    pub fn add_block(&mut self, v: usize, b: &BlockVec) {
        for k in 0..self.n_var {
            self.rows[v][k] += b[k];
        }
    }

    /// 块减
    #[inline]
    pub fn sub_block(&mut self, v: usize, b: &BlockVec) {
        for k in 0..self.n_var {
            self.rows[v][k] -= b[k];
        }
    }

    /// 分量加
    #[inline]
    pub fn add_value(&mut self, v: usize, var: usize, value: f64) {
        self.rows[v][var] += value;
    }

    /// 清零顶点的动量分量
    #[inline]
    pub fn zero_momentum(&mut self, v: usize) {
        for d in 1..self.n_var - 1 {
            self.rows[v][d] = 0.0;
        }
    }

    /// 所有分量绝对值之和（诊断用）
    pub fn l1_norm(&self) -> f64 {
        self.rows
            .iter()
            .flat_map(|r| r[..self.n_var].iter())
            .map(|x| x.abs())
            .sum()
    }
}

/// 残差 + 可选雅可比
#[derive(Debug, Clone)]
pub struct LinearSystem {
    /// 残差
    pub residual: BlockResidual,
    /// 雅可比（仅隐式）
    pub jacobian: Option<BlockJacobian>,
}

impl LinearSystem {
    /// 按网格创建
    pub fn new(mesh: &ViscousMesh, implicit: bool) -> Self {
        Self {
            residual: BlockResidual::new(mesh.n_vertices(), mesh.n_var()),
            jacobian: implicit.then(|| BlockJacobian::new(mesh)),
        }
    }

    /// 是否有雅可比
    #[inline]
    pub fn is_implicit(&self) -> bool {
        self.jacobian.is_some()
    }

    /// 残差与雅可比清零
    pub fn set_zero(&mut self) {
        self.residual.set_zero();
        if let Some(jac) = self.jacobian.as_mut() {
            jac.set_zero();
        }
    }

    /// 散布一条边的贡献：`R_i -= F, R_j += F`，雅可比按四块更新
    #[inline]
    pub fn scatter_edge(
        &mut self,
        edge: usize,
        i: usize,
        j: usize,
        flux: &BlockVec,
        jac_i: &Block,
        jac_j: &Block,
    ) {
        self.residual.sub_block(i, flux);
        self.residual.add_block(j, flux);
        if let Some(jac) = self.jacobian.as_mut() {
            jac.update_blocks_sub(edge, jac_i, jac_j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::ViscousMeshBuilder;
    use glam::DVec3;

    #[test]
    fn test_scatter_edge_is_conservative() {
        let mut b = ViscousMeshBuilder::new(2);
        let a = b.add_vertex(DVec3::ZERO);
        let c = b.add_vertex(DVec3::X);
        b.add_edge(a, c, DVec3::X);
        let mesh = b.build().unwrap();

        let mut sys = LinearSystem::new(&mesh, false);
        assert!(!sys.is_implicit());
        let f = [0.0, 1.5, -2.0, 3.0, 0.0];
        sys.scatter_edge(0, a, c, &f, &Block::ZERO, &Block::ZERO);
        for k in 0..4 {
            assert_eq!(sys.residual.value(a, k) + sys.residual.value(c, k), 0.0);
        }
        assert_eq!(sys.residual.value(a, 1), -1.5);
        sys.set_zero();
        assert_eq!(sys.residual.l1_norm(), 0.0);
    }

    #[test]
    fn test_zero_momentum_keeps_mass_and_energy() {
        let mut r = BlockResidual::new(1, 5);
        r.add_block(0, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        r.zero_momentum(0);
        assert_eq!(r.block(0), &[1.0, 0.0, 0.0, 0.0, 5.0]);
    }
}
