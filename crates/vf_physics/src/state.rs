// crates/vf_physics/src/state.rs

//! 流场状态存储
//!
//! 按顶点存储（SoA 风格，每个物理量一个数组）：
//!
//! - 守恒量 `(ρ, ρu, ρE)`
//! - 原始量与二级量（由 [`crate::primitive`] 每次外迭代重算）
//! - 外部提供的温度梯度与速度梯度
//! - 湍流场（涡粘性、湍动能；层流时为零）
//! - 壁面状态：旧速度、截断误差、缓存的壁面剪应力
//!
//! 速度梯度以 `DMat3` 存储，约定 `grad.col(b)[a] = ∂u_a/∂x_b`，
//! 即 `grad * dx` 给出速度增量。

use glam::{DMat3, DVec3};

use crate::MAX_VAR;

/// 块向量（按 `[ρ, ρu.., ρE]` 排列，只使用前 `n_var` 个分量）
pub type BlockVec = [f64; MAX_VAR];

/// 守恒量
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConservedVars {
    /// 密度
    pub density: f64,
    /// 动量
    pub momentum: DVec3,
    /// 单位体积总能 ρE
    pub energy: f64,
}

impl ConservedVars {
    /// 由原始量构造
    pub fn from_primitive(density: f64, velocity: DVec3, total_energy_per_mass: f64) -> Self {
        Self {
            density,
            momentum: velocity * density,
            energy: density * total_energy_per_mass,
        }
    }
}

/// 原始量
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrimitiveVars {
    /// 温度
    pub temperature: f64,
    /// 速度
    pub velocity: DVec3,
    /// 压力
    pub pressure: f64,
    /// 密度
    pub density: f64,
    /// 比焓 h = (ρE + p)/ρ
    pub enthalpy: f64,
    /// 比内能 e = ρE/ρ - |u|²/2 - k
    pub static_energy: f64,
    /// 声速
    pub sound_speed: f64,
    /// 层流粘度
    pub laminar_viscosity: f64,
    /// 涡粘性
    pub eddy_viscosity: f64,
    /// 层流导热系数
    pub conductivity: f64,
    /// 定压比热
    pub cp: f64,
}

impl PrimitiveVars {
    /// 总粘度
    #[inline]
    pub fn total_viscosity(&self) -> f64 {
        self.laminar_viscosity + self.eddy_viscosity
    }
}

/// 二级量（热力学与输运系数偏导数）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SecondaryVars {
    /// ∂p/∂ρ|e
    pub dp_drho_e: f64,
    /// ∂p/∂e|ρ
    pub dp_de_rho: f64,
    /// ∂T/∂ρ|e
    pub dt_drho_e: f64,
    /// ∂T/∂e|ρ
    pub dt_de_rho: f64,
    /// ∂μ/∂ρ|T
    pub dmu_drho_t: f64,
    /// ∂μ/∂T|ρ
    pub dmu_dt_rho: f64,
    /// ∂κ/∂ρ|T
    pub dk_drho_t: f64,
    /// ∂κ/∂T|ρ
    pub dk_dt_rho: f64,
}

/// 流场状态
#[derive(Debug, Clone)]
pub struct FlowState {
    n_dim: usize,
    /// 守恒量
    pub conserved: Vec<ConservedVars>,
    /// 原始量
    pub primitives: Vec<PrimitiveVars>,
    /// 二级量
    pub secondary: Vec<SecondaryVars>,
    /// 物理有效标记
    pub valid: Vec<bool>,
    /// 温度梯度
    pub grad_temperature: Vec<DVec3>,
    /// 速度梯度
    pub grad_velocity: Vec<DMat3>,
    /// 涡粘性
    pub eddy_viscosity: Vec<f64>,
    /// 湍动能
    pub tke: Vec<f64>,
    /// 旧速度（壁面处被强制为壁面速度）
    pub velocity_old: Vec<DVec3>,
    /// 局部截断误差
    pub res_trunc_error: Vec<BlockVec>,
    /// 缓存的壁面剪应力（未计算时为负）
    pub tau_wall: Vec<f64>,
}

impl FlowState {
    /// 创建零状态
    pub fn new(n_dim: usize, n_vertices: usize) -> Self {
        Self {
            n_dim,
            conserved: vec![ConservedVars::default(); n_vertices],
            primitives: vec![PrimitiveVars::default(); n_vertices],
            secondary: vec![SecondaryVars::default(); n_vertices],
            valid: vec![true; n_vertices],
            grad_temperature: vec![DVec3::ZERO; n_vertices],
            grad_velocity: vec![DMat3::ZERO; n_vertices],
            eddy_viscosity: vec![0.0; n_vertices],
            tke: vec![0.0; n_vertices],
            velocity_old: vec![DVec3::ZERO; n_vertices],
            res_trunc_error: vec![[0.0; MAX_VAR]; n_vertices],
            tau_wall: vec![-1.0; n_vertices],
        }
    }

    /// 空间维数
    #[inline]
    pub fn n_dim(&self) -> usize {
        self.n_dim
    }

    /// 顶点数
    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.conserved.len()
    }

    /// 设置守恒量
    pub fn set_conserved(&mut self, v: usize, u: ConservedVars) {
        self.conserved[v] = u;
    }

    /// 设置整个守恒场为同一状态
    pub fn fill_conserved(&mut self, u: ConservedVars) {
        self.conserved.fill(u);
    }

    /// 设置顶点梯度
    pub fn set_gradients(&mut self, v: usize, grad_t: DVec3, grad_u: DMat3) {
        self.grad_temperature[v] = grad_t;
        self.grad_velocity[v] = grad_u;
    }

    /// 设置顶点湍流量
    pub fn set_turbulence(&mut self, v: usize, eddy_viscosity: f64, tke: f64) {
        self.eddy_viscosity[v] = eddy_viscosity;
        self.tke[v] = tke;
    }

    /// 清零顶点动量截断误差
    #[inline]
    pub fn zero_velocity_trunc_error(&mut self, v: usize) {
        for d in 0..self.n_dim {
            self.res_trunc_error[v][d + 1] = 0.0;
        }
    }

    /// 非物理顶点数
    pub fn count_invalid(&self) -> usize {
        self.valid.iter().filter(|ok| !**ok).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let s = FlowState::new(3, 10);
        assert_eq!(s.n_vertices(), 10);
        assert!(s.tau_wall.iter().all(|t| *t < 0.0));
        assert_eq!(s.count_invalid(), 0);
    }

    #[test]
    fn test_conserved_from_primitive() {
        let u = ConservedVars::from_primitive(2.0, DVec3::new(1.0, 2.0, 0.0), 10.0);
        assert!((u.momentum - DVec3::new(2.0, 4.0, 0.0)).length() < 1e-15);
        assert!((u.energy - 20.0).abs() < 1e-15);
    }

    #[test]
    fn test_zero_velocity_trunc_error_keeps_energy() {
        let mut s = FlowState::new(2, 1);
        s.res_trunc_error[0] = [1.0, 2.0, 3.0, 4.0, 0.0];
        s.zero_velocity_trunc_error(0);
        assert_eq!(s.res_trunc_error[0], [1.0, 0.0, 0.0, 4.0, 0.0]);
    }
}
