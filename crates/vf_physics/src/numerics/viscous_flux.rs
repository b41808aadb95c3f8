// crates/vf_physics/src/numerics/viscous_flux.rs

//! 边粘性通量（平均梯度格式）
//!
//! 对边 (i, j)，在两端点平均状态上构造应力张量与热流，投影到面积加权法向：
//!
//! ```text
//! F = [ 0,  τ·n,  (τ·u + κ_eff ∇T)·n ]
//! κ_eff = κ + c_p μ_t / Pr_t
//! ```
//!
//! 平均梯度沿边方向用端点差值修正：
//!
//! ```text
//! ∇φ ← ∇φ - (∇φ·e - (φ_j - φ_i)) e / |e|²,   e = x_j - x_i
//! ```
//!
//! 隐式雅可比采用薄剪切层近似：动量行 `∂(τ·n)/∂U_j = ξA[-Θu | Θ | 0]`，
//! `ξ = μ/(ρd)`，`Θ = I + n̂n̂ᵀ/3`；能量行使用二级量给出的精确温度导数。

use glam::{DMat3, DVec3};

use super::stress::{add_tau_wall, heat_flux_vector, stress_tensor};
use crate::engine::Block;
use crate::mesh::ViscousMesh;
use crate::state::{BlockVec, FlowState, PrimitiveVars, SecondaryVars};
use crate::MAX_VAR;

/// 边一端的输入数据
#[derive(Debug, Clone, Copy)]
pub struct EdgeEndpoint {
    /// 坐标
    pub coord: DVec3,
    /// 原始量
    pub prim: PrimitiveVars,
    /// 二级量
    pub sec: SecondaryVars,
    /// 温度梯度
    pub grad_t: DVec3,
    /// 速度梯度
    pub grad_u: DMat3,
    /// 湍动能
    pub tke: f64,
    /// 缓存的壁面剪应力（≤ 0 表示无）
    pub tau_wall: f64,
}

// `DMat3::default()` 是单位阵，速度梯度必须显式置零
impl Default for EdgeEndpoint {
    fn default() -> Self {
        Self {
            coord: DVec3::ZERO,
            prim: PrimitiveVars::default(),
            sec: SecondaryVars::default(),
            grad_t: DVec3::ZERO,
            grad_u: DMat3::ZERO,
            tke: 0.0,
            tau_wall: 0.0,
        }
    }
}

impl EdgeEndpoint {
    /// 从网格与状态中收集
    #[inline]
    pub fn gather(mesh: &ViscousMesh, state: &FlowState, v: usize) -> Self {
        Self {
            coord: mesh.vertices()[v].coord,
            prim: state.primitives[v],
            sec: state.secondary[v],
            grad_t: state.grad_temperature[v],
            grad_u: state.grad_velocity[v],
            tke: state.tke[v],
            tau_wall: state.tau_wall[v],
        }
    }
}

/// 单条边的输入
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeInput {
    /// 面积加权法向（i → j）
    pub normal: DVec3,
    /// 起点
    pub i: EdgeEndpoint,
    /// 终点
    pub j: EdgeEndpoint,
}

impl EdgeInput {
    /// 从网格与状态中收集第 `edge` 条边
    #[inline]
    pub fn gather(mesh: &ViscousMesh, state: &FlowState, edge: usize) -> Self {
        let e = &mesh.edges()[edge];
        Self {
            normal: e.normal,
            i: EdgeEndpoint::gather(mesh, state, e.i),
            j: EdgeEndpoint::gather(mesh, state, e.j),
        }
    }

    /// 交换端点并翻转法向
    pub fn reversed(&self) -> Self {
        Self {
            normal: -self.normal,
            i: self.j,
            j: self.i,
        }
    }
}

/// 单条边的通量与雅可比块
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeFlux {
    /// 投影通量
    pub flux: BlockVec,
    /// ∂F/∂U_i
    pub jacobian_i: Block,
    /// ∂F/∂U_j
    pub jacobian_j: Block,
}

impl EdgeFlux {
    /// 零通量
    pub const ZERO: Self = Self {
        flux: [0.0; MAX_VAR],
        jacobian_i: Block::ZERO,
        jacobian_j: Block::ZERO,
    };
}

/// 平均梯度粘性通量核
#[derive(Debug, Clone, Copy)]
pub struct ViscousFluxKernel {
    n_dim: usize,
    prandtl_turb: f64,
    implicit: bool,
}

impl ViscousFluxKernel {
    /// 创建通量核
    pub fn new(n_dim: usize, prandtl_turb: f64, implicit: bool) -> Self {
        Self {
            n_dim,
            prandtl_turb,
            implicit,
        }
    }

    /// 是否计算雅可比
    #[inline]
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    /// 计算单条边的通量（及雅可比）
    pub fn compute(&self, input: &EdgeInput) -> EdgeFlux {
        let (a, b) = (&input.i, &input.j);
        let n_dim = self.n_dim;
        let energy = n_dim + 1;
        let mean = |x: f64, y: f64| 0.5 * (x + y);

        // 平均状态
        let density = mean(a.prim.density, b.prim.density);
        let velocity = (a.prim.velocity + b.prim.velocity) * 0.5;
        let mu_lam = mean(a.prim.laminar_viscosity, b.prim.laminar_viscosity);
        let mu_turb = mean(a.prim.eddy_viscosity, b.prim.eddy_viscosity);
        let mu_total = mu_lam + mu_turb;
        let cp = mean(a.prim.cp, b.prim.cp);
        let tke = mean(a.tke, b.tke);
        let conductivity =
            mean(a.prim.conductivity, b.prim.conductivity) + cp * mu_turb / self.prandtl_turb;

        // 平均梯度 + 沿边修正
        let edge_vec = b.coord - a.coord;
        let dist2 = edge_vec.length_squared();
        let mut grad_t = (a.grad_t + b.grad_t) * 0.5;
        let mut grad_u = (a.grad_u + b.grad_u) * 0.5;
        if dist2 > 0.0 {
            let dt = b.prim.temperature - a.prim.temperature;
            grad_t -= edge_vec * ((grad_t.dot(edge_vec) - dt) / dist2);

            let du = b.prim.velocity - a.prim.velocity;
            let corr = (grad_u * edge_vec - du) / dist2;
            grad_u = grad_u
                - DMat3::from_cols(corr * edge_vec.x, corr * edge_vec.y, corr * edge_vec.z);
        }

        let area = input.normal.length();
        let unit_normal = if area > 0.0 {
            input.normal / area
        } else {
            DVec3::ZERO
        };

        let mut tau = stress_tensor(&grad_u, mu_total, density, tke);
        if a.tau_wall > 0.0 && b.tau_wall > 0.0 {
            add_tau_wall(&mut tau, unit_normal, mean(a.tau_wall, b.tau_wall));
        }
        let heat_flux = heat_flux_vector(grad_t, conductivity);

        let tau_n = tau * input.normal;
        let mut flux = [0.0; MAX_VAR];
        for d in 0..n_dim {
            flux[d + 1] = tau_n[d];
        }
        flux[energy] = (tau * velocity + heat_flux).dot(input.normal);

        let mut result = EdgeFlux {
            flux,
            ..EdgeFlux::ZERO
        };

        if self.implicit && dist2 > 0.0 && density > 0.0 {
            let dist = dist2.sqrt();
            let static_energy = mean(a.prim.static_energy, b.prim.static_energy);
            let dt_drho_e = mean(a.sec.dt_drho_e, b.sec.dt_drho_e);
            let dt_de_rho = mean(a.sec.dt_de_rho, b.sec.dt_de_rho);

            let inputs = JacobianInputs {
                n_dim,
                area,
                unit_normal,
                dist,
                density,
                velocity,
                mu_total,
                conductivity,
                tke,
                static_energy,
                dt_drho_e,
                dt_de_rho,
                tau_n,
            };
            let (jac_i, jac_j) = thin_shear_layer_jacobians(&inputs);
            result.jacobian_i = jac_i;
            result.jacobian_j = jac_j;
        }

        result
    }
}

struct JacobianInputs {
    n_dim: usize,
    area: f64,
    unit_normal: DVec3,
    dist: f64,
    density: f64,
    velocity: DVec3,
    mu_total: f64,
    conductivity: f64,
    tke: f64,
    static_energy: f64,
    dt_drho_e: f64,
    dt_de_rho: f64,
    tau_n: DVec3,
}

fn thin_shear_layer_jacobians(p: &JacobianInputs) -> (Block, Block) {
    let n_dim = p.n_dim;
    let energy = n_dim + 1;
    let n = p.unit_normal;
    let u = p.velocity;
    let xi_a = p.mu_total / (p.density * p.dist) * p.area;

    // Θ = I + n nᵀ / 3
    let theta = |r: usize, c: usize| -> f64 {
        let delta = if r == c { 1.0 } else { 0.0 };
        delta + n[r] * n[c] / 3.0
    };

    let mut jac_j = Block::ZERO;
    for r in 0..n_dim {
        let mut theta_u = 0.0;
        for c in 0..n_dim {
            let t = theta(r, c);
            jac_j.0[r + 1][c + 1] = xi_a * t;
            theta_u += t * u[c];
        }
        jac_j.0[r + 1][0] = -xi_a * theta_u;
    }
    let mut jac_i = jac_j;
    for r in 1..=n_dim {
        for c in 0..MAX_VAR {
            jac_i.0[r][c] = -jac_i.0[r][c];
        }
    }

    // 温度对守恒量的导数（平均状态）
    let rho = p.density;
    let q2 = u.length_squared();
    let mut dtdu = [0.0; MAX_VAR];
    dtdu[0] = p.dt_drho_e + p.dt_de_rho * (0.5 * q2 - p.static_energy - p.tke) / rho;
    for d in 0..n_dim {
        dtdu[d + 1] = -p.dt_de_rho * u[d] / rho;
    }
    dtdu[energy] = p.dt_de_rho / rho;

    // ½ (τ·n) · ∂ū/∂U，对 i 和 j 同号
    let mut dvel = [0.0; MAX_VAR];
    dvel[0] = -0.5 * p.tau_n.dot(u) / rho;
    for d in 0..n_dim {
        dvel[d + 1] = 0.5 * p.tau_n[d] / rho;
    }

    let heat = p.conductivity * p.area / p.dist;
    for c in 0..=energy {
        let mut work_i = 0.0;
        let mut work_j = 0.0;
        for d in 0..n_dim {
            work_i += u[d] * jac_i.0[d + 1][c];
            work_j += u[d] * jac_j.0[d + 1][c];
        }
        jac_i.0[energy][c] = work_i - heat * dtdu[c] + dvel[c];
        jac_j.0[energy][c] = work_j + heat * dtdu[c] + dvel[c];
    }

    (jac_i, jac_j)
}
