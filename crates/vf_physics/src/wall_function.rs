// crates/vf_physics/src/wall_function.rs

//! 可压缩壁面函数
//!
//! 网格不解析边界层时，由第一层内点的切向速度反求壁面剪应力。
//! 使用 Spalding 统一速度型，外层形式取 White-Christoph 的可压缩修正，
//! 逆公式按 Nichols-Nelson：
//!
//! ```text
//! u_τ = √(τ/ρ_w),  u⁺ = |u_t|/u_τ
//! Γ = r u_τ² / (2 c_p T_w),  β = 0,  Q = √(β² + 4Γ),  Φ = asin(-β/Q)
//! y⁺_W = exp((κ/√Γ)(asin((2Γu⁺ - β)/Q) - Φ)) · e^{-κB}
//! y⁺ = u⁺ + y⁺_W - e^{-κB} (1 + κu⁺ (1 + κu⁺/2 + (κu⁺)²/6))
//! τ_new = (y⁺ μ_w / y)² / ρ_w
//! ```
//!
//! 壁面状态：`T_w = T_nb + r |u_t|²/(2 c_p)`，`ρ_w = p_nb / (R T_w)`，
//! 恢复系数 `r = Pr_lam^(1/3)`。
//!
//! [`solve_wall_shear_stress`] 是纯函数，顶点之间无依赖；
//! [`refresh_wall_shear_stress`] 在全部壁面顶点上并行调用它并缓存结果。

use glam::DVec3;
use rayon::prelude::*;
use vf_config::WallFunctionConfig;
use vf_foundation::{Counter, MarkerIndex};

use crate::mesh::ViscousMesh;
use crate::numerics::{stress_tensor, tangential_traction};
use crate::state::FlowState;

// ============================================================
// 参数与输入
// ============================================================

/// 壁面函数参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallFunctionParams {
    /// von Kármán 常数
    pub kappa: f64,
    /// 对数律截距
    pub b: f64,
    /// 最大迭代次数
    pub max_iter: usize,
    /// 收敛容差（剪应力绝对变化）
    pub tolerance: f64,
    /// 欠松弛因子
    pub relaxation: f64,
}

impl Default for WallFunctionParams {
    fn default() -> Self {
        Self {
            kappa: 0.4,
            b: 5.5,
            max_iter: 10,
            tolerance: 1e-6,
            relaxation: 0.25,
        }
    }
}

impl From<&WallFunctionConfig> for WallFunctionParams {
    fn from(c: &WallFunctionConfig) -> Self {
        Self {
            kappa: c.kappa,
            b: c.b,
            max_iter: c.max_iter,
            tolerance: c.tolerance,
            relaxation: c.relaxation,
        }
    }
}

/// 单个壁面顶点的输入
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallFunctionInputs {
    /// 内点切向速度模
    pub tangential_velocity: f64,
    /// 内点到壁面距离
    pub distance: f64,
    /// 壁面层流粘度
    pub viscosity: f64,
    /// 壁面密度
    pub density: f64,
    /// 壁面温度
    pub temperature: f64,
    /// 定压比热
    pub cp: f64,
    /// 恢复系数
    pub recovery: f64,
}

/// 求解结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallFunctionOutcome {
    /// 壁面剪应力
    pub tau_wall: f64,
    /// 迭代次数
    pub iterations: usize,
    /// 是否收敛
    pub converged: bool,
}

/// 恢复系数 r = Pr^(1/3)
#[inline]
pub fn recovery_factor(prandtl_lam: f64) -> f64 {
    prandtl_lam.powf(1.0 / 3.0)
}

/// 壁面温度与密度 `(T_w, ρ_w)`
#[inline]
pub fn wall_state(
    neighbor_temperature: f64,
    neighbor_pressure: f64,
    tangential_velocity: f64,
    recovery: f64,
    cp: f64,
    gas_constant: f64,
) -> (f64, f64) {
    let t_wall = neighbor_temperature + recovery * tangential_velocity * tangential_velocity / (2.0 * cp);
    (t_wall, neighbor_pressure / (gas_constant * t_wall))
}

/// 给定摩擦速度与 u⁺ 的可压缩 Spalding y⁺
#[inline]
pub fn spalding_y_plus(u_plus: f64, u_tau: f64, inputs: &WallFunctionInputs, params: &WallFunctionParams) -> f64 {
    let kappa = params.kappa;
    let gam = inputs.recovery * u_tau * u_tau / (2.0 * inputs.cp * inputs.temperature);
    let beta = 0.0;
    let q = (beta * beta + 4.0 * gam).sqrt();
    let phi = (-beta / q).asin();
    let e_kb = (-kappa * params.b).exp();

    let y_plus_white = ((kappa / gam.sqrt()) * (((2.0 * gam * u_plus - beta) / q).asin() - phi)).exp() * e_kb;
    let ku = kappa * u_plus;
    u_plus + y_plus_white - e_kb * (1.0 + ku * (1.0 + 0.5 * ku + ku * ku / 6.0))
}

// ============================================================
// 求解
// ============================================================

/// 不动点迭代求壁面剪应力
///
/// 以 `seed` 为初值（必须为正），每步欠松弛更新，`|τ_new - τ| ≤ tol` 时停止。
/// 返回值为最后一次由 y⁺ 反算的 `τ_new`，松弛值只作为内部迭代量。
/// 未收敛时同样返回最后一个有限的 `τ_new` 并标记 `converged = false`；
/// 第一步即出现非有限值时返回 `seed`。
pub fn solve_wall_shear_stress(
    inputs: &WallFunctionInputs,
    seed: f64,
    params: &WallFunctionParams,
) -> WallFunctionOutcome {
    if !(inputs.tangential_velocity > 0.0) {
        return WallFunctionOutcome {
            tau_wall: 0.0,
            iterations: 0,
            converged: true,
        };
    }

    let rho = inputs.density;
    let mut tau = seed;
    let mut result = seed;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < params.max_iter {
        iterations += 1;

        let u_tau = (tau / rho).sqrt();
        let u_plus = inputs.tangential_velocity / u_tau;
        let y_plus = spalding_y_plus(u_plus, u_tau, inputs, params);
        let tau_new = (y_plus * inputs.viscosity / inputs.distance).powi(2) / rho;

        if !tau_new.is_finite() {
            break;
        }
        result = tau_new;

        let diff = (tau_new - tau).abs();
        tau += params.relaxation * (tau_new - tau);

        if diff <= params.tolerance {
            converged = true;
            break;
        }
    }

    WallFunctionOutcome {
        tau_wall: result,
        iterations,
        converged,
    }
}

// ============================================================
// 驱动
// ============================================================

/// 壁面函数刷新所需的气体常数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallFunctionGas {
    /// 定压比热
    pub cp: f64,
    /// 气体常数
    pub gas_constant: f64,
    /// 层流 Prandtl 数
    pub prandtl_lam: f64,
}

/// 一次刷新的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallFunctionStats {
    /// 处理的顶点数
    pub vertices: usize,
    /// 未收敛顶点数
    pub non_converged: usize,
}

/// 在给定标记的全部本分区顶点上刷新壁面剪应力缓存
pub fn refresh_wall_shear_stress(
    mesh: &ViscousMesh,
    state: &mut FlowState,
    markers: &[MarkerIndex],
    gas: &WallFunctionGas,
    params: &WallFunctionParams,
    non_converged: &Counter,
) -> WallFunctionStats {
    let recovery = recovery_factor(gas.prandtl_lam);
    let mut stats = WallFunctionStats::default();

    for &m in markers {
        let marker = mesh.marker(m);
        let results: Vec<(usize, WallFunctionOutcome)> = {
            let state = &*state;
            marker
                .vertices
                .par_iter()
                .filter(|bv| mesh.vertices()[bv.vertex].is_domain)
                .map(|bv| {
                    let v = bv.vertex;
                    let nb = bv.normal_neighbor;
                    let n = bv.unit_outward_normal();
                    let prim_nb = &state.primitives[nb];
                    let prim_w = &state.primitives[v];

                    let vel = prim_nb.velocity;
                    let vel_tang = vel - n * vel.dot(n);
                    let u_t = vel_tang.length();
                    let distance = mesh.distance(v, nb);

                    let (t_wall, rho_wall) = wall_state(
                        prim_nb.temperature,
                        prim_nb.pressure,
                        u_t,
                        recovery,
                        gas.cp,
                        gas.gas_constant,
                    );
                    let inputs = WallFunctionInputs {
                        tangential_velocity: u_t,
                        distance,
                        viscosity: prim_w.laminar_viscosity,
                        density: rho_wall,
                        temperature: t_wall,
                        cp: gas.cp,
                        recovery,
                    };

                    let seed = initial_guess(state, v, n, &inputs);
                    let outcome = solve_wall_shear_stress(&inputs, seed, params);
                    if !outcome.converged {
                        non_converged.inc();
                        log::warn!(
                            "壁面函数未收敛: 标记 '{}' 顶点 {}, τ_w = {:.6e}, 迭代 {}",
                            marker.tag,
                            v,
                            outcome.tau_wall,
                            outcome.iterations
                        );
                    }
                    (v, outcome)
                })
                .collect()
        };

        for (v, outcome) in &results {
            state.tau_wall[*v] = outcome.tau_wall;
            stats.vertices += 1;
            if !outcome.converged {
                stats.non_converged += 1;
            }
        }
    }

    log::debug!(
        "壁面函数刷新: {} 个顶点, {} 个未收敛",
        stats.vertices,
        stats.non_converged
    );
    stats
}

/// 初值：缓存值 > 层流壁面切应力 > μU/y
fn initial_guess(state: &FlowState, v: usize, unit_normal: DVec3, inputs: &WallFunctionInputs) -> f64 {
    let cached = state.tau_wall[v];
    if cached > 0.0 {
        return cached;
    }
    let tau = stress_tensor(&state.grad_velocity[v], inputs.viscosity, 0.0, 0.0);
    let laminar = tangential_traction(&tau, unit_normal).length();
    if laminar > 0.0 && laminar.is_finite() {
        return laminar;
    }
    inputs.viscosity * inputs.tangential_velocity / inputs.distance
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造一个解析解已知的输入：给定 τ* 反推距离 y
    fn log_law_case(tau_star: f64, u_plus: f64) -> WallFunctionInputs {
        let density = 1.0;
        let u_tau = (tau_star / density).sqrt();
        let mut inputs = WallFunctionInputs {
            tangential_velocity: u_plus * u_tau,
            distance: 1.0,
            viscosity: 1.8e-5,
            density,
            temperature: 300.0,
            cp: 1005.0,
            recovery: recovery_factor(0.72),
        };
        let y_plus = spalding_y_plus(u_plus, u_tau, &inputs, &WallFunctionParams::default());
        inputs.distance = y_plus * inputs.viscosity / (density * u_tau);
        inputs
    }

    #[test]
    fn test_converges_to_log_law_solution() {
        let params = WallFunctionParams::default();
        let inputs = log_law_case(0.04, 10.0);
        let out = solve_wall_shear_stress(&inputs, 0.036, &params);
        assert!(out.converged);
        assert!(out.iterations <= params.max_iter);
        assert!((out.tau_wall - 0.04).abs() / 0.04 < 1e-4);
    }

    #[test]
    fn test_idempotent_with_own_output_as_seed() {
        let params = WallFunctionParams::default();
        let inputs = log_law_case(0.04, 10.0);
        let first = solve_wall_shear_stress(&inputs, 0.036, &params);
        let second = solve_wall_shear_stress(&inputs, first.tau_wall, &params);
        assert!(second.converged);
        assert!((second.tau_wall - first.tau_wall).abs() < params.tolerance);
    }

    #[test]
    fn test_iteration_cap_reports_non_convergence() {
        let params = WallFunctionParams {
            max_iter: 2,
            ..Default::default()
        };
        let inputs = log_law_case(0.04, 10.0);
        let out = solve_wall_shear_stress(&inputs, 0.004, &params);
        assert!(!out.converged);
        assert_eq!(out.iterations, 2);
        assert!(out.tau_wall.is_finite() && out.tau_wall > 0.0);
    }

    #[test]
    fn test_returns_unrelaxed_update() {
        let params = WallFunctionParams {
            max_iter: 1,
            ..Default::default()
        };
        let inputs = log_law_case(0.04, 10.0);
        let seed = 0.5;
        let out = solve_wall_shear_stress(&inputs, seed, &params);

        let u_tau = (seed / inputs.density).sqrt();
        let u_plus = inputs.tangential_velocity / u_tau;
        let y_plus = spalding_y_plus(u_plus, u_tau, &inputs, &params);
        let tau_new = (y_plus * inputs.viscosity / inputs.distance).powi(2) / inputs.density;

        assert_eq!(out.iterations, 1);
        assert!(!out.converged);
        assert!((out.tau_wall - tau_new).abs() <= 1e-12 * tau_new.abs());
        let relaxed = seed + params.relaxation * (tau_new - seed);
        assert!((out.tau_wall - relaxed).abs() > 1e-6);
    }

    #[test]
    fn test_zero_velocity_gives_zero_stress() {
        let mut inputs = log_law_case(0.04, 10.0);
        inputs.tangential_velocity = 0.0;
        let out = solve_wall_shear_stress(&inputs, 1.0, &WallFunctionParams::default());
        assert_eq!(out.tau_wall, 0.0);
        assert!(out.converged);
    }

    #[test]
    fn test_wall_state() {
        let (t, rho) = wall_state(300.0, 101325.0, 0.0, 0.9, 1005.0, 287.0);
        assert_eq!(t, 300.0);
        assert!((rho - 101325.0 / (287.0 * 300.0)).abs() < 1e-12);
        let (t, _) = wall_state(300.0, 101325.0, 100.0, 1.0, 1000.0, 287.0);
        assert!((t - 305.0).abs() < 1e-12);
    }
}
