// crates/vf_physics/src/numerics/stress.rs

//! 应力张量核
//!
//! 纯函数，供边通量组装、运动壁面修正、壁面函数初值与表面摩擦共用。
//!
//! ```text
//! τ_ab = μ (∂u_a/∂x_b + ∂u_b/∂x_a) - δ_ab · 2/3 (μ ∇·u + ρ k)
//! ```

use glam::{DMat3, DVec3};

/// 构造粘性应力张量
///
/// # 参数
/// - `grad_u`: 速度梯度，`grad_u.col(b)[a] = ∂u_a/∂x_b`
/// - `viscosity`: 有效（层流 + 涡）粘度
/// - `density`, `tke`: 湍动能各向同性部分 ρk，层流时 `tke = 0`
#[inline]
pub fn stress_tensor(grad_u: &DMat3, viscosity: f64, density: f64, tke: f64) -> DMat3 {
    let div = divergence(grad_u);
    let p_term = 2.0 / 3.0 * (viscosity * div + density * tke);
    (*grad_u + grad_u.transpose()) * viscosity - DMat3::from_diagonal(DVec3::splat(p_term))
}

/// 速度散度
#[inline]
pub fn divergence(grad_u: &DMat3) -> f64 {
    grad_u.x_axis.x + grad_u.y_axis.y + grad_u.z_axis.z
}

/// 应力在面上的切向分量
///
/// `unit_normal` 为单位法向；返回 τ·n 去除法向分量后的向量。
#[inline]
pub fn tangential_traction(tau: &DMat3, unit_normal: DVec3) -> DVec3 {
    let traction = *tau * unit_normal;
    traction - unit_normal * traction.dot(unit_normal)
}

/// 用给定壁面剪应力重新标定应力张量
///
/// 将 τ 整体缩放，使其在 `unit_normal` 面上的切向应力模等于 `tau_wall`。
/// 切向应力为零时不做修改。
#[inline]
pub fn add_tau_wall(tau: &mut DMat3, unit_normal: DVec3, tau_wall: f64) {
    let wall_shear = tangential_traction(tau, unit_normal).length();
    if wall_shear > 0.0 {
        *tau = *tau * (tau_wall / wall_shear);
    }
}

/// 热流向量 q = κ_eff ∇T
#[inline]
pub fn heat_flux_vector(grad_t: DVec3, conductivity: f64) -> DVec3 {
    grad_t * conductivity
}

/// 应变率模 |S| = √(2 S_ij S_ij)，S 为无迹应变率张量
#[inline]
pub fn strain_rate_magnitude(grad_u: &DMat3) -> f64 {
    let div = divergence(grad_u);
    let s = (*grad_u + grad_u.transpose()) * 0.5 - DMat3::from_diagonal(DVec3::splat(div / 3.0));
    let sum: f64 = [s.x_axis, s.y_axis, s.z_axis]
        .iter()
        .map(|c| c.length_squared())
        .sum();
    (2.0 * sum).sqrt()
}

/// 涡量向量 ω = ∇ × u
#[inline]
pub fn vorticity(grad_u: &DMat3) -> DVec3 {
    // grad_u.col(b)[a] = ∂u_a/∂x_b
    let d = |a: usize, b: usize| grad_u.col(b)[a];
    DVec3::new(d(2, 1) - d(1, 2), d(0, 2) - d(2, 0), d(1, 0) - d(0, 1))
}
