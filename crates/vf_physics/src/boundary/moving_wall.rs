// crates/vf_physics/src/boundary/moving_wall.rs

//! 运动壁面修正
//!
//! 壁面以网格速度 v_g 运动时，能量方程增加压力功与剪切功：
//!
//! ```text
//! Res_conv += p (v_g·n̂) A
//! Res_visc += ((τ·v_g)·n̂) A
//! ```
//!
//! 隐式时同时给出能量行的压力线化与薄剪切层线化。

use glam::{DMat3, DVec3};

use crate::engine::Block;
use crate::numerics::stress_tensor;

/// 运动壁面输入
#[derive(Debug, Clone, Copy)]
pub struct MovingWallInput {
    /// 空间维数
    pub n_dim: usize,
    /// 单位外法向
    pub unit_normal: DVec3,
    /// 对偶面积
    pub area: f64,
    /// 网格速度
    pub grid_velocity: DVec3,
    /// 壁面顶点密度
    pub density: f64,
    /// 壁面顶点压力
    pub pressure: f64,
    /// 壁面顶点总粘度
    pub total_viscosity: f64,
    /// 壁面顶点速度梯度
    pub grad_u: DMat3,
    /// 到法向邻点的距离
    pub distance: f64,
    /// 比热比
    pub gamma: f64,
}

/// 计算运动壁面贡献，返回 `(Res_conv, Res_visc)` 增量
///
/// `jacobian` 非空时在其能量行上累加线化项。
pub fn moving_wall_contribution(input: &MovingWallInput, jacobian: Option<&mut Block>) -> (f64, f64) {
    let n_dim = input.n_dim;
    let energy = n_dim + 1;
    let n = input.unit_normal;
    let vg = input.grid_velocity;
    let proj_grid_vel = input.area * vg.dot(n);

    let tau = stress_tensor(&input.grad_u, input.total_viscosity, input.density, 0.0);
    let tau_vel = tau * vg;

    let res_conv = input.pressure * proj_grid_vel;
    let res_visc = tau_vel.dot(n) * input.area;

    if let Some(jac) = jacobian {
        let gm1 = input.gamma - 1.0;
        let row = jac.row_mut(energy);

        // 压力项
        row[0] += 0.5 * gm1 * vg.length_squared() * proj_grid_vel;
        for d in 0..n_dim {
            row[d + 1] -= gm1 * vg[d] * proj_grid_vel;
        }
        row[energy] += gm1 * proj_grid_vel;

        // 剪切项
        let factor = input.total_viscosity * input.area / (input.density * input.distance);
        let theta = |a: usize| 1.0 + n[a] * n[a] / 3.0;
        let eta = |a: usize, b: usize| n[a] * n[b] / 3.0;

        if n_dim == 2 {
            let pix = vg.x * theta(0) + vg.y * eta(0, 1);
            let piy = vg.x * eta(0, 1) + vg.y * theta(1);
            row[0] += factor * (-pix * vg.x + piy * vg.y);
            row[1] += factor * pix;
            row[2] += factor * piy;
        } else {
            let pix = vg.x * theta(0) + vg.y * eta(0, 1) + vg.z * eta(0, 2);
            let piy = vg.x * eta(0, 1) + vg.y * theta(1) + vg.z * eta(1, 2);
            let piz = vg.x * eta(0, 2) + vg.y * eta(1, 2) + vg.z * theta(2);
            row[0] += factor * (-pix * vg.x + piy * vg.y + piz * vg.z);
            row[1] += factor * pix;
            row[2] += factor * piy;
            row[3] += factor * piz;
        }
    }

    (res_conv, res_visc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(n_dim: usize, grid_velocity: DVec3) -> MovingWallInput {
        MovingWallInput {
            n_dim,
            unit_normal: DVec3::new(0.0, -1.0, 0.0),
            area: 2.0,
            grid_velocity,
            density: 1.0,
            pressure: 3.0,
            total_viscosity: 0.5,
            grad_u: DMat3::from_cols(DVec3::ZERO, DVec3::new(4.0, 0.0, 0.0), DVec3::ZERO),
            distance: 0.1,
            gamma: 1.4,
        }
    }

    #[test]
    fn test_tangential_motion_has_no_pressure_work() {
        let (conv, visc) = moving_wall_contribution(&input(2, DVec3::new(1.0, 0.0, 0.0)), None);
        assert_eq!(conv, 0.0);
        // τ_xy = μ·4 = 2，(τ·v_g)·n̂ = τ_yx·1·(-1) = -2
        assert!((visc + 2.0 * 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_normal_motion_pressure_work_and_jacobian() {
        let mut jac = Block::ZERO;
        let inp = input(2, DVec3::new(0.0, -1.0, 0.0));
        let (conv, _) = moving_wall_contribution(&inp, Some(&mut jac));
        // p · A · (v_g·n̂) = 3 · 2 · 1
        assert!((conv - 6.0).abs() < 1e-14);

        let proj = 2.0;
        let factor = 0.5 * 2.0 / (1.0 * 0.1);
        let piy = -1.0 * (1.0 + 1.0 / 3.0);
        assert!((jac.get(3, 3) - 0.4 * proj).abs() < 1e-14);
        assert!((jac.get(3, 2) - (0.4 * proj + factor * piy)).abs() < 1e-12);
        assert!((jac.get(3, 0) - (0.5 * 0.4 * proj + factor * piy * -1.0)).abs() < 1e-12);
        // 其他行不动
        assert_eq!(jac.get(1, 1), 0.0);
    }

    #[test]
    fn test_oblique_wall_energy_row_3d() {
        let n = DVec3::new(1.0, 2.0, 2.0) / 3.0;
        let vg = DVec3::new(0.3, -0.5, 0.8);
        let (area, rho, p, mu, d, a) = (2.0, 1.5, 3.0, 0.5, 0.1, 4.0);
        let inp = MovingWallInput {
            n_dim: 3,
            unit_normal: n,
            area,
            grid_velocity: vg,
            density: rho,
            pressure: p,
            total_viscosity: mu,
            grad_u: DMat3::from_cols(DVec3::ZERO, DVec3::new(a, 0.0, 0.0), DVec3::ZERO),
            distance: d,
            gamma: 1.4,
        };
        let mut jac = Block::ZERO;
        let (conv, visc) = moving_wall_contribution(&inp, Some(&mut jac));

        let proj = area * vg.dot(n);
        assert!((conv - p * proj).abs() < 1e-14);
        // 只有 τ_xy = τ_yx = μa
        let tau_vel_n = mu * a * (vg.y * n.x + vg.x * n.y);
        assert!((visc - tau_vel_n * area).abs() < 1e-14);

        // Π = (I + n̂n̂ᵀ/3) v_g
        let pi = vg + n * (n.dot(vg) / 3.0);
        let gm1 = 0.4;
        let factor = mu * area / (rho * d);
        let expected = [
            0.5 * gm1 * vg.length_squared() * proj + factor * (-pi.x * vg.x + pi.y * vg.y + pi.z * vg.z),
            -gm1 * vg.x * proj + factor * pi.x,
            -gm1 * vg.y * proj + factor * pi.y,
            -gm1 * vg.z * proj + factor * pi.z,
            gm1 * proj,
        ];
        for (c, e) in expected.iter().enumerate() {
            assert!((jac.get(4, c) - e).abs() < 1e-12, "列 {}: {} vs {}", c, jac.get(4, c), e);
        }
        for r in 0..4 {
            for c in 0..5 {
                assert_eq!(jac.get(r, c), 0.0);
            }
        }
    }

    #[test]
    fn test_static_wall_contributes_nothing() {
        let mut jac = Block::ZERO;
        let (conv, visc) = moving_wall_contribution(&input(3, DVec3::ZERO), Some(&mut jac));
        assert_eq!(conv, 0.0);
        assert_eq!(visc, 0.0);
        assert_eq!(jac, Block::ZERO);
    }
}
