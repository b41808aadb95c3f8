// crates/vf_physics/src/monitoring/skin_friction.rs

//! 壁面摩擦系数
//!
//! `C_f = τ_t / (½ ρ_∞ |V_∞|²)`，τ_t 为层流应力在指向流体内部的法向上的
//! 切向分量。壁面函数启用且顶点已有缓存剪应力时，模长取缓存值，
//! 方向仍取层流应力的切向方向。

use glam::DVec3;
use rayon::prelude::*;
use vf_foundation::MarkerIndex;

use crate::mesh::ViscousMesh;
use crate::numerics::{stress_tensor, tangential_traction};
use crate::state::FlowState;

/// 按标记存储的摩擦系数（与网格标记一一对应，非壁面标记为空）
#[derive(Debug, Clone, Default)]
pub struct SkinFriction {
    per_marker: Vec<Vec<DVec3>>,
}

impl SkinFriction {
    /// 全零，形状与网格一致
    pub fn zeros(mesh: &ViscousMesh) -> Self {
        Self {
            per_marker: mesh.markers().iter().map(|_| Vec::new()).collect(),
        }
    }

    /// 标记上全部顶点的摩擦系数（按标记内序号）
    pub fn marker(&self, marker: MarkerIndex) -> &[DVec3] {
        self.per_marker
            .get(marker.get())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 直接设置一个标记的摩擦系数
    pub fn set_marker(&mut self, marker: MarkerIndex, values: Vec<DVec3>) {
        if let Some(slot) = self.per_marker.get_mut(marker.get()) {
            *slot = values;
        }
    }
}

/// 计算指定标记上全部顶点（含 halo）的摩擦系数
pub fn compute_skin_friction(
    mesh: &ViscousMesh,
    state: &FlowState,
    markers: &[MarkerIndex],
    dynamic_pressure: f64,
    use_wall_function: bool,
) -> SkinFriction {
    let mut out = SkinFriction::zeros(mesh);
    let factor = if dynamic_pressure > 0.0 {
        1.0 / dynamic_pressure
    } else {
        0.0
    };

    for &m in markers {
        let values = mesh
            .marker(m)
            .vertices
            .par_iter()
            .map(|bv| {
                let v = bv.vertex;
                let inward = -bv.unit_outward_normal();
                let prim = &state.primitives[v];
                let tau = stress_tensor(&state.grad_velocity[v], prim.laminar_viscosity, prim.density, 0.0);
                let mut traction = tangential_traction(&tau, inward);

                let cached = state.tau_wall[v];
                if use_wall_function && cached > 0.0 {
                    let mag = traction.length();
                    if mag > 0.0 {
                        traction *= cached / mag;
                    }
                }
                traction * factor
            })
            .collect();
        out.set_marker(m, values);
    }

    out
}
