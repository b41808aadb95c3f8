// crates/vf_physics/src/boundary/enforcer.rs

//! 统一壁面施加流程
//!
//! 对标记上每个本分区顶点（halo 跳过）：
//!
//! 1. 面积 `A = |n|`，单位外法向 `n̂ = -n/A`
//! 2. 旧速度置为 0（运动网格取网格速度），动量残差与动量截断误差清零
//! 3. 热残差：`q A` 或 `κ (T_w - T_nb)/d · A`
//! 4. 运动网格：压力功与剪切功修正
//! 5. `R[E] += Res_conv - Res_visc`
//! 6. 隐式：能量行块加到对角块，动量标量行清零并置对角元为 1
//!
//! 顶点间无数据依赖：先并行计算每个顶点的更新量，再串行写回。

use glam::DVec3;
use rayon::prelude::*;
use vf_foundation::MarkerIndex;

use super::moving_wall::{moving_wall_contribution, MovingWallInput};
use super::thermal::{WallThermalCondition, WallThermalLaw, WallVertexContext};
use crate::engine::{Block, LinearSystem};
use crate::mesh::ViscousMesh;
use crate::state::FlowState;

/// 壁面处理所需的气体常数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallGas {
    /// 比热比
    pub gamma: f64,
    /// 气体常数
    pub gas_constant: f64,
    /// 层流 Prandtl 数
    pub prandtl_lam: f64,
    /// 湍流 Prandtl 数
    pub prandtl_turb: f64,
}

impl WallGas {
    /// 定压比热 γR/(γ-1)
    #[inline]
    pub fn cp(&self) -> f64 {
        self.gamma / (self.gamma - 1.0) * self.gas_constant
    }

    /// 有效导热系数 c_p (μ/Pr + μ_t/Pr_t)
    #[inline]
    pub fn conductivity(&self, laminar_viscosity: f64, eddy_viscosity: f64) -> f64 {
        self.cp() * (laminar_viscosity / self.prandtl_lam + eddy_viscosity / self.prandtl_turb)
    }
}

/// 一次壁面处理的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallPassStats {
    /// 处理的顶点数
    pub vertices: usize,
    /// 跳过的 halo 顶点数
    pub halo_skipped: usize,
}

/// 单个壁面顶点的更新量
#[derive(Debug, Clone, Copy)]
struct WallVertexUpdate {
    vertex: usize,
    velocity_old: DVec3,
    energy_residual: f64,
    diag_block: Option<Block>,
}

/// 壁面施加器
#[derive(Debug, Clone, Copy)]
pub struct WallEnforcer {
    gas: WallGas,
    implicit: bool,
}

impl WallEnforcer {
    /// 创建施加器
    pub fn new(gas: WallGas, implicit: bool) -> Self {
        Self { gas, implicit }
    }

    /// 气体常数
    pub fn gas(&self) -> &WallGas {
        &self.gas
    }

    /// 在一个标记上施加无滑移壁面
    pub fn enforce(
        &self,
        mesh: &ViscousMesh,
        marker: MarkerIndex,
        law: &dyn WallThermalLaw,
        state: &mut FlowState,
        system: &mut LinearSystem,
    ) -> WallPassStats {
        let boundary = mesh.marker(marker);
        let implicit = self.implicit && system.is_implicit();

        let updates: Vec<WallVertexUpdate> = {
            let state = &*state;
            boundary
                .vertices
                .par_iter()
                .enumerate()
                .filter(|(_, bv)| mesh.vertices()[bv.vertex].is_domain)
                .map(|(ordinal, bv)| {
                    self.vertex_update(mesh, state, marker, ordinal, bv, law, implicit)
                })
                .collect()
        };

        let n_dim = mesh.n_dim();
        let energy = n_dim + 1;
        for up in &updates {
            let v = up.vertex;
            state.velocity_old[v] = up.velocity_old;
            state.zero_velocity_trunc_error(v);
            system.residual.zero_momentum(v);
            system.residual.add_value(v, energy, up.energy_residual);

            if let Some(jac) = system.jacobian.as_mut() {
                if let Some(block) = up.diag_block.as_ref() {
                    jac.add_block_to_diag(v, block);
                }
                for var in 1..=n_dim {
                    jac.delete_vals_row(v, var);
                }
            }
        }

        let stats = WallPassStats {
            vertices: updates.len(),
            halo_skipped: boundary.vertices.len() - updates.len(),
        };
        log::trace!(
            "壁面 '{}' ({:?}): {} 个顶点, 跳过 halo {}",
            boundary.tag,
            law.kind(),
            stats.vertices,
            stats.halo_skipped
        );
        stats
    }

    #[allow(clippy::too_many_arguments)]
    fn vertex_update(
        &self,
        mesh: &ViscousMesh,
        state: &FlowState,
        marker: MarkerIndex,
        ordinal: usize,
        bv: &crate::mesh::BoundaryVertex,
        law: &dyn WallThermalLaw,
        implicit: bool,
    ) -> WallVertexUpdate {
        let n_dim = mesh.n_dim();
        let energy = n_dim + 1;
        let v = bv.vertex;
        let nb = bv.normal_neighbor;
        let gas = &self.gas;

        let area = bv.area();
        let unit_normal = bv.unit_outward_normal();
        let distance = mesh.distance(v, nb);
        let dynamic = mesh.is_dynamic();
        let grid_velocity = mesh.vertices()[v].grid_velocity;

        let prim = &state.primitives[v];
        let conductivity = gas.conductivity(prim.laminar_viscosity, prim.eddy_viscosity);
        let ctx = WallVertexContext {
            marker,
            ordinal,
            vertex: v,
            conductivity,
            distance,
            neighbor_temperature: state.primitives[nb].temperature,
        };

        let mut res_conv = 0.0;
        let mut res_visc;
        let mut diag_block = None;

        match law.condition(&ctx) {
            WallThermalCondition::HeatFlux(q) => {
                res_visc = q * area;
                if dynamic && implicit {
                    // 能量行从零开始
                    diag_block = Some(Block::ZERO);
                }
            }
            WallThermalCondition::Temperature(t_wall) => {
                let dtdn = -(ctx.neighbor_temperature - t_wall) / distance;
                res_visc = conductivity * dtdn * area;

                if implicit {
                    let rho = prim.density;
                    let vel2 = prim.velocity.length_squared();
                    let gm1 = gas.gamma - 1.0;
                    let dt_drho = (-t_wall + gm1 / gas.gas_constant * 0.5 * vel2) / rho;

                    let mut block = Block::ZERO;
                    block.set(energy, 0, conductivity / distance * dt_drho * area);
                    block.set(
                        energy,
                        energy,
                        conductivity / distance * gm1 / (gas.gas_constant * rho) * area,
                    );
                    diag_block = Some(block);
                }
            }
        }

        if dynamic {
            let input = MovingWallInput {
                n_dim,
                unit_normal,
                area,
                grid_velocity,
                density: prim.density,
                pressure: prim.pressure,
                total_viscosity: prim.total_viscosity(),
                grad_u: state.grad_velocity[v],
                distance,
                gamma: gas.gamma,
            };
            let (conv, visc) = moving_wall_contribution(&input, diag_block.as_mut());
            res_conv += conv;
            res_visc += visc;
        }

        WallVertexUpdate {
            vertex: v,
            velocity_old: if dynamic { grid_velocity } else { DVec3::ZERO },
            energy_residual: res_conv - res_visc,
            diag_block,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_gas_conductivity() {
        let gas = WallGas {
            gamma: 1.4,
            gas_constant: 287.0,
            prandtl_lam: 0.72,
            prandtl_turb: 0.9,
        };
        assert!((gas.cp() - 1004.5).abs() < 1e-10);
        let k = gas.conductivity(1.8e-5, 9.0e-5);
        assert!((k - 1004.5 * (2.5e-5 + 1.0e-4)).abs() < 1e-12);
    }
}
