// crates/vf_physics/tests/common/mod.rs

//! 集成测试公共设施：二维笛卡尔网格、配置与均匀流场

#![allow(dead_code)]

use glam::{DMat3, DVec3};
use vf_config::{MarkerConfig, MarkerKind, ViscosityModel, ViscousConfig};
use vf_physics::fluid::{FluidModel, IdealGas};
use vf_physics::state::{ConservedVars, FlowState};
use vf_physics::ViscousMeshBuilder;

/// 容差
pub const TOL: f64 = 1e-10;

/// 测试用常粘度
pub const MU: f64 = 0.01;

/// 二维笛卡尔网格
///
/// 顶点编号 `j * nx + i`；底边 `wall` 为壁面（法向指向流体 +y），
/// 顶边 `farfield` 为非壁面标记。`owned(i, j)` 为 false 的顶点作为 halo。
pub fn grid_builder(
    nx: usize,
    ny: usize,
    h: f64,
    owned: &dyn Fn(usize, usize) -> bool,
) -> ViscousMeshBuilder {
    let id = |i: usize, j: usize| j * nx + i;
    let mut b = ViscousMeshBuilder::new(2);

    for j in 0..ny {
        for i in 0..nx {
            let coord = DVec3::new(i as f64 * h, j as f64 * h, 0.0);
            if owned(i, j) {
                b.add_vertex(coord);
            } else {
                b.add_halo_vertex(coord);
            }
        }
    }

    for j in 0..ny {
        for i in 0..nx {
            if i + 1 < nx {
                b.add_edge(id(i, j), id(i + 1, j), DVec3::new(h, 0.0, 0.0));
            }
            if j + 1 < ny {
                b.add_edge(id(i, j), id(i, j + 1), DVec3::new(0.0, h, 0.0));
            }
        }
    }

    let wall = b.add_marker("wall");
    for i in 0..nx {
        b.add_boundary_vertex(wall, id(i, 0), DVec3::new(0.0, h, 0.0), id(i, 1));
    }
    let far = b.add_marker("farfield");
    for i in 0..nx {
        b.add_boundary_vertex(far, id(i, ny - 1), DVec3::new(0.0, -h, 0.0), id(i, ny - 2));
    }
    b
}

/// 全部顶点归本分区的网格构建器
pub fn serial_builder(nx: usize, ny: usize, h: f64) -> ViscousMeshBuilder {
    grid_builder(nx, ny, h, &|_, _| true)
}

/// 只有一个壁面标记的配置（常粘度、隐式）
pub fn wall_config(kind: MarkerKind) -> ViscousConfig {
    let mut config = ViscousConfig::default();
    config.physics.viscosity = ViscosityModel::Constant { mu: MU };
    config.markers.push(MarkerConfig {
        tag: "wall".into(),
        kind,
        heat_flux: 0.0,
        temperature: 250.0,
        custom_values: false,
    });
    config
}

/// 由配置构造的理想气体
pub fn gas(config: &ViscousConfig) -> IdealGas {
    IdealGas::from_config(&config.physics)
}

/// 由 (ρ, u, T) 构造守恒量
pub fn conserved(config: &ViscousConfig, density: f64, velocity: DVec3, temperature: f64) -> ConservedVars {
    let e = gas(config).static_energy_from_temperature(temperature);
    ConservedVars::from_primitive(density, velocity, e + 0.5 * velocity.length_squared())
}

/// 均匀流场，梯度为零
pub fn fill_uniform(state: &mut FlowState, config: &ViscousConfig, density: f64, velocity: DVec3, temperature: f64) {
    state.fill_conserved(conserved(config, density, velocity, temperature));
    state.grad_velocity.fill(DMat3::ZERO);
    state.grad_temperature.fill(DVec3::ZERO);
}

/// 壁面热导率 κ = c_p μ / Pr
pub fn wall_conductivity(config: &ViscousConfig) -> f64 {
    gas(config).cp() * MU / config.physics.prandtl_lam
}

/// 带相对容差的比较
pub fn assert_close(actual: f64, expected: f64, what: &str) {
    let scale = 1.0 + expected.abs();
    assert!(
        (actual - expected).abs() < TOL * scale,
        "{}: 实际 {:.15e}, 期望 {:.15e}",
        what,
        actual,
        expected
    );
}
