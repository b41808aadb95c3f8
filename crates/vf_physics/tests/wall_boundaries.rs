// crates/vf_physics/tests/wall_boundaries.rs

//! 无滑移壁面集成测试：强施加、热流、等温、运动壁面与共轭传热

mod common;

use std::sync::Arc;

use common::*;
use glam::DVec3;
use vf_config::{MarkerKind, TimeIntegration};
use vf_foundation::MarkerIndex;
use vf_physics::boundary::{BoundaryError, PerVertexValues, StaticConjugateField};
use vf_physics::{SolverError, ViscousSolver};

const NX: usize = 5;
const NY: usize = 4;
const H: f64 = 0.1;

const RHO: f64 = 1.2;
const T_FLOW: f64 = 300.0;

fn velocity() -> DVec3 {
    DVec3::new(10.0, 0.0, 0.0)
}

fn wall() -> MarkerIndex {
    MarkerIndex::new(0)
}

/// 构造求解器并推进到壁面处理之前
fn prepared(config: vf_config::ViscousConfig, builder: vf_physics::ViscousMeshBuilder) -> ViscousSolver {
    let mesh = builder.build().unwrap();
    let mut solver = ViscousSolver::new(config.clone(), mesh).unwrap();
    fill_uniform(solver.state_mut(), &config, RHO, velocity(), T_FLOW);
    assert_eq!(solver.set_primitive_variables(None).unwrap(), 0);
    solver.preprocessing();
    solver.assemble_viscous_residuals();
    solver
}

// ============================================================
// 热流壁面
// ============================================================

#[test]
fn test_heat_flux_wall_strong_enforcement() {
    let mut config = wall_config(MarkerKind::HeatFlux);
    config.markers[0].heat_flux = 50.0;
    let mut solver = prepared(config, serial_builder(NX, NY, H));

    // 均匀流场、零梯度：组装后残差为零
    assert!(solver.system().residual.l1_norm() < 1e-12);

    let stats = solver.bc_heat_flux_wall(wall()).unwrap();
    assert_eq!(stats.vertices, NX);
    assert_eq!(stats.halo_skipped, 0);

    let jac = solver.system().jacobian.as_ref().unwrap();
    for i in 0..NX {
        let v = i;
        assert_eq!(solver.state().velocity_old[v], DVec3::ZERO);
        assert_eq!(solver.system().residual.value(v, 1), 0.0);
        assert_eq!(solver.system().residual.value(v, 2), 0.0);
        // R[E] = -Q A
        assert_close(solver.system().residual.value(v, 3), -50.0 * H, "能量残差");

        for &col in jac.pattern().row_indices(v) {
            for var in 1..=2 {
                for c in 0..4 {
                    let expected = if col == v && c == var { 1.0 } else { 0.0 };
                    assert_eq!(jac.value(v, col, var, c), expected, "行 {} 列 {}", v, col);
                }
            }
        }
    }

    // 非壁面顶点不受影响
    let interior = NX + 2;
    assert!(solver.system().residual.value(interior, 3).abs() < 1e-12);
}

#[test]
fn test_heat_flux_custom_values_override_config() {
    let mut config = wall_config(MarkerKind::HeatFlux);
    config.markers[0].heat_flux = 50.0;
    config.markers[0].custom_values = true;
    let mut solver = prepared(config, serial_builder(NX, NY, H));

    // 未注入数据源时报错
    assert!(matches!(
        solver.bc_heat_flux_wall(wall()),
        Err(SolverError::Boundary(BoundaryError::MissingCustomSource(_)))
    ));

    let values: Vec<f64> = (0..NX).map(|k| k as f64 * 10.0).collect();
    solver.set_custom_boundary_source(Arc::new(PerVertexValues::new().with_marker(wall(), values)));
    solver.bc_heat_flux_wall(wall()).unwrap();

    for k in 0..NX {
        assert_close(solver.system().residual.value(k, 3), -(k as f64 * 10.0) * H, "逐顶点热流");
    }
}

#[test]
fn test_kind_mismatch_is_rejected() {
    let config = wall_config(MarkerKind::HeatFlux);
    let mut solver = prepared(config, serial_builder(NX, NY, H));
    let err = solver.bc_isothermal_wall(wall()).unwrap_err();
    assert!(matches!(
        err,
        SolverError::Boundary(BoundaryError::KindMismatch {
            expected: MarkerKind::Isothermal,
            actual: MarkerKind::HeatFlux,
            ..
        })
    ));
}

#[test]
fn test_halo_vertices_are_skipped() {
    let config = wall_config(MarkerKind::HeatFlux);
    let builder = grid_builder(NX, NY, H, &|i, _| i < 3);
    let mut solver = prepared(config, builder);
    let stats = solver.apply_wall_boundaries().unwrap();
    assert_eq!(stats.vertices, 3);
    assert_eq!(stats.halo_skipped, NX - 3);
    assert_eq!(solver.stats().wall_vertices, 3);
}

// ============================================================
// 等温壁面
// ============================================================

#[test]
fn test_isothermal_wall_residual_and_jacobian() {
    let config = wall_config(MarkerKind::Isothermal);
    let mut solver = prepared(config.clone(), serial_builder(NX, NY, H));

    let v = 2;
    let before = *solver.system().jacobian.as_ref().unwrap().diag_block(v);
    solver.bc_isothermal_wall(wall()).unwrap();
    let after = *solver.system().jacobian.as_ref().unwrap().diag_block(v);

    let k = wall_conductivity(&config);
    let t_wall = 250.0;
    // dT/dn = -(T_nb - T_w)/d, R[E] = -κ dT/dn A
    assert_close(solver.system().residual.value(v, 3), k * (T_FLOW - t_wall), "等温能量残差");

    let r = config.physics.gas_constant;
    let gm1 = config.physics.gamma - 1.0;
    let dt_drho = (-t_wall + gm1 / r * 0.5 * velocity().length_squared()) / RHO;
    assert_close(after.get(3, 0) - before.get(3, 0), k * dt_drho, "∂R_E/∂ρ");
    assert_close(after.get(3, 3) - before.get(3, 3), k * gm1 / (r * RHO), "∂R_E/∂(ρE)");

    assert_eq!(after.get(1, 1), 1.0);
    assert_eq!(after.get(2, 2), 1.0);
    assert_eq!(after.get(1, 0), 0.0);
}

#[test]
fn test_explicit_mode_has_no_jacobian() {
    let mut config = wall_config(MarkerKind::Isothermal);
    config.time_integration = TimeIntegration::Explicit;
    let mut solver = prepared(config.clone(), serial_builder(NX, NY, H));
    assert!(solver.system().jacobian.is_none());

    solver.apply_wall_boundaries().unwrap();
    let k = wall_conductivity(&config);
    assert_close(solver.system().residual.value(0, 3), k * (T_FLOW - 250.0), "显式等温残差");
}

// ============================================================
// 运动壁面
// ============================================================

#[test]
fn test_moving_wall_pressure_work() {
    let config = wall_config(MarkerKind::HeatFlux);
    let vg = DVec3::new(0.0, 2.0, 0.0);
    let mut builder = serial_builder(NX, NY, H);
    for i in 0..NX {
        builder.set_grid_velocity(i, vg);
    }
    let mut solver = prepared(config.clone(), builder);
    assert!(solver.mesh().is_dynamic());

    let v = 1;
    let before = *solver.system().jacobian.as_ref().unwrap().diag_block(v);
    solver.bc_heat_flux_wall(wall()).unwrap();
    let after = *solver.system().jacobian.as_ref().unwrap().diag_block(v);

    assert_eq!(solver.state().velocity_old[v], vg);

    // n̂ = (0, -1, 0)，零梯度下只有压力功：R[E] = p A (v_g·n̂)
    let p = RHO * config.physics.gas_constant * T_FLOW;
    let proj = H * -2.0;
    assert_close(solver.system().residual.value(v, 3), p * proj, "压力功");

    let gm1 = config.physics.gamma - 1.0;
    assert_close(after.get(3, 3) - before.get(3, 3), gm1 * proj, "∂R_E/∂(ρE)");
}

// ============================================================
// 共轭传热
// ============================================================

fn cht_config(coupling: &str) -> vf_config::ViscousConfig {
    let mut config = wall_config(MarkerKind::ChtInterface);
    config.cht_coupling = coupling.into();
    config
}

#[test]
fn test_cht_direct_temperature() {
    let config = cht_config("direct_temperature_robin_heatflux");
    let mut solver = prepared(config.clone(), serial_builder(NX, NY, H));

    assert!(matches!(
        solver.bc_conjugate_heat_interface(wall()),
        Err(SolverError::Boundary(BoundaryError::MissingConjugateSource(_)))
    ));

    let field = StaticConjugateField::new().uniform(wall(), NX, 200.0, 0.0);
    let mut solver = solver.with_conjugate_source(Arc::new(field));
    solver.bc_conjugate_heat_interface(wall()).unwrap();

    let k = wall_conductivity(&config);
    assert_close(solver.system().residual.value(0, 3), k * (T_FLOW - 200.0), "直接模式");
}

#[test]
fn test_cht_averaged_temperature() {
    let config = cht_config("averaged_temperature_neumann_heatflux");
    let k = wall_conductivity(&config);
    // h_cht = h_here = κ/d，壁温取两侧平均 250
    let field = StaticConjugateField::new().uniform(wall(), NX, 200.0, k / H);

    let mut solver = prepared(config, serial_builder(NX, NY, H)).with_conjugate_source(Arc::new(field));
    solver.apply_wall_boundaries().unwrap();
    assert_close(solver.system().residual.value(3, 3), k * (T_FLOW - 250.0), "平均模式");
}

#[test]
fn test_unknown_cht_coupling_fails_construction() {
    let config = cht_config("mystery_coupling");
    let mesh = serial_builder(NX, NY, H).build().unwrap();
    assert!(matches!(
        ViscousSolver::new(config, mesh),
        Err(SolverError::Config(_))
    ));
}
