// crates/vf_physics/src/solver.rs

//! 粘性求解器门面
//!
//! 外层驱动每次外迭代按固定顺序调用：
//!
//! ```text
//! set_primitive_variables ─> (外部梯度写入 state_mut) ─> preprocessing
//!     ─> assemble_viscous_residuals ─> apply_wall_boundaries
//!     ─> buffet_monitoring ─> evaluate_objective
//! ```
//!
//! 逐边调用 [`ViscousSolver::viscous_residual`] 时，`EdgeBuffered` 策略下的通量
//! 先进入缓冲，由 [`ViscousSolver::reduce_viscous_residuals`] 归约；
//! 施加壁面条件前会自动归约。
//!
//! 残差与雅可比由求解器持有，组装器与壁面施加器依次写入，
//! 不会并发修改。线性系统的求解由外部完成。

use std::sync::Arc;

use glam::DVec3;
use rayon::prelude::*;
use serde::Serialize;
use vf_config::{DirectDiffVariable, MarkerKind, ViscousConfig};
use vf_foundation::{Counter, EdgeIndex, MarkerIndex};

use crate::boundary::{
    BoundaryValueSource, ConjugateHeatSource, WallBoundaryRegistry, WallEnforcer, WallGas,
    WallPassStats,
};
use crate::comm::{Communicator, SerialComm};
use crate::engine::{EdgeAssembler, LinearSystem};
use crate::error::SolverResult;
use crate::fluid::{FluidModel, IdealGas};
use crate::mesh::ViscousMesh;
use crate::monitoring::{compute_skin_friction, BuffetMonitor, SkinFriction};
use crate::numerics::{strain_rate_magnitude, vorticity, ViscousFluxKernel};
use crate::primitive::{import_turbulence, update_primitives};
use crate::state::FlowState;
use crate::turbulence::TurbulenceFields;
use crate::wall_function::{
    refresh_wall_shear_stress, WallFunctionGas, WallFunctionParams, WallFunctionStats,
};

// ============================================================
// 统计
// ============================================================

/// 求解器统计（最近一次外迭代）
#[derive(Debug, Clone, Default, Serialize)]
pub struct SolverStats {
    /// 全局非物理点数
    pub non_physical_points: u64,
    /// 全局最大应变率
    pub strain_max: f64,
    /// 全局最大涡量
    pub vorticity_max: f64,
    /// 本分区施加壁面条件的顶点数
    pub wall_vertices: usize,
    /// 壁面函数刷新的顶点数
    pub wall_function_vertices: usize,
    /// 全局壁面函数未收敛点数
    pub wall_function_non_converged: u64,
}

impl SolverStats {
    /// 单行摘要
    pub fn summary(&self) -> String {
        format!(
            "非物理点 {}, |S|max {:.4e}, |ω|max {:.4e}, 壁面顶点 {}, 壁面函数未收敛 {}/{}",
            self.non_physical_points,
            self.strain_max,
            self.vorticity_max,
            self.wall_vertices,
            self.wall_function_non_converged,
            self.wall_function_vertices
        )
    }
}

/// 来流常数及其直接微分种子
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreestreamConstants {
    /// 密度
    pub density: f64,
    /// 速度
    pub velocity: DVec3,
    /// 粘度
    pub viscosity: f64,
    /// 湍动能
    pub tke: f64,
    /// 来流粘度的导数种子（直接微分）
    pub viscosity_seed: f64,
}

impl FreestreamConstants {
    /// 动压 ½ρ|V|²
    #[inline]
    pub fn dynamic_pressure(&self) -> f64 {
        0.5 * self.density * self.velocity.length_squared()
    }
}

// ============================================================
// 求解器
// ============================================================

/// 粘性求解器
pub struct ViscousSolver {
    config: ViscousConfig,
    mesh: Arc<ViscousMesh>,
    fluid: IdealGas,
    state: FlowState,
    system: LinearSystem,
    kernel: ViscousFluxKernel,
    assembler: EdgeAssembler,
    walls: WallBoundaryRegistry,
    enforcer: WallEnforcer,
    wall_function: WallFunctionParams,
    buffet: BuffetMonitor,
    skin_friction: SkinFriction,
    freestream: FreestreamConstants,
    comm: Arc<dyn Communicator>,
    wf_non_converged: Counter,
    stats: SolverStats,
}

impl ViscousSolver {
    /// 创建求解器
    ///
    /// # 错误
    /// - 配置校验失败
    /// - 存在共轭传热标记而耦合模式无法识别
    pub fn new(config: ViscousConfig, mesh: ViscousMesh) -> SolverResult<Self> {
        config.validate()?;
        let mesh = Arc::new(mesh);
        let physics = &config.physics;
        let implicit = config.time_integration.is_implicit();

        let fluid = IdealGas::from_config(physics);
        let walls = WallBoundaryRegistry::from_config(&config, &mesh)?;
        let kinds: Vec<MarkerKind> = walls.entries().iter().map(|e| e.kind).collect();
        let buffet = BuffetMonitor::new(&config.monitoring, physics.reference.area, &mesh, &kinds);

        let enforcer = WallEnforcer::new(
            WallGas {
                gamma: physics.gamma,
                gas_constant: physics.gas_constant,
                prandtl_lam: physics.prandtl_lam,
                prandtl_turb: physics.prandtl_turb,
            },
            implicit,
        );

        let fs = &physics.freestream;
        let freestream = FreestreamConstants {
            density: fs.density,
            velocity: DVec3::from_array(fs.velocity),
            viscosity: fs.viscosity,
            tke: fs.tke,
            viscosity_seed: match config.direct_diff {
                DirectDiffVariable::FreestreamViscosity => 1.0,
                DirectDiffVariable::None => 0.0,
            },
        };

        log::info!(
            "粘性求解器: {}D, {} 个顶点, {} 条边, {} 个标记, {}",
            mesh.n_dim(),
            mesh.n_vertices(),
            mesh.n_edges(),
            mesh.n_markers(),
            if implicit { "隐式" } else { "显式" }
        );

        Ok(Self {
            state: FlowState::new(mesh.n_dim(), mesh.n_vertices()),
            system: LinearSystem::new(&mesh, implicit),
            kernel: ViscousFluxKernel::new(mesh.n_dim(), physics.prandtl_turb, implicit),
            assembler: EdgeAssembler::new(&config.assembly),
            wall_function: WallFunctionParams::from(&config.wall_function),
            skin_friction: SkinFriction::zeros(&mesh),
            comm: Arc::new(SerialComm),
            wf_non_converged: Counter::new(),
            stats: SolverStats::default(),
            fluid,
            walls,
            enforcer,
            buffet,
            freestream,
            mesh,
            config,
        })
    }

    /// 设置分区通信器
    pub fn with_communicator(mut self, comm: Arc<dyn Communicator>) -> Self {
        self.comm = comm;
        self
    }

    /// 设置共轭传热数据源
    pub fn with_conjugate_source(mut self, source: Arc<dyn ConjugateHeatSource>) -> Self {
        self.walls.set_conjugate_source(source);
        self
    }

    /// 设置逐顶点自定义边界值数据源
    pub fn set_custom_boundary_source(&mut self, source: Arc<dyn BoundaryValueSource>) {
        self.walls.set_custom_source(source);
    }

    // ========== 外迭代入口 ==========

    /// 导入湍流场并更新原始量，返回全局非物理点数
    pub fn set_primitive_variables(
        &mut self,
        turbulence: Option<&dyn TurbulenceFields>,
    ) -> SolverResult<u64> {
        import_turbulence(&mut self.state, turbulence)?;
        let local = update_primitives(&mut self.state, &self.fluid);
        let global = self.comm.all_reduce_count(local as u64);
        if global > 0 && self.comm.is_root() {
            log::warn!("{} 个非物理点（{}）", global, self.fluid.name());
        }
        self.stats.non_physical_points = global;
        Ok(global)
    }

    /// 预处理：清零线性系统，统计应变率与涡量极值，按需刷新壁面函数
    pub fn preprocessing(&mut self) {
        self.assembler.discard_pending();
        self.system.set_zero();

        let (strain, vort) = self
            .state
            .grad_velocity
            .par_iter()
            .zip(self.mesh.vertices().par_iter())
            .filter(|(_, v)| v.is_domain)
            .fold(
                || (0.0_f64, 0.0_f64),
                |(s, w), (g, _)| (s.max(strain_rate_magnitude(g)), w.max(vorticity(g).length())),
            )
            .reduce(|| (0.0, 0.0), |a, b| (a.0.max(b.0), a.1.max(b.1)));

        let mut extrema = [strain, vort];
        self.comm.all_reduce_max(&mut extrema);
        self.stats.strain_max = extrema[0];
        self.stats.vorticity_max = extrema[1];

        if self.config.wall_function.enabled {
            self.set_tau_wall_wf();
        }
    }

    /// 单条边的粘性残差与雅可比（按组装器当前策略累加）
    pub fn viscous_residual(&mut self, edge: EdgeIndex) {
        self.assembler.accumulate_edge(
            &self.mesh,
            &self.state,
            &self.kernel,
            &mut self.system,
            edge.get(),
        );
    }

    /// 归约逐边调用缓冲的通量；`DirectScatter` 下为空操作
    pub fn reduce_viscous_residuals(&mut self) -> bool {
        self.assembler.reduce_pending(&self.mesh, &mut self.system)
    }

    /// 全部边的粘性残差与雅可比
    pub fn assemble_viscous_residuals(&mut self) {
        self.assembler
            .assemble(&self.mesh, &self.state, &self.kernel, &mut self.system);
    }

    /// 给定热流壁面
    pub fn bc_heat_flux_wall(&mut self, marker: MarkerIndex) -> SolverResult<WallPassStats> {
        self.apply_wall(marker, MarkerKind::HeatFlux)
    }

    /// 等温壁面
    pub fn bc_isothermal_wall(&mut self, marker: MarkerIndex) -> SolverResult<WallPassStats> {
        self.apply_wall(marker, MarkerKind::Isothermal)
    }

    /// 共轭传热界面
    pub fn bc_conjugate_heat_interface(
        &mut self,
        marker: MarkerIndex,
    ) -> SolverResult<WallPassStats> {
        self.apply_wall(marker, MarkerKind::ChtInterface)
    }

    /// 按标记类型对全部粘性壁面施加边界条件
    pub fn apply_wall_boundaries(&mut self) -> SolverResult<WallPassStats> {
        let walls: Vec<(MarkerIndex, MarkerKind)> = self
            .walls
            .viscous_walls()
            .map(|e| (e.marker, e.kind))
            .collect();

        let mut total = WallPassStats::default();
        for (marker, kind) in walls {
            let s = self.apply_wall(marker, kind)?;
            total.vertices += s.vertices;
            total.halo_skipped += s.halo_skipped;
        }
        self.stats.wall_vertices = total.vertices;
        Ok(total)
    }

    fn apply_wall(&mut self, marker: MarkerIndex, kind: MarkerKind) -> SolverResult<WallPassStats> {
        let law = self.walls.law(marker, kind)?;
        self.reduce_viscous_residuals();
        Ok(self.enforcer.enforce(
            &self.mesh,
            marker,
            law.as_ref(),
            &mut self.state,
            &mut self.system,
        ))
    }

    /// 刷新全部粘性壁面顶点的壁面剪应力缓存
    pub fn set_tau_wall_wf(&mut self) -> WallFunctionStats {
        let markers: Vec<MarkerIndex> = self.walls.viscous_walls().map(|e| e.marker).collect();
        let gas = WallFunctionGas {
            cp: self.fluid.cp(),
            gas_constant: self.fluid.gas_constant(),
            prandtl_lam: self.config.physics.prandtl_lam,
        };
        let stats = refresh_wall_shear_stress(
            &self.mesh,
            &mut self.state,
            &markers,
            &gas,
            &self.wall_function,
            &self.wf_non_converged,
        );
        self.stats.wall_function_vertices = stats.vertices;
        self.stats.wall_function_non_converged =
            self.comm.all_reduce_count(stats.non_converged as u64);
        stats
    }

    /// 计算摩擦系数；启用抖振监测时再计算传感器与指标
    pub fn buffet_monitoring(&mut self) {
        self.skin_friction = compute_skin_friction(
            &self.mesh,
            &self.state,
            self.buffet.walls(),
            self.freestream.dynamic_pressure(),
            self.config.wall_function.enabled,
        );
        if !self.config.monitoring.buffet {
            return;
        }
        self.buffet.update(
            &self.mesh,
            &self.skin_friction,
            self.freestream.velocity,
            self.comm.as_ref(),
        );
    }

    /// 组合目标值
    pub fn evaluate_objective(&self) -> f64 {
        self.buffet.objective()
    }

    // ========== 访问方法 ==========

    /// 配置
    pub fn config(&self) -> &ViscousConfig {
        &self.config
    }

    /// 网格
    pub fn mesh(&self) -> &ViscousMesh {
        &self.mesh
    }

    /// 流体模型
    pub fn fluid(&self) -> &IdealGas {
        &self.fluid
    }

    /// 流场状态
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// 流场状态（写入守恒量与梯度）
    pub fn state_mut(&mut self) -> &mut FlowState {
        &mut self.state
    }

    /// 线性系统
    pub fn system(&self) -> &LinearSystem {
        &self.system
    }

    /// 线性系统（外部线性求解器使用）
    pub fn system_mut(&mut self) -> &mut LinearSystem {
        &mut self.system
    }

    /// 壁面注册表
    pub fn walls(&self) -> &WallBoundaryRegistry {
        &self.walls
    }

    /// 组装器
    pub fn assembler_mut(&mut self) -> &mut EdgeAssembler {
        &mut self.assembler
    }

    /// 摩擦系数
    pub fn skin_friction(&self) -> &SkinFriction {
        &self.skin_friction
    }

    /// 抖振监测器
    pub fn buffet(&self) -> &BuffetMonitor {
        &self.buffet
    }

    /// 全局抖振总指标
    pub fn total_buffet_metric(&self) -> f64 {
        self.buffet.total_metric()
    }

    /// 来流常数
    pub fn freestream(&self) -> &FreestreamConstants {
        &self.freestream
    }

    /// 统计
    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// 累计壁面函数未收敛点数（本分区，跨迭代）
    pub fn wall_function_failures(&self) -> u64 {
        self.wf_non_converged.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_summary() {
        let s = SolverStats {
            non_physical_points: 3,
            ..Default::default()
        };
        assert!(s.summary().starts_with("非物理点 3"));
    }

    #[test]
    fn test_dynamic_pressure() {
        let fs = FreestreamConstants {
            density: 2.0,
            velocity: DVec3::new(3.0, 4.0, 0.0),
            viscosity: 1.0,
            tke: 0.0,
            viscosity_seed: 0.0,
        };
        assert!((fs.dynamic_pressure() - 25.0).abs() < 1e-14);
    }
}
