// crates/vf_physics/src/lib.rs

//! ViscoFlux 物理层
//!
//! 顶点中心、基于边的有限体积可压缩 N-S 求解器的粘性部分：
//!
//! - [`mesh`]: 网格图（顶点、边、边界标记）
//! - [`fluid`]: 流体物性模型（理想气体 + 层流粘度律）
//! - [`state`]: 守恒量、原始量、二级热力学导数与梯度存储
//! - [`primitive`]: 原始量更新器，统计非物理状态点
//! - [`numerics`]: 应力张量核与边粘性通量（含隐式雅可比块）
//! - [`engine`]: 块稀疏残差/雅可比与边组装器
//! - [`boundary`]: 无滑移壁面（热流、等温、共轭传热）
//! - [`wall_function`]: Spalding/Nichols-Nelson 壁面函数
//! - [`monitoring`]: 表面摩擦、抖振指标与组合目标
//! - [`comm`]: 分区间集合归约
//! - [`turbulence`]: 湍流场接口（涡粘性与湍动能）
//! - [`solver`]: 面向外层驱动的求解器门面
//!
//! # 每次外迭代的数据流
//!
//! ```text
//! set_primitive_variables ─> (外部梯度) ─> preprocessing
//!     ─> assemble_viscous_residuals ─> apply_wall_boundaries
//!     ─> buffet_monitoring ─> evaluate_objective
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod comm;
pub mod engine;
pub mod error;
pub mod fluid;
pub mod mesh;
pub mod monitoring;
pub mod numerics;
pub mod primitive;
pub mod solver;
pub mod state;
pub mod turbulence;
pub mod wall_function;

pub use error::{SolverError, SolverResult};
pub use mesh::{ViscousMesh, ViscousMeshBuilder};
pub use solver::ViscousSolver;
pub use state::FlowState;

/// 最大方程数（三维：ρ, ρu, ρv, ρw, ρE）
pub const MAX_VAR: usize = 5;
