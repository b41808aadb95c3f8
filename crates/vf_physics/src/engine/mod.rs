// crates/vf_physics/src/engine/mod.rs

//! 组装引擎
//!
//! - [`block`]: 定长稠密块
//! - [`sparse`]: 块 CSR 雅可比
//! - [`linear_system`]: 残差向量 + 可选雅可比
//! - [`assembler`]: 边通量并行组装（两种累加策略）

pub mod assembler;
pub mod block;
pub mod linear_system;
pub mod sparse;

pub use assembler::{AssemblyMetrics, EdgeAssembler};
pub use block::Block;
pub use linear_system::{BlockResidual, LinearSystem};
pub use sparse::{BlockJacobian, BlockPattern, EdgeSlots};
