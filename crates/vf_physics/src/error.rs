// crates/vf_physics/src/error.rs

//! 物理层错误类型
//!
//! 只有致命的配置/拓扑问题以 `Err` 返回；非物理状态与壁面函数不收敛
//! 属于可恢复事件，计数并记录日志。

use thiserror::Error;
use vf_config::ConfigError;
use vf_foundation::VfError;

use crate::boundary::BoundaryError;
use crate::mesh::MeshError;

/// 物理层结果类型
pub type SolverResult<T> = Result<T, SolverError>;

/// 求解器错误
#[derive(Debug, Error)]
pub enum SolverError {
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 网格错误
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// 边界条件错误
    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    /// 基础层错误
    #[error(transparent)]
    Foundation(#[from] VfError),
}
