// crates/vf_physics/src/boundary/mod.rs

//! 无滑移壁面边界条件
//!
//! # 子模块
//!
//! - [`sources`]: 外部边界数据源（逐顶点自定义值、共轭传热场）
//! - [`thermal`]: 壁面热律（给定热流、给定温度、共轭传热界面）
//! - [`moving_wall`]: 运动壁面的附加残差与能量行雅可比
//! - [`enforcer`]: 统一的壁面施加流程
//! - [`registry`]: 由配置与网格构建的标记 → 热律注册表
//!
//! # 流程
//!
//! 三种壁面共用 [`WallEnforcer::enforce`]，差异只在于
//! [`WallThermalLaw`] 如何给出壁面热流或壁面温度：
//!
//! ```text
//! 标记顶点 ─> 强施加速度 ─> 热残差 ─> (运动壁面修正) ─> 能量残差累加
//!          ─> (隐式) 对角块 + 动量行置单位行
//! ```

mod enforcer;
mod moving_wall;
mod registry;
mod sources;
mod thermal;

use thiserror::Error;
use vf_config::{ConfigError, MarkerKind};

pub use enforcer::{WallEnforcer, WallGas, WallPassStats};
pub use moving_wall::{moving_wall_contribution, MovingWallInput};
pub use registry::{WallBoundaryRegistry, WallEntry};
pub use sources::{BoundaryValueSource, ConjugateHeatSource, PerVertexValues, StaticConjugateField};
pub use thermal::{
    ConjugateInterface, PrescribedHeatFlux, PrescribedTemperature, WallThermalCondition,
    WallThermalLaw, WallVertexContext,
};

// ============================================================
// 错误类型
// ============================================================

/// 边界模块错误类型
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// 标记未找到
    #[error("边界标记 '{0}' 未找到")]
    UnknownMarker(String),

    /// 标记类型与调用的边界条件不符
    #[error("边界标记 '{tag}' 类型为 {actual}，期望 {expected}")]
    KindMismatch {
        /// 标记名
        tag: String,
        /// 期望类型
        expected: MarkerKind,
        /// 实际类型
        actual: MarkerKind,
    },

    /// 共轭传热标记缺少数据源
    #[error("共轭传热标记 '{0}' 未设置共轭数据源")]
    MissingConjugateSource(String),

    /// 自定义标记缺少数据源
    #[error("自定义边界标记 '{0}' 未设置逐顶点数据源")]
    MissingCustomSource(String),

    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
}
