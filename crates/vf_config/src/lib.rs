// crates/vf_config/src/lib.rs

//! ViscoFlux 配置层
//!
//! 粘性求解器的全部可配置参数，纯 f64 + serde，JSON 读写。
//!
//! # 模块概览
//!
//! - [`viscous_config`]: `ViscousConfig` 及其子配置
//! - [`selectors`]: 运行时选择器枚举（时间积分、壁面类型、CHT 耦合模式等）
//! - [`error`]: 配置错误类型
//!
//! # 层级
//!
//! ```text
//! vf_physics    ─> 读取 ViscousConfig 构造求解器
//! vf_config     ─> ViscousConfig (本层)
//! vf_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod selectors;
pub mod viscous_config;

pub use error::ConfigError;
pub use selectors::{
    AccumulationStrategy, ChtCoupling, DirectDiffVariable, MarkerKind, ObjectiveKind,
    TimeIntegration, ViscosityModel,
};
pub use viscous_config::{
    AssemblyConfig, FreestreamConfig, MarkerConfig, MonitorEntry, MonitoringConfig,
    PhysicsConfig, ReferenceScales, ViscousConfig, WallFunctionConfig,
};
