// crates/vf_physics/src/monitoring/mod.rs

//! 壁面监测
//!
//! - [`skin_friction`]: 壁面摩擦系数向量
//! - [`buffet`]: 抖振传感器、按标记面积分的抖振指标与组合目标

pub mod buffet;
pub mod skin_friction;

pub use buffet::{buffet_sensor, BuffetMonitor};
pub use skin_friction::{compute_skin_friction, SkinFriction};
