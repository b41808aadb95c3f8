// crates/vf_physics/src/numerics/mod.rs

//! 数值核
//!
//! - [`stress`]: 应力张量、切向应力、应变率与涡量
//! - [`viscous_flux`]: 边平均梯度粘性通量与隐式雅可比块

pub mod stress;
pub mod viscous_flux;

pub use stress::{
    add_tau_wall, strain_rate_magnitude, stress_tensor, tangential_traction, vorticity,
};
pub use viscous_flux::{EdgeEndpoint, EdgeFlux, EdgeInput, ViscousFluxKernel};
