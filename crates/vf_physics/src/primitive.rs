// crates/vf_physics/src/primitive.rs

//! 原始量更新器
//!
//! 逐顶点由守恒量计算原始量与二级量：
//!
//! ```text
//! e = ρE/ρ - |u|²/2 - k
//! (p, T, c², μ, κ, ∂…) = fluid(ρ, e)
//! h = (ρE + p)/ρ
//! ```
//!
//! 密度、压力、温度或声速平方为负（或非有限）的顶点记为非物理，
//! 结果按计算值原样保存，只计数不修正。顶点之间无依赖，按顶点并行。

use rayon::prelude::*;

use vf_foundation::VfError;

use crate::fluid::{FluidModel, ThermoState};
use crate::state::{ConservedVars, FlowState, PrimitiveVars, SecondaryVars};
use crate::turbulence::TurbulenceFields;

/// 导入湍流场
///
/// 长度与顶点数不一致时报错；`None` 表示层流，涡粘性与湍动能清零。
pub fn import_turbulence(
    state: &mut FlowState,
    turbulence: Option<&dyn TurbulenceFields>,
) -> Result<(), VfError> {
    let n = state.n_vertices();
    match turbulence {
        None => {
            state.eddy_viscosity.fill(0.0);
            state.tke.fill(0.0);
        }
        Some(t) => {
            VfError::check_size("eddy_viscosity", n, t.eddy_viscosity().len())?;
            state.eddy_viscosity.copy_from_slice(t.eddy_viscosity());
            match t.turbulent_kinetic_energy() {
                Some(k) => {
                    VfError::check_size("tke", n, k.len())?;
                    state.tke.copy_from_slice(k);
                }
                None => state.tke.fill(0.0),
            }
        }
    }
    Ok(())
}

/// 更新全部顶点的原始量与二级量，返回非物理顶点数
pub fn update_primitives(state: &mut FlowState, fluid: &dyn FluidModel) -> usize {
    let FlowState {
        conserved,
        primitives,
        secondary,
        valid,
        eddy_viscosity,
        tke,
        ..
    } = state;

    primitives
        .par_iter_mut()
        .zip(secondary.par_iter_mut())
        .zip(valid.par_iter_mut())
        .zip(conserved.par_iter())
        .zip(eddy_viscosity.par_iter().zip(tke.par_iter()))
        .map(|((((prim, sec), ok), u), (&mu_t, &k))| {
            let (p, s, physical) = evaluate_vertex(u, mu_t, k, fluid);
            *prim = p;
            *sec = s;
            *ok = physical;
            usize::from(!physical)
        })
        .sum()
}

/// 单顶点求值
pub fn evaluate_vertex(
    u: &ConservedVars,
    eddy_viscosity: f64,
    tke: f64,
    fluid: &dyn FluidModel,
) -> (PrimitiveVars, SecondaryVars, bool) {
    let rho = u.density;
    let velocity = u.momentum / rho;
    let static_energy = u.energy / rho - 0.5 * velocity.length_squared() - tke;

    let t: ThermoState = fluid.evaluate(rho, static_energy);

    let physical = is_physical(rho, &t);
    let sound_speed = if t.sound_speed2 > 0.0 {
        t.sound_speed2.sqrt()
    } else {
        f64::NAN
    };

    let prim = PrimitiveVars {
        temperature: t.temperature,
        velocity,
        pressure: t.pressure,
        density: rho,
        enthalpy: (u.energy + t.pressure) / rho,
        static_energy,
        sound_speed,
        laminar_viscosity: t.laminar_viscosity,
        eddy_viscosity,
        conductivity: t.conductivity,
        cp: t.cp,
    };
    let sec = SecondaryVars {
        dp_drho_e: t.dp_drho_e,
        dp_de_rho: t.dp_de_rho,
        dt_drho_e: t.dt_drho_e,
        dt_de_rho: t.dt_de_rho,
        dmu_drho_t: t.dmu_drho_t,
        dmu_dt_rho: t.dmu_dt_rho,
        dk_drho_t: t.dk_drho_t,
        dk_dt_rho: t.dk_dt_rho,
    };
    (prim, sec, physical)
}

#[inline]
fn is_physical(density: f64, t: &ThermoState) -> bool {
    let positive = |x: f64| x.is_finite() && x >= 0.0;
    positive(density) && positive(t.pressure) && positive(t.temperature) && positive(t.sound_speed2)
}
