// crates/vf_physics/src/fluid.rs

//! 流体物性模型
//!
//! 给定密度与比内能，返回压力、温度、声速平方、输运系数以及
//! 隐式雅可比所需的热力学偏导数。
//!
//! - [`FluidModel`]: 物性模型接口
//! - [`IdealGas`]: 量热完全气体 + 常粘度 / Sutherland 粘度 + 常 Prandtl 数导热

use vf_config::{PhysicsConfig, ViscosityModel};

/// 一个状态点的物性求值结果
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThermoState {
    /// 压力
    pub pressure: f64,
    /// 温度
    pub temperature: f64,
    /// 声速平方
    pub sound_speed2: f64,
    /// ∂p/∂ρ|e
    pub dp_drho_e: f64,
    /// ∂p/∂e|ρ
    pub dp_de_rho: f64,
    /// ∂T/∂ρ|e
    pub dt_drho_e: f64,
    /// ∂T/∂e|ρ
    pub dt_de_rho: f64,
    /// 层流粘度
    pub laminar_viscosity: f64,
    /// ∂μ/∂ρ|T
    pub dmu_drho_t: f64,
    /// ∂μ/∂T|ρ
    pub dmu_dt_rho: f64,
    /// 层流导热系数
    pub conductivity: f64,
    /// ∂κ/∂ρ|T
    pub dk_drho_t: f64,
    /// ∂κ/∂T|ρ
    pub dk_dt_rho: f64,
    /// 定压比热
    pub cp: f64,
}

/// 流体物性模型
pub trait FluidModel: Send + Sync {
    /// 模型名称
    fn name(&self) -> &'static str;

    /// 在 (ρ, e) 处求值
    fn evaluate(&self, density: f64, static_energy: f64) -> ThermoState;

    /// 比热比
    fn gamma(&self) -> f64;

    /// 气体常数
    fn gas_constant(&self) -> f64;

    /// 定压比热
    fn cp(&self) -> f64 {
        let g = self.gamma();
        g * self.gas_constant() / (g - 1.0)
    }
}

/// 层流粘度律
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaminarViscosity {
    /// 常粘度
    Constant(f64),
    /// Sutherland 定律
    Sutherland {
        /// 参考粘度
        mu_ref: f64,
        /// 参考温度
        t_ref: f64,
        /// Sutherland 常数
        s: f64,
    },
}

impl LaminarViscosity {
    /// 返回 (μ, dμ/dT)
    #[inline]
    pub fn evaluate(&self, temperature: f64) -> (f64, f64) {
        match *self {
            Self::Constant(mu) => (mu, 0.0),
            Self::Sutherland { mu_ref, t_ref, s } => {
                let ratio = temperature / t_ref;
                let mu = mu_ref * ratio * ratio.sqrt() * (t_ref + s) / (temperature + s);
                let dmu = mu * (1.5 / temperature - 1.0 / (temperature + s));
                (mu, dmu)
            }
        }
    }
}

impl From<ViscosityModel> for LaminarViscosity {
    fn from(model: ViscosityModel) -> Self {
        match model {
            ViscosityModel::Constant { mu } => Self::Constant(mu),
            ViscosityModel::Sutherland { mu_ref, t_ref, s } => Self::Sutherland { mu_ref, t_ref, s },
        }
    }
}

/// 理想气体
///
/// ```text
/// p = (γ-1) ρ e,   T = (γ-1) e / R,   c² = γ p / ρ
/// κ = μ c_p / Pr
/// ```
#[derive(Debug, Clone, Copy)]
pub struct IdealGas {
    gamma: f64,
    gas_constant: f64,
    prandtl_lam: f64,
    viscosity: LaminarViscosity,
}

impl IdealGas {
    /// 创建理想气体模型
    pub fn new(gamma: f64, gas_constant: f64, prandtl_lam: f64, viscosity: LaminarViscosity) -> Self {
        Self {
            gamma,
            gas_constant,
            prandtl_lam,
            viscosity,
        }
    }

    /// 从物理配置创建
    pub fn from_config(physics: &PhysicsConfig) -> Self {
        Self::new(
            physics.gamma,
            physics.gas_constant,
            physics.prandtl_lam,
            physics.viscosity.into(),
        )
    }

    /// 由温度求比内能
    #[inline]
    pub fn static_energy_from_temperature(&self, temperature: f64) -> f64 {
        self.gas_constant * temperature / (self.gamma - 1.0)
    }
}

impl FluidModel for IdealGas {
    fn name(&self) -> &'static str {
        "IdealGas"
    }

    fn evaluate(&self, density: f64, static_energy: f64) -> ThermoState {
        let gm1 = self.gamma - 1.0;
        let pressure = gm1 * density * static_energy;
        let temperature = gm1 * static_energy / self.gas_constant;
        let sound_speed2 = self.gamma * pressure / density;
        let cp = self.cp();

        let (mu, dmu_dt) = self.viscosity.evaluate(temperature);
        let k_factor = cp / self.prandtl_lam;

        ThermoState {
            pressure,
            temperature,
            sound_speed2,
            dp_drho_e: gm1 * static_energy,
            dp_de_rho: gm1 * density,
            dt_drho_e: 0.0,
            dt_de_rho: gm1 / self.gas_constant,
            laminar_viscosity: mu,
            dmu_drho_t: 0.0,
            dmu_dt_rho: dmu_dt,
            conductivity: mu * k_factor,
            dk_drho_t: 0.0,
            dk_dt_rho: dmu_dt * k_factor,
            cp,
        }
    }

    fn gamma(&self) -> f64 {
        self.gamma
    }

    fn gas_constant(&self) -> f64 {
        self.gas_constant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn air() -> IdealGas {
        IdealGas::new(1.4, 287.0, 0.72, LaminarViscosity::Constant(1.8e-5))
    }

    #[test]
    fn test_ideal_gas_state() {
        let gas = air();
        let e = gas.static_energy_from_temperature(300.0);
        let s = gas.evaluate(1.2, e);
        assert!((s.temperature - 300.0).abs() < 1e-10);
        assert!((s.pressure - 1.2 * 287.0 * 300.0).abs() < 1e-8);
        assert!((s.sound_speed2 - 1.4 * 287.0 * 300.0).abs() < 1e-8);
        assert!((s.conductivity - 1.8e-5 * 1004.5 / 0.72).abs() < 1e-12);
    }

    #[test]
    fn test_temperature_derivative_matches_difference() {
        let gas = air();
        let (rho, e, h) = (1.1, 2.0e5, 1.0);
        let s = gas.evaluate(rho, e);
        let fd = (gas.evaluate(rho, e + h).temperature - gas.evaluate(rho, e - h).temperature) / (2.0 * h);
        assert!((s.dt_de_rho - fd).abs() < 1e-10);
        let fd_p = (gas.evaluate(rho + 1e-6, e).pressure - gas.evaluate(rho - 1e-6, e).pressure) / 2e-6;
        assert!((s.dp_drho_e - fd_p).abs() / fd_p < 1e-8);
    }

    #[test]
    fn test_sutherland_reference_point() {
        let law = LaminarViscosity::Sutherland {
            mu_ref: 1.716e-5,
            t_ref: 273.15,
            s: 110.4,
        };
        let (mu, dmu) = law.evaluate(273.15);
        assert!((mu - 1.716e-5).abs() < 1e-18);
        let h = 1e-3;
        let fd = (law.evaluate(273.15 + h).0 - law.evaluate(273.15 - h).0) / (2.0 * h);
        assert!((dmu - fd).abs() / dmu < 1e-6);
    }

    #[test]
    fn test_negative_energy_gives_negative_temperature() {
        let s = air().evaluate(1.0, -100.0);
        assert!(s.temperature < 0.0);
        assert!(s.pressure < 0.0);
    }
}
