// crates/vf_config/src/selectors.rs

//! 运行时选择器
//!
//! 在配置文件中以小写蛇形字符串出现，构造求解器时一次性解析为枚举。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// 时间积分方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeIntegration {
    /// 显式：只组装残差
    Explicit,
    /// 隐式：同时组装雅可比
    #[default]
    Implicit,
}

impl TimeIntegration {
    /// 是否需要组装雅可比
    #[inline]
    pub fn is_implicit(self) -> bool {
        matches!(self, Self::Implicit)
    }
}

/// 层流粘度模型
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ViscosityModel {
    /// 常粘度
    Constant {
        /// 动力粘度
        mu: f64,
    },
    /// Sutherland 定律 μ = μ_ref (T/T_ref)^{3/2} (T_ref + S)/(T + S)
    Sutherland {
        /// 参考粘度
        mu_ref: f64,
        /// 参考温度
        t_ref: f64,
        /// Sutherland 常数
        s: f64,
    },
}

impl Default for ViscosityModel {
    fn default() -> Self {
        Self::Sutherland {
            mu_ref: 1.716e-5,
            t_ref: 273.15,
            s: 110.4,
        }
    }
}

/// 边界标记类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MarkerKind {
    /// 给定热流壁面
    HeatFlux = 0,
    /// 等温壁面
    Isothermal = 1,
    /// 共轭传热界面
    ChtInterface = 2,
    /// 其他（非粘性壁面：远场、对称面等）
    Other = 3,
}

impl MarkerKind {
    /// 是否为粘性壁面（无滑移 + 热边界）
    #[inline]
    pub fn is_viscous_wall(self) -> bool {
        !matches!(self, Self::Other)
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeatFlux => write!(f, "热流壁面"),
            Self::Isothermal => write!(f, "等温壁面"),
            Self::ChtInterface => write!(f, "CHT界面"),
            Self::Other => write!(f, "其他"),
        }
    }
}

/// 共轭传热耦合模式
///
/// 平均模式按两侧热阻加权求界面温度；直接模式直接取对侧温度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChtCoupling {
    /// 平均温度 / Neumann 热流
    AveragedTemperatureNeumannHeatflux,
    /// 平均温度 / Robin 热流
    AveragedTemperatureRobinHeatflux,
    /// 直接温度 / Neumann 热流
    DirectTemperatureNeumannHeatflux,
    /// 直接温度 / Robin 热流
    DirectTemperatureRobinHeatflux,
}

impl ChtCoupling {
    /// 全部合法取值
    pub const ALL: [ChtCoupling; 4] = [
        Self::AveragedTemperatureNeumannHeatflux,
        Self::AveragedTemperatureRobinHeatflux,
        Self::DirectTemperatureNeumannHeatflux,
        Self::DirectTemperatureRobinHeatflux,
    ];

    /// 配置文件中的名称
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AveragedTemperatureNeumannHeatflux => "averaged_temperature_neumann_heatflux",
            Self::AveragedTemperatureRobinHeatflux => "averaged_temperature_robin_heatflux",
            Self::DirectTemperatureNeumannHeatflux => "direct_temperature_neumann_heatflux",
            Self::DirectTemperatureRobinHeatflux => "direct_temperature_robin_heatflux",
        }
    }

    /// 是否为热阻加权平均模式
    #[inline]
    pub fn is_averaged(self) -> bool {
        matches!(
            self,
            Self::AveragedTemperatureNeumannHeatflux | Self::AveragedTemperatureRobinHeatflux
        )
    }
}

impl FromStr for ChtCoupling {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == key)
            .ok_or_else(|| ConfigError::UnknownOption {
                key: "cht_coupling".to_string(),
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ChtCoupling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 监测目标类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// 抖振传感器面积分
    BuffetSensor,
    /// 不参与组合目标
    #[default]
    None,
}

/// 全局残差/雅可比累加策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccumulationStrategy {
    /// 直接写入全局存储（归约锁保护）
    #[default]
    DirectScatter,
    /// 每条边先写入独立缓冲，再按顶点确定性归约
    EdgeBuffered,
}

/// 直接微分的种子变量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DirectDiffVariable {
    /// 不做直接微分
    #[default]
    None,
    /// 自由流粘度
    FreestreamViscosity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cht_coupling_parse() {
        for mode in ChtCoupling::ALL {
            assert_eq!(mode.as_str().parse::<ChtCoupling>().unwrap(), mode);
        }
        assert_eq!(
            "DIRECT_TEMPERATURE_ROBIN_HEATFLUX".parse::<ChtCoupling>().unwrap(),
            ChtCoupling::DirectTemperatureRobinHeatflux
        );
    }

    #[test]
    fn test_cht_coupling_unknown_is_error() {
        let err = "averaged_flux".parse::<ChtCoupling>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption { .. }));
    }

    #[test]
    fn test_viscosity_model_json() {
        let json = r#"{"model":"constant","mu":0.001}"#;
        let model: ViscosityModel = serde_json::from_str(json).unwrap();
        assert_eq!(model, ViscosityModel::Constant { mu: 0.001 });
    }

    #[test]
    fn test_marker_kind_viscous() {
        assert!(MarkerKind::HeatFlux.is_viscous_wall());
        assert!(MarkerKind::ChtInterface.is_viscous_wall());
        assert!(!MarkerKind::Other.is_viscous_wall());
    }
}
