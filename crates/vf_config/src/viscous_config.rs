// crates/vf_config/src/viscous_config.rs

//! ViscousConfig - 粘性子系统配置（全 f64）
//!
//! 物理常数、参考量、壁面标记、监测面与组装策略。所有字段均带默认值，
//! JSON 中缺省的键按默认值填充。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::selectors::{
    AccumulationStrategy, ChtCoupling, DirectDiffVariable, MarkerKind, ObjectiveKind,
    TimeIntegration, ViscosityModel,
};

/// 粘性子系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViscousConfig {
    /// 气体物性
    #[serde(default)]
    pub physics: PhysicsConfig,

    /// 时间积分方式
    #[serde(default)]
    pub time_integration: TimeIntegration,

    /// 壁面函数
    #[serde(default)]
    pub wall_function: WallFunctionConfig,

    /// 边界标记
    #[serde(default)]
    pub markers: Vec<MarkerConfig>,

    /// 共轭传热耦合模式（字符串，构造时解析，未知取值为致命错误）
    #[serde(default = "default_cht_coupling")]
    pub cht_coupling: String,

    /// 监测
    #[serde(default)]
    pub monitoring: MonitoringConfig,

    /// 组装策略
    #[serde(default)]
    pub assembly: AssemblyConfig,

    /// 直接微分种子
    #[serde(default)]
    pub direct_diff: DirectDiffVariable,
}

fn default_cht_coupling() -> String {
    ChtCoupling::DirectTemperatureRobinHeatflux.as_str().to_string()
}

/// 气体物性
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// 比热比 γ
    #[serde(default = "default_gamma")]
    pub gamma: f64,

    /// 气体常数 R
    #[serde(default = "default_gas_constant")]
    pub gas_constant: f64,

    /// 层流 Prandtl 数
    #[serde(default = "default_prandtl_lam")]
    pub prandtl_lam: f64,

    /// 湍流 Prandtl 数
    #[serde(default = "default_prandtl_turb")]
    pub prandtl_turb: f64,

    /// 层流粘度模型
    #[serde(default)]
    pub viscosity: ViscosityModel,

    /// 自由流
    #[serde(default)]
    pub freestream: FreestreamConfig,

    /// 参考量（无量纲化）
    #[serde(default)]
    pub reference: ReferenceScales,
}

fn default_gamma() -> f64 { 1.4 }
fn default_gas_constant() -> f64 { 287.058 }
fn default_prandtl_lam() -> f64 { 0.72 }
fn default_prandtl_turb() -> f64 { 0.9 }

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gamma: default_gamma(),
            gas_constant: default_gas_constant(),
            prandtl_lam: default_prandtl_lam(),
            prandtl_turb: default_prandtl_turb(),
            viscosity: ViscosityModel::default(),
            freestream: FreestreamConfig::default(),
            reference: ReferenceScales::default(),
        }
    }
}

impl PhysicsConfig {
    /// 定压比热 c_p = γR/(γ-1)
    #[inline]
    pub fn cp(&self) -> f64 {
        self.gamma * self.gas_constant / (self.gamma - 1.0)
    }
}

/// 自由流状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreestreamConfig {
    /// 密度
    #[serde(default = "default_density")]
    pub density: f64,

    /// 速度向量（二维问题 z 分量为 0）
    #[serde(default = "default_velocity")]
    pub velocity: [f64; 3],

    /// 层流粘度
    #[serde(default = "default_fs_viscosity")]
    pub viscosity: f64,

    /// 湍动能
    #[serde(default)]
    pub tke: f64,
}

fn default_density() -> f64 { 1.225 }
fn default_velocity() -> [f64; 3] { [100.0, 0.0, 0.0] }
fn default_fs_viscosity() -> f64 { 1.7894e-5 }

impl Default for FreestreamConfig {
    fn default() -> Self {
        Self {
            density: default_density(),
            velocity: default_velocity(),
            viscosity: default_fs_viscosity(),
            tke: 0.0,
        }
    }
}

impl FreestreamConfig {
    /// 速度模长
    pub fn speed(&self) -> f64 {
        self.velocity.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}

/// 参考量
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceScales {
    /// 温度参考值
    #[serde(default = "default_one")]
    pub temperature: f64,

    /// 热流参考值
    #[serde(default = "default_one")]
    pub heat_flux: f64,

    /// 粘度参考值
    #[serde(default = "default_one")]
    pub viscosity: f64,

    /// 参考面积（抖振指标归一化）
    #[serde(default = "default_one")]
    pub area: f64,
}

fn default_one() -> f64 { 1.0 }

impl Default for ReferenceScales {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            heat_flux: 1.0,
            viscosity: 1.0,
            area: 1.0,
        }
    }
}

/// 壁面函数配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallFunctionConfig {
    /// 是否启用
    #[serde(default)]
    pub enabled: bool,

    /// von Kármán 常数 κ
    #[serde(default = "default_kappa")]
    pub kappa: f64,

    /// 对数律常数 B
    #[serde(default = "default_b")]
    pub b: f64,

    /// 最大迭代次数
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// 收敛容差
    #[serde(default = "default_tol")]
    pub tolerance: f64,

    /// 松弛因子
    #[serde(default = "default_relax")]
    pub relaxation: f64,
}

fn default_kappa() -> f64 { 0.4 }
fn default_b() -> f64 { 5.5 }
fn default_max_iter() -> usize { 10 }
fn default_tol() -> f64 { 1e-6 }
fn default_relax() -> f64 { 0.25 }

impl Default for WallFunctionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kappa: default_kappa(),
            b: default_b(),
            max_iter: default_max_iter(),
            tolerance: default_tol(),
            relaxation: default_relax(),
        }
    }
}

/// 单个边界标记
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// 标记名
    pub tag: String,

    /// 类型
    pub kind: MarkerKind,

    /// 给定热流（HeatFlux 类型，有量纲）
    #[serde(default)]
    pub heat_flux: f64,

    /// 给定温度（Isothermal 类型，有量纲）
    #[serde(default)]
    pub temperature: f64,

    /// 是否使用逐顶点自定义边界值
    #[serde(default)]
    pub custom_values: bool,
}

/// 监测配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// 是否计算抖振指标
    #[serde(default)]
    pub buffet: bool,

    /// 抖振传感器陡度 k
    #[serde(default = "default_buffet_k")]
    pub buffet_k: f64,

    /// 抖振传感器偏移 λ
    #[serde(default)]
    pub buffet_lambda: f64,

    /// 监测面
    #[serde(default)]
    pub entries: Vec<MonitorEntry>,
}

fn default_buffet_k() -> f64 { 10.0 }

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            buffet: false,
            buffet_k: default_buffet_k(),
            buffet_lambda: 0.0,
            entries: Vec::new(),
        }
    }
}

impl MonitoringConfig {
    /// 标记是否为监测面
    pub fn is_monitored(&self, tag: &str) -> bool {
        self.entries.iter().any(|e| e.tag == tag)
    }
}

/// 监测面条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorEntry {
    /// 标记名
    pub tag: String,

    /// 组合目标权重
    #[serde(default = "default_one")]
    pub weight: f64,

    /// 目标类型
    #[serde(default)]
    pub objective: ObjectiveKind,
}

/// 组装配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// 累加策略
    #[serde(default)]
    pub strategy: AccumulationStrategy,

    /// 启用并行的最小边数
    #[serde(default = "default_min_parallel")]
    pub min_parallel_size: usize,

    /// 并行分块大小
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_min_parallel() -> usize { 1000 }
fn default_chunk_size() -> usize { 256 }

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            strategy: AccumulationStrategy::default(),
            min_parallel_size: default_min_parallel(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl Default for ViscousConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            time_integration: TimeIntegration::default(),
            wall_function: WallFunctionConfig::default(),
            markers: Vec::new(),
            cht_coupling: default_cht_coupling(),
            monitoring: MonitoringConfig::default(),
            assembly: AssemblyConfig::default(),
            direct_diff: DirectDiffVariable::default(),
        }
    }
}

impl ViscousConfig {
    /// 从 JSON 文件加载并校验
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json(&content)
    }

    /// 从 JSON 字符串解析并校验
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: ViscousConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存到 JSON 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 解析 CHT 耦合模式
    pub fn cht_coupling(&self) -> Result<ChtCoupling, ConfigError> {
        self.cht_coupling.parse()
    }

    /// 按名称查找标记
    pub fn marker(&self, tag: &str) -> Option<&MarkerConfig> {
        self.markers.iter().find(|m| m.tag == tag)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;

        if !(p.gamma > 1.0) {
            return Err(ConfigError::invalid("physics.gamma", p.gamma, "比热比必须大于 1"));
        }
        if !(p.gas_constant > 0.0) {
            return Err(ConfigError::invalid(
                "physics.gas_constant",
                p.gas_constant,
                "气体常数必须为正",
            ));
        }
        if !(p.prandtl_lam > 0.0) {
            return Err(ConfigError::invalid(
                "physics.prandtl_lam",
                p.prandtl_lam,
                "Prandtl 数必须为正",
            ));
        }
        if !(p.prandtl_turb > 0.0) {
            return Err(ConfigError::invalid(
                "physics.prandtl_turb",
                p.prandtl_turb,
                "Prandtl 数必须为正",
            ));
        }

        // 参考量用作除数
        let r = &p.reference;
        for (key, value) in [
            ("physics.reference.temperature", r.temperature),
            ("physics.reference.heat_flux", r.heat_flux),
            ("physics.reference.viscosity", r.viscosity),
            ("physics.reference.area", r.area),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::invalid(key, value, "参考量必须为正"));
            }
        }

        let wf = &self.wall_function;
        if wf.max_iter == 0 {
            return Err(ConfigError::invalid(
                "wall_function.max_iter",
                wf.max_iter,
                "至少迭代一次",
            ));
        }
        if !(wf.relaxation > 0.0 && wf.relaxation <= 1.0) {
            return Err(ConfigError::invalid(
                "wall_function.relaxation",
                wf.relaxation,
                "松弛因子必须在 (0, 1] 范围内",
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for m in &self.markers {
            if !seen.insert(m.tag.as_str()) {
                return Err(ConfigError::invalid("markers.tag", &m.tag, "标记名重复"));
            }
            if m.kind == MarkerKind::Isothermal && !m.custom_values && !(m.temperature > 0.0) {
                return Err(ConfigError::invalid(
                    &format!("markers.{}.temperature", m.tag),
                    m.temperature,
                    "等温壁温度必须为正",
                ));
            }
        }

        for entry in &self.monitoring.entries {
            if self.marker(&entry.tag).is_none() {
                return Err(ConfigError::Missing(format!(
                    "监测面 '{}' 未在 markers 中定义",
                    entry.tag
                )));
            }
        }

        if self.markers.iter().any(|m| m.kind == MarkerKind::ChtInterface) {
            self.cht_coupling()?;
        }

        Ok(())
    }
}
