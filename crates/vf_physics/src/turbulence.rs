// crates/vf_physics/src/turbulence.rs

//! 湍流场接口
//!
//! 本子系统不求解湍流模型方程，只消费其输出的涡粘性与湍动能。

/// 湍流场提供者
///
/// 湍流模型（SA、SST 等）实现此接口，在原始量更新前导入状态。
pub trait TurbulenceFields: Send + Sync {
    /// 模型名称
    fn name(&self) -> &'static str;

    /// 逐顶点涡粘性
    fn eddy_viscosity(&self) -> &[f64];

    /// 逐顶点湍动能（模型不输运 k 时返回 None）
    fn turbulent_kinetic_energy(&self) -> Option<&[f64]> {
        None
    }
}

/// 固定湍流场（测试与外部导入用）
#[derive(Debug, Clone, Default)]
pub struct FrozenTurbulence {
    mu_t: Vec<f64>,
    tke: Option<Vec<f64>>,
}

impl FrozenTurbulence {
    /// 创建只有涡粘性的场
    pub fn new(mu_t: Vec<f64>) -> Self {
        Self { mu_t, tke: None }
    }

    /// 附带湍动能
    pub fn with_tke(mut self, tke: Vec<f64>) -> Self {
        self.tke = Some(tke);
        self
    }
}

impl TurbulenceFields for FrozenTurbulence {
    fn name(&self) -> &'static str {
        "Frozen"
    }

    fn eddy_viscosity(&self) -> &[f64] {
        &self.mu_t
    }

    fn turbulent_kinetic_energy(&self) -> Option<&[f64]> {
        self.tke.as_deref()
    }
}
