// crates/vf_physics/src/boundary/registry.rs

//! 壁面注册表
//!
//! 按网格标记顺序保存每个标记的类型与热律。标记与配置通过名称关联；
//! 配置中未出现的网格标记视为 `Other`，不参与壁面处理。
//!
//! 需要外部数据源的标记（共轭传热界面、逐顶点自定义值）在数据源
//! 注入之前没有热律，此时施加该标记返回错误。

use std::sync::Arc;

use vf_config::{ChtCoupling, MarkerKind, ViscousConfig};
use vf_foundation::MarkerIndex;

use super::sources::{BoundaryValueSource, ConjugateHeatSource};
use super::thermal::{ConjugateInterface, PrescribedHeatFlux, PrescribedTemperature, WallThermalLaw};
use super::BoundaryError;
use crate::mesh::ViscousMesh;

/// 注册表条目
#[derive(Clone)]
pub struct WallEntry {
    /// 网格标记索引
    pub marker: MarkerIndex,
    /// 标记名
    pub tag: String,
    /// 类型
    pub kind: MarkerKind,
    /// 配置值（热流或温度，已无量纲化）
    pub value: f64,
    /// 是否使用逐顶点自定义值
    pub custom: bool,
    law: Option<Arc<dyn WallThermalLaw>>,
}

impl WallEntry {
    /// 热律是否就绪
    pub fn is_ready(&self) -> bool {
        self.law.is_some()
    }
}

impl std::fmt::Debug for WallEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WallEntry")
            .field("marker", &self.marker)
            .field("tag", &self.tag)
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("custom", &self.custom)
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// 壁面注册表
#[derive(Debug, Clone)]
pub struct WallBoundaryRegistry {
    entries: Vec<WallEntry>,
    cht_coupling: Option<ChtCoupling>,
    temperature_ref: f64,
    viscosity_ref: f64,
}

impl WallBoundaryRegistry {
    /// 由配置与网格构建
    ///
    /// # 错误
    /// - 存在共轭传热标记而耦合模式无法识别
    pub fn from_config(config: &ViscousConfig, mesh: &ViscousMesh) -> Result<Self, BoundaryError> {
        let reference = &config.physics.reference;
        let mut entries = Vec::with_capacity(mesh.n_markers());

        for (m, marker) in mesh.markers().iter().enumerate() {
            let (kind, value, custom) = match config.marker(&marker.tag) {
                Some(mc) => {
                    let value = match mc.kind {
                        MarkerKind::HeatFlux => mc.heat_flux / reference.heat_flux,
                        MarkerKind::Isothermal => mc.temperature / reference.temperature,
                        _ => 0.0,
                    };
                    (mc.kind, value, mc.custom_values)
                }
                None => (MarkerKind::Other, 0.0, false),
            };

            let law: Option<Arc<dyn WallThermalLaw>> = match (kind, custom) {
                (MarkerKind::HeatFlux, false) => Some(Arc::new(PrescribedHeatFlux::new(value))),
                (MarkerKind::Isothermal, false) => Some(Arc::new(PrescribedTemperature::new(value))),
                _ => None,
            };

            entries.push(WallEntry {
                marker: MarkerIndex::new(m),
                tag: marker.tag.clone(),
                kind,
                value,
                custom,
                law,
            });
        }

        for mc in &config.markers {
            if mesh.find_marker(&mc.tag).is_none() {
                log::debug!("配置标记 '{}' 不在本分区网格中", mc.tag);
            }
        }

        let cht_coupling = if entries.iter().any(|e| e.kind == MarkerKind::ChtInterface) {
            Some(config.cht_coupling()?)
        } else {
            None
        };

        Ok(Self {
            entries,
            cht_coupling,
            temperature_ref: reference.temperature,
            viscosity_ref: reference.viscosity,
        })
    }

    /// 全部条目（与网格标记一一对应）
    pub fn entries(&self) -> &[WallEntry] {
        &self.entries
    }

    /// 单个条目
    pub fn entry(&self, marker: MarkerIndex) -> Option<&WallEntry> {
        self.entries.get(marker.get())
    }

    /// 按名称查找
    pub fn find(&self, tag: &str) -> Option<&WallEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    /// 粘性壁面条目
    pub fn viscous_walls(&self) -> impl Iterator<Item = &WallEntry> {
        self.entries.iter().filter(|e| e.kind.is_viscous_wall())
    }

    /// 共轭传热耦合模式（无共轭标记时为 None）
    pub fn cht_coupling(&self) -> Option<ChtCoupling> {
        self.cht_coupling
    }

    /// 注入逐顶点自定义数据源
    pub fn set_custom_source(&mut self, source: Arc<dyn BoundaryValueSource>) {
        for e in self.entries.iter_mut().filter(|e| e.custom) {
            e.law = match e.kind {
                MarkerKind::HeatFlux => Some(Arc::new(
                    PrescribedHeatFlux::new(e.value).with_custom(Arc::clone(&source)),
                )),
                MarkerKind::Isothermal => Some(Arc::new(
                    PrescribedTemperature::new(e.value).with_custom(Arc::clone(&source)),
                )),
                _ => e.law.take(),
            };
        }
    }

    /// 注入共轭传热数据源
    pub fn set_conjugate_source(&mut self, source: Arc<dyn ConjugateHeatSource>) {
        let Some(coupling) = self.cht_coupling else {
            return;
        };
        for e in self
            .entries
            .iter_mut()
            .filter(|e| e.kind == MarkerKind::ChtInterface)
        {
            e.law = Some(Arc::new(ConjugateInterface::new(
                coupling,
                Arc::clone(&source),
                self.temperature_ref,
                self.viscosity_ref,
            )));
        }
    }

    /// 取标记热律并检查类型
    pub fn law(
        &self,
        marker: MarkerIndex,
        expected: MarkerKind,
    ) -> Result<Arc<dyn WallThermalLaw>, BoundaryError> {
        let entry = self
            .entry(marker)
            .ok_or_else(|| BoundaryError::UnknownMarker(marker.to_string()))?;
        if entry.kind != expected {
            return Err(BoundaryError::KindMismatch {
                tag: entry.tag.clone(),
                expected,
                actual: entry.kind,
            });
        }
        entry.law.clone().ok_or_else(|| match entry.kind {
            MarkerKind::ChtInterface => BoundaryError::MissingConjugateSource(entry.tag.clone()),
            _ => BoundaryError::MissingCustomSource(entry.tag.clone()),
        })
    }
}
