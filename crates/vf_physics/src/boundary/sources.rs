// crates/vf_physics/src/boundary/sources.rs

//! 边界数据源接口
//!
//! 边界顶点以 `(标记, 标记内序号)` 定位，序号即顶点在
//! [`crate::mesh::BoundaryMarker::vertices`] 中的位置。

use std::collections::HashMap;

use vf_foundation::MarkerIndex;

// ============================================================
// 逐顶点自定义值
// ============================================================

/// 逐顶点自定义边界值（热流或温度，已无量纲化）
pub trait BoundaryValueSource: Send + Sync {
    /// 标记 `marker` 上第 `ordinal` 个顶点的值，无数据返回 None
    fn boundary_value(&self, marker: MarkerIndex, ordinal: usize) -> Option<f64>;
}

/// 按标记存储的逐顶点数值表
#[derive(Debug, Clone, Default)]
pub struct PerVertexValues {
    values: HashMap<MarkerIndex, Vec<f64>>,
}

impl PerVertexValues {
    /// 创建空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置一个标记的全部顶点值
    pub fn with_marker(mut self, marker: MarkerIndex, values: Vec<f64>) -> Self {
        self.values.insert(marker, values);
        self
    }

    /// 修改单个值
    pub fn set(&mut self, marker: MarkerIndex, ordinal: usize, value: f64) {
        let row = self.values.entry(marker).or_default();
        if row.len() <= ordinal {
            row.resize(ordinal + 1, 0.0);
        }
        row[ordinal] = value;
    }
}

impl BoundaryValueSource for PerVertexValues {
    fn boundary_value(&self, marker: MarkerIndex, ordinal: usize) -> Option<f64> {
        self.values.get(&marker).and_then(|v| v.get(ordinal)).copied()
    }
}

// ============================================================
// 共轭传热
// ============================================================

/// 共轭传热数据源（固体侧求解器提供）
pub trait ConjugateHeatSource: Send + Sync {
    /// 共轭侧温度（有量纲）
    fn conjugate_temperature(&self, marker: MarkerIndex, ordinal: usize) -> f64;

    /// 共轭侧换热系数
    fn heat_transfer_coefficient(&self, marker: MarkerIndex, ordinal: usize) -> f64;
}

/// 静态共轭场
///
/// 每个标记一组 `(温度, 换热系数)`；未设置的顶点返回 0。
#[derive(Debug, Clone, Default)]
pub struct StaticConjugateField {
    data: HashMap<MarkerIndex, Vec<(f64, f64)>>,
}

impl StaticConjugateField {
    /// 创建空场
    pub fn new() -> Self {
        Self::default()
    }

    /// 整个标记取同一温度与换热系数
    pub fn uniform(mut self, marker: MarkerIndex, n_vertices: usize, temperature: f64, coefficient: f64) -> Self {
        self.data.insert(marker, vec![(temperature, coefficient); n_vertices]);
        self
    }

    /// 设置单个顶点
    pub fn set(&mut self, marker: MarkerIndex, ordinal: usize, temperature: f64, coefficient: f64) {
        let row = self.data.entry(marker).or_default();
        if row.len() <= ordinal {
            row.resize(ordinal + 1, (0.0, 0.0));
        }
        row[ordinal] = (temperature, coefficient);
    }

    fn get(&self, marker: MarkerIndex, ordinal: usize) -> (f64, f64) {
        self.data
            .get(&marker)
            .and_then(|v| v.get(ordinal))
            .copied()
            .unwrap_or((0.0, 0.0))
    }
}

impl ConjugateHeatSource for StaticConjugateField {
    fn conjugate_temperature(&self, marker: MarkerIndex, ordinal: usize) -> f64 {
        self.get(marker, ordinal).0
    }

    fn heat_transfer_coefficient(&self, marker: MarkerIndex, ordinal: usize) -> f64 {
        self.get(marker, ordinal).1
    }
}
