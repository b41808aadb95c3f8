// crates/vf_physics/src/monitoring/buffet.rs

//! 抖振监测
//!
//! 逐顶点传感器（光滑 Heaviside，摩擦方向与来流相反时趋于 1）：
//!
//! ```text
//! s = 1 / (1 + exp(2k (ĉ_f·V̂_∞ + λ)))
//! ```
//!
//! 监测标记上的指标 `Σ s·A / S_ref`（只计本分区顶点），总指标为各监测标记之和，
//! 监测面指标按名称取对应标记。总指标与监测面指标在分区间求和归约。

use glam::DVec3;
use vf_config::{MarkerKind, MonitoringConfig, ObjectiveKind};
use vf_foundation::{KahanSum, MarkerIndex};

use super::skin_friction::SkinFriction;
use crate::comm::Communicator;
use crate::mesh::ViscousMesh;

/// 抖振传感器
#[inline]
pub fn buffet_sensor(skin_friction: DVec3, freestream_velocity: DVec3, k: f64, lambda: f64) -> f64 {
    let denom = skin_friction.length() * freestream_velocity.length();
    let dot = if denom > 0.0 {
        skin_friction.dot(freestream_velocity) / denom
    } else {
        0.0
    };
    1.0 / (1.0 + (2.0 * k * (dot + lambda)).exp())
}

#[derive(Debug, Clone)]
struct SurfaceEntry {
    marker: Option<MarkerIndex>,
    weight: f64,
    objective: ObjectiveKind,
}

/// 抖振监测器
#[derive(Debug, Clone)]
pub struct BuffetMonitor {
    k: f64,
    lambda: f64,
    ref_area: f64,
    /// 参与传感器计算的壁面标记
    walls: Vec<MarkerIndex>,
    /// 按网格标记：是否计入指标
    monitored: Vec<bool>,
    surfaces: Vec<SurfaceEntry>,
    sensor: Vec<Vec<f64>>,
    marker_metric: Vec<f64>,
    surface_metric: Vec<f64>,
    total: f64,
}

impl BuffetMonitor {
    /// 由监测配置、标记类型与网格创建
    pub fn new(
        monitoring: &MonitoringConfig,
        ref_area: f64,
        mesh: &ViscousMesh,
        kinds: &[MarkerKind],
    ) -> Self {
        let walls = kinds
            .iter()
            .enumerate()
            .filter(|(_, k)| k.is_viscous_wall())
            .map(|(m, _)| MarkerIndex::new(m))
            .collect();
        let monitored = mesh
            .markers()
            .iter()
            .map(|m| monitoring.is_monitored(&m.tag))
            .collect();
        let surfaces: Vec<SurfaceEntry> = monitoring
            .entries
            .iter()
            .map(|e| SurfaceEntry {
                marker: mesh.find_marker(&e.tag),
                weight: e.weight,
                objective: e.objective,
            })
            .collect();

        Self {
            k: monitoring.buffet_k,
            lambda: monitoring.buffet_lambda,
            ref_area,
            walls,
            monitored,
            sensor: vec![Vec::new(); mesh.n_markers()],
            marker_metric: vec![0.0; mesh.n_markers()],
            surface_metric: vec![0.0; surfaces.len()],
            surfaces,
            total: 0.0,
        }
    }

    /// 参与计算的壁面标记
    pub fn walls(&self) -> &[MarkerIndex] {
        &self.walls
    }

    /// 计算传感器与指标
    pub fn update(
        &mut self,
        mesh: &ViscousMesh,
        skin_friction: &SkinFriction,
        freestream_velocity: DVec3,
        comm: &dyn Communicator,
    ) {
        self.marker_metric.fill(0.0);
        self.surface_metric.fill(0.0);
        self.total = 0.0;

        for &m in &self.walls {
            let marker = mesh.marker(m);
            let cf = skin_friction.marker(m);
            let sensor: Vec<f64> = (0..marker.vertices.len())
                .map(|k| {
                    let c = cf.get(k).copied().unwrap_or(DVec3::ZERO);
                    buffet_sensor(c, freestream_velocity, self.k, self.lambda)
                })
                .collect();

            if self.monitored[m.get()] {
                let ref_area = self.ref_area;
                let sum = KahanSum::sum_iter(
                    marker
                        .vertices
                        .iter()
                        .zip(&sensor)
                        .filter(|(bv, _)| mesh.vertices()[bv.vertex].is_domain)
                        .map(|(bv, s)| s * bv.area() / ref_area),
                );
                self.marker_metric[m.get()] = sum;
                self.total += sum;
            }
            self.sensor[m.get()] = sensor;
        }

        for (metric, entry) in self.surface_metric.iter_mut().zip(&self.surfaces) {
            if let Some(m) = entry.marker {
                *metric = self.marker_metric[m.get()];
            }
        }

        let mut reduced = Vec::with_capacity(1 + self.surface_metric.len());
        reduced.push(self.total);
        reduced.extend_from_slice(&self.surface_metric);
        comm.all_reduce_sum(&mut reduced);
        self.total = reduced[0];
        self.surface_metric.copy_from_slice(&reduced[1..]);

        log::debug!("抖振指标: 总计 {:.6e}", self.total);
    }

    /// 标记上的传感器值（按标记内序号）
    pub fn sensor(&self, marker: MarkerIndex) -> &[f64] {
        self.sensor
            .get(marker.get())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 本分区标记指标
    pub fn marker_metric(&self, marker: MarkerIndex) -> f64 {
        self.marker_metric.get(marker.get()).copied().unwrap_or(0.0)
    }

    /// 全局总指标
    pub fn total_metric(&self) -> f64 {
        self.total
    }

    /// 全局监测面指标（与监测配置条目顺序一致）
    pub fn surface_metrics(&self) -> &[f64] {
        &self.surface_metric
    }

    /// 组合目标中的抖振贡献
    pub fn objective(&self) -> f64 {
        self.surfaces
            .iter()
            .zip(&self.surface_metric)
            .filter(|(e, _)| e.objective == ObjectiveKind::BuffetSensor)
            .map(|(e, metric)| e.weight * metric)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_limits() {
        let v = DVec3::X * 100.0;
        // 附着流：摩擦与来流同向 → 趋于 0
        let attached = buffet_sensor(DVec3::X * 0.003, v, 10.0, 0.0);
        assert!(attached < 1e-8);
        // 分离流：反向 → 趋于 1
        let separated = buffet_sensor(-DVec3::X * 0.003, v, 10.0, 0.0);
        assert!(separated > 1.0 - 1e-8);
        // 零摩擦 → 0.5
        assert!((buffet_sensor(DVec3::ZERO, v, 10.0, 0.0) - 0.5).abs() < 1e-15);
        // 垂直时只剩 λ 的作用
        let shifted = buffet_sensor(DVec3::Y, v, 10.0, 0.5);
        assert!((shifted - 1.0 / (1.0 + 10.0_f64.exp())).abs() < 1e-15);
    }
}
