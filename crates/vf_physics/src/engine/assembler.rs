// crates/vf_physics/src/engine/assembler.rs

//! 边粘性通量组装器
//!
//! 两种累加策略，结果在舍入误差内一致：
//!
//! - `DirectScatter`: 分块并行计算通量，每块计算完成后在互斥锁下直接散布。
//!   散布顺序依赖调度，结果不按位可复现。
//! - `EdgeBuffered`: 并行计算全部边通量到缓冲区，再按顶点行并行归约；
//!   每行按关联边升序累加，结果按位可复现。
//!
//! 边数少于 `min_parallel_size` 时直接串行执行。
//!
//! 逐边入口 [`EdgeAssembler::accumulate_edge`] 同样遵循策略：`EdgeBuffered`
//! 下通量只写入缓冲，直到 [`EdgeAssembler::reduce_pending`] 统一归约。

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rayon::prelude::*;
use vf_config::{AccumulationStrategy, AssemblyConfig};

use crate::engine::linear_system::LinearSystem;
use crate::mesh::ViscousMesh;
use crate::numerics::{EdgeFlux, EdgeInput, ViscousFluxKernel};
use crate::state::FlowState;

// ============================================================
// 性能指标
// ============================================================

/// 组装指标
#[derive(Debug, Clone, Default)]
pub struct AssemblyMetrics {
    /// 总调用次数
    pub total_calls: usize,
    /// 并行调用次数
    pub parallel_calls: usize,
    /// 串行调用次数
    pub sequential_calls: usize,
    /// 处理的边总数
    pub total_edges: usize,
    /// 累计耗时
    pub total_duration: Duration,
}

impl AssemblyMetrics {
    /// 记录一次组装
    pub fn record(&mut self, n_edges: usize, is_parallel: bool, duration: Duration) {
        self.total_calls += 1;
        self.total_edges += n_edges;
        self.total_duration += duration;
        if is_parallel {
            self.parallel_calls += 1;
        } else {
            self.sequential_calls += 1;
        }
    }

    /// 重置
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 平均每边耗时
    pub fn avg_time_per_edge(&self) -> Duration {
        if self.total_edges > 0 {
            self.total_duration / self.total_edges as u32
        } else {
            Duration::ZERO
        }
    }
}

// ============================================================
// 组装器
// ============================================================

/// 边组装器
#[derive(Debug, Clone)]
pub struct EdgeAssembler {
    strategy: AccumulationStrategy,
    min_parallel_size: usize,
    chunk_size: usize,
    buffer: Vec<EdgeFlux>,
    /// 缓冲区中是否有逐边写入但尚未归约的通量
    pending: bool,
    metrics: AssemblyMetrics,
}

impl EdgeAssembler {
    /// 从组装配置创建
    pub fn new(config: &AssemblyConfig) -> Self {
        Self {
            strategy: config.strategy,
            min_parallel_size: config.min_parallel_size,
            chunk_size: config.chunk_size.max(1),
            buffer: Vec::new(),
            pending: false,
            metrics: AssemblyMetrics::default(),
        }
    }

    /// 当前策略
    #[inline]
    pub fn strategy(&self) -> AccumulationStrategy {
        self.strategy
    }

    /// 切换策略
    pub fn set_strategy(&mut self, strategy: AccumulationStrategy) {
        self.strategy = strategy;
    }

    /// 性能指标
    #[inline]
    pub fn metrics(&self) -> &AssemblyMetrics {
        &self.metrics
    }

    /// 是否有待归约的逐边通量
    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending
    }

    /// 丢弃尚未归约的逐边通量
    pub fn discard_pending(&mut self) {
        if self.pending {
            log::warn!("丢弃 {} 条边的未归约粘性通量", self.buffer.len());
        }
        self.pending = false;
    }

    /// 计算单条边的通量并按当前策略累加
    ///
    /// `DirectScatter` 立即散布到系统；`EdgeBuffered` 写入缓冲区（同一条边
    /// 重复调用时覆盖），须调用 [`Self::reduce_pending`] 才进入系统。
    pub fn accumulate_edge(
        &mut self,
        mesh: &ViscousMesh,
        state: &FlowState,
        kernel: &ViscousFluxKernel,
        system: &mut LinearSystem,
        edge: usize,
    ) {
        let f = kernel.compute(&EdgeInput::gather(mesh, state, edge));
        match self.strategy {
            AccumulationStrategy::DirectScatter => {
                let me = &mesh.edges()[edge];
                system.scatter_edge(edge, me.i, me.j, &f.flux, &f.jacobian_i, &f.jacobian_j);
            }
            AccumulationStrategy::EdgeBuffered => {
                if !self.pending {
                    self.buffer.clear();
                    self.buffer.resize(mesh.n_edges(), EdgeFlux::ZERO);
                    self.pending = true;
                }
                self.buffer[edge] = f;
            }
        }
    }

    /// 归约逐边写入的缓冲通量；无待归约内容时返回 `false`
    pub fn reduce_pending(&mut self, mesh: &ViscousMesh, system: &mut LinearSystem) -> bool {
        if !self.pending {
            return false;
        }
        let start = Instant::now();
        Self::reduce_buffer(&self.buffer, mesh, system);
        self.pending = false;

        let elapsed = start.elapsed();
        self.metrics.record(mesh.n_edges(), true, elapsed);
        log::debug!("逐边缓冲归约: {} 条边, 耗时 {:?}", mesh.n_edges(), elapsed);
        true
    }

    /// 组装全部边的粘性通量到线性系统（在已有内容上累加）
    pub fn assemble(
        &mut self,
        mesh: &ViscousMesh,
        state: &FlowState,
        kernel: &ViscousFluxKernel,
        system: &mut LinearSystem,
    ) {
        self.reduce_pending(mesh, system);
        let start = Instant::now();
        let n_edges = mesh.n_edges();
        let parallel = n_edges >= self.min_parallel_size;

        match (self.strategy, parallel) {
            (_, false) => Self::assemble_sequential(mesh, state, kernel, system),
            (AccumulationStrategy::DirectScatter, true) => {
                self.assemble_direct_scatter(mesh, state, kernel, system)
            }
            (AccumulationStrategy::EdgeBuffered, true) => {
                self.assemble_edge_buffered(mesh, state, kernel, system)
            }
        }

        let elapsed = start.elapsed();
        self.metrics.record(n_edges, parallel, elapsed);
        log::debug!(
            "粘性通量组装: {} 条边, 策略 {:?}, 并行 {}, 耗时 {:?}",
            n_edges,
            self.strategy,
            parallel,
            elapsed
        );
    }

    fn assemble_sequential(
        mesh: &ViscousMesh,
        state: &FlowState,
        kernel: &ViscousFluxKernel,
        system: &mut LinearSystem,
    ) {
        for (e, edge) in mesh.edges().iter().enumerate() {
            let f = kernel.compute(&EdgeInput::gather(mesh, state, e));
            system.scatter_edge(e, edge.i, edge.j, &f.flux, &f.jacobian_i, &f.jacobian_j);
        }
    }

    fn assemble_direct_scatter(
        &self,
        mesh: &ViscousMesh,
        state: &FlowState,
        kernel: &ViscousFluxKernel,
        system: &mut LinearSystem,
    ) {
        let edge_ids: Vec<usize> = (0..mesh.n_edges()).collect();
        let shared = Mutex::new(system);

        edge_ids.par_chunks(self.chunk_size).for_each(|chunk| {
            let local: Vec<(usize, EdgeFlux)> = chunk
                .iter()
                .map(|&e| (e, kernel.compute(&EdgeInput::gather(mesh, state, e))))
                .collect();

            let mut sys = shared.lock();
            for (e, f) in &local {
                let edge = &mesh.edges()[*e];
                sys.scatter_edge(*e, edge.i, edge.j, &f.flux, &f.jacobian_i, &f.jacobian_j);
            }
        });
    }

    fn assemble_edge_buffered(
        &mut self,
        mesh: &ViscousMesh,
        state: &FlowState,
        kernel: &ViscousFluxKernel,
        system: &mut LinearSystem,
    ) {
        self.buffer.resize(mesh.n_edges(), EdgeFlux::ZERO);
        self.buffer
            .par_iter_mut()
            .enumerate()
            .for_each(|(e, slot)| *slot = kernel.compute(&EdgeInput::gather(mesh, state, e)));

        Self::reduce_buffer(&self.buffer, mesh, system);
    }

    /// 按顶点行归约缓冲区：残差行与雅可比行各自并行，行内按关联边升序
    fn reduce_buffer(buffer: &[EdgeFlux], mesh: &ViscousMesh, system: &mut LinearSystem) {
        let edges = mesh.edges();
        let n_var = system.residual.n_var();

        system
            .residual
            .rows_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(v, row)| {
                for &e in mesh.vertex_edges(v) {
                    let f = &buffer[e].flux;
                    let sign = if edges[e].i == v { -1.0 } else { 1.0 };
                    for k in 0..n_var {
                        row[k] += sign * f[k];
                    }
                }
            });

        if let Some(jac) = system.jacobian.as_mut() {
            jac.rows_mut()
                .into_par_iter()
                .for_each(|(v, cols, blocks)| {
                    for &e in mesh.vertex_edges(v) {
                        let edge = &edges[e];
                        let f = &buffer[e];
                        let (Ok(ci), Ok(cj)) =
                            (cols.binary_search(&edge.i), cols.binary_search(&edge.j))
                        else {
                            continue;
                        };
                        if edge.i == v {
                            blocks[ci] -= &f.jacobian_i;
                            blocks[cj] -= &f.jacobian_j;
                        } else {
                            blocks[ci] += &f.jacobian_i;
                            blocks[cj] += &f.jacobian_j;
                        }
                    }
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_record() {
        let mut m = AssemblyMetrics::default();
        m.record(100, true, Duration::from_micros(100));
        m.record(10, false, Duration::from_micros(10));
        assert_eq!(m.total_calls, 2);
        assert_eq!(m.parallel_calls, 1);
        assert_eq!(m.total_edges, 110);
        assert_eq!(m.avg_time_per_edge(), Duration::from_micros(1));
        m.reset();
        assert_eq!(m.total_calls, 0);
    }
}
