// crates/vf_foundation/src/lib.rs

//! ViscoFlux 基础层
//!
//! 为配置层与物理层提供无物理概念的公共设施：
//!
//! - [`error`]: 统一错误类型 `VfError` / `VfResult`
//! - [`index`]: 类型安全的网格索引（顶点、边、标记）
//! - [`kahan`]: Kahan 补偿求和，用于面积分类的长序列累加
//! - [`metrics`]: 无锁原子计数器，用于并行循环中的事件统计

#![warn(missing_docs)]

pub mod error;
pub mod index;
pub mod kahan;
pub mod metrics;

pub use error::{VfError, VfResult};
pub use index::{EdgeIndex, MarkerIndex, VertexIndex, INVALID_INDEX};
pub use kahan::KahanSum;
pub use metrics::Counter;
