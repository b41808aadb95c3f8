// crates/vf_physics/src/comm.rs

//! 分区间集合通信
//!
//! 本子系统只需要两种集合操作：标量数组的求和归约与最大值归约
//! （监测指标、非物理点计数、应变率/涡量极值）。不做点对点通信。
//!
//! - [`SerialComm`]: 单分区，归约为恒等操作
//! - [`ThreadComm`]: 同一进程内的多分区，每个分区一个线程，用于
//!   分区一致性测试与共享内存下的分区并行
//!
//! 集合操作必须由组内所有成员以相同顺序调用；缺席的成员会使其他
//! 成员永久阻塞在栅栏上。

use std::sync::{Arc, Barrier};

use parking_lot::Mutex;

/// 集合通信接口
pub trait Communicator: Send + Sync {
    /// 本分区编号
    fn rank(&self) -> usize;

    /// 分区总数
    fn size(&self) -> usize;

    /// 逐分量求和归约
    fn all_reduce_sum(&self, values: &mut [f64]);

    /// 逐分量最大值归约
    fn all_reduce_max(&self, values: &mut [f64]);

    /// 计数求和
    fn all_reduce_count(&self, count: u64) -> u64 {
        let mut v = [count as f64];
        self.all_reduce_sum(&mut v);
        v[0].round() as u64
    }

    /// 是否为主分区
    fn is_root(&self) -> bool {
        self.rank() == 0
    }
}

// ============================================================
// 串行
// ============================================================

/// 单分区通信器
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialComm;

impl Communicator for SerialComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce_sum(&self, _values: &mut [f64]) {}

    fn all_reduce_max(&self, _values: &mut [f64]) {}
}

// ============================================================
// 线程组
// ============================================================

#[derive(Debug, Clone, Copy)]
enum ReduceOp {
    Sum,
    Max,
}

#[derive(Debug)]
struct GroupShared {
    size: usize,
    slots: Mutex<Vec<Option<Vec<f64>>>>,
    barrier: Barrier,
}

/// 进程内线程组通信器
///
/// 每个成员把自己的贡献放入按编号排列的槽位，栅栏后所有成员按编号顺序
/// 合并，保证各成员得到按位相同的结果。
#[derive(Debug, Clone)]
pub struct ThreadComm {
    rank: usize,
    shared: Arc<GroupShared>,
}

impl ThreadComm {
    /// 创建 `size` 个成员的通信组，返回值按编号排列
    pub fn group(size: usize) -> Vec<ThreadComm> {
        let size = size.max(1);
        let shared = Arc::new(GroupShared {
            size,
            slots: Mutex::new(vec![None; size]),
            barrier: Barrier::new(size),
        });
        (0..size)
            .map(|rank| ThreadComm {
                rank,
                shared: Arc::clone(&shared),
            })
            .collect()
    }

    fn all_reduce(&self, values: &mut [f64], op: ReduceOp) {
        let shared = &self.shared;

        shared.slots.lock()[self.rank] = Some(values.to_vec());
        shared.barrier.wait();

        {
            let slots = shared.slots.lock();
            for (k, out) in values.iter_mut().enumerate() {
                let mut acc = match op {
                    ReduceOp::Sum => 0.0,
                    ReduceOp::Max => f64::NEG_INFINITY,
                };
                for contrib in slots.iter().flatten() {
                    let x = contrib.get(k).copied().unwrap_or(0.0);
                    acc = match op {
                        ReduceOp::Sum => acc + x,
                        ReduceOp::Max => acc.max(x),
                    };
                }
                *out = acc;
            }
        }

        // 全部成员读完后由一个成员清空槽位
        if shared.barrier.wait().is_leader() {
            shared.slots.lock().iter_mut().for_each(|s| *s = None);
        }
        shared.barrier.wait();
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn all_reduce_sum(&self, values: &mut [f64]) {
        self.all_reduce(values, ReduceOp::Sum);
    }

    fn all_reduce_max(&self, values: &mut [f64]) {
        self.all_reduce(values, ReduceOp::Max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_is_identity() {
        let mut v = [1.0, -2.0];
        SerialComm.all_reduce_sum(&mut v);
        SerialComm.all_reduce_max(&mut v);
        assert_eq!(v, [1.0, -2.0]);
        assert_eq!(SerialComm.all_reduce_count(7), 7);
        assert!(SerialComm.is_root());
    }

    #[test]
    fn test_thread_group_reductions() {
        let group = ThreadComm::group(3);
        let results: Vec<(Vec<f64>, Vec<f64>, u64)> = std::thread::scope(|s| {
            let handles: Vec<_> = group
                .iter()
                .map(|comm| {
                    s.spawn(move || {
                        let r = comm.rank() as f64;
                        let mut sum = vec![r, 1.0];
                        comm.all_reduce_sum(&mut sum);
                        let mut max = vec![r, -r];
                        comm.all_reduce_max(&mut max);
                        let count = comm.all_reduce_count(comm.rank() as u64 + 1);
                        (sum, max, count)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (sum, max, count) in results {
            assert_eq!(sum, vec![3.0, 3.0]);
            assert_eq!(max, vec![2.0, 0.0]);
            assert_eq!(count, 6);
        }
    }
}
