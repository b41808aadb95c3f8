// crates/vf_foundation/src/index.rs

//! 网格索引类型
//!
//! 顶点、边与边界标记使用互不兼容的新类型索引，运行时与 `usize` 相同。
//! 热循环内部仍使用裸 `usize`，类型化索引用于对外接口。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 无效索引标记
pub const INVALID_INDEX: usize = usize::MAX;

macro_rules! define_index {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// 无效索引常量
            pub const INVALID: Self = Self(INVALID_INDEX);

            /// 创建新索引
            #[inline]
            pub const fn new(idx: usize) -> Self {
                Self(idx)
            }

            /// 获取索引值
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// 检查是否有效
            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != INVALID_INDEX
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(idx: usize) -> Self {
                Self(idx)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", stringify!($name), self.0)
                } else {
                    write!(f, "{}(INVALID)", stringify!($name))
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_index!(VertexIndex, "网格顶点（控制体）索引");
define_index!(EdgeIndex, "网格边索引");
define_index!(MarkerIndex, "边界标记索引");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip_usize() {
        let v = VertexIndex::new(7);
        let raw: usize = v.into();
        assert_eq!(raw, 7);
        assert_eq!(EdgeIndex::from(3).get(), 3);
    }

    #[test]
    fn test_invalid_index() {
        assert!(!MarkerIndex::INVALID.is_valid());
        assert_eq!(format!("{:?}", MarkerIndex::INVALID), "MarkerIndex(INVALID)");
        assert_eq!(format!("{:?}", VertexIndex::new(2)), "VertexIndex(2)");
    }
}
