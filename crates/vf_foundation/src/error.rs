// crates/vf_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 基础层只定义与物理无关的核心错误；网格、边界、求解器相关错误
//! 在 vf_physics 中以各自的枚举扩展，并可通过 `From` 转换为 `VfError`。
//!
//! # 示例
//!
//! ```
//! use vf_foundation::error::{VfError, VfResult};
//!
//! fn check_area(area: f64) -> VfResult<()> {
//!     if area <= 0.0 {
//!         return Err(VfError::invalid_input("面积必须为正"));
//!     }
//!     Ok(())
//! }
//! assert!(check_area(-1.0).is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type VfResult<T> = Result<T, VfError>;

/// ViscoFlux 错误类型
#[derive(Error, Debug)]
pub enum VfError {
    // ========================================================================
    // 输入与配置
    // ========================================================================
    /// 无效输入
    #[error("无效输入: {message}")]
    InvalidInput {
        /// 描述
        message: String,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 描述
        message: String,
    },

    // ========================================================================
    // 数据结构
    // ========================================================================
    /// 数组长度不匹配
    #[error("数组长度不匹配: {name} 期望 {expected}, 实际 {actual}")]
    SizeMismatch {
        /// 数组名称
        name: &'static str,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 网格拓扑不合法
    #[error("无效网格: {message}")]
    InvalidMesh {
        /// 描述
        message: String,
    },

    /// 内部错误（不应出现）
    #[error("内部错误: {message}")]
    Internal {
        /// 描述
        message: String,
    },
}

impl VfError {
    /// 创建无效输入错误
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 创建无效网格错误
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 校验数组长度
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> VfResult<()> {
        if expected != actual {
            return Err(Self::SizeMismatch {
                name,
                expected,
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_size() {
        assert!(VfError::check_size("rho", 3, 3).is_ok());
        let err = VfError::check_size("rho", 3, 2).unwrap_err();
        assert!(matches!(err, VfError::SizeMismatch { expected: 3, actual: 2, .. }));
    }
}
