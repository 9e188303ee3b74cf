// crates/cm_foundation/src/lib.rs

//! ChaoMesh Foundation Layer
//!
//! 基础层，提供整个项目的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型和验证辅助
//!
//! # 设计原则
//!
//! 1. **最小依赖**: 仅依赖 thiserror
//! 2. **层次化错误**: 上层 crate 通过 `#[from]` 包装 [`error::CmError`]
//! 3. **快速失败**: 验证失败立即返回，不留半初始化状态
//!
//! # 示例
//!
//! ```
//! use cm_foundation::error::{CmError, CmResult};
//!
//! fn validate(count: usize) -> CmResult<()> {
//!     CmError::check_size("nodes", 4, count)
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

// 重导出常用类型
pub use error::{CmError, CmResult};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{CmError, CmResult};
    pub use crate::{ensure, require};
}
