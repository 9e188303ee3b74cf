// crates/cm_mesh/src/error.rs

//! 网格处理错误类型
//!
//! 包含网格拓扑、格式、查询相关的错误定义。
//! 所有错误可转换为 `cm_foundation::CmError` 向上传播。

use cm_foundation::CmError;
use cm_geo::GeoError;
use thiserror::Error;

/// 网格模块结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格错误枚举
#[derive(Error, Debug)]
pub enum MeshError {
    /// 拓扑错误
    #[error("拓扑错误: {operation} 失败, {details}")]
    InvalidTopology {
        /// 失败的操作名
        operation: &'static str,
        /// 错误详情
        details: String,
    },

    /// 网格格式错误
    #[error("网格格式错误: {format}, {file}, 行 {line}: {message}")]
    FormatError {
        /// 格式名
        format: &'static str,
        /// 文件路径
        file: String,
        /// 行号（netCDF 等无行概念的格式为 0）
        line: usize,
        /// 错误信息
        message: String,
    },

    /// 节点编号不存在
    #[error("节点编号不存在: {id}")]
    NodeNotFound {
        /// 查询的节点编号
        id: usize,
    },

    /// 单元编号不存在
    #[error("单元编号不存在: {id}")]
    ElementNotFound {
        /// 查询的单元编号
        id: usize,
    },

    /// 单元顶点数无效
    #[error("单元顶点数无效: {count} (仅支持 3 或 4)")]
    InvalidArity {
        /// 实际顶点数
        count: usize,
    },

    /// 边界定义无效
    #[error("边界定义无效: {kind} 边界 {index}: {message}")]
    InvalidBoundary {
        /// 边界类别（"open" 或 "land"）
        kind: &'static str,
        /// 边界序号
        index: usize,
        /// 错误信息
        message: String,
    },

    /// 外部库调用失败
    #[error("外部库错误 [{library}]: {message}")]
    External {
        /// 库名称
        library: &'static str,
        /// 失败原因
        message: String,
    },

    /// 聚合地理层错误
    #[error("地理层错误: {0}")]
    Geo(#[from] GeoError),

    /// 聚合基础层错误
    #[error("基础层错误: {0}")]
    Foundation(#[from] CmError),
}

/// 转换到 Foundation 层错误
impl From<MeshError> for CmError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::InvalidTopology { operation, details } => {
                CmError::internal(format!("网格拓扑错误 [{operation}]: {details}"))
            }
            MeshError::FormatError {
                format,
                file,
                line,
                message,
            } => CmError::parse(file, line, format!("[{format}] {message}")),
            MeshError::NodeNotFound { id } => CmError::not_found(format!("node {id}")),
            MeshError::ElementNotFound { id } => CmError::not_found(format!("element {id}")),
            MeshError::InvalidArity { count } => {
                CmError::invalid_input(format!("单元顶点数无效: {count}"))
            }
            MeshError::InvalidBoundary {
                kind,
                index,
                message,
            } => CmError::invalid_input(format!("{kind} 边界 {index} 无效: {message}")),
            MeshError::External { library, message } => CmError::external(library, message),
            MeshError::Geo(geo_err) => geo_err.into(),
            MeshError::Foundation(err) => err,
        }
    }
}

/// 便捷构造函数
impl MeshError {
    /// 拓扑错误
    pub fn invalid_topology(operation: &'static str, details: impl Into<String>) -> Self {
        Self::InvalidTopology {
            operation,
            details: details.into(),
        }
    }

    /// 格式错误
    pub fn format_error(
        format: &'static str,
        file: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::FormatError {
            format,
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// 节点不存在
    pub fn node_not_found(id: usize) -> Self {
        Self::NodeNotFound { id }
    }

    /// 单元不存在
    pub fn element_not_found(id: usize) -> Self {
        Self::ElementNotFound { id }
    }

    /// 顶点数无效
    pub fn invalid_arity(count: usize) -> Self {
        Self::InvalidArity { count }
    }

    /// 边界定义无效
    pub fn invalid_boundary(kind: &'static str, index: usize, message: impl Into<String>) -> Self {
        Self::InvalidBoundary {
            kind,
            index,
            message: message.into(),
        }
    }

    /// 外部库错误
    pub fn external(library: &'static str, message: impl Into<String>) -> Self {
        Self::External {
            library,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for MeshError {
    fn from(err: std::io::Error) -> Self {
        Self::Foundation(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_to_foundation() {
        let mesh_err = MeshError::invalid_topology("normalize", "degenerate element");
        let foundation_err: CmError = mesh_err.into();
        assert!(foundation_err.to_string().contains("网格拓扑错误"));
    }

    #[test]
    fn test_format_error_carries_location() {
        let err = MeshError::format_error("adcirc", "test.grd", 42, "bad node record");
        let msg = err.to_string();
        assert!(msg.contains("adcirc"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn test_not_found_variants() {
        assert!(MeshError::node_not_found(7).to_string().contains('7'));
        assert!(MeshError::element_not_found(9).to_string().contains('9'));
    }

    #[test]
    fn test_io_error_wrapping() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let mesh_err: MeshError = io_err.into();
        assert!(matches!(mesh_err, MeshError::Foundation(_)));
    }
}
