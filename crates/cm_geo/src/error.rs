// crates/cm_geo/src/error.rs

//! 地理空间处理错误类型
//!
//! 包含坐标转换和坐标系统相关的错误。
//! 所有错误可转换为 `cm_foundation::CmError` 向上传播。

use cm_foundation::CmError;
use thiserror::Error;

/// Geo 模块结果类型
pub type GeoResult<T> = Result<T, GeoError>;

/// 地理空间处理错误
#[derive(Error, Debug)]
pub enum GeoError {
    /// 坐标超出有效范围
    #[error("{coord_type} 超出范围: {value:.6} (允许范围: {min} 到 {max})")]
    CoordinateOutOfRange {
        /// 坐标类型（如"纬度"、"经度"）
        coord_type: &'static str,
        /// 实际值
        value: f64,
        /// 最小允许值
        min: f64,
        /// 最大允许值
        max: f64,
    },

    /// 坐标转换失败
    #[error("坐标转换失败 [{operation}]: {message}")]
    ProjectionFailed {
        /// 操作类型（如"CPP"、"正向投影"）
        operation: &'static str,
        /// 错误详情
        message: String,
    },

    /// 转换输出点数与输入不符
    #[error("坐标转换输出点数不符: 期望{expected}, 实际{actual}")]
    TransformSizeMismatch {
        /// 输入点数
        expected: usize,
        /// 输出点数
        actual: usize,
    },

    /// 基础层错误（向下聚合）
    #[error("基础层错误: {0}")]
    Foundation(#[from] CmError),
}

impl GeoError {
    /// 创建坐标越界错误
    #[inline]
    pub fn coordinate_out_of_range(
        coord_type: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Self {
        Self::CoordinateOutOfRange {
            coord_type,
            value,
            min,
            max,
        }
    }

    /// 创建坐标转换失败错误
    #[inline]
    pub fn projection_failed(operation: &'static str, message: impl Into<String>) -> Self {
        Self::ProjectionFailed {
            operation,
            message: message.into(),
        }
    }

    /// 创建转换点数不符错误
    #[inline]
    pub fn transform_size_mismatch(expected: usize, actual: usize) -> Self {
        Self::TransformSizeMismatch { expected, actual }
    }
}

// ============================================================================
// 转换实现
// ============================================================================

impl From<GeoError> for CmError {
    fn from(err: GeoError) -> Self {
        match err {
            GeoError::CoordinateOutOfRange {
                coord_type,
                value,
                min,
                max,
            } => CmError::invalid_input(format!(
                "{coord_type} 超出范围: {value:.6} (允许范围: {min} 到 {max})"
            )),
            GeoError::ProjectionFailed { operation, message } => {
                CmError::internal(format!("坐标转换失败 [{operation}]: {message}"))
            }
            GeoError::TransformSizeMismatch { expected, actual } => {
                CmError::size_mismatch("transform output", expected, actual)
            }
            GeoError::Foundation(err) => err,
        }
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_out_of_range_display() {
        let err = GeoError::coordinate_out_of_range("纬度", 95.5, -90.0, 90.0);
        let msg = err.to_string();
        assert!(msg.contains("纬度"));
        assert!(msg.contains("95.5"));
    }

    #[test]
    fn test_projection_failed_display() {
        let err = GeoError::projection_failed("CPP", "基准点退化");
        let msg = err.to_string();
        assert!(msg.contains("CPP"));
        assert!(msg.contains("基准点退化"));
    }

    #[test]
    fn test_conversion_to_cm_error() {
        let err: CmError = GeoError::transform_size_mismatch(10, 8).into();
        assert!(matches!(err, CmError::SizeMismatch { .. }));

        let err: CmError = GeoError::projection_failed("CPP", "失败").into();
        assert!(matches!(err, CmError::Internal { .. }));
    }
}
