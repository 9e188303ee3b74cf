// crates/cm_geo/src/transform.rs

//! 坐标转换器
//!
//! 网格层把坐标转换视为黑盒：输入一批点，输出等长的一批点。
//! [`CoordinateTransform`] 是该黑盒的接口，内置实现只有求解器
//! 内部使用的 CPP（carte parallelogrammatique）等距圆柱投影，
//! 其余投影由调用方自带实现注入。
//!
//! # 示例
//!
//! ```
//! use cm_geo::geometry::Point2D;
//! use cm_geo::transform::{cpp, inverse_cpp};
//!
//! let lonlat = Point2D::from_lonlat(-75.0, 36.0);
//! let projected = cpp(&lonlat, -75.2, 35.8);
//! let back = inverse_cpp(&projected, -75.2, 35.8);
//! assert!((back.x - lonlat.x).abs() < 1e-9);
//! assert!((back.y - lonlat.y).abs() < 1e-9);
//! ```

use crate::error::{GeoError, GeoResult};
use crate::geometry::Point2D;
use std::f64::consts::PI;

/// CPP 投影使用的地球半径 (米)
pub const CPP_EARTH_RADIUS: f64 = 6_378_137.0;

// ============================================================================
// 坐标转换接口
// ============================================================================

/// 坐标转换黑盒接口
///
/// 实现者负责源/目标坐标系的语义；网格层只要求输出点数与输入相同，
/// 并在任何一点转换失败时返回错误而不是部分结果。
pub trait CoordinateTransform {
    /// 目标坐标系 EPSG 代码
    fn target_epsg(&self) -> u32;

    /// 目标坐标系是否为地理坐标系
    fn target_is_geographic(&self) -> bool;

    /// 批量转换坐标点
    ///
    /// # Errors
    /// 任何一点转换失败时返回错误，此时不应产生部分输出。
    fn transform(&self, points: &[Point2D]) -> GeoResult<Vec<Point2D>>;
}

// ============================================================================
// CPP 等距圆柱投影
// ============================================================================

/// CPP 正变换：经纬度（度）到以 (lambda0, phi0) 为基准的平面坐标（米）
#[inline]
#[must_use]
pub fn cpp(p: &Point2D, lambda0: f64, phi0: f64) -> Point2D {
    let lambda0_rad = lambda0 * PI / 180.0;
    let phi0_rad = phi0 * PI / 180.0;
    Point2D::new(
        CPP_EARTH_RADIUS * (p.x * PI / 180.0 - lambda0_rad) * phi0_rad.cos(),
        p.y * PI / 180.0 * CPP_EARTH_RADIUS,
    )
}

/// CPP 逆变换：平面坐标（米）回到经纬度（度）
#[inline]
#[must_use]
pub fn inverse_cpp(p: &Point2D, lambda0: f64, phi0: f64) -> Point2D {
    let phi0_rad = phi0 * PI / 180.0;
    Point2D::new(
        lambda0 + p.x / (CPP_EARTH_RADIUS * phi0_rad.cos()) * 180.0 / PI,
        p.y / CPP_EARTH_RADIUS * 180.0 / PI,
    )
}

/// CPP 投影转换器
///
/// 以指定基准点做等距圆柱投影，`inverse = true` 时执行逆变换。
#[derive(Debug, Clone, Copy)]
pub struct CppTransform {
    /// 基准经度（度）
    pub lambda0: f64,
    /// 基准纬度（度）
    pub phi0: f64,
    /// 是否为逆变换（平面 -> 经纬度）
    pub inverse: bool,
}

impl CppTransform {
    /// 创建正变换（经纬度 -> 平面）
    ///
    /// # Errors
    /// 基准纬度在 ±90° 时 cos(phi0) 为零，投影退化，返回错误。
    pub fn forward(lambda0: f64, phi0: f64) -> GeoResult<Self> {
        Self::validate_origin(phi0)?;
        Ok(Self {
            lambda0,
            phi0,
            inverse: false,
        })
    }

    /// 创建逆变换（平面 -> 经纬度）
    ///
    /// # Errors
    /// 基准纬度在 ±90° 时投影退化，返回错误。
    pub fn backward(lambda0: f64, phi0: f64) -> GeoResult<Self> {
        Self::validate_origin(phi0)?;
        Ok(Self {
            lambda0,
            phi0,
            inverse: true,
        })
    }

    fn validate_origin(phi0: f64) -> GeoResult<()> {
        let phi0_rad = phi0 * PI / 180.0;
        if phi0_rad.cos().abs() < 1e-12 {
            return Err(GeoError::projection_failed(
                "CPP",
                format!("基准纬度 {phi0} 处投影退化"),
            ));
        }
        Ok(())
    }
}

impl CoordinateTransform for CppTransform {
    fn target_epsg(&self) -> u32 {
        if self.inverse {
            4326
        } else {
            // CPP 平面坐标没有正式的 EPSG 代码
            0
        }
    }

    fn target_is_geographic(&self) -> bool {
        self.inverse
    }

    fn transform(&self, points: &[Point2D]) -> GeoResult<Vec<Point2D>> {
        let out: Vec<Point2D> = if self.inverse {
            points
                .iter()
                .map(|p| inverse_cpp(p, self.lambda0, self.phi0))
                .collect()
        } else {
            points
                .iter()
                .map(|p| cpp(p, self.lambda0, self.phi0))
                .collect()
        };
        for p in &out {
            if !p.is_finite() {
                return Err(GeoError::projection_failed("CPP", "转换结果非有限数"));
            }
        }
        Ok(out)
    }
}

// ============================================================================
// 测试
// ============================================================================
