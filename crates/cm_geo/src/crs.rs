// crates/cm_geo/src/crs.rs

//! 坐标参考系统 (CRS) 定义
//!
//! 网格层只需要 EPSG 代码和"地理/投影"二分，实际的坐标转换
//! 通过 [`crate::transform::CoordinateTransform`] 注入。
//!
//! # 示例
//!
//! ```
//! use cm_geo::crs::Crs;
//!
//! let wgs84 = Crs::wgs84();
//! assert!(wgs84.is_geographic);
//!
//! let utm = Crs::from_epsg(32650);
//! assert!(utm.is_projected());
//! ```

use serde::{Deserialize, Serialize};

/// 坐标参考系统
///
/// EPSG 代码加上"是否地理坐标系"标志。标志只影响坐标的书写精度
/// 和距离语义，不做任何实际的投影计算。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    /// EPSG 代码（如 4326 = WGS84）
    pub epsg: u32,
    /// 是否为地理坐标系（度）
    pub is_geographic: bool,
}

impl Crs {
    /// 从 EPSG 代码创建，地理标志按常见代码自动推断
    #[must_use]
    pub fn from_epsg(epsg: u32) -> Self {
        Self {
            epsg,
            is_geographic: Self::infer_geographic(epsg),
        }
    }

    /// 从 EPSG 代码创建，显式指定地理标志
    #[must_use]
    pub const fn with_geographic(epsg: u32, is_geographic: bool) -> Self {
        Self {
            epsg,
            is_geographic,
        }
    }

    /// WGS84 地理坐标系
    #[must_use]
    pub const fn wgs84() -> Self {
        Self {
            epsg: 4326,
            is_geographic: true,
        }
    }

    /// 是否为投影坐标系（米）
    #[must_use]
    pub const fn is_projected(&self) -> bool {
        !self.is_geographic
    }

    /// 常见地理 CRS EPSG 代码判定
    fn infer_geographic(epsg: u32) -> bool {
        matches!(epsg, 4326 | 4269 | 4267 | 4490 | 4019 | 4258)
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wgs84_is_geographic() {
        let wgs84 = Crs::wgs84();
        assert!(wgs84.is_geographic);
        assert!(!wgs84.is_projected());
        assert_eq!(wgs84.epsg, 4326);
    }

    #[test]
    fn test_from_epsg_inference() {
        assert!(Crs::from_epsg(4326).is_geographic);
        assert!(Crs::from_epsg(4269).is_geographic);
        assert!(Crs::from_epsg(32650).is_projected());
        assert!(Crs::from_epsg(3857).is_projected());
    }

    #[test]
    fn test_explicit_flag() {
        let crs = Crs::with_geographic(99999, true);
        assert!(crs.is_geographic);
    }

    #[test]
    fn test_default_is_wgs84() {
        assert_eq!(Crs::default(), Crs::wgs84());
    }
}
