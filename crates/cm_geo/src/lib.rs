// crates/cm_geo/src/lib.rs

//! ChaoMesh 地理空间处理模块
//!
//! 提供几何类型、坐标参考系统 (CRS) 和坐标转换接口。
//!
//! # 模块
//!
//! - `geometry`: 几何类型 (Point2D)
//! - `crs`: 坐标参考系统定义
//! - `transform`: 坐标转换接口和内置 CPP 投影
//! - `error`: 地理层错误类型
//!
//! # 示例
//!
//! ```
//! use cm_geo::prelude::*;
//!
//! let wgs84 = Crs::wgs84();
//! assert!(wgs84.is_geographic);
//!
//! let p = Point2D::from_lonlat(-75.0, 36.0);
//! let projected = cm_geo::transform::cpp(&p, -75.2, 35.8);
//! assert!(projected.is_finite());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod crs;
pub mod error;
pub mod geometry;
pub mod transform;

/// 预导入模块
pub mod prelude {
    pub use crate::crs::Crs;
    pub use crate::error::{GeoError, GeoResult};
    pub use crate::geometry::Point2D;
    pub use crate::transform::{CoordinateTransform, CppTransform};
}

// 重导出常用类型
pub use crs::Crs;
pub use error::{GeoError, GeoResult};
pub use geometry::Point2D;
pub use transform::{CoordinateTransform, CppTransform};
