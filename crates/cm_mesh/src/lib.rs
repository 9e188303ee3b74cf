// crates/cm_mesh/src/lib.rs

//! ChaoMesh 非结构网格模块
//!
//! 提供海岸水动力模型常用的二维非结构网格数据结构，
//! 覆盖读写、拓扑归一化、空间查询与矢量导出。
//!
//! # 核心类型
//!
//! - [`Mesh`]: 节点 / 单元 / 边界的聚合容器与查询入口
//! - [`Node`] / [`Element`]: 基础记录，单元以存储位置引用节点
//! - [`OpenBoundary`] / [`LandBoundary`]: 开边界与陆地边界
//! - [`Numbering`]: 文件编号到存储位置的映射
//!
//! # 模块结构
//!
//! - [`mesh`]: 网格容器与查询
//! - [`topology`]: 顶点归一化、连接表、关联表、网格尺度
//! - [`spatial_index`]: R-Tree 点索引
//! - [`io`]: 格式读写 (原生 ASCII / 2dm / DFlow netCDF)
//! - [`export`]: 矢量要素导出 (GeoJSON)
//!
//! # 示例
//!
//! ```no_run
//! use cm_mesh::Mesh;
//! use cm_geo::Point2D;
//!
//! let mut mesh = Mesh::new();
//! mesh.read(std::path::Path::new("estuary.grd"))?;
//!
//! // 最近节点查询
//! if let Some(position) = mesh.find_nearest_node(&Point2D::new(120.5, 31.2)) {
//!     println!("nearest node id = {}", mesh.nodes()[position].id);
//! }
//! # Ok::<(), cm_mesh::MeshError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod element;
pub mod error;
pub mod export;
pub mod io;
pub mod mesh;
pub mod node;
pub mod numbering;
pub mod spatial_index;
pub mod topology;

pub use boundary::{LandBoundary, LandPayload, OpenBoundary};
pub use element::Element;
pub use error::{MeshError, MeshResult};
pub use io::MeshFormat;
pub use mesh::Mesh;
pub use node::Node;
pub use numbering::Numbering;
pub use spatial_index::PointIndex;

/// 常用导出
pub mod prelude {
    pub use crate::boundary::{LandBoundary, LandPayload, OpenBoundary};
    pub use crate::element::Element;
    pub use crate::error::{MeshError, MeshResult};
    pub use crate::io::MeshFormat;
    pub use crate::mesh::Mesh;
    pub use crate::node::Node;
    pub use crate::numbering::Numbering;
    pub use cm_geo::Point2D;
}
