// crates/cm_mesh/src/spatial_index.rs

//! 点集空间索引
//!
//! 基于 R-Tree 的二维点索引，节点索引和单元形心索引共用同一实现。
//! 使用 rstar crate 的批量加载一次建树，重建 = 丢弃后重新批量加载。
//!
//! # 示例
//!
//! ```
//! use cm_mesh::spatial_index::PointIndex;
//! use cm_geo::Point2D;
//!
//! let index = PointIndex::build(vec![
//!     Point2D::new(0.0, 0.0),
//!     Point2D::new(10.0, 0.0),
//! ]);
//! assert_eq!(index.nearest(&Point2D::new(1.0, 1.0)), Some(0));
//! ```

use cm_geo::Point2D;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// 带存储位置的索引点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedPoint {
    /// 记录的存储位置
    pub position: usize,
    /// 点坐标
    pub point: Point2D,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.point.x, self.point.y])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point.x - point[0];
        let dy = self.point.y - point[1];
        dx * dx + dy * dy
    }
}

/// 二维点的 R-Tree 索引
pub struct PointIndex {
    tree: RTree<IndexedPoint>,
    n_points: usize,
}

impl PointIndex {
    /// 批量构建索引
    ///
    /// 点的下标即记录的存储位置。
    #[must_use]
    pub fn build(points: Vec<Point2D>) -> Self {
        let n_points = points.len();
        let entries: Vec<IndexedPoint> = points
            .into_iter()
            .enumerate()
            .map(|(position, point)| IndexedPoint { position, point })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
            n_points,
        }
    }

    /// 索引的点数
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.n_points
    }

    /// 索引是否为空
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_points == 0
    }

    /// 最近的一个点，返回存储位置
    #[must_use]
    pub fn nearest(&self, query: &Point2D) -> Option<usize> {
        self.tree
            .nearest_neighbor(&[query.x, query.y])
            .map(|entry| entry.position)
    }

    /// 按距离升序返回最近的 k 个点的存储位置
    #[must_use]
    pub fn k_nearest(&self, query: &Point2D, k: usize) -> Vec<usize> {
        self.tree
            .nearest_neighbor_iter(&[query.x, query.y])
            .take(k)
            .map(|entry| entry.position)
            .collect()
    }

    /// 批量最近邻查询
    #[must_use]
    pub fn nearest_batch(&self, queries: &[Point2D]) -> Vec<Option<usize>> {
        queries.iter().map(|q| self.nearest(q)).collect()
    }

    /// 并行批量最近邻查询
    #[cfg(feature = "parallel")]
    #[must_use]
    pub fn nearest_parallel(&self, queries: &[Point2D]) -> Vec<Option<usize>> {
        use rayon::prelude::*;
        queries.par_iter().map(|q| self.nearest(q)).collect()
    }
}
