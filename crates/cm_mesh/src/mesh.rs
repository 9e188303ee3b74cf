// crates/cm_mesh/src/mesh.rs

//! 网格聚合体
//!
//! [`Mesh`] 持有全部记录集合、编号映射和惰性空间索引，
//! 是查询与读写的入口。
//!
//! # 索引生命周期
//!
//! 节点/单元空间索引在首次查询时构建，结构性修改
//! （增删节点/单元、重投影）后失效，下次查询时重建。
//!
//! # 读取语义
//!
//! 读取前整体清空；读取失败时保持清空状态，不留部分网格。

use crate::boundary::{LandBoundary, OpenBoundary};
use crate::element::Element;
use crate::error::{MeshError, MeshResult};
use crate::node::Node;
use crate::numbering::Numbering;
use crate::spatial_index::PointIndex;
use crate::topology;
use cm_geo::transform::{cpp, inverse_cpp, CoordinateTransform};
use cm_geo::{Crs, GeoError, Point2D};
use std::path::Path;
use tracing::info;

/// 非结构网格
#[derive(Default)]
pub struct Mesh {
    /// 文件头描述行
    pub header: String,
    /// 坐标参考系统
    pub crs: Crs,
    pub(crate) nodes: Vec<Node>,
    pub(crate) elements: Vec<Element>,
    pub(crate) open_boundaries: Vec<OpenBoundary>,
    pub(crate) land_boundaries: Vec<LandBoundary>,
    pub(crate) node_numbering: Numbering,
    pub(crate) element_numbering: Numbering,
    node_index: Option<PointIndex>,
    element_index: Option<PointIndex>,
}

impl Mesh {
    /// 点定位的默认候选深度
    pub const DEFAULT_SEARCH_DEPTH: usize = 20;

    /// 创建空网格
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 清空全部集合与派生状态
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // ========================================================================
    // 计数与集合访问
    // ========================================================================

    /// 节点数
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// 单元数
    #[must_use]
    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// 开边界数
    #[must_use]
    pub fn num_open_boundaries(&self) -> usize {
        self.open_boundaries.len()
    }

    /// 陆地边界数
    #[must_use]
    pub fn num_land_boundaries(&self) -> usize {
        self.land_boundaries.len()
    }

    /// 开边界节点总数
    #[must_use]
    pub fn total_open_boundary_nodes(&self) -> usize {
        self.open_boundaries.iter().map(OpenBoundary::len).sum()
    }

    /// 陆地边界节点总数
    #[must_use]
    pub fn total_land_boundary_nodes(&self) -> usize {
        self.land_boundaries.iter().map(LandBoundary::len).sum()
    }

    /// 单元的最大顶点数（空网格为 0）
    #[must_use]
    pub fn max_nodes_per_element(&self) -> usize {
        self.elements.iter().map(Element::n_nodes).max().unwrap_or(0)
    }

    /// 节点切片
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// 单元切片
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// 开边界切片
    #[must_use]
    pub fn open_boundaries(&self) -> &[OpenBoundary] {
        &self.open_boundaries
    }

    /// 陆地边界切片
    #[must_use]
    pub fn land_boundaries(&self) -> &[LandBoundary] {
        &self.land_boundaries
    }

    /// 替换开边界集合
    pub fn set_open_boundaries(&mut self, boundaries: Vec<OpenBoundary>) {
        self.open_boundaries = boundaries;
    }

    /// 替换陆地边界集合
    pub fn set_land_boundaries(&mut self, boundaries: Vec<LandBoundary>) {
        self.land_boundaries = boundaries;
    }

    // ========================================================================
    // 按位置 / 按编号访问
    // ========================================================================

    /// 按存储位置取节点
    ///
    /// # Errors
    /// 位置越界时返回错误。
    pub fn node(&self, position: usize) -> MeshResult<&Node> {
        self.nodes.get(position).ok_or_else(|| {
            MeshError::invalid_topology(
                "node",
                format!("节点位置 {position} 超出范围 0..{}", self.nodes.len()),
            )
        })
    }

    /// 按存储位置取单元
    ///
    /// # Errors
    /// 位置越界时返回错误。
    pub fn element(&self, position: usize) -> MeshResult<&Element> {
        self.elements.get(position).ok_or_else(|| {
            MeshError::invalid_topology(
                "element",
                format!("单元位置 {position} 超出范围 0..{}", self.elements.len()),
            )
        })
    }

    /// 节点编号到存储位置
    ///
    /// # Errors
    /// 编号不存在时返回 [`MeshError::NodeNotFound`]。
    pub fn node_position(&self, id: usize) -> MeshResult<usize> {
        self.node_numbering
            .position_of(id, self.nodes.len())
            .ok_or(MeshError::NodeNotFound { id })
    }

    /// 单元编号到存储位置
    ///
    /// # Errors
    /// 编号不存在时返回 [`MeshError::ElementNotFound`]。
    pub fn element_position(&self, id: usize) -> MeshResult<usize> {
        self.element_numbering
            .position_of(id, self.elements.len())
            .ok_or(MeshError::ElementNotFound { id })
    }

    /// 按文件编号取节点
    ///
    /// # Errors
    /// 编号不存在时返回错误。
    pub fn node_by_id(&self, id: usize) -> MeshResult<&Node> {
        let position = self.node_position(id)?;
        self.node(position)
    }

    /// 按文件编号取单元
    ///
    /// # Errors
    /// 编号不存在时返回错误。
    pub fn element_by_id(&self, id: usize) -> MeshResult<&Element> {
        let position = self.element_position(id)?;
        self.element(position)
    }

    /// 节点编号是否连续
    #[must_use]
    pub fn node_ordering_is_sequential(&self) -> bool {
        self.node_numbering.is_sequential()
    }

    /// 单元编号是否连续
    #[must_use]
    pub fn element_ordering_is_sequential(&self) -> bool {
        self.element_numbering.is_sequential()
    }

    // ========================================================================
    // 批量访问
    // ========================================================================

    /// 全部节点 X 坐标
    #[must_use]
    pub fn x(&self) -> Vec<f64> {
        self.nodes.iter().map(Node::x).collect()
    }

    /// 全部节点 Y 坐标
    #[must_use]
    pub fn y(&self) -> Vec<f64> {
        self.nodes.iter().map(Node::y).collect()
    }

    /// 全部节点高程
    #[must_use]
    pub fn z(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.z).collect()
    }

    /// 全部节点坐标 `[x, y, z]`
    #[must_use]
    pub fn xyz(&self) -> Vec<[f64; 3]> {
        self.nodes.iter().map(|n| [n.x(), n.y(), n.z]).collect()
    }

    /// 单元-节点连接表（节点文件编号）
    ///
    /// # Errors
    /// 单元引用越界节点位置时返回错误。
    pub fn connectivity(&self) -> MeshResult<Vec<Vec<usize>>> {
        self.elements
            .iter()
            .map(|e| {
                e.nodes()
                    .iter()
                    .map(|&pos| {
                        self.nodes.get(pos).map(|n| n.id).ok_or_else(|| {
                            MeshError::invalid_topology(
                                "connectivity",
                                format!("单元 {} 引用越界节点位置 {pos}", e.id),
                            )
                        })
                    })
                    .collect()
            })
            .collect()
    }

    /// 批量设置节点高程
    ///
    /// # Errors
    /// 输入长度与节点数不符时返回错误。
    pub fn set_z(&mut self, z: &[f64]) -> MeshResult<()> {
        if z.len() != self.nodes.len() {
            return Err(MeshError::Foundation(
                cm_foundation::CmError::size_mismatch("z", self.nodes.len(), z.len()),
            ));
        }
        for (node, &value) in self.nodes.iter_mut().zip(z) {
            node.z = value;
        }
        Ok(())
    }

    // ========================================================================
    // 结构性修改
    // ========================================================================

    /// 重设节点/单元容量
    ///
    /// 截断或以占位记录（编号 = 位置 + 1）扩展。
    /// 编号映射重建，空间索引失效。
    ///
    /// # Errors
    /// 占位编号与现存编号冲突时返回错误。
    pub fn resize(&mut self, num_nodes: usize, num_elements: usize) -> MeshResult<()> {
        let old_nodes = self.nodes.len();
        self.nodes.resize_with(num_nodes, Default::default);
        for (i, node) in self.nodes.iter_mut().enumerate().skip(old_nodes) {
            node.id = i + 1;
        }
        if num_elements < self.elements.len() {
            self.elements.truncate(num_elements);
        } else {
            for i in self.elements.len()..num_elements {
                self.elements.push(Element::triangle(i + 1, 0, 0, 0));
            }
        }
        self.rebuild_numbering()?;
        self.invalidate_indices();
        Ok(())
    }

    /// 在指定存储位置插入节点
    ///
    /// 后续位置整体后移，引用旧位置的单元/边界由调用方负责修正。
    ///
    /// # Errors
    /// 位置大于当前长度或编号已存在时返回错误。
    pub fn add_node(&mut self, position: usize, node: Node) -> MeshResult<()> {
        if position > self.nodes.len() {
            return Err(MeshError::invalid_topology(
                "add_node",
                format!("插入位置 {position} 超出范围 0..={}", self.nodes.len()),
            ));
        }
        if self.node_position(node.id).is_ok() {
            return Err(MeshError::invalid_topology(
                "add_node",
                format!("节点编号 {} 已存在", node.id),
            ));
        }
        self.nodes.insert(position, node);
        self.rebuild_numbering()?;
        self.invalidate_indices();
        Ok(())
    }

    /// 删除指定存储位置的节点
    ///
    /// # Errors
    /// 位置越界时返回错误。
    pub fn delete_node(&mut self, position: usize) -> MeshResult<()> {
        if position >= self.nodes.len() {
            return Err(MeshError::invalid_topology(
                "delete_node",
                format!("删除位置 {position} 超出范围 0..{}", self.nodes.len()),
            ));
        }
        self.nodes.remove(position);
        self.rebuild_numbering()?;
        self.invalidate_indices();
        Ok(())
    }

    /// 在指定存储位置插入单元
    ///
    /// # Errors
    /// 位置大于当前长度或编号已存在时返回错误。
    pub fn add_element(&mut self, position: usize, element: Element) -> MeshResult<()> {
        if position > self.elements.len() {
            return Err(MeshError::invalid_topology(
                "add_element",
                format!("插入位置 {position} 超出范围 0..={}", self.elements.len()),
            ));
        }
        if self.element_position(element.id).is_ok() {
            return Err(MeshError::invalid_topology(
                "add_element",
                format!("单元编号 {} 已存在", element.id),
            ));
        }
        self.elements.insert(position, element);
        self.rebuild_numbering()?;
        self.invalidate_indices();
        Ok(())
    }

    /// 删除指定存储位置的单元
    ///
    /// # Errors
    /// 位置越界时返回错误。
    pub fn delete_element(&mut self, position: usize) -> MeshResult<()> {
        if position >= self.elements.len() {
            return Err(MeshError::invalid_topology(
                "delete_element",
                format!("删除位置 {position} 超出范围 0..{}", self.elements.len()),
            ));
        }
        self.elements.remove(position);
        self.rebuild_numbering()?;
        self.invalidate_indices();
        Ok(())
    }

    /// 从现有记录编号重建编号映射
    ///
    /// 两张映射都建成后才写入，重复编号不会留下半更新状态。
    ///
    /// # Errors
    /// 节点或单元编号重复时返回错误。
    pub(crate) fn rebuild_numbering(&mut self) -> MeshResult<()> {
        let node_ids: Vec<usize> = self.nodes.iter().map(|n| n.id).collect();
        let element_ids: Vec<usize> = self.elements.iter().map(|e| e.id).collect();
        let node_numbering = Numbering::from_ids(&node_ids)?;
        let element_numbering = Numbering::from_ids(&element_ids)?;
        self.node_numbering = node_numbering;
        self.element_numbering = element_numbering;
        Ok(())
    }

    // ========================================================================
    // 拓扑
    // ========================================================================

    /// 归一化全部单元的顶点序
    ///
    /// # Errors
    /// 单元引用越界节点位置时返回错误。
    pub fn normalize(&mut self) -> MeshResult<()> {
        topology::normalize_elements(&self.nodes, &mut self.elements)?;
        self.element_index = None;
        Ok(())
    }

    /// 去重后的无向连接表（存储位置对，基于归一化顶点序）
    ///
    /// # Errors
    /// 单元引用越界节点位置时返回错误。
    pub fn link_table(&self) -> MeshResult<Vec<(usize, usize)>> {
        topology::link_table(&self.nodes, &self.elements)
    }

    /// 节点到单元的关联表
    ///
    /// # Errors
    /// 单元引用越界节点位置时返回错误。
    pub fn element_table(&self) -> MeshResult<Vec<Vec<usize>>> {
        topology::element_table(self.nodes.len(), &self.elements)
    }

    /// 每节点网格尺度
    ///
    /// # Errors
    /// 单元引用越界节点位置时返回错误。
    pub fn mesh_size(&self) -> MeshResult<Vec<f64>> {
        topology::mesh_size(&self.nodes, &self.elements)
    }

    // ========================================================================
    // 空间查询
    // ========================================================================

    /// 构建节点空间索引（已有则不动）
    pub fn build_node_index(&mut self) {
        if self.node_index.is_none() {
            self.node_index = Some(PointIndex::build(
                self.nodes.iter().map(|n| n.position).collect(),
            ));
        }
    }

    /// 构建单元形心空间索引（已有则不动）
    ///
    /// # Errors
    /// 单元引用越界节点位置时返回错误。
    pub fn build_element_index(&mut self) -> MeshResult<()> {
        if self.element_index.is_none() {
            let centroids: Vec<Point2D> = self
                .elements
                .iter()
                .map(|e| e.centroid(&self.nodes))
                .collect::<MeshResult<_>>()?;
            self.element_index = Some(PointIndex::build(centroids));
        }
        Ok(())
    }

    /// 丢弃全部空间索引
    pub fn invalidate_indices(&mut self) {
        self.node_index = None;
        self.element_index = None;
    }

    /// 最近节点的存储位置（空网格为 None）
    pub fn find_nearest_node(&mut self, point: &Point2D) -> Option<usize> {
        self.build_node_index();
        self.node_index.as_ref().and_then(|idx| idx.nearest(point))
    }

    /// 形心最近的单元存储位置（空网格为 None）
    ///
    /// # Errors
    /// 索引构建失败（单元引用越界）时返回错误。
    pub fn find_nearest_element(&mut self, point: &Point2D) -> MeshResult<Option<usize>> {
        self.build_element_index()?;
        Ok(self
            .element_index
            .as_ref()
            .and_then(|idx| idx.nearest(point)))
    }

    /// 点定位：返回包含该点的单元存储位置
    ///
    /// 取形心最近的 [`Self::DEFAULT_SEARCH_DEPTH`] 个候选单元，
    /// 按距离序做包含测试；无候选包含时返回 `None`。
    ///
    /// # Errors
    /// 索引构建或包含测试失败时返回错误。
    pub fn find_element(&mut self, point: &Point2D) -> MeshResult<Option<usize>> {
        self.find_element_with_depth(point, Self::DEFAULT_SEARCH_DEPTH)
    }

    /// 点定位，可调候选深度
    ///
    /// 极度各向异性的网格可以加大 `depth` 换取稳健性。
    ///
    /// # Errors
    /// 索引构建或包含测试失败时返回错误。
    pub fn find_element_with_depth(
        &mut self,
        point: &Point2D,
        depth: usize,
    ) -> MeshResult<Option<usize>> {
        self.build_element_index()?;
        let candidates = match &self.element_index {
            Some(idx) => idx.k_nearest(point, depth),
            None => return Ok(None),
        };
        for position in candidates {
            if self.elements[position].is_inside(point, &self.nodes)? {
                return Ok(Some(position));
            }
        }
        Ok(None)
    }

    // ========================================================================
    // 坐标转换
    // ========================================================================

    /// 通过转换器重投影全部节点
    ///
    /// 任何一点失败时网格坐标保持原状；成功后空间索引失效。
    ///
    /// # Errors
    /// 转换器报错或输出点数不符时返回错误。
    pub fn reproject(&mut self, transform: &dyn CoordinateTransform) -> MeshResult<()> {
        let points: Vec<Point2D> = self.nodes.iter().map(|n| n.position).collect();
        let projected = transform.transform(&points)?;
        if projected.len() != points.len() {
            return Err(MeshError::Geo(GeoError::transform_size_mismatch(
                points.len(),
                projected.len(),
            )));
        }
        for (node, p) in self.nodes.iter_mut().zip(projected) {
            node.position = p;
        }
        self.crs = Crs::with_geographic(transform.target_epsg(), transform.target_is_geographic());
        self.invalidate_indices();
        Ok(())
    }

    /// CPP 正变换（经纬度 -> 平面米）
    pub fn cpp(&mut self, lambda0: f64, phi0: f64) {
        for node in &mut self.nodes {
            node.position = cpp(&node.position, lambda0, phi0);
        }
        self.crs = Crs::with_geographic(self.crs.epsg, false);
        self.invalidate_indices();
    }

    /// CPP 逆变换（平面米 -> 经纬度）
    pub fn inverse_cpp(&mut self, lambda0: f64, phi0: f64) {
        for node in &mut self.nodes {
            node.position = inverse_cpp(&node.position, lambda0, phi0);
        }
        self.crs = Crs::with_geographic(self.crs.epsg, true);
        self.invalidate_indices();
    }

    // ========================================================================
    // 读写
    // ========================================================================

    /// 按文件名推断格式读取
    ///
    /// 读取前整体清空；失败时保持清空状态。
    ///
    /// # Errors
    /// 格式无法推断或文件解析失败时返回错误。
    pub fn read<P: AsRef<Path>>(&mut self, path: P) -> MeshResult<()> {
        let format = crate::io::MeshFormat::from_path(path.as_ref())?;
        self.read_format(path, format)
    }

    /// 按指定格式读取
    ///
    /// # Errors
    /// 文件解析失败时返回错误，此时网格为空。
    pub fn read_format<P: AsRef<Path>>(
        &mut self,
        path: P,
        format: crate::io::MeshFormat,
    ) -> MeshResult<()> {
        self.clear();
        let result = crate::io::read_into(self, path.as_ref(), format);
        if result.is_err() {
            self.clear();
        } else {
            info!(
                "读取网格完成: {} 节点, {} 单元, {} 开边界, {} 陆地边界",
                self.num_nodes(),
                self.num_elements(),
                self.num_open_boundaries(),
                self.num_land_boundaries()
            );
        }
        result
    }

    /// 按文件名推断格式写出
    ///
    /// # Errors
    /// 格式无法推断或写出失败时返回错误。
    pub fn write<P: AsRef<Path>>(&self, path: P) -> MeshResult<()> {
        let format = crate::io::MeshFormat::from_path(path.as_ref())?;
        self.write_format(path, format)
    }

    /// 按指定格式写出
    ///
    /// # Errors
    /// 写出失败时返回错误。
    pub fn write_format<P: AsRef<Path>>(
        &self,
        path: P,
        format: crate::io::MeshFormat,
    ) -> MeshResult<()> {
        crate::io::write_from(self, path.as_ref(), format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x2 正方形剖成 8 个三角形的小网格
    fn sample_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.header = "sample".into();
        let mut id = 1;
        for y in 0..3 {
            for x in 0..3 {
                mesh.nodes
                    .push(Node::new(id, Point2D::new(f64::from(x), f64::from(y)), 1.0));
                id += 1;
            }
        }
        let mut eid = 1;
        for cy in 0..2usize {
            for cx in 0..2usize {
                let sw = cy * 3 + cx;
                let se = sw + 1;
                let nw = sw + 3;
                let ne = nw + 1;
                mesh.elements.push(Element::triangle(eid, sw, se, ne));
                mesh.elements.push(Element::triangle(eid + 1, sw, ne, nw));
                eid += 2;
            }
        }
        mesh.rebuild_numbering().unwrap();
        mesh
    }

    #[test]
    fn test_counts() {
        let mesh = sample_mesh();
        assert_eq!(mesh.num_nodes(), 9);
        assert_eq!(mesh.num_elements(), 8);
        assert_eq!(mesh.max_nodes_per_element(), 3);
    }

    #[test]
    fn test_id_lookup_sequential() {
        let mesh = sample_mesh();
        assert!(mesh.node_ordering_is_sequential());
        assert_eq!(mesh.node_position(1).unwrap(), 0);
        assert_eq!(mesh.node_position(9).unwrap(), 8);
        assert!(matches!(
            mesh.node_position(10),
            Err(MeshError::NodeNotFound { id: 10 })
        ));
    }

    #[test]
    fn test_id_lookup_shuffled() {
        let mut mesh = sample_mesh();
        // 打乱编号
        for (i, node) in mesh.nodes.iter_mut().enumerate() {
            node.id = (i + 1) * 10;
        }
        mesh.rebuild_numbering().unwrap();
        assert!(!mesh.node_ordering_is_sequential());
        assert_eq!(mesh.node_position(10).unwrap(), 0);
        assert_eq!(mesh.node_position(90).unwrap(), 8);
        assert!(mesh.node_position(1).is_err());
        assert_eq!(mesh.node_by_id(30).unwrap().id, 30);
    }

    #[test]
    fn test_find_nearest_node() {
        let mut mesh = sample_mesh();
        let found = mesh.find_nearest_node(&Point2D::new(0.1, 0.1)).unwrap();
        assert_eq!(found, 0);
        let found = mesh.find_nearest_node(&Point2D::new(1.9, 1.9)).unwrap();
        assert_eq!(mesh.nodes()[found].position, Point2D::new(2.0, 2.0));
    }

    #[test]
    fn test_find_element_deterministic() {
        let mut mesh = sample_mesh();
        let p = Point2D::new(0.6, 0.2);
        let first = mesh.find_element(&p).unwrap();
        assert!(first.is_some());
        let second = mesh.find_element(&p).unwrap();
        assert_eq!(first, second);
        // 点确实在返回的单元内
        let pos = first.unwrap();
        assert!(mesh.elements()[pos].is_inside(&p, mesh.nodes()).unwrap());
    }

    #[test]
    fn test_find_element_crossed_vertex_order() {
        let mut mesh = Mesh::new();
        mesh.nodes = vec![
            Node::new(1, Point2D::new(0.0, 0.0), 0.0),
            Node::new(2, Point2D::new(1.0, 0.0), 0.0),
            Node::new(3, Point2D::new(1.0, 1.0), 0.0),
            Node::new(4, Point2D::new(0.0, 1.0), 0.0),
        ];
        // 文件来源的交叉顶点序
        mesh.elements = vec![Element::new(1, vec![0, 1, 3, 2]).unwrap()];
        mesh.rebuild_numbering().unwrap();

        let found = mesh.find_element(&Point2D::new(0.1, 0.5)).unwrap();
        assert_eq!(found, Some(0));
        // 连接表是四条多边形边而非对角线
        assert_eq!(
            mesh.link_table().unwrap(),
            vec![(0, 1), (0, 3), (1, 2), (2, 3)]
        );
        // 存储顶点序保持原样
        assert_eq!(mesh.elements()[0].nodes(), &[0, 1, 3, 2]);
    }

    #[test]
    fn test_find_element_outside_hull() {
        let mut mesh = sample_mesh();
        assert_eq!(mesh.find_element(&Point2D::new(50.0, 50.0)).unwrap(), None);
    }

    #[test]
    fn test_set_z_size_checked() {
        let mut mesh = sample_mesh();
        assert!(mesh.set_z(&vec![2.5; 9]).is_ok());
        assert!(mesh.z().iter().all(|&z| (z - 2.5).abs() < 1e-12));
        assert!(mesh.set_z(&vec![1.0; 3]).is_err());
    }

    #[test]
    fn test_structural_edit_invalidates_lookup() {
        let mut mesh = sample_mesh();
        mesh.delete_node(0).unwrap();
        assert_eq!(mesh.num_nodes(), 8);
        // 编号 1 已删除
        assert!(mesh.node_position(1).is_err());
        assert_eq!(mesh.node_position(2).unwrap(), 0);
    }

    #[test]
    fn test_add_node_duplicate_id_rejected() {
        let mut mesh = sample_mesh();
        let before = mesh.num_nodes();
        let err = mesh
            .add_node(0, Node::new(5, Point2D::new(9.0, 9.0), 0.0))
            .unwrap_err();
        assert!(err.to_string().contains('5'));
        assert_eq!(mesh.num_nodes(), before);
        // 既有编号映射完好
        assert_eq!(mesh.node_position(5).unwrap(), 4);
    }

    #[test]
    fn test_empty_mesh_queries() {
        let mut mesh = Mesh::new();
        assert_eq!(mesh.find_nearest_node(&Point2D::ZERO), None);
        assert_eq!(mesh.find_nearest_element(&Point2D::ZERO).unwrap(), None);
        assert_eq!(mesh.find_element(&Point2D::ZERO).unwrap(), None);
    }

    #[test]
    fn test_cpp_roundtrip_restores_coordinates() {
        let mut mesh = sample_mesh();
        // 以经纬度视角处理
        for node in &mut mesh.nodes {
            node.position = Point2D::new(node.x() * 0.01 - 75.0, node.y() * 0.01 + 35.0);
        }
        let original = mesh.x();
        mesh.cpp(-75.0, 35.0);
        assert!(!mesh.crs.is_geographic);
        mesh.inverse_cpp(-75.0, 35.0);
        assert!(mesh.crs.is_geographic);
        for (a, b) in original.iter().zip(mesh.x()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_connectivity_uses_file_ids() {
        let mesh = sample_mesh();
        let conn = mesh.connectivity().unwrap();
        assert_eq!(conn.len(), 8);
        assert_eq!(conn[0], vec![1, 2, 5]);
    }
}
