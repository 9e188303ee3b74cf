// crates/cm_mesh/src/element.rs

//! 单元记录
//!
//! 单元存储节点的**存储位置**而非文件编号，几何计算只需一次
//! 切片索引。文件编号与存储位置的换算发生在读写层。

use crate::error::{MeshError, MeshResult};
use crate::node::Node;
use cm_geo::Point2D;
use serde::{Deserialize, Serialize};

/// 网格单元（三角形或四边形）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// 文件中的单元编号（正整数，允许稀疏）
    pub id: usize,
    /// 节点存储位置，长度 3 或 4
    nodes: Vec<usize>,
}

impl Element {
    /// 创建单元
    ///
    /// # Errors
    /// 顶点数不是 3 或 4 时返回错误。
    pub fn new(id: usize, nodes: Vec<usize>) -> MeshResult<Self> {
        if nodes.len() != 3 && nodes.len() != 4 {
            return Err(MeshError::invalid_arity(nodes.len()));
        }
        Ok(Self { id, nodes })
    }

    /// 创建三角形单元
    #[must_use]
    pub fn triangle(id: usize, n0: usize, n1: usize, n2: usize) -> Self {
        Self {
            id,
            nodes: vec![n0, n1, n2],
        }
    }

    /// 创建四边形单元
    #[must_use]
    pub fn quad(id: usize, n0: usize, n1: usize, n2: usize, n3: usize) -> Self {
        Self {
            id,
            nodes: vec![n0, n1, n2, n3],
        }
    }

    /// 顶点数（3 或 4）
    #[inline]
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// 节点存储位置切片
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// 取顶点坐标
    fn vertex(&self, i: usize, nodes: &[Node]) -> MeshResult<Point2D> {
        let pos = self.nodes[i];
        nodes
            .get(pos)
            .map(|n| n.position)
            .ok_or_else(|| {
                MeshError::invalid_topology(
                    "element_vertex",
                    format!("单元 {} 引用越界节点位置 {pos}", self.id),
                )
            })
    }

    /// 收集全部顶点坐标
    ///
    /// # Errors
    /// 节点位置越界时返回错误。
    pub fn vertices(&self, nodes: &[Node]) -> MeshResult<Vec<Point2D>> {
        (0..self.nodes.len()).map(|i| self.vertex(i, nodes)).collect()
    }

    /// 单元形心
    ///
    /// # Errors
    /// 节点位置越界时返回错误。
    pub fn centroid(&self, nodes: &[Node]) -> MeshResult<Point2D> {
        let vertices = self.vertices(nodes)?;
        let n = vertices.len() as f64;
        let sum = vertices
            .iter()
            .fold(Point2D::ZERO, |acc, p| acc + *p);
        Ok(sum.scale(1.0 / n))
    }

    /// 形心角升序的顶点位置副本（逆时针环）
    ///
    /// 不修改存储顶点序。文件来源的顶点序不保证一致，
    /// 几何运算（边提取、包含测试、面要素环）都基于该副本。
    ///
    /// # Errors
    /// 节点位置越界时返回错误。
    pub fn sorted_positions(&self, nodes: &[Node]) -> MeshResult<Vec<usize>> {
        let center = self.centroid(nodes)?;
        let mut keyed: Vec<(f64, usize)> = Vec::with_capacity(self.nodes.len());
        for &pos in &self.nodes {
            let p = nodes
                .get(pos)
                .map(|n| n.position)
                .ok_or_else(|| {
                    MeshError::invalid_topology(
                        "sort_vertices",
                        format!("单元 {} 引用越界节点位置 {pos}", self.id),
                    )
                })?;
            let angle = (p.y - center.y).atan2(p.x - center.x);
            keyed.push((angle, pos));
        }
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(keyed.into_iter().map(|(_, pos)| pos).collect())
    }

    /// 形心角升序的顶点坐标副本
    ///
    /// # Errors
    /// 节点位置越界时返回错误。
    pub fn sorted_vertices(&self, nodes: &[Node]) -> MeshResult<Vec<Point2D>> {
        self.sorted_positions(nodes)?
            .into_iter()
            .map(|pos| {
                nodes.get(pos).map(|n| n.position).ok_or_else(|| {
                    MeshError::invalid_topology(
                        "sort_vertices",
                        format!("单元 {} 引用越界节点位置 {pos}", self.id),
                    )
                })
            })
            .collect()
    }

    /// 按形心角排序顶点（逆时针），就地修改存储序
    ///
    /// 排序是幂等的：已有序的单元重排后顶点序不变。
    ///
    /// # Errors
    /// 节点位置越界时返回错误。
    pub fn sort_vertices_about_center(&mut self, nodes: &[Node]) -> MeshResult<()> {
        self.nodes = self.sorted_positions(nodes)?;
        Ok(())
    }

    /// 单元的边（按顶点序的闭合环）
    ///
    /// 返回的每条边为 (起点位置, 终点位置)。
    #[must_use]
    pub fn legs(&self) -> Vec<(usize, usize)> {
        let n = self.nodes.len();
        (0..n).map(|i| (self.nodes[i], self.nodes[(i + 1) % n])).collect()
    }

    /// 单元尺寸：各边长的平均值
    ///
    /// 边取自形心角归一化后的闭合环。
    ///
    /// # Errors
    /// 节点位置越界时返回错误。
    pub fn element_size(&self, nodes: &[Node]) -> MeshResult<f64> {
        let vertices = self.sorted_vertices(nodes)?;
        let n = vertices.len();
        let total: f64 = (0..n)
            .map(|i| vertices[i].distance_to(&vertices[(i + 1) % n]))
            .sum();
        Ok(total / n as f64)
    }

    /// 射线法判断点是否在单元内
    ///
    /// 先按形心角归一化顶点序再做射线法，交叉存储序的单元
    /// 不会漏判内点。边界上的点判定依赖浮点比较，不保证一致。
    ///
    /// # Errors
    /// 节点位置越界时返回错误。
    pub fn is_inside(&self, point: &Point2D, nodes: &[Node]) -> MeshResult<bool> {
        let vertices = self.sorted_vertices(nodes)?;
        let n = vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = &vertices[i];
            let vj = &vertices[j];
            if ((vi.y > point.y) != (vj.y > point.y))
                && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
            {
                inside = !inside;
            }
            j = i;
        }
        Ok(inside)
    }

    /// 按原生 ASCII 格式输出单条单元记录: `id n id1 id2 id3 [id4]`
    ///
    /// # Errors
    /// 节点位置越界时返回错误。
    pub fn to_adcirc_record(&self, nodes: &[Node]) -> MeshResult<String> {
        let mut record = format!("{:11} {:3}", self.id, self.nodes.len());
        for &pos in &self.nodes {
            let node = nodes.get(pos).ok_or_else(|| {
                MeshError::invalid_topology(
                    "write_element",
                    format!("单元 {} 引用越界节点位置 {pos}", self.id),
                )
            })?;
            record.push_str(&format!(" {:11}", node.id));
        }
        Ok(record)
    }

    /// 按 2dm 卡输出单条单元记录（E3T 或 E4Q，材料号固定为 1）
    ///
    /// # Errors
    /// 节点位置越界时返回错误。
    pub fn to_2dm_record(&self, nodes: &[Node]) -> MeshResult<String> {
        let card = if self.nodes.len() == 3 { "E3T" } else { "E4Q" };
        let mut record = format!("{card} {}", self.id);
        for &pos in &self.nodes {
            let node = nodes.get(pos).ok_or_else(|| {
                MeshError::invalid_topology(
                    "write_element",
                    format!("单元 {} 引用越界节点位置 {pos}", self.id),
                )
            })?;
            record.push_str(&format!(" {}", node.id));
        }
        record.push_str(" 1");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_nodes() -> Vec<Node> {
        vec![
            Node::new(1, Point2D::new(0.0, 0.0), 0.0),
            Node::new(2, Point2D::new(1.0, 0.0), 0.0),
            Node::new(3, Point2D::new(1.0, 1.0), 0.0),
            Node::new(4, Point2D::new(0.0, 1.0), 0.0),
        ]
    }

    #[test]
    fn test_arity_enforced() {
        assert!(Element::new(1, vec![0, 1]).is_err());
        assert!(Element::new(1, vec![0, 1, 2]).is_ok());
        assert!(Element::new(1, vec![0, 1, 2, 3]).is_ok());
        assert!(Element::new(1, vec![0, 1, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_centroid() {
        let nodes = square_nodes();
        let elem = Element::quad(1, 0, 1, 2, 3);
        let c = elem.centroid(&nodes).unwrap();
        assert!((c.x - 0.5).abs() < 1e-12);
        assert!((c.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sort_vertices_idempotent() {
        let nodes = square_nodes();
        // 乱序顶点
        let mut elem = Element::quad(1, 2, 0, 3, 1);
        elem.sort_vertices_about_center(&nodes).unwrap();
        let first = elem.nodes().to_vec();
        elem.sort_vertices_about_center(&nodes).unwrap();
        assert_eq!(elem.nodes(), first.as_slice());
    }

    #[test]
    fn test_sorted_vertices_are_ccw() {
        let nodes = square_nodes();
        let mut elem = Element::quad(1, 2, 0, 3, 1);
        elem.sort_vertices_about_center(&nodes).unwrap();
        // 逆时针多边形的鞋带公式面积为正
        let vertices = elem.vertices(&nodes).unwrap();
        let n = vertices.len();
        let area: f64 = (0..n)
            .map(|i| {
                let a = vertices[i];
                let b = vertices[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum();
        assert!(area > 0.0);
    }

    #[test]
    fn test_is_inside() {
        let nodes = square_nodes();
        let elem = Element::quad(1, 0, 1, 2, 3);
        assert!(elem.is_inside(&Point2D::new(0.5, 0.5), &nodes).unwrap());
        assert!(!elem.is_inside(&Point2D::new(1.5, 0.5), &nodes).unwrap());
    }

    #[test]
    fn test_is_inside_crossed_vertex_order() {
        let nodes = square_nodes();
        // 交叉存储序 (0,1,3,2)：几何运算仍按归一化环判定
        let elem = Element::quad(1, 0, 1, 3, 2);
        assert!(elem.is_inside(&Point2D::new(0.1, 0.5), &nodes).unwrap());
        assert!(elem.is_inside(&Point2D::new(0.5, 0.5), &nodes).unwrap());
        assert!(!elem.is_inside(&Point2D::new(1.5, 0.5), &nodes).unwrap());
        // 存储顶点序保持原样
        assert_eq!(elem.nodes(), &[0, 1, 3, 2]);
    }

    #[test]
    fn test_sorted_positions_does_not_mutate() {
        let nodes = square_nodes();
        let elem = Element::quad(1, 2, 0, 3, 1);
        let ring = elem.sorted_positions(&nodes).unwrap();
        assert_eq!(ring.len(), 4);
        assert_eq!(elem.nodes(), &[2, 0, 3, 1]);
        // 副本与就地排序结果一致
        let mut sorted = elem.clone();
        sorted.sort_vertices_about_center(&nodes).unwrap();
        assert_eq!(ring, sorted.nodes());
    }

    #[test]
    fn test_element_size() {
        let nodes = square_nodes();
        let elem = Element::quad(1, 0, 1, 2, 3);
        // 单位正方形各边长 1
        assert!((elem.element_size(&nodes).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_legs_close_the_ring() {
        let elem = Element::triangle(1, 0, 1, 2);
        let legs = elem.legs();
        assert_eq!(legs, vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn test_adcirc_record() {
        let nodes = square_nodes();
        let elem = Element::triangle(5, 0, 1, 2);
        let record = elem.to_adcirc_record(&nodes).unwrap();
        let tokens: Vec<&str> = record.split_whitespace().collect();
        assert_eq!(tokens, vec!["5", "3", "1", "2", "3"]);
    }

    #[test]
    fn test_2dm_record_cards() {
        let nodes = square_nodes();
        let tri = Element::triangle(1, 0, 1, 2);
        assert!(tri.to_2dm_record(&nodes).unwrap().starts_with("E3T"));
        let quad = Element::quad(2, 0, 1, 2, 3);
        assert!(quad.to_2dm_record(&nodes).unwrap().starts_with("E4Q"));
    }

    #[test]
    fn test_out_of_bounds_node_rejected() {
        let nodes = square_nodes();
        let elem = Element::triangle(1, 0, 1, 99);
        assert!(elem.centroid(&nodes).is_err());
    }
}
