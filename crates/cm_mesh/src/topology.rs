// crates/cm_mesh/src/topology.rs

//! 拓扑归一化与派生表
//!
//! - 顶点归一化：每个单元按形心极角重排顶点，消除文件来源的顶点序差异
//! - 连接表：全网格去重后的无向边表
//! - 关联表：节点到所含单元的反向索引
//! - 网格尺度：每节点关联单元尺寸的平均值
//!
//! 派生表都以存储位置表达，编号换算留在读写层。

use crate::element::Element;
use crate::error::{MeshError, MeshResult};
use crate::node::Node;
use std::collections::BTreeSet;

/// 归一化全部单元的顶点序（按形心极角逆时针）
///
/// 幂等：重复调用不改变结果。
///
/// # Errors
/// 任一单元引用越界节点位置时返回错误。
pub fn normalize_elements(nodes: &[Node], elements: &mut [Element]) -> MeshResult<()> {
    for element in elements.iter_mut() {
        element.sort_vertices_about_center(nodes)?;
    }
    Ok(())
}

/// 生成去重后的无向连接表
///
/// 每个单元的边取自形心角归一化后的闭合环，交叉存储序
/// 不会把对角线当成边。每条边规范化为 (小位置, 大位置)，
/// 共享边只出现一次；结果按字典序排列，与单元遍历顺序无关。
///
/// # Errors
/// 单元引用越界节点位置时返回错误。
pub fn link_table(nodes: &[Node], elements: &[Element]) -> MeshResult<Vec<(usize, usize)>> {
    let mut links = BTreeSet::new();
    for element in elements {
        let ring = element.sorted_positions(nodes)?;
        let n = ring.len();
        for i in 0..n {
            let (a, b) = (ring[i], ring[(i + 1) % n]);
            let link = if a <= b { (a, b) } else { (b, a) };
            links.insert(link);
        }
    }
    Ok(links.into_iter().collect())
}

/// 生成节点到单元的关联表
///
/// `table[i]` 为包含节点位置 `i` 的全部单元存储位置，升序。
///
/// # Errors
/// 单元引用越界节点位置时返回错误。
pub fn element_table(n_nodes: usize, elements: &[Element]) -> MeshResult<Vec<Vec<usize>>> {
    let mut table = vec![Vec::new(); n_nodes];
    for (elem_pos, element) in elements.iter().enumerate() {
        for &node_pos in element.nodes() {
            let entry = table.get_mut(node_pos).ok_or_else(|| {
                MeshError::invalid_topology(
                    "element_table",
                    format!("单元 {} 引用越界节点位置 {node_pos}", element.id),
                )
            })?;
            entry.push(elem_pos);
        }
    }
    Ok(table)
}

/// 计算每节点的网格尺度
///
/// 节点尺度 = 关联单元尺寸（平均边长）的平均值；孤立节点为 0。
///
/// # Errors
/// 单元引用越界节点位置时返回错误。
pub fn mesh_size(nodes: &[Node], elements: &[Element]) -> MeshResult<Vec<f64>> {
    let sizes: Vec<f64> = elements
        .iter()
        .map(|e| e.element_size(nodes))
        .collect::<MeshResult<_>>()?;
    let table = element_table(nodes.len(), elements)?;
    Ok(table
        .iter()
        .map(|incident| {
            if incident.is_empty() {
                0.0
            } else {
                incident.iter().map(|&e| sizes[e]).sum::<f64>() / incident.len() as f64
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_geo::Point2D;

    /// 两个共享一条边的三角形
    fn two_triangles() -> (Vec<Node>, Vec<Element>) {
        let nodes = vec![
            Node::new(1, Point2D::new(0.0, 0.0), 0.0),
            Node::new(2, Point2D::new(1.0, 0.0), 0.0),
            Node::new(3, Point2D::new(1.0, 1.0), 0.0),
            Node::new(4, Point2D::new(0.0, 1.0), 0.0),
        ];
        let elements = vec![
            Element::triangle(1, 0, 1, 2),
            Element::triangle(2, 0, 2, 3),
        ];
        (nodes, elements)
    }

    #[test]
    fn test_link_table_dedup() {
        let (nodes, elements) = two_triangles();
        let links = link_table(&nodes, &elements).unwrap();
        // 两个三角形共 6 条边，共享边 (0,2) 只计一次
        assert_eq!(links.len(), 5);
        assert!(links.contains(&(0, 2)));
    }

    #[test]
    fn test_link_table_order_independent() {
        let (nodes, mut elements) = two_triangles();
        let a = link_table(&nodes, &elements).unwrap();
        elements.reverse();
        let b = link_table(&nodes, &elements).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_link_table_normalizes_vertex_order() {
        let (nodes, _) = two_triangles();
        // 单位正方形按交叉存储序 (0,1,3,2) 建一个四边形
        let elements = vec![Element::new(1, vec![0, 1, 3, 2]).unwrap()];
        let links = link_table(&nodes, &elements).unwrap();
        // 四条多边形边，不含对角线
        assert_eq!(links, vec![(0, 1), (0, 3), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_element_table() {
        let (nodes, elements) = two_triangles();
        let table = element_table(nodes.len(), &elements).unwrap();
        assert_eq!(table[0], vec![0, 1]); // 节点 0 在两个单元内
        assert_eq!(table[1], vec![0]);
        assert_eq!(table[3], vec![1]);
    }

    #[test]
    fn test_mesh_size_orphan_node_is_zero() {
        let (mut nodes, elements) = two_triangles();
        nodes.push(Node::new(5, Point2D::new(9.0, 9.0), 0.0));
        let sizes = mesh_size(&nodes, &elements).unwrap();
        assert_eq!(sizes.len(), 5);
        assert_eq!(sizes[4], 0.0);
        assert!(sizes[0] > 0.0);
    }

    #[test]
    fn test_normalize_idempotent() {
        let (nodes, mut elements) = two_triangles();
        normalize_elements(&nodes, &mut elements).unwrap();
        let snapshot: Vec<Vec<usize>> = elements.iter().map(|e| e.nodes().to_vec()).collect();
        normalize_elements(&nodes, &mut elements).unwrap();
        let again: Vec<Vec<usize>> = elements.iter().map(|e| e.nodes().to_vec()).collect();
        assert_eq!(snapshot, again);
    }

    #[test]
    fn test_element_table_out_of_bounds() {
        let elements = vec![Element::triangle(1, 0, 1, 9)];
        assert!(element_table(3, &elements).is_err());
    }
}
