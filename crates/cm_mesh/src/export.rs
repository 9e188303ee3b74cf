// crates/cm_mesh/src/export.rs

//! 矢量要素导出
//!
//! 把网格的三类几何要素导出到任意矢量汇：
//!
//! - 节点 → 点要素 (编号、坐标、高程)
//! - 连接表 → 线要素 (两端节点编号)
//! - 单元 → 面要素 (编号、各顶点编号与高程、平均高程)
//!
//! 记录模式固定四列顶点，三角形第四列编号补 -1、高程补 -9999。
//! 内置 GeoJSON 汇；其他格式实现 [`VectorSink`] 即可接入。

use crate::error::MeshResult;
use crate::mesh::Mesh;
use crate::topology;
use cm_geo::Point2D;
use serde::Serialize;

/// 三角形单元第四列的编号占位
pub const PAD_ID: i64 = -1;
/// 三角形单元第四列的高程占位
pub const PAD_Z: f64 = -9999.0;

/// 节点点要素
#[derive(Debug, Clone, Serialize)]
pub struct NodeRecord {
    /// 节点编号
    pub id: usize,
    /// 坐标
    pub point: Point2D,
    /// 高程
    pub z: f64,
}

/// 连接线要素
#[derive(Debug, Clone, Serialize)]
pub struct LinkRecord {
    /// 两端节点编号
    pub node_ids: [usize; 2],
    /// 两端坐标
    pub points: [Point2D; 2],
}

/// 单元面要素
#[derive(Debug, Clone, Serialize)]
pub struct ElementRecord {
    /// 单元编号
    pub id: usize,
    /// 顶点编号，三角形第四列为 [`PAD_ID`]
    pub node_ids: [i64; 4],
    /// 顶点高程，三角形第四列为 [`PAD_Z`]
    pub z: [f64; 4],
    /// 顶点高程均值
    pub zmean: f64,
    /// 闭合外环坐标（首尾重复）
    pub ring: Vec<Point2D>,
}

/// 矢量汇
///
/// 三个写入方法各自接收一整批要素；实现负责落盘或缓存。
pub trait VectorSink {
    /// 写入点要素
    fn write_points(&mut self, records: &[NodeRecord]) -> MeshResult<()>;
    /// 写入线要素
    fn write_lines(&mut self, records: &[LinkRecord]) -> MeshResult<()>;
    /// 写入面要素
    fn write_polygons(&mut self, records: &[ElementRecord]) -> MeshResult<()>;
}

/// 生成节点要素记录
#[must_use]
pub fn node_records(mesh: &Mesh) -> Vec<NodeRecord> {
    mesh.nodes()
        .iter()
        .map(|n| NodeRecord {
            id: n.id,
            point: n.position,
            z: n.z,
        })
        .collect()
}

/// 生成连接要素记录
///
/// # Errors
/// 连接表引用越界节点位置时返回错误。
pub fn link_records(mesh: &Mesh) -> MeshResult<Vec<LinkRecord>> {
    let links = topology::link_table(mesh.nodes(), mesh.elements())?;
    let mut records = Vec::with_capacity(links.len());
    for (a, b) in links {
        let na = mesh.node(a)?;
        let nb = mesh.node(b)?;
        records.push(LinkRecord {
            node_ids: [na.id, nb.id],
            points: [na.position, nb.position],
        });
    }
    Ok(records)
}

/// 生成单元要素记录
///
/// 顶点按质心极角整理成简单外环，存储顺序不受影响。
///
/// # Errors
/// 单元引用越界节点位置时返回错误。
pub fn element_records(mesh: &Mesh) -> MeshResult<Vec<ElementRecord>> {
    let mut records = Vec::with_capacity(mesh.num_elements());
    for element in mesh.elements() {
        let mut node_ids = [PAD_ID; 4];
        let mut z = [PAD_Z; 4];
        let mut ring = Vec::with_capacity(element.n_nodes() + 1);
        let mut z_sum = 0.0;
        let positions = element.sorted_positions(mesh.nodes())?;
        for (k, &position) in positions.iter().enumerate() {
            let node = mesh.node(position)?;
            node_ids[k] = node.id as i64;
            z[k] = node.z;
            z_sum += node.z;
            ring.push(node.position);
        }
        if let Some(&first) = ring.first() {
            ring.push(first);
        }
        records.push(ElementRecord {
            id: element.id,
            node_ids,
            z,
            zmean: z_sum / element.n_nodes() as f64,
            ring,
        });
    }
    Ok(records)
}

/// 导出节点点要素
pub fn export_nodes<S: VectorSink + ?Sized>(mesh: &Mesh, sink: &mut S) -> MeshResult<()> {
    sink.write_points(&node_records(mesh))
}

/// 导出连接线要素
pub fn export_connectivity<S: VectorSink + ?Sized>(mesh: &Mesh, sink: &mut S) -> MeshResult<()> {
    sink.write_lines(&link_records(mesh)?)
}

/// 导出单元面要素
pub fn export_elements<S: VectorSink + ?Sized>(mesh: &Mesh, sink: &mut S) -> MeshResult<()> {
    sink.write_polygons(&element_records(mesh)?)
}

// ============================================================
// GeoJSON 汇
// ============================================================

/// GeoJSON FeatureCollection 汇
///
/// 要素累积在内存，[`GeoJsonSink::finish`] 一次性序列化写出。
pub struct GeoJsonSink<W> {
    writer: W,
    features: Vec<serde_json::Value>,
}

impl<W: std::io::Write> GeoJsonSink<W> {
    /// 新建汇
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            features: Vec::new(),
        }
    }

    /// 序列化为 FeatureCollection 并写出
    ///
    /// # Errors
    /// 序列化或 IO 失败时返回错误。
    pub fn finish(mut self) -> MeshResult<()> {
        let collection = serde_json::json!({
            "type": "FeatureCollection",
            "features": self.features,
        });
        serde_json::to_writer(&mut self.writer, &collection).map_err(|e| {
            crate::error::MeshError::Foundation(cm_foundation::CmError::serialization(
                e.to_string(),
            ))
        })?;
        Ok(())
    }
}

impl<W: std::io::Write> VectorSink for GeoJsonSink<W> {
    fn write_points(&mut self, records: &[NodeRecord]) -> MeshResult<()> {
        for record in records {
            self.features.push(serde_json::json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [record.point.x, record.point.y],
                },
                "properties": {
                    "id": record.id,
                    "z": record.z,
                },
            }));
        }
        Ok(())
    }

    fn write_lines(&mut self, records: &[LinkRecord]) -> MeshResult<()> {
        for record in records {
            self.features.push(serde_json::json!({
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": [
                        [record.points[0].x, record.points[0].y],
                        [record.points[1].x, record.points[1].y],
                    ],
                },
                "properties": {
                    "node1": record.node_ids[0],
                    "node2": record.node_ids[1],
                },
            }));
        }
        Ok(())
    }

    fn write_polygons(&mut self, records: &[ElementRecord]) -> MeshResult<()> {
        for record in records {
            let ring: Vec<[f64; 2]> = record.ring.iter().map(|p| [p.x, p.y]).collect();
            self.features.push(serde_json::json!({
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [ring],
                },
                "properties": {
                    "id": record.id,
                    "node1": record.node_ids[0],
                    "node2": record.node_ids[1],
                    "node3": record.node_ids[2],
                    "node4": record.node_ids[3],
                    "zmean": record.zmean,
                },
            }));
        }
        Ok(())
    }
}
