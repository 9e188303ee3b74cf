// crates/cm_mesh/src/io/dflow.rs

//! DFlow-FM netCDF 网络文件读写 (*_net.nc)
//!
//! 遵循 UGRID-0.9 约定：
//!
//! - 维度 `nNetNode` / `nNetElem` / `nNetElemMaxNode` / `nNetLink` / `nNetLinkPts`
//! - 变量 `NetNode_x` / `NetNode_y` / `NetNode_z` 为节点坐标与高程
//! - 变量 `NetElemNode` 为单元连接表，短行用填充值补齐
//! - 变量 `NetLink` / `NetLinkType` 为去重后的连接表
//!
//! 该格式不携带节点编号，读取后编号恢复为顺序编号
//! (编号 = 存储位置 + 1)，也不携带边界信息。
//!
//! 需启用 `netcdf` feature；未启用时读写均报错。

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use std::path::Path;

/// 未启用 netcdf 支持时的统一错误
#[cfg(not(feature = "netcdf"))]
fn unavailable() -> MeshError {
    MeshError::external("netcdf", "未启用 netcdf feature，无法读写 DFlow 网络文件")
}

/// 读取文件 (无 netcdf 支持时的占位实现)
#[cfg(not(feature = "netcdf"))]
pub fn read_file(_mesh: &mut Mesh, _path: &Path) -> MeshResult<()> {
    Err(unavailable())
}

/// 写出文件 (无 netcdf 支持时的占位实现)
#[cfg(not(feature = "netcdf"))]
pub fn write_file(_mesh: &Mesh, _path: &Path) -> MeshResult<()> {
    Err(unavailable())
}

#[cfg(feature = "netcdf")]
pub use self::imp::{read_file, write_file};

#[cfg(feature = "netcdf")]
mod imp {
    use super::*;
    use crate::element::Element;
    use crate::node::Node;
    use cm_geo::Point2D;

    const FORMAT: &str = "dflow";
    /// 连接表短行的填充值
    const FILL_VALUE: i32 = -999;

    fn nc_err(message: impl std::fmt::Display) -> MeshError {
        MeshError::external("netcdf", message.to_string())
    }

    fn read_f64_var(file: &netcdf::File, name: &str, path: &Path) -> MeshResult<Vec<f64>> {
        let var = file.variable(name).ok_or_else(|| {
            MeshError::format_error(FORMAT, path.display().to_string(), 0, format!("缺少变量 {name}"))
        })?;
        var.values::<f64, _>(..).map_err(nc_err)
    }

    fn dim_len(file: &netcdf::File, name: &str, path: &Path) -> MeshResult<usize> {
        file.dimension(name)
            .map(|d| d.len())
            .ok_or_else(|| {
                MeshError::format_error(FORMAT, path.display().to_string(), 0, format!("缺少维度 {name}"))
            })
    }

    /// 读取文件
    pub fn read_file(mesh: &mut Mesh, path: &Path) -> MeshResult<()> {
        if !path.exists() {
            return Err(MeshError::Foundation(
                cm_foundation::CmError::file_not_found(path),
            ));
        }
        let file = netcdf::open(path).map_err(nc_err)?;

        let n_nodes = dim_len(&file, "nNetNode", path)?;
        let n_elements = dim_len(&file, "nNetElem", path)?;
        let max_per_elem = dim_len(&file, "nNetElemMaxNode", path)?;

        let xs = read_f64_var(&file, "NetNode_x", path)?;
        let ys = read_f64_var(&file, "NetNode_y", path)?;
        let zs = read_f64_var(&file, "NetNode_z", path)?;
        if xs.len() != n_nodes || ys.len() != n_nodes || zs.len() != n_nodes {
            return Err(MeshError::format_error(
                FORMAT,
                path.display().to_string(),
                0,
                "节点坐标变量长度与 nNetNode 不一致",
            ));
        }

        let elem_var = file.variable("NetElemNode").ok_or_else(|| {
            MeshError::format_error(FORMAT, path.display().to_string(), 0, "缺少变量 NetElemNode")
        })?;
        let conn: Vec<i32> = elem_var.values::<i32, _>(..).map_err(nc_err)?;
        if conn.len() != n_elements * max_per_elem {
            return Err(MeshError::format_error(
                FORMAT,
                path.display().to_string(),
                0,
                "NetElemNode 长度与维度不一致",
            ));
        }
        let start_index = elem_var
            .attribute("start_index")
            .and_then(|a| a.value().ok())
            .and_then(|v| match v {
                netcdf::AttrValue::Int(i) => Some(i64::from(i)),
                netcdf::AttrValue::Short(i) => Some(i64::from(i)),
                netcdf::AttrValue::Longlong(i) => Some(i),
                _ => None,
            })
            .unwrap_or(1);

        // 坐标单位为度即地理坐标
        let geographic = file
            .variable("NetNode_x")
            .and_then(|v| v.attribute("units"))
            .and_then(|a| a.value().ok())
            .map(|v| matches!(v, netcdf::AttrValue::Str(s) if s.starts_with("degrees")))
            .unwrap_or(false);

        let mut nodes = Vec::with_capacity(n_nodes);
        for i in 0..n_nodes {
            nodes.push(Node::new(i + 1, Point2D::new(xs[i], ys[i]), zs[i]));
        }

        let mut elements = Vec::with_capacity(n_elements);
        for e in 0..n_elements {
            let row = &conn[e * max_per_elem..(e + 1) * max_per_elem];
            let mut positions = Vec::with_capacity(max_per_elem);
            for &raw in row {
                if raw == FILL_VALUE {
                    continue;
                }
                if i64::from(raw) < start_index {
                    return Err(MeshError::format_error(
                        FORMAT,
                        path.display().to_string(),
                        0,
                        format!("单元 {} 连接表出现无效节点值 {raw}", e + 1),
                    ));
                }
                let position = (i64::from(raw) - start_index) as usize;
                if position >= n_nodes {
                    return Err(MeshError::format_error(
                        FORMAT,
                        path.display().to_string(),
                        0,
                        format!("单元 {} 引用越界节点 {raw}", e + 1),
                    ));
                }
                positions.push(position);
            }
            elements.push(Element::new(e + 1, positions)?);
        }

        mesh.nodes = nodes;
        mesh.elements = elements;
        mesh.open_boundaries = Vec::new();
        mesh.land_boundaries = Vec::new();
        mesh.crs = if geographic {
            cm_geo::Crs::wgs84()
        } else {
            cm_geo::Crs::with_geographic(0, false)
        };
        mesh.rebuild_numbering()?;
        Ok(())
    }

    /// 写出文件
    ///
    /// 连接表以 1 起始编号写出，短行用填充值补齐。
    pub fn write_file(mesh: &Mesh, path: &Path) -> MeshResult<()> {
        let mut file = netcdf::create(path).map_err(nc_err)?;

        let n_nodes = mesh.num_nodes();
        let n_elements = mesh.num_elements();
        let max_per_elem = mesh.max_nodes_per_element().max(3);
        let links = crate::topology::link_table(mesh.nodes(), mesh.elements())?;

        file.add_dimension("nNetNode", n_nodes).map_err(nc_err)?;
        file.add_dimension("nNetElem", n_elements).map_err(nc_err)?;
        file.add_dimension("nNetElemMaxNode", max_per_elem)
            .map_err(nc_err)?;
        file.add_dimension("nNetLink", links.len()).map_err(nc_err)?;
        file.add_dimension("nNetLinkPts", 2).map_err(nc_err)?;

        file.add_attribute("Conventions", "UGRID-0.9").map_err(nc_err)?;

        let geographic = mesh.crs.is_geographic;
        let (x_units, y_units) = if geographic {
            ("degrees_east", "degrees_north")
        } else {
            ("m", "m")
        };

        let xs: Vec<f64> = mesh.nodes().iter().map(|n| n.x()).collect();
        let ys: Vec<f64> = mesh.nodes().iter().map(|n| n.y()).collect();
        let zs: Vec<f64> = mesh.nodes().iter().map(|n| n.z).collect();

        {
            let mut var = file
                .add_variable::<f64>("NetNode_x", &["nNetNode"])
                .map_err(nc_err)?;
            var.add_attribute("units", x_units).map_err(nc_err)?;
            var.add_attribute("standard_name", "longitude").map_err(nc_err)?;
            var.put_values(&xs, ..).map_err(nc_err)?;
        }
        {
            let mut var = file
                .add_variable::<f64>("NetNode_y", &["nNetNode"])
                .map_err(nc_err)?;
            var.add_attribute("units", y_units).map_err(nc_err)?;
            var.add_attribute("standard_name", "latitude").map_err(nc_err)?;
            var.put_values(&ys, ..).map_err(nc_err)?;
        }
        {
            let mut var = file
                .add_variable::<f64>("NetNode_z", &["nNetNode"])
                .map_err(nc_err)?;
            var.add_attribute("units", "m").map_err(nc_err)?;
            var.add_attribute("standard_name", "sea_floor_depth_below_geoid")
                .map_err(nc_err)?;
            var.put_values(&zs, ..).map_err(nc_err)?;
        }

        let mut conn = vec![FILL_VALUE; n_elements * max_per_elem];
        for (e, element) in mesh.elements().iter().enumerate() {
            for (k, &position) in element.nodes().iter().enumerate() {
                conn[e * max_per_elem + k] = position as i32 + 1;
            }
        }
        {
            let mut var = file
                .add_variable::<i32>("NetElemNode", &["nNetElem", "nNetElemMaxNode"])
                .map_err(nc_err)?;
            var.add_attribute("start_index", 1i32).map_err(nc_err)?;
            var.add_attribute("_FillValue", FILL_VALUE).map_err(nc_err)?;
            var.put_values(&conn, ..).map_err(nc_err)?;
        }

        let mut link_data = Vec::with_capacity(links.len() * 2);
        for &(a, b) in &links {
            link_data.push(a as i32 + 1);
            link_data.push(b as i32 + 1);
        }
        {
            let mut var = file
                .add_variable::<i32>("NetLink", &["nNetLink", "nNetLinkPts"])
                .map_err(nc_err)?;
            var.add_attribute("start_index", 1i32).map_err(nc_err)?;
            var.put_values(&link_data, ..).map_err(nc_err)?;
        }
        {
            // 连接类型 2 = 内部连接
            let link_types = vec![2i32; links.len()];
            let mut var = file
                .add_variable::<i32>("NetLinkType", &["nNetLink"])
                .map_err(nc_err)?;
            var.put_values(&link_types, ..).map_err(nc_err)?;
        }

        {
            let mut var = file.add_variable::<i32>("Mesh2D", &[]).map_err(nc_err)?;
            var.add_attribute("cf_role", "mesh_topology").map_err(nc_err)?;
            var.add_attribute("topology_dimension", 2i32).map_err(nc_err)?;
            var.add_attribute("node_coordinates", "NetNode_x NetNode_y")
                .map_err(nc_err)?;
            var.add_attribute("face_node_connectivity", "NetElemNode")
                .map_err(nc_err)?;
            var.add_attribute("edge_node_connectivity", "NetLink")
                .map_err(nc_err)?;
        }
        {
            let mut var = file.add_variable::<i32>("crs", &[]).map_err(nc_err)?;
            var.add_attribute("EPSG_code", format!("EPSG:{}", mesh.crs.epsg))
                .map_err(nc_err)?;
            var.put_values(&[mesh.crs.epsg as i32], ..).map_err(nc_err)?;
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "netcdf"))]
mod tests {
    use super::*;
    use crate::boundary::OpenBoundary;
    use crate::element::Element;
    use crate::node::Node;
    use cm_geo::Point2D;

    /// 三角形 + 四边形的混合网格
    fn mixed_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.header = "dflow test".to_string();
        mesh.nodes = vec![
            Node::new(1, Point2D::new(0.0, 0.0), 1.0),
            Node::new(2, Point2D::new(1.0, 0.0), 2.0),
            Node::new(3, Point2D::new(1.0, 1.0), 3.0),
            Node::new(4, Point2D::new(0.0, 1.0), 4.0),
            Node::new(5, Point2D::new(2.0, 0.5), 5.0),
        ];
        mesh.elements = vec![
            Element::new(1, vec![0, 1, 2, 3]).unwrap(),
            Element::triangle(2, 1, 4, 2),
        ];
        mesh.rebuild_numbering().unwrap();
        mesh
    }

    #[test]
    fn test_ragged_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed_net.nc");

        let mesh = mixed_mesh();
        write_file(&mesh, &path).unwrap();

        let mut reloaded = Mesh::new();
        read_file(&mut reloaded, &path).unwrap();

        assert_eq!(reloaded.num_nodes(), 5);
        assert_eq!(reloaded.num_elements(), 2);
        assert_eq!(reloaded.elements()[0].n_nodes(), 4);
        assert_eq!(reloaded.elements()[1].n_nodes(), 3);
        assert_eq!(reloaded.elements()[0].nodes(), mesh.elements()[0].nodes());
        assert_eq!(reloaded.elements()[1].nodes(), mesh.elements()[1].nodes());
        for (a, b) in mesh.nodes().iter().zip(reloaded.nodes()) {
            assert!((a.x() - b.x()).abs() < 1e-12);
            assert!((a.y() - b.y()).abs() < 1e-12);
            assert!((a.z - b.z).abs() < 1e-12);
        }
        // 编号恢复为顺序编号
        assert!(reloaded.node_ordering_is_sequential());
        assert!(reloaded.element_ordering_is_sequential());
    }

    #[test]
    fn test_boundaries_not_carried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bnd_net.nc");

        let mut mesh = mixed_mesh();
        mesh.set_open_boundaries(vec![OpenBoundary::new(vec![0, 1])]);
        write_file(&mesh, &path).unwrap();

        let mut reloaded = Mesh::new();
        read_file(&mut reloaded, &path).unwrap();
        assert_eq!(reloaded.num_open_boundaries(), 0);
        assert_eq!(reloaded.num_land_boundaries(), 0);
    }

    #[test]
    fn test_connectivity_below_start_index_rejected() {
        // 填充值以外的越下界节点值是坏数据，不能当作短行跳过
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad_net.nc");
        {
            let mut file = netcdf::create(&path).unwrap();
            file.add_dimension("nNetNode", 3).unwrap();
            file.add_dimension("nNetElem", 1).unwrap();
            file.add_dimension("nNetElemMaxNode", 3).unwrap();
            for name in ["NetNode_x", "NetNode_y", "NetNode_z"] {
                let mut var = file.add_variable::<f64>(name, &["nNetNode"]).unwrap();
                var.put_values(&[0.0, 1.0, 0.5], ..).unwrap();
            }
            let mut var = file
                .add_variable::<i32>("NetElemNode", &["nNetElem", "nNetElemMaxNode"])
                .unwrap();
            var.add_attribute("start_index", 1i32).unwrap();
            var.put_values(&[1, 2, 0], ..).unwrap();
        }

        let mut mesh = Mesh::new();
        let err = read_file(&mut mesh, &path).unwrap_err();
        assert!(err.to_string().contains('0'));
    }

    #[test]
    fn test_missing_file() {
        let mut mesh = Mesh::new();
        assert!(read_file(&mut mesh, Path::new("/no/such/file_net.nc")).is_err());
    }
}
