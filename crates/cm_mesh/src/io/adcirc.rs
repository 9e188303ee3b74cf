// crates/cm_mesh/src/io/adcirc.rs

//! 原生 ASCII 格式读写 (.14 / .grd)
//!
//! 文件布局：
//!
//! ```text
//! 描述头
//! 单元数 节点数
//! <节点块: id x y z>
//! <单元块: id 顶点数 节点编号...>
//! 开边界数
//! 开边界节点总数
//! <每条开边界: 节点数, 然后每行一个节点编号>
//! 陆地边界数
//! 陆地边界节点总数
//! <每条陆地边界: 节点数 类型码, 然后类型码决定的每节点列>
//! ```
//!
//! 节点/单元编号的连续性在解析时判定；乱序编号合法，
//! 单元通过编号映射换算为存储位置。

use crate::boundary::{LandBoundary, OpenBoundary};
use crate::element::Element;
use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use crate::node::{parse_field, Node};
use crate::numbering::Numbering;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

const FORMAT: &str = "adcirc";

/// 带行号的行读取器
struct LineReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    file: String,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R, file: &str) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            file: file.to_string(),
        }
    }

    /// 取下一行，EOF 视为格式错误
    fn next_line(&mut self) -> MeshResult<String> {
        self.line_no += 1;
        match self.lines.next() {
            Some(Ok(line)) => Ok(line),
            Some(Err(e)) => Err(MeshError::format_error(
                FORMAT,
                &self.file,
                self.line_no,
                format!("读取失败: {e}"),
            )),
            None => Err(MeshError::format_error(
                FORMAT,
                &self.file,
                self.line_no,
                "文件提前结束",
            )),
        }
    }
}

/// 读取文件
pub fn read_file(mesh: &mut Mesh, path: &Path) -> MeshResult<()> {
    let file = File::open(path).map_err(|_| {
        MeshError::Foundation(cm_foundation::CmError::file_not_found(path))
    })?;
    let label = path.display().to_string();
    read_from(mesh, BufReader::new(file), &label)
}

/// 从 reader 读取
///
/// # Errors
/// 任何一条记录畸形即中止并返回错误。
pub fn read_from<R: BufRead>(mesh: &mut Mesh, reader: R, file: &str) -> MeshResult<()> {
    let mut lines = LineReader::new(reader, file);

    mesh.header = lines.next_line()?.trim_end().to_string();

    // 第二行: 单元数 节点数
    let counts = lines.next_line()?;
    let mut tokens = counts.split_whitespace();
    let num_elements: usize = parse_field(tokens.next(), "单元数", file, lines.line_no)?;
    let num_nodes: usize = parse_field(tokens.next(), "节点数", file, lines.line_no)?;

    // 节点块
    let mut nodes = Vec::with_capacity(num_nodes);
    for _ in 0..num_nodes {
        let line = lines.next_line()?;
        nodes.push(Node::from_adcirc_record(&line, file, lines.line_no)?);
    }
    let node_ids: Vec<usize> = nodes.iter().map(|n| n.id).collect();
    let node_numbering = Numbering::from_ids(&node_ids)?;

    // 单元块
    let mut elements = Vec::with_capacity(num_elements);
    for _ in 0..num_elements {
        let line = lines.next_line()?;
        let mut tokens = line.split_whitespace();
        let id: usize = parse_field(tokens.next(), "单元编号", file, lines.line_no)?;
        let arity: usize = parse_field(tokens.next(), "顶点数", file, lines.line_no)?;
        if arity != 3 && arity != 4 {
            return Err(MeshError::format_error(
                FORMAT,
                file,
                lines.line_no,
                format!("单元 {id} 顶点数无效: {arity}"),
            ));
        }
        let mut positions = Vec::with_capacity(arity);
        for _ in 0..arity {
            let node_id: usize = parse_field(tokens.next(), "节点编号", file, lines.line_no)?;
            let position = node_numbering.position_of(node_id, nodes.len()).ok_or_else(|| {
                MeshError::format_error(
                    FORMAT,
                    file,
                    lines.line_no,
                    format!("单元 {id} 引用不存在的节点编号 {node_id}"),
                )
            })?;
            positions.push(position);
        }
        elements.push(Element::new(id, positions)?);
    }

    // 开边界块
    let open_count_line = lines.next_line()?;
    let num_open: usize = parse_field(
        open_count_line.split_whitespace().next(),
        "开边界数",
        file,
        lines.line_no,
    )?;
    // 总节点数行仅作布局占位，计数以边界头行为准
    let _ = lines.next_line()?;
    let mut open_boundaries = Vec::with_capacity(num_open);
    for i in 0..num_open {
        let header = lines.next_line()?;
        let count: usize = parse_field(
            header.split_whitespace().next(),
            "开边界节点数",
            file,
            lines.line_no,
        )?;
        let mut boundary_nodes = Vec::with_capacity(count);
        for _ in 0..count {
            let line = lines.next_line()?;
            let node_id: usize =
                parse_field(line.split_whitespace().next(), "节点编号", file, lines.line_no)?;
            let position = node_numbering.position_of(node_id, nodes.len()).ok_or_else(|| {
                MeshError::invalid_boundary(
                    "open",
                    i,
                    format!("引用不存在的节点编号 {node_id}"),
                )
            })?;
            boundary_nodes.push(position);
        }
        open_boundaries.push(OpenBoundary::new(boundary_nodes));
    }

    // 陆地边界块
    let land_count_line = lines.next_line()?;
    let num_land: usize = parse_field(
        land_count_line.split_whitespace().next(),
        "陆地边界数",
        file,
        lines.line_no,
    )?;
    let _ = lines.next_line()?;
    let mut land_boundaries = Vec::with_capacity(num_land);
    for i in 0..num_land {
        let header = lines.next_line()?;
        let mut tokens = header.split_whitespace();
        let count: usize = parse_field(tokens.next(), "陆地边界节点数", file, lines.line_no)?;
        let code: u32 = parse_field(tokens.next(), "类型码", file, lines.line_no)?;
        let mut boundary = LandBoundary::new(code);
        let lookup = |node_id: usize, line_no: usize| -> MeshResult<usize> {
            node_numbering.position_of(node_id, nodes.len()).ok_or_else(|| {
                MeshError::format_error(
                    FORMAT,
                    file,
                    line_no,
                    format!("陆地边界 {i} 引用不存在的节点编号 {node_id}"),
                )
            })
        };
        for _ in 0..count {
            let line = lines.next_line()?;
            let line_no = lines.line_no;
            let mut tokens = line.split_whitespace();
            let node_id: usize = parse_field(tokens.next(), "节点编号", file, line_no)?;
            let node = lookup(node_id, line_no)?;
            if boundary.is_single_weir() {
                let crest: f64 = parse_field(tokens.next(), "堰顶高程", file, line_no)?;
                let sup: f64 = parse_field(tokens.next(), "超临界系数", file, line_no)?;
                boundary.push_single_weir(node, crest, sup)?;
            } else if boundary.is_paired_weir() {
                let paired_id: usize = parse_field(tokens.next(), "对侧节点", file, line_no)?;
                let paired = lookup(paired_id, line_no)?;
                let crest: f64 = parse_field(tokens.next(), "堰顶高程", file, line_no)?;
                let sub: f64 = parse_field(tokens.next(), "亚临界系数", file, line_no)?;
                let sup: f64 = parse_field(tokens.next(), "超临界系数", file, line_no)?;
                boundary.push_paired_weir(node, paired, crest, sub, sup)?;
            } else if boundary.is_pipe() {
                let paired_id: usize = parse_field(tokens.next(), "对侧节点", file, line_no)?;
                let paired = lookup(paired_id, line_no)?;
                let crest: f64 = parse_field(tokens.next(), "堰顶高程", file, line_no)?;
                let sub: f64 = parse_field(tokens.next(), "亚临界系数", file, line_no)?;
                let sup: f64 = parse_field(tokens.next(), "超临界系数", file, line_no)?;
                let height: f64 = parse_field(tokens.next(), "涵管高程", file, line_no)?;
                let coef: f64 = parse_field(tokens.next(), "涵管系数", file, line_no)?;
                let diam: f64 = parse_field(tokens.next(), "涵管直径", file, line_no)?;
                boundary.push_pipe(node, paired, crest, sub, sup, height, coef, diam)?;
            } else {
                boundary.push_simple(node)?;
            }
        }
        land_boundaries.push(boundary);
    }

    mesh.nodes = nodes;
    mesh.elements = elements;
    mesh.open_boundaries = open_boundaries;
    mesh.land_boundaries = land_boundaries;
    mesh.rebuild_numbering()?;
    Ok(())
}

/// 写出文件
pub fn write_file(mesh: &Mesh, path: &Path) -> MeshResult<()> {
    let file = File::create(path).map_err(|e| {
        MeshError::Foundation(cm_foundation::CmError::io_with_source(
            format!("无法创建 {}", path.display()),
            e,
        ))
    })?;
    write_to(mesh, &mut BufWriter::new(file))
}

/// 写入 writer
///
/// # Errors
/// IO 失败或记录引用越界节点时返回错误。
pub fn write_to<W: Write>(mesh: &Mesh, writer: &mut W) -> MeshResult<()> {
    let geographic = mesh.crs.is_geographic;
    writeln!(writer, "{}", mesh.header)?;
    writeln!(writer, "{:11} {:11}", mesh.num_elements(), mesh.num_nodes())?;
    for node in mesh.nodes() {
        writeln!(writer, "{}", node.to_adcirc_record(geographic))?;
    }
    for element in mesh.elements() {
        writeln!(writer, "{}", element.to_adcirc_record(mesh.nodes())?)?;
    }

    writeln!(writer, "{:11}", mesh.num_open_boundaries())?;
    writeln!(writer, "{:11}", mesh.total_open_boundary_nodes())?;
    for boundary in mesh.open_boundaries() {
        writeln!(writer, "{:11}", boundary.len())?;
        for &position in &boundary.nodes {
            let node = mesh.node(position)?;
            writeln!(writer, "{:11}", node.id)?;
        }
    }

    writeln!(writer, "{:11}", mesh.num_land_boundaries())?;
    writeln!(writer, "{:11}", mesh.total_land_boundary_nodes())?;
    for boundary in mesh.land_boundaries() {
        writeln!(writer, "{:11} {:11}", boundary.len(), boundary.code)?;
        for record in boundary.to_adcirc_records(mesh.nodes())? {
            writeln!(writer, "{record}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_geo::Point2D;
    use std::io::Cursor;

    const SIMPLE_GRD: &str = "\
two triangles
          2           4
          1   0.0   0.0   1.0
          2   1.0   0.0   2.0
          3   1.0   1.0   3.0
          4   0.0   1.0   4.0
          1   3           1           2           3
          2   3           1           3           4
          1
          2
          2
          2
          4
          1
          2
          2   20
          2
          3
";

    #[test]
    fn test_read_simple() {
        let mut mesh = Mesh::new();
        read_from(&mut mesh, Cursor::new(SIMPLE_GRD), "test.grd").unwrap();

        assert_eq!(mesh.header, "two triangles");
        assert_eq!(mesh.num_nodes(), 4);
        assert_eq!(mesh.num_elements(), 2);
        assert_eq!(mesh.num_open_boundaries(), 1);
        assert_eq!(mesh.num_land_boundaries(), 1);
        assert_eq!(mesh.total_open_boundary_nodes(), 2);
        assert_eq!(mesh.total_land_boundary_nodes(), 2);
        assert!(mesh.node_ordering_is_sequential());
        assert_eq!(mesh.land_boundaries()[0].code, 20);
    }

    #[test]
    fn test_duplicate_node_ids_rejected() {
        let input = "\
duplicate ids
          1           3
          1   0.0   0.0   1.0
          2   1.0   0.0   2.0
          2   0.5   1.0   3.0
          1   3           1           2           2
          0
          0
          0
          0
";
        let mut mesh = Mesh::new();
        let err = read_from(&mut mesh, Cursor::new(input), "dup.grd").unwrap_err();
        assert!(err.to_string().contains('2'));
    }

    #[test]
    fn test_roundtrip() {
        let mut mesh = Mesh::new();
        read_from(&mut mesh, Cursor::new(SIMPLE_GRD), "test.grd").unwrap();

        let mut buffer = Vec::new();
        write_to(&mesh, &mut buffer).unwrap();

        let mut reloaded = Mesh::new();
        read_from(&mut reloaded, Cursor::new(buffer), "roundtrip.grd").unwrap();

        assert_eq!(reloaded.header, mesh.header);
        assert_eq!(reloaded.num_nodes(), mesh.num_nodes());
        assert_eq!(reloaded.num_elements(), mesh.num_elements());
        assert_eq!(reloaded.connectivity().unwrap(), mesh.connectivity().unwrap());
        for (a, b) in mesh.nodes().iter().zip(reloaded.nodes()) {
            assert_eq!(a.id, b.id);
            assert!((a.x() - b.x()).abs() < 1e-9);
            assert!((a.y() - b.y()).abs() < 1e-9);
            assert!((a.z - b.z).abs() < 1e-9);
        }
        assert_eq!(reloaded.open_boundaries(), mesh.open_boundaries());
        assert_eq!(reloaded.land_boundaries(), mesh.land_boundaries());
    }

    #[test]
    fn test_sparse_node_ids() {
        let input = "\
sparse ids
          1           3
         10   0.0   0.0   1.0
         20   1.0   0.0   2.0
         30   0.5   1.0   3.0
          7   3          10          20          30
          0
          0
          0
          0
";
        let mut mesh = Mesh::new();
        read_from(&mut mesh, Cursor::new(input), "sparse.grd").unwrap();
        assert!(!mesh.node_ordering_is_sequential());
        assert_eq!(mesh.node_position(20).unwrap(), 1);
        assert_eq!(mesh.elements()[0].nodes(), &[0, 1, 2]);
        assert_eq!(mesh.element_position(7).unwrap(), 0);
    }

    #[test]
    fn test_unknown_node_reference_rejected() {
        let input = "\
bad element
          1           3
          1   0.0   0.0   1.0
          2   1.0   0.0   2.0
          3   0.5   1.0   3.0
          1   3           1           2           9
          0
          0
          0
          0
";
        let mut mesh = Mesh::new();
        let err = read_from(&mut mesh, Cursor::new(input), "bad.grd").unwrap_err();
        assert!(err.to_string().contains('9'));
    }

    #[test]
    fn test_truncated_file_rejected() {
        let input = "header\n          2           4\n          1   0.0 0.0 0.0\n";
        let mut mesh = Mesh::new();
        assert!(read_from(&mut mesh, Cursor::new(input), "short.grd").is_err());
    }

    #[test]
    fn test_weir_boundary_roundtrip() {
        let mut mesh = Mesh::new();
        read_from(&mut mesh, Cursor::new(SIMPLE_GRD), "test.grd").unwrap();

        let mut weir = LandBoundary::new(24);
        weir.push_paired_weir(0, 2, 2.5, 1.0, 1.5).unwrap();
        weir.push_paired_weir(1, 3, 2.6, 1.0, 1.5).unwrap();
        mesh.set_land_boundaries(vec![weir]);

        let mut buffer = Vec::new();
        write_to(&mesh, &mut buffer).unwrap();

        let mut reloaded = Mesh::new();
        read_from(&mut reloaded, Cursor::new(buffer), "weir.grd").unwrap();
        assert_eq!(reloaded.land_boundaries(), mesh.land_boundaries());
    }

    #[test]
    fn test_failed_read_leaves_mesh_empty() {
        let mut mesh = Mesh::new();
        read_from(&mut mesh, Cursor::new(SIMPLE_GRD), "test.grd").unwrap();
        // 通过 Mesh::read_format 走失败路径
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.grd");
        std::fs::write(&bad, "header only\n").unwrap();
        assert!(mesh.read(&bad).is_err());
        assert_eq!(mesh.num_nodes(), 0);
        assert_eq!(mesh.num_elements(), 0);
    }

    #[test]
    fn test_projected_write_precision() {
        let mut mesh = Mesh::new();
        read_from(&mut mesh, Cursor::new(SIMPLE_GRD), "test.grd").unwrap();
        mesh.crs = cm_geo::Crs::with_geographic(32650, false);
        let mut buffer = Vec::new();
        write_to(&mesh, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        // 投影坐标 4 位小数
        assert!(text.contains("0.0000"));
        assert!(!text.contains("0.0000000000"));
    }

    #[test]
    fn test_file_level_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.grd");

        let mut mesh = Mesh::new();
        read_from(&mut mesh, Cursor::new(SIMPLE_GRD), "test.grd").unwrap();
        mesh.write(&path).unwrap();

        let mut reloaded = Mesh::new();
        reloaded.read(&path).unwrap();
        assert_eq!(reloaded.num_nodes(), 4);
        assert_eq!(reloaded.num_elements(), 2);

        // 最近节点查询正常
        let found = reloaded.find_nearest_node(&Point2D::new(0.9, 0.1)).unwrap();
        assert_eq!(reloaded.nodes()[found].id, 2);
    }
}
