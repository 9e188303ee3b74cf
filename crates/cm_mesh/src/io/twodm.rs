// crates/cm_mesh/src/io/twodm.rs

//! 通用 ASCII 2dm 格式读写 (.2dm)
//!
//! 卡片式布局：
//!
//! ```text
//! MESH2D
//! MESHNAME "名称"
//! E3T id n1 n2 n3 mat
//! E4Q id n1 n2 n3 n4 mat
//! ND id x y z
//! ```
//!
//! 卡片允许任意混排，节点和单元各自按出现顺序存储。
//! 该格式不携带边界信息，读取后边界集合为空。

use crate::element::Element;
use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use crate::node::{parse_field, Node};
use crate::numbering::Numbering;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

const FORMAT: &str = "2dm";

/// 单元卡片的中间表示，节点编号待全部节点读完后再换算
struct RawElement {
    id: usize,
    node_ids: Vec<usize>,
    line_no: usize,
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
/// 首行非 `MESH2D`、卡片畸形或单元引用不存在的节点时返回错误。
pub fn read_from<R: BufRead>(mesh: &mut Mesh, reader: R, file: &str) -> MeshResult<()> {
    let mut nodes = Vec::new();
    let mut raw_elements: Vec<RawElement> = Vec::new();
    let mut header = String::new();
    let mut saw_mesh2d = false;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| {
            MeshError::format_error(FORMAT, file, line_no, format!("读取失败: {e}"))
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut tokens = trimmed.split_whitespace();
        let card = tokens.next().unwrap_or_default();
        match card {
            "MESH2D" => {
                saw_mesh2d = true;
            }
            "MESHNAME" => {
                header = trimmed["MESHNAME".len()..].trim().trim_matches('"').to_string();
            }
            "ND" => {
                nodes.push(Node::from_2dm_record(trimmed, file, line_no)?);
            }
            "E3T" | "E4Q" => {
                let arity = if card == "E3T" { 3 } else { 4 };
                let id: usize = parse_field(tokens.next(), "单元编号", file, line_no)?;
                let mut node_ids = Vec::with_capacity(arity);
                for _ in 0..arity {
                    node_ids.push(parse_field(tokens.next(), "节点编号", file, line_no)?);
                }
                raw_elements.push(RawElement { id, node_ids, line_no });
            }
            // 其他卡片（NS, BEGPARAMDEF 等）不属于几何，跳过
            _ => {}
        }
    }

    if !saw_mesh2d {
        return Err(MeshError::format_error(
            FORMAT,
            file,
            1,
            "缺少 MESH2D 卡片",
        ));
    }

    let node_ids: Vec<usize> = nodes.iter().map(|n| n.id).collect();
    let node_numbering = Numbering::from_ids(&node_ids)?;

    let mut elements = Vec::with_capacity(raw_elements.len());
    for raw in raw_elements {
        let mut positions = Vec::with_capacity(raw.node_ids.len());
        for node_id in raw.node_ids {
            let position = node_numbering.position_of(node_id, nodes.len()).ok_or_else(|| {
                MeshError::format_error(
                    FORMAT,
                    file,
                    raw.line_no,
                    format!("单元 {} 引用不存在的节点编号 {node_id}", raw.id),
                )
            })?;
            positions.push(position);
        }
        elements.push(Element::new(raw.id, positions)?);
    }

    mesh.header = header;
    mesh.nodes = nodes;
    mesh.elements = elements;
    mesh.open_boundaries = Vec::new();
    mesh.land_boundaries = Vec::new();
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
/// 单元卡片在前、节点卡片在后，材料编号固定写 1。
pub fn write_to<W: Write>(mesh: &Mesh, writer: &mut W) -> MeshResult<()> {
    writeln!(writer, "MESH2D")?;
    writeln!(writer, "MESHNAME \"{}\"", mesh.header)?;
    for element in mesh.elements() {
        writeln!(writer, "{}", element.to_2dm_record(mesh.nodes())?)?;
    }
    for node in mesh.nodes() {
        writeln!(writer, "{}", node.to_2dm_record())?;
    }
    Ok(())
}
