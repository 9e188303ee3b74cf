// crates/cm_mesh/src/node.rs

//! 节点记录
//!
//! 节点携带文件中的编号、平面位置和标量高程。编号允许稀疏乱序，
//! 存储位置由 [`crate::numbering::Numbering`] 管理。

use crate::error::{MeshError, MeshResult};
use cm_geo::Point2D;
use serde::{Deserialize, Serialize};

/// 网格节点
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// 文件中的节点编号（正整数，允许稀疏）
    pub id: usize,
    /// 平面位置
    pub position: Point2D,
    /// 高程/水深值
    pub z: f64,
}

impl Node {
    /// 创建节点
    #[must_use]
    pub const fn new(id: usize, position: Point2D, z: f64) -> Self {
        Self { id, position, z }
    }

    /// X 坐标
    #[inline]
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.position.x
    }

    /// Y 坐标
    #[inline]
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.position.y
    }

    /// 按原生 ASCII 格式输出单条节点记录
    ///
    /// 地理坐标写 10 位小数，投影坐标写 4 位小数。
    #[must_use]
    pub fn to_adcirc_record(&self, geographic: bool) -> String {
        if geographic {
            format!(
                "{:11} {:18.10} {:18.10} {:18.10}",
                self.id, self.position.x, self.position.y, self.z
            )
        } else {
            format!(
                "{:11} {:18.4} {:18.4} {:18.4}",
                self.id, self.position.x, self.position.y, self.z
            )
        }
    }

    /// 解析原生 ASCII 节点记录: `id x y z`
    ///
    /// # Errors
    /// 字段数不足或数值解析失败时返回错误。
    pub fn from_adcirc_record(record: &str, file: &str, line: usize) -> MeshResult<Self> {
        let mut tokens = record.split_whitespace();
        let id = parse_field(tokens.next(), "节点编号", file, line)?;
        let x = parse_field(tokens.next(), "x", file, line)?;
        let y = parse_field(tokens.next(), "y", file, line)?;
        let z = parse_field(tokens.next(), "z", file, line)?;
        Ok(Self::new(id, Point2D::new(x, y), z))
    }

    /// 按 2dm ND 卡输出单条节点记录
    #[must_use]
    pub fn to_2dm_record(&self) -> String {
        format!(
            "ND {} {:22.15e} {:22.15e} {:22.15e}",
            self.id, self.position.x, self.position.y, self.z
        )
    }

    /// 解析 2dm ND 卡: `ND id x y z`
    ///
    /// # Errors
    /// 卡名不是 `ND` 或字段解析失败时返回错误。
    pub fn from_2dm_record(record: &str, file: &str, line: usize) -> MeshResult<Self> {
        let mut tokens = record.split_whitespace();
        let card = tokens.next().unwrap_or_default();
        if card != "ND" {
            return Err(MeshError::format_error(
                "2dm",
                file,
                line,
                format!("期望 ND 卡, 实际 {card}"),
            ));
        }
        let id = parse_field(tokens.next(), "节点编号", file, line)?;
        let x = parse_field(tokens.next(), "x", file, line)?;
        let y = parse_field(tokens.next(), "y", file, line)?;
        let z = parse_field(tokens.next(), "z", file, line)?;
        Ok(Self::new(id, Point2D::new(x, y), z))
    }
}

/// 解析单个空白分隔字段
pub(crate) fn parse_field<T: std::str::FromStr>(
    token: Option<&str>,
    name: &str,
    file: &str,
    line: usize,
) -> MeshResult<T> {
    let token = token.ok_or_else(|| {
        MeshError::format_error("mesh", file, line, format!("缺少字段: {name}"))
    })?;
    token.parse().map_err(|_| {
        MeshError::format_error("mesh", file, line, format!("字段 {name} 解析失败: {token}"))
    })
}
