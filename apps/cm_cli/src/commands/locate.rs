// apps/cm_cli/src/commands/locate.rs

//! 点定位命令
//!
//! 对给定坐标报告最近节点与所在单元。

use anyhow::{Context, Result};
use clap::Args;
use cm_geo::Point2D;
use cm_mesh::Mesh;
use std::path::PathBuf;

/// 点定位参数
#[derive(Args)]
pub struct LocateArgs {
    /// 网格文件路径
    pub mesh: PathBuf,

    /// 查询点 x 坐标 (经度或东向)
    pub x: f64,

    /// 查询点 y 坐标 (纬度或北向)
    pub y: f64,

    /// 单元定位的候选形心数
    #[arg(long, default_value_t = Mesh::DEFAULT_SEARCH_DEPTH)]
    pub depth: usize,
}

/// 执行点定位命令
pub fn execute(args: LocateArgs) -> Result<()> {
    let mut mesh = Mesh::new();
    mesh.read(&args.mesh)
        .with_context(|| format!("读取网格失败: {}", args.mesh.display()))?;

    let query = Point2D::new(args.x, args.y);
    println!("查询点: ({}, {})", args.x, args.y);

    match mesh.find_nearest_node(&query) {
        Some(position) => {
            let node = &mesh.nodes()[position];
            println!(
                "最近节点: 编号 {} 坐标 ({}, {}) 高程 {} 距离 {:.6}",
                node.id,
                node.x(),
                node.y(),
                node.z,
                node.position.distance_to(&query)
            );
        }
        None => println!("最近节点: 网格为空"),
    }

    match mesh.find_element_with_depth(&query, args.depth)? {
        Some(position) => {
            let element = &mesh.elements()[position];
            println!("所在单元: 编号 {}", element.id);
        }
        None => println!("所在单元: 查询点位于网格之外"),
    }
    Ok(())
}
