// apps/cm_cli/src/commands/info.rs

//! 网格概要命令
//!
//! 读取网格文件并打印节点、单元与边界统计。

use anyhow::{Context, Result};
use clap::Args;
use cm_mesh::Mesh;
use std::path::PathBuf;

/// 概要参数
#[derive(Args)]
pub struct InfoArgs {
    /// 网格文件路径 (.14 / .grd / .2dm / *_net.nc)
    pub mesh: PathBuf,

    /// 同时计算连接表统计
    #[arg(long)]
    pub links: bool,
}

/// 执行概要命令
pub fn execute(args: InfoArgs) -> Result<()> {
    let mut mesh = Mesh::new();
    mesh.read(&args.mesh)
        .with_context(|| format!("读取网格失败: {}", args.mesh.display()))?;

    println!("=== 网格概要 ===");
    println!("文件: {}", args.mesh.display());
    println!("描述: {}", mesh.header);
    println!("节点数: {}", mesh.num_nodes());
    println!("单元数: {}", mesh.num_elements());
    println!("单元最大顶点数: {}", mesh.max_nodes_per_element());
    println!(
        "坐标系: EPSG:{} ({})",
        mesh.crs.epsg,
        if mesh.crs.is_geographic { "地理" } else { "投影" }
    );
    println!(
        "节点编号: {}",
        if mesh.node_ordering_is_sequential() { "顺序" } else { "乱序" }
    );
    println!(
        "开边界: {} 条, 共 {} 节点",
        mesh.num_open_boundaries(),
        mesh.total_open_boundary_nodes()
    );
    println!(
        "陆地边界: {} 条, 共 {} 节点",
        mesh.num_land_boundaries(),
        mesh.total_land_boundary_nodes()
    );

    if args.links {
        let links = mesh.link_table().context("生成连接表失败")?;
        println!("去重连接数: {}", links.len());
    }
    Ok(())
}
