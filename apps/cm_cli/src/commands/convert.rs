// apps/cm_cli/src/commands/convert.rs

//! 格式转换命令
//!
//! 按文件名推断输入输出格式并转换，可选顶点归一化
//! 与 CPP 投影。

use anyhow::{bail, Context, Result};
use clap::Args;
use cm_mesh::Mesh;
use std::path::PathBuf;
use tracing::info;

/// 转换参数
#[derive(Args)]
pub struct ConvertArgs {
    /// 输入网格文件
    pub input: PathBuf,

    /// 输出网格文件
    pub output: PathBuf,

    /// 转换前归一化单元顶点序
    #[arg(long)]
    pub normalize: bool,

    /// 正向 CPP 投影，参数为 "经度,纬度" 基准点
    #[arg(long, value_name = "LON,LAT", conflicts_with = "inverse_cpp")]
    pub cpp: Option<String>,

    /// 反向 CPP 投影，参数为 "经度,纬度" 基准点
    #[arg(long, value_name = "LON,LAT")]
    pub inverse_cpp: Option<String>,
}

fn parse_origin(text: &str) -> Result<(f64, f64)> {
    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() != 2 {
        bail!("基准点格式应为 \"经度,纬度\": {text}");
    }
    let lon: f64 = parts[0].trim().parse().context("经度解析失败")?;
    let lat: f64 = parts[1].trim().parse().context("纬度解析失败")?;
    Ok((lon, lat))
}

/// 执行转换命令
pub fn execute(args: ConvertArgs) -> Result<()> {
    let mut mesh = Mesh::new();
    mesh.read(&args.input)
        .with_context(|| format!("读取网格失败: {}", args.input.display()))?;

    if args.normalize {
        mesh.normalize().context("顶点归一化失败")?;
        info!("顶点序已归一化");
    }

    if let Some(origin) = &args.cpp {
        let (lon0, lat0) = parse_origin(origin)?;
        mesh.cpp(lon0, lat0);
        info!("已投影到 CPP 平面, 基准点 ({lon0}, {lat0})");
    } else if let Some(origin) = &args.inverse_cpp {
        let (lon0, lat0) = parse_origin(origin)?;
        mesh.inverse_cpp(lon0, lat0);
        info!("已反投影回地理坐标, 基准点 ({lon0}, {lat0})");
    }

    mesh.write(&args.output)
        .with_context(|| format!("写出网格失败: {}", args.output.display()))?;
    info!(
        "转换完成: {} -> {}",
        args.input.display(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origin() {
        assert_eq!(parse_origin("120.5, 31.25").unwrap(), (120.5, 31.25));
        assert!(parse_origin("120.5").is_err());
        assert!(parse_origin("a,b").is_err());
    }
}
