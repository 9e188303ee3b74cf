// apps/cm_cli/src/main.rs

//! ChaoMesh 命令行界面
//!
//! 提供非结构网格的查看、转换与查询工具。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// ChaoMesh 非结构网格工具
#[derive(Parser)]
#[command(name = "cm_cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "ChaoMesh unstructured mesh toolkit", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 显示网格概要
    Info(commands::info::InfoArgs),
    /// 网格格式转换
    Convert(commands::convert::ConvertArgs),
    /// 点定位与最近节点查询
    Locate(commands::locate::LocateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 执行命令
    match cli.command {
        Commands::Info(args) => commands::info::execute(args),
        Commands::Convert(args) => commands::convert::execute(args),
        Commands::Locate(args) => commands::locate::execute(args),
    }
}
