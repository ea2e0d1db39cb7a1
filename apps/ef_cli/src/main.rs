// apps/ef_cli/src/main.rs

//! EulerFlow 命令行界面
//!
//! 二维可压缩 Euler 求解器的命令行工具：
//! - `run` 按算例文件推进到结束时间、最大步数或残差收敛
//! - `validate` 校验算例文件并尝试装配
//! - `info` 列出可用的通量、限制器、边界类型与参考解

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// EulerFlow 可压缩流求解器命令行工具
#[derive(Parser)]
#[command(name = "ef_cli")]
#[command(author = "EulerFlow Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "EulerFlow 2D compressible Euler solver", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行算例
    Run(commands::run::RunArgs),
    /// 显示信息
    Info(commands::info::InfoArgs),
    /// 验证算例
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // try_init 同时安装 log 桥接，库层的 log 记录也会输出
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
