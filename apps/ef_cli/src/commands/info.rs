// apps/ef_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 列出配置文件中可用的名称，或输出默认算例文件作为模板。

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ef_config::CaseConfig;
use ef_physics::boundary::BoundaryKind;
use ef_physics::exact::ExactFunction;
use ef_physics::numerics::LimiterKind;
use ef_physics::schemes::FluxKind;
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 显示默认配置
    #[arg(long)]
    pub defaults: bool,

    /// 把默认算例写入文件
    #[arg(long, value_name = "PATH")]
    pub write_template: Option<PathBuf>,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== EulerFlow 信息 ===");

    if let Some(path) = &args.write_template {
        CaseConfig::default()
            .save_to_file(path)
            .with_context(|| format!("写入模板失败: {}", path.display()))?;
        info!("默认算例已写入 {}", path.display());
        return Ok(());
    }

    print_version();
    println!();
    print_catalog();
    if args.defaults {
        println!();
        print_default_config()?;
    }
    Ok(())
}

fn print_version() {
    println!("EulerFlow CLI 版本: {}", env!("CARGO_PKG_VERSION"));
    println!("目标平台: {} / {}", std::env::consts::ARCH, std::env::consts::OS);
    println!("并行线程数: {}", std::thread::available_parallelism().map_or(1, |n| n.get()));
}

fn print_catalog() {
    println!("=== 数值通量 (numerics.flux) ===");
    for kind in FluxKind::ALL {
        println!("  {:<8} {:?}", kind.short_name(), kind);
    }

    println!("\n=== 限制器 (numerics.limiter) ===");
    for kind in [LimiterKind::None, LimiterKind::BarthJespersen, LimiterKind::Venkatakrishnan] {
        println!("  {}", kind.short_name());
    }

    println!("\n=== 边界类型 (boundaries[].kind) ===");
    for kind in BoundaryKind::ALL {
        println!("  {}", kind.short_name());
    }

    println!("\n=== 参考解 (exact_function) ===");
    for f in ExactFunction::ALL {
        println!("  {}  {}", f.id(), f.short_name());
    }
}

fn print_default_config() -> Result<()> {
    println!("=== 默认算例 ===");
    let json = serde_json::to_string_pretty(&CaseConfig::default()).context("序列化默认配置失败")?;
    println!("{json}");
    Ok(())
}
