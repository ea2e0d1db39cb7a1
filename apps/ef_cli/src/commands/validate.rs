// apps/ef_cli/src/commands/validate.rs

//! 算例验证命令
//!
//! 依次检查：JSON 解析与数值范围、名称解析与网格装配、求解器构建。
//! 可疑但合法的设置给出警告。

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use ef_config::{CaseConfig, TimeMode, TimeStepping};
use ef_physics::builder::CaseSetup;
use ef_physics::engine::EulerSolver;
use ef_physics::numerics::LimiterKind;
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 算例文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== EulerFlow 算例验证 ===");

    let mut result = ValidationResult::default();
    validate_case(&args.config, &mut result);
    print_validation_result(&result, args.strict)
}

fn validate_case(path: &Path, result: &mut ValidationResult) {
    println!("\n检查算例文件: {}", path.display());

    let config = match CaseConfig::from_file(path) {
        Ok(config) => config,
        Err(e) => {
            result.add_error(format!("配置无效: {e}"));
            return;
        }
    };
    println!("  ✓ 配置格式与数值范围有效");

    check_settings(&config, result);

    let case = match CaseSetup::from_config(&config) {
        Ok(case) => case,
        Err(e) => {
            result.add_error(format!("装配失败: {e}"));
            return;
        }
    };
    println!(
        "  ✓ 网格 {}x{}，初始场 {} 单元",
        config.mesh.nx,
        config.mesh.ny,
        case.initial.n_cells()
    );

    if let Err(e) = EulerSolver::new(&case.mesh, case.settings) {
        result.add_error(format!("求解器构建失败: {e}"));
        return;
    }
    println!("  ✓ 求解器构建成功");
}

fn check_settings(config: &CaseConfig, result: &mut ValidationResult) {
    let time = &config.time;
    if time.mode == TimeMode::Explicit && time.fixed_dt.is_none() && time.cfl > 1.0 {
        result.add_warning(format!("显式推进 CFL = {} 大于 1，可能不稳定", time.cfl));
    }
    if time.stepping == TimeStepping::Local && time.abort_residual.is_none() {
        result.add_warning("当地时间步未设置 abort_residual，只能按最大步数停止");
    }
    if time.stepping == TimeStepping::Global && time.abort_residual.is_some() {
        result.add_warning("全局时间步的非定常计算设置了 abort_residual");
    }

    if config.numerics.order >= 2 {
        if let Ok(LimiterKind::None) = config.numerics.limiter.parse::<LimiterKind>() {
            result.add_warning("二阶重构未使用限制器，间断附近可能振荡");
        }
    }

    if config.analysis.wall_id.is_some() && config.analysis.freestream.is_none() {
        result.add_error("analysis.wall_id 需要 analysis.freestream");
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    let success = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };

    if success {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_mode_rejects_warnings() {
        let mut result = ValidationResult::default();
        result.add_warning("w");
        assert!(print_validation_result(&result, false).is_ok());
        assert!(print_validation_result(&result, true).is_err());
    }

    #[test]
    fn test_unlimited_second_order_warns() {
        let mut config = CaseConfig::default();
        config.numerics.limiter = "none".into();
        let mut result = ValidationResult::default();
        check_settings(&config, &mut result);
        assert!(result.is_ok());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut result = ValidationResult::default();
        validate_case(Path::new("/nonexistent/case.json"), &mut result);
        assert!(!result.is_ok());
    }
}
