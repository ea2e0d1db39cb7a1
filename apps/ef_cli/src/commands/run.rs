// apps/ef_cli/src/commands/run.rs

//! 运行算例命令
//!
//! 装配算例后循环推进，直到：
//! - 全局时间步到达结束时间
//! - 步数达到 `time.max_iterations`
//! - 归一化密度残差低于 `time.abort_residual`（定常计算）
//!
//! 初始场由参考解给出时，结束后报告相对参考解的误差范数。

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use ef_config::CaseConfig;
use ef_physics::analysis::ErrorNorms;
use ef_physics::builder::CaseSetup;
use ef_physics::engine::EulerSolver;
use ef_physics::mesh::MeshTopology;
use tracing::{info, warn};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 算例文件路径（JSON）
    #[arg(short, long)]
    pub config: PathBuf,

    /// 最终状态输出文件（JSON）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 覆盖最大步数
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// 日志输出间隔（步）
    #[arg(long, default_value = "10")]
    pub report_interval: usize,
}

/// 停止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    EndTime,
    MaxSteps,
    Converged,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== EulerFlow 算例启动 ===");

    let config = CaseConfig::from_file(&args.config)
        .with_context(|| format!("读取算例文件失败: {}", args.config.display()))?;
    let case = CaseSetup::from_config(&config).context("装配算例失败")?;
    let CaseSetup {
        mesh,
        initial,
        settings,
        exact,
    } = case;

    info!(
        "算例 '{}': {} 单元, 通量 {}, {:?}/{:?}, CFL={}",
        config.name,
        initial.n_cells(),
        settings.flux,
        settings.mode,
        settings.stepping,
        settings.cfl
    );

    let mut solver = EulerSolver::new(&mesh, settings).context("构建求解器失败")?;
    let max_steps = args.max_steps.unwrap_or(config.time.max_iterations);
    let interval = args.report_interval.max(1);

    let start = Instant::now();
    let mut state = initial;
    let reason = loop {
        if solver.is_finished() {
            break StopReason::EndTime;
        }
        if solver.step() >= max_steps {
            break StopReason::MaxSteps;
        }

        let outcome = solver
            .advance_step(&mesh, &state)
            .with_context(|| format!("第 {} 步推进失败", solver.step() + 1))?;

        for warning in &outcome.warnings {
            warn!("step {}: {}", outcome.step, warning);
        }

        if outcome.step % interval == 0 || outcome.step == 1 {
            info!(
                "step {:>6} t={:.5e} dt={:.3e} |R|/|R0|: {}",
                outcome.step, outcome.time, outcome.dt, outcome.normalized_residual
            );
            if let Some(forces) = &outcome.forces {
                info!(
                    "  cl={:.6} cd={:.6} (Δcl={:.2e}, Δcd={:.2e})",
                    forces.cl, forces.cd, forces.cl_residual, forces.cd_residual
                );
            }
        }

        let converged = config
            .time
            .abort_residual
            .is_some_and(|tol| outcome.step > 1 && outcome.normalized_residual.density() < tol);
        state = outcome.state;
        if converged {
            break StopReason::Converged;
        }
    };

    let elapsed = start.elapsed();
    let totals = state.totals(&mesh.cell_areas());

    info!("=== 计算结束 ({:?}) ===", reason);
    info!("{}", solver.stats().summary());
    info!("时间 t={:.5e}, 计算耗时 {:.2} s", solver.time(), elapsed.as_secs_f64());
    info!(
        "守恒量总和: ρ={:.10e} ρu={:.10e} ρv={:.10e} ρE={:.10e}",
        totals.rho, totals.rho_u, totals.rho_v, totals.rho_e
    );

    if let Some(exact) = &exact {
        let errors = ErrorNorms::against_exact(exact, &mesh, &state, solver.time())
            .context("计算参考解误差失败")?;
        info!("相对参考解 '{}' 的误差: {}", exact.function(), errors);
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&state).context("序列化状态失败")?;
        std::fs::write(path, json).with_context(|| format!("写入输出文件失败: {}", path.display()))?;
        info!("最终状态已写入 {}", path.display());
    }

    Ok(())
}
