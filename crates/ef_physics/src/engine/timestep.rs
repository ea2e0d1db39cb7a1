// crates/ef_physics/src/engine/timestep.rs

//! 时间步长控制模块
//!
//! ## CFL 条件
//!
//! 单元当地时间步：
//!
//! $$ \Delta t_i = C \cdot \frac{A_i}{\sum_f (|u_i \cdot n_f| + c_i) L_f} $$
//!
//! 全局时间步取所有单元的最小值，并截断到结束时间；当地时间步
//! 直接使用各单元的 Δt_i（稳态加速）。给定固定步长时忽略 CFL。

use ef_config::TimeStepping;
use rayon::prelude::*;

use crate::error::{PhysicsError, PhysicsResult};
use crate::mesh::MeshTopology;
use crate::state::{GasModel, Primitive};

/// 一步的时间步长
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeStep {
    /// 全局（最小）时间步
    pub global: f64,
    /// 每个单元实际使用的时间步
    pub local: Vec<f64>,
}

/// CFL 时间步计算器
#[derive(Debug, Clone)]
pub struct CflCalculator {
    /// CFL 数
    cfl: f64,
    /// 固定时间步长
    fixed_dt: Option<f64>,
    /// 全局或当地时间步
    stepping: TimeStepping,
}

impl CflCalculator {
    /// 创建计算器
    pub fn new(cfl: f64, stepping: TimeStepping) -> Self {
        Self {
            cfl,
            fixed_dt: None,
            stepping,
        }
    }

    /// 使用固定时间步长
    pub fn with_fixed_dt(mut self, dt: Option<f64>) -> Self {
        self.fixed_dt = dt;
        self
    }

    /// CFL 数
    pub fn cfl(&self) -> f64 {
        self.cfl
    }

    /// 时间步类型
    pub fn stepping(&self) -> TimeStepping {
        self.stepping
    }

    /// 单元当地 CFL 时间步
    pub fn local_dt(&self, mesh: &dyn MeshTopology, gas: &GasModel, cells: &[Primitive]) -> Vec<f64> {
        cells
            .par_iter()
            .enumerate()
            .map(|(i, w)| {
                let denom: f64 = mesh
                    .cell_faces(i)
                    .iter()
                    .map(|&f| gas.spectral_radius(w, mesh.face_normal(f)) * mesh.face_length(f))
                    .sum();
                if denom > 0.0 {
                    self.cfl * mesh.cell_area(i) / denom
                } else {
                    f64::INFINITY
                }
            })
            .collect()
    }

    /// 计算本步时间步长
    ///
    /// 全局模式下 `remaining` 为距结束时间的剩余量，步长不会越过结束时间。
    pub fn compute(
        &self,
        mesh: &dyn MeshTopology,
        gas: &GasModel,
        cells: &[Primitive],
        remaining: Option<f64>,
    ) -> PhysicsResult<TimeStep> {
        let n = cells.len();
        if let Some(dt) = self.fixed_dt {
            let dt = clamp_to_end(dt, remaining);
            return Ok(TimeStep {
                global: dt,
                local: vec![dt; n],
            });
        }

        let local = self.local_dt(mesh, gas, cells);
        let global = local.par_iter().copied().reduce(|| f64::INFINITY, f64::min);
        if !(global.is_finite() && global > 0.0) {
            return Err(PhysicsError::invalid_config("time.cfl", format!("时间步长无效: {global:e}")));
        }

        Ok(match self.stepping {
            TimeStepping::Global => {
                let dt = clamp_to_end(global, remaining);
                TimeStep {
                    global: dt,
                    local: vec![dt; n],
                }
            }
            TimeStepping::Local => TimeStep { global, local },
        })
    }
}

fn clamp_to_end(dt: f64, remaining: Option<f64>) -> f64 {
    match remaining {
        Some(r) if r > 0.0 && r < dt => r,
        _ => dt,
    }
}
