// crates/ef_physics/src/builder/case.rs

//! 算例装配
//!
//! 从算例配置一次性生成网格、初始场和求解器设置：
//! 1. 解析设置（名称在此失败）
//! 2. 构建笛卡尔网格，周期边界按配置的平移配对
//! 3. 生成初始场：给定参考解编号时在单元中心取值，否则为均匀状态
//!
//! 给定参考解时同时保留该参考解，供结束时计算误差范数。

use glam::DVec2;

use ef_config::CaseConfig;

use super::settings::{exact_template, primitive_from_config, SolverSettings};
use crate::error::PhysicsResult;
use crate::exact::{ExactFunction, ExactSolution};
use crate::mesh::{CartesianMesh, FvMesh, MeshTopology};
use crate::state::FlowState;

/// 装配好的算例
#[derive(Debug, Clone)]
pub struct CaseSetup {
    /// 网格
    pub mesh: FvMesh,
    /// 初始场
    pub initial: FlowState,
    /// 求解器设置
    pub settings: SolverSettings,
    /// 初始场所用的参考解
    pub exact: Option<ExactSolution>,
}

impl CaseSetup {
    /// 从配置装配
    pub fn from_config(config: &CaseConfig) -> PhysicsResult<Self> {
        let settings = SolverSettings::from_config(config)?;
        let mesh = build_mesh(config, &settings)?;
        settings.boundaries.validate(&mesh)?;
        let exact = reference_solution(config, &settings)?;
        let initial = initial_state(config, &settings, &mesh)?;
        log::debug!(
            "算例 '{}': {} 单元, {} 界面, 通量 {}, 重构 {}",
            config.name,
            mesh.n_cells(),
            mesh.n_faces(),
            settings.flux.short_name(),
            if settings.reconstruction.second_order { "二阶" } else { "一阶" }
        );
        Ok(Self {
            mesh,
            initial,
            settings,
            exact,
        })
    }
}

/// 配置了参考解编号时返回对应参考解
pub fn reference_solution(config: &CaseConfig, settings: &SolverSettings) -> PhysicsResult<Option<ExactSolution>> {
    config
        .initial
        .exact_function
        .map(|id| Ok(exact_template(config, settings.gas).with_function(ExactFunction::from_id(id)?)))
        .transpose()
}

/// 按配置构建笛卡尔网格（含周期配对）
pub fn build_mesh(config: &CaseConfig, settings: &SolverSettings) -> PhysicsResult<FvMesh> {
    let m = &config.mesh;
    let mut cartesian = CartesianMesh::new(m.nx, m.ny, DVec2::from_array(m.lower), DVec2::from_array(m.upper))
        .with_sides(m.sides);
    for (tag, shift) in settings.boundaries.periodic_pairs() {
        cartesian = cartesian.with_periodic(tag, shift);
    }
    cartesian.build()
}

/// 生成初始场
pub fn initial_state(config: &CaseConfig, settings: &SolverSettings, mesh: &dyn MeshTopology) -> PhysicsResult<FlowState> {
    match reference_solution(config, settings)? {
        Some(exact) => exact.fill(mesh, 0.0),
        None => {
            let w = primitive_from_config(&config.initial.state);
            let u = settings.gas.to_conservative(&w);
            let state = FlowState::uniform(mesh.n_cells(), u);
            state.validate(&settings.gas)?;
            Ok(state)
        }
    }
}
