// crates/ef_physics/src/boundary/manager.rs

//! 边界条件管理器
//!
//! 以网格边界标签索引边界条件：
//! - 初始化时从配置解析，未知类型立即报错
//! - 检查网格中每个边界标签都有对应条件
//! - 周期条件在网格构建前取出，用于配对
//!
//! 管理器本身不保存面列表，边界面从网格拓扑按标签查询。

use std::collections::BTreeMap;

use glam::DVec2;

use ef_config::BoundaryConfig;

use super::ghost::{GhostContext, GhostStateCalculator};
use super::types::{BoundaryCondition, BoundaryKind};
use crate::error::PhysicsError;
use crate::exact::ExactSolution;
use crate::mesh::MeshTopology;
use crate::state::{GasModel, Primitive};

/// 边界条件管理器
#[derive(Debug, Clone, Default)]
pub struct BoundaryManager {
    conditions: BTreeMap<u32, BoundaryCondition>,
    calculator: GhostStateCalculator,
}

impl BoundaryManager {
    /// 创建空管理器
    pub fn new(gas: GasModel) -> Self {
        Self {
            conditions: BTreeMap::new(),
            calculator: GhostStateCalculator::new(gas),
        }
    }

    /// 从配置列表创建
    pub fn from_configs(
        configs: &[BoundaryConfig],
        gas: GasModel,
        exact_template: &ExactSolution,
    ) -> Result<Self, PhysicsError> {
        let mut manager = Self::new(gas);
        for cfg in configs {
            let bc = BoundaryCondition::from_config(cfg, &gas, exact_template)?;
            if manager.conditions.contains_key(&cfg.id) {
                return Err(PhysicsError::invalid_config(
                    format!("boundaries[{}]", cfg.id),
                    "边界编号重复",
                ));
            }
            manager.add_condition(cfg.id, bc);
        }
        Ok(manager)
    }

    /// 添加（或替换）边界条件
    pub fn add_condition(&mut self, tag: u32, condition: BoundaryCondition) -> &mut Self {
        self.conditions.insert(tag, condition);
        self
    }

    /// 按标签获取边界条件
    #[inline]
    pub fn get(&self, tag: u32) -> Option<&BoundaryCondition> {
        self.conditions.get(&tag)
    }

    /// 条件数量
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// 所有 (标签, 条件)，按标签升序
    pub fn iter(&self) -> impl Iterator<Item = (u32, &BoundaryCondition)> {
        self.conditions.iter().map(|(&tag, bc)| (tag, bc))
    }

    /// 周期边界 (标签, 平移)，用于网格配对
    pub fn periodic_pairs(&self) -> Vec<(u32, DVec2)> {
        self.conditions
            .iter()
            .filter_map(|(&tag, bc)| match bc {
                BoundaryCondition::Periodic { shift } => Some((tag, *shift)),
                _ => None,
            })
            .collect()
    }

    /// 检查网格的每个边界标签都有非周期条件
    pub fn validate<M: MeshTopology + ?Sized>(&self, mesh: &M) -> Result<(), PhysicsError> {
        for tag in mesh.boundary_tags() {
            match self.conditions.get(&tag) {
                None => {
                    return Err(PhysicsError::invalid_mesh(format!("边界标签 {tag} 未配置边界条件")));
                }
                Some(bc) if bc.kind() == BoundaryKind::Periodic => {
                    return Err(PhysicsError::invalid_mesh(format!("周期边界 {tag} 的面未配对")));
                }
                Some(_) => {}
            }
        }
        log::debug!(
            "边界条件检查通过: {}",
            self.conditions
                .iter()
                .map(|(tag, bc)| format!("{tag}={}", bc.kind()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(())
    }

    /// 计算边界面 `face` 的幽灵状态
    pub fn ghost_state<M: MeshTopology + ?Sized>(
        &self,
        mesh: &M,
        face: usize,
        interior: &Primitive,
        time: f64,
    ) -> Result<Primitive, PhysicsError> {
        let tag = mesh
            .face_boundary(face)
            .ok_or_else(|| PhysicsError::invalid_mesh(format!("面 {face} 不是边界面")))?;
        let bc = self
            .get(tag)
            .ok_or_else(|| PhysicsError::invalid_mesh(format!("边界标签 {tag} 未配置边界条件")))?;
        let ctx = GhostContext::new(mesh.face_normal(face), mesh.face_center(face), time);
        self.calculator.ghost_state(bc, interior, &ctx)
    }

    /// 是否为固壁标签
    pub fn is_solid(&self, tag: u32) -> bool {
        self.get(tag).is_some_and(|bc| bc.kind().is_solid())
    }
}

// ============================================================
// 测试
// ============================================================
