// crates/ef_config/src/case_config.rs

//! CaseConfig - 算例配置
//!
//! 描述一个 Euler 算例的全部输入：气体参数、结构网格、数值格式、
//! 时间推进、隐式求解器、边界条件、初始场和力系数分析。
//!
//! 格式与限制器名称保持为字符串，未知名称在 `ef_physics` 初始化时报错。

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::ConfigError;

/// 算例配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseConfig {
    /// 算例名称
    #[serde(default = "default_name")]
    pub name: String,

    /// 气体参数
    #[serde(default)]
    pub gas: GasConfig,

    /// 结构网格
    #[serde(default)]
    pub mesh: MeshConfig,

    /// 空间离散
    #[serde(default)]
    pub numerics: NumericsConfig,

    /// 时间推进
    #[serde(default)]
    pub time: TimeConfig,

    /// 隐式求解器
    #[serde(default)]
    pub implicit: ImplicitConfig,

    /// 边界条件列表
    #[serde(default = "default_boundaries")]
    pub boundaries: Vec<BoundaryConfig>,

    /// 初始场
    #[serde(default)]
    pub initial: InitialConfig,

    /// 力系数分析
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

fn default_name() -> String { "case".to_string() }

fn default_boundaries() -> Vec<BoundaryConfig> {
    vec![BoundaryConfig::new(1, "slipwall")]
}

/// 气体参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasConfig {
    /// 比热比
    #[serde(default = "default_gamma")]
    pub gamma: f64,
}

fn default_gamma() -> f64 { 1.4 }

impl Default for GasConfig {
    fn default() -> Self {
        Self { gamma: default_gamma() }
    }
}

/// 笛卡尔网格配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshConfig {
    /// x 方向单元数
    #[serde(default = "default_n")]
    pub nx: usize,
    /// y 方向单元数
    #[serde(default = "default_n")]
    pub ny: usize,
    /// 左下角坐标
    #[serde(default = "default_lower")]
    pub lower: [f64; 2],
    /// 右上角坐标
    #[serde(default = "default_upper")]
    pub upper: [f64; 2],
    /// 各边界的边界条件编号，顺序为 下、右、上、左
    #[serde(default = "default_sides")]
    pub sides: [u32; 4],
}

fn default_n() -> usize { 20 }
fn default_lower() -> [f64; 2] { [0.0, 0.0] }
fn default_upper() -> [f64; 2] { [1.0, 1.0] }
fn default_sides() -> [u32; 4] { [1, 1, 1, 1] }

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            nx: default_n(),
            ny: default_n(),
            lower: default_lower(),
            upper: default_upper(),
            sides: default_sides(),
        }
    }
}

/// 空间离散配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericsConfig {
    /// 数值通量名称（god, roe, hll, hlle, hllc, lxf, stw, cen, ausmd, ausmdv, vanleer）
    #[serde(default = "default_flux")]
    pub flux: String,
    /// 限制器名称（barth_jespersen, venkatakrishnan, none）
    #[serde(default = "default_limiter")]
    pub limiter: String,
    /// Venkatakrishnan K 参数
    #[serde(default = "default_venkat_k")]
    pub venkat_k: f64,
    /// 空间精度阶数（1 或 2）
    #[serde(default = "default_order")]
    pub order: u8,
    /// 梯度重构方法
    #[serde(default)]
    pub gradient: GradientMethod,
}

/// 单元梯度计算方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GradientMethod {
    /// 加权最小二乘
    #[default]
    LeastSquares,
    /// Green-Gauss 面积分
    GreenGauss,
}

fn default_flux() -> String { "hllc".to_string() }
fn default_limiter() -> String { "barth_jespersen".to_string() }
fn default_venkat_k() -> f64 { 1.0 }
fn default_order() -> u8 { 2 }

impl Default for NumericsConfig {
    fn default() -> Self {
        Self {
            flux: default_flux(),
            limiter: default_limiter(),
            venkat_k: default_venkat_k(),
            order: default_order(),
            gradient: GradientMethod::default(),
        }
    }
}

/// 时间推进模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeMode {
    /// 显式 Runge-Kutta
    #[default]
    Explicit,
    /// 隐式 Newton-Krylov
    Implicit,
}

/// 时间步类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeStepping {
    /// 全场统一时间步（时间精确）
    #[default]
    Global,
    /// 当地时间步（稳态加速）
    Local,
}

/// 时间推进配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// 显式或隐式
    #[serde(default)]
    pub mode: TimeMode,
    /// 全局或当地时间步
    #[serde(default)]
    pub stepping: TimeStepping,
    /// CFL 数
    #[serde(default = "default_cfl")]
    pub cfl: f64,
    /// 固定时间步长（给定时忽略 CFL）
    #[serde(default)]
    pub fixed_dt: Option<f64>,
    /// Runge-Kutta 级数（1-4）
    #[serde(default = "default_rk_stages")]
    pub rk_stages: u8,
    /// 最大步数
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// 结束时间
    #[serde(default = "default_end_time")]
    pub end_time: f64,
    /// 稳态收敛判据（归一化密度残差）
    #[serde(default)]
    pub abort_residual: Option<f64>,
}

fn default_cfl() -> f64 { 0.5 }
fn default_rk_stages() -> u8 { 3 }
fn default_max_iterations() -> usize { 100_000 }
fn default_end_time() -> f64 { 0.2 }

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            mode: TimeMode::default(),
            stepping: TimeStepping::default(),
            cfl: default_cfl(),
            fixed_dt: None,
            rk_stages: default_rk_stages(),
            max_iterations: default_max_iterations(),
            end_time: default_end_time(),
            abort_residual: None,
        }
    }
}

/// Krylov 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KrylovMethod {
    /// 重启 GMRES(m)
    #[default]
    Gmres,
    /// BiCGStab
    Bicgstab,
}

/// 预条件器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PreconditionerKind {
    /// 块 Jacobi（对角块求逆）
    #[default]
    BlockJacobi,
    /// 无预条件
    None,
}

/// Jacobian 处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JacobianMode {
    /// 组装块稀疏矩阵
    #[default]
    Assembled,
    /// 无矩阵（有限差分矩阵-向量乘）
    MatrixFree,
}

/// 隐式求解器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplicitConfig {
    /// Krylov 方法
    #[serde(default)]
    pub method: KrylovMethod,
    /// 线性求解相对容差
    #[serde(default = "default_linear_tol")]
    pub tolerance: f64,
    /// 线性求解最大迭代次数
    #[serde(default = "default_linear_iter")]
    pub max_iterations: usize,
    /// GMRES 重启维数
    #[serde(default = "default_krylov_dim")]
    pub krylov_dim: usize,
    /// 预条件器
    #[serde(default)]
    pub preconditioner: PreconditionerKind,
    /// Jacobian 处理方式
    #[serde(default)]
    pub jacobian: JacobianMode,
    /// 每个时间步的 Newton 迭代次数
    #[serde(default = "default_newton_iter")]
    pub newton_iterations: usize,
    /// Newton 相对收敛容差
    #[serde(default = "default_newton_tol")]
    pub newton_tolerance: f64,
}

fn default_linear_tol() -> f64 { 1e-3 }
fn default_linear_iter() -> usize { 200 }
fn default_krylov_dim() -> usize { 30 }
fn default_newton_iter() -> usize { 1 }
fn default_newton_tol() -> f64 { 1e-3 }

impl Default for ImplicitConfig {
    fn default() -> Self {
        Self {
            method: KrylovMethod::default(),
            tolerance: default_linear_tol(),
            max_iterations: default_linear_iter(),
            krylov_dim: default_krylov_dim(),
            preconditioner: PreconditionerKind::default(),
            jacobian: JacobianMode::default(),
            newton_iterations: default_newton_iter(),
            newton_tolerance: default_newton_tol(),
        }
    }
}

/// 来流状态（密度、马赫数、攻角[度]、压力）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FreestreamConfig {
    /// 密度
    pub rho: f64,
    /// 马赫数
    pub mach: f64,
    /// 攻角 [度]
    #[serde(default)]
    pub alpha: f64,
    /// 压力
    pub pressure: f64,
}

/// 边界条件配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// 边界编号，与网格边界标签对应
    pub id: u32,
    /// 边界类型名称
    pub kind: String,
    /// 来流状态（inflow / characteristic）
    #[serde(default)]
    pub freestream: Option<FreestreamConfig>,
    /// 背压（pressure_outflow）
    #[serde(default)]
    pub back_pressure: Option<f64>,
    /// 精确解编号（exact）
    #[serde(default)]
    pub exact_function: Option<u32>,
    /// 周期平移向量（periodic）
    #[serde(default)]
    pub periodic_shift: Option<[f64; 2]>,
    /// 等温壁温度 T = p/ρ（wall，缺省为绝热壁）
    #[serde(default)]
    pub wall_temperature: Option<f64>,
}

impl BoundaryConfig {
    /// 创建无参数的边界配置
    pub fn new(id: u32, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            freestream: None,
            back_pressure: None,
            exact_function: None,
            periodic_shift: None,
            wall_temperature: None,
        }
    }

    /// 设置来流状态
    pub fn with_freestream(mut self, freestream: FreestreamConfig) -> Self {
        self.freestream = Some(freestream);
        self
    }

    /// 设置背压
    pub fn with_back_pressure(mut self, p: f64) -> Self {
        self.back_pressure = Some(p);
        self
    }

    /// 设置精确解编号
    pub fn with_exact_function(mut self, id: u32) -> Self {
        self.exact_function = Some(id);
        self
    }

    /// 设置周期平移
    pub fn with_periodic_shift(mut self, shift: [f64; 2]) -> Self {
        self.periodic_shift = Some(shift);
        self
    }

    /// 设置等温壁温度
    pub fn with_wall_temperature(mut self, temperature: f64) -> Self {
        self.wall_temperature = Some(temperature);
        self
    }
}

/// 原始变量状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PrimitiveConfig {
    /// 密度
    pub rho: f64,
    /// x 速度
    #[serde(default)]
    pub u: f64,
    /// y 速度
    #[serde(default)]
    pub v: f64,
    /// 压力
    pub p: f64,
}

impl Default for PrimitiveConfig {
    fn default() -> Self {
        Self { rho: 1.0, u: 0.0, v: 0.0, p: 1.0 }
    }
}

/// 初始场配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialConfig {
    /// 精确解编号；为空时使用均匀状态 `state`
    #[serde(default)]
    pub exact_function: Option<u32>,
    /// 均匀初始状态
    #[serde(default)]
    pub state: PrimitiveConfig,
    /// 黎曼问题左状态
    #[serde(default = "default_riemann_left")]
    pub left: PrimitiveConfig,
    /// 黎曼问题右状态
    #[serde(default = "default_riemann_right")]
    pub right: PrimitiveConfig,
    /// 黎曼问题间断位置
    #[serde(default = "default_interface_x")]
    pub interface_x: f64,
}

fn default_riemann_left() -> PrimitiveConfig {
    PrimitiveConfig { rho: 1.0, u: 0.0, v: 0.0, p: 1.0 }
}

fn default_riemann_right() -> PrimitiveConfig {
    PrimitiveConfig { rho: 0.125, u: 0.0, v: 0.0, p: 0.1 }
}

fn default_interface_x() -> f64 { 0.5 }

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            exact_function: None,
            state: PrimitiveConfig::default(),
            left: default_riemann_left(),
            right: default_riemann_right(),
            interface_x: default_interface_x(),
        }
    }
}

/// 力系数分析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// 参与积分的壁面边界编号
    #[serde(default)]
    pub wall_id: Option<u32>,
    /// 参考长度
    #[serde(default = "default_ref_length")]
    pub reference_length: f64,
    /// 用于无量纲化的来流状态
    #[serde(default)]
    pub freestream: Option<FreestreamConfig>,
}

fn default_ref_length() -> f64 { 1.0 }

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            wall_id: None,
            reference_length: default_ref_length(),
            freestream: None,
        }
    }
}

impl Default for CaseConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            gas: GasConfig::default(),
            mesh: MeshConfig::default(),
            numerics: NumericsConfig::default(),
            time: TimeConfig::default(),
            implicit: ImplicitConfig::default(),
            boundaries: default_boundaries(),
            initial: InitialConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl CaseConfig {
    /// 从 JSON 文件加载配置并校验
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// 从 JSON 字符串解析配置并校验
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: CaseConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 按编号查找边界配置
    pub fn boundary(&self, id: u32) -> Option<&BoundaryConfig> {
        self.boundaries.iter().find(|b| b.id == id)
    }

    /// 验证数值范围和引用完整性
    ///
    /// 名称类字段（通量、限制器、边界类型）在物理层解析。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.gas.gamma > 1.0) {
            return Err(ConfigError::invalid("gas.gamma", self.gas.gamma, "比热比必须大于 1"));
        }

        if self.mesh.nx == 0 || self.mesh.ny == 0 {
            return Err(ConfigError::invalid(
                "mesh.nx/ny",
                format!("{}x{}", self.mesh.nx, self.mesh.ny),
                "单元数必须为正",
            ));
        }
        if self.mesh.upper[0] <= self.mesh.lower[0] || self.mesh.upper[1] <= self.mesh.lower[1] {
            return Err(ConfigError::invalid(
                "mesh.upper",
                format!("{:?}", self.mesh.upper),
                "右上角必须大于左下角",
            ));
        }

        if self.numerics.order != 1 && self.numerics.order != 2 {
            return Err(ConfigError::invalid("numerics.order", self.numerics.order, "只支持 1 或 2 阶"));
        }
        if self.numerics.venkat_k <= 0.0 {
            return Err(ConfigError::invalid("numerics.venkat_k", self.numerics.venkat_k, "K 必须为正"));
        }

        if !(self.time.cfl > 0.0) {
            return Err(ConfigError::invalid("time.cfl", self.time.cfl, "CFL 必须为正"));
        }
        if self.time.mode == crate::TimeMode::Explicit && self.time.cfl > 2.0 {
            return Err(ConfigError::invalid("time.cfl", self.time.cfl, "显式格式 CFL 必须在 (0, 2] 范围内"));
        }
        if let Some(dt) = self.time.fixed_dt {
            if !(dt > 0.0) {
                return Err(ConfigError::invalid("time.fixed_dt", dt, "时间步长必须为正"));
            }
        }
        if !(1..=4).contains(&self.time.rk_stages) {
            return Err(ConfigError::invalid("time.rk_stages", self.time.rk_stages, "级数必须在 1-4 之间"));
        }

        if !(self.implicit.tolerance > 0.0) {
            return Err(ConfigError::invalid("implicit.tolerance", self.implicit.tolerance, "容差必须为正"));
        }
        if self.implicit.max_iterations == 0 {
            return Err(ConfigError::invalid("implicit.max_iterations", 0, "迭代次数必须为正"));
        }
        if self.implicit.krylov_dim == 0 {
            return Err(ConfigError::invalid("implicit.krylov_dim", 0, "Krylov 维数必须为正"));
        }
        if self.implicit.newton_iterations == 0 {
            return Err(ConfigError::invalid("implicit.newton_iterations", 0, "Newton 迭代次数必须为正"));
        }

        let mut ids = HashSet::new();
        for bc in &self.boundaries {
            if !ids.insert(bc.id) {
                return Err(ConfigError::invalid("boundaries.id", bc.id, "边界编号重复"));
            }
            if let Some(t) = bc.wall_temperature {
                if !(t > 0.0) {
                    return Err(ConfigError::invalid("boundaries.wall_temperature", t, "壁面温度必须为正"));
                }
            }
            if let Some(p) = bc.back_pressure {
                if !(p > 0.0) {
                    return Err(ConfigError::invalid("boundaries.back_pressure", p, "背压必须为正"));
                }
            }
            if let Some(fs) = &bc.freestream {
                if !(fs.rho > 0.0 && fs.pressure > 0.0) {
                    return Err(ConfigError::invalid(
                        "boundaries.freestream",
                        format!("rho={}, p={}", fs.rho, fs.pressure),
                        "来流密度和压力必须为正",
                    ));
                }
            }
        }
        for (side, id) in ["bottom", "right", "top", "left"].iter().zip(self.mesh.sides.iter()) {
            if !ids.contains(id) {
                return Err(ConfigError::Missing(format!("mesh.sides.{side} 引用的边界 {id}")));
            }
        }

        if let Some(wall) = self.analysis.wall_id {
            if !ids.contains(&wall) {
                return Err(ConfigError::Missing(format!("analysis.wall_id 引用的边界 {wall}")));
            }
            if self.analysis.freestream.is_none() {
                return Err(ConfigError::Missing("analysis.freestream".to_string()));
            }
        }
        if !(self.analysis.reference_length > 0.0) {
            return Err(ConfigError::invalid(
                "analysis.reference_length",
                self.analysis.reference_length,
                "参考长度必须为正",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CaseConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.numerics.flux, "hllc");
        assert_eq!(config.time.mode, TimeMode::Explicit);
    }

    #[test]
    fn test_invalid_cfl() {
        let mut config = CaseConfig::default();
        config.time.cfl = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_implicit_allows_large_cfl() {
        let mut config = CaseConfig::default();
        config.time.mode = TimeMode::Implicit;
        config.time.cfl = 50.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_side_boundary() {
        let mut config = CaseConfig::default();
        config.mesh.sides = [1, 2, 1, 1];
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_duplicate_boundary_id() {
        let mut config = CaseConfig::default();
        config.boundaries.push(BoundaryConfig::new(1, "outflow"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "numerics": { "flux": "roe" },
            "time": { "mode": "implicit", "cfl": 10.0 },
            "boundaries": [ { "id": 1, "kind": "wall" } ]
        }"#;
        let config = CaseConfig::from_json(json).unwrap();
        assert_eq!(config.numerics.flux, "roe");
        assert_eq!(config.numerics.order, 2);
        assert_eq!(config.time.mode, TimeMode::Implicit);
        assert_eq!(config.implicit.method, KrylovMethod::Gmres);
        assert_eq!(config.mesh.nx, 20);
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = CaseConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: CaseConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.numerics.limiter, config.numerics.limiter);
        assert_eq!(parsed.mesh.sides, config.mesh.sides);
    }

    #[test]
    fn test_boundary_parameters_survive_json() {
        let freestream = FreestreamConfig {
            rho: 1.0,
            mach: 0.8,
            alpha: 1.25,
            pressure: 1.0 / 1.4,
        };
        let mut config = CaseConfig::default();
        config.mesh.sides = [1, 2, 3, 2];
        config.boundaries = vec![
            BoundaryConfig::new(1, "wall").with_wall_temperature(1.2),
            BoundaryConfig::new(2, "farfield").with_freestream(freestream),
            BoundaryConfig::new(3, "pressure_outflow").with_back_pressure(0.6),
        ];
        assert!(config.validate().is_ok());

        let json = serde_json::to_string(&config).unwrap();
        let parsed = CaseConfig::from_json(&json).unwrap();
        assert_eq!(parsed.boundaries[0].wall_temperature, Some(1.2));
        assert_eq!(parsed.boundaries[1].freestream, Some(freestream));
        assert_eq!(parsed.boundaries[2].back_pressure, Some(0.6));
    }
}
