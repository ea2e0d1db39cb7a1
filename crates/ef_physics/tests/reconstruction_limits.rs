// tests/reconstruction_limits.rs

//! 限制器与 MUSCL 重构的有界性
//!
//! - 限制因子始终位于 [0, 1]
//! - Barth-Jespersen 重构面值不超出单元及其相邻单元的取值范围
//! - 线性场在内部单元无限制重构精确

use glam::DVec2;

use ef_config::GradientMethod;
use ef_physics::mesh::{CartesianMesh, FvMesh, MeshTopology};
use ef_physics::numerics::{
    BarthJespersen, FieldView, LimiterContext, LimiterKind, MusclConfig, MusclReconstructor, Reconstructor,
    SlopeLimiter, Venkatakrishnan,
};
use ef_physics::state::{Primitive, NVAR};

// ============================================================================
// 测试辅助函数
// ============================================================================

/// 线性同余伪随机序列，输出 [0, 1)
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next()
    }
}

fn random_context(rng: &mut Lcg) -> LimiterContext {
    let q = rng.range(0.5, 2.0);
    let lo = q - rng.range(0.0, 0.5);
    let hi = q + rng.range(0.0, 0.5);
    let delta = rng.range(-1.0, 1.0);
    LimiterContext::new(q, delta, lo, hi, rng.range(0.01, 0.2))
}

fn mesh() -> FvMesh {
    CartesianMesh::new(8, 8, DVec2::ZERO, DVec2::ONE).build().unwrap()
}

/// 零梯度幽灵状态
fn ghosts(mesh: &FvMesh, cells: &[Primitive]) -> Vec<Option<Primitive>> {
    (0..mesh.n_faces())
        .map(|f| mesh.face_neighbor(f).is_none().then(|| cells[mesh.face_owner(f)]))
        .collect()
}

/// 单元及其面相邻单元的逐分量极值
fn local_bounds(mesh: &FvMesh, cells: &[Primitive], cell: usize) -> ([f64; NVAR], [f64; NVAR]) {
    let mut lo = cells[cell].to_array();
    let mut hi = lo;
    for &face in mesh.cell_faces(cell) {
        let other = match mesh.face_neighbor(face) {
            Some(nb) if nb == cell => mesh.face_owner(face),
            Some(nb) => nb,
            None => continue,
        };
        let q = cells[other].to_array();
        for k in 0..NVAR {
            lo[k] = lo[k].min(q[k]);
            hi[k] = hi[k].max(q[k]);
        }
    }
    (lo, hi)
}

// ============================================================================
// 限制因子
// ============================================================================

#[test]
fn test_limiter_factors_are_in_unit_interval() {
    let mut rng = Lcg(42);
    let limiters: [Box<dyn SlopeLimiter>; 3] = [
        Box::new(BarthJespersen::new()),
        Box::new(Venkatakrishnan::new(0.3)),
        Box::new(Venkatakrishnan::new(5.0)),
    ];
    for _ in 0..2000 {
        let ctx = random_context(&mut rng);
        for limiter in &limiters {
            let alpha = limiter.compute_limiter(&ctx);
            assert!((0.0..=1.0).contains(&alpha), "{}: {alpha} for {ctx:?}", limiter.name());
        }
    }
}

#[test]
fn test_barth_jespersen_keeps_face_value_in_bounds() {
    let mut rng = Lcg(7);
    let limiter = BarthJespersen::new();
    for _ in 0..2000 {
        let ctx = random_context(&mut rng);
        let face = ctx.cell_value + limiter.compute_limiter(&ctx) * ctx.face_delta;
        assert!(face <= ctx.max_neighbor + 1e-12 && face >= ctx.min_neighbor - 1e-12, "{ctx:?}");
    }
}

// ============================================================================
// MUSCL 重构
// ============================================================================

#[test]
fn test_barth_jespersen_reconstruction_is_local_extremum_free() {
    let mesh = mesh();
    // 斜向台阶叠加光滑起伏
    let cells: Vec<Primitive> = (0..mesh.n_cells())
        .map(|i| {
            let c = mesh.cell_center(i);
            let step = if c.x + 0.5 * c.y > 0.6 { 1.0 } else { 0.2 };
            Primitive::new(step + 0.05 * (7.0 * c.y).sin(), 0.3 * c.x, -0.2 * c.y, 1.0 / step)
        })
        .collect();
    let ghosts = ghosts(&mesh, &cells);
    let view = FieldView::new(&mesh, &cells, &ghosts);

    for gradient in [GradientMethod::LeastSquares, GradientMethod::GreenGauss] {
        let mut muscl = MusclReconstructor::new(
            MusclConfig::default()
                .with_limiter(LimiterKind::BarthJespersen)
                .with_gradient(gradient),
        );
        muscl.prepare(&view);
        for cell in 0..mesh.n_cells() {
            let (lo, hi) = local_bounds(&mesh, &cells, cell);
            for &face in mesh.cell_faces(cell) {
                let q = muscl.extrapolate(&view, cell, face).to_array();
                for k in 0..NVAR {
                    assert!(
                        q[k] >= lo[k] - 1e-12 && q[k] <= hi[k] + 1e-12,
                        "{gradient:?} cell {cell} face {face} var {k}: {} not in [{}, {}]",
                        q[k],
                        lo[k],
                        hi[k]
                    );
                }
            }
        }
    }
}

#[test]
fn test_unlimited_reconstruction_is_exact_for_linear_field() {
    let mesh = mesh();
    let field = |x: DVec2| Primitive::new(1.0 + 0.5 * x.x - 0.25 * x.y, 0.2 * x.y, 0.1, 2.0 + x.x);
    let cells: Vec<Primitive> = (0..mesh.n_cells()).map(|i| field(mesh.cell_center(i))).collect();
    let ghosts = ghosts(&mesh, &cells);
    let view = FieldView::new(&mesh, &cells, &ghosts);

    let mut muscl = MusclReconstructor::new(MusclConfig::default().with_limiter(LimiterKind::None));
    muscl.prepare(&view);
    for face in 0..mesh.n_faces() {
        let Some(nb) = mesh.face_neighbor(face) else {
            continue;
        };
        let owner = mesh.face_owner(face);
        // 只检查两侧都不贴边界的面
        let interior = |c: usize| mesh.cell_faces(c).iter().all(|&f| mesh.face_neighbor(f).is_some());
        if !(interior(owner) && interior(nb)) {
            continue;
        }
        let expected = field(mesh.face_center(face)).to_array();
        for side in [owner, nb] {
            let q = muscl.extrapolate(&view, side, face).to_array();
            for k in 0..NVAR {
                assert!((q[k] - expected[k]).abs() < 1e-12, "face {face} cell {side} var {k}");
            }
        }
    }
}
