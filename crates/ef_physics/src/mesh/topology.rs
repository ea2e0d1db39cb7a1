// crates/ef_physics/src/mesh/topology.rs

//! 网格拓扑抽象
//!
//! 提供结构化和非结构化网格的统一接口。
//!
//! 约定：
//! - 内部面法向从 owner（较小编号）指向 neighbor（较大编号）
//! - 边界面法向指向域外
//! - 周期面是内部面，`periodic_shift` 为从 owner 看 neighbor 中心所需的平移

use glam::DVec2;

/// 网格类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    /// 非结构化网格
    Unstructured,
    /// 结构化网格，单元编号 i + j * nx
    Structured {
        /// x 方向单元数
        nx: usize,
        /// y 方向单元数
        ny: usize,
    },
}

/// 网格拓扑 trait
pub trait MeshTopology: Send + Sync {
    // ========== 基本信息 ==========

    /// 单元数量
    fn n_cells(&self) -> usize;

    /// 面数量
    fn n_faces(&self) -> usize;

    /// 网格类型
    fn mesh_kind(&self) -> MeshKind;

    // ========== 几何数据 ==========

    /// 单元中心坐标
    fn cell_center(&self, cell: usize) -> DVec2;

    /// 单元面积
    fn cell_area(&self, cell: usize) -> f64;

    /// 面单位法向量
    fn face_normal(&self, face: usize) -> DVec2;

    /// 面长度
    fn face_length(&self, face: usize) -> f64;

    /// 面中心坐标（owner 坐标系）
    fn face_center(&self, face: usize) -> DVec2;

    // ========== 拓扑数据 ==========

    /// 面的 owner 单元
    fn face_owner(&self, face: usize) -> usize;

    /// 面的 neighbor 单元（边界面返回 None）
    fn face_neighbor(&self, face: usize) -> Option<usize>;

    /// 单元的所有面索引
    fn cell_faces(&self, cell: usize) -> &[usize];

    // ========== 边界信息 ==========

    /// 边界面的边界标签
    fn face_boundary(&self, face: usize) -> Option<u32>;

    /// 周期面平移量（非周期面为零）
    fn periodic_shift(&self, face: usize) -> DVec2;

    /// 网格上出现的全部边界标签（升序、去重）
    fn boundary_tags(&self) -> Vec<u32>;

    /// 是否为边界面
    fn is_boundary_face(&self, face: usize) -> bool {
        self.face_neighbor(face).is_none()
    }

    // ========== 派生几何 ==========

    /// 从 `cell` 一侧看到的面中心
    fn face_center_from(&self, face: usize, cell: usize) -> DVec2 {
        if cell == self.face_owner(face) {
            self.face_center(face)
        } else {
            self.face_center(face) - self.periodic_shift(face)
        }
    }

    /// 从 `cell` 一侧看的外法向
    fn outward_normal(&self, face: usize, cell: usize) -> DVec2 {
        if cell == self.face_owner(face) {
            self.face_normal(face)
        } else {
            -self.face_normal(face)
        }
    }

    /// 从 `cell` 一侧看到的相邻单元中心
    ///
    /// 边界面返回关于面的镜像点，作为虚拟单元中心。
    fn neighbor_center(&self, face: usize, cell: usize) -> DVec2 {
        let owner = self.face_owner(face);
        match self.face_neighbor(face) {
            Some(nb) if cell == owner => self.cell_center(nb) + self.periodic_shift(face),
            Some(_) => self.cell_center(owner) - self.periodic_shift(face),
            None => MeshGeometry::mirror_point(
                self.cell_center(cell),
                self.face_center(face),
                self.face_normal(face),
            ),
        }
    }

    /// 单元特征长度 sqrt(A)
    fn cell_length(&self, cell: usize) -> f64 {
        self.cell_area(cell).sqrt()
    }

    /// 所有单元面积
    fn cell_areas(&self) -> Vec<f64> {
        (0..self.n_cells()).map(|i| self.cell_area(i)).collect()
    }
}

/// 网格几何计算辅助函数
pub struct MeshGeometry;

impl MeshGeometry {
    /// 由线段起止点计算单位法向量（沿 a→b 右侧）
    #[inline]
    pub fn unit_normal(a: DVec2, b: DVec2) -> DVec2 {
        let d = b - a;
        let length = d.length();
        if length > f64::MIN_POSITIVE {
            DVec2::new(d.y, -d.x) / length
        } else {
            DVec2::ZERO
        }
    }

    /// 点关于直线（过 `face_center`，法向 `normal`）的镜像
    #[inline]
    pub fn mirror_point(point: DVec2, face_center: DVec2, normal: DVec2) -> DVec2 {
        point + 2.0 * (face_center - point).dot(normal) * normal
    }

    /// 多边形有向面积与形心（逆时针为正）
    pub fn polygon_area_centroid(vertices: &[DVec2]) -> (f64, DVec2) {
        let n = vertices.len();
        let mut area2 = 0.0;
        let mut centroid = DVec2::ZERO;
        for k in 0..n {
            let p = vertices[k];
            let q = vertices[(k + 1) % n];
            let cross = p.perp_dot(q);
            area2 += cross;
            centroid += (p + q) * cross;
        }
        if area2.abs() < f64::MIN_POSITIVE {
            let mean = vertices.iter().copied().sum::<DVec2>() / n.max(1) as f64;
            return (0.0, mean);
        }
        (0.5 * area2, centroid / (3.0 * area2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_normal_points_right() {
        let n = MeshGeometry::unit_normal(DVec2::ZERO, DVec2::new(1.0, 0.0));
        assert!((n - DVec2::new(0.0, -1.0)).length() < 1e-14);
    }

    #[test]
    fn test_mirror_point() {
        let m = MeshGeometry::mirror_point(DVec2::new(0.5, 0.5), DVec2::new(1.0, 0.3), DVec2::X);
        assert!((m - DVec2::new(1.5, 0.5)).length() < 1e-14);
    }

    #[test]
    fn test_polygon_area_centroid() {
        let square = [
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(2.0, 1.0),
            DVec2::new(0.0, 1.0),
        ];
        let (area, c) = MeshGeometry::polygon_area_centroid(&square);
        assert!((area - 2.0).abs() < 1e-14);
        assert!((c - DVec2::new(1.0, 0.5)).length() < 1e-14);

        let mut cw = square;
        cw.reverse();
        let (area, _) = MeshGeometry::polygon_area_centroid(&cw);
        assert!((area + 2.0).abs() < 1e-14);
    }
}
