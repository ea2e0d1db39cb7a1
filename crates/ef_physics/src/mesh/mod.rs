// crates/ef_physics/src/mesh/mod.rs

//! 网格抽象层
//!
//! 提供结构化和非结构化网格的统一接口，以及共用的有限体积网格存储。

pub mod fv_mesh;
pub mod structured;
pub mod topology;
pub mod unstructured;

pub use fv_mesh::{Cell, Face, FvMesh, MeshBuilder};
pub use structured::CartesianMesh;
pub use topology::{MeshGeometry, MeshKind, MeshTopology};
pub use unstructured::polygon_mesh;
