//! Mesh representation.
//!
//! Provides the canonical mesh data structures:
//! - Unified surface mesh (nodes, opaque topology, header counts)
//! - Masked structured-grid geometry for tabular-raster sources

mod structured;
mod surface;

pub use structured::{GridError, StructuredGrid};
pub use surface::{Cell, MeshCounts, MeshElevation, Node, SurfaceMesh};
