//! Geometry source readers and the Elmer mesh writer.
//!
//! - [`elmer`]: native four-file Elmer mesh format, read and rewrite
//! - [`partition`]: domain-decomposed Elmer meshes (`partitioning.<N>`)
//! - [`grid_netcdf`]: tabular raster grids with an activity mask, behind
//!   the `netcdf` feature
//!
//! All readers produce the same [`crate::mesh::SurfaceMesh`] so downstream
//! stages never branch on where the geometry came from.

pub mod elmer;
#[cfg(feature = "netcdf")]
pub mod grid_netcdf;
pub mod partition;

pub use elmer::{
    read_elmer_mesh, rewrite_with_elevation, write_elmer_nodes, ElmerError, ElmerMeshFiles,
    WriteMode,
};
#[cfg(feature = "netcdf")]
pub use grid_netcdf::{read_grid, GridFileError};
pub use partition::{
    read_elmer_partition, rewrite_partition_with_elevation, PartitionError, PartitionSet,
};
