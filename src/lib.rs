//! Mesh unification layer for surface mass balance coupling.
//!
//! Simulation meshes arrive in three shapes: tabular raster grids with an
//! activity mask, native four-file Elmer meshes, and domain-decomposed
//! Elmer meshes with one sub-mesh per partition. This crate reads any of
//! them into a single [`mesh::SurfaceMesh`] model, resolves node elevations
//! from a raster DEM by clamped nearest neighbor when the source carries
//! none, and writes the result back out in Elmer's node file format.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use smb_rs::elevation::read_dem;
//! use smb_rs::io::{read_elmer_mesh, rewrite_with_elevation, WriteMode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut mesh = read_elmer_mesh(Path::new("glacier/mesh"))?;
//! let dem = read_dem(Path::new("glacier/surface.tif"))?;
//! let report = dem.join(&mut mesh)?;
//! println!("{report}");
//! rewrite_with_elevation(
//!     Path::new("glacier/mesh"),
//!     &mesh,
//!     &WriteMode::CopyTo("glacier/mesh_prepared".into()),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `netcdf`: NetCDF grid files and NetCDF DEMs (system libnetcdf).

pub mod elevation;
pub mod io;
pub mod mesh;
pub mod source;

pub use elevation::{read_dem, ElevationError, ElevationGrid, JoinReport};
pub use io::{
    read_elmer_mesh, read_elmer_partition, rewrite_partition_with_elevation,
    rewrite_with_elevation, write_elmer_nodes, ElmerError, ElmerMeshFiles, PartitionError,
    PartitionSet, WriteMode,
};
#[cfg(feature = "netcdf")]
pub use io::{read_grid, GridFileError};
pub use mesh::{Cell, GridError, MeshCounts, MeshElevation, Node, StructuredGrid, SurfaceMesh};
pub use source::{MeshSource, SourceError};
