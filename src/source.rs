//! Mesh source selection and dispatch.
//!
//! Exactly one geometry source drives a preprocessing run: a tabular raster
//! grid, a native Elmer mesh directory, or one partition of a decomposed
//! Elmer mesh. Selection is validated up front, before any file is opened,
//! so a misconfigured run fails with a configuration error rather than a
//! confusing I/O failure halfway through.

use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

#[cfg(feature = "netcdf")]
use crate::io::grid_netcdf::{read_grid, GridFileError};
use crate::io::{read_elmer_mesh, read_elmer_partition, ElmerError};
use crate::mesh::{GridError, SurfaceMesh};

/// Error type for source selection and reading.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No geometry source was configured.
    #[error("no mesh source selected: provide a grid file or an Elmer mesh directory")]
    NoSource,

    /// More than one geometry source was configured.
    #[error("multiple mesh sources selected: provide either a grid file or an Elmer mesh directory, not both")]
    MultipleSources,

    /// A partition index was given without an Elmer mesh directory.
    #[error("partition index given without an Elmer mesh directory")]
    PartitionWithoutMesh,

    /// Grid files need the `netcdf` cargo feature.
    #[error("grid input support not enabled; rebuild with the `netcdf` feature to read {0}")]
    FeatureDisabled(PathBuf),

    /// Elmer mesh reading failed.
    #[error(transparent)]
    Elmer(#[from] ElmerError),

    /// Grid flattening failed.
    #[error(transparent)]
    GridData(#[from] GridError),

    /// Grid file loading failed.
    #[cfg(feature = "netcdf")]
    #[error(transparent)]
    Grid(#[from] GridFileError),
}

/// A validated geometry source.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshSource {
    /// Tabular raster grid file with an activity mask.
    Grid(PathBuf),
    /// Native four-file Elmer mesh directory.
    Elmer(PathBuf),
    /// One partition of a domain-decomposed Elmer mesh.
    ElmerPartition { root: PathBuf, part: usize },
}

impl MeshSource {
    /// Resolve a source from the configured options.
    ///
    /// Exactly one of `grid` and `elmer` must be set; `part` only combines
    /// with `elmer`.
    pub fn select(
        grid: Option<&Path>,
        elmer: Option<&Path>,
        part: Option<usize>,
    ) -> Result<Self, SourceError> {
        match (grid, elmer, part) {
            (Some(_), Some(_), _) => Err(SourceError::MultipleSources),
            (None, None, _) => Err(SourceError::NoSource),
            (Some(_), None, Some(_)) => Err(SourceError::PartitionWithoutMesh),
            (Some(path), None, None) => Ok(MeshSource::Grid(path.to_path_buf())),
            (None, Some(root), Some(part)) => Ok(MeshSource::ElmerPartition {
                root: root.to_path_buf(),
                part,
            }),
            (None, Some(dir), None) => Ok(MeshSource::Elmer(dir.to_path_buf())),
        }
    }

    /// Read the selected source into a [`SurfaceMesh`].
    pub fn read(&self) -> Result<SurfaceMesh, SourceError> {
        match self {
            MeshSource::Grid(path) => {
                #[cfg(feature = "netcdf")]
                {
                    info!("mesh source: grid file {}", path.display());
                    Ok(read_grid(path)?.flatten()?)
                }
                #[cfg(not(feature = "netcdf"))]
                {
                    Err(SourceError::FeatureDisabled(path.clone()))
                }
            }
            MeshSource::Elmer(dir) => {
                info!("mesh source: Elmer mesh {}", dir.display());
                Ok(read_elmer_mesh(dir)?)
            }
            MeshSource::ElmerPartition { root, part } => {
                info!("mesh source: partition {part} of {}", root.display());
                Ok(read_elmer_partition(root, *part)?)
            }
        }
    }
}
