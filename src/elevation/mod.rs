//! Raster elevation sources and the spatial join onto mesh nodes.
//!
//! Elevation either comes embedded in the geometry source or from an
//! independent raster DEM. This module loads the raster into a canonical
//! [`ElevationGrid`] and joins it onto mesh node coordinates by clamped
//! nearest neighbor:
//! - **GeoTIFF** via the pure Rust `tiff` crate (no system dependencies)
//! - **NetCDF** (`x`/`y` axes plus a `surface` variable) behind the
//!   `netcdf` feature
//!
//! Mesh and raster are assumed to share a projection; reprojection is
//! validated upstream.

mod geotiff;
mod grid;
#[cfg(feature = "netcdf")]
mod netcdf_dem;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use geotiff::{read_dem_geotiff, read_dem_geotiff_with_nodata};
pub use grid::{ElevationGrid, JoinReport};
#[cfg(feature = "netcdf")]
pub use netcdf_dem::read_dem_netcdf;

/// Error type for elevation loading and joining.
#[derive(Debug, Error)]
pub enum ElevationError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF decoding error
    #[error("TIFF error: {0}")]
    Tiff(String),

    /// NetCDF library error
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    /// Missing or invalid geotransform tags in a GeoTIFF.
    #[error("missing geotransform: {0}")]
    MissingGeotransform(String),

    /// A required variable is absent from a NetCDF DEM.
    #[error("missing variable: {0}")]
    MissingVariable(String),

    /// File extension matches no supported raster format.
    #[error("unrecognized raster format: {0}")]
    UnknownFormat(PathBuf),

    /// NetCDF rasters need the `netcdf` cargo feature.
    #[error("NetCDF support not enabled; rebuild with the `netcdf` feature to read {0}")]
    FeatureDisabled(PathBuf),

    /// The grid has no samples.
    #[error("elevation grid is empty")]
    Empty,

    /// An axis is not strictly monotonic.
    #[error("elevation grid {axis} axis is not strictly monotonic")]
    NonMonotonicAxis { axis: &'static str },

    /// Sample array shape disagrees with the axes.
    #[error("elevation grid has {n_values} values for {n_x}x{n_y} axes")]
    DimensionMismatch {
        n_values: usize,
        n_x: usize,
        n_y: usize,
    },

    /// No mesh node falls inside the raster extent.
    #[error(
        "raster covers no mesh node: raster extent x [{raster_x0:.1}, {raster_x1:.1}] \
         y [{raster_y0:.1}, {raster_y1:.1}], mesh extent x [{mesh_x0:.1}, {mesh_x1:.1}] \
         y [{mesh_y0:.1}, {mesh_y1:.1}]"
    )]
    NoCoverage {
        raster_x0: f64,
        raster_x1: f64,
        raster_y0: f64,
        raster_y1: f64,
        mesh_x0: f64,
        mesh_x1: f64,
        mesh_y0: f64,
        mesh_y1: f64,
    },
}

impl From<tiff::TiffError> for ElevationError {
    fn from(e: tiff::TiffError) -> Self {
        ElevationError::Tiff(e.to_string())
    }
}

/// Load a raster DEM, dispatching on the file extension.
///
/// `.tif`/`.tiff` decode as GeoTIFF; `.nc` as NetCDF when the `netcdf`
/// feature is enabled.
pub fn read_dem(path: &Path) -> Result<ElevationGrid, ElevationError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("tif") | Some("tiff") => read_dem_geotiff(path),
        Some("nc") => {
            #[cfg(feature = "netcdf")]
            {
                read_dem_netcdf(path)
            }
            #[cfg(not(feature = "netcdf"))]
            {
                Err(ElevationError::FeatureDisabled(path.to_path_buf()))
            }
        }
        _ => Err(ElevationError::UnknownFormat(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_format() {
        let err = read_dem(Path::new("dem.grd")).unwrap_err();
        assert!(matches!(err, ElevationError::UnknownFormat(_)));
    }

    #[cfg(not(feature = "netcdf"))]
    #[test]
    fn test_netcdf_requires_feature() {
        let err = read_dem(Path::new("dem.nc")).unwrap_err();
        assert!(matches!(err, ElevationError::FeatureDisabled(_)));
    }
}
