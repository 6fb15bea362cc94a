//! Tabular raster grid reader (requires the `netcdf` feature).
//!
//! Reads a structured surface grid with four 2D variables of identical
//! shape: coordinate fields `x` and `y`, elevation `z`, and an activity
//! `mask`. The arrays may come in either row or column orientation;
//! [`StructuredGrid::new`] normalizes them to ascending axes before the
//! mask is applied.

use std::path::Path;

use log::info;
use thiserror::Error;

use crate::mesh::{GridError, StructuredGrid};

/// Error type for grid file loading.
#[derive(Debug, Error)]
pub enum GridFileError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// NetCDF library error
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    /// A required variable is absent.
    #[error("missing variable `{name}` in {path}")]
    MissingVariable { name: String, path: String },

    /// The variable is not a 2D array.
    #[error("variable `{name}` is {n_dims}-dimensional, expected 2")]
    NotTwoDimensional { name: String, n_dims: usize },

    /// The arrays do not form a consistent grid.
    #[error("grid structure error: {0}")]
    Grid(#[from] GridError),
}

/// Read a structured grid from a NetCDF file.
pub fn read_grid(path: &Path) -> Result<StructuredGrid, GridFileError> {
    let file = netcdf::open(path)?;

    let x = read_field(&file, path, "x")?;
    let y = read_field(&file, path, "y")?;
    let z = read_field(&file, path, "z")?;
    let mask = read_field(&file, path, "mask")?;

    let grid = StructuredGrid::new(x, y, z, mask)?;
    let (nx, ny) = grid.dimensions();
    info!("read {nx}x{ny} structured grid from {}", path.display());
    Ok(grid)
}

/// Read one 2D variable as nested rows.
fn read_field(
    file: &netcdf::File,
    path: &Path,
    name: &str,
) -> Result<Vec<Vec<f64>>, GridFileError> {
    let var = file
        .variable(name)
        .ok_or_else(|| GridFileError::MissingVariable {
            name: name.to_string(),
            path: path.display().to_string(),
        })?;

    let dims = var.dimensions();
    if dims.len() != 2 {
        return Err(GridFileError::NotTwoDimensional {
            name: name.to_string(),
            n_dims: dims.len(),
        });
    }
    let n_cols = dims[1].len();

    let flat = var.get_values::<f64, _>(..)?;
    Ok(flat.chunks(n_cols).map(|row| row.to_vec()).collect())
}
