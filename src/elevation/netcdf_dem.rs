//! NetCDF DEM reader (requires the `netcdf` feature).
//!
//! Expects 1D coordinate variables `x` and `y` and a 2D elevation variable
//! dimensioned `(y, x)`. The elevation variable is found by name among the
//! usual candidates (`surface`, `zs`, `z`).

use std::path::Path;

use log::info;

use super::grid::ElevationGrid;
use super::ElevationError;

const SURFACE_CANDIDATES: &[&str] = &["surface", "zs", "z"];

/// Load an elevation grid from a NetCDF DEM.
pub fn read_dem_netcdf(path: &Path) -> Result<ElevationGrid, ElevationError> {
    let file = netcdf::open(path)?;

    let x = read_axis(&file, "x")?;
    let y = read_axis(&file, "y")?;

    let surface = SURFACE_CANDIDATES
        .iter()
        .find_map(|name| file.variable(name))
        .ok_or_else(|| {
            ElevationError::MissingVariable(format!(
                "no elevation variable (tried {}) in {}",
                SURFACE_CANDIDATES.join(", "),
                path.display()
            ))
        })?;

    let flat = surface.get_values::<f64, _>(..)?;
    if flat.len() != x.len() * y.len() {
        return Err(ElevationError::DimensionMismatch {
            n_values: flat.len(),
            n_x: x.len(),
            n_y: y.len(),
        });
    }

    let values = flat.chunks(x.len()).map(|row| row.to_vec()).collect();

    info!(
        "read {}x{} NetCDF DEM from {}",
        x.len(),
        y.len(),
        path.display()
    );
    ElevationGrid::new(x, y, values)
}

fn read_axis(file: &netcdf::File, name: &str) -> Result<Vec<f64>, ElevationError> {
    let var = file
        .variable(name)
        .ok_or_else(|| ElevationError::MissingVariable(name.to_string()))?;
    Ok(var.get_values::<f64, _>(..)?)
}
