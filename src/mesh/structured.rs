//! Masked structured-grid geometry.
//!
//! The tabular-raster mesh source is a rectangular grid of coordinate arrays
//! with a matching glacier mask and elevation array. Flattening follows
//! row-major raster scan order and drops masked-out cells, so node numbering
//! is deterministic and re-runs are reproducible.
//!
//! Grid orientation is normalized at construction (south-to-north rows,
//! west-to-east columns); flipped inputs therefore flatten to identical
//! node lists.

use thiserror::Error;

use super::surface::{MeshCounts, MeshElevation, Node, SurfaceMesh};

/// Error type for structured-grid geometry.
#[derive(Debug, Error)]
pub enum GridError {
    /// A grid field is not rectangular.
    #[error("grid field {name} is not rectangular: row {row} has {found} columns, expected {expected}")]
    Ragged {
        name: &'static str,
        row: usize,
        found: usize,
        expected: usize,
    },

    /// Grid fields disagree on dimensions.
    #[error("grid field {name} has dimensions {found_rows}x{found_cols}, expected {rows}x{cols}")]
    DimensionMismatch {
        name: &'static str,
        found_rows: usize,
        found_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// The grid has no rows or no columns.
    #[error("grid is empty")]
    Empty,

    /// Every cell is masked out.
    #[error("grid mask selects no active cells")]
    EmptyMask,
}

/// A rectangular grid of coordinates, elevation, and an active-cell mask.
///
/// Rows run south to north and columns west to east after construction.
#[derive(Debug, Clone)]
pub struct StructuredGrid {
    x: Vec<Vec<f64>>,
    y: Vec<Vec<f64>>,
    z: Vec<Vec<f64>>,
    mask: Vec<Vec<f64>>,
    n_rows: usize,
    n_cols: usize,
}

impl StructuredGrid {
    /// Build a grid from its four 2D fields, validating shape and
    /// normalizing orientation.
    pub fn new(
        x: Vec<Vec<f64>>,
        y: Vec<Vec<f64>>,
        z: Vec<Vec<f64>>,
        mask: Vec<Vec<f64>>,
    ) -> Result<Self, GridError> {
        let n_rows = x.len();
        let n_cols = x.first().map_or(0, |row| row.len());
        if n_rows == 0 || n_cols == 0 {
            return Err(GridError::Empty);
        }

        check_rectangular("x", &x, n_cols)?;
        for (name, field) in [("y", &y), ("z", &z), ("mask", &mask)] {
            if field.len() != n_rows || field.first().map_or(0, |row| row.len()) != n_cols {
                return Err(GridError::DimensionMismatch {
                    name,
                    found_rows: field.len(),
                    found_cols: field.first().map_or(0, |row| row.len()),
                    rows: n_rows,
                    cols: n_cols,
                });
            }
            check_rectangular(name, field, n_cols)?;
        }

        let mut grid = Self { x, y, z, mask, n_rows, n_cols };
        grid.normalize_orientation();
        Ok(grid)
    }

    /// Grid dimensions `(n_rows, n_cols)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Number of active (unmasked) cells.
    pub fn n_active(&self) -> usize {
        self.mask
            .iter()
            .flatten()
            .filter(|&&m| is_active(m))
            .count()
    }

    /// Flip rows/columns so y increases down the rows and x across the
    /// columns, keeping all four fields aligned.
    fn normalize_orientation(&mut self) {
        if self.n_rows > 1 && self.y[1][0] < self.y[0][0] {
            self.x.reverse();
            self.y.reverse();
            self.z.reverse();
            self.mask.reverse();
        }
        if self.n_cols > 1 && self.x[0][1] < self.x[0][0] {
            for field in [&mut self.x, &mut self.y, &mut self.z, &mut self.mask] {
                for row in field.iter_mut() {
                    row.reverse();
                }
            }
        }
    }

    /// Flatten the grid into a [`SurfaceMesh`].
    ///
    /// Active cells become nodes in row-major scan order with contiguous
    /// 1-based ids; masked-out cells are dropped. The grid carries no
    /// topology, so the mesh has no cells or boundary records. Elevation
    /// comes from the z array and is marked [`MeshElevation::Embedded`].
    pub fn flatten(&self) -> Result<SurfaceMesh, GridError> {
        let mut nodes = Vec::with_capacity(self.n_active());
        for row in 0..self.n_rows {
            for col in 0..self.n_cols {
                if !is_active(self.mask[row][col]) {
                    continue;
                }
                nodes.push(Node {
                    id: nodes.len() + 1,
                    flag: -1,
                    x: self.x[row][col],
                    y: self.y[row][col],
                    z: self.z[row][col],
                });
            }
        }

        if nodes.is_empty() {
            return Err(GridError::EmptyMask);
        }

        let counts = MeshCounts {
            n_nodes: nodes.len(),
            n_elements: 0,
            n_boundary: 0,
        };
        Ok(SurfaceMesh {
            nodes,
            cells: Vec::new(),
            boundary: Vec::new(),
            counts,
            elevation: MeshElevation::Embedded,
        })
    }
}

/// Any mask value above 0.5 marks a cell active; 0/1 masks read as
/// inactive/active and float noise around those values is tolerated.
#[inline]
fn is_active(mask: f64) -> bool {
    mask > 0.5
}

fn check_rectangular(
    name: &'static str,
    field: &[Vec<f64>],
    n_cols: usize,
) -> Result<(), GridError> {
    for (row, values) in field.iter().enumerate() {
        if values.len() != n_cols {
            return Err(GridError::Ragged {
                name,
                row,
                found: values.len(),
                expected: n_cols,
            });
        }
    }
    Ok(())
}
