//! Regular elevation grid and the nearest-neighbor join.
//!
//! The DEM is a rectangular grid of elevation samples over ascending x/y
//! axes. Each mesh node takes the elevation of the nearest sample, with no
//! blending across cells, matching the coarse-grained source rasters. Nodes
//! outside the coverage extent take the nearest in-bounds sample (clamped
//! nearest neighbor), never a fabricated default.
//!
//! Exact midpoint ties resolve to the lower axis index so repeated joins
//! are bit-for-bit reproducible.

use std::fmt;

use log::{info, warn};

use super::ElevationError;
use crate::mesh::{MeshElevation, SurfaceMesh};

/// A regular grid of elevation samples.
///
/// Axes are strictly ascending after construction; descending input axes
/// (north-up rasters) are reversed together with their sample rows.
#[derive(Debug, Clone)]
pub struct ElevationGrid {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Row-major samples, `values[iy][ix]`
    values: Vec<Vec<f64>>,
}

impl ElevationGrid {
    /// Build a grid from axes and row-major samples.
    ///
    /// Either axis may arrive descending and is normalized here; anything
    /// non-monotonic is rejected.
    pub fn new(
        mut x: Vec<f64>,
        mut y: Vec<f64>,
        mut values: Vec<Vec<f64>>,
    ) -> Result<Self, ElevationError> {
        if x.is_empty() || y.is_empty() {
            return Err(ElevationError::Empty);
        }
        let n_values: usize = values.iter().map(|row| row.len()).sum();
        if values.len() != y.len() || values.iter().any(|row| row.len() != x.len()) {
            return Err(ElevationError::DimensionMismatch {
                n_values,
                n_x: x.len(),
                n_y: y.len(),
            });
        }

        if is_descending(&y) {
            y.reverse();
            values.reverse();
        }
        if is_descending(&x) {
            x.reverse();
            for row in &mut values {
                row.reverse();
            }
        }
        if !is_strictly_ascending(&x) {
            return Err(ElevationError::NonMonotonicAxis { axis: "x" });
        }
        if !is_strictly_ascending(&y) {
            return Err(ElevationError::NonMonotonicAxis { axis: "y" });
        }

        Ok(Self { x, y, values })
    }

    /// Grid dimensions `(n_x, n_y)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.x.len(), self.y.len())
    }

    /// Coverage extent `(min_x, min_y, max_x, max_y)`.
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        (
            self.x[0],
            self.y[0],
            *self.x.last().unwrap(),
            *self.y.last().unwrap(),
        )
    }

    /// Whether a coordinate lies inside the coverage extent.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (x0, y0, x1, y1) = self.extent();
        x >= x0 && x <= x1 && y >= y0 && y <= y1
    }

    /// Elevation of the sample nearest to `(x, y)`, clamped to the extent.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let ix = nearest_index(&self.x, x);
        let iy = nearest_index(&self.y, y);
        self.values[iy][ix]
    }

    /// Join this grid's elevations onto every node of a mesh.
    ///
    /// Node count and ordering are untouched; only z changes, and the mesh
    /// is marked [`MeshElevation::Resolved`]. Fails if no node at all lies
    /// inside the coverage extent: a raster that misses the whole mesh is
    /// a configuration problem, not something to clamp away silently.
    pub fn join(&self, mesh: &mut SurfaceMesh) -> Result<JoinReport, ElevationError> {
        let covered = mesh.nodes.iter().any(|n| self.contains(n.x, n.y));
        if !covered {
            let (rx0, ry0, rx1, ry1) = self.extent();
            let (mx0, my0, mx1, my1) = mesh.extent().unwrap_or((f64::NAN, f64::NAN, f64::NAN, f64::NAN));
            return Err(ElevationError::NoCoverage {
                raster_x0: rx0,
                raster_x1: rx1,
                raster_y0: ry0,
                raster_y1: ry1,
                mesh_x0: mx0,
                mesh_x1: mx1,
                mesh_y0: my0,
                mesh_y1: my1,
            });
        }

        let mut n_clamped = 0usize;
        let mut n_nodata = 0usize;
        let mut z_min = f64::INFINITY;
        let mut z_max = f64::NEG_INFINITY;

        for node in &mut mesh.nodes {
            if !self.contains(node.x, node.y) {
                n_clamped += 1;
            }
            let z = self.sample(node.x, node.y);
            if z.is_finite() {
                z_min = z_min.min(z);
                z_max = z_max.max(z);
            } else {
                n_nodata += 1;
            }
            node.z = z;
        }
        mesh.elevation = MeshElevation::Resolved;

        let report = JoinReport {
            n_nodes: mesh.n_nodes(),
            n_clamped,
            n_nodata,
            z_min,
            z_max,
        };
        if n_clamped > 0 {
            warn!(
                "{} of {} node coordinates fall outside the raster extent; \
                 nearest in-bounds samples used",
                n_clamped, report.n_nodes
            );
        }
        if n_nodata > 0 {
            warn!("{n_nodata} nodes received no-data elevation samples");
        }
        info!(
            "joined elevation onto {} nodes (range {:.1} to {:.1} m)",
            report.n_nodes, report.z_min, report.z_max
        );
        Ok(report)
    }
}

/// Summary of one elevation join.
#[derive(Debug, Clone, Copy)]
pub struct JoinReport {
    /// Number of nodes that received an elevation
    pub n_nodes: usize,
    /// Nodes outside the raster extent, clamped to the nearest edge sample
    pub n_clamped: usize,
    /// Nodes whose nearest sample was a no-data value
    pub n_nodata: usize,
    /// Minimum assigned elevation (finite samples only)
    pub z_min: f64,
    /// Maximum assigned elevation (finite samples only)
    pub z_max: f64,
}

impl fmt::Display for JoinReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Elevation join:")?;
        writeln!(f, "  Nodes: {}", self.n_nodes)?;
        writeln!(f, "  Clamped to extent: {}", self.n_clamped)?;
        writeln!(f, "  No-data samples: {}", self.n_nodata)?;
        write!(f, "  Elevation range: {:.1} to {:.1} m", self.z_min, self.z_max)
    }
}

/// Index of the axis sample nearest to `v`, clamped to the axis ends.
///
/// Ties at an exact midpoint pick the lower index.
fn nearest_index(axis: &[f64], v: f64) -> usize {
    let hi = axis.partition_point(|&a| a < v);
    if hi == 0 {
        return 0;
    }
    if hi == axis.len() {
        return axis.len() - 1;
    }
    let lo = hi - 1;
    if (v - axis[lo]) <= (axis[hi] - v) {
        lo
    } else {
        hi
    }
}

fn is_descending(axis: &[f64]) -> bool {
    axis.len() > 1 && axis[1] < axis[0]
}

fn is_strictly_ascending(axis: &[f64]) -> bool {
    axis.windows(2).all(|w| w[1] > w[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{MeshCounts, Node};

    /// 3x3 grid over [0,2]x[0,2] with distinct per-cell values 10*iy + ix.
    fn sample_grid() -> ElevationGrid {
        let x = vec![0.0, 1.0, 2.0];
        let y = vec![0.0, 1.0, 2.0];
        let values = (0..3)
            .map(|iy| (0..3).map(|ix| (10 * iy + ix) as f64).collect())
            .collect();
        ElevationGrid::new(x, y, values).unwrap()
    }

    fn mesh_with_nodes(coords: &[(f64, f64)]) -> SurfaceMesh {
        let nodes = coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Node { id: i + 1, flag: -1, x, y, z: 0.0 })
            .collect::<Vec<_>>();
        let counts = MeshCounts { n_nodes: nodes.len(), n_elements: 0, n_boundary: 0 };
        SurfaceMesh {
            nodes,
            cells: Vec::new(),
            boundary: Vec::new(),
            counts,
            elevation: MeshElevation::Unset,
        }
    }

    #[test]
    fn test_nearest_interior() {
        let grid = sample_grid();
        assert_eq!(grid.sample(0.1, 0.2), 0.0);
        assert_eq!(grid.sample(0.9, 0.2), 1.0);
        assert_eq!(grid.sample(1.8, 1.9), 22.0);
    }

    #[test]
    fn test_clamped_outside_extent() {
        let grid = sample_grid();
        assert_eq!(grid.sample(-5.0, -5.0), 0.0);
        assert_eq!(grid.sample(100.0, 0.0), 2.0);
        assert_eq!(grid.sample(1.0, 100.0), 21.0);
    }

    #[test]
    fn test_midpoint_tie_takes_lower_index() {
        let grid = sample_grid();
        // x = 0.5 is equidistant from samples 0 and 1.
        assert_eq!(grid.sample(0.5, 0.0), 0.0);
        assert_eq!(grid.sample(0.0, 0.5), 0.0);
        assert_eq!(grid.sample(1.5, 1.5), 11.0);
    }

    #[test]
    fn test_descending_axes_normalized() {
        let x = vec![2.0, 1.0, 0.0];
        let y = vec![2.0, 1.0, 0.0];
        let values: Vec<Vec<f64>> = (0..3)
            .map(|iy| (0..3).map(|ix| (10 * (2 - iy) + (2 - ix)) as f64).collect())
            .collect();
        let grid = ElevationGrid::new(x, y, values).unwrap();
        assert_eq!(grid.sample(0.0, 0.0), 0.0);
        assert_eq!(grid.sample(2.0, 0.0), 2.0);
        assert_eq!(grid.sample(1.0, 2.0), 21.0);
    }

    #[test]
    fn test_non_monotonic_axis_rejected() {
        let err = ElevationGrid::new(
            vec![0.0, 2.0, 1.0],
            vec![0.0, 1.0],
            vec![vec![0.0; 3]; 2],
        )
        .unwrap_err();
        assert!(matches!(err, ElevationError::NonMonotonicAxis { axis: "x" }));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = ElevationGrid::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![vec![0.0; 2]; 3])
            .unwrap_err();
        assert!(matches!(err, ElevationError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_join_assigns_every_node() {
        let grid = sample_grid();
        let mut mesh = mesh_with_nodes(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        let report = grid.join(&mut mesh).unwrap();

        assert_eq!(report.n_nodes, 3);
        assert_eq!(report.n_clamped, 0);
        assert_eq!(mesh.elevations(), vec![0.0, 1.0, 10.0]);
        assert_eq!(mesh.elevation, MeshElevation::Resolved);
    }

    #[test]
    fn test_join_clamps_edge_nodes() {
        let grid = sample_grid();
        let mut mesh = mesh_with_nodes(&[(1.0, 1.0), (10.0, 10.0)]);
        let report = grid.join(&mut mesh).unwrap();

        assert_eq!(report.n_clamped, 1);
        assert_eq!(mesh.nodes[1].z, 22.0);
    }

    #[test]
    fn test_join_preserves_order_and_count() {
        let grid = sample_grid();
        let coords = [(2.0, 0.0), (0.0, 2.0), (1.0, 1.0)];
        let mut mesh = mesh_with_nodes(&coords);
        grid.join(&mut mesh).unwrap();

        assert_eq!(mesh.n_nodes(), 3);
        let ids: Vec<usize> = mesh.nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_join_no_coverage() {
        let grid = sample_grid();
        let mut mesh = mesh_with_nodes(&[(50.0, 50.0), (60.0, 60.0)]);
        let err = grid.join(&mut mesh).unwrap_err();
        assert!(matches!(err, ElevationError::NoCoverage { .. }));
        // Nothing was assigned.
        assert_eq!(mesh.elevation, MeshElevation::Unset);
    }

    #[test]
    fn test_join_counts_nodata() {
        let x = vec![0.0, 1.0];
        let y = vec![0.0, 1.0];
        let values = vec![vec![5.0, f64::NAN], vec![7.0, 9.0]];
        let grid = ElevationGrid::new(x, y, values).unwrap();

        let mut mesh = mesh_with_nodes(&[(0.0, 0.0), (1.0, 0.0)]);
        let report = grid.join(&mut mesh).unwrap();
        assert_eq!(report.n_nodata, 1);
        assert!(mesh.nodes[1].z.is_nan());
    }
}
