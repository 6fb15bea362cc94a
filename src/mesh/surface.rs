//! Unified surface mesh model.
//!
//! Every geometry reader produces a [`SurfaceMesh`]; the elevation join and
//! the mesh writer consume it. Nodes live in a stable, index-addressable
//! sequence with 1-based contiguous identifiers; readers preserve this
//! invariant and the writer never disturbs node count or ordering.

/// A single mesh node: 1-based identifier, planar coordinates, elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// Node identifier (1-based, contiguous)
    pub id: usize,
    /// Node type flag, round-tripped verbatim (-1 in Elmer meshes)
    pub flag: i32,
    /// x coordinate (m)
    pub x: f64,
    /// y coordinate (m)
    pub y: f64,
    /// Elevation (m); provisional until the elevation join has run
    pub z: f64,
}

/// An element record: identifier plus the node ids forming it.
///
/// Topology is opaque payload to this crate: parsed for downstream
/// consumers, never interpreted or re-derived here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Element identifier
    pub id: usize,
    /// Body identifier column
    pub body: i32,
    /// Element type code (303 = linear triangle)
    pub kind: i32,
    /// 1-based node ids
    pub nodes: Vec<usize>,
}

/// Counts declared by a mesh header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshCounts {
    /// Number of nodes
    pub n_nodes: usize,
    /// Number of bulk elements
    pub n_elements: usize,
    /// Number of boundary element records
    pub n_boundary: usize,
}

/// Where the current node elevations came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshElevation {
    /// No elevation assigned yet
    Unset,
    /// Elevation taken from the geometry source itself (z column / z array)
    Embedded,
    /// Elevation resolved from an external raster by the spatial join
    Resolved,
}

/// The unified mesh: nodes, opaque topology, header counts.
///
/// Constructed once per run from exactly one source format, optionally
/// mutated in place by the elevation join, then either handed to the
/// simulation core or serialized back to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMesh {
    /// Nodes in file order (id `i + 1` at index `i`)
    pub nodes: Vec<Node>,
    /// Bulk elements, opaque payload
    pub cells: Vec<Cell>,
    /// Raw boundary records, round-tripped untouched
    pub boundary: Vec<String>,
    /// Header counts; `counts.n_nodes == nodes.len()` always holds
    pub counts: MeshCounts,
    /// Provenance of the node elevations
    pub elevation: MeshElevation,
}

impl SurfaceMesh {
    /// Number of nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of bulk elements.
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Planar bounding extent `(min_x, min_y, max_x, max_y)` of the nodes.
    ///
    /// Returns `None` for an empty mesh.
    pub fn extent(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.nodes.first()?;
        let mut ext = (first.x, first.y, first.x, first.y);
        for node in &self.nodes[1..] {
            ext.0 = ext.0.min(node.x);
            ext.1 = ext.1.min(node.y);
            ext.2 = ext.2.max(node.x);
            ext.3 = ext.3.max(node.y);
        }
        Some(ext)
    }

    /// Elevation values in node order.
    pub fn elevations(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.z).collect()
    }
}
