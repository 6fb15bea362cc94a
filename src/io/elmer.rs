//! Elmer mesh directory I/O.
//!
//! An Elmer mesh is a directory of four plain-text files:
//! - `mesh.header`: node/element/boundary counts (first line, 3 integers)
//! - `mesh.nodes`: `id flag x y z`, one node per line, 1-based contiguous ids
//! - `mesh.elements`: `id body type n1 n2 ...` bulk element topology
//! - `mesh.boundary`: boundary element definitions (opaque to this crate)
//!
//! Reading produces a [`SurfaceMesh`] with the z column as embedded
//! (provisional) elevation. Writing rewrites only the nodes file, preserving
//! header, elements, and boundary byte-for-byte, either into a fresh copy of
//! the mesh directory or in place.
//!
//! ## Example
//! ```no_run
//! use std::path::Path;
//! use smb_rs::io::elmer::read_elmer_mesh;
//!
//! let mesh = read_elmer_mesh(Path::new("MESH")).expect("failed to read mesh");
//! println!("{} nodes, {} elements", mesh.n_nodes(), mesh.n_cells());
//! ```

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::io::partition::PartitionError;
use crate::mesh::{Cell, MeshCounts, MeshElevation, Node, SurfaceMesh};

/// Error type for Elmer mesh I/O.
#[derive(Debug, Error)]
pub enum ElmerError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The mesh path is not a directory.
    #[error("{0}: not a mesh directory")]
    NotADirectory(PathBuf),

    /// One of the four mesh files is missing.
    #[error("missing mesh file: {0}")]
    MissingFile(PathBuf),

    /// Malformed file content.
    #[error("parse error in {file}:{line}: {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        message: String,
    },

    /// Header counts disagree with file contents.
    #[error("{file}: header declares {expected} {what}, found {found}")]
    CountMismatch {
        file: PathBuf,
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Node ids must be 1-based and contiguous in file order.
    #[error("{file}:{line}: node id {found} breaks contiguous ordering, expected {expected}")]
    NonContiguousId {
        file: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// An element references a node id outside the node sequence.
    #[error("{file}:{line}: element references unknown node id {node_id}")]
    UnknownNodeId {
        file: PathBuf,
        line: usize,
        node_id: usize,
    },

    /// Copy-mode destination already exists; refuse to overwrite.
    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// A node carries a NaN or infinite coordinate, which the fixed-layout
    /// node format cannot represent.
    #[error("node {node_id} has a non-finite coordinate; refusing to write {file}")]
    NonFiniteCoordinate { file: PathBuf, node_id: usize },

    /// Partition discovery or selection failed.
    #[error(transparent)]
    Partition(#[from] PartitionError),
}

/// The four files of one Elmer mesh (or one partition of one).
#[derive(Debug, Clone)]
pub struct ElmerMeshFiles {
    /// Header file (counts)
    pub header: PathBuf,
    /// Node file (id, flag, x, y, z)
    pub nodes: PathBuf,
    /// Element file (topology)
    pub elements: PathBuf,
    /// Boundary file (boundary element definitions)
    pub boundary: PathBuf,
}

impl ElmerMeshFiles {
    /// The `mesh.*` quadruplet inside a mesh directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            header: dir.join("mesh.header"),
            nodes: dir.join("mesh.nodes"),
            elements: dir.join("mesh.elements"),
            boundary: dir.join("mesh.boundary"),
        }
    }

    /// The `part.<k>.*` quadruplet inside a partitioning directory.
    pub fn for_partition(dir: &Path, part: usize) -> Self {
        Self {
            header: dir.join(format!("part.{part}.header")),
            nodes: dir.join(format!("part.{part}.nodes")),
            elements: dir.join(format!("part.{part}.elements")),
            boundary: dir.join(format!("part.{part}.boundary")),
        }
    }

    fn ensure_exist(&self) -> Result<(), ElmerError> {
        for path in [&self.header, &self.nodes, &self.elements, &self.boundary] {
            if !path.is_file() {
                return Err(ElmerError::MissingFile(path.clone()));
            }
        }
        Ok(())
    }
}

/// Read an Elmer mesh directory.
///
/// The z column is kept as embedded elevation; when an external raster is
/// also supplied, the elevation join overwrites it.
pub fn read_elmer_mesh(dir: &Path) -> Result<SurfaceMesh, ElmerError> {
    if !dir.is_dir() {
        return Err(ElmerError::NotADirectory(dir.to_path_buf()));
    }
    let files = ElmerMeshFiles::in_dir(dir);
    files.ensure_exist()?;
    read_mesh_files(&files)
}

/// Read a mesh from an explicit file quadruplet.
///
/// Used directly by the partitioned reader, which resolves `part.<k>.*`
/// paths before delegating here.
pub fn read_mesh_files(files: &ElmerMeshFiles) -> Result<SurfaceMesh, ElmerError> {
    files.ensure_exist()?;

    let counts = parse_header(&files.header)?;
    let nodes = parse_nodes(&files.nodes)?;
    if nodes.len() != counts.n_nodes {
        return Err(ElmerError::CountMismatch {
            file: files.nodes.clone(),
            what: "nodes",
            expected: counts.n_nodes,
            found: nodes.len(),
        });
    }

    let cells = parse_elements(&files.elements, counts.n_nodes)?;
    if cells.len() != counts.n_elements {
        return Err(ElmerError::CountMismatch {
            file: files.elements.clone(),
            what: "elements",
            expected: counts.n_elements,
            found: cells.len(),
        });
    }

    let boundary = read_boundary(&files.boundary, counts.n_boundary)?;

    info!(
        "read Elmer mesh from {}: {} nodes, {} elements, {} boundary records",
        files.header.display(),
        nodes.len(),
        cells.len(),
        boundary.len()
    );

    Ok(SurfaceMesh {
        nodes,
        cells,
        boundary,
        counts,
        elevation: MeshElevation::Embedded,
    })
}

/// Parse the header file.
///
/// Only the first line carries the counts; any further lines (per-type
/// element tallies) are ignored.
fn parse_header(path: &Path) -> Result<MeshCounts, ElmerError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut first = String::new();
    reader.read_line(&mut first)?;

    let fields: Vec<&str> = first.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(ElmerError::Parse {
            file: path.to_path_buf(),
            line: 1,
            message: format!(
                "header must have exactly 3 integer columns, found {}",
                fields.len()
            ),
        });
    }

    let mut counts = [0usize; 3];
    for (i, field) in fields.iter().enumerate() {
        counts[i] = field.parse().map_err(|_| ElmerError::Parse {
            file: path.to_path_buf(),
            line: 1,
            message: format!("invalid count: {field}"),
        })?;
    }

    Ok(MeshCounts {
        n_nodes: counts[0],
        n_elements: counts[1],
        n_boundary: counts[2],
    })
}

/// Parse the node file: `id flag x y z`, one node per line.
fn parse_nodes(path: &Path) -> Result<Vec<Node>, ElmerError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut nodes = Vec::new();

    for (line_no, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 5 {
            return Err(ElmerError::Parse {
                file: path.to_path_buf(),
                line: line_no + 1,
                message: format!("node line must have 5 columns, found {}", fields.len()),
            });
        }

        let id: usize = parse_field(fields[0], "node id", path, line_no + 1)?;
        let expected = nodes.len() + 1;
        if id != expected {
            return Err(ElmerError::NonContiguousId {
                file: path.to_path_buf(),
                line: line_no + 1,
                expected,
                found: id,
            });
        }

        let flag: i32 = parse_field(fields[1], "node flag", path, line_no + 1)?;
        let x: f64 = parse_field(fields[2], "x coordinate", path, line_no + 1)?;
        let y: f64 = parse_field(fields[3], "y coordinate", path, line_no + 1)?;
        let z: f64 = parse_field(fields[4], "z coordinate", path, line_no + 1)?;

        nodes.push(Node { id, flag, x, y, z });
    }

    Ok(nodes)
}

/// Parse the element file: `id body type n1 n2 n3 ...`.
///
/// Node ids are validated against the node sequence but the topology is
/// otherwise opaque.
fn parse_elements(path: &Path, n_nodes: usize) -> Result<Vec<Cell>, ElmerError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut cells = Vec::new();

    for (line_no, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 4 {
            return Err(ElmerError::Parse {
                file: path.to_path_buf(),
                line: line_no + 1,
                message: format!(
                    "element line must have at least 4 columns, found {}",
                    fields.len()
                ),
            });
        }

        let id: usize = parse_field(fields[0], "element id", path, line_no + 1)?;
        let body: i32 = parse_field(fields[1], "body id", path, line_no + 1)?;
        let kind: i32 = parse_field(fields[2], "element type", path, line_no + 1)?;

        let mut node_ids = Vec::with_capacity(fields.len() - 3);
        for field in &fields[3..] {
            let node_id: usize = parse_field(field, "node id", path, line_no + 1)?;
            if node_id == 0 || node_id > n_nodes {
                return Err(ElmerError::UnknownNodeId {
                    file: path.to_path_buf(),
                    line: line_no + 1,
                    node_id,
                });
            }
            node_ids.push(node_id);
        }

        cells.push(Cell {
            id,
            body,
            kind,
            nodes: node_ids,
        });
    }

    Ok(cells)
}

/// Read boundary records as raw lines; the content is opaque payload.
fn read_boundary(path: &Path, expected: usize) -> Result<Vec<String>, ElmerError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line_result in reader.lines() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(line);
    }

    if records.len() != expected {
        return Err(ElmerError::CountMismatch {
            file: path.to_path_buf(),
            what: "boundary records",
            expected,
            found: records.len(),
        });
    }

    Ok(records)
}

fn parse_field<T: std::str::FromStr>(
    field: &str,
    what: &str,
    path: &Path,
    line: usize,
) -> Result<T, ElmerError> {
    field.parse().map_err(|_| ElmerError::Parse {
        file: path.to_path_buf(),
        line,
        message: format!("invalid {what}: {field}"),
    })
}

// ============================================================================
// Writer
// ============================================================================

/// Output mode for the mesh rewriter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteMode {
    /// Duplicate the whole mesh directory to a new path, then rewrite only
    /// the nodes file there. Fails if the destination already exists.
    CopyTo(PathBuf),
    /// Rewrite the source nodes file directly. Destructive and irreversible;
    /// must be explicitly requested.
    InPlace,
}

/// Format a number in Fortran-style scientific notation.
///
/// Sign slot, 15-digit mantissa in [0.1, 1), two-digit signed exponent:
/// the layout Elmer's own writers produce, e.g. ` 0.123450000000000E+04`.
fn fortran_sci(value: f64) -> String {
    if value == 0.0 {
        return format!(" 0.{}E+00", "0".repeat(15));
    }
    let exp = value.abs().log10().floor() as i32 + 1;
    let mantissa = value / 10f64.powi(exp);
    let sign = if mantissa < 0.0 { '-' } else { ' ' };
    format!("{sign}{:.15}E{exp:+03}", mantissa.abs())
}

/// Write a nodes file for the given mesh.
///
/// One line per node in id order: `id flag  x y z` with Fortran-style
/// scientific coordinates, readable by any standard Elmer parser including
/// this crate's own. Non-finite coordinates (a no-data elevation sample
/// left as NaN, for instance) are rejected before the file is touched, so
/// an existing nodes file is never clobbered with unparseable output.
pub fn write_elmer_nodes(
    mesh: &SurfaceMesh,
    path: &Path,
    allow_overwrite: bool,
) -> Result<(), ElmerError> {
    if !allow_overwrite && path.exists() {
        return Err(ElmerError::DestinationExists(path.to_path_buf()));
    }
    for node in &mesh.nodes {
        if !(node.x.is_finite() && node.y.is_finite() && node.z.is_finite()) {
            return Err(ElmerError::NonFiniteCoordinate {
                file: path.to_path_buf(),
                node_id: node.id,
            });
        }
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for node in &mesh.nodes {
        writeln!(
            writer,
            "{} {}  {} {} {} ",
            node.id,
            node.flag,
            fortran_sci(node.x),
            fortran_sci(node.y),
            fortran_sci(node.z)
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Persist a mesh with updated elevations back to the Elmer layout.
///
/// Only the nodes file is rewritten; header, elements, and boundary stay
/// byte-identical to the source. Returns the directory the mesh was
/// written to.
pub fn rewrite_with_elevation(
    src_dir: &Path,
    mesh: &SurfaceMesh,
    mode: &WriteMode,
) -> Result<PathBuf, ElmerError> {
    if !src_dir.is_dir() {
        return Err(ElmerError::NotADirectory(src_dir.to_path_buf()));
    }

    let dest = match mode {
        WriteMode::CopyTo(dest) => {
            // Existence check before anything is written: the destination
            // must be fresh so unrelated data is never silently overwritten.
            if dest.exists() {
                return Err(ElmerError::DestinationExists(dest.clone()));
            }
            copy_dir_recursive(src_dir, dest)?;
            dest.clone()
        }
        WriteMode::InPlace => src_dir.to_path_buf(),
    };

    write_elmer_nodes(mesh, &dest.join("mesh.nodes"), true)?;
    info!(
        "rewrote {} nodes at {}",
        mesh.n_nodes(),
        dest.join("mesh.nodes").display()
    );
    Ok(dest)
}

pub(crate) fn copy_dir_recursive(src: &Path, dest: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
