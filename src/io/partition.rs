//! Partitioned mesh discovery and selection.
//!
//! A domain-decomposed Elmer mesh keeps one complete sub-mesh per partition
//! under `<root>/partitioning.<N>/part.<k>.{header,nodes,elements,boundary}`
//! for k = 1..N. The partition count is encoded in the directory name and
//! discovered by listing the mesh root. That is external, uncontrolled state, so
//! discovery returns a validated, immutable [`PartitionSet`] rather than
//! trusting the requested index.
//!
//! Partitions are never merged: in a parallel run each process owns exactly
//! one partition and any cross-partition exchange happens in the external
//! coupling transport, not here.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::io::elmer::{
    copy_dir_recursive, read_mesh_files, write_elmer_nodes, ElmerError, ElmerMeshFiles, WriteMode,
};
use crate::mesh::SurfaceMesh;

/// Error type for partition discovery and selection.
#[derive(Debug, Error)]
pub enum PartitionError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The mesh root is not a directory.
    #[error("{0}: not a mesh directory")]
    NotADirectory(PathBuf),

    /// No `partitioning.<N>` directory found.
    #[error("no partitioning.<N> directory found under {0}")]
    MissingPartitioning(PathBuf),

    /// More than one `partitioning.<N>` directory found.
    #[error("ambiguous partitioning under {root}: found {first} and {second}")]
    AmbiguousPartitioning {
        root: PathBuf,
        first: String,
        second: String,
    },

    /// The directory name does not encode a positive partition count.
    #[error("malformed partitioning directory name: {0}")]
    MalformedName(String),

    /// Requested partition index outside the discovered count.
    #[error("partition index {requested} out of range: valid partitions are 1..={n_parts}")]
    OutOfRange { requested: usize, n_parts: usize },

    /// A file of the selected partition is missing.
    #[error("missing partition file: {0}")]
    MissingFile(PathBuf),
}

/// A validated set of mesh partitions discovered on disk.
#[derive(Debug, Clone)]
pub struct PartitionSet {
    root: PathBuf,
    dir: PathBuf,
    n_parts: usize,
}

impl PartitionSet {
    /// Discover the partition set under a mesh root directory.
    ///
    /// Exactly one `partitioning.<N>` entry must exist; none, several, or a
    /// malformed name are configuration errors reported before any mesh
    /// file is opened.
    pub fn discover(root: &Path) -> Result<Self, PartitionError> {
        if !root.is_dir() {
            return Err(PartitionError::NotADirectory(root.to_path_buf()));
        }

        let mut found: Option<(String, usize)> = None;
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(suffix) = name.strip_prefix("partitioning.") else {
                continue;
            };

            let n_parts: usize = suffix
                .parse()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| PartitionError::MalformedName(name.clone()))?;

            if let Some((first, _)) = &found {
                return Err(PartitionError::AmbiguousPartitioning {
                    root: root.to_path_buf(),
                    first: first.clone(),
                    second: name,
                });
            }
            found = Some((name, n_parts));
        }

        let (name, n_parts) =
            found.ok_or_else(|| PartitionError::MissingPartitioning(root.to_path_buf()))?;

        Ok(Self {
            root: root.to_path_buf(),
            dir: root.join(name),
            n_parts,
        })
    }

    /// The mesh root this set was discovered under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `partitioning.<N>` directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of partitions N; valid indices are 1..=N.
    pub fn n_parts(&self) -> usize {
        self.n_parts
    }

    /// Resolve the file quadruplet of partition `part`.
    ///
    /// Validates the index against the discovered count and that all four
    /// files exist.
    pub fn part_files(&self, part: usize) -> Result<ElmerMeshFiles, PartitionError> {
        if part == 0 || part > self.n_parts {
            return Err(PartitionError::OutOfRange {
                requested: part,
                n_parts: self.n_parts,
            });
        }

        let files = ElmerMeshFiles::for_partition(&self.dir, part);
        for path in [&files.header, &files.nodes, &files.elements, &files.boundary] {
            if !path.is_file() {
                return Err(PartitionError::MissingFile(path.clone()));
            }
        }
        Ok(files)
    }
}

/// Read one partition of a partitioned Elmer mesh.
///
/// Delegates to the native mesh reader after partition discovery and
/// index validation.
pub fn read_elmer_partition(root: &Path, part: usize) -> Result<SurfaceMesh, ElmerError> {
    let set = PartitionSet::discover(root)?;
    let files = set.part_files(part)?;
    info!(
        "reading partition {part} of {} from {}",
        set.n_parts(),
        set.dir().display()
    );
    read_mesh_files(&files)
}

/// Persist one partition with updated elevations.
///
/// Only `part.<k>.nodes` is rewritten; every other file, including the
/// sibling partitions, stays byte-identical. In copy mode the whole mesh
/// root is duplicated first so the output is a complete, runnable mesh.
/// Returns the mesh root the partition was written under.
pub fn rewrite_partition_with_elevation(
    root: &Path,
    part: usize,
    mesh: &SurfaceMesh,
    mode: &WriteMode,
) -> Result<PathBuf, ElmerError> {
    let set = PartitionSet::discover(root)?;
    set.part_files(part)?;

    let dest_root = match mode {
        WriteMode::CopyTo(dest) => {
            if dest.exists() {
                return Err(ElmerError::DestinationExists(dest.clone()));
            }
            copy_dir_recursive(root, dest)?;
            dest.clone()
        }
        WriteMode::InPlace => root.to_path_buf(),
    };

    let nodes = dest_root
        .join(format!("partitioning.{}", set.n_parts()))
        .join(format!("part.{part}.nodes"));
    write_elmer_nodes(mesh, &nodes, true)?;
    info!(
        "rewrote {} nodes of partition {part} at {}",
        mesh.n_nodes(),
        nodes.display()
    );
    Ok(dest_root)
}
