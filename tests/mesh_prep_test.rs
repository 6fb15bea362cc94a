//! End-to-end preprocessing flow: read an Elmer mesh, resolve elevations
//! from a raster, and write the prepared mesh back out.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use smb_rs::elevation::ElevationGrid;
use smb_rs::io::{read_elmer_mesh, read_elmer_partition, rewrite_with_elevation, WriteMode};
use smb_rs::mesh::MeshElevation;
use smb_rs::{ElmerError, PartitionError};

/// Three-node triangle mesh on the unit corner, elevations unset (z = 0).
fn write_mesh(dir: &Path) {
    fs::write(dir.join("mesh.header"), "3 1 3\n303 1\n").unwrap();
    fs::write(
        dir.join("mesh.nodes"),
        "1 -1 0.0 0.0 0.0\n\
         2 -1 1.0 0.0 0.0\n\
         3 -1 0.0 1.0 0.0\n",
    )
    .unwrap();
    fs::write(dir.join("mesh.elements"), "1 1 303 1 2 3\n").unwrap();
    fs::write(
        dir.join("mesh.boundary"),
        "1 1 1 0 202 1 2\n\
         2 2 1 0 202 2 3\n\
         3 3 1 0 202 3 1\n",
    )
    .unwrap();
}

/// 2x2 raster sampling to 10 at (0,0), 20 at (1,0), 30 at (0,1).
fn raster() -> ElevationGrid {
    ElevationGrid::new(
        vec![0.0, 1.0],
        vec![0.0, 1.0],
        vec![vec![10.0, 20.0], vec![30.0, 40.0]],
    )
    .unwrap()
}

#[test]
fn test_copy_mode_flow() {
    let tmp = TempDir::new().unwrap();
    let mesh_dir = tmp.path().join("mesh");
    fs::create_dir(&mesh_dir).unwrap();
    write_mesh(&mesh_dir);
    let original_nodes = fs::read_to_string(mesh_dir.join("mesh.nodes")).unwrap();

    let mut mesh = read_elmer_mesh(&mesh_dir).unwrap();
    let report = raster().join(&mut mesh).unwrap();
    assert_eq!(report.n_nodes, 3);
    assert_eq!(report.n_clamped, 0);
    assert_eq!(mesh.elevation, MeshElevation::Resolved);

    let out_dir = tmp.path().join("prepared");
    let written =
        rewrite_with_elevation(&mesh_dir, &mesh, &WriteMode::CopyTo(out_dir.clone())).unwrap();
    assert_eq!(written, out_dir);

    // The copy carries the resolved elevations and parses back cleanly.
    let reread = read_elmer_mesh(&out_dir).unwrap();
    let zs: Vec<f64> = reread.nodes.iter().map(|n| n.z).collect();
    assert_eq!(zs, vec![10.0, 20.0, 30.0]);

    // Untouched files are byte-identical to the source.
    for name in ["mesh.header", "mesh.elements", "mesh.boundary"] {
        assert_eq!(
            fs::read(mesh_dir.join(name)).unwrap(),
            fs::read(out_dir.join(name)).unwrap(),
            "{name} changed during copy"
        );
    }

    // The source mesh itself is not modified in copy mode.
    assert_eq!(
        fs::read_to_string(mesh_dir.join("mesh.nodes")).unwrap(),
        original_nodes
    );
}

#[test]
fn test_in_place_flow() {
    let tmp = TempDir::new().unwrap();
    write_mesh(tmp.path());

    let mut mesh = read_elmer_mesh(tmp.path()).unwrap();
    raster().join(&mut mesh).unwrap();
    rewrite_with_elevation(tmp.path(), &mesh, &WriteMode::InPlace).unwrap();

    let reread = read_elmer_mesh(tmp.path()).unwrap();
    let zs: Vec<f64> = reread.nodes.iter().map(|n| n.z).collect();
    assert_eq!(zs, vec![10.0, 20.0, 30.0]);
}

#[test]
fn test_copy_refuses_existing_destination() {
    let tmp = TempDir::new().unwrap();
    let mesh_dir = tmp.path().join("mesh");
    fs::create_dir(&mesh_dir).unwrap();
    write_mesh(&mesh_dir);

    let out_dir = tmp.path().join("prepared");
    fs::create_dir(&out_dir).unwrap();
    fs::write(out_dir.join("keep.txt"), "precious").unwrap();

    let mesh = read_elmer_mesh(&mesh_dir).unwrap();
    let err =
        rewrite_with_elevation(&mesh_dir, &mesh, &WriteMode::CopyTo(out_dir.clone())).unwrap_err();
    assert!(matches!(err, ElmerError::DestinationExists(_)));

    // Nothing was written into the existing directory.
    assert_eq!(fs::read_to_string(out_dir.join("keep.txt")).unwrap(), "precious");
    assert!(!out_dir.join("mesh.nodes").exists());
}

#[test]
fn test_clamped_join_outside_raster() {
    let tmp = TempDir::new().unwrap();
    write_mesh(tmp.path());

    // Raster shifted so node (1, 0) sits outside and clamps to the edge.
    let dem = ElevationGrid::new(
        vec![0.0, 0.5],
        vec![0.0, 1.0],
        vec![vec![10.0, 20.0], vec![30.0, 40.0]],
    )
    .unwrap();

    let mut mesh = read_elmer_mesh(tmp.path()).unwrap();
    let report = dem.join(&mut mesh).unwrap();
    assert_eq!(report.n_clamped, 1);
    assert_eq!(mesh.nodes[1].z, 20.0);
}

#[test]
fn test_nodata_elevation_blocks_write() {
    let tmp = TempDir::new().unwrap();
    write_mesh(tmp.path());

    // Node (1, 0) lands on the no-data cell and keeps NaN after the join.
    let dem = ElevationGrid::new(
        vec![0.0, 1.0],
        vec![0.0, 1.0],
        vec![vec![10.0, f64::NAN], vec![30.0, 40.0]],
    )
    .unwrap();

    let mut mesh = read_elmer_mesh(tmp.path()).unwrap();
    let report = dem.join(&mut mesh).unwrap();
    assert_eq!(report.n_nodata, 1);

    let err = rewrite_with_elevation(tmp.path(), &mesh, &WriteMode::InPlace).unwrap_err();
    assert!(matches!(
        err,
        ElmerError::NonFiniteCoordinate { node_id: 2, .. }
    ));

    // The mesh on disk is still valid.
    let reread = read_elmer_mesh(tmp.path()).unwrap();
    assert_eq!(reread.n_nodes(), 3);
}

#[test]
fn test_partition_flow() {
    let tmp = TempDir::new().unwrap();
    let part_dir = tmp.path().join("partitioning.2");
    fs::create_dir(&part_dir).unwrap();
    for part in 1..=2 {
        fs::write(part_dir.join(format!("part.{part}.header")), "2 1 1\n").unwrap();
        fs::write(
            part_dir.join(format!("part.{part}.nodes")),
            "1 -1 0.0 0.0 0.0\n2 -1 1.0 0.0 0.0\n",
        )
        .unwrap();
        fs::write(part_dir.join(format!("part.{part}.elements")), "1 1 202 1 2\n").unwrap();
        fs::write(part_dir.join(format!("part.{part}.boundary")), "1 1 1 0 101 1\n").unwrap();
    }

    let mut mesh = read_elmer_partition(tmp.path(), 1).unwrap();
    assert_eq!(mesh.n_nodes(), 2);

    let report = raster().join(&mut mesh).unwrap();
    assert_eq!(report.n_nodes, 2);
    assert_eq!(mesh.nodes[0].z, 10.0);
    assert_eq!(mesh.nodes[1].z, 20.0);

    let err = read_elmer_partition(tmp.path(), 3).unwrap_err();
    assert!(matches!(
        err,
        ElmerError::Partition(PartitionError::OutOfRange {
            requested: 3,
            n_parts: 2
        })
    ));
}
