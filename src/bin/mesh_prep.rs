//! Mesh elevation preprocessing tool.
//!
//! Reads an Elmer mesh (or one partition of a decomposed mesh), resolves
//! node elevations from a raster DEM by clamped nearest neighbor, and
//! writes the mesh back out, either as a full copy next to the original
//! or by rewriting the node file in place.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use smb_rs::elevation::read_dem;
use smb_rs::io::{
    read_elmer_mesh, read_elmer_partition, rewrite_partition_with_elevation,
    rewrite_with_elevation, WriteMode,
};

#[derive(Parser)]
#[command(
    name = "mesh_prep",
    about = "Resolve Elmer mesh node elevations from a raster DEM"
)]
struct Cli {
    /// Elmer mesh directory (mesh.header, mesh.nodes, mesh.elements, mesh.boundary)
    mesh: PathBuf,

    /// Raster DEM (.tif/.tiff, or .nc with the netcdf feature)
    dem: PathBuf,

    /// Prepare one partition of a decomposed mesh (1-based index)
    #[arg(short, long)]
    part: Option<usize>,

    /// Write the prepared mesh as a copy to this directory
    #[arg(
        short,
        long,
        conflicts_with = "in_place",
        required_unless_present = "in_place"
    )]
    outpath: Option<PathBuf>,

    /// Rewrite the node file inside the input mesh directory
    #[arg(short, long)]
    in_place: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut mesh = match cli.part {
        Some(part) => read_elmer_partition(&cli.mesh, part).with_context(|| {
            format!("reading partition {part} from {}", cli.mesh.display())
        })?,
        None => read_elmer_mesh(&cli.mesh)
            .with_context(|| format!("reading mesh from {}", cli.mesh.display()))?,
    };
    println!(
        "mesh: {} nodes, {} elements",
        mesh.n_nodes(),
        mesh.counts.n_elements
    );

    let dem =
        read_dem(&cli.dem).with_context(|| format!("reading DEM from {}", cli.dem.display()))?;
    let report = dem
        .join(&mut mesh)
        .context("joining DEM elevations onto mesh nodes")?;
    println!("{report}");

    let mode = match cli.outpath {
        Some(dir) => WriteMode::CopyTo(dir),
        None => WriteMode::InPlace,
    };
    let written = match cli.part {
        Some(part) => rewrite_partition_with_elevation(&cli.mesh, part, &mesh, &mode),
        None => rewrite_with_elevation(&cli.mesh, &mesh, &mode),
    }
    .context("writing prepared mesh")?;
    println!("prepared mesh written to {}", written.display());

    Ok(())
}
