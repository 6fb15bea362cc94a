use criterion::{black_box, criterion_group, criterion_main, Criterion};

use smb_rs::elevation::ElevationGrid;
use smb_rs::mesh::{MeshCounts, MeshElevation, Node, SurfaceMesh};

/// 1000x1000 raster over a 10 km square.
fn dem() -> ElevationGrid {
    let n = 1000usize;
    let axis: Vec<f64> = (0..n).map(|i| i as f64 * 10.0).collect();
    let values = (0..n)
        .map(|j| (0..n).map(|i| (i + j) as f64 * 0.1).collect())
        .collect();
    ElevationGrid::new(axis.clone(), axis, values).unwrap()
}

/// Scattered node cloud inside the raster extent.
fn mesh(n_nodes: usize) -> SurfaceMesh {
    let nodes = (0..n_nodes)
        .map(|i| Node {
            id: i + 1,
            flag: -1,
            x: (i as f64 * 37.3) % 9990.0,
            y: (i as f64 * 91.7) % 9990.0,
            z: 0.0,
        })
        .collect::<Vec<_>>();
    let counts = MeshCounts {
        n_nodes: nodes.len(),
        n_elements: 0,
        n_boundary: 0,
    };
    SurfaceMesh {
        nodes,
        cells: Vec::new(),
        boundary: Vec::new(),
        counts,
        elevation: MeshElevation::Unset,
    }
}

fn bench_elevation_join(c: &mut Criterion) {
    let dem = dem();
    let mut group = c.benchmark_group("elevation_join");

    for &n_nodes in &[1_000usize, 10_000, 100_000] {
        let template = mesh(n_nodes);
        group.bench_function(format!("{n_nodes}_nodes"), |b| {
            b.iter(|| {
                let mut mesh = template.clone();
                let report = dem.join(black_box(&mut mesh)).unwrap();
                black_box(report.n_nodes)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_elevation_join);
criterion_main!(benches);
