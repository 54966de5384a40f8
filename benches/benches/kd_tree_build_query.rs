// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::DVec3;
use understory_kd_tree::{
    BoundsKind, OrderDirection, PerspectiveCamera, PointCloud, SpatialTree, TreeConfig, Viewport,
    select_by,
};
use understory_polytope::{Aabb3, Axis, ConvexRegion};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_uniform_points(count: usize, size: f64) -> Vec<DVec3> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| {
            DVec3::new(
                rng.next_f64() * size,
                rng.next_f64() * size,
                rng.next_f64() * size,
            )
        })
        .collect()
}

fn gen_clustered_points(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<DVec3> {
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    for _ in 0..n_clusters {
        let c = DVec3::new(rng.next_f64(), rng.next_f64(), rng.next_f64()) * 1000.0;
        for _ in 0..per_cluster {
            let d = DVec3::new(rng.next_f64(), rng.next_f64(), rng.next_f64()) - 0.5;
            out.push(c + d * spread);
        }
    }
    out
}

/// Integer lattice with many repeated coordinates per axis.
fn gen_lattice_points(n: usize) -> Vec<DVec3> {
    let mut out = Vec::with_capacity(n * n * n);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                out.push(DVec3::new(x as f64, y as f64, z as f64));
            }
        }
    }
    out
}

fn built_tree(points: Vec<DVec3>, min_cells: usize) -> SpatialTree {
    let cloud = PointCloud::new(points);
    let mut tree = SpatialTree::with_config(TreeConfig {
        min_cells_per_region: min_cells,
        ..TreeConfig::default()
    });
    tree.build(&[&cloud]).expect("bench input builds");
    tree
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");
    for &n in &[1_000usize, 100_000] {
        let points = gen_uniform_points(n, 1000.0);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("median_n{}", n), |b| {
            b.iter_batched(
                || points.clone(),
                |mut pts| {
                    let m = pts.len() / 2;
                    select_by(&mut pts, m, |p| p.x);
                    black_box(pts[m]);
                },
                BatchSize::LargeInput,
            )
        });
        group.bench_function(format!("sort_baseline_n{}", n), |b| {
            b.iter_batched(
                || points.clone(),
                |mut pts| {
                    pts.sort_unstable_by(|a, b| a.x.total_cmp(&b.x));
                    black_box(pts[pts.len() / 2]);
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    let inputs = [
        ("uniform_100k", gen_uniform_points(100_000, 1000.0)),
        ("clustered_100k", gen_clustered_points(50, 2_000, 40.0)),
        ("lattice_46", gen_lattice_points(46)),
    ];
    for (name, points) in inputs {
        let cloud = PointCloud::new(points);
        group.throughput(Throughput::Elements(cloud.points().len() as u64));
        group.bench_function(name, |b| {
            b.iter_batched(
                || {
                    SpatialTree::with_config(TreeConfig {
                        min_cells_per_region: 256,
                        ..TreeConfig::default()
                    })
                },
                |mut tree| {
                    tree.build(&[&cloud]).expect("bench input builds");
                    black_box(tree.num_regions());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let tree = built_tree(gen_uniform_points(100_000, 1000.0), 128);

    let window = Aabb3::new(DVec3::splat(200.0), DVec3::splat(600.0));
    group.bench_function("regions_intersecting_box", |b| {
        b.iter(|| black_box(tree.regions_intersecting_box(&window, BoundsKind::Spatial).len()))
    });

    let mut rng = Rng::new(0xFACE_FEED_CAFE_BABE);
    let points: Vec<DVec3> = (0..1024)
        .map(|_| DVec3::new(rng.next_f64(), rng.next_f64(), rng.next_f64()) * 1000.0)
        .collect();
    group.bench_function("region_containing_point_1024", |b| {
        b.iter(|| {
            let mut acc = 0usize;
            for p in &points {
                acc = acc.wrapping_add(tree.region_containing_point(*p).unwrap_or(0));
            }
            black_box(acc);
        })
    });

    let tilted = ConvexRegion::from_polyhedron(
        &[
            DVec3::new(100.0, 100.0, 100.0),
            DVec3::new(900.0, 200.0, 150.0),
            DVec3::new(300.0, 900.0, 200.0),
            DVec3::new(400.0, 400.0, 900.0),
        ],
        &[vec![0, 2, 1], vec![0, 1, 3], vec![1, 2, 3], vec![0, 3, 2]],
    );
    group.bench_function("regions_intersecting_convex", |b| {
        b.iter(|| black_box(tree.regions_intersecting_convex(&tilted, BoundsKind::Spatial).len()))
    });

    let camera = PerspectiveCamera::look_at(
        DVec3::new(500.0, 500.0, -800.0),
        DVec3::splat(500.0),
        DVec3::Y,
    );
    let viewport = Viewport::new(-0.25, 0.25, -0.25, 0.25);
    group.bench_function("regions_intersecting_frustum", |b| {
        b.iter(|| {
            black_box(
                tree.regions_intersecting_frustum(&camera, &viewport, BoundsKind::Spatial)
                    .len(),
            )
        })
    });

    group.bench_function("depth_order_all", |b| {
        b.iter(|| {
            black_box(
                tree.depth_order_regions(None, &camera, OrderDirection::BackToFront)
                    .len(),
            )
        })
    });

    let half: Vec<usize> = (0..tree.num_regions()).step_by(2).collect();
    group.bench_function("min_convex_subregions_alternate", |b| {
        b.iter(|| black_box(tree.min_convex_subregions(&half, BoundsKind::Spatial).len()))
    });

    let slab = tree
        .bounds(BoundsKind::Spatial)
        .map(|r| r.with_max(Axis::X, 250.0))
        .unwrap_or(window);
    group.bench_function("regions_intersecting_slab", |b| {
        b.iter(|| black_box(tree.regions_intersecting_box(&slab, BoundsKind::Data).len()))
    });
    group.finish();
}

criterion_group!(benches, bench_select, bench_build, bench_queries);
criterion_main!(benches);
