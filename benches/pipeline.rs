use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use meshwork::math::{mat4::Mat4, vec3::Vec3};
use meshwork::normals::estimate_normals;
use meshwork::ply;
use meshwork::transform::TransformState;

/// An `n` x `n` grid of quads in the xz plane, as PLY text.
fn grid_ply(n: usize) -> String {
    let side = n + 1;
    let mut text = format!(
        "ply\nformat ascii 1.0\nelement vertex {}\nproperty float x\nproperty float y\n\
         property float z\nproperty uchar red\nproperty uchar green\nproperty uchar blue\n\
         element face {}\nproperty list uchar int vertex_indices\nend_header\n",
        side * side,
        n * n
    );
    for row in 0..side {
        for col in 0..side {
            let y = ((row * col) % 7) as f32 * 0.1;
            text.push_str(&format!("{col} {y} {row} 200 100 50\n"));
        }
    }
    for row in 0..n {
        for col in 0..n {
            let i = row * side + col;
            text.push_str(&format!("4 {} {} {} {}\n", i, i + side, i + side + 1, i + 1));
        }
    }
    text
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("ply_parse");

    for n in [10usize, 50, 100] {
        let text = grid_ply(n);
        group.bench_with_input(BenchmarkId::new("grid", n * n), &text, |b, text| {
            b.iter(|| ply::parse(black_box(text)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_normals(c: &mut Criterion) {
    let mesh = ply::parse(&grid_ply(100)).unwrap();

    c.bench_function("estimate_normals_20k_triangles", |b| {
        b.iter(|| estimate_normals(black_box(mesh.vertices()), black_box(mesh.indices())));
    });
}

fn benchmark_matrices(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrices");

    group.bench_function("compose_model", |b| {
        let mut t = TransformState::new();
        b.iter(|| {
            t.rotate(1.0, 0.5, 0.25)
                .translate(Vec3::new(0.01, 0.0, 0.0))
                .grow(0.001);
            black_box(t.model())
        });
    });

    let m = Mat4::rotation(30.0, 45.0, 60.0) * Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
    group.bench_function("inverse", |b| b.iter(|| black_box(m).inverse()));

    group.finish();
}

criterion_group!(benches, benchmark_parse, benchmark_normals, benchmark_matrices);
criterion_main!(benches);
