use criterion::{black_box, criterion_group, criterion_main, Criterion};
use transitkit_network::{TrackShape, World};

fn chain(len: usize) -> (World, Vec<i64>) {
    let mut world = World::new(10, 1);
    let ids: Vec<i64> = (0..len)
        .map(|i| world.add_vertex(10.0 + i as f64 * 9.0, 500.0).unwrap())
        .collect();
    for pair in ids.windows(2) {
        world.add_track([pair[0], pair[1]], TrackShape::Straight).unwrap();
    }
    (world, ids)
}

fn bench_move_vertex(c: &mut Criterion) {
    let (mut world, ids) = chain(1000);
    let middle = ids[ids.len() / 2];
    let mut offset = 0.0;
    c.bench_function("move_vertex", |b| {
        b.iter(|| {
            offset = if offset > 0.0 { 0.0 } else { 1.0 };
            let x = 10.0 + (ids.len() / 2) as f64 * 9.0;
            world
                .move_vertex(black_box(middle), x, 500.0 + offset)
                .unwrap();
        })
    });
}

fn bench_check_consistency(c: &mut Criterion) {
    let (world, _) = chain(1000);
    c.bench_function("check_consistency", |b| {
        b.iter(|| black_box(world.check_consistency().is_ok()))
    });
}

fn bench_flatten(c: &mut Criterion) {
    let (world, _) = chain(1000);
    c.bench_function("flatten_tracks", |b| {
        b.iter(|| {
            world
                .tracks()
                .map(|t| t.flatten(black_box(0.05)).len())
                .sum::<usize>()
        })
    });
}

criterion_group!(benches, bench_move_vertex, bench_check_consistency, bench_flatten);
criterion_main!(benches);
