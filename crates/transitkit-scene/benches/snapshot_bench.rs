use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use transitkit_network::{TrackShape, World};
use transitkit_scene::{
    CameraModel, NetworkSnapshot, RecordingPainter, Renderer, SceneManager, SceneUpdater,
};

fn grid_network(n: usize) -> World {
    let mut world = World::new(4, 4);
    let step = 4000.0 / (n as f64 + 1.0);
    let mut previous = None;
    for i in 0..n {
        for j in 0..n {
            let x = step * (j as f64 + 1.0);
            let y = step * (i as f64 + 1.0);
            let v = world.add_vertex(x, y).unwrap();
            if let Some(p) = previous.filter(|_| j > 0) {
                world.add_track([p, v], TrackShape::Straight).unwrap();
            }
            previous = Some(v);
        }
    }
    world
}

fn bench_network_snapshot(c: &mut Criterion) {
    let world = grid_network(40);
    c.bench_function("network_snapshot_1600_vertices", |b| {
        b.iter(|| NetworkSnapshot::from_world(black_box(&world), 0.05))
    });
}

fn bench_render(c: &mut Criterion) {
    let world = grid_network(40);
    let scene = Arc::new(SceneManager::new());
    let mut updater = SceneUpdater::new(Arc::clone(&scene));
    let mut camera = CameraModel::new(1920, 1080).unwrap();
    camera.fit_world(&world);
    updater.set_camera(camera.snapshot());
    updater.update_world(&world);
    let renderer = Renderer::new(scene);
    c.bench_function("render_frame", |b| {
        b.iter(|| {
            let mut painter = RecordingPainter::new();
            renderer.render(&mut painter)
        })
    });
}

criterion_group!(benches, bench_network_snapshot, bench_render);
criterion_main!(benches);
