use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::DMat4;
use vantage::camera::{OrbitManipulator, OrbitPose};
use vantage::input::{MouseButton, PointerEvent, PointerEventKind};
use vantage::picking::{decode_axis, decode_index, decode_normal, encode_unit};

fn orbit_drag_benchmark(c: &mut Criterion) {
    let down = PointerEvent::mouse(PointerEventKind::Down, MouseButton::Left, 0.0, 0.0);
    let drag = PointerEvent::mouse(PointerEventKind::Move, MouseButton::Left, 4.0, 2.0)
        .with_movement(4.0, 2.0);

    c.bench_function("orbit_drag_tick", |b| {
        let mut manip = OrbitManipulator::default();
        manip.set_viewport_size(1280.0, 720.0);
        let _ = manip.on_pointer(&down);
        let mut target = DMat4::IDENTITY;
        b.iter(|| {
            let _ = manip.on_pointer(black_box(&drag));
            black_box(manip.apply_to(&mut target))
        });
    });
}

fn release_decay_benchmark(c: &mut Criterion) {
    let down = PointerEvent::mouse(PointerEventKind::Down, MouseButton::Left, 0.0, 0.0);
    let flick = PointerEvent::mouse(PointerEventKind::Move, MouseButton::Left, 0.0, 0.0)
        .with_movement(5_000.0, 0.0);
    let up = PointerEvent::mouse(PointerEventKind::Up, MouseButton::Left, 0.0, 0.0);

    c.bench_function("release_until_rest", |b| {
        b.iter(|| {
            let mut manip = OrbitManipulator::default();
            let _ = manip.on_pointer(&down);
            let _ = manip.on_pointer(&flick);
            let _ = manip.on_pointer(&up);
            while manip.update() {}
            black_box(*manip.pose())
        });
    });
}

fn pose_roundtrip_benchmark(c: &mut Criterion) {
    let pose = OrbitPose::new(
        glam::DVec3::new(25.0, -40.0, 5.0),
        glam::DVec3::new(1.0, 2.0, 30.0),
    );
    c.bench_function("orbit_compose_decompose", |b| {
        b.iter(|| black_box(OrbitPose::from_matrix(&black_box(pose).to_matrix())));
    });
}

fn pick_decode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pick_decode");
    let index = [42, 7, 1, 255];
    let axis = encode_unit(0.3137);
    let normal = [128, 200, 64, 255];

    group.bench_function("index", |b| b.iter(|| black_box(decode_index(black_box(&index)))));
    group.bench_function("position", |b| {
        b.iter(|| {
            black_box([
                decode_axis(black_box(&axis), -100.0, 100.0),
                decode_axis(black_box(&axis), -100.0, 100.0),
                decode_axis(black_box(&axis), -100.0, 100.0),
            ])
        });
    });
    group.bench_function("normal", |b| b.iter(|| black_box(decode_normal(black_box(&normal)))));
    group.finish();
}

criterion_group!(
    benches,
    orbit_drag_benchmark,
    release_decay_benchmark,
    pose_roundtrip_benchmark,
    pick_decode_benchmark
);
criterion_main!(benches);
