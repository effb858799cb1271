use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use noir_camera::bridge::{FrameBridge, FrameSlot, NoirFilter, PictureRequests};
use noir_camera::capture::{Dimensions, Frame, FrameConsumer};
use noir_camera::render::RenderSink;
use std::sync::Arc;

struct NoRedraw;

impl RenderSink for NoRedraw {
    fn redraw(&self) {}
}

struct NoPictures;

impl PictureRequests for NoPictures {
    fn is_taking_picture(&self) -> bool {
        false
    }

    fn picture_taken(&self, _image: Arc<Frame>) {}
}

fn bridge() -> (FrameBridge, Arc<FrameSlot>) {
    let slot = Arc::new(FrameSlot::new());
    let bridge = FrameBridge::new(
        NoirFilter::default(),
        Arc::clone(&slot),
        Arc::new(NoRedraw),
        Arc::new(NoPictures),
    );
    (bridge, slot)
}

fn bench_on_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("on_frame");

    for (width, height) in [(320, 240), (1280, 720), (1920, 1080)] {
        let dimensions = Dimensions::new(width, height);
        group.bench_with_input(
            BenchmarkId::from_parameter(dimensions),
            &dimensions,
            |b, &dimensions| {
                let (bridge, _slot) = bridge();
                let frame = Frame::filled(dimensions, [200, 120, 40], 0);
                b.iter(|| bridge.on_frame(black_box(frame.clone())));
            },
        );
    }
    group.finish();
}

fn bench_slot_store(c: &mut Criterion) {
    c.bench_function("slot_store_overwrite", |b| {
        let (_bridge, slot) = bridge();
        let frame = Arc::new(Frame::filled(Dimensions::new(4, 4), [0, 0, 0], 0));
        b.iter(|| slot.store(black_box(Arc::clone(&frame))));
    });

    c.bench_function("slot_take_for_render", |b| {
        let (_bridge, slot) = bridge();
        slot.store(Arc::new(Frame::filled(Dimensions::new(4, 4), [0, 0, 0], 0)));
        b.iter(|| black_box(slot.take_for_render()));
    });
}

criterion_group!(benches, bench_on_frame, bench_slot_store);
criterion_main!(benches);
