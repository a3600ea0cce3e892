// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect, Vec2};
use understory_canvas::{
    Canvas, CanvasConfig, CanvasTransform, FitOptions, FitParams, LayoutProbe, Modifiers,
    NoTarget, PointerInput, RenderEngine, WheelInput, ZoomLimits, fit_transform,
};

struct Fixed;

impl LayoutProbe for Fixed {
    type Node = ();

    fn viewport_bounds(&self) -> Option<Rect> {
        Some(Rect::new(0.0, 0.0, 1280.0, 800.0))
    }

    fn content_bounds(&self) -> Option<Rect> {
        Some(Rect::new(-4000.0, -3000.0, 4000.0, 3000.0))
    }

    fn node_bounds(&self, _: &()) -> Option<Rect> {
        None
    }
}

const NONE: Option<&NoTarget> = None;

fn mounted(observers: usize) -> Canvas<Fixed> {
    let mut canvas = Canvas::new(CanvasConfig::default(), Fixed, RenderEngine::Blink).unwrap();
    for _ in 0..observers {
        canvas.subscribe(|change| {
            black_box(change.current);
        });
    }
    assert!(canvas.mount(), "fixed viewport always mounts");
    canvas
}

fn bench_drag_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("canvas/drag_fanout");

    // Every drag frame notifies each observer synchronously.
    for observers in [1usize, 4, 16, 64] {
        group.throughput(Throughput::Elements(observers as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(observers),
            &observers,
            |b, &observers| {
                let mut canvas = mounted(observers);
                canvas.pointer_down(&PointerInput::primary(Point::ORIGIN), NONE);
                let mut x = 0.0;
                b.iter(|| {
                    x += 1.0;
                    black_box(canvas.pointer_move(&PointerInput::primary(Point::new(x, 0.0))));
                });
            },
        );
    }

    group.finish();
}

fn bench_wheel_zoom(c: &mut Criterion) {
    c.bench_function("canvas/wheel_zoom", |b| {
        let mut canvas = mounted(4);
        let mut flip = 1.0;
        b.iter(|| {
            flip = -flip;
            let wheel = WheelInput::pixels(Point::new(640.0, 400.0), Vec2::new(0.0, 40.0 * flip))
                .with_modifiers(Modifiers::CTRL);
            black_box(canvas.wheel(&wheel, NONE));
        });
    });
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("canvas/fit");

    group.bench_function("fit_transform", |b| {
        let container = Rect::new(0.0, 0.0, 1280.0, 800.0);
        let content = Rect::new(-4000.0, -3000.0, 4000.0, 3000.0);
        let params = FitParams {
            target_scale: None,
            max_auto_scale: 1.0,
            offset: Vec2::ZERO,
            disable_vertical_center: false,
        };
        b.iter(|| {
            black_box(fit_transform(
                black_box(container),
                black_box(content),
                CanvasTransform::IDENTITY,
                params,
                ZoomLimits::default(),
            ))
        });
    });

    group.bench_function("animated_fit", |b| {
        let mut canvas = mounted(4);
        let handle = canvas.handle();
        let mut now = 0.0;
        b.iter(|| {
            handle.fit_content_to_view(FitOptions::default());
            canvas.on_idle(now);
            while canvas.on_frame(now) {
                now += 16.0;
            }
            canvas.pinch(Point::new(640.0, 400.0), 1.5);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_drag_fanout, bench_wheel_zoom, bench_fit);
criterion_main!(benches);
