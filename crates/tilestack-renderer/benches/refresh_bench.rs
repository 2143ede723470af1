//! Full versus partial layer refresh.
//!
//! Run: `cargo bench --bench refresh_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tilestack_core::{Rgba, Sprite};
use tilestack_renderer::{MapSettings, RenderLayer};

/// A layer holding `count` 16×16 sprites on a 17 px grid, 32 per row.
fn grid_layer(count: usize) -> RenderLayer {
    let settings = MapSettings::default();
    let mut layer = RenderLayer::new(1, "bench", settings.logical_width(), settings.logical_height())
        .expect("bench layer");
    for i in 0..count {
        let (row, col) = (i / 32, i % 32);
        let x = col as f64 * 17.0 + 50.0;
        let y = row as f64 * 17.0 + 70.0;
        let color = Rgba::opaque(100 + col as u8, 100 + row as u8, 200);
        layer.add_sprite(Sprite::new(&format!("s_{x}_{y}")).with_rect(x, y, 16.0, 16.0).with_color(color));
    }
    layer.invalidate();
    layer.refresh();
    layer
}

fn bench_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("Layer Refresh");

    for count in [124, 496, 992] {
        group.bench_with_input(BenchmarkId::new("full", count), &count, |b, &count| {
            let mut layer = grid_layer(count);
            b.iter(|| {
                layer.invalidate();
                black_box(layer.refresh())
            });
        });

        group.bench_with_input(BenchmarkId::new("partial", count), &count, |b, &count| {
            let mut layer = grid_layer(count);
            let mut tick = 0usize;
            b.iter(|| {
                tick += 1;
                let index = tick % count;
                let rect = layer.source_sprites()[index].rect();
                if let Some(sprite) = layer.sprite_mut(index) {
                    sprite.color = sprite.color.with_rgb(tilestack_core::hsv_to_rgb(tick as f64, 100.0, 100.0));
                }
                layer.mark_dirty(rect);
                black_box(layer.refresh())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_refresh);
criterion_main!(benches);
