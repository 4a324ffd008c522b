use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use cartomark::{
    Entity, EngineConfig, MarkerEngine, MarkerPresenter, QuadTree, Result, ViewportBounds,
};
use std::time::{Duration, Instant};

struct Null;

impl MarkerPresenter for Null {
    type Handle = ();

    fn create_handle(&mut self) -> Result<()> {
        Ok(())
    }

    fn attach(&mut self, _handle: &mut (), _entity: &Entity) -> Result<()> {
        Ok(())
    }

    fn detach(&mut self, _handle: &mut (), _entity_id: &str) -> Result<()> {
        Ok(())
    }

    fn reset(&mut self, _handle: &mut ()) {}

    fn destroy(&mut self, _handle: ()) {}
}

fn grid(n: usize) -> Vec<Entity> {
    let side = (n as f64).sqrt().ceil() as usize;
    (0..n)
        .map(|i| {
            Entity::new(
                format!("e{}", i),
                -74.1 + (i % side) as f64 * (0.2 / side as f64),
                40.6 + (i / side) as f64 * (0.2 / side as f64),
            )
        })
        .collect()
}

fn benchmark_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for &n in &[1_000usize, 10_000] {
        let entities = grid(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &entities, |b, entities| {
            b.iter(|| QuadTree::from_entities(black_box(entities), 4, 0.01))
        });
    }

    group.finish();
}

fn benchmark_range_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_query");

    let entities = grid(10_000);
    let tree = QuadTree::from_entities(&entities, 4, 0.01).unwrap();
    let viewport = ViewportBounds::new(40.72, 40.70, -73.98, -74.00);

    group.bench_function("quadtree_10k", |b| {
        let rect = geo::Rect::new(
            geo::coord! { x: viewport.west, y: viewport.south },
            geo::coord! { x: viewport.east, y: viewport.north },
        );
        b.iter(|| tree.query(black_box(&rect)))
    });

    group.bench_function("linear_scan_10k", |b| {
        b.iter(|| {
            entities
                .iter()
                .filter(|e| viewport.contains(e.lng, e.lat))
                .count()
        })
    });

    group.finish();
}

fn benchmark_update_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_pass");

    let config = EngineConfig::default().with_update_cooldown(Duration::ZERO);
    let mut engine = MarkerEngine::with_config(Null, config);
    engine.set_entities(grid(10_000));

    let viewports = [
        ViewportBounds::new(40.72, 40.70, -73.98, -74.00),
        ViewportBounds::new(40.73, 40.71, -73.97, -73.99),
    ];

    group.bench_function("pan_10k_zoom16", |b| {
        let mut flip = 0usize;
        b.iter(|| {
            flip += 1;
            engine.report_viewport_change(viewports[flip % 2], 16.0);
            engine.on_frame(Instant::now()).unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_index_build,
    benchmark_range_query,
    benchmark_update_pass
);
criterion_main!(benches);
