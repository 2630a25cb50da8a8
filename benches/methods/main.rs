//! Benches every registered method on the same noise grid.
#![expect(
    missing_docs,
    reason = "Its a benchmark and cirterion macros don't add docs."
)]

use criterion::*;
use filterbench::{
    config::NoiseConfig,
    grid::{Dims, create_base_arrays},
    methods::{self, SetupContext},
    perlin::NoiseGenerator,
};

criterion_main!(benches);
criterion_group!(benches, all_methods);

const SIZE: Dims = Dims::new(512, 288);

fn all_methods(c: &mut Criterion) {
    let noise = NoiseGenerator::from_config(&NoiseConfig {
        octaves: 8,
        ..NoiseConfig::default()
    });
    let (source, mut destination) = create_base_arrays(SIZE, &noise);
    let ctx = SetupContext::new(SIZE);

    let mut group = c.benchmark_group("filter-and-scale");
    group.warm_up_time(core::time::Duration::from_millis(500));
    group.measurement_time(core::time::Duration::from_secs(4));
    group.throughput(Throughput::Elements(SIZE.cells() as u64));

    for def in methods::registry() {
        let mut method = def.instantiate();
        if let Err(err) = method.setup(&ctx) {
            panic!("{} failed to set up: {err}", def.id);
        }
        group.bench_function(def.id, |bencher| {
            bencher.iter(|| {
                method
                    .process(black_box(source.view()), destination.view_mut())
                    .map_err(|err| err.to_string())
            });
        });
    }
    group.finish();
}
