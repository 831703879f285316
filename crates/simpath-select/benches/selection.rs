use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use simpath_core::SelectionConfig;
use simpath_select::{VertexCoverPartition, celf_select, greedy_select};

#[path = "../tests/generators.rs"]
mod generators;
use generators::random_lt_graph;

struct Tier {
    name: &'static str,
    nodes: usize,
    max_in: usize,
    k: usize,
}

const TIERS: [Tier; 3] = [
    Tier {
        name: "small",
        nodes: 40,
        max_in: 3,
        k: 5,
    },
    Tier {
        name: "medium",
        nodes: 150,
        max_in: 4,
        k: 10,
    },
    Tier {
        name: "large",
        nodes: 400,
        max_in: 4,
        k: 10,
    },
];

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection.tiered");
    group.sample_size(10);
    let config = SelectionConfig::with_tolerance(1e-3);

    for (i, tier) in TIERS.iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(0x51_3EED + i as u64);
        let graph = random_lt_graph(&mut rng, tier.nodes, tier.max_in);

        group.bench_with_input(BenchmarkId::new("cover", tier.name), &graph, |b, g| {
            b.iter(|| black_box(VertexCoverPartition::compute(g)));
        });

        group.bench_with_input(BenchmarkId::new("celf", tier.name), &graph, |b, g| {
            b.iter(|| black_box(celf_select(g, &config, tier.k, None).expect("celf")));
        });

        let single = config.with_lookahead(1);
        group.bench_with_input(BenchmarkId::new("celf.lookahead1", tier.name), &graph, |b, g| {
            b.iter(|| black_box(celf_select(g, &single, tier.k, None).expect("celf")));
        });

        // Naive greedy is quadratic in candidates; keep it to the small tier.
        if tier.nodes <= 40 {
            group.bench_with_input(BenchmarkId::new("greedy", tier.name), &graph, |b, g| {
                b.iter(|| black_box(greedy_select(g, &config, tier.k, None).expect("greedy")));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_selection);
criterion_main!(benches);
