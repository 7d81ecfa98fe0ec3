//! Benchmarks for the graph analytics engines.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tessera_insight::graph::{centrality, community, Graph, GraphOptions};
use tessera_insight::layout;
use tessera_insight::model::{EdgeRecord, NodeRecord};

/// Seeded random graph with roughly 4 out-edges per node.
fn random_graph(n: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let nodes: Vec<NodeRecord> = (0..n)
        .map(|i| NodeRecord::new(format!("n{i}"), format!("Node {i}")))
        .collect();
    let mut edges = Vec::with_capacity(n * 4);
    for i in 0..n {
        for _ in 0..4 {
            let j = rng.gen_range(0..n);
            if i != j {
                edges.push(
                    EdgeRecord::new(format!("n{i}"), format!("n{j}"))
                        .with_weight(rng.r#gen::<f64>()),
                );
            }
        }
    }
    Graph::build(&nodes, &edges, &GraphOptions::default()).unwrap()
}

fn bench_pagerank(c: &mut Criterion) {
    let graph = random_graph(300, 7);
    c.bench_function("pagerank_300", |bench| {
        bench.iter(|| black_box(centrality::pagerank(&graph)))
    });
}

fn bench_betweenness(c: &mut Criterion) {
    let graph = random_graph(150, 7);
    c.bench_function("betweenness_exact_150", |bench| {
        bench.iter(|| black_box(centrality::betweenness(&graph, 0)))
    });
}

fn bench_louvain(c: &mut Criterion) {
    let graph = random_graph(300, 7);
    let adjacency = graph.undirected_weighted();
    c.bench_function("louvain_300", |bench| {
        bench.iter(|| black_box(community::louvain(&adjacency, 0)))
    });
}

fn bench_force_layout(c: &mut Criterion) {
    let graph = random_graph(200, 7);
    c.bench_function("force_directed_200", |bench| {
        bench.iter(|| black_box(layout::force::layout(&graph, 0)))
    });
}

criterion_group!(
    benches,
    bench_pagerank,
    bench_betweenness,
    bench_louvain,
    bench_force_layout
);
criterion_main!(benches);
