//! Performance benchmarks for the segmentation pipeline.
//!
//! Run with: `cargo bench --bench segmentation`
//!
//! ## Performance Targets
//!
//! | Operation | Target | Notes |
//! |-----------|--------|-------|
//! | Full pipeline, 50 segments | <1ms | Validate, order, assemble |
//! | Ordering, 10k-node chain | Linear | Explicit-stack DFS + Kahn |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};

use segmentation_kernel::{order_segments, segment, CyclePolicy, DependencyGraph, ExtractedContent};

/// A document with one page, figure and formula per segment.
fn make_content(segments: usize) -> ExtractedContent {
    (0..segments).fold(ExtractedContent::new(), |content, i| {
        let page = i as u32 + 1;
        content
            .with_page(page, format!("Section {i} body text. ").repeat(40))
            .with_figure(format!("fig-{i}"), page, format!("Figure {i}"))
            .with_formula(format!("eq-{i}"), page, format!("x_{i} = x_{{{i}-1}} + 1"))
    })
}

/// Every segment depends on its two predecessors.
fn make_proposal(segments: usize) -> Value {
    let items: Vec<Value> = (0..segments)
        .map(|i| {
            let page = i + 1;
            let prerequisites: Vec<usize> = (i.saturating_sub(2)..i).collect();
            json!({
                "title": format!("Section {i}"),
                "contentIndices": {
                    "pageRanges": [[page, page]],
                    "figureIds": [format!("fig-{i}")],
                    "formulaIds": [format!("eq-{i}")],
                },
                "prerequisites": prerequisites,
            })
        })
        .collect();
    json!({ "segments": items })
}

/// Benchmark the full pure pipeline.
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for segments in [5, 20, 50] {
        let content = make_content(segments);
        let proposal = make_proposal(segments);

        group.throughput(Throughput::Elements(segments as u64));
        group.bench_with_input(
            BenchmarkId::new("segments", segments),
            &(content, proposal),
            |b, (content, proposal)| {
                b.iter(|| segment(black_box(content), black_box(proposal), CyclePolicy::Fallback))
            },
        );
    }

    group.finish();
}

/// Benchmark ordering on long chains, acyclic and closed into a cycle.
fn bench_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordering");

    for nodes in [1_000, 10_000] {
        let chain: Vec<Vec<usize>> = (0..nodes)
            .map(|i| if i == 0 { vec![] } else { vec![i - 1] })
            .collect();
        let mut ring = chain.clone();
        ring[0] = vec![nodes - 1];

        let chain = DependencyGraph::from_prerequisites(&chain);
        let ring = DependencyGraph::from_prerequisites(&ring);

        group.throughput(Throughput::Elements(nodes as u64));
        group.bench_with_input(BenchmarkId::new("chain", nodes), &chain, |b, graph| {
            b.iter(|| order_segments(black_box(graph)))
        });
        group.bench_with_input(BenchmarkId::new("ring", nodes), &ring, |b, graph| {
            b.iter(|| order_segments(black_box(graph)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_ordering);
criterion_main!(benches);
