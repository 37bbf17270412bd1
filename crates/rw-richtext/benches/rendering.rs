//! Benchmarks for markdown rendering.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rw_richtext::{MarkdownRenderer, to_html};

/// Generate markdown content with specified structure.
fn generate_markdown(headings: usize, paragraphs_per_section: usize) -> String {
    let mut md = String::with_capacity(headings * 50 + headings * paragraphs_per_section * 200);
    md.push_str("# Document Title\n\n");

    for i in 0..headings {
        md.push_str(&format!("## Section {i}\n\n"));
        for j in 0..paragraphs_per_section {
            md.push_str(&format!(
                "This is paragraph {j} in section {i}. It contains **bold** and *italic* text.\n\n"
            ));
        }
        md.push_str("- [x] done\n- [ ] pending\n\n| A | B |\n|---|--:|\n| 1 | 2 |\n\n");
    }
    md
}

fn bench_render_simple(c: &mut Criterion) {
    let renderer = MarkdownRenderer::new();

    c.bench_function("render_simple_markdown", |b| {
        b.iter(|| renderer.render_markdown("# Hello\n\nSimple content."));
    });
}

fn bench_render_varying_sizes(c: &mut Criterion) {
    let renderer = MarkdownRenderer::new().with_title_extraction();
    let mut group = c.benchmark_group("render_by_size");

    for (headings, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let markdown = generate_markdown(headings, paragraphs);
        group.throughput(Throughput::Bytes(markdown.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("markdown", format!("{headings}h_{paragraphs}p")),
            &markdown,
            |b, md| b.iter(|| renderer.render_markdown(md)),
        );
    }

    group.finish();
}

fn bench_to_html(c: &mut Criterion) {
    let renderer = MarkdownRenderer::new();
    let result = renderer
        .render_markdown(&generate_markdown(20, 3))
        .unwrap();

    c.bench_function("to_html_20_sections", |b| {
        b.iter(|| to_html(&result.root, Some("guide")));
    });
}

fn bench_render_many(c: &mut Criterion) {
    let renderer = MarkdownRenderer::new();
    let docs: Vec<String> = (0..64).map(|_| generate_markdown(5, 2)).collect();

    c.bench_function("render_many_64_documents", |b| {
        b.iter(|| renderer.render_many(&docs));
    });
}

criterion_group!(
    benches,
    bench_render_simple,
    bench_render_varying_sizes,
    bench_to_html,
    bench_render_many
);
criterion_main!(benches);
