use criterion::{black_box, criterion_group, criterion_main, Criterion};
use drafter_document::{BindingContext, Element, Ownership, Style};
use drafter_parser::{parse, serialize_module};
use std::collections::HashMap;

fn build_tree(width: usize) -> HashMap<String, Element> {
    let mut elements = HashMap::new();
    let children: Vec<String> = (0..width).map(|i| format!("row-{}", i)).collect();

    elements.insert(
        "root".to_string(),
        Element::new("root", "div", Ownership::screen("bench"))
            .with_style(Style::new().with_literal("display", "flex"))
            .with_children(children.clone()),
    );
    for id in children {
        let element = Element::new(id.clone(), "span", Ownership::element("root"))
            .with_style(Style::new().with_literal("padding", 4.0))
            .with_text(format!("Row {}", id));
        elements.insert(id, element);
    }
    elements
}

fn bench_serialize(c: &mut Criterion) {
    let ctx = BindingContext::new();
    let tree = build_tree(200);

    c.bench_function("serialize_200_rows", |b| {
        b.iter(|| serialize_module(black_box(&tree), "root", "Bench", &ctx))
    });
}

fn bench_parse(c: &mut Criterion) {
    let ctx = BindingContext::new();
    let source = serialize_module(&build_tree(200), "root", "Bench", &ctx);

    c.bench_function("parse_200_rows", |b| {
        b.iter(|| parse(black_box(&source), &ctx))
    });
}

criterion_group!(benches, bench_serialize, bench_parse);
criterion_main!(benches);
