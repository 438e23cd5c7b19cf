use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagecraft_blocks::{BlockKind, BlockRegistry, BlockTree, LandingPage, SequentialIds};
use pagecraft_editor::operations::{add_block, relocate_to_container};
use pagecraft_editor::Entitlement;
use pagecraft_renderer::{page_to_html, render_editor, HtmlOptions, MediaArbiter};

fn build_page(copies: usize) -> LandingPage {
    let registry = BlockRegistry::new();
    let mut ids = SequentialIds::new("bench");
    let now = Utc::now();
    let mut tree = BlockTree::new();

    for _ in 0..copies {
        for kind in BlockKind::ALL {
            if let Ok(next) = add_block(&tree, kind, &registry, Entitlement::Pro, &mut ids, now) {
                tree = next;
            }
        }
    }

    // nest every paragraph into the first container
    if let Some(container) = tree.container_ids().first().cloned() {
        let paragraphs: Vec<_> = tree
            .blocks()
            .iter()
            .filter(|b| b.kind() == BlockKind::Paragraph)
            .map(|b| b.id().clone())
            .collect();
        for id in paragraphs {
            tree = relocate_to_container(&tree, &id, &container);
        }
    }

    let mut page = LandingPage::new("bench-page", "bench");
    page.content.content_blocks = tree;
    page
}

fn render_small_page(c: &mut Criterion) {
    let page = build_page(1);

    c.bench_function("page_to_html_every_kind", |b| {
        b.iter(|| page_to_html(black_box(&page), MediaArbiter::new(), HtmlOptions::default()))
    });
}

fn render_large_page(c: &mut Criterion) {
    let page = build_page(20);

    c.bench_function("page_to_html_20x_kinds", |b| {
        b.iter(|| page_to_html(black_box(&page), MediaArbiter::new(), HtmlOptions::compact()))
    });
}

fn render_editor_forms(c: &mut Criterion) {
    let page = build_page(20);

    c.bench_function("render_editor_20x_kinds", |b| {
        b.iter(|| render_editor(black_box(page.blocks())))
    });
}

criterion_group!(benches, render_small_page, render_large_page, render_editor_forms);
criterion_main!(benches);
