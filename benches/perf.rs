use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use tui_threadview::{
    Comment, Document, TextBlocks, ThreadAction, ThreadViewOptions, ThreadViewState,
};

const BODY: &str = "<p>Lorem ipsum dolor sit amet, <i>consectetur</i> adipiscing elit, sed do \
eiusmod tempor incididunt ut labore et dolore magna aliqua.<p>> Ut enim ad minim veniam, quis \
nostrud exercitation<pre><code>  let x = 42;</code></pre>";

fn comment(next_id: &mut u32, depth: usize, fanout: u32) -> Comment<u32> {
    let id = *next_id;
    *next_id += 1;
    let mut node = Comment::new(id, "author", BODY).age("1 hour ago");
    if depth > 0 {
        for _ in 0..fanout {
            node.push_reply(comment(next_id, depth - 1, fanout));
        }
    }
    node
}

// 8 top-level threads with fanout 4 and depth 4 (2,728 comments).
fn document() -> Document<u32> {
    let mut doc = Document::new(0, "bench");
    let mut next_id = 1;
    for _ in 0..8 {
        doc.push(comment(&mut next_id, 4, 4));
    }
    doc
}

fn state() -> ThreadViewState<u32> {
    let mut state = ThreadViewState::builder()
        .head(document())
        .options(ThreadViewOptions::new().head_selectable(false))
        .build()
        .unwrap();
    state.resize(120, 40);
    state
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("build_state", |b| {
        b.iter_batched(document, |doc| ThreadViewState::new(doc).unwrap(), BatchSize::SmallInput);
    });
}

fn bench_view(c: &mut Criterion) {
    let mut state = state();
    c.bench_function("view_all", |b| b.iter(|| black_box(state.view())));
}

fn bench_navigation(c: &mut Criterion) {
    let mut state = state();
    state.view();
    c.bench_function("navigate_and_fold", |b| {
        b.iter(|| {
            for action in [
                ThreadAction::Bottom,
                ThreadAction::Down,
                ThreadAction::ToggleFold,
                ThreadAction::ResetView,
                ThreadAction::ToggleFold,
                ThreadAction::Root,
                ThreadAction::Top,
            ] {
                black_box(state.handle_action(action));
            }
        });
    });
}

fn bench_markup(c: &mut Criterion) {
    c.bench_function("parse_markup", |b| b.iter(|| TextBlocks::parse(black_box(BODY))));
}

criterion_group!(benches, bench_build, bench_view, bench_navigation, bench_markup);
criterion_main!(benches);
