//! Benchmarks for the indentation hot paths.
//!
//! Run with: `cargo bench -p the-guides --bench scan`

use divan::{
  Bencher,
  black_box,
};
use ropey::Rope;
use the_guides::{
  GuideUpdate,
  IndentGuides,
  marks::TabMarks,
  selection::Selection,
  settings::SettingsHandle,
  unit,
};

fn main() {
  divan::main();
}

fn make_nested_text(lines: usize) -> String {
  let mut s = String::with_capacity(lines * 24);
  for i in 0..lines {
    let depth = i % 6;
    for _ in 0..depth {
      s.push_str(if depth % 2 == 0 { "\t" } else { "    " });
    }
    s.push_str("let value = compute();\n");
  }
  s
}

#[divan::bench(args = [0, 2, 8])]
fn scan_str(bencher: Bencher, depth: usize) {
  let line = format!("{}fn body() {{}}", "    ".repeat(depth));
  bencher.bench(|| unit::scan(black_box(&line), 4));
}

#[divan::bench(args = [1_000, 10_000])]
fn scan_rope_lines(bencher: Bencher, lines: usize) {
  let rope = Rope::from(make_nested_text(lines));
  bencher.bench(|| {
    rope
      .lines()
      .map(|line| unit::scan_slice(black_box(line), 4))
      .sum::<usize>()
  });
}

#[divan::bench(args = [100, 1_000])]
fn rebuild_marks(bencher: Bencher, lines: usize) {
  let rope = Rope::from(make_nested_text(lines));
  let mut marks = TabMarks::new(4);
  bencher.bench_local(|| {
    marks.rebuild(rope.slice(..), 0..rope.len_lines(), Some(2));
    marks.marks().len()
  });
}

#[divan::bench(args = [100, 1_000])]
fn update_on_cursor_move(bencher: Bencher, lines: usize) {
  let rope = Rope::from(make_nested_text(lines));
  let viewport = 0..rope.len_lines().min(80);
  let first = Selection::point(0);
  let mut guides = IndentGuides::new(SettingsHandle::default(), 4, GuideUpdate {
    doc:       rope.slice(..),
    selection: Some(&first),
    changes:   None,
    viewport:  viewport.clone(),
  });
  let cursor = Selection::point(rope.line_to_char(lines / 2));
  bencher.bench_local(|| {
    guides.update(GuideUpdate {
      doc:       rope.slice(..),
      selection: Some(&cursor),
      changes:   None,
      viewport:  viewport.clone(),
    });
    guides.line_tags().len()
  });
}
