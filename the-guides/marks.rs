//! Inline marks over indentation units on the visible lines.
//!
//! Marks are kept up to date with one of two strategies, picked per update:
//!
//! - [`UpdateStrategy::Rebuild`] rescans every visible line. Used while the
//!   active level is highlighted, because the emphasized unit follows the
//!   cursor and not the edited range.
//! - [`UpdateStrategy::Patch`] maps the existing marks through the edit and
//!   rescans only the lines the edit touched, plus any line that scrolled or
//!   shifted into view. Every mark's style is static in this mode.
//!
//! Both strategies produce the same marks for the same document, viewport and
//! emphasized level.

use std::ops::Range;

use ropey::RopeSlice;

use crate::{
  changes::{
    Assoc,
    ChangeError,
    ChangeSet,
  },
  decoration::TabMark,
  unit::{
    self,
    Matching,
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStrategy {
  Rebuild,
  Patch,
}

impl UpdateStrategy {
  pub fn for_highlight(highlight_active_group: bool) -> Self {
    if highlight_active_group {
      Self::Rebuild
    } else {
      Self::Patch
    }
  }
}

/// Clamp a visible line range to the lines of `doc`.
pub fn clamp_viewport(viewport: Range<usize>, doc: RopeSlice) -> Range<usize> {
  let end = viewport.end.min(doc.len_lines());
  viewport.start.min(end)..end
}

#[derive(Debug, Clone)]
pub struct TabMarks {
  tab_width: u16,
  marks:     Vec<TabMark>,
  /// Document char range scanned by the last update.
  covered:   Range<usize>,
  doc_len:   usize,
  level:     Option<usize>,
}

impl TabMarks {
  pub fn new(tab_width: u16) -> Self {
    Self {
      tab_width,
      marks: Vec::new(),
      covered: 0..0,
      doc_len: 0,
      level: None,
    }
  }

  /// Marks sorted by document position.
  pub fn marks(&self) -> &[TabMark] {
    &self.marks
  }

  /// Ordinal of the emphasized unit, if any.
  pub fn level(&self) -> Option<usize> {
    self.level
  }

  pub fn update(
    &mut self,
    strategy: UpdateStrategy,
    doc: RopeSlice,
    changes: Option<&ChangeSet>,
    viewport: Range<usize>,
    level: Option<usize>,
  ) {
    match strategy {
      UpdateStrategy::Rebuild => self.rebuild(doc, viewport, level),
      UpdateStrategy::Patch => {
        if level != self.level {
          tracing::debug!(
            ?level,
            prev = ?self.level,
            "emphasized level changed, rebuilding tab marks"
          );
          self.rebuild(doc, viewport, level);
          return;
        }
        if let Err(err) = self.patch(doc, changes, viewport.clone()) {
          tracing::warn!(%err, "failed to patch tab marks, rebuilding");
          self.rebuild(doc, viewport, level);
        }
      },
    }
  }

  /// Rescan every visible line.
  pub fn rebuild(&mut self, doc: RopeSlice, viewport: Range<usize>, level: Option<usize>) {
    let viewport = clamp_viewport(viewport, doc);
    self.marks.clear();
    for line in viewport.clone() {
      scan_line(doc, line, self.tab_width, level, &mut self.marks);
    }
    self.finish(doc, viewport, level);
    tracing::trace!(marks = self.marks.len(), "rebuilt tab marks");
  }

  /// Map existing marks through `changes` and rescan only the stale lines.
  ///
  /// `doc` is the document after the edit. Without a changeset the document
  /// must be unchanged since the last update.
  pub fn patch(
    &mut self,
    doc: RopeSlice,
    changes: Option<&ChangeSet>,
    viewport: Range<usize>,
  ) -> Result<(), ChangeError> {
    let identity;
    let changes = match changes {
      Some(changes) => changes,
      None => {
        identity = ChangeSet::new(doc);
        &identity
      },
    };
    changes.ensure_len(self.doc_len)?;
    if changes.len_after() != doc.len_chars() {
      return Err(ChangeError::LengthMismatch {
        expected: changes.len_after(),
        actual:   doc.len_chars(),
      });
    }

    let viewport = clamp_viewport(viewport, doc);
    let covered_start = changes.map_pos(self.covered.start, Assoc::After)?;
    let covered_end = changes.map_pos(self.covered.end, Assoc::Before)?;
    let covered = if covered_start < covered_end {
      doc.char_to_line(covered_start)..doc.char_to_line(covered_end)
    } else {
      0..0
    };
    let changed = changes.changed_lines(doc);
    let stale =
      |line: usize| !covered.contains(&line) || changed.iter().any(|range| range.contains(&line));

    let mut marks = Vec::with_capacity(self.marks.len());
    for mut mark in std::mem::take(&mut self.marks) {
      let from = changes.map_pos(mark.range.start, Assoc::After)?;
      let to = changes.map_pos(mark.range.end, Assoc::Before)?;
      let line = doc.char_to_line(from);
      if viewport.contains(&line) && !stale(line) {
        mark.line = line;
        mark.range = from..to;
        marks.push(mark);
      }
    }

    let kept = marks.len();
    for line in viewport.clone().filter(|line| stale(*line)) {
      scan_line(doc, line, self.tab_width, self.level, &mut marks);
    }
    marks.sort_by_key(|mark| mark.range.start);
    tracing::trace!(kept, scanned = marks.len() - kept, "patched tab marks");

    self.marks = marks;
    self.finish(doc, viewport, self.level);
    Ok(())
  }

  fn finish(&mut self, doc: RopeSlice, viewport: Range<usize>, level: Option<usize>) {
    self.covered = doc.line_to_char(viewport.start)..doc.line_to_char(viewport.end);
    self.doc_len = doc.len_chars();
    self.level = level;
  }
}

fn scan_line(
  doc: RopeSlice,
  line: usize,
  tab_width: u16,
  level: Option<usize>,
  out: &mut Vec<TabMark>,
) {
  let start = doc.line_to_char(line);
  let units = unit::units(doc.line(line).chars(), tab_width, Matching::Anywhere);
  out.extend(units.enumerate().map(|(ordinal, unit)| {
    TabMark {
      line,
      range: start + unit.start..start + unit.end(),
      ordinal,
      active_level: level == Some(ordinal),
    }
  }));
}

#[cfg(test)]
mod tests {
  use ropey::Rope;

  use super::*;
  use crate::Tendril;

  fn rebuilt(doc: &Rope, viewport: Range<usize>, level: Option<usize>) -> Vec<TabMark> {
    let mut marks = TabMarks::new(4);
    marks.rebuild(doc.slice(..), viewport, level);
    marks.marks().to_vec()
  }

  fn spans(marks: &[TabMark]) -> Vec<(usize, Range<usize>, usize, bool)> {
    marks
      .iter()
      .map(|mark| (mark.line, mark.range.clone(), mark.ordinal, mark.active_level))
      .collect()
  }

  #[test]
  fn marks_units_anywhere_on_the_line() {
    let doc = Rope::from("\t    x\tz\n        y    \n");
    let marks = rebuilt(&doc, 0..3, None);
    assert_eq!(spans(&marks), vec![
      (0, 0..1, 0, false),
      (0, 1..5, 1, false),
      (0, 6..7, 2, false),
      (1, 9..13, 0, false),
      (1, 13..17, 1, false),
      (1, 18..22, 2, false),
    ]);
  }

  #[test]
  fn unindented_lines_still_mark_inner_units() {
    let doc = Rope::from("foo\tbar\na    b\n");
    let marks = rebuilt(&doc, 0..3, Some(0));
    assert_eq!(spans(&marks), vec![
      (0, 3..4, 0, true),
      (1, 9..13, 0, true),
    ]);
  }

  #[test]
  fn emphasizes_level_on_every_visible_line() {
    let doc = Rope::from("\t\ta\n\tb\n\t\t\tc\n");
    let marks = rebuilt(&doc, 0..4, Some(1));
    let emphasized: Vec<_> = marks
      .iter()
      .filter(|mark| mark.active_level)
      .map(|mark| (mark.line, mark.ordinal))
      .collect();
    assert_eq!(emphasized, vec![(0, 1), (2, 1)]);
  }

  #[test]
  fn toggling_highlight_keeps_ranges() {
    let doc = Rope::from("\t\ta\n\tb\n");
    let on = rebuilt(&doc, 0..3, Some(0));
    let off = rebuilt(&doc, 0..3, None);
    assert!(on.iter().any(|mark| mark.active_level));
    assert!(off.iter().all(|mark| !mark.active_level));
    let ranges = |marks: &[TabMark]| marks.iter().map(|m| m.range.clone()).collect::<Vec<_>>();
    assert_eq!(ranges(on.as_slice()), ranges(off.as_slice()));
  }

  #[test]
  fn viewport_limits_scan() {
    let doc = Rope::from("\ta\n\tb\n\tc\n");
    let marks = rebuilt(&doc, 1..2, None);
    assert_eq!(spans(&marks), vec![(1, 3..4, 0, false)]);
    assert!(rebuilt(&doc, 7..12, None).is_empty());
  }

  #[test]
  fn strategy_follows_highlight_flag() {
    assert_eq!(UpdateStrategy::for_highlight(true), UpdateStrategy::Rebuild);
    assert_eq!(UpdateStrategy::for_highlight(false), UpdateStrategy::Patch);
  }

  fn assert_patch_matches_rebuild(text: &str, edits: Vec<(usize, usize, Option<&str>)>) {
    let mut doc = Rope::from(text);
    let mut marks = TabMarks::new(4);
    marks.rebuild(doc.slice(..), 0..doc.len_lines(), None);

    let edits = edits
      .into_iter()
      .map(|(from, to, text)| (from, to, text.map(Tendril::from)));
    let changes = ChangeSet::change(&doc, edits).unwrap();
    changes.apply(&mut doc).unwrap();

    marks
      .patch(doc.slice(..), Some(&changes), 0..doc.len_lines())
      .unwrap();
    assert_eq!(marks.marks(), rebuilt(&doc, 0..doc.len_lines(), None).as_slice());
  }

  #[test]
  fn patch_matches_rebuild() {
    let text = "a\n\tb\n\t\tc\n        d\n\te\n";
    // indent a line
    assert_patch_matches_rebuild(text, vec![(2, 2, Some("\t"))]);
    // dedent a line
    assert_patch_matches_rebuild(text, vec![(5, 6, None)]);
    // split a line
    assert_patch_matches_rebuild(text, vec![(4, 4, Some("\n\t\t"))]);
    // join lines
    assert_patch_matches_rebuild(text, vec![(4, 5, None)]);
    // several edits at once
    assert_patch_matches_rebuild(text, vec![(0, 0, Some("\t")), (9, 13, Some("    "))]);
    // delete everything
    assert_patch_matches_rebuild(text, vec![(0, text.chars().count(), None)]);
  }

  #[test]
  fn patch_follows_viewport() {
    let doc = Rope::from("\ta\n\tb\n\tc\n\td\n");
    let mut marks = TabMarks::new(4);
    marks.rebuild(doc.slice(..), 0..2, None);
    marks.patch(doc.slice(..), None, 1..4).unwrap();
    assert_eq!(marks.marks(), rebuilt(&doc, 1..4, None).as_slice());
  }

  #[test]
  fn patch_rejects_unknown_document() {
    let doc = Rope::from("\ta\n");
    let mut marks = TabMarks::new(4);
    marks.rebuild(doc.slice(..), 0..2, None);
    let other = Rope::from("\ta\n\tb\n");
    assert!(marks.patch(other.slice(..), None, 0..3).is_err());

    // update() falls back to a rebuild
    marks.update(UpdateStrategy::Patch, other.slice(..), None, 0..3, None);
    assert_eq!(marks.marks(), rebuilt(&other, 0..3, None).as_slice());
  }

  #[test]
  fn patch_rebuilds_when_level_changes() {
    let doc = Rope::from("\t\ta\n");
    let mut marks = TabMarks::new(4);
    marks.rebuild(doc.slice(..), 0..2, Some(1));
    marks.update(UpdateStrategy::Patch, doc.slice(..), None, 0..2, None);
    assert_eq!(marks.level(), None);
    assert!(marks.marks().iter().all(|mark| !mark.active_level));
  }

  quickcheck::quickcheck! {
      fn patch_matches_rebuild_for_random_edits(depths: Vec<u8>, at: usize, del: u8, ins: u8) -> bool {
          let text: String = depths
            .iter()
            .map(|d| {
              let inner = ["", "\t", "    ", "  "][usize::from(d / 3 % 4)];
              format!("{}x{inner}y\n", "\t".repeat(usize::from(d % 3)))
            })
            .collect();
          let mut doc = Rope::from(text);
          let mut marks = TabMarks::new(4);
          marks.rebuild(doc.slice(..), 0..doc.len_lines(), None);

          let len = doc.len_chars();
          let from = if len == 0 { 0 } else { at % (len + 1) };
          let to = (from + usize::from(del % 4)).min(len);
          let insert = ["", "\t", "\n", "    ", "\n\t"][usize::from(ins % 5)];
          let changes = ChangeSet::change(&doc, [(from, to, Some(Tendril::from(insert)))]).unwrap();
          changes.apply(&mut doc).unwrap();

          marks.patch(doc.slice(..), Some(&changes), 0..doc.len_lines()).unwrap();
          let mut expected = TabMarks::new(4);
          expected.rebuild(doc.slice(..), 0..doc.len_lines(), None);
          marks.marks() == expected.marks()
      }
  }
}
