//! Depth of the line under the primary selection anchor.
//!
//! Only the anchor's line is scanned, never the whole document. The value is
//! recomputed on every transition (edit or cursor move) and read by both
//! decoration passes afterwards.

use ropey::RopeSlice;

use crate::{
  selection::Selection,
  unit,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveDepth {
  /// Line holding the anchor, `None` without a selection.
  pub line:  Option<usize>,
  pub depth: usize,
}

impl ActiveDepth {
  pub const NONE: Self = Self {
    line:  None,
    depth: 0,
  };

  /// Ordinal of the emphasized unit: the last unit inside the active depth.
  #[inline]
  pub fn level_ordinal(&self) -> Option<usize> {
    self.depth.checked_sub(1)
  }
}

pub fn recompute(doc: RopeSlice, selection: Option<&Selection>, tab_width: u16) -> ActiveDepth {
  let Some(selection) = selection else {
    return ActiveDepth::NONE;
  };
  let line = selection.primary().anchor_line(doc);
  ActiveDepth {
    line:  Some(line),
    depth: unit::scan_slice(doc.line(line), tab_width),
  }
}

#[derive(Debug, Default, Clone)]
pub struct ActiveDepthTracker {
  tab_width: u16,
  current:   ActiveDepth,
}

impl ActiveDepthTracker {
  pub fn new(tab_width: u16) -> Self {
    Self {
      tab_width,
      current: ActiveDepth::NONE,
    }
  }

  pub fn get(&self) -> ActiveDepth {
    self.current
  }

  pub fn tab_width(&self) -> u16 {
    self.tab_width
  }

  /// Recompute from the new state. Returns the previous value.
  pub fn update(&mut self, doc: RopeSlice, selection: Option<&Selection>) -> ActiveDepth {
    let next = recompute(doc, selection, self.tab_width);
    if next != self.current {
      tracing::trace!(
        line = ?next.line,
        depth = next.depth,
        prev = self.current.depth,
        "active depth changed"
      );
    }
    std::mem::replace(&mut self.current, next)
  }
}

#[cfg(test)]
mod tests {
  use ropey::Rope;

  use super::*;

  #[test]
  fn depth_of_anchor_line() {
    let doc = Rope::from("a\n  b\n    c\n");
    // "    c" starts at char 6.
    let active = recompute(doc.slice(..), Some(&Selection::point(8)), 2);
    assert_eq!(active, ActiveDepth {
      line:  Some(2),
      depth: 2,
    });
    assert_eq!(active.level_ordinal(), Some(1));
  }

  #[test]
  fn anchor_not_head_decides() {
    let doc = Rope::from("a\n\tb\n");
    let selection = Selection::single(3, 0);
    assert_eq!(recompute(doc.slice(..), Some(&selection), 4).depth, 1);
  }

  #[test]
  fn missing_selection_is_root() {
    let doc = Rope::from("\t\tdeep\n");
    let active = recompute(doc.slice(..), None, 4);
    assert_eq!(active, ActiveDepth::NONE);
    assert_eq!(active.level_ordinal(), None);
  }

  #[test]
  fn empty_document_and_end_of_document() {
    let empty = Rope::new();
    assert_eq!(recompute(empty.slice(..), Some(&Selection::point(0)), 4).depth, 0);

    let doc = Rope::from("\tx\n");
    assert_eq!(
      recompute(doc.slice(..), Some(&Selection::point(3)), 4),
      ActiveDepth {
        line:  Some(1),
        depth: 0,
      }
    );
  }

  #[test]
  fn tracker_returns_previous_value() {
    let doc = Rope::from("x\n    y\n");
    let mut tracker = ActiveDepthTracker::new(4);
    assert_eq!(tracker.update(doc.slice(..), Some(&Selection::point(4))), ActiveDepth::NONE);
    assert_eq!(tracker.get().depth, 1);
    let prev = tracker.update(doc.slice(..), Some(&Selection::point(0)));
    assert_eq!(prev.depth, 1);
    assert_eq!(tracker.get().depth, 0);
  }
}
