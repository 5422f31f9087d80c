//! The indentation group around the cursor.
//!
//! Starting at the anchor line, the group grows one line at a time upward and
//! downward for as long as the neighbouring line is indented at least as deeply
//! as the active depth. Lines are compared by depth only, so a blank line at
//! depth 0 ends the group in that direction even when deeper lines follow it.
//!
//! ```text
//! a            depth 0
//!   b    ┐     depth 1
//!   c    │  <- anchor, active depth 1 (2-space units)
//!     d  │     depth 2
//!   e    ┘     depth 1
//! f            depth 0
//! ```
//!
//! Each step inspects exactly one new line, so resolving costs the size of the
//! group rather than the size of the document.

use std::ops::Range;

use ropey::RopeSlice;

use crate::{
  decoration::LineTag,
  selection::Selection,
  unit,
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndentationGroup {
  lines: Range<usize>,
  tags:  Vec<LineTag>,
}

impl IndentationGroup {
  pub fn empty() -> Self {
    Self::default()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.tags.is_empty()
  }

  /// Member lines as a half-open range.
  pub fn lines(&self) -> Range<usize> {
    self.lines.clone()
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.tags.len()
  }

  pub fn contains(&self, line: usize) -> bool {
    self.lines.contains(&line)
  }

  /// One tag per member line, in document order.
  pub fn tags(&self) -> &[LineTag] {
    &self.tags
  }
}

/// Resolve the group of lines around the anchor that sit at `active_depth` or
/// deeper.
///
/// Root-level content never forms a group: an `active_depth` of zero, or a
/// missing selection, yields an empty group.
pub fn resolve(
  doc: RopeSlice,
  selection: Option<&Selection>,
  active_depth: usize,
  tab_width: u16,
) -> IndentationGroup {
  let Some(selection) = selection else {
    return IndentationGroup::empty();
  };
  if active_depth == 0 {
    return IndentationGroup::empty();
  }

  let current = selection.primary().anchor_line(doc);
  let member = |line: usize| unit::scan_slice(doc.line(line), tab_width) >= active_depth;

  let mut first = current;
  while first > 0 && member(first - 1) {
    first -= 1;
  }

  let mut last = current;
  while last + 1 < doc.len_lines() && member(last + 1) {
    last += 1;
  }

  let tags = (first..=last)
    .map(|line| {
      LineTag {
        line,
        char_idx: doc.line_to_char(line),
      }
    })
    .collect();

  IndentationGroup {
    lines: first..last + 1,
    tags,
  }
}
