//! Cursor ranges and the primary selection.
//!
//! A [`Range`] has an `anchor` and a `head`; the head is where the cursor is
//! drawn, the anchor is the fixed end. When `anchor == head` the range is a
//! point. A [`Selection`] holds one or more ranges and remembers which one is
//! primary. Indentation guides only ever look at the primary range's anchor.
//!
//! ```text
//! anchor=2, head=7: "he[llo w]orld"  (forward selection)
//! anchor=7, head=2: "he]llo w[orld"  (backward selection)
//! anchor=5, head=5: "hello|world"    (point/cursor)
//! ```

use ropey::RopeSlice;
use smallvec::{
  SmallVec,
  smallvec,
};
use thiserror::Error;

use crate::changes::{
  Assoc,
  ChangeError,
  ChangeSet,
};

pub type Result<T> = std::result::Result<T, SelectionError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
  #[error("selection must contain at least one range")]
  EmptySelection,
  #[error("primary index {index} out of bounds for selection of length {len}")]
  PrimaryOutOfBounds { index: usize, len: usize },
  #[error(transparent)]
  Change(#[from] ChangeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
  pub anchor: usize,
  pub head:   usize,
}

impl Range {
  pub fn new(anchor: usize, head: usize) -> Self {
    Self { anchor, head }
  }

  #[inline]
  pub fn point(head: usize) -> Self {
    Self::new(head, head)
  }

  /// Start of the range
  #[inline]
  #[must_use]
  pub fn from(&self) -> usize {
    std::cmp::min(self.anchor, self.head)
  }

  /// End of the range
  #[inline]
  #[must_use]
  pub fn to(&self) -> usize {
    std::cmp::max(self.anchor, self.head)
  }

  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.anchor == self.head
  }

  /// Line containing the anchor. Anchors past the end of the text are
  /// clamped to the last line.
  #[inline]
  #[must_use]
  pub fn anchor_line(&self, text: RopeSlice) -> usize {
    text.char_to_line(self.anchor.min(text.len_chars()))
  }

  /// Map a range through a set of changes.
  pub fn map(mut self, changes: &ChangeSet) -> Result<Self> {
    if changes.is_empty() {
      return Ok(self);
    }
    let (anchor_assoc, head_assoc) = if self.anchor <= self.head {
      (Assoc::After, Assoc::Before)
    } else {
      (Assoc::Before, Assoc::After)
    };
    if self.is_empty() {
      self.anchor = changes.map_pos(self.anchor, Assoc::After)?;
      self.head = self.anchor;
    } else {
      self.anchor = changes.map_pos(self.anchor, anchor_assoc)?;
      self.head = changes.map_pos(self.head, head_assoc)?;
    }
    Ok(self)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
  ranges:  SmallVec<[Range; 1]>,
  primary: usize,
}

impl Selection {
  pub fn new(ranges: SmallVec<[Range; 1]>, primary: usize) -> Result<Self> {
    if ranges.is_empty() {
      return Err(SelectionError::EmptySelection);
    }
    if primary >= ranges.len() {
      return Err(SelectionError::PrimaryOutOfBounds {
        index: primary,
        len:   ranges.len(),
      });
    }
    Ok(Self { ranges, primary })
  }

  pub fn single(anchor: usize, head: usize) -> Self {
    Self {
      ranges:  smallvec![Range::new(anchor, head)],
      primary: 0,
    }
  }

  pub fn point(pos: usize) -> Self {
    Self::single(pos, pos)
  }

  pub fn primary(&self) -> Range {
    self.ranges[self.primary]
  }

  /// Anchor of the primary range.
  #[inline]
  pub fn anchor(&self) -> usize {
    self.primary().anchor
  }

  /// Map every range through a set of changes, keeping the primary index.
  pub fn map(self, changes: &ChangeSet) -> Result<Self> {
    let ranges = self
      .ranges
      .into_iter()
      .map(|range| range.map(changes))
      .collect::<Result<_>>()?;
    Ok(Self {
      ranges,
      primary: self.primary,
    })
  }
}

#[cfg(test)]
mod test {
  use ropey::Rope;

  use super::*;
  use crate::Tendril;

  #[test]
  fn test_new_empty() {
    let err = Selection::new(smallvec![], 0).unwrap_err();
    assert_eq!(err, SelectionError::EmptySelection);
  }

  #[test]
  fn test_primary_out_of_bounds() {
    let err = Selection::new(smallvec![Range::point(1)], 3).unwrap_err();
    assert_eq!(err, SelectionError::PrimaryOutOfBounds { index: 3, len: 1 });
  }

  #[test]
  fn test_anchor_is_primary_anchor() {
    let sel = Selection::new(smallvec![Range::new(1, 4), Range::new(9, 6)], 1).unwrap();
    assert_eq!(sel.anchor(), 9);
    assert_eq!(sel.primary().from(), 6);
    assert_eq!(sel.primary().to(), 9);
  }

  #[test]
  fn test_anchor_line_clamps() {
    let rope = Rope::from("a\nbb\nccc");
    assert_eq!(Range::point(0).anchor_line(rope.slice(..)), 0);
    assert_eq!(Range::point(3).anchor_line(rope.slice(..)), 1);
    assert_eq!(Range::point(100).anchor_line(rope.slice(..)), 2);
  }

  #[test]
  fn test_map_through_insert() {
    let rope = Rope::from("hello world");
    let changes = ChangeSet::change(&rope, [(0, 0, Some(Tendril::from(">> ")))]).unwrap();
    let sel = Selection::single(6, 11).map(&changes).unwrap();
    assert_eq!(sel.primary(), Range::new(9, 14));

    let point = Selection::point(0).map(&changes).unwrap();
    assert_eq!(point.anchor(), 3);
  }
}
