//! Document edits as operational changesets.
//!
//! A [`ChangeSet`] is a sequence of [`Operation`]s applied from the start of
//! the document:
//!
//! - **Retain(n)** - Keep `n` characters unchanged
//! - **Delete(n)** - Remove `n` characters
//! - **Insert(s)** - Insert string `s`
//!
//! The host hands one changeset per edit to the guides so that inline marks
//! can be patched on the touched lines only. Positions are mapped from the old
//! document into the new one with [`ChangeSet::map_pos`].
//!
//! ```ignore
//! use the_guides::changes::ChangeSet;
//! use ropey::Rope;
//!
//! let mut doc = Rope::from("hello world");
//! let cs = ChangeSet::change(&doc, [(6, 11, Some("rust".into()))])?;
//! cs.apply(&mut doc)?;
//! assert_eq!(doc.to_string(), "hello rust");
//! ```

use std::ops::Range;

use ropey::{
  Rope,
  RopeSlice,
};
use smallvec::SmallVec;
use thiserror::Error;

use crate::Tendril;

pub type Result<T> = std::result::Result<T, ChangeError>;

/// (from, to) replacement.
pub type Change = (usize, usize, Option<Tendril>);

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChangeError {
  #[error("changeset length mismatch: expected {expected}, got {actual}")]
  LengthMismatch { expected: usize, actual: usize },
  #[error("invalid change range: start {from} is after end {to}")]
  InvalidRange { from: usize, to: usize },
  #[error("change range {from}..{to} is out of bounds for document length {len}")]
  RangeOutOfBounds { from: usize, to: usize, len: usize },
  #[error("change range {from}..{to} overlaps previous change ending at {prev_end}")]
  OverlappingRange {
    prev_end: usize,
    from:     usize,
    to:       usize,
  },
  #[error("position {pos} is out of bounds for changeset of length {len}")]
  PositionOutOfBounds { pos: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
  /// Move cursor by n characters.
  Retain(usize),

  /// Delete n characters.
  Delete(usize),

  /// Insert text at position.
  Insert(Tendril),
}

impl Operation {
  pub fn len_chars(&self) -> usize {
    match self {
      Operation::Retain(n) | Operation::Delete(n) => *n,
      Operation::Insert(s) => s.chars().count(),
    }
  }
}

/// Which side of an insertion a mapped position sticks to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Assoc {
  Before,
  After,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
  changes:   Vec<Operation>,
  /// The required document length. Will refuse to apply changes unless it
  /// matches.
  len:       usize,
  len_after: usize,
}

impl ChangeSet {
  fn with_capacity(capacity: usize) -> Self {
    Self {
      changes:   Vec::with_capacity(capacity),
      len:       0,
      len_after: 0,
    }
  }

  #[must_use]
  pub fn new(doc: RopeSlice) -> Self {
    let len = doc.len_chars();
    Self {
      changes: Vec::new(),
      len,
      len_after: len,
    }
  }

  /// Build a changeset from sorted, non-overlapping replacements.
  pub fn change<I>(doc: &Rope, changes: I) -> Result<Self>
  where
    I: IntoIterator<Item = Change>,
  {
    let len = doc.len_chars();
    let changes = changes.into_iter();
    let (lower, upper) = changes.size_hint();
    let mut changeset = Self::with_capacity(2 * upper.unwrap_or(lower) + 1);

    let mut last = 0;
    for (from, to, tendril) in changes {
      if from > to {
        return Err(ChangeError::InvalidRange { from, to });
      }
      if to > len {
        return Err(ChangeError::RangeOutOfBounds { from, to, len });
      }
      if from < last {
        return Err(ChangeError::OverlappingRange {
          prev_end: last,
          from,
          to,
        });
      }

      changeset.retain(from - last);
      if let Some(text) = tendril {
        changeset.insert(text);
      }
      changeset.delete(to - from);
      last = to;
    }
    changeset.retain(len - last);

    Ok(changeset)
  }

  /// Returns the expected document length for this changeset
  pub fn len(&self) -> usize {
    self.len
  }

  /// Document length once the changeset is applied.
  pub fn len_after(&self) -> usize {
    self.len_after
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.changes.is_empty() || self.changes == [Operation::Retain(self.len)]
  }

  pub fn delete(&mut self, n: usize) {
    use Operation::*;

    if n == 0 {
      return;
    }

    self.len += n;

    if let Some(Delete(count)) = self.changes.last_mut() {
      *count += n;
    } else {
      self.changes.push(Delete(n))
    }
  }

  pub fn insert(&mut self, fragment: Tendril) {
    use Operation::*;

    if fragment.is_empty() {
      return;
    }

    self.len_after += fragment.chars().count();

    let new_last = match self.changes.as_mut_slice() {
      [.., Insert(prev)] | [.., Insert(prev), Delete(_)] => {
        prev.push_str(&fragment);
        return;
      },
      [.., last @ Delete(_)] => std::mem::replace(last, Insert(fragment)),
      _ => Insert(fragment),
    };

    self.changes.push(new_last);
  }

  pub fn retain(&mut self, n: usize) {
    use Operation::*;

    if n == 0 {
      return;
    }

    self.len += n;
    self.len_after += n;

    if let Some(Retain(count)) = self.changes.last_mut() {
      *count += n;
    } else {
      self.changes.push(Retain(n))
    }
  }

  pub fn ensure_len(&self, text_len: usize) -> Result<()> {
    if self.len != text_len {
      return Err(ChangeError::LengthMismatch {
        expected: self.len,
        actual:   text_len,
      });
    }
    Ok(())
  }

  /// Apply this changeset in-place.
  pub fn apply(&self, text: &mut Rope) -> Result<()> {
    self.ensure_len(text.len_chars())?;
    let mut pos = 0;

    for change in &self.changes {
      use Operation::*;
      match change {
        Retain(n) => pos += n,
        Delete(n) => text.remove(pos..pos + *n),
        Insert(s) => {
          text.insert(pos, s);
          pos += s.chars().count();
        },
      }
    }

    Ok(())
  }

  /// Map a position in the old document to the new one.
  ///
  /// Positions inside deleted or replaced text collapse onto the edit; at an
  /// insertion point `assoc` decides whether they land before or after the
  /// inserted text.
  pub fn map_pos(&self, pos: usize, assoc: Assoc) -> Result<usize> {
    use Operation::*;

    if pos > self.len {
      return Err(ChangeError::PositionOutOfBounds { pos, len: self.len });
    }

    let mut old_pos = 0;
    let mut new_pos = 0;
    let mut iter = self.changes.iter().peekable();
    while let Some(change) = iter.next() {
      match change {
        Retain(n) => {
          if pos < old_pos + n {
            return Ok(new_pos + (pos - old_pos));
          }
          old_pos += n;
          new_pos += n;
        },
        Delete(n) => {
          if pos < old_pos + n {
            return Ok(new_pos);
          }
          old_pos += n;
        },
        Insert(s) => {
          let inserted = s.chars().count();
          let side = match assoc {
            Assoc::Before => new_pos,
            Assoc::After => new_pos + inserted,
          };
          // a subsequent delete means a replace, consume it
          let replaced = match iter.peek() {
            Some(Delete(n)) => {
              iter.next();
              *n
            },
            _ => 0,
          };
          if pos == old_pos || pos < old_pos + replaced {
            return Ok(side);
          }
          old_pos += replaced;
          new_pos += inserted;
        },
      }
    }

    // an empty changeset has no trailing retain
    Ok(new_pos + (pos - old_pos))
  }

  pub fn changes_iter(&self) -> ChangeIterator<'_> {
    ChangeIterator {
      iter: self.changes.iter().peekable(),
      pos:  0,
    }
  }

  /// Line ranges of `new_doc` touched by this changeset, merged and sorted.
  ///
  /// `new_doc` must be the document this changeset produced.
  pub fn changed_lines(&self, new_doc: RopeSlice) -> SmallVec<[Range<usize>; 4]> {
    let len_chars = new_doc.len_chars();
    let mut delta: isize = 0;
    let mut lines: SmallVec<[Range<usize>; 4]> = SmallVec::new();

    for (from, to, text) in self.changes_iter() {
      let inserted = text.as_ref().map_or(0, |text| text.chars().count());
      let new_from = (from as isize + delta) as usize;
      let new_to = new_from + inserted;
      delta += inserted as isize - (to - from) as isize;

      let start = new_doc.char_to_line(new_from.min(len_chars));
      let end = new_doc.char_to_line(new_to.min(len_chars)) + 1;
      match lines.last_mut() {
        Some(last) if start <= last.end => last.end = last.end.max(end),
        _ => lines.push(start..end),
      }
    }

    lines
  }
}

pub struct ChangeIterator<'a> {
  iter: std::iter::Peekable<std::slice::Iter<'a, Operation>>,
  pos:  usize,
}

impl Iterator for ChangeIterator<'_> {
  type Item = Change;

  fn next(&mut self) -> Option<Self::Item> {
    use Operation::*;

    loop {
      match self.iter.next()? {
        Retain(len) => {
          self.pos += len;
        },
        Delete(len) => {
          let start = self.pos;
          self.pos += len;
          return Some((start, self.pos, None));
        },
        Insert(s) => {
          let start = self.pos;
          // a subsequent delete means a replace, consume it
          if let Some(Delete(len)) = self.iter.peek() {
            self.iter.next();

            self.pos += len;
            return Some((start, self.pos, Some(s.clone())));
          } else {
            return Some((start, start, Some(s.clone())));
          }
        },
      }
    }
  }
}
