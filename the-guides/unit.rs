//! Indentation unit lexing.
//!
//! An [`IndentUnit`] is either a single tab or exactly `tab_width`
//! consecutive spaces. The lexer runs in one of two [`Matching`] modes:
//!
//! - [`Matching::Leading`] reads a line's leading indentation and stops at
//!   the first character that does not start a complete unit, so a short
//!   space run (fewer than `tab_width` spaces) ends the run.
//! - [`Matching::Anywhere`] matches units end-to-end across the whole line,
//!   stepping over anything that is not a unit and resuming after it.
//!
//! ```text
//! tab_width=4   "\t    \tfoo"  Leading   -> [Tab][Spaces][Tab]   depth 3
//! tab_width=4   "      foo"    Leading   -> [Spaces]             depth 1
//! tab_width=4   "  \tfoo"      Leading   -> []                   depth 0
//! tab_width=4   "  \tfoo"      Anywhere  -> [Tab]
//! tab_width=4   "a    b\tc"    Anywhere  -> [Spaces][Tab]
//! ```
//!
//! Line depth and inline marks go through the same [`Units`] iterator, so the
//! two never disagree on what one unit is.
//!
//! A `tab_width` of zero means spaces never form a unit; only tabs count.

use std::iter::FusedIterator;

use ropey::RopeSlice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
  Tab,
  Spaces,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndentUnit {
  pub kind:  UnitKind,
  /// Char offset of the unit relative to the start of its line.
  pub start: usize,
  /// Length in chars: 1 for a tab, `tab_width` for spaces.
  pub len:   usize,
}

impl IndentUnit {
  #[inline]
  pub fn end(&self) -> usize {
    self.start + self.len
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matching {
  /// Only the unbroken run at the start of the line.
  Leading,
  /// Every unit on the line, matched left to right without overlap.
  Anywhere,
}

#[derive(Debug, Clone)]
pub struct Units<I> {
  chars:    I,
  /// Char read past the end of a short space run.
  pending:  Option<char>,
  matching: Matching,
  width:    usize,
  pos:      usize,
  done:     bool,
}

impl<I> Units<I>
where
  I: Iterator<Item = char>,
{
  fn bump(&mut self) -> Option<char> {
    let ch = self.pending.take().or_else(|| self.chars.next());
    if ch.is_some() {
      self.pos += 1;
    }
    ch
  }

  fn unbump(&mut self, ch: Option<char>) {
    if let Some(ch) = ch {
      self.pending = Some(ch);
      self.pos -= 1;
    }
  }
}

impl<I> Iterator for Units<I>
where
  I: Iterator<Item = char>,
{
  type Item = IndentUnit;

  fn next(&mut self) -> Option<Self::Item> {
    while !self.done {
      let start = self.pos;
      let unit = match self.bump() {
        None => {
          self.done = true;
          return None;
        },
        Some('\t') => {
          Some(IndentUnit {
            kind: UnitKind::Tab,
            start,
            len: 1,
          })
        },
        Some(' ') if self.width > 0 => {
          let mut run = 1;
          while run < self.width {
            match self.bump() {
              Some(' ') => run += 1,
              other => {
                self.unbump(other);
                break;
              },
            }
          }
          (run == self.width).then_some(IndentUnit {
            kind: UnitKind::Spaces,
            start,
            len: run,
          })
        },
        Some(_) => None,
      };

      match unit {
        Some(unit) => return Some(unit),
        None if self.matching == Matching::Leading => self.done = true,
        None => {},
      }
    }
    None
  }
}

impl<I> FusedIterator for Units<I> where I: Iterator<Item = char> {}

/// Lex indentation units out of `chars`.
pub fn units<I>(chars: I, tab_width: u16, matching: Matching) -> Units<I::IntoIter>
where
  I: IntoIterator<Item = char>,
{
  Units {
    chars: chars.into_iter(),
    pending: None,
    matching,
    width: tab_width as usize,
    pos: 0,
    done: false,
  }
}

/// Depth of a line: the number of leading indentation units.
#[inline]
pub fn scan(line: &str, tab_width: u16) -> usize {
  units(line.chars(), tab_width, Matching::Leading).count()
}

/// [`scan`] for a rope line, without copying it out of the rope.
#[inline]
pub fn scan_slice(line: RopeSlice, tab_width: u16) -> usize {
  units(line.chars(), tab_width, Matching::Leading).count()
}

/// Number of chars covered by the leading indentation units of `line`.
pub fn prefix_len(line: &str, tab_width: u16) -> usize {
  units(line.chars(), tab_width, Matching::Leading)
    .last()
    .map_or(0, |unit| unit.end())
}
