//! Decorations handed to the host's rendering layer.
//!
//! Two collections come out of every update: [`LineTag`]s marking the lines of
//! the active indentation group, and [`TabMark`]s covering each indentation
//! unit on the visible lines. Class names match the host stylesheet.

use std::ops::Range;

use smallvec::{
  SmallVec,
  smallvec,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuideClass {
  /// Base style of every indentation unit.
  Tab,
  /// Emphasis on the unit at the boundary of the active depth.
  IndentGroupLevel,
  /// Line-level tag for members of the active group.
  IndentGroup,
}

impl GuideClass {
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Tab => "cm-tab",
      Self::IndentGroupLevel => "cm-indent-group-level",
      Self::IndentGroup => "cm-indent-group",
    }
  }
}

/// Line-level tag. Always carries [`GuideClass::IndentGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineTag {
  pub line:     usize,
  /// Char offset of the line start, where the tag is anchored.
  pub char_idx: usize,
}

impl LineTag {
  pub const fn class(&self) -> GuideClass {
    GuideClass::IndentGroup
  }
}

/// Inline mark over one indentation unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TabMark {
  pub line:         usize,
  /// Document char range of the unit.
  pub range:        Range<usize>,
  /// Position of the unit among the units matched on its line, starting at 0.
  pub ordinal:      usize,
  pub active_level: bool,
}

impl TabMark {
  pub fn classes(&self) -> SmallVec<[GuideClass; 2]> {
    if self.active_level {
      smallvec![GuideClass::Tab, GuideClass::IndentGroupLevel]
    } else {
      smallvec![GuideClass::Tab]
    }
  }

  /// Space separated class attribute, as the host stylesheet expects it.
  pub fn class_attr(&self) -> String {
    self
      .classes()
      .iter()
      .map(|class| class.as_str())
      .collect::<Vec<_>>()
      .join(" ")
  }
}
