//! Per-view indentation guide state.
//!
//! [`IndentGuides`] is driven by the host on every state transition (edit or
//! selection change). Each update recomputes the active depth first and only
//! then the group tags and inline marks, so both decoration sets observe the
//! same depth for a given transition.

use std::{
  ops::Range,
  sync::Arc,
};

use ropey::RopeSlice;

use crate::{
  active::{
    ActiveDepth,
    ActiveDepthTracker,
  },
  changes::ChangeSet,
  decoration::{
    LineTag,
    TabMark,
  },
  group::{
    self,
    IndentationGroup,
  },
  marks::{
    TabMarks,
    UpdateStrategy,
  },
  selection::Selection,
  settings::{
    Settings,
    SettingsHandle,
  },
};

/// One state transition as seen by the host.
#[derive(Debug, Clone)]
pub struct GuideUpdate<'a> {
  /// Document after the transition.
  pub doc:       RopeSlice<'a>,
  pub selection: Option<&'a Selection>,
  /// Edit that produced `doc`, `None` for pure selection or viewport changes.
  pub changes:   Option<&'a ChangeSet>,
  /// Visible lines, half-open.
  pub viewport:  Range<usize>,
}

#[derive(Debug)]
pub struct IndentGuides {
  settings:    SettingsHandle,
  snapshot:    Arc<Settings>,
  active:      ActiveDepthTracker,
  group:       IndentationGroup,
  marks:       TabMarks,
  force_build: bool,
}

impl IndentGuides {
  pub fn new(settings: SettingsHandle, tab_width: u16, initial: GuideUpdate<'_>) -> Self {
    let snapshot = settings.load();
    let mut guides = Self {
      settings,
      snapshot,
      active: ActiveDepthTracker::new(tab_width),
      group: IndentationGroup::empty(),
      marks: TabMarks::new(tab_width),
      force_build: true,
    };
    guides.update(initial);
    guides
  }

  pub fn update(&mut self, update: GuideUpdate<'_>) {
    let snapshot = self.settings.load();
    if !Arc::ptr_eq(&snapshot, &self.snapshot) {
      tracing::debug!("settings changed, rebuilding indentation guides");
      self.snapshot = snapshot;
      self.force_build = true;
    }
    let highlight = self.snapshot.show_active_indentation_group;
    let tab_width = self.active.tab_width();

    self.active.update(update.doc, update.selection);
    let active = self.active.get();

    self.group = if highlight {
      group::resolve(update.doc, update.selection, active.depth, tab_width)
    } else {
      IndentationGroup::empty()
    };

    let level = if highlight {
      active.level_ordinal()
    } else {
      None
    };
    let strategy = if std::mem::take(&mut self.force_build) {
      UpdateStrategy::Rebuild
    } else {
      UpdateStrategy::for_highlight(highlight)
    };
    self
      .marks
      .update(strategy, update.doc, update.changes, update.viewport, level);

    tracing::trace!(
      depth = active.depth,
      group = self.group.len(),
      marks = self.marks.marks().len(),
      ?strategy,
      "indentation guides updated"
    );
  }

  /// Switch to a new indentation width. Takes effect on the next update,
  /// which rebuilds every mark.
  pub fn set_tab_width(&mut self, tab_width: u16) {
    if tab_width == self.active.tab_width() {
      return;
    }
    self.active = ActiveDepthTracker::new(tab_width);
    self.marks = TabMarks::new(tab_width);
    self.force_build = true;
  }

  pub fn tab_width(&self) -> u16 {
    self.active.tab_width()
  }

  /// Settings snapshot used by the last update.
  pub fn settings(&self) -> &Settings {
    &self.snapshot
  }

  pub fn active_depth(&self) -> ActiveDepth {
    self.active.get()
  }

  pub fn group(&self) -> &IndentationGroup {
    &self.group
  }

  pub fn line_tags(&self) -> &[LineTag] {
    self.group.tags()
  }

  pub fn tab_marks(&self) -> &[TabMark] {
    self.marks.marks()
  }
}
