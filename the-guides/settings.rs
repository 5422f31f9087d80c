//! User settings for indentation guides.
//!
//! The record is persisted by the host as JSON using the key names below.
//! Loading merges the stored record over the defaults, so keys added in later
//! versions pick up their default values.
//!
//! Decoration components never own the settings. They read a snapshot through
//! a [`SettingsHandle`] on every update, and the settings UI writes through the
//! same handle.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
  #[error("invalid settings data: {0}")]
  Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
  /// Tag the active indentation group and emphasize its rail.
  pub show_active_indentation_group: bool,
  pub lists:                         bool,
  /// Lists in reading mode.
  pub preview_lists:                 bool,
  pub code:                          bool,
  /// Indented text that is neither a list nor code.
  #[serde(rename = "uncatagorizedIndents")]
  pub uncategorized_indents:         bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      show_active_indentation_group: true,
      lists:                         true,
      preview_lists:                 false,
      code:                          false,
      uncategorized_indents:         false,
    }
  }
}

impl Settings {
  pub fn from_json(data: &str) -> Result<Self> {
    // The host stores nothing until the first save.
    if data.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_json::from_str(data)?)
  }

  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  pub fn scope_enabled(&self, scope: ScopeClass) -> bool {
    match scope {
      ScopeClass::Lists => self.lists,
      ScopeClass::ListsPreview => self.preview_lists,
      ScopeClass::Code => self.code,
      ScopeClass::Uncategorized => self.uncategorized_indents,
    }
  }

  /// Body classes the host toggles to scope guides per content category.
  pub fn scope_classes(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
    ScopeClass::ALL
      .iter()
      .map(|scope| (scope.as_str(), self.scope_enabled(*scope)))
  }
}

/// Content categories the presentation layer shows guides for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeClass {
  Lists,
  ListsPreview,
  Code,
  Uncategorized,
}

impl ScopeClass {
  pub const ALL: [Self; 4] = [
    Self::Lists,
    Self::ListsPreview,
    Self::Code,
    Self::Uncategorized,
  ];

  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Lists => "ig-lists",
      Self::ListsPreview => "ig-lists-preview",
      Self::Code => "ig-code",
      Self::Uncategorized => "ig-uncategorized",
    }
  }
}

/// Shared, cheaply cloneable access to the current settings.
#[derive(Debug, Clone, Default)]
pub struct SettingsHandle {
  inner: Arc<ArcSwap<Settings>>,
}

impl SettingsHandle {
  pub fn new(settings: Settings) -> Self {
    Self {
      inner: Arc::new(ArcSwap::from_pointee(settings)),
    }
  }

  /// Current snapshot. Identity changes with every store.
  pub fn load(&self) -> Arc<Settings> {
    self.inner.load_full()
  }

  pub fn store(&self, settings: Settings) {
    tracing::debug!(?settings, "settings stored");
    self.inner.store(Arc::new(settings));
  }

  pub fn update(&self, f: impl FnOnce(&mut Settings)) {
    let mut settings = *self.inner.load_full();
    f(&mut settings);
    self.store(settings);
  }
}
