//! Indentation guides for a text view: per-line indentation depth, the group
//! of lines around the cursor, and inline marks over every indentation unit.

use smartstring::{LazyCompact, SmartString};

pub mod active;
pub mod changes;
pub mod decoration;
pub mod group;
pub mod guides;
pub mod marks;
pub mod selection;
pub mod settings;
pub mod unit;

pub use guides::{
  GuideUpdate,
  IndentGuides,
};
pub use unit::scan;

pub type Tendril = SmartString<LazyCompact>;
