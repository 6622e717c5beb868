//! Keymap tables and composition for modus.
//!
//! Provides the building blocks for modal keystates:
//! - [`KeyPath`]: a chord sequence or command-remap binding key
//! - [`KeymapTable`]: an exact-match mapping from [`KeyPath`] to [`Binding`]
//! - [`apply_prefix`]: rewrite every key in a table under a textual prefix
//! - [`compose`]: merge an ordered spec list plus an optional parent into
//!   one lookup surface with first-match-wins precedence

pub use compose::{ComposedKeymap, CompositionSpec, KeymapSource, LookupOutcome, Prefix, compose};
pub use error::Error;
pub use modus_keymap_parser as parser;
pub use path::{KeyPath, KeySpec, normalize_prefix};
pub use prefix::apply_prefix;
pub use table::{Binding, KeymapTable, TableKind};

mod compose;
mod error;
mod path;
mod prefix;
mod table;
