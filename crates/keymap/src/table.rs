use std::sync::Arc;

use indexmap::IndexMap;

use crate::KeyPath;

/// Structural kind of a table.
///
/// A capacity hint only: dense tables pre-allocate for a full single-chord
/// layer. Both kinds behave identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableKind {
	Dense,
	#[default]
	Sparse,
}

/// Pre-allocation used for dense tables (printable ASCII plus named keys).
const DENSE_CAPACITY: usize = 128;

/// What a key is bound to.
#[derive(Debug, Clone)]
pub enum Binding {
	/// A command reference by name, resolved at dispatch time.
	Command(Arc<str>),
	/// A nested table; one chord is consumed per nesting level.
	Keymap(Arc<KeymapTable>),
	/// Explicitly unbound. An `Unbound` entry occupies its key, so composed
	/// lookup stops there instead of falling through to later tables.
	Unbound,
}

impl Binding {
	/// Creates a command binding.
	pub fn command(name: impl Into<Arc<str>>) -> Self {
		Self::Command(name.into())
	}

	/// Creates a nested-table binding.
	pub fn keymap(table: Arc<KeymapTable>) -> Self {
		Self::Keymap(table)
	}

	/// Returns the command name for command bindings.
	pub fn as_command(&self) -> Option<&str> {
		match self {
			Self::Command(name) => Some(name),
			_ => None,
		}
	}
}

/// A mutable mapping from [`KeyPath`] to [`Binding`].
///
/// Lookups are exact-match on the full path; partial-prefix chaining is
/// expressed with nested [`Binding::Keymap`] entries. Keys are unique within
/// one table and enumeration follows definition order. Tables are mutated at
/// definition time only, then shared read-only via `Arc` once composed.
#[derive(Debug, Clone, Default)]
pub struct KeymapTable {
	kind: TableKind,
	entries: IndexMap<KeyPath, Binding>,
}

impl KeymapTable {
	/// Creates an empty table of the given kind.
	pub fn new(kind: TableKind) -> Self {
		let entries = match kind {
			TableKind::Dense => IndexMap::with_capacity(DENSE_CAPACITY),
			TableKind::Sparse => IndexMap::new(),
		};
		Self { kind, entries }
	}

	/// Returns the structural kind.
	pub fn kind(&self) -> TableKind {
		self.kind
	}

	/// Inserts a binding, replacing any previous binding for the same key.
	pub fn insert(&mut self, key: KeyPath, binding: Binding) {
		self.entries.insert(key, binding);
	}

	/// Looks up a key by exact match.
	pub fn get(&self, key: &KeyPath) -> Option<&Binding> {
		self.entries.get(key)
	}

	/// Returns `true` if the key has an entry, including an explicit
	/// [`Binding::Unbound`] one.
	pub fn contains(&self, key: &KeyPath) -> bool {
		self.entries.contains_key(key)
	}

	/// Enumerates entries in definition order.
	pub fn entries(&self) -> impl Iterator<Item = (&KeyPath, &Binding)> {
		self.entries.iter()
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` if the table has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
