use std::sync::Arc;

use crate::parser::Node;
use crate::prefix::apply_prefix;
use crate::{Binding, Error, KeyPath, KeymapTable, TableKind};

/// Where a composition spec's table comes from.
///
/// `Named` is symbolic indirection: the name is looked up at composition
/// time, never captured at definition time, so redefining the named table
/// propagates to dependents on their next (re-)composition.
#[derive(Debug, Clone)]
pub enum KeymapSource {
	Table(Arc<KeymapTable>),
	Named(Arc<str>),
}

/// A prefix transform attached to a composition spec.
#[derive(Debug, Clone)]
pub struct Prefix {
	pub text: String,
	/// Whether nested tables are prefix-transformed too.
	pub recurse: bool,
}

/// One element of a keystate's ordered composition list: a keymap source,
/// used verbatim or under a prefix transform. Immutable once stored.
#[derive(Debug, Clone)]
pub struct CompositionSpec {
	source: KeymapSource,
	prefix: Option<Prefix>,
}

impl CompositionSpec {
	/// A bare table, used verbatim.
	pub fn direct(table: Arc<KeymapTable>) -> Self {
		Self {
			source: KeymapSource::Table(table),
			prefix: None,
		}
	}

	/// A symbolic reference, resolved at composition time.
	pub fn named(name: impl Into<Arc<str>>) -> Self {
		Self {
			source: KeymapSource::Named(name.into()),
			prefix: None,
		}
	}

	/// Attaches a prefix transform to this spec.
	pub fn with_prefix(mut self, text: impl Into<String>, recurse: bool) -> Self {
		self.prefix = Some(Prefix {
			text: text.into(),
			recurse,
		});
		self
	}
}

/// Result of resolving a chord sequence against a composed surface.
#[derive(Debug)]
pub enum LookupOutcome<'a> {
	/// The sequence resolved to a binding (command, or explicit unbound).
	Match(&'a Binding),
	/// The sequence lands on a nested table; more chords are needed.
	Pending,
	/// No entry matched.
	None,
}

/// An ordered list of resolved tables plus an optional parent surface.
///
/// Conceptually a single lookup table: specs are scanned in list order and
/// the first table *containing* a key wins (an explicit
/// [`Binding::Unbound`] entry counts and shadows); the parent is consulted
/// only when no spec table contains the key. Not persisted — rebuilt on
/// every keystate activation.
#[derive(Debug, Clone)]
pub struct ComposedKeymap {
	tables: Vec<Arc<KeymapTable>>,
	parent: Option<Arc<ComposedKeymap>>,
}

impl ComposedKeymap {
	/// Wraps a single table as a composed surface with no parent.
	pub fn base(table: Arc<KeymapTable>) -> Self {
		Self {
			tables: vec![table],
			parent: None,
		}
	}

	/// Layers `table` above an existing surface.
	pub fn overlay(table: Arc<KeymapTable>, parent: Arc<ComposedKeymap>) -> Self {
		Self {
			tables: vec![table],
			parent: Some(parent),
		}
	}

	/// Exact-match lookup with first-match-wins precedence.
	pub fn lookup(&self, key: &KeyPath) -> Option<&Binding> {
		for table in &self.tables {
			if let Some(binding) = table.get(key) {
				return Some(binding);
			}
		}
		self.parent.as_deref().and_then(|parent| parent.lookup(key))
	}

	/// Resolves a full chord sequence, descending through nested tables.
	///
	/// Tries an exact match on the whole sequence first, then the longest
	/// bound prefix whose binding is a nested table, resolving the remainder
	/// inside it.
	pub fn resolve(&self, seq: &[Node]) -> LookupOutcome<'_> {
		if seq.is_empty() {
			return LookupOutcome::None;
		}

		if let Some(binding) = self.lookup(&KeyPath::Seq(seq.to_vec())) {
			return match binding {
				Binding::Keymap(_) => LookupOutcome::Pending,
				bound => LookupOutcome::Match(bound),
			};
		}

		for split in (1..seq.len()).rev() {
			if let Some(Binding::Keymap(nested)) = self.lookup(&KeyPath::Seq(seq[..split].to_vec())) {
				return resolve_in(nested, &seq[split..]);
			}
		}

		LookupOutcome::None
	}

	/// Looks up the remap binding for a command, if any.
	pub fn remap_of(&self, command: &str) -> Option<&Binding> {
		self.lookup(&KeyPath::remap(command))
	}

	/// Collapses the spec tables (not the parent) into one sparse table
	/// honoring lookup precedence. Used to build motion overlays.
	pub fn flatten_sparse(&self) -> KeymapTable {
		let mut out = KeymapTable::new(TableKind::Sparse);
		for table in &self.tables {
			for (key, binding) in table.entries() {
				if !out.contains(key) {
					out.insert(key.clone(), binding.clone());
				}
			}
		}
		out
	}

	/// Returns the resolved spec tables in precedence order.
	pub fn tables(&self) -> &[Arc<KeymapTable>] {
		&self.tables
	}

	/// Returns the parent surface, if any.
	pub fn parent(&self) -> Option<&Arc<ComposedKeymap>> {
		self.parent.as_ref()
	}
}

/// Sequence resolution within one table, mirroring
/// [`ComposedKeymap::resolve`].
fn resolve_in<'a>(table: &'a KeymapTable, seq: &[Node]) -> LookupOutcome<'a> {
	if seq.is_empty() {
		return LookupOutcome::Pending;
	}

	if let Some(binding) = table.get(&KeyPath::Seq(seq.to_vec())) {
		return match binding {
			Binding::Keymap(_) => LookupOutcome::Pending,
			bound => LookupOutcome::Match(bound),
		};
	}

	for split in (1..seq.len()).rev() {
		if let Some(Binding::Keymap(nested)) = table.get(&KeyPath::Seq(seq[..split].to_vec())) {
			return resolve_in(nested, &seq[split..]);
		}
	}

	LookupOutcome::None
}

/// Composes an ordered spec list and an optional parent into one surface.
///
/// Each spec is resolved to its effective table — symbolic sources through
/// `resolve`, prefixed specs through [`apply_prefix`] — in list order.
///
/// # Errors
///
/// Returns [`Error::InvalidKeymap`] when a symbolic source does not name a
/// table, and propagates prefix-transform failures.
pub fn compose(
	specs: &[CompositionSpec],
	parent: Option<Arc<ComposedKeymap>>,
	resolve: &dyn Fn(&str) -> Option<Arc<KeymapTable>>,
) -> Result<ComposedKeymap, Error> {
	let mut tables = Vec::with_capacity(specs.len());

	for spec in specs {
		let table = match &spec.source {
			KeymapSource::Table(table) => table.clone(),
			KeymapSource::Named(name) => resolve(name).ok_or_else(|| Error::InvalidKeymap(format!("'{name}' does not name a keymap")))?,
		};

		let table = match &spec.prefix {
			Some(prefix) => Arc::new(apply_prefix(&table, &prefix.text, prefix.recurse)?),
			None => table,
		};

		tables.push(table);
	}

	Ok(ComposedKeymap { tables, parent })
}
