use std::sync::Arc;

use crate::path::normalize_prefix;
use crate::{Binding, Error, KeyPath, KeymapTable};

/// Produces a new table whose every key carries the given textual prefix.
///
/// Each chord-sequence key is rendered to text, prepended with
/// [`normalize_prefix`]`(prefix)`, and re-parsed; the output table mirrors
/// the source's [`TableKind`](crate::TableKind). Remap keys pass through
/// unchanged — a remap redirects a command, not a literal key.
///
/// With `recurse`, nested [`Binding::Keymap`] tables are prefix-transformed
/// with the same prefix and flag; otherwise the nested table is shared by
/// reference, unmodified.
///
/// # Errors
///
/// Returns [`Error::Parse`] if a rewritten key does not re-parse — e.g. a
/// prefix that is not itself valid key notation.
pub fn apply_prefix(table: &KeymapTable, prefix: &str, recurse: bool) -> Result<KeymapTable, Error> {
	let mut out = KeymapTable::new(table.kind());

	for (key, binding) in table.entries() {
		let key = match key {
			KeyPath::Remap(_) => key.clone(),
			KeyPath::Seq(_) => format!("{}{}", normalize_prefix(prefix), key).parse()?,
		};

		let binding = match binding {
			Binding::Keymap(nested) if recurse => Binding::Keymap(Arc::new(apply_prefix(nested, prefix, true)?)),
			other => other.clone(),
		};

		out.insert(key, binding);
	}

	Ok(out)
}
