use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::Error;
use crate::parser::{Node, parse_seq};

/// A binding key: a literal chord sequence, or a command remap.
///
/// The remap form redirects an existing command instead of claiming a
/// literal key; it is written `<remap> command-name` in key text and passes
/// through prefix transforms unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPath {
	/// An ordered, non-empty chord sequence.
	Seq(Vec<Node>),
	/// Redirects invocations of the named command to this entry's binding.
	Remap(Arc<str>),
}

impl KeyPath {
	/// Creates a chord-sequence path.
	///
	/// # Errors
	///
	/// Returns [`Error::EmptyKeyPath`] for an empty sequence — the empty
	/// sequence is reserved for "no key consumed" and is never a binding key.
	pub fn seq(nodes: Vec<Node>) -> Result<Self, Error> {
		if nodes.is_empty() {
			return Err(Error::EmptyKeyPath);
		}
		Ok(Self::Seq(nodes))
	}

	/// Creates a single-chord path.
	pub fn single(node: Node) -> Self {
		Self::Seq(vec![node])
	}

	/// Creates a remap path redirecting `command`.
	pub fn remap(command: impl Into<Arc<str>>) -> Self {
		Self::Remap(command.into())
	}

	/// Returns the chord sequence, or `None` for a remap path.
	pub fn as_seq(&self) -> Option<&[Node]> {
		match self {
			Self::Seq(nodes) => Some(nodes),
			Self::Remap(_) => None,
		}
	}

	/// Returns `true` for the remap form.
	pub fn is_remap(&self) -> bool {
		matches!(self, Self::Remap(_))
	}
}

impl fmt::Display for KeyPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Seq(nodes) => {
				for (i, node) in nodes.iter().enumerate() {
					if i > 0 {
						write!(f, " ")?;
					}
					write!(f, "{node}")?;
				}
				Ok(())
			}
			Self::Remap(command) => write!(f, "<remap> {command}"),
		}
	}
}

impl FromStr for KeyPath {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if let Some(command) = s.strip_prefix("<remap>") {
			let command = command.trim();
			if command.is_empty() {
				return Err(Error::InvalidKeymap("<remap> requires a command name".into()));
			}
			return Ok(Self::remap(command));
		}
		Self::seq(parse_seq(s)?)
	}
}

/// A key given either as notation text or as an already-built path.
///
/// Definition entry points accept `impl Into<KeySpec>` so call sites can
/// pass `"C-x C-s"` directly or construct remap paths explicitly.
#[derive(Debug, Clone)]
pub enum KeySpec {
	Text(String),
	Path(KeyPath),
}

impl KeySpec {
	/// Resolves the spec to a [`KeyPath`], parsing textual forms.
	pub fn into_path(self) -> Result<KeyPath, Error> {
		match self {
			Self::Text(text) => text.parse(),
			Self::Path(path) => Ok(path),
		}
	}
}

impl From<&str> for KeySpec {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl From<String> for KeySpec {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<KeyPath> for KeySpec {
	fn from(path: KeyPath) -> Self {
		Self::Path(path)
	}
}

/// Normalizes a prefix string for concatenation with a rendered key.
///
/// Appends exactly one trailing space iff the prefix's last character is
/// neither a space nor `-`, so that `"C-" + "x"` yields `"C-x"` while
/// `"M" + "x"` yields the space-joined two-chord form `"M x"`.
pub fn normalize_prefix(prefix: &str) -> Cow<'_, str> {
	match prefix.chars().last() {
		Some(' ') | Some('-') => Cow::Borrowed(prefix),
		_ => Cow::Owned(format!("{prefix} ")),
	}
}
