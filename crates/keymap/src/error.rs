use thiserror::Error;

use crate::parser::ParseError;

/// Errors produced by keymap construction, transformation, and composition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
	/// An argument was not a keymap table and could not be resolved to one.
	#[error("invalid keymap: {0}")]
	InvalidKeymap(String),
	/// A key description failed to parse.
	#[error(transparent)]
	Parse(#[from] ParseError),
	/// An empty chord sequence was used as a binding key.
	#[error("empty key path")]
	EmptyKeyPath,
}
