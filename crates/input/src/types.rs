use std::sync::Arc;

use modus_keymap::KeymapTable;

use crate::error::CommandError;
use crate::host::Host;

/// The span a motion moved over.
///
/// Direction-preserving: `from` may exceed `to` when the motion moved
/// backward. Operator bodies treat this as "the span touched" and order the
/// endpoints themselves when document order matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionRange<P> {
	pub from: P,
	pub to: P,
}

impl<P: Copy + PartialOrd> MotionRange<P> {
	/// Creates a range in motion order.
	pub fn new(from: P, to: P) -> Self {
		Self { from, to }
	}

	/// Returns the endpoints in document order.
	pub fn ordered(&self) -> (P, P) {
		if self.from <= self.to { (self.from, self.to) } else { (self.to, self.from) }
	}
}

/// What a command invocation produces: optionally a self-reported range.
///
/// A command that returns `None` is still usable as a motion; the engine
/// synthesizes its range from the cursor position before and after.
pub type CommandResult<P> = Result<Option<MotionRange<P>>, CommandError>;

/// A motion (or ordinary point-moving command) body.
pub type MotionFn<H> = Arc<dyn Fn(&mut H) -> CommandResult<<H as Host>::Pos>>;

/// An operator body, invoked with `beg`/`end` bound in motion order.
pub type OperatorBody<H> = Arc<dyn Fn(&mut H, <H as Host>::Pos, <H as Host>::Pos) -> Result<(), CommandError>>;

/// One element of an operator's extra-motion list, merged into the
/// temporary overlay installed for the motion read.
#[derive(Debug, Clone)]
pub enum MotionSpec {
	/// A literal table of motion bindings.
	Keymap(Arc<KeymapTable>),
	/// A single `(key text, command)` binding.
	Pair(String, Arc<str>),
	/// A symbolic reference, resolved against the keymap registry when the
	/// overlay is built.
	Named(Arc<str>),
}

impl MotionSpec {
	pub fn keymap(table: Arc<KeymapTable>) -> Self {
		Self::Keymap(table)
	}

	pub fn pair(key: impl Into<String>, command: impl Into<Arc<str>>) -> Self {
		Self::Pair(key.into(), command.into())
	}

	pub fn named(name: impl Into<Arc<str>>) -> Self {
		Self::Named(name.into())
	}
}

/// Policy applied when a definition would overwrite an existing one.
///
/// `Prompt` asks before overwriting; declining — which includes running
/// non-interactively — aborts the definition and leaves the prior one
/// untouched.
pub enum OnConflict<'a> {
	/// Abort with [`Error::DuplicateDefinition`](crate::Error::DuplicateDefinition).
	Fail,
	/// Replace the existing definition silently.
	Overwrite,
	/// Ask the given callback; `false` aborts.
	Prompt(&'a mut dyn FnMut(&str) -> bool),
}

/// Result of dispatching a chord sequence against the installed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
	/// A command was resolved and executed.
	Dispatched,
	/// The sequence is a prefix of a longer binding; more chords needed.
	Pending,
	/// Nothing is bound to the sequence.
	Unhandled,
}
