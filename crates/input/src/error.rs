use thiserror::Error;

/// Errors that can occur during command execution.
///
/// Motion and operator bodies return this; the engine wraps it in
/// [`Error::Command`] when surfacing it to the invoking context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
	/// General command failure with message.
	#[error("{0}")]
	Failed(String),
	/// Command name was not found in the registry.
	#[error("command not found: {0}")]
	NotFound(String),
	/// Operation not supported for this command kind.
	#[error("unsupported operation: {0}")]
	Unsupported(&'static str),
}

/// Errors surfaced by the modal engine.
///
/// All of these are synchronous, user-facing, and non-fatal: a failure is
/// terminal for that single invocation and never corrupts registry state.
#[derive(Error, Debug)]
pub enum Error {
	/// Keymap construction or composition failed.
	#[error(transparent)]
	Keymap(#[from] modus_keymap::Error),
	/// Activation was requested with no resolvable target and no usable
	/// default.
	#[error("no valid keystate to activate")]
	NoValidKeystate,
	/// The motion read produced no command, an unbound command, or a
	/// cross-buffer jump.
	#[error("invalid motion: {0}")]
	InvalidMotion(&'static str),
	/// An operator was invoked with an explicit range whose `beg` or `end`
	/// is not a valid position.
	#[error("invalid {which} position: {detail}")]
	InvalidArgument { which: &'static str, detail: String },
	/// The user declined (or could not be asked) to overwrite an existing
	/// same-named definition.
	#[error("'{0}' is already defined")]
	DuplicateDefinition(String),
	/// A command body failed.
	#[error(transparent)]
	Command(#[from] CommandError),
}
