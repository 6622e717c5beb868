use std::fmt::Debug;
use std::sync::Arc;

use modus_keymap::{ComposedKeymap, KeyPath};

/// The editor environment the engine runs against.
///
/// The engine is stateless with respect to the editor beyond what this
/// trait exposes: it never assumes a singleton. The host owns the buffer
/// model, the input source, and the single active command-table slot.
///
/// Dispatch is single-threaded and synchronous; the only suspension points
/// are the blocking reads. A read interrupted by the host's cancellation
/// gesture returns `None` and is folded into the normal failure path,
/// never treated as a fault.
pub trait Host {
	/// A buffer position. Total order; `from > to` in a range encodes
	/// backward motion, not document order.
	type Pos: Copy + PartialEq + PartialOrd + Debug;
	/// Identity of a buffer, compared to detect cross-buffer motions.
	type BufferId: Copy + PartialEq + Debug;

	/// Current cursor position in the active buffer.
	fn position(&self) -> Self::Pos;

	/// Moves the cursor.
	fn set_position(&mut self, pos: Self::Pos);

	/// Identity of the active buffer.
	fn buffer(&self) -> Self::BufferId;

	/// Whether `pos` is a well-formed position in the active buffer.
	fn is_valid_position(&self, pos: Self::Pos) -> bool;

	/// Active selection as `(anchor, cursor)`, if one exists.
	fn selection(&self) -> Option<(Self::Pos, Self::Pos)>;

	/// Blocking read of one key sequence. `None` on interrupt.
	fn read_key_sequence(&mut self, prompt: &str) -> Option<KeyPath>;

	/// Blocking read of one character. `None` on interrupt.
	fn read_char(&mut self, prompt: &str) -> Option<char>;

	/// Blocking read of one line of text. `None` on interrupt.
	fn read_line(&mut self, prompt: &str) -> Option<String>;

	/// The currently installed command table.
	fn active_table(&self) -> Arc<ComposedKeymap>;

	/// Atomically replaces the installed command table.
	fn install_active_table(&mut self, table: Arc<ComposedKeymap>);

	/// Deletes the span between two positions.
	fn delete_range(&mut self, from: Self::Pos, to: Self::Pos);

	/// Copies the span between two positions to the clipboard.
	fn copy_range(&mut self, from: Self::Pos, to: Self::Pos);

	/// Reports an informational notice to the user.
	fn notify(&mut self, message: &str);
}
