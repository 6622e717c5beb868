//! The operator protocol: range acquisition and body execution.
//!
//! An operator resolves its range from the active selection when one
//! exists, otherwise by reading one further key sequence against a
//! temporary overlay keymap and interpreting the resolved motion's result.
//! The body runs exactly once, only after a range is fully resolved.

use std::sync::Arc;

use modus_keymap::{Binding, ComposedKeymap, CompositionSpec, KeyPath, KeymapTable, LookupOutcome, TableKind, compose};
use tracing::debug;

use crate::engine::{CommandEntry, ModalEngine, OperatorEntry};
use crate::error::Error;
use crate::host::Host;
use crate::types::{MotionRange, MotionSpec};

impl<H: Host> ModalEngine<H> {
	/// Runs the full range-acquisition protocol for an operator.
	pub(crate) fn run_operator(&self, host: &mut H, op: &OperatorEntry<H>) -> Result<(), Error> {
		// Selection fast path: no input is consumed, no overlay installed.
		if let Some((anchor, cursor)) = host.selection() {
			return self.run_body(host, op, anchor, cursor);
		}

		let overlay = self.build_overlay(host, &op.extra_motions)?;

		// The overlay shadows ordinary bindings only for the duration of
		// the read; the guard restores the prior table on every exit path.
		let (prior_pos, prior_buffer, read) = {
			let mut guard = OverlayGuard::install(host, overlay.clone());
			let pos = guard.host.position();
			let buffer = guard.host.buffer();
			let read = guard.read_key_sequence(&format!("{}: motion", op.name));
			(pos, buffer, read)
		};

		let Some(path) = read else {
			return Err(Error::InvalidMotion("motion read interrupted"));
		};
		let Some(seq) = path.as_seq() else {
			return Err(Error::InvalidMotion("remap form is not a motion key"));
		};

		let command = match overlay.resolve(seq) {
			LookupOutcome::Match(Binding::Command(name)) => name.clone(),
			_ => return Err(Error::InvalidMotion("key sequence is not bound to a command")),
		};

		let Some(entry) = self.commands.get(&command) else {
			return Err(Error::InvalidMotion("motion key is bound to an unknown command"));
		};

		let reported = match entry {
			CommandEntry::Motion(run) => run(host)?,
			CommandEntry::Operator(nested) => {
				self.run_operator(host, nested)?;
				None
			}
		};

		// A motion that jumps to a different buffer cannot produce a valid
		// in-buffer range for this operator.
		if host.buffer() != prior_buffer {
			return Err(Error::InvalidMotion("motion switched buffers"));
		}

		// A self-reported range is used verbatim, direction included;
		// otherwise the range is where the cursor was and where it ended up.
		let range = match reported {
			Some(range) => range,
			None => MotionRange::new(prior_pos, host.position()),
		};

		self.run_body(host, op, range.from, range.to)
	}

	/// Validates the range endpoints and executes the operator body once.
	pub(crate) fn run_body(&self, host: &mut H, op: &OperatorEntry<H>, beg: H::Pos, end: H::Pos) -> Result<(), Error> {
		if !host.is_valid_position(beg) {
			return Err(Error::InvalidArgument {
				which: "beg",
				detail: format!("{beg:?}"),
			});
		}
		if !host.is_valid_position(end) {
			return Err(Error::InvalidArgument {
				which: "end",
				detail: format!("{end:?}"),
			});
		}

		(op.body)(host, beg, end)?;
		Ok(())
	}

	/// Merges an operator's extra motions into one sparse table and layers
	/// it above the host's currently installed surface.
	fn build_overlay(&self, host: &H, extra: &[MotionSpec]) -> Result<Arc<ComposedKeymap>, Error> {
		let mut specs = Vec::with_capacity(extra.len());

		for motion in extra {
			match motion {
				MotionSpec::Keymap(table) => specs.push(CompositionSpec::direct(table.clone())),
				MotionSpec::Named(name) => specs.push(CompositionSpec::named(name.clone())),
				MotionSpec::Pair(key, command) => {
					let mut single = KeymapTable::new(TableKind::Sparse);
					single.insert(key.parse::<KeyPath>()?, Binding::Command(command.clone()));
					specs.push(CompositionSpec::direct(Arc::new(single)));
				}
			}
		}

		let merged = compose(&specs, None, &|name| self.keymaps.get(name).cloned())?;
		let table = Arc::new(merged.flatten_sparse());
		debug!(entries = table.len(), "motion overlay built");
		Ok(Arc::new(ComposedKeymap::overlay(table, host.active_table())))
	}
}

/// Scoped installation of the motion overlay.
///
/// Restores the previously installed table on drop, so the overlay can
/// never leak into subsequent unrelated dispatch — including when the read
/// is interrupted.
struct OverlayGuard<'a, H: Host> {
	host: &'a mut H,
	previous: Option<Arc<ComposedKeymap>>,
}

impl<'a, H: Host> OverlayGuard<'a, H> {
	fn install(host: &'a mut H, overlay: Arc<ComposedKeymap>) -> Self {
		let previous = host.active_table();
		host.install_active_table(overlay);
		debug!("motion overlay installed");
		Self {
			host,
			previous: Some(previous),
		}
	}

	fn read_key_sequence(&mut self, prompt: &str) -> Option<KeyPath> {
		self.host.read_key_sequence(prompt)
	}
}

impl<H: Host> Drop for OverlayGuard<'_, H> {
	fn drop(&mut self) {
		if let Some(previous) = self.previous.take() {
			self.host.install_active_table(previous);
			debug!("motion overlay released");
		}
	}
}
