//! The modal engine: keymap, keystate, and command registries plus
//! activation and dispatch.

use std::sync::Arc;

use modus_keymap::parser::Node;
use modus_keymap::{Binding, ComposedKeymap, CompositionSpec, KeySpec, KeymapTable, LookupOutcome, TableKind, compose};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::{CommandError, Error};
use crate::host::Host;
use crate::types::{CommandResult, DispatchOutcome, MotionFn, MotionRange, MotionSpec, OnConflict, OperatorBody};

/// A registered command: a motion, or an operator with its extra motions.
pub(crate) enum CommandEntry<H: Host> {
	Motion(MotionFn<H>),
	Operator(OperatorEntry<H>),
}

/// A registered operator.
pub(crate) struct OperatorEntry<H: Host> {
	pub(crate) name: Arc<str>,
	pub(crate) extra_motions: Vec<MotionSpec>,
	pub(crate) body: OperatorBody<H>,
}

/// The explicit context object owning all modal state.
///
/// Created by the host at startup, mutated only through the definition
/// entry points, and passed to every call — there is no hidden global.
/// Registered keymaps are shared read-only once composed; the composed
/// surface for a keystate is rebuilt on every activation, so edits to the
/// active keystate's spec list take effect on the next (re-)activation,
/// not automatically.
pub struct ModalEngine<H: Host> {
	pub(crate) keymaps: FxHashMap<Arc<str>, Arc<KeymapTable>>,
	keystates: FxHashMap<Arc<str>, Vec<CompositionSpec>>,
	pub(crate) commands: FxHashMap<Arc<str>, CommandEntry<H>>,
	/// The host's baseline table, used as the composition parent.
	baseline: Arc<KeymapTable>,
	active: Option<Arc<str>>,
	default_keystate: Option<Arc<str>>,
}

impl<H: Host> ModalEngine<H> {
	/// Creates an engine over the host's baseline command table.
	pub fn new(baseline: Arc<KeymapTable>) -> Self {
		Self {
			keymaps: FxHashMap::default(),
			keystates: FxHashMap::default(),
			commands: FxHashMap::default(),
			baseline,
			active: None,
			default_keystate: None,
		}
	}

	/// Returns the identifier of the active keystate, if any.
	pub fn active(&self) -> Option<&str> {
		self.active.as_deref()
	}

	/// Returns the default keystate identifier, if configured.
	pub fn default_keystate(&self) -> Option<&str> {
		self.default_keystate.as_deref()
	}

	/// Sets or clears the registry-wide default keystate.
	pub fn set_default_keystate(&mut self, name: Option<&str>) {
		self.default_keystate = name.map(Arc::from);
	}

	/// Defines a named keymap and registers it for symbolic reference.
	///
	/// Entries take key text (`"C-x C-s"`) or a built [`KeyPath`]
	/// (notably the remap form). Later entries replace earlier ones for
	/// the same key within this table.
	///
	/// [`KeyPath`]: modus_keymap::KeyPath
	pub fn define_keymap<K>(
		&mut self,
		name: &str,
		kind: TableKind,
		entries: impl IntoIterator<Item = (K, Binding)>,
		on_conflict: OnConflict<'_>,
	) -> Result<Arc<KeymapTable>, Error>
	where
		K: Into<KeySpec>,
	{
		check_conflict(self.keymaps.contains_key(name), "keymap", name, on_conflict)?;

		let mut table = KeymapTable::new(kind);
		for (key, binding) in entries {
			table.insert(key.into().into_path()?, binding);
		}

		let table = Arc::new(table);
		self.keymaps.insert(Arc::from(name), table.clone());
		debug!(name, entries = table.len(), "keymap defined");
		Ok(table)
	}

	/// Defines a named keystate from an ordered composition-spec list.
	///
	/// The activation entry point for the new keystate is
	/// [`activate`](Self::activate). If `name` is the currently active
	/// keystate, the mode is reinstalled immediately so edits take effect
	/// without an explicit deactivate/reactivate cycle.
	pub fn define_keystate(&mut self, host: &mut H, name: &str, specs: Vec<CompositionSpec>, on_conflict: OnConflict<'_>) -> Result<(), Error> {
		check_conflict(self.keystates.contains_key(name), "keystate", name, on_conflict)?;

		self.keystates.insert(Arc::from(name), specs);
		debug!(name, "keystate defined");

		if self.active.as_deref() == Some(name) {
			self.switch_to(host, Some(name))?;
		}
		Ok(())
	}

	/// Defines a motion command.
	pub fn define_motion(
		&mut self,
		name: &str,
		run: impl Fn(&mut H) -> CommandResult<H::Pos> + 'static,
		on_conflict: OnConflict<'_>,
	) -> Result<(), Error> {
		check_conflict(self.commands.contains_key(name), "motion", name, on_conflict)?;
		self.commands.insert(Arc::from(name), CommandEntry::Motion(Arc::new(run)));
		Ok(())
	}

	/// Defines an operator command.
	///
	/// `extra_motions` are merged into the temporary overlay installed for
	/// this operator's motion read; `body` runs exactly once with
	/// `beg`/`end` bound in motion order after a range is resolved.
	pub fn define_operator(
		&mut self,
		name: &str,
		extra_motions: Vec<MotionSpec>,
		body: impl Fn(&mut H, H::Pos, H::Pos) -> Result<(), CommandError> + 'static,
		on_conflict: OnConflict<'_>,
	) -> Result<(), Error> {
		check_conflict(self.commands.contains_key(name), "operator", name, on_conflict)?;
		let entry = OperatorEntry {
			name: Arc::from(name),
			extra_motions,
			body: Arc::new(body),
		};
		self.commands.insert(Arc::from(name), CommandEntry::Operator(entry));
		Ok(())
	}

	/// Switches to the requested keystate, or disables modal dispatch.
	///
	/// Resolution chain: `None` disables dispatch (baseline table
	/// installed, terminal state, not an error); a known identifier
	/// activates it; an unknown identifier falls back to the configured
	/// default when that names a bound keystate; otherwise the call fails
	/// with [`Error::NoValidKeystate`]. On that failure the active
	/// identifier is reset to `None` while the installed table is left
	/// untouched — degrade-to-disabled semantics for the identifier only.
	pub fn switch_to(&mut self, host: &mut H, requested: Option<&str>) -> Result<(), Error> {
		let Some(requested) = requested else {
			self.active = None;
			host.install_active_table(Arc::new(ComposedKeymap::base(self.baseline.clone())));
			debug!("modal dispatch disabled");
			host.notify("modal editing disabled");
			return Ok(());
		};

		let active: Arc<str> = if self.keystates.contains_key(requested) {
			Arc::from(requested)
		} else if let Some(default) = self.default_keystate.clone().filter(|d| self.keystates.contains_key(&**d)) {
			warn!(requested, default = &*default, "unknown keystate, using default");
			default
		} else {
			self.active = None;
			return Err(Error::NoValidKeystate);
		};

		self.active = Some(active.clone());
		let surface = self.compose_keystate(&active)?;
		host.install_active_table(Arc::new(surface));
		debug!(keystate = &*active, "keystate installed");
		host.notify(&format!("keystate: {active}"));
		Ok(())
	}

	/// Activation entry point: `activate(host, name)` requests keystate
	/// `name` (spelled `switch_to(host, Some(name))`).
	pub fn activate(&mut self, host: &mut H, name: &str) -> Result<(), Error> {
		self.switch_to(host, Some(name))
	}

	/// Composes a keystate's spec list over the baseline table.
	///
	/// Symbolic spec sources are resolved against the keymap registry now,
	/// at composition time, so redefinitions propagate to dependents.
	fn compose_keystate(&self, name: &str) -> Result<ComposedKeymap, Error> {
		let specs = self
			.keystates
			.get(name)
			.ok_or_else(|| modus_keymap::Error::InvalidKeymap(format!("'{name}' does not name a keystate")))?;
		let parent = Arc::new(ComposedKeymap::base(self.baseline.clone()));
		Ok(compose(specs, Some(parent), &|n| self.keymaps.get(n).cloned())?)
	}

	/// Invokes a registered command by name.
	///
	/// Motions report their range (self-reported or `None`); operators run
	/// the full range-acquisition protocol and report `None`.
	pub fn invoke(&self, host: &mut H, name: &str) -> Result<Option<MotionRange<H::Pos>>, Error> {
		match self.commands.get(name) {
			Some(CommandEntry::Motion(run)) => Ok(run(host)?),
			Some(CommandEntry::Operator(op)) => {
				self.run_operator(host, op)?;
				Ok(None)
			}
			None => Err(CommandError::NotFound(name.to_string()).into()),
		}
	}

	/// Invokes an operator non-interactively with an explicit range,
	/// bypassing range acquisition.
	pub fn invoke_operator_with_range(&self, host: &mut H, name: &str, beg: H::Pos, end: H::Pos) -> Result<(), Error> {
		match self.commands.get(name) {
			Some(CommandEntry::Operator(op)) => self.run_body(host, op, beg, end),
			Some(CommandEntry::Motion(_)) => Err(CommandError::Unsupported("not an operator").into()),
			None => Err(CommandError::NotFound(name.to_string()).into()),
		}
	}

	/// Dispatches a chord sequence against the installed command table.
	///
	/// Consults the surface's remap bindings (one redirection step) before
	/// invoking. `Pending` means the sequence is a prefix of a longer
	/// binding and the host loop should accumulate another chord.
	pub fn dispatch(&self, host: &mut H, seq: &[Node]) -> Result<DispatchOutcome, Error> {
		let surface = host.active_table();

		let command = match surface.resolve(seq) {
			LookupOutcome::Match(Binding::Command(name)) => name.clone(),
			LookupOutcome::Match(_) => return Ok(DispatchOutcome::Unhandled),
			LookupOutcome::Pending => return Ok(DispatchOutcome::Pending),
			LookupOutcome::None => return Ok(DispatchOutcome::Unhandled),
		};

		let command = match surface.remap_of(&command) {
			Some(Binding::Command(redirected)) => redirected.clone(),
			_ => command,
		};

		debug!(command = &*command, "dispatching");
		self.invoke(host, &command)?;
		Ok(DispatchOutcome::Dispatched)
	}
}

/// Applies the conflict policy for a definition over an existing name.
fn check_conflict(exists: bool, kind: &str, name: &str, on_conflict: OnConflict<'_>) -> Result<(), Error> {
	if !exists {
		return Ok(());
	}

	match on_conflict {
		OnConflict::Overwrite => {
			warn!(kind, name, "overwriting existing definition");
			Ok(())
		}
		OnConflict::Fail => Err(Error::DuplicateDefinition(name.to_string())),
		OnConflict::Prompt(confirm) => {
			if confirm(&format!("{kind} '{name}' is already defined; redefine?")) {
				Ok(())
			} else {
				Err(Error::DuplicateDefinition(name.to_string()))
			}
		}
	}
}
