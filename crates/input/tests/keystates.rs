//! Keystate definition, activation, and dispatch against a scripted host.

mod common;

use std::sync::Arc;

use common::MockHost;
use modus_input::keymap::parser::parse_seq;
use modus_input::keymap::{Binding, CompositionSpec, KeyPath, KeymapTable, TableKind};
use modus_input::{DispatchOutcome, Error, Host, ModalEngine, OnConflict};

fn baseline() -> Arc<KeymapTable> {
	let mut table = KeymapTable::new(TableKind::Sparse);
	table.insert("x".parse().unwrap(), Binding::command("self-insert"));
	table.insert("q".parse().unwrap(), Binding::command("self-insert"));
	Arc::new(table)
}

/// Engine with a `normal` keystate: an actions table shadowing a named
/// motions table, both over the baseline.
fn engine_with_normal(host: &mut MockHost) -> ModalEngine<MockHost> {
	let mut engine = ModalEngine::new(baseline());

	engine
		.define_keymap("motions", TableKind::Sparse, [("h", Binding::command("left")), ("x", Binding::command("delete-char"))], OnConflict::Fail)
		.unwrap();
	engine
		.define_keymap("actions", TableKind::Sparse, [("x", Binding::command("cut"))], OnConflict::Fail)
		.unwrap();

	let specs = vec![CompositionSpec::named("actions"), CompositionSpec::named("motions")];
	engine.define_keystate(host, "normal", specs, OnConflict::Fail).unwrap();
	engine
}

fn lookup_command(host: &MockHost, key: &str) -> Option<String> {
	host.table.lookup(&key.parse().unwrap()).and_then(|b| b.as_command().map(str::to_string))
}

#[test]
fn switch_to_none_disables_modal_dispatch() {
	let mut host = MockHost::new();
	let mut engine = engine_with_normal(&mut host);
	engine.activate(&mut host, "normal").unwrap();

	engine.switch_to(&mut host, None).unwrap();

	assert_eq!(engine.active(), None);
	assert!(host.notices.iter().any(|n| n == "modal editing disabled"), "notices: {:?}", host.notices);
	// Baseline only: the keystate's bindings are gone.
	assert_eq!(lookup_command(&host, "x").as_deref(), Some("self-insert"));
	assert_eq!(lookup_command(&host, "h"), None);
}

#[test]
fn activation_installs_composed_surface_with_precedence() {
	let mut host = MockHost::new();
	let mut engine = engine_with_normal(&mut host);

	engine.activate(&mut host, "normal").unwrap();

	assert_eq!(engine.active(), Some("normal"));
	assert!(host.notices.iter().any(|n| n == "keystate: normal"), "notices: {:?}", host.notices);
	// actions shadows motions, both shadow the baseline.
	assert_eq!(lookup_command(&host, "x").as_deref(), Some("cut"));
	assert_eq!(lookup_command(&host, "h").as_deref(), Some("left"));
	assert_eq!(lookup_command(&host, "q").as_deref(), Some("self-insert"));
}

#[test]
fn unknown_keystate_falls_back_to_default() {
	let mut host = MockHost::new();
	let mut engine = engine_with_normal(&mut host);
	engine.set_default_keystate(Some("normal"));

	engine.switch_to(&mut host, Some("no-such-state")).unwrap();

	assert_eq!(engine.active(), Some("normal"));
	assert!(host.notices.iter().any(|n| n == "keystate: normal"), "notices: {:?}", host.notices);
}

#[test]
fn switch_unknown_without_default_degrades_to_disabled() {
	let mut host = MockHost::new();
	let mut engine = engine_with_normal(&mut host);
	engine.activate(&mut host, "normal").unwrap();
	let installed_before = host.table.clone();
	let installs_before = host.installs;

	let err = engine.switch_to(&mut host, Some("no-such-state")).unwrap_err();
	assert!(matches!(err, Error::NoValidKeystate));

	// The identifier degrades to disabled, but the installed table is left
	// untouched, not reinstalled and not swapped.
	assert_eq!(engine.active(), None);
	assert_eq!(host.installs, installs_before);
	assert!(Arc::ptr_eq(&host.table, &installed_before));
	assert_eq!(lookup_command(&host, "x").as_deref(), Some("cut"));
}

#[test]
fn unknown_default_does_not_rescue_activation() {
	let mut host = MockHost::new();
	let mut engine = engine_with_normal(&mut host);
	engine.set_default_keystate(Some("also-missing"));

	let err = engine.switch_to(&mut host, Some("no-such-state")).unwrap_err();
	assert!(matches!(err, Error::NoValidKeystate));
}

#[test]
fn redefining_the_active_keystate_reinstalls_immediately() {
	let mut host = MockHost::new();
	let mut engine = engine_with_normal(&mut host);
	engine.activate(&mut host, "normal").unwrap();
	assert_eq!(lookup_command(&host, "x").as_deref(), Some("cut"));

	// Drop the actions layer; motions should win for "x" after redefinition
	// without an explicit deactivate/reactivate cycle.
	let specs = vec![CompositionSpec::named("motions")];
	engine.define_keystate(&mut host, "normal", specs, OnConflict::Overwrite).unwrap();

	assert_eq!(engine.active(), Some("normal"));
	assert_eq!(lookup_command(&host, "x").as_deref(), Some("delete-char"));
}

#[test]
fn redefining_an_inactive_keystate_does_not_touch_the_surface() {
	let mut host = MockHost::new();
	let mut engine = engine_with_normal(&mut host);
	let installs_before = host.installs;

	engine
		.define_keystate(&mut host, "insert", vec![CompositionSpec::named("motions")], OnConflict::Fail)
		.unwrap();

	assert_eq!(host.installs, installs_before);
}

#[test]
fn keymap_redefinition_propagates_on_next_activation() {
	let mut host = MockHost::new();
	let mut engine = engine_with_normal(&mut host);
	engine.activate(&mut host, "normal").unwrap();
	assert_eq!(lookup_command(&host, "h").as_deref(), Some("left"));

	engine
		.define_keymap("motions", TableKind::Sparse, [("h", Binding::command("back-char"))], OnConflict::Overwrite)
		.unwrap();
	// Manual-refresh policy: the installed surface still has the old table
	// until the keystate is re-activated.
	assert_eq!(lookup_command(&host, "h").as_deref(), Some("left"));

	engine.activate(&mut host, "normal").unwrap();
	assert_eq!(lookup_command(&host, "h").as_deref(), Some("back-char"));
}

#[test]
fn activation_with_unresolvable_spec_reports_invalid_keymap() {
	let mut host = MockHost::new();
	let mut engine = ModalEngine::new(baseline());
	engine
		.define_keystate(&mut host, "broken", vec![CompositionSpec::named("ghost")], OnConflict::Fail)
		.unwrap();

	let err = engine.activate(&mut host, "broken").unwrap_err();
	assert!(matches!(err, Error::Keymap(_)), "expected a keymap error, got {err:?}");
}

#[test]
fn duplicate_keystate_definition_respects_policy() {
	let mut host = MockHost::new();
	let mut engine = engine_with_normal(&mut host);

	let err = engine
		.define_keystate(&mut host, "normal", Vec::new(), OnConflict::Fail)
		.unwrap_err();
	assert!(matches!(err, Error::DuplicateDefinition(name) if name == "normal"));

	// The declined redefinition left the prior definition intact.
	engine.activate(&mut host, "normal").unwrap();
	assert_eq!(lookup_command(&host, "x").as_deref(), Some("cut"));
}

#[test]
fn dispatch_runs_bound_commands_and_reports_pending() {
	let mut host = MockHost::new();
	let mut engine = ModalEngine::new(baseline());

	let mut goto = KeymapTable::new(TableKind::Sparse);
	goto.insert("g".parse().unwrap(), Binding::command("goto-top"));
	let mut top = KeymapTable::new(TableKind::Sparse);
	top.insert("g".parse().unwrap(), Binding::keymap(Arc::new(goto)));
	top.insert("d".parse().unwrap(), Binding::command("jump"));

	engine
		.define_keystate(&mut host, "normal", vec![CompositionSpec::direct(Arc::new(top))], OnConflict::Fail)
		.unwrap();
	engine.activate(&mut host, "normal").unwrap();

	engine
		.define_motion(
			"goto-top",
			|h| {
				h.set_position(0);
				Ok(None)
			},
			OnConflict::Fail,
		)
		.unwrap();

	host.pos = 50;
	let seq = parse_seq("g").unwrap();
	assert_eq!(engine.dispatch(&mut host, &seq).unwrap(), DispatchOutcome::Pending);

	let seq = parse_seq("g g").unwrap();
	assert_eq!(engine.dispatch(&mut host, &seq).unwrap(), DispatchOutcome::Dispatched);
	assert_eq!(host.pos, 0);

	let seq = parse_seq("z").unwrap();
	assert_eq!(engine.dispatch(&mut host, &seq).unwrap(), DispatchOutcome::Unhandled);
}

#[test]
fn dispatch_follows_remap_bindings() {
	let mut host = MockHost::new();
	let mut engine = ModalEngine::new(baseline());

	let mut table = KeymapTable::new(TableKind::Sparse);
	table.insert("k".parse().unwrap(), Binding::command("kill-line"));
	table.insert(KeyPath::remap("kill-line"), Binding::command("kill-whole-line"));

	engine
		.define_keystate(&mut host, "normal", vec![CompositionSpec::direct(Arc::new(table))], OnConflict::Fail)
		.unwrap();
	engine.activate(&mut host, "normal").unwrap();

	// Only the remap target is registered; reaching it proves redirection.
	engine
		.define_motion(
			"kill-whole-line",
			|h| {
				h.set_position(99);
				Ok(None)
			},
			OnConflict::Fail,
		)
		.unwrap();

	let seq = parse_seq("k").unwrap();
	assert_eq!(engine.dispatch(&mut host, &seq).unwrap(), DispatchOutcome::Dispatched);
	assert_eq!(host.pos, 99);
}

#[test]
fn explicit_unbound_masks_lower_layers_in_dispatch() {
	let mut host = MockHost::new();
	let mut engine = ModalEngine::new(baseline());

	let mut masking = KeymapTable::new(TableKind::Sparse);
	masking.insert("x".parse().unwrap(), Binding::Unbound);

	engine
		.define_keystate(&mut host, "normal", vec![CompositionSpec::direct(Arc::new(masking))], OnConflict::Fail)
		.unwrap();
	engine.activate(&mut host, "normal").unwrap();

	// Baseline binds "x", but the keystate masks it.
	let seq = parse_seq("x").unwrap();
	assert_eq!(engine.dispatch(&mut host, &seq).unwrap(), DispatchOutcome::Unhandled);
}

#[test]
fn prefixed_spec_activates_under_its_prefix() {
	let mut host = MockHost::new();
	let mut engine = ModalEngine::new(baseline());

	engine
		.define_keymap("window", TableKind::Sparse, [("v", Binding::command("split-vertical"))], OnConflict::Fail)
		.unwrap();
	let specs = vec![CompositionSpec::named("window").with_prefix("C-w", false)];
	engine.define_keystate(&mut host, "normal", specs, OnConflict::Fail).unwrap();
	engine.activate(&mut host, "normal").unwrap();

	assert_eq!(lookup_command(&host, "C-w v").as_deref(), Some("split-vertical"));
	assert_eq!(lookup_command(&host, "v"), None);
}
