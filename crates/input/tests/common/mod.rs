//! Scripted host for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use modus_input::Host;
use modus_input::keymap::{ComposedKeymap, KeyPath, KeymapTable, TableKind};

/// A scripted editor host: reads come from queues, installs and notices are
/// recorded for assertions.
pub struct MockHost {
	pub pos: usize,
	pub buffer: u32,
	pub max_pos: usize,
	pub selection: Option<(usize, usize)>,
	pub table: Arc<ComposedKeymap>,
	pub installs: usize,
	pub key_reads: usize,
	pub queued_keys: VecDeque<Option<KeyPath>>,
	pub queued_chars: VecDeque<Option<char>>,
	pub notices: Vec<String>,
	pub deleted: Vec<(usize, usize)>,
	pub copied: Vec<(usize, usize)>,
}

impl MockHost {
	pub fn new() -> Self {
		let baseline = Arc::new(KeymapTable::new(TableKind::Sparse));
		Self::with_baseline(baseline)
	}

	pub fn with_baseline(baseline: Arc<KeymapTable>) -> Self {
		Self {
			pos: 0,
			buffer: 1,
			max_pos: 100,
			selection: None,
			table: Arc::new(ComposedKeymap::base(baseline)),
			installs: 0,
			key_reads: 0,
			queued_keys: VecDeque::new(),
			queued_chars: VecDeque::new(),
			notices: Vec::new(),
			deleted: Vec::new(),
			copied: Vec::new(),
		}
	}

	/// Queues a key sequence for the next `read_key_sequence`.
	pub fn queue_key(&mut self, text: &str) {
		self.queued_keys.push_back(Some(text.parse().expect("test key parses")));
	}

	/// Queues an already-built path (e.g. a remap form).
	pub fn queue_path(&mut self, path: KeyPath) {
		self.queued_keys.push_back(Some(path));
	}

	/// Queues an interrupted read.
	pub fn queue_interrupt(&mut self) {
		self.queued_keys.push_back(None);
	}
}

impl Host for MockHost {
	type Pos = usize;
	type BufferId = u32;

	fn position(&self) -> usize {
		self.pos
	}

	fn set_position(&mut self, pos: usize) {
		self.pos = pos;
	}

	fn buffer(&self) -> u32 {
		self.buffer
	}

	fn is_valid_position(&self, pos: usize) -> bool {
		pos <= self.max_pos
	}

	fn selection(&self) -> Option<(usize, usize)> {
		self.selection
	}

	fn read_key_sequence(&mut self, _prompt: &str) -> Option<KeyPath> {
		self.key_reads += 1;
		self.queued_keys.pop_front().flatten()
	}

	fn read_char(&mut self, _prompt: &str) -> Option<char> {
		self.queued_chars.pop_front().flatten()
	}

	fn read_line(&mut self, _prompt: &str) -> Option<String> {
		None
	}

	fn active_table(&self) -> Arc<ComposedKeymap> {
		self.table.clone()
	}

	fn install_active_table(&mut self, table: Arc<ComposedKeymap>) {
		self.installs += 1;
		self.table = table;
	}

	fn delete_range(&mut self, from: usize, to: usize) {
		self.deleted.push((from, to));
	}

	fn copy_range(&mut self, from: usize, to: usize) {
		self.copied.push((from, to));
	}

	fn notify(&mut self, message: &str) {
		self.notices.push(message.to_string());
	}
}
