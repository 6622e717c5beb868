//! Key-chord notation for modus keymaps.
//!
//! A chord is written as zero or more single-letter modifiers joined to a
//! key with `-`, e.g. `C-x`, `M-f1`, `s-ret`. Sequences are whitespace
//! separated: `C-x C-s`, `g g`. Parsing and rendering round-trip on
//! canonical text.

pub use node::{KEY_SEP, Key, Modifier, Node};
pub use parser::{ParseError, parse, parse_seq};

mod node;
mod parser;
