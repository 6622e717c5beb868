//! Modal keystate registry and operator dispatch.
//!
//! A keystate is a named modal configuration: an ordered list of
//! composition specs that defines the full active command table while that
//! mode is in effect. [`ModalEngine`] is the explicit context object that
//! owns keymap, keystate, and command definitions; the host editor owns the
//! engine and the single active-table slot (see [`Host`]).
//!
//! Operators are commands parameterized by a text range. The range comes
//! from the active selection when there is one, or from reading one further
//! motion key against a temporary overlay keymap.

pub use engine::ModalEngine;
pub use error::{CommandError, Error};
pub use host::Host;
pub use modus_keymap as keymap;
pub use types::{CommandResult, DispatchOutcome, MotionFn, MotionRange, MotionSpec, OnConflict, OperatorBody};

mod engine;
mod error;
mod host;
mod operator;
mod types;
