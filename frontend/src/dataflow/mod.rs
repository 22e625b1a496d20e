//! Actor+Relay primitives used by every part of the dashboard.
//!
//! - [`Relay`] carries events from UI callbacks and request tasks.
//! - [`Actor`] owns a piece of state and is its only writer.
//! - [`Atom`] holds view-local UI state.

pub mod actor;
pub mod atom;
pub mod relay;

pub use actor::Actor;
pub use atom::Atom;
pub use relay::{relay, Relay};
