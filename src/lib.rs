//! Fine-grained lazy reactive signals.
//!
//! The graph has two kinds of nodes: [`input`] leaves hold mutable values,
//! and derivations built with [`read`] (or [`Signal::read`]) compute from
//! them. Derivations are lazy and cached: nothing runs until a value is
//! read, and a read recomputes only the nodes whose transitive inputs
//! actually changed. Writing an input marks exactly its current consumers
//! dirty; recomputation that produces an equal value stops the cascade
//! there.
//!
//! Dependencies are discovered while a derivation runs, so a body that
//! consults different sources on different branches is re-dirtied only by
//! the branch it last took. A body may also return another signal, which is
//! read through transparently.
//!
//! ```
//! use pull_signals::{input, read};
//!
//! let celsius = input(0);
//! let fahrenheit = celsius.read(|c| c * 9 / 5 + 32);
//! assert_eq!(fahrenheit.get(), 32);
//!
//! celsius.set(100);
//! assert_eq!(fahrenheit.get(), 212);
//!
//! let label = read((celsius.clone(), fahrenheit.clone()), |(c, f)| {
//!     format!("{c}C = {f}F")
//! });
//! assert_eq!(label.get(), "100C = 212F");
//! ```
//!
//! The engine is single-threaded and cooperative; handles are not `Send`.
//! Reads and writes from inside a derivation body are rejected with
//! [`NonReactiveAccess`], which keeps every dependency visible to the
//! tracker.

mod derived;
mod equality;
mod error;
mod guard;
mod input;
mod input_set;
mod maybe_signal;
mod node;
mod signal;
mod sources;


pub use derived::{read, read_named, read_with};
pub use equality::{never_equal, reference_equal, EqualityFn};
pub use error::NonReactiveAccess;
pub use guard::set_guard_enabled;
pub use input::{input, Input};
pub use maybe_signal::{IntoMaybeSignal, MaybeSignal};
pub use node::{NodeId, NodeState};
pub use signal::Signal;
pub use sources::{AsSignal, SourceList};
