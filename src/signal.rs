use std::fmt;
use std::rc::Rc;

use crate::derived;
use crate::equality::EqualityFn;
use crate::error::NonReactiveAccess;
use crate::guard;
use crate::input::Input;
use crate::maybe_signal::IntoMaybeSignal;
use crate::node::{NodeId, NodeState, Pull, SignalNode};

/// A node in the reactive graph: a cached value that can be read on demand
/// and recomputes only when a transitive input actually changed.
///
/// `Signal` is a cheap cloneable handle; clones share the underlying node.
/// Handles are single-threaded and deliberately not `Send`.
pub struct Signal<T> {
    node: Rc<dyn SignalNode<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
        }
    }
}

impl<T: Clone + 'static> Signal<T> {
    pub(crate) fn from_node(node: Rc<dyn SignalNode<T>>) -> Self {
        Self { node }
    }

    pub(crate) fn pull(&self) -> Pull<T> {
        self.node.pull()
    }

    /// Return the current value, recomputing any stale part of the chain.
    ///
    /// # Panics
    ///
    /// Panics with the [`NonReactiveAccess`] message when called from
    /// inside a derivation body. Use [`Signal::try_get`] to receive the
    /// error as a value instead.
    pub fn get(&self) -> T {
        match self.try_get() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible variant of [`Signal::get`].
    pub fn try_get(&self) -> Result<T, NonReactiveAccess> {
        guard::check_access()?;
        Ok(self.node.pull().value)
    }

    /// Derive a new signal from this one. `f` runs lazily, only when the
    /// returned signal (or one of its readers) is read, and may return
    /// either a plain value or another signal of the value type, which is
    /// read through transparently.
    pub fn read<U, R, F>(&self, f: F) -> Signal<U>
    where
        U: Clone + PartialEq + 'static,
        R: IntoMaybeSignal<U>,
        F: FnMut(T) -> R + 'static,
    {
        let mut f = f;
        derived::read((self.clone(),), move |(value,)| f(value))
    }

    /// Like [`Signal::read`], with a debug label for the new node.
    pub fn read_named<U, R, F>(&self, f: F, name: &str) -> Signal<U>
    where
        U: Clone + PartialEq + 'static,
        R: IntoMaybeSignal<U>,
        F: FnMut(T) -> R + 'static,
    {
        let mut f = f;
        derived::read_named((self.clone(),), move |(value,)| f(value), name)
    }

    /// Like [`Signal::read`], with a custom change comparator for the new
    /// node. Drops the `PartialEq` requirement on the output type.
    pub fn read_with<U, R, F>(&self, f: F, equals: EqualityFn<U>) -> Signal<U>
    where
        U: Clone + 'static,
        R: IntoMaybeSignal<U>,
        F: FnMut(T) -> R + 'static,
    {
        let mut f = f;
        derived::read_with((self.clone(),), move |(value,)| f(value), equals)
    }

    pub fn id(&self) -> NodeId {
        self.node.meta().id
    }

    pub fn name(&self) -> Option<Rc<str>> {
        self.node.meta().name.clone()
    }

    /// Current freshness of this node's cache. Reads do not change until
    /// the next `get`; a freshly created derivation reports `Dirty`.
    pub fn state(&self) -> NodeState {
        self.node.state()
    }

    #[cfg(test)]
    pub(crate) fn leaf_ids(&self) -> Vec<NodeId> {
        self.node.leaf_ids()
    }
}

impl<T: Clone + 'static> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("state", &self.state())
            .finish()
    }
}

impl<T: Clone + 'static> From<&Input<T>> for Signal<T> {
    fn from(input: &Input<T>) -> Self {
        input.signal()
    }
}

impl<T: Clone + 'static> From<Input<T>> for Signal<T> {
    fn from(input: Input<T>) -> Self {
        input.signal()
    }
}
