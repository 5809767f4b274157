use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::trace;

use crate::equality::{partial_eq, EqualityFn};
use crate::error::NonReactiveAccess;
use crate::guard;
use crate::input_set::InputSet;
use crate::node::{LeafNode, NodeId, NodeMeta, NodeState, Pull, ReaderNode, SignalNode};
use crate::signal::Signal;

/// A mutable leaf of the graph. Writes go here; everything downstream is
/// derived.
pub(crate) struct InputNode<T> {
    meta: NodeMeta,
    this: Weak<InputNode<T>>,
    value: RefCell<T>,
    equals: EqualityFn<T>,
    state: Cell<NodeState>,
    clock: Cell<u64>,
    /// Weak back-references to the derivations whose latest run consumed
    /// this input. Dead entries are purged during the write sweep.
    readers: RefCell<IndexMap<NodeId, Weak<dyn ReaderNode>>>,
}

impl<T: Clone + 'static> InputNode<T> {
    fn new(value: T, name: Option<&str>, equals: EqualityFn<T>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            meta: NodeMeta::new(name),
            this: this.clone(),
            value: RefCell::new(value),
            equals,
            state: Cell::new(NodeState::CleanDifferent),
            clock: Cell::new(1),
            readers: RefCell::new(IndexMap::new()),
        })
    }

    fn write(&self, value: T) {
        let unchanged = (self.equals)(&self.value.borrow(), &value);
        if unchanged {
            trace!(input = %self.meta, "write is a no-op under equality");
            return;
        }

        *self.value.borrow_mut() = value;
        self.clock.set(self.clock.get() + 1);
        self.state.set(NodeState::CleanDifferent);

        // Readers record transitive leaves, so every derivation whose
        // current value depends on this input is directly in this map.
        // Marking dirty must not touch this input again; `mark_dirty` only
        // flips the reader's own state flag.
        let mut readers = self.readers.borrow_mut();
        let before = readers.len();
        readers.retain(|_, reader| match reader.upgrade() {
            Some(reader) => {
                reader.mark_dirty();
                true
            }
            None => false,
        });
        trace!(
            input = %self.meta,
            dirtied = readers.len(),
            purged = before - readers.len(),
            "input changed"
        );
    }
}

impl<T: Clone + 'static> SignalNode<T> for InputNode<T> {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn state(&self) -> NodeState {
        self.state.get()
    }

    fn pull(&self) -> Pull<T> {
        let this = self.this.upgrade().expect("input node pulled after drop");
        Pull {
            value: self.value.borrow().clone(),
            clock: self.clock.get(),
            leaves: InputSet::singleton(this),
        }
    }

    #[cfg(test)]
    fn leaf_ids(&self) -> Vec<NodeId> {
        vec![self.meta.id]
    }
}

impl<T: 'static> LeafNode for InputNode<T> {
    fn id(&self) -> NodeId {
        self.meta.id
    }

    fn attach(&self, id: NodeId, reader: Weak<dyn ReaderNode>) {
        self.readers.borrow_mut().insert(id, reader);
    }

    fn detach(&self, id: NodeId) {
        self.readers.borrow_mut().swap_remove(&id);
    }
}

/// Handle to a mutable input leaf. Cloneable; clones share the node.
///
/// Dereferences to [`Signal`], so inputs can be read and derived from
/// everywhere a signal can.
pub struct Input<T> {
    node: Rc<InputNode<T>>,
    signal: Signal<T>,
}

impl<T> Clone for Input<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            signal: self.signal.clone(),
        }
    }
}

/// Construct an input leaf seeded with `value`.
pub fn input<T: Clone + PartialEq + 'static>(value: T) -> Input<T> {
    Input::build(value, None, partial_eq())
}

impl<T: Clone + PartialEq + 'static> Input<T> {
    /// Construct an input leaf with a debug label.
    pub fn named(value: T, name: &str) -> Self {
        Self::build(value, Some(name), partial_eq())
    }
}

impl<T: Clone + 'static> Input<T> {
    /// Construct an input leaf with a custom change comparator. The
    /// comparator decides which writes are no-ops.
    pub fn with_equality(value: T, equals: EqualityFn<T>) -> Self {
        Self::build(value, None, equals)
    }

    fn build(value: T, name: Option<&str>, equals: EqualityFn<T>) -> Self {
        let node = InputNode::new(value, name, equals);
        let signal = Signal::from_node(node.clone());
        Self { node, signal }
    }

    /// Store a new value. A value equal to the current one (per this
    /// input's comparator) is silently ignored; otherwise every derivation
    /// currently depending on this input is marked dirty before `set`
    /// returns. Nothing recomputes until the next read.
    ///
    /// # Panics
    ///
    /// Panics with the [`NonReactiveAccess`] message when called from
    /// inside a derivation body.
    pub fn set(&self, value: T) {
        match self.try_set(value) {
            Ok(()) => {}
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible variant of [`Input::set`].
    pub fn try_set(&self, value: T) -> Result<(), NonReactiveAccess> {
        guard::check_access()?;
        self.node.write(value);
        Ok(())
    }

    /// Replace the value with a function of the current one. Subject to
    /// the same reentrancy rules as [`Input::set`].
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        if let Err(err) = guard::check_access() {
            panic!("{err}");
        }
        let next = f(&self.node.value.borrow());
        self.node.write(next);
    }

    /// This input viewed as a read-only signal.
    pub fn signal(&self) -> Signal<T> {
        self.signal.clone()
    }

    #[cfg(test)]
    pub(crate) fn reader_count(&self) -> usize {
        self.node.readers.borrow().len()
    }
}

impl<T> Deref for Input<T> {
    type Target = Signal<T>;

    fn deref(&self) -> &Signal<T> {
        &self.signal
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for Input<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("id", &self.signal.id())
            .field("name", &self.signal.name())
            .field("value", &self.node.value.borrow())
            .finish()
    }
}
