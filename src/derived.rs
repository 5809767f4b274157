use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::equality::{partial_eq, EqualityFn};
use crate::guard;
use crate::input_set::InputSet;
use crate::maybe_signal::{IntoMaybeSignal, MaybeSignal};
use crate::node::{NodeMeta, NodeState, Pull, ReaderNode, SignalNode};
use crate::signal::Signal;
use crate::sources::SourceList;

/// The signal a derivation's latest run returned, if any. It is owned
/// strongly so its chain stays computable, and its recorded clock lets the
/// next pull notice that the inner value moved even when every declared
/// source is unchanged.
struct InnerSignal<T> {
    signal: Signal<T>,
    seen_clock: u64,
}

/// A derivation: a node computed from one or more source signals by a user
/// function. Created dirty; computes on first read.
pub(crate) struct DerivedNode<S: SourceList, T> {
    meta: NodeMeta,
    this: Weak<DerivedNode<S, T>>,
    /// Direct upstream, held strongly. Distinct from `leaves`, which holds
    /// the transitive input leaves of the latest run.
    sources: S,
    compute: RefCell<Box<dyn FnMut(S::Values) -> MaybeSignal<T>>>,
    equals: EqualityFn<T>,
    state: Cell<NodeState>,
    cached: RefCell<Option<T>>,
    clock: Cell<u64>,
    /// Source clocks observed by the latest run, in source order.
    seen_source_clocks: RefCell<Vec<u64>>,
    inner: RefCell<Option<InnerSignal<T>>>,
    leaves: RefCell<InputSet>,
}

impl<S: SourceList, T: Clone + 'static> DerivedNode<S, T> {
    fn create(
        sources: S,
        compute: Box<dyn FnMut(S::Values) -> MaybeSignal<T>>,
        name: Option<&str>,
        equals: EqualityFn<T>,
    ) -> Signal<T> {
        let node = Rc::new_cyclic(|this| Self {
            meta: NodeMeta::new(name),
            this: this.clone(),
            sources,
            compute: RefCell::new(compute),
            equals,
            state: Cell::new(NodeState::Dirty),
            cached: RefCell::new(None),
            clock: Cell::new(0),
            seen_source_clocks: RefCell::new(Vec::new()),
            inner: RefCell::new(None),
            leaves: RefCell::new(InputSet::new()),
        });
        Signal::from_node(node)
    }

    /// Re-verify and, if needed, re-run this derivation. Called only when
    /// the node is dirty or has never computed.
    fn recompute(&self) -> Pull<T> {
        // The set of consumed leaves may change this run. Dropping the old
        // subscriptions first means a leaf that is no longer consumed
        // cannot dirty this node again.
        self.leaves.borrow().detach_reader(self.meta.id);

        // Bring every direct source up to date. Each pull recurses, so
        // staleness bubbles up the chain exactly as far as needed.
        let pulled = self.sources.pull_sources();

        let first_run = self.cached.borrow().is_none();
        if !first_run && *self.seen_source_clocks.borrow() == pulled.clocks {
            // No declared source reported a new value. The previous run may
            // still be invalidated through the signal it returned, so that
            // one gets the same clock comparison.
            let previous_inner = self
                .inner
                .borrow()
                .as_ref()
                .map(|inner| (inner.signal.clone(), inner.seen_clock));
            let (inner_same, inner_leaves) = match previous_inner {
                None => (true, InputSet::new()),
                Some((signal, seen_clock)) => {
                    let inner_pull = signal.pull();
                    (inner_pull.clock == seen_clock, inner_pull.leaves)
                }
            };
            if inner_same {
                let leaves = self.resubscribe(pulled.leaves, inner_leaves);
                self.state.set(NodeState::CleanSame);
                trace!(node = %self.meta, "sources unchanged, skipping recompute");
                let value = self.cached_value();
                return Pull {
                    value,
                    clock: self.clock.get(),
                    leaves,
                };
            }
        }

        // Run the user function. The guard makes any `get`/`set` inside the
        // body fail; the scope restores it even if the body panics, and a
        // panic leaves this node dirty with its subscriptions already torn
        // down, so the next pull retries from scratch.
        let result = {
            let _scope = guard::enter_compute();
            let mut compute = self.compute.borrow_mut();
            (*compute)(pulled.values)
        };

        // A signal-valued result is read through: this node caches the
        // inner value and adopts the inner signal's leaves as its own.
        let (value, inner, inner_leaves) = match result {
            MaybeSignal::Value(value) => (value, None, InputSet::new()),
            MaybeSignal::Signal(signal) => {
                let inner_pull = signal.pull();
                let inner = InnerSignal {
                    signal,
                    seen_clock: inner_pull.clock,
                };
                (inner_pull.value, Some(inner), inner_pull.leaves)
            }
        };

        let changed = match self.cached.borrow().as_ref() {
            Some(previous) => !(self.equals)(previous, &value),
            None => true,
        };
        if changed {
            *self.cached.borrow_mut() = Some(value);
            self.clock.set(self.clock.get() + 1);
            self.state.set(NodeState::CleanDifferent);
        } else {
            // Backdate: keep the old value and clock so readers can skip
            // their own recomputation in turn.
            self.state.set(NodeState::CleanSame);
        }
        *self.seen_source_clocks.borrow_mut() = pulled.clocks;
        *self.inner.borrow_mut() = inner;

        let leaves = self.resubscribe(pulled.leaves, inner_leaves);
        trace!(node = %self.meta, changed, leaves = leaves.len(), "recomputed");

        Pull {
            value: self.cached_value(),
            clock: self.clock.get(),
            leaves,
        }
    }

    /// Adopt the union of the freshly pulled leaf sets and register this
    /// node as a weak reader with each leaf.
    fn resubscribe(&self, source_leaves: InputSet, inner_leaves: InputSet) -> InputSet {
        let leaves = source_leaves.union(inner_leaves);
        let reader: Weak<dyn ReaderNode> = self.this.clone();
        leaves.attach_reader(self.meta.id, &reader);
        *self.leaves.borrow_mut() = leaves.clone();
        leaves
    }

    fn cached_value(&self) -> T {
        self.cached
            .borrow()
            .as_ref()
            .expect("verified node must have a cached value")
            .clone()
    }
}

impl<S: SourceList, T: Clone + 'static> SignalNode<T> for DerivedNode<S, T> {
    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn state(&self) -> NodeState {
        self.state.get()
    }

    fn pull(&self) -> Pull<T> {
        if self.state.get() != NodeState::Dirty && self.cached.borrow().is_some() {
            trace!(node = %self.meta, "cache hit");
            return Pull {
                value: self.cached_value(),
                clock: self.clock.get(),
                leaves: self.leaves.borrow().clone(),
            };
        }
        self.recompute()
    }

    #[cfg(test)]
    fn leaf_ids(&self) -> Vec<crate::node::NodeId> {
        self.leaves.borrow().ids().collect()
    }
}

impl<S: SourceList, T: Clone + 'static> ReaderNode for DerivedNode<S, T> {
    fn mark_dirty(&self) {
        self.state.set(NodeState::Dirty);
    }
}

/// Construct a derivation over a tuple of sources. `f` receives the source
/// values positionally and runs whenever any source reports a new value; if
/// every source is unchanged the cached value is reused without calling `f`.
///
/// ```
/// use pull_signals::{input, read};
///
/// let a = input(1);
/// let b = input(2);
/// let sum = read((a.clone(), b.clone()), |(a, b)| a + b);
/// assert_eq!(sum.get(), 3);
/// ```
pub fn read<S, T, R, F>(sources: S, f: F) -> Signal<T>
where
    S: SourceList,
    T: Clone + PartialEq + 'static,
    R: IntoMaybeSignal<T>,
    F: FnMut(S::Values) -> R + 'static,
{
    build(sources, f, None, partial_eq())
}

/// Like [`read`], with a debug label for the new node.
pub fn read_named<S, T, R, F>(sources: S, f: F, name: &str) -> Signal<T>
where
    S: SourceList,
    T: Clone + PartialEq + 'static,
    R: IntoMaybeSignal<T>,
    F: FnMut(S::Values) -> R + 'static,
{
    build(sources, f, Some(name), partial_eq())
}

/// Like [`read`], with a custom change comparator for the new node. Drops
/// the `PartialEq` requirement on the output type.
pub fn read_with<S, T, R, F>(sources: S, f: F, equals: EqualityFn<T>) -> Signal<T>
where
    S: SourceList,
    T: Clone + 'static,
    R: IntoMaybeSignal<T>,
    F: FnMut(S::Values) -> R + 'static,
{
    build(sources, f, None, equals)
}

fn build<S, T, R, F>(sources: S, mut f: F, name: Option<&str>, equals: EqualityFn<T>) -> Signal<T>
where
    S: SourceList,
    T: Clone + 'static,
    R: IntoMaybeSignal<T>,
    F: FnMut(S::Values) -> R + 'static,
{
    let compute = Box::new(move |values: S::Values| f(values).into_maybe_signal());
    DerivedNode::create(sources, compute, name, equals)
}
