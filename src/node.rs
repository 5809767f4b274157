use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::input_set::InputSet;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

/// Unique identity of a node in the graph, handed out in creation order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Freshness of a node's cached value.
///
/// `Dirty` means the cache may be stale and the next read must verify.
/// The two clean states record the outcome of the latest verification:
/// `CleanSame` lets readers skip their own recomputation, `CleanDifferent`
/// forces them to re-run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeState {
    Dirty,
    CleanSame,
    CleanDifferent,
}

/// Debug identity shared by every node: a unique id plus an optional label.
pub(crate) struct NodeMeta {
    pub(crate) id: NodeId,
    pub(crate) name: Option<Rc<str>>,
}

impl NodeMeta {
    pub(crate) fn new(name: Option<&str>) -> Self {
        Self {
            id: NodeId::next(),
            name: name.map(Rc::from),
        }
    }
}

impl fmt::Display for NodeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}{}", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// The subscription surface of an input leaf, viewed from a derivation.
///
/// Derivations hold their leaves strongly through this trait and register
/// themselves as weak readers against each one.
pub(crate) trait LeafNode {
    fn id(&self) -> NodeId;

    /// Register `reader` to be marked dirty when this leaf's value changes.
    fn attach(&self, id: NodeId, reader: Weak<dyn ReaderNode>);

    /// Drop the registration for `id`. Detaching an id that is not attached
    /// is a no-op.
    fn detach(&self, id: NodeId);
}

/// The invalidation surface of a derivation, viewed from an input leaf.
pub(crate) trait ReaderNode {
    fn mark_dirty(&self);
}

/// The result of bringing a node up to date: its current value, its change
/// clock, and the set of input leaves its current value depends on.
///
/// The clock is a per-node counter bumped exactly when the node's value
/// actually changes. A reader records the clock it observed; on the next
/// pull a differing clock is what "this source reported a new value" means.
pub(crate) struct Pull<T> {
    pub(crate) value: T,
    pub(crate) clock: u64,
    pub(crate) leaves: InputSet,
}

/// A typed node in the graph. Implemented by input leaves and derivations;
/// `Signal` dispatches through this.
pub(crate) trait SignalNode<T> {
    fn meta(&self) -> &NodeMeta;

    fn state(&self) -> NodeState;

    /// Bring this node up to date and return its value, clock, and leaves.
    /// Recurses into sources, so staleness bubbles up on demand.
    fn pull(&self) -> Pull<T>;

    #[cfg(test)]
    fn leaf_ids(&self) -> Vec<NodeId>;
}
