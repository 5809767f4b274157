use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::node::{LeafNode, NodeId, ReaderNode};

/// The set of input leaves a derivation's latest run transitively consumed.
///
/// Each derivation owns its set outright and rebuilds it from scratch on
/// every recomputation. The strong `Rc` handles keep the leaves alive for
/// as long as any derivation still depends on them; the reverse direction
/// is weak, so a set never keeps a derivation alive.
#[derive(Clone, Default)]
pub(crate) struct InputSet {
    leaves: BTreeMap<NodeId, Rc<dyn LeafNode>>,
}

impl InputSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn singleton(leaf: Rc<dyn LeafNode>) -> Self {
        let mut leaves = BTreeMap::new();
        leaves.insert(leaf.id(), leaf);
        Self { leaves }
    }

    pub(crate) fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Union the two sets. Most unions in practice have an empty side, so
    /// those return the other set without touching any entries.
    pub(crate) fn union(mut self, other: InputSet) -> InputSet {
        if self.leaves.is_empty() {
            return other;
        }
        if other.leaves.is_empty() {
            return self;
        }
        for (id, leaf) in other.leaves {
            self.leaves.entry(id).or_insert(leaf);
        }
        self
    }

    /// Register `reader` with every leaf in the set.
    pub(crate) fn attach_reader(&self, id: NodeId, reader: &Weak<dyn ReaderNode>) {
        for leaf in self.leaves.values() {
            leaf.attach(id, reader.clone());
        }
    }

    /// Drop the registration for `id` from every leaf in the set.
    pub(crate) fn detach_reader(&self, id: NodeId) {
        for leaf in self.leaves.values() {
            leaf.detach(id);
        }
    }

    #[cfg(test)]
    pub(crate) fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.leaves.keys().copied()
    }
}
