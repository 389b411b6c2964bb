use std::hash::Hash;

use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;

use crate::error::{Result, ThreadViewError};
use crate::thread::Thread;
use crate::traversal::walk;

/// Per-node view metadata, stored in traversal (pre-order) order.
#[derive(Clone, Debug)]
pub struct NodeMeta<Id> {
    pub(crate) id: Id,
    pub(crate) parent: Option<usize>,
    pub(crate) depth: usize,
    pub(crate) children: SmallVec<[usize; 8]>,
    // Number of nodes in this sub-thread, self included; the sub-thread
    // occupies `index..index + subtree_len`.
    pub(crate) subtree_len: usize,
    pub(crate) visible: bool,
    pub(crate) collapsed: bool,
    pub(crate) height: usize,
}

impl<Id: Copy> NodeMeta<Id> {
    /// Identity of the node this record belongs to.
    pub const fn id(&self) -> Id {
        self.id
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Height in rows from the last render pass.
    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn depth(&self) -> usize {
        self.depth
    }
}

/// Flattened metadata for every node of one tree, plus the identity index.
///
/// The index is owned by the cache, so two views over different trees never
/// share lookups even when their identities collide.
#[derive(Clone, Debug)]
pub struct MetaCache<Id> {
    nodes: Vec<NodeMeta<Id>>,
    index: FxHashMap<Id, usize>,
}

impl<Id: Copy + Eq + Hash + std::fmt::Display> MetaCache<Id> {
    /// Walks `head` once and records one entry per node.
    ///
    /// Parent links reported by the nodes are resolved through the fresh index;
    /// a link to an identity outside the tree fails with [`ThreadViewError::NodeNotFound`].
    /// The link of the head itself is ignored.
    pub fn build(head: &dyn Thread<Id = Id>) -> Result<Self> {
        let mut nodes: Vec<NodeMeta<Id>> = Vec::new();
        let mut index: FxHashMap<Id, usize> = FxHashMap::with_hasher(FxBuildHasher);
        let mut declared_parents: Vec<Option<Id>> = Vec::new();
        // Indices of the open ancestors of the node being visited.
        let mut path: SmallVec<[usize; 16]> = SmallVec::new();

        walk(head, None, |visit, node| {
            path.truncate(visit.depth);
            let id = node.id();
            if index.contains_key(&id) {
                tracing::warn!(%id, "duplicate node identity; lookups resolve to the first node");
            } else {
                index.insert(id, visit.index);
            }
            let walk_parent = path.last().copied();
            if let Some(parent) = walk_parent {
                nodes[parent].children.push(visit.index);
            }
            nodes.push(NodeMeta {
                id,
                parent: walk_parent,
                depth: visit.depth,
                children: SmallVec::new(),
                subtree_len: 1,
                visible: true,
                collapsed: false,
                height: 0,
            });
            declared_parents.push(if visit.index == 0 { None } else { node.parent() });
            path.push(visit.index);
        });

        for idx in (1..nodes.len()).rev() {
            if let Some(parent) = nodes[idx].parent {
                nodes[parent].subtree_len += nodes[idx].subtree_len;
            }
        }

        let cache = Self { nodes, index };
        for (idx, declared) in declared_parents.into_iter().enumerate() {
            if let Some(parent_id) = declared {
                let parent = cache.index_of(parent_id)?;
                if Some(parent) != cache.nodes[idx].parent {
                    tracing::warn!(
                        id = %cache.nodes[idx].id,
                        parent = %parent_id,
                        "parent link disagrees with tree shape; keeping the shape"
                    );
                }
            }
        }
        Ok(cache)
    }

    /// Returns the cache index of the node with the given identity.
    pub fn index_of(&self, id: Id) -> Result<usize> {
        self.index
            .get(&id)
            .copied()
            .ok_or_else(|| ThreadViewError::NodeNotFound(id.to_string()))
    }
}

impl<Id> MetaCache<Id> {
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&NodeMeta<Id>> {
        self.nodes.get(idx)
    }

    pub(crate) fn nodes(&self) -> &[NodeMeta<Id>] {
        &self.nodes
    }

    pub(crate) fn node(&self, idx: usize) -> &NodeMeta<Id> {
        &self.nodes[idx]
    }

    pub(crate) fn node_mut(&mut self, idx: usize) -> &mut NodeMeta<Id> {
        &mut self.nodes[idx]
    }

    pub(crate) fn set_height(&mut self, idx: usize, height: usize) {
        self.nodes[idx].height = height;
    }

    /// Strict descendants of `idx`, as a range of cache indices.
    pub(crate) fn descendants(&self, idx: usize) -> std::ops::Range<usize> {
        idx + 1..idx + self.nodes[idx].subtree_len
    }

    /// Whether `idx` lies in the sub-thread rooted at `ancestor` (itself included).
    pub(crate) fn in_subthread(&self, ancestor: usize, idx: usize) -> bool {
        idx >= ancestor && idx < ancestor + self.nodes[ancestor].subtree_len
    }

    /// Re-derives visibility of every strict descendant of `idx`.
    ///
    /// With `hide_collapsed` off everything is visible; with it on a node is
    /// hidden when its parent is collapsed or hidden.
    pub(crate) fn refresh_visibility(&mut self, idx: usize, hide_collapsed: bool) {
        for child in self.descendants(idx) {
            let visible = !hide_collapsed
                || self.nodes[child].parent.is_none_or(|parent| {
                    let parent = &self.nodes[parent];
                    parent.visible && !parent.collapsed
                });
            self.nodes[child].visible = visible;
        }
    }

    /// Sum of recorded heights of visible nodes before `idx`.
    pub(crate) fn offset_of(&self, idx: usize) -> usize {
        self.nodes[..idx.min(self.nodes.len())]
            .iter()
            .filter(|node| node.visible)
            .map(|node| node.height)
            .sum()
    }

    /// Total rows of the last render pass.
    pub(crate) fn content_height(&self) -> usize {
        self.offset_of(self.nodes.len())
    }

    /// Index of the visible node whose row band contains `y`.
    pub(crate) fn index_at(&self, y: usize) -> Option<usize> {
        let mut lo = 0;
        for (idx, node) in self.nodes.iter().enumerate() {
            if !node.visible {
                continue;
            }
            let hi = lo + node.height;
            if lo <= y && y < hi {
                return Some(idx);
            }
            lo = hi;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::num_nodes;
    use crate::traversal::tests::{Node, sample};

    #[test]
    fn builds_one_record_per_node_in_pre_order() {
        let tree = sample();
        let cache = MetaCache::build(&tree).unwrap();

        assert_eq!(cache.len(), num_nodes(&tree));
        let ids: Vec<_> = cache.nodes().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 1, 3, 4, 2]);
        let parents: Vec<_> = cache.nodes().iter().map(|n| n.parent).collect();
        assert_eq!(parents, vec![None, Some(0), Some(1), Some(1), Some(0)]);
        assert_eq!(cache.node(0).children.as_slice(), &[1, 4]);
        assert_eq!(cache.node(1).subtree_len, 3);
        assert_eq!(cache.descendants(1), 2..4);
    }

    #[test]
    fn index_lookup_misses_are_errors() {
        let tree = sample();
        let cache = MetaCache::build(&tree).unwrap();

        assert_eq!(cache.index_of(4).unwrap(), 3);
        assert!(matches!(
            cache.index_of(42),
            Err(ThreadViewError::NodeNotFound(id)) if id == "42"
        ));
    }

    #[test]
    fn dangling_parent_link_fails_construction() {
        let mut child = Node::leaf(1);
        child.parent = Some(99);
        let tree = Node::new(0, None, vec![child]);

        assert!(matches!(
            MetaCache::build(&tree),
            Err(ThreadViewError::NodeNotFound(_))
        ));
    }

    #[test]
    fn independent_caches_do_not_share_indices() {
        let first = sample();
        let second = Node::branch(0, vec![Node::leaf(4)]);
        let a = MetaCache::build(&first).unwrap();
        let b = MetaCache::build(&second).unwrap();

        assert_eq!(a.index_of(4).unwrap(), 3);
        assert_eq!(b.index_of(4).unwrap(), 1);
    }

    #[test]
    fn visibility_follows_nearest_collapsed_ancestor() {
        let tree = sample();
        let mut cache = MetaCache::build(&tree).unwrap();

        cache.node_mut(1).collapsed = true;
        cache.refresh_visibility(0, true);
        let visible: Vec<_> = cache.nodes().iter().map(|n| n.visible).collect();
        assert_eq!(visible, vec![true, true, false, false, true]);

        cache.refresh_visibility(0, false);
        assert!(cache.nodes().iter().all(|n| n.visible));
    }

    #[test]
    fn offsets_and_hit_testing_use_heights() {
        let tree = sample();
        let mut cache = MetaCache::build(&tree).unwrap();
        for (idx, height) in [0, 2, 1, 3, 1].into_iter().enumerate() {
            cache.set_height(idx, height);
        }

        assert_eq!(cache.offset_of(1), 0);
        assert_eq!(cache.offset_of(3), 3);
        assert_eq!(cache.content_height(), 7);
        assert_eq!(cache.index_at(0), Some(1));
        assert_eq!(cache.index_at(2), Some(2));
        assert_eq!(cache.index_at(6), Some(4));
        assert_eq!(cache.index_at(7), None);
    }
}
