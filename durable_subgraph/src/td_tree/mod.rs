//! The TD-tree: one node per query label, holding candidate blocks.
//!
//! Nodes live in an arena indexed by preorder position; node 0 is the root.
//! The root keeps a plain candidate set. Every other node keeps one
//! [`Block`] per parent data vertex, each holding the [`Cell`]s grown under
//! that parent.

mod grow;
mod trim;

pub use grow::{GrowStats, grow};
pub use trim::{TrimStats, trim};

use std::collections::{BTreeSet, HashMap};

use durable_common::{Config, VertexId};
use indexmap::IndexMap;

use crate::bloom::VertexBloom;
use crate::decompose::QueryTree;
use crate::graph_index::LabelId;
use crate::timestamps::TimestampSet;

pub type NodeId = usize;

/// A candidate under one parent vertex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub vertex: VertexId,
    /// Union of the surviving path timestamps; kept at leaves only.
    pub timestamps: Option<TimestampSet>,
}

/// The candidates of one node grown under one parent data vertex.
#[derive(Clone, Debug)]
pub struct Block {
    parent: VertexId,
    cells: IndexMap<VertexId, Cell>,
}

impl Block {
    fn new(parent: VertexId) -> Self {
        Self {
            parent,
            cells: IndexMap::new(),
        }
    }

    pub const fn parent(&self) -> VertexId {
        self.parent
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.values()
    }

    pub fn cell(&self, v: VertexId) -> Option<&Cell> {
        self.cells.get(&v)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct TdNode {
    pub label: LabelId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub is_root: bool,
    pub is_leaf: bool,
    root_candidates: BTreeSet<VertexId>,
    blocks: IndexMap<VertexId, Block>,
    /// Candidate vertex -> parents whose block holds a cell for it.
    members: HashMap<VertexId, BTreeSet<VertexId>>,
    bloom: VertexBloom,
}

impl TdNode {
    /// Exact membership in the live candidate set.
    pub fn contains(&self, v: VertexId) -> bool {
        if self.is_root {
            self.root_candidates.contains(&v)
        } else {
            self.members.contains_key(&v)
        }
    }

    /// Bloom test first, then exact membership.
    pub fn possibly_contains(&self, v: VertexId) -> bool {
        self.bloom.might_contain(v) && self.contains(v)
    }

    /// Bloom test only; may report removed or never-inserted vertices.
    pub fn bloom_might_contain(&self, v: VertexId) -> bool {
        self.bloom.might_contain(v)
    }

    /// Sorted live candidates.
    pub fn candidates(&self) -> Vec<VertexId> {
        if self.is_root {
            self.root_candidates.iter().copied().collect()
        } else {
            let mut vs: Vec<VertexId> = self.members.keys().copied().collect();
            vs.sort_unstable();
            vs
        }
    }

    pub fn candidate_count(&self) -> usize {
        if self.is_root {
            self.root_candidates.len()
        } else {
            self.members.len()
        }
    }

    pub fn block(&self, parent: VertexId) -> Option<&Block> {
        self.blocks.get(&parent)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.values()
    }

    /// True if the block keyed by `parent` exists and holds a cell.
    pub fn has_live_block(&self, parent: VertexId) -> bool {
        self.blocks.get(&parent).is_some_and(|b| !b.is_empty())
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn cell_count(&self) -> usize {
        if self.is_root {
            self.root_candidates.len()
        } else {
            self.blocks.values().map(Block::len).sum()
        }
    }

    /// Parents whose block holds a cell for `v`.
    pub fn parents_of(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.members.get(&v).into_iter().flatten().copied()
    }

    fn insert_root_candidate(&mut self, v: VertexId) -> bool {
        let fresh = self.root_candidates.insert(v);
        if fresh {
            self.bloom.insert(v);
        }
        fresh
    }

    /// Add or merge the cell `(parent, v)`. Leaf timestamps are unioned.
    /// Returns true if the cell is new.
    fn insert_cell(
        &mut self,
        parent: VertexId,
        v: VertexId,
        timestamps: Option<TimestampSet>,
    ) -> bool {
        let block = self
            .blocks
            .entry(parent)
            .or_insert_with(|| Block::new(parent));
        if let Some(cell) = block.cells.get_mut(&v) {
            if let (Some(have), Some(more)) = (cell.timestamps.as_mut(), timestamps.as_ref()) {
                *have = have.union(more);
            }
            return false;
        }
        block.cells.insert(
            v,
            Cell {
                vertex: v,
                timestamps,
            },
        );
        let parents = self.members.entry(v).or_default();
        if parents.is_empty() {
            self.bloom.insert(v);
        }
        parents.insert(parent);
        true
    }

    fn remove_root_candidate(&mut self, v: VertexId) -> bool {
        self.root_candidates.remove(&v)
    }

    /// Drop every cell of `v`. Returns the number of cells removed.
    fn remove_candidate(&mut self, v: VertexId) -> usize {
        let Some(parents) = self.members.remove(&v) else {
            return 0;
        };
        for p in &parents {
            if let Some(block) = self.blocks.get_mut(p) {
                block.cells.shift_remove(&v);
                if block.is_empty() {
                    self.blocks.shift_remove(p);
                }
            }
        }
        parents.len()
    }

    /// Drop the block keyed by `parent`. Returns the number of cells removed
    /// and the vertices left without any cell at this node.
    fn remove_block(&mut self, parent: VertexId) -> (usize, Vec<VertexId>) {
        let Some(block) = self.blocks.shift_remove(&parent) else {
            return (0, Vec::new());
        };
        let mut orphaned = Vec::new();
        for v in block.cells.keys() {
            if let Some(parents) = self.members.get_mut(v) {
                parents.remove(&parent);
                if parents.is_empty() {
                    self.members.remove(v);
                    orphaned.push(*v);
                }
            }
        }
        (block.len(), orphaned)
    }

    fn rebuild_bloom(&mut self) {
        let live = self.candidates();
        self.bloom.rebuild(live);
    }
}

/// Candidate structure for one query run.
#[derive(Clone, Debug)]
pub struct TdTree {
    nodes: Vec<TdNode>,
    by_label: HashMap<LabelId, NodeId>,
}

impl TdTree {
    /// Empty nodes laid out like `tree`, with filters sized for a data graph
    /// of `vertex_count` vertices.
    pub fn new(tree: &QueryTree, config: &Config, vertex_count: usize) -> Self {
        let bits = config.bloom_bits(vertex_count);
        let by_label: HashMap<LabelId, NodeId> = tree
            .preorder()
            .iter()
            .enumerate()
            .map(|(i, l)| (*l, i))
            .collect();

        let nodes = tree
            .preorder()
            .iter()
            .map(|&label| {
                let salt = config.seed ^ (label.index() as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
                let children: Vec<NodeId> = tree
                    .children(label)
                    .iter()
                    .filter_map(|c| by_label.get(c).copied())
                    .collect();
                TdNode {
                    label,
                    parent: tree.parent(label).and_then(|p| by_label.get(&p).copied()),
                    is_root: label == tree.root(),
                    is_leaf: children.is_empty(),
                    children,
                    root_candidates: BTreeSet::new(),
                    blocks: IndexMap::new(),
                    members: HashMap::new(),
                    bloom: VertexBloom::new(bits, config.bloom_hashes, salt),
                }
            })
            .collect();

        Self { nodes, by_label }
    }

    pub const ROOT: NodeId = 0;

    pub fn nodes(&self) -> &[TdNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &TdNode {
        &self.nodes[id]
    }

    pub fn root(&self) -> &TdNode {
        &self.nodes[Self::ROOT]
    }

    pub fn node_of(&self, label: LabelId) -> Option<NodeId> {
        self.by_label.get(&label).copied()
    }

    /// The block keyed by `parent` at `node`.
    pub fn block(&self, node: NodeId, parent: VertexId) -> Option<&Block> {
        self.nodes.get(node).and_then(|n| n.block(parent))
    }

    /// Per node live candidate counts, in node order.
    pub fn candidate_counts(&self) -> Vec<usize> {
        self.nodes.iter().map(TdNode::candidate_count).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.root().candidate_count() == 0
    }

    pub fn rebuild_blooms(&mut self) {
        for node in &mut self.nodes {
            node.rebuild_bloom();
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TdNode {
        &mut self.nodes[id]
    }
}
