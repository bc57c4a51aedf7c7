//! Query decomposition: root choice, spanning tree and non-tree edges.
//!
//! The tree is built by an iterative depth-first traversal from the root.
//! Unvisited neighbors are visited in ascending selectivity, ties broken by
//! fewer candidates and then by label name. A neighbor is checked for
//! "visited" at the moment it is attached, so the result is a true DFS tree.
//! Every query edge outside the tree becomes a [`NonTreeEdge`], classified
//! by walking parent links.

mod selectivity;

pub use selectivity::{LabelScore, by_selectivity, choose_root, score_labels};

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::DecompositionError;
use crate::graph_index::{GraphIndex, LabelId};
use crate::query::QueryGraph;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum NonTreeKind {
    /// One endpoint is a tree ancestor of the other.
    AncestorDescendant,
    /// Neither endpoint is an ancestor of the other.
    Cross,
}

/// A query edge outside the spanning tree.
///
/// `upper` precedes `lower` in tree preorder; for an ancestor-descendant
/// edge `upper` is the ancestor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct NonTreeEdge {
    pub upper: LabelId,
    pub lower: LabelId,
    pub kind: NonTreeKind,
}

impl NonTreeEdge {
    /// The other endpoint, if `label` is one.
    pub fn partner(&self, label: LabelId) -> Option<LabelId> {
        if self.upper == label {
            Some(self.lower)
        } else if self.lower == label {
            Some(self.upper)
        } else {
            None
        }
    }
}

/// Rooted spanning tree of the query plus its non-tree edges.
#[derive(Clone, Debug)]
pub struct QueryTree {
    root: LabelId,
    parent: HashMap<LabelId, LabelId>,
    children: HashMap<LabelId, Vec<LabelId>>,
    preorder: Vec<LabelId>,
    non_tree: Vec<NonTreeEdge>,
}

impl QueryTree {
    pub const fn root(&self) -> LabelId {
        self.root
    }

    pub fn parent(&self, label: LabelId) -> Option<LabelId> {
        self.parent.get(&label).copied()
    }

    /// Children in traversal order.
    pub fn children(&self, label: LabelId) -> &[LabelId] {
        self.children.get(&label).map_or(&[], Vec::as_slice)
    }

    pub fn is_leaf(&self, label: LabelId) -> bool {
        self.children(label).is_empty()
    }

    pub fn preorder(&self) -> &[LabelId] {
        &self.preorder
    }

    pub fn non_tree_edges(&self) -> &[NonTreeEdge] {
        &self.non_tree
    }

    /// True if `a` is a proper ancestor of `d`.
    pub fn is_ancestor(&self, a: LabelId, d: LabelId) -> bool {
        let mut cur = self.parent(d);
        while let Some(p) = cur {
            if p == a {
                return true;
            }
            cur = self.parent(p);
        }
        false
    }

    /// Non-tree partners of `label` together with the edge kind.
    pub fn non_tree_partners(
        &self,
        label: LabelId,
    ) -> impl Iterator<Item = (LabelId, NonTreeKind)> + '_ {
        self.non_tree
            .iter()
            .filter_map(move |e| e.partner(label).map(|p| (p, e.kind)))
    }

    /// Non-tree partners of `label` that are its tree ancestors.
    pub fn ancestor_partners(&self, label: LabelId) -> impl Iterator<Item = LabelId> + '_ {
        self.non_tree
            .iter()
            .filter(move |e| e.lower == label && e.kind == NonTreeKind::AncestorDescendant)
            .map(|e| e.upper)
    }

    /// Every root-to-leaf label path, in preorder of their leaves.
    pub fn root_to_leaf_paths(&self) -> Vec<Vec<LabelId>> {
        self.preorder
            .iter()
            .filter(|l| self.is_leaf(**l))
            .map(|&leaf| {
                let mut path = vec![leaf];
                let mut cur = self.parent(leaf);
                while let Some(p) = cur {
                    path.push(p);
                    cur = self.parent(p);
                }
                path.reverse();
                path
            })
            .collect()
    }
}

/// Result of decomposing a query against a data graph.
#[derive(Clone, Debug)]
pub struct Decomposition {
    pub tree: QueryTree,
    pub root: LabelScore,
    pub scores: Vec<LabelScore>,
}

/// Choose a root and build the spanning tree.
///
/// # Errors
///
/// Fails if the query has no edges, no label is viable as root, or some
/// label is unreachable from the root.
pub fn decompose(
    query: &QueryGraph,
    index: &GraphIndex,
) -> Result<Decomposition, DecompositionError> {
    if query.is_empty() {
        return Err(DecompositionError::EmptyQuery);
    }

    let scores = score_labels(query, index);
    let root = choose_root(&scores)
        .cloned()
        .ok_or(DecompositionError::NoViableRoot)?;
    let rank: HashMap<LabelId, &LabelScore> = scores.iter().map(|s| (s.label, s)).collect();

    let ordered_neighbors = |label: LabelId| -> Vec<LabelId> {
        let mut ns: Vec<&LabelScore> = query
            .neighbors(label)
            .filter_map(|n| rank.get(&n).copied())
            .collect();
        ns.sort_by(|a, b| by_selectivity(a, b));
        ns.into_iter().map(|s| s.label).collect()
    };

    let mut parent: HashMap<LabelId, LabelId> = HashMap::new();
    let mut children: HashMap<LabelId, Vec<LabelId>> = HashMap::new();
    let mut preorder = vec![root.label];
    let mut visited: HashSet<LabelId> = HashSet::from([root.label]);
    let mut stack: Vec<(LabelId, Vec<LabelId>, usize)> =
        vec![(root.label, ordered_neighbors(root.label), 0)];

    while let Some((node, neighbors, next)) = stack.last_mut() {
        let Some(&n) = neighbors.get(*next) else {
            stack.pop();
            continue;
        };
        *next += 1;
        if !visited.insert(n) {
            continue;
        }
        let node = *node;
        parent.insert(n, node);
        children.entry(node).or_default().push(n);
        preorder.push(n);
        stack.push((n, ordered_neighbors(n), 0));
    }

    if visited.len() < query.len() {
        let unreachable = query
            .vertices()
            .iter()
            .filter(|l| !visited.contains(l))
            .map(|l| query.name(*l).to_string())
            .collect();
        return Err(DecompositionError::disconnected(root.name, unreachable));
    }

    let mut tree = QueryTree {
        root: root.label,
        parent,
        children,
        preorder,
        non_tree: Vec::new(),
    };
    tree.non_tree = classify_non_tree(query, &tree);

    info!(
        "decomposition: root `{}` (selectivity {:.3}), {} tree edges, {} non-tree edges",
        root.name,
        root.selectivity,
        tree.preorder.len() - 1,
        tree.non_tree.len()
    );
    for e in &tree.non_tree {
        debug!(
            "non-tree edge {}-{} ({:?})",
            query.name(e.upper),
            query.name(e.lower),
            e.kind
        );
    }

    Ok(Decomposition {
        tree,
        root,
        scores,
    })
}

fn classify_non_tree(query: &QueryGraph, tree: &QueryTree) -> Vec<NonTreeEdge> {
    let position: HashMap<LabelId, usize> = tree
        .preorder
        .iter()
        .enumerate()
        .map(|(i, l)| (*l, i))
        .collect();

    let mut out: Vec<NonTreeEdge> = query
        .edges()
        .iter()
        .filter(|&&(a, b)| tree.parent(a) != Some(b) && tree.parent(b) != Some(a))
        .map(|&(a, b)| {
            let (upper, lower) = if position.get(&a) <= position.get(&b) {
                (a, b)
            } else {
                (b, a)
            };
            let kind = if tree.is_ancestor(upper, lower) {
                NonTreeKind::AncestorDescendant
            } else {
                NonTreeKind::Cross
            };
            NonTreeEdge { upper, lower, kind }
        })
        .collect();
    out.sort_by_key(|e| (position.get(&e.lower).copied(), position.get(&e.upper).copied()));
    out
}
