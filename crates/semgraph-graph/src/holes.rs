//! Structural hole detection.
//!
//! A structural hole is a gap between two clusters of entities that are
//! barely (or not at all) connected. Two sources of candidate pairs:
//!
//! - Disconnected components: every pair is a hole with strength 0.
//! - Bridge edges inside a component (found with Tarjan's low-link DFS):
//!   cutting one splits the component in two, and if both sides hold at
//!   least two entities the split is a candidate pair.
//!
//! Connection strength is the number of cross edges divided by the number
//! of possible cross pairs. Pairs below the threshold are reported with a
//! priority and the most central entities that could bridge them.

use crate::graph::{Adjacency, KnowledgeGraph};
use crate::ranking::BridgeEntity;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Default connection strength below which a cluster pair is a hole.
pub const DEFAULT_HOLE_THRESHOLD: f64 = 0.15;

/// Maximum bridge candidates suggested per hole.
const MAX_BRIDGE_CANDIDATES: usize = 5;

/// Smallest cluster worth reporting on either side of a bridge edge.
const MIN_CLUSTER_SIZE: usize = 2;

/// Urgency of closing a hole.
///
/// Never construct directly, use `from_strength()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolePriority {
    /// No connection at all.
    Critical = 0,
    /// Adjusted strength below 0.05.
    High = 1,
    /// Adjusted strength below 0.1.
    Medium = 2,
    Low = 3,
}

impl HolePriority {
    /// Derives priority from connection strength and combined cluster size.
    ///
    /// Larger cluster pairs are held to a lower bar: strength is divided by
    /// `min(size / 10, 2)` before bucketing.
    pub fn from_strength(strength: f64, combined_size: usize) -> Self {
        if strength <= 0.0 {
            return HolePriority::Critical;
        }
        let size_multiplier = (combined_size as f64 / 10.0).min(2.0);
        let adjusted = strength / size_multiplier;
        if adjusted < 0.05 {
            HolePriority::High
        } else if adjusted < 0.1 {
            HolePriority::Medium
        } else {
            HolePriority::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HolePriority::Critical => "critical",
            HolePriority::High => "high",
            HolePriority::Medium => "medium",
            HolePriority::Low => "low",
        }
    }
}

impl std::fmt::Display for HolePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A weakly connected pair of clusters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralHole {
    /// Node IDs of the first cluster.
    pub cluster_a: Vec<String>,
    /// Node IDs of the second cluster.
    pub cluster_b: Vec<String>,
    pub cluster_a_terms: Vec<String>,
    pub cluster_b_terms: Vec<String>,
    pub connection_strength: f64,
    pub priority: HolePriority,
    /// Most central entities of either cluster, best first.
    pub bridge_candidates: Vec<BridgeEntity>,
}

/// Groups positions into connected components, in first-seen order.
pub(crate) fn components(adj: &Adjacency) -> Vec<Vec<usize>> {
    let mut visited = vec![false; adj.len()];
    let mut groups = Vec::new();

    for start in 0..adj.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut group = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            group.push(v);
            for &w in &adj.neighbors[v] {
                if !visited[w] {
                    visited[w] = true;
                    queue.push_back(w);
                }
            }
        }
        groups.push(group);
    }

    groups
}

/// Finds the bridge edges of the component containing `root`.
///
/// Iterative form of Tarjan's discovery-time / low-link DFS.
pub(crate) fn bridge_edges(adj: &Adjacency, root: usize) -> Vec<(usize, usize)> {
    let mut discovery: Vec<Option<usize>> = vec![None; adj.len()];
    let mut low = vec![0usize; adj.len()];
    let mut bridges = Vec::new();
    let mut timer = 0;

    // (node, parent, next neighbor to visit)
    let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];
    discovery[root] = Some(timer);
    low[root] = timer;
    timer += 1;

    while let Some(&(v, parent, next)) = stack.last() {
        if let Some(&w) = adj.neighbors[v].get(next) {
            if let Some(top) = stack.last_mut() {
                top.2 += 1;
            }
            if Some(w) == parent {
                continue;
            }
            match discovery[w] {
                Some(seen) => low[v] = low[v].min(seen),
                None => {
                    discovery[w] = Some(timer);
                    low[w] = timer;
                    timer += 1;
                    stack.push((w, Some(v), 0));
                }
            }
        } else {
            stack.pop();
            if let Some(p) = parent {
                low[p] = low[p].min(low[v]);
                if discovery[p].is_some_and(|d| low[v] > d) {
                    bridges.push((p, v));
                }
            }
        }
    }

    bridges
}

/// Splits `members` into groups after cutting the edge `cut`.
fn split_without(adj: &Adjacency, members: &[usize], cut: (usize, usize)) -> Vec<Vec<usize>> {
    let allowed: HashSet<usize> = members.iter().copied().collect();
    let is_cut = |a: usize, b: usize| (a, b) == cut || (b, a) == cut;
    let mut visited: HashSet<usize> = HashSet::new();
    let mut groups = Vec::new();

    for &start in members {
        if !visited.insert(start) {
            continue;
        }
        let mut group = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            group.push(v);
            for &w in &adj.neighbors[v] {
                if allowed.contains(&w) && !is_cut(v, w) && visited.insert(w) {
                    queue.push_back(w);
                }
            }
        }
        groups.push(group);
    }

    groups
}

impl KnowledgeGraph {
    /// Connected components as groups of node IDs.
    pub fn connected_components(&self) -> Vec<Vec<String>> {
        let adj = self.adjacency();
        components(&adj)
            .into_iter()
            .map(|group| self.ids_of(&adj, &group))
            .collect()
    }

    fn ids_of(&self, adj: &Adjacency, group: &[usize]) -> Vec<String> {
        group
            .iter()
            .map(|&p| self.graph[adj.nodes[p]].id.clone())
            .collect()
    }

    fn terms_of(&self, adj: &Adjacency, group: &[usize]) -> Vec<String> {
        group
            .iter()
            .map(|&p| self.graph[adj.nodes[p]].term.clone())
            .collect()
    }

    /// Structural holes using the default strength threshold.
    pub fn identify_structural_holes(&self) -> Vec<StructuralHole> {
        self.identify_structural_holes_with(DEFAULT_HOLE_THRESHOLD)
    }

    /// Structural holes whose connection strength is below `threshold`,
    /// most urgent first.
    pub fn identify_structural_holes_with(&self, threshold: f64) -> Vec<StructuralHole> {
        let adj = self.adjacency();
        let groups = components(&adj);
        let mut candidates: Vec<(Vec<usize>, Vec<usize>)> = Vec::new();

        for (i, a) in groups.iter().enumerate() {
            for b in &groups[i + 1..] {
                candidates.push((a.clone(), b.clone()));
            }
        }

        for group in groups.iter().filter(|g| g.len() >= MIN_CLUSTER_SIZE * 2) {
            for cut in bridge_edges(&adj, group[0]) {
                let parts = split_without(&adj, group, cut);
                if let [a, b] = parts.as_slice() {
                    if a.len() >= MIN_CLUSTER_SIZE && b.len() >= MIN_CLUSTER_SIZE {
                        candidates.push((a.clone(), b.clone()));
                    }
                }
            }
        }

        let mut holes: Vec<StructuralHole> = candidates
            .into_iter()
            .filter_map(|(a, b)| {
                let strength = connection_strength(&adj, &a, &b);
                (strength < threshold).then(|| self.describe_hole(&adj, &a, &b, strength))
            })
            .collect();

        holes.sort_by(|x, y| {
            x.priority
                .cmp(&y.priority)
                .then_with(|| x.connection_strength.total_cmp(&y.connection_strength))
        });

        debug!(
            components = groups.len(),
            holes = holes.len(),
            "identified structural holes"
        );
        holes
    }

    fn describe_hole(
        &self,
        adj: &Adjacency,
        a: &[usize],
        b: &[usize],
        strength: f64,
    ) -> StructuralHole {
        let scores = self.calculate_betweenness_centrality();
        let mut bridge_candidates: Vec<BridgeEntity> = a
            .iter()
            .chain(b)
            .map(|&p| &self.graph[adj.nodes[p]])
            .map(|node| BridgeEntity {
                id: node.id.clone(),
                term: node.term.clone(),
                centrality: scores.get(&node.id),
            })
            .filter(|candidate| candidate.centrality > 0.0)
            .collect();
        bridge_candidates.sort_by(|x, y| y.centrality.total_cmp(&x.centrality));
        bridge_candidates.truncate(MAX_BRIDGE_CANDIDATES);

        StructuralHole {
            cluster_a: self.ids_of(adj, a),
            cluster_b: self.ids_of(adj, b),
            cluster_a_terms: self.terms_of(adj, a),
            cluster_b_terms: self.terms_of(adj, b),
            connection_strength: strength,
            priority: HolePriority::from_strength(strength, a.len() + b.len()),
            bridge_candidates,
        }
    }
}

/// Cross edges between two clusters over the number of possible cross pairs.
fn connection_strength(adj: &Adjacency, a: &[usize], b: &[usize]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let in_a: HashSet<usize> = a.iter().copied().collect();
    let in_b: HashSet<usize> = b.iter().copied().collect();
    let cross = adj
        .edge_pairs
        .iter()
        .filter(|(s, t)| {
            (in_a.contains(s) && in_b.contains(t)) || (in_b.contains(s) && in_a.contains(t))
        })
        .count();
    cross as f64 / (a.len() * b.len()) as f64
}
