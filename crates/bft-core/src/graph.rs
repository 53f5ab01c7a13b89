use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

/// Edge selected while growing a breadth-first spanning tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEdge {
    /// Index of the edge in the input slice.
    pub edge: usize,
    /// Endpoint already in the tree before this edge was added.
    pub known: String,
    /// Endpoint discovered through this edge.
    pub discovered: String,
}

/// Partition `nodes` into connected components under undirected `edges`.
///
/// Edges touching a node outside `nodes` are ignored. Nodes are visited in
/// input order and neighbours in edge order, so the output is deterministic
/// for a deterministic input. Every node lands in exactly one component.
pub fn connected_components(nodes: &[String], edges: &[(String, String)]) -> Vec<Vec<String>> {
    let adjacency = build_adjacency(nodes, edges);

    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut components = Vec::new();

    for start in nodes {
        if !visited.insert(start.as_str()) {
            continue;
        }

        let mut component = vec![start.clone()];
        let mut queue = VecDeque::from([start.as_str()]);

        while let Some(node) = queue.pop_front() {
            let Some(neighbours) = adjacency.get(node) else {
                continue;
            };
            for &neighbour in neighbours {
                if visited.insert(neighbour) {
                    component.push(neighbour.to_string());
                    queue.push_back(neighbour);
                }
            }
        }

        components.push(component);
    }

    components
}

/// Breadth-first spanning tree over `component`, rooted at its first node.
///
/// Returns the tree edges in discovery order. Candidate edges are scanned in
/// input order, which fixes the tie-break when several edges could reach the
/// same node.
pub fn spanning_tree(component: &[String], edges: &[(String, String)]) -> Vec<TreeEdge> {
    let members: BTreeSet<&str> = component.iter().map(String::as_str).collect();
    let Some(root) = component.first() else {
        return Vec::new();
    };

    let mut visited: BTreeSet<&str> = BTreeSet::from([root.as_str()]);
    let mut queue = VecDeque::from([root.as_str()]);
    let mut tree = Vec::new();

    while let Some(node) = queue.pop_front() {
        for (idx, (left, right)) in edges.iter().enumerate() {
            let other = if left == node {
                right.as_str()
            } else if right == node {
                left.as_str()
            } else {
                continue;
            };

            if !members.contains(other) || !visited.insert(other) {
                continue;
            }

            tree.push(TreeEdge {
                edge: idx,
                known: node.to_string(),
                discovered: other.to_string(),
            });
            queue.push_back(other);
        }
    }

    tree
}

fn build_adjacency<'a>(
    nodes: &'a [String],
    edges: &'a [(String, String)],
) -> BTreeMap<&'a str, Vec<&'a str>> {
    let members: BTreeSet<&str> = nodes.iter().map(String::as_str).collect();
    let mut adjacency: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for (left, right) in edges {
        let (left, right) = (left.as_str(), right.as_str());
        if left == right || !members.contains(left) || !members.contains(right) {
            continue;
        }
        adjacency.entry(left).or_default().push(right);
        adjacency.entry(right).or_default().push(left);
    }

    adjacency
}
