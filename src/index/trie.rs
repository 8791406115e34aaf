//! Arena-backed prefix trie with per-key occurrence counts.
//!
//! # Layout
//! ```text
//! nodes[0]          root
//! nodes[i].children sorted (byte, child id) pairs
//! nodes[i].count    occurrences of the key ending here (0 = not terminal)
//! ```
//!
//! # Design Decisions
//! - Nodes live in one `Vec` and refer to children by index
//! - Symbols are key bytes; keys are `&str`, so every terminal path is UTF-8
//! - Nodes are never removed; wiping means dropping the whole arena
//! - Enumeration is iterative so long keys cannot exhaust the stack

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Index of a node inside the arena.
pub type NodeId = usize;

const ROOT: NodeId = 0;

/// A single trie node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    children: Vec<(u8, NodeId)>,
    #[serde(default)]
    count: u64,
}

impl Node {
    /// Whether a key ends at this node.
    pub fn is_terminal(&self) -> bool {
        self.count > 0
    }
}

/// Structural problems found while rebuilding a trie from raw nodes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("node arena is empty")]
    Empty,

    #[error("node {parent} points at missing child {child}")]
    DanglingChild { parent: NodeId, child: NodeId },

    #[error("node {child} has more than one parent")]
    SharedChild { child: NodeId },

    #[error("children of node {node} are not strictly ordered")]
    UnsortedChildren { node: NodeId },

    #[error("{count} nodes are unreachable from the root")]
    Unreachable { count: usize },

    #[error("key stored at node {node} is not valid UTF-8")]
    InvalidKey { node: NodeId },
}

/// Prefix trie counting how often each key was inserted.
#[derive(Debug, Clone)]
pub struct Trie {
    nodes: Vec<Node>,
    len: usize,
    hits: u64,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    /// Create an empty trie holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            len: 0,
            hits: 0,
        }
    }

    /// Record one occurrence of `key`. Returns its new count.
    pub fn insert(&mut self, key: &str) -> u64 {
        self.insert_n(key, 1)
    }

    /// Record `n` occurrences of `key`. Returns its new count.
    pub fn insert_n(&mut self, key: &str, n: u64) -> u64 {
        if n == 0 {
            return self.get(key).unwrap_or(0);
        }

        let mut node = ROOT;
        for &byte in key.as_bytes() {
            node = self.child_or_insert(node, byte);
        }

        let slot = &mut self.nodes[node];
        if slot.count == 0 {
            self.len += 1;
        }
        slot.count = slot.count.saturating_add(n);
        self.hits = self.hits.saturating_add(n);
        slot.count
    }

    /// Count stored for exactly `key`.
    pub fn get(&self, key: &str) -> Option<u64> {
        let node = self.find(key.as_bytes())?;
        let count = self.nodes[node].count;
        (count > 0).then_some(count)
    }

    /// Every stored key starting with `prefix`, with its count.
    ///
    /// Keys come out depth-first in byte order, but callers must not rely on
    /// any particular order.
    pub fn prefix_enumerate(&self, prefix: &str) -> Vec<(String, u64)> {
        let Some(start) = self.find(prefix.as_bytes()) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        self.walk(start, prefix.as_bytes(), |key, _, count| {
            out.push((String::from_utf8_lossy(key).into_owned(), count));
        });
        out
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sum of all key counts.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of allocated nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Raw node arena, for serialization.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Rebuild a trie from a raw node arena, checking that it forms a tree.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, GraphError> {
        if nodes.is_empty() {
            return Err(GraphError::Empty);
        }

        let mut has_parent = vec![false; nodes.len()];
        for (id, node) in nodes.iter().enumerate() {
            if node.children.windows(2).any(|w| w[0].0 >= w[1].0) {
                return Err(GraphError::UnsortedChildren { node: id });
            }
            for &(_, child) in &node.children {
                if child >= nodes.len() {
                    return Err(GraphError::DanglingChild { parent: id, child });
                }
                if child == ROOT || has_parent[child] {
                    return Err(GraphError::SharedChild { child });
                }
                has_parent[child] = true;
            }
        }

        let mut trie = Self {
            nodes,
            len: 0,
            hits: 0,
        };

        let mut len = 0;
        let mut hits = 0u64;
        let mut invalid = None;
        let visited = trie.walk(ROOT, &[], |key, node, count| {
            if invalid.is_none() && std::str::from_utf8(key).is_err() {
                invalid = Some(node);
            }
            len += 1;
            hits = hits.saturating_add(count);
        });

        if let Some(node) = invalid {
            return Err(GraphError::InvalidKey { node });
        }
        if visited != trie.nodes.len() {
            return Err(GraphError::Unreachable {
                count: trie.nodes.len() - visited,
            });
        }

        trie.len = len;
        trie.hits = hits;
        Ok(trie)
    }

    fn find(&self, path: &[u8]) -> Option<NodeId> {
        path.iter()
            .try_fold(ROOT, |node, &byte| self.child(node, byte))
    }

    fn child(&self, node: NodeId, byte: u8) -> Option<NodeId> {
        let children = &self.nodes[node].children;
        children
            .binary_search_by_key(&byte, |&(b, _)| b)
            .ok()
            .map(|i| children[i].1)
    }

    fn child_or_insert(&mut self, node: NodeId, byte: u8) -> NodeId {
        match self.nodes[node]
            .children
            .binary_search_by_key(&byte, |&(b, _)| b)
        {
            Ok(i) => self.nodes[node].children[i].1,
            Err(i) => {
                let id = self.nodes.len();
                self.nodes.push(Node::default());
                self.nodes[node].children.insert(i, (byte, id));
                id
            }
        }
    }

    /// Depth-first walk below `start`, whose path is `prefix`.
    ///
    /// Calls `visit(key, node, count)` for every terminal and returns how many
    /// nodes were visited.
    fn walk<F>(&self, start: NodeId, prefix: &[u8], mut visit: F) -> usize
    where
        F: FnMut(&[u8], NodeId, u64),
    {
        let mut key = prefix.to_vec();
        let mut stack: Vec<(NodeId, usize, Option<u8>)> = vec![(start, key.len(), None)];
        let mut visited = 0;

        while let Some((id, depth, byte)) = stack.pop() {
            if let Some(byte) = byte {
                key.truncate(depth - 1);
                key.push(byte);
            }
            visited += 1;

            let node = &self.nodes[id];
            if node.count > 0 {
                visit(&key, id, node.count);
            }
            for &(b, child) in node.children.iter().rev() {
                stack.push((child, depth + 1, Some(b)));
            }
        }

        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sorted(mut entries: Vec<(String, u64)>) -> Vec<(String, u64)> {
        entries.sort();
        entries
    }

    #[test]
    fn test_repeated_insert_counts() {
        let mut trie = Trie::new();
        for n in 1..=5 {
            assert_eq!(trie.insert("http://com.example.a/x"), n);
        }

        let found = trie.prefix_enumerate("http://com.example.a/x");
        assert_eq!(found, vec![("http://com.example.a/x".to_string(), 5)]);
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.hits(), 5);
    }

    #[test]
    fn test_prefix_enumerate_returns_exact_subset() {
        let mut trie = Trie::new();
        for key in ["ab", "abc", "abd", "b", "abcde"] {
            trie.insert(key);
        }

        assert_eq!(
            sorted(trie.prefix_enumerate("ab")),
            vec![
                ("ab".to_string(), 1),
                ("abc".to_string(), 1),
                ("abcde".to_string(), 1),
                ("abd".to_string(), 1),
            ]
        );
        assert_eq!(trie.prefix_enumerate("abz"), vec![]);
        assert_eq!(trie.prefix_enumerate("abcdef"), vec![]);
        assert_eq!(trie.prefix_enumerate("").len(), 5);
    }

    #[test]
    fn test_prefix_enumerate_matches_model_on_random_keys() {
        let alphabet = b"abc./";
        let mut trie = Trie::new();
        let mut model: BTreeMap<String, u64> = BTreeMap::new();

        for _ in 0..2_000 {
            let len = fastrand::usize(0..8);
            let key: String = (0..len)
                .map(|_| alphabet[fastrand::usize(..alphabet.len())] as char)
                .collect();
            trie.insert(&key);
            *model.entry(key).or_default() += 1;
        }

        for prefix in ["", "a", "ab", "c.", "./", "bbb", "a/c"] {
            let expected: Vec<(String, u64)> = model
                .iter()
                .filter(|(k, _)| k.starts_with(prefix))
                .map(|(k, v)| (k.clone(), *v))
                .collect();
            assert_eq!(sorted(trie.prefix_enumerate(prefix)), expected, "prefix {prefix:?}");
        }
        assert_eq!(trie.len(), model.len());
        assert_eq!(trie.hits(), 2_000);
    }

    #[test]
    fn test_multibyte_keys() {
        let mut trie = Trie::new();
        trie.insert("http://com.例え/ä");
        trie.insert("http://com.例え/ö");
        assert_eq!(trie.prefix_enumerate("http://com.例").len(), 2);
        assert_eq!(trie.get("http://com.例え/ä"), Some(1));
    }

    #[test]
    fn test_insert_n_and_get() {
        let mut trie = Trie::new();
        assert_eq!(trie.insert_n("k", 7), 7);
        assert_eq!(trie.insert_n("k", 0), 7);
        assert_eq!(trie.get("k"), Some(7));
        assert_eq!(trie.get("missing"), None);
        assert_eq!(trie.hits(), 7);
    }

    #[test]
    fn test_shared_prefixes_share_nodes() {
        let mut trie = Trie::new();
        trie.insert("abc");
        let after_first = trie.node_count();
        trie.insert("abd");
        assert_eq!(trie.node_count(), after_first + 1);
    }

    #[test]
    fn test_from_nodes_rebuilds_counters() {
        let mut trie = Trie::new();
        trie.insert("x");
        trie.insert_n("xy", 3);

        let rebuilt = Trie::from_nodes(trie.nodes().to_vec()).unwrap();
        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt.hits(), 4);
        assert_eq!(
            sorted(rebuilt.prefix_enumerate("")),
            sorted(trie.prefix_enumerate(""))
        );
    }

    #[test]
    fn test_from_nodes_rejects_bad_graphs() {
        assert_eq!(Trie::from_nodes(vec![]).unwrap_err(), GraphError::Empty);

        let dangling = vec![Node { children: vec![(b'a', 5)], count: 0 }];
        assert_eq!(
            Trie::from_nodes(dangling).unwrap_err(),
            GraphError::DanglingChild { parent: 0, child: 5 }
        );

        let shared = vec![
            Node { children: vec![(b'a', 1), (b'b', 1)], count: 0 },
            Node { children: vec![], count: 1 },
        ];
        assert_eq!(
            Trie::from_nodes(shared).unwrap_err(),
            GraphError::SharedChild { child: 1 }
        );

        let unsorted = vec![
            Node { children: vec![(b'b', 1), (b'a', 2)], count: 0 },
            Node::default(),
            Node::default(),
        ];
        assert_eq!(
            Trie::from_nodes(unsorted).unwrap_err(),
            GraphError::UnsortedChildren { node: 0 }
        );

        let cycle = vec![
            Node::default(),
            Node { children: vec![(b'a', 2)], count: 0 },
            Node { children: vec![(b'b', 1)], count: 1 },
        ];
        assert_eq!(
            Trie::from_nodes(cycle).unwrap_err(),
            GraphError::Unreachable { count: 2 }
        );

        let invalid_utf8 = vec![
            Node { children: vec![(0xff, 1)], count: 0 },
            Node { children: vec![], count: 1 },
        ];
        assert_eq!(
            Trie::from_nodes(invalid_utf8).unwrap_err(),
            GraphError::InvalidKey { node: 1 }
        );
    }
}
