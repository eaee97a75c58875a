use super::TargetRule;
use crate::types::WordIndex;
use std::collections::HashMap;

/// Handle to a node of a [`PrefixTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
struct PrefixNode {
    children: HashMap<WordIndex, usize>,
    rules: Vec<TargetRule>,
}

/// Arena trie over source word-index sequences
///
/// Each node holds the target rules whose source side is exactly the path
/// from the root to that node.
#[derive(Debug, Clone)]
pub struct PrefixTree {
    nodes: Vec<PrefixNode>,
}

impl PrefixTree {
    pub fn new() -> Self {
        PrefixTree {
            nodes: vec![PrefixNode::default()],
        }
    }

    pub fn root_node(&self) -> NodeId {
        NodeId(0)
    }

    /// Step from `node` along `word`; `None` when no stored phrase continues
    /// with that word
    pub fn follow(&self, node: NodeId, word: WordIndex) -> Option<NodeId> {
        self.nodes[node.0].children.get(&word).map(|&id| NodeId(id))
    }

    /// Walk the whole `path` from the root
    pub fn find(&self, path: &[WordIndex]) -> Option<NodeId> {
        path.iter()
            .try_fold(self.root_node(), |node, &word| self.follow(node, word))
    }

    pub fn target_rules(&self, node: NodeId) -> &[TargetRule] {
        &self.nodes[node.0].rules
    }

    /// Add a rule for `source`, creating the path as needed
    pub fn insert(&mut self, source: &[WordIndex], rule: TargetRule) {
        let mut node_idx = 0;
        for &word in source {
            let next_idx = if let Some(&id) = self.nodes[node_idx].children.get(&word) {
                id
            } else {
                let new_node_id = self.nodes.len();
                self.nodes.push(PrefixNode::default());
                self.nodes[node_idx].children.insert(word, new_node_id);
                new_node_id
            };
            node_idx = next_idx;
        }
        self.nodes[node_idx].rules.push(rule);
    }

    /// Number of stored rules
    pub fn rule_count(&self) -> usize {
        self.nodes.iter().map(|n| n.rules.len()).sum()
    }

    /// Every stored rule, in arena order
    pub fn rules(&self) -> impl Iterator<Item = &TargetRule> {
        self.nodes.iter().flat_map(|n| n.rules.iter())
    }

    /// Length of the longest stored source phrase
    pub fn max_depth(&self) -> usize {
        fn depth(nodes: &[PrefixNode], idx: usize) -> usize {
            nodes[idx]
                .children
                .values()
                .map(|&child| 1 + depth(nodes, child))
                .max()
                .unwrap_or(0)
        }
        depth(&self.nodes, 0)
    }
}

impl Default for PrefixTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(cost: f64) -> TargetRule {
        TargetRule::new(vec![7], vec![cost])
    }

    #[test]
    fn test_follow_and_find() {
        let mut tree = PrefixTree::new();
        tree.insert(&[1, 2], rule(1.0));
        tree.insert(&[1], rule(2.0));

        let root = tree.root_node();
        let one = tree.follow(root, 1).unwrap();
        assert_eq!(tree.target_rules(one).len(), 1);
        let two = tree.follow(one, 2).unwrap();
        assert_eq!(tree.find(&[1, 2]), Some(two));
        assert!(tree.follow(root, 2).is_none());
        assert!(tree.find(&[1, 3]).is_none());
    }

    #[test]
    fn test_inner_node_without_rules() {
        let mut tree = PrefixTree::new();
        tree.insert(&[4, 5, 6], rule(1.0));
        let inner = tree.find(&[4, 5]).unwrap();
        assert!(tree.target_rules(inner).is_empty());
        assert_eq!(tree.max_depth(), 3);
        assert_eq!(tree.rule_count(), 1);
    }
}
