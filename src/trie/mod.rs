
/// The per-tool trie built from a single tool's calls
pub mod allele_trie;
/// Errors that can occur while building or merging tries
pub mod errors;
/// The union of all per-tool tries for a (sample, gene) pair
pub mod merged_trie;

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

use crate::data_types::parsed_allele::ParsedAllele;

/// The value stored at a trie node. Typing the label keeps a suffix from ever colliding with a field value at the same depth.
/// The derived ordering is the lexicographic tie-break: fields sort before suffixes, then by string value.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum NodeLabel {
    /// only used at the root
    Gene(String),
    /// a nomenclature field value
    Field(String),
    /// an expression suffix, always the last label on a path
    Suffix(String)
}

impl NodeLabel {
    /// The raw string value regardless of label type
    pub fn value(&self) -> &str {
        match self {
            NodeLabel::Gene(v) |
            NodeLabel::Field(v) |
            NodeLabel::Suffix(v) => v
        }
    }
}

/// Converts an allele into the labels below the root: each field in order, then the suffix if present
pub fn allele_path(allele: &ParsedAllele) -> Vec<NodeLabel> {
    allele.fields().iter()
        .map(|f| NodeLabel::Field(f.clone()))
        .chain(allele.suffix().map(|s| NodeLabel::Suffix(s.to_string())))
        .collect()
}

/// One node in an allele trie.
/// The tool support is a set so that a tool reporting the same path more than once still only counts once.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TrieNode {
    /// the value at this resolution level
    label: NodeLabel,
    /// children keyed by their label, so siblings are always distinct; written out as a list since each child carries its label
    #[serde(serialize_with = "serialize_children")]
    children: BTreeMap<NodeLabel, TrieNode>,
    /// every tool with a call passing through this node
    supporting_tools: BTreeSet<String>,
    /// true if at least one call ends at this node
    is_terminal: bool
}

/// JSON only allows string keys, so the children are written in label order as a plain list
fn serialize_children<S: Serializer>(children: &BTreeMap<NodeLabel, TrieNode>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(children.values())
}

impl TrieNode {
    /// Creates an empty node with no support
    pub fn new(label: NodeLabel) -> TrieNode {
        TrieNode {
            label,
            children: Default::default(),
            supporting_tools: Default::default(),
            is_terminal: false
        }
    }

    /// Adds a path below this node on behalf of a tool. Every node on the path, including this one, gains the tool.
    /// # Arguments
    /// * `tool_id` - the tool making the call
    /// * `path` - the labels below this node; the last one gets marked terminal
    pub fn insert_path(&mut self, tool_id: &str, path: &[NodeLabel]) {
        if !self.supporting_tools.contains(tool_id) {
            self.supporting_tools.insert(tool_id.to_string());
        }

        match path.split_first() {
            Some((label, remainder)) => {
                self.children.entry(label.clone())
                    .or_insert_with(|| TrieNode::new(label.clone()))
                    .insert_path(tool_id, remainder);
            },
            None => {
                self.is_terminal = true;
            }
        }
    }

    /// Structurally merges another node with the same label into this one.
    /// Support is unioned and terminal flags are OR-ed, so this is commutative, associative, and idempotent.
    /// # Panics
    /// * if the labels do not match, callers are expected to only merge matching nodes
    pub fn merge(&mut self, other: TrieNode) {
        assert_eq!(self.label, other.label, "Only nodes with identical labels can be merged");
        self.supporting_tools.extend(other.supporting_tools);
        self.is_terminal |= other.is_terminal;
        for (label, other_child) in other.children.into_iter() {
            match self.children.get_mut(&label) {
                Some(child) => child.merge(other_child),
                None => {
                    self.children.insert(label, other_child);
                }
            };
        }
    }

    /// Fraction of the contributing tools that pass through this node
    /// # Arguments
    /// * `total_tools` - the denominator; 0 returns 0.0
    pub fn support_fraction(&self, total_tools: usize) -> f64 {
        if total_tools == 0 {
            0.0
        } else {
            self.support_count() as f64 / total_tools as f64
        }
    }

    /// Total number of nodes in this sub-trie, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(|c| c.node_count()).sum::<usize>()
    }

    // getters
    pub fn label(&self) -> &NodeLabel {
        &self.label
    }

    pub fn value(&self) -> &str {
        self.label.value()
    }

    pub fn children(&self) -> &BTreeMap<NodeLabel, TrieNode> {
        &self.children
    }

    pub fn child(&self, label: &NodeLabel) -> Option<&TrieNode> {
        self.children.get(label)
    }

    pub fn supporting_tools(&self) -> &BTreeSet<String> {
        &self.supporting_tools
    }

    pub fn support_count(&self) -> usize {
        self.supporting_tools.len()
    }

    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_path(fields: &[&str]) -> Vec<NodeLabel> {
        fields.iter().map(|f| NodeLabel::Field(f.to_string())).collect()
    }

    #[test]
    fn test_label_order() {
        // fields always come before suffixes, then string order
        assert!(NodeLabel::Field("99".to_string()) < NodeLabel::Suffix("N".to_string()));
        assert!(NodeLabel::Field("01".to_string()) < NodeLabel::Field("02".to_string()));
        assert_eq!(NodeLabel::Suffix("Q".to_string()).value(), "Q");
    }

    #[test]
    fn test_allele_path() {
        let allele = ParsedAllele::new("A".to_string(), vec!["01".to_string(), "01".to_string()], Some("N".to_string())).unwrap();
        assert_eq!(allele_path(&allele), vec![
            NodeLabel::Field("01".to_string()),
            NodeLabel::Field("01".to_string()),
            NodeLabel::Suffix("N".to_string())
        ]);
    }

    #[test]
    fn test_insert_path() {
        let mut root = TrieNode::new(NodeLabel::Gene("A".to_string()));
        root.insert_path("tool1", &field_path(&["01", "01"]));
        root.insert_path("tool1", &field_path(&["01", "01"]));
        root.insert_path("tool1", &field_path(&["01"]));

        assert_eq!(root.support_count(), 1);
        assert!(!root.is_terminal());
        assert_eq!(root.node_count(), 3);

        let n01 = root.child(&NodeLabel::Field("01".to_string())).unwrap();
        assert_eq!(n01.support_count(), 1);
        assert!(n01.is_terminal());
        let n0101 = n01.child(&NodeLabel::Field("01".to_string())).unwrap();
        assert!(n0101.is_terminal());
        assert_eq!(n0101.value(), "01");
    }

    #[test]
    fn test_merge() {
        let mut lhs = TrieNode::new(NodeLabel::Gene("A".to_string()));
        lhs.insert_path("tool1", &field_path(&["01", "01"]));
        let mut rhs = TrieNode::new(NodeLabel::Gene("A".to_string()));
        rhs.insert_path("tool2", &field_path(&["01"]));
        rhs.insert_path("tool2", &field_path(&["02", "01"]));

        lhs.merge(rhs.clone());
        assert_eq!(lhs.supporting_tools(), &BTreeSet::from(["tool1".to_string(), "tool2".to_string()]));
        let n01 = lhs.child(&NodeLabel::Field("01".to_string())).unwrap();
        assert_eq!(n01.support_count(), 2);
        assert!(n01.is_terminal());
        assert_eq!(lhs.node_count(), 5);

        // merging again changes nothing
        let before = lhs.clone();
        lhs.merge(rhs);
        assert_eq!(lhs, before);
    }

    #[test]
    #[should_panic]
    fn test_merge_mismatch() {
        let mut lhs = TrieNode::new(NodeLabel::Gene("A".to_string()));
        let rhs = TrieNode::new(NodeLabel::Gene("B".to_string()));
        lhs.merge(rhs);
    }

    #[test]
    fn test_serialize() {
        let mut root = TrieNode::new(NodeLabel::Gene("A".to_string()));
        root.insert_path("tool1", &[NodeLabel::Field("01".to_string()), NodeLabel::Suffix("N".to_string())]);
        root.insert_path("tool2", &field_path(&["02"]));

        let value = serde_json::to_value(&root).unwrap();
        assert_eq!(value["label"]["Gene"], "A");
        let children = value["children"].as_array().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0]["label"]["Field"], "01");
        assert_eq!(children[0]["children"][0]["label"]["Suffix"], "N");
        assert_eq!(children[0]["children"][0]["is_terminal"], true);
        assert_eq!(children[1]["supporting_tools"][0], "tool2");
    }

    #[test]
    fn test_support_fraction() {
        let mut root = TrieNode::new(NodeLabel::Gene("A".to_string()));
        root.insert_path("tool1", &field_path(&["01"]));
        assert_eq!(root.support_fraction(0), 0.0);
        assert_eq!(root.support_fraction(4), 0.25);
    }
}
