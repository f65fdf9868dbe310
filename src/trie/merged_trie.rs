
use serde::Serialize;
use std::collections::BTreeSet;

use crate::trie::allele_trie::AlleleTrie;
use crate::trie::errors::TrieError;
use crate::trie::{NodeLabel, TrieNode};

/// The union of every per-tool trie for one (sample, gene) pair.
/// The root's supporting tools are exactly the tools that made at least one call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MergedTrie {
    /// the root node, labeled with the gene
    root: TrieNode
}

impl MergedTrie {
    /// Creates a merged trie with no contributing tools
    pub fn new(gene: &str) -> MergedTrie {
        MergedTrie {
            root: TrieNode::new(NodeLabel::Gene(gene.to_string()))
        }
    }

    /// Merges a collection of per-tool tries. Order does not matter and a repeated trie is only counted once.
    /// # Arguments
    /// * `gene` - the gene of the pair, needed so an empty collection still has a root
    /// * `tries` - the per-tool tries
    /// # Errors
    /// * if any trie is for a different gene
    pub fn merge<I>(gene: &str, tries: I) -> Result<MergedTrie, TrieError>
    where
        I: IntoIterator<Item = AlleleTrie>
    {
        let mut merged = MergedTrie::new(gene);
        for trie in tries.into_iter() {
            merged.add_trie(trie)?;
        }
        Ok(merged)
    }

    /// Adds a single per-tool trie
    /// # Errors
    /// * if the trie is for a different gene
    pub fn add_trie(&mut self, trie: AlleleTrie) -> Result<(), TrieError> {
        self.check_gene(trie.gene())?;
        self.root.merge(trie.into_root());
        Ok(())
    }

    /// Unions another merged trie into this one, allowing pairwise merging of independently built partial results
    /// # Errors
    /// * if the other trie is for a different gene
    pub fn union(&mut self, other: MergedTrie) -> Result<(), TrieError> {
        self.check_gene(other.gene())?;
        self.root.merge(other.root);
        Ok(())
    }

    fn check_gene(&self, gene: &str) -> Result<(), TrieError> {
        if gene != self.gene() {
            Err(TrieError::MergeMismatch {
                expected: self.gene().to_string(),
                found: gene.to_string()
            })
        } else {
            Ok(())
        }
    }

    /// The number of tools that contributed at least one call
    pub fn total_tools(&self) -> usize {
        self.root.support_count()
    }

    /// The tools that contributed at least one call
    pub fn contributing_tools(&self) -> &BTreeSet<String> {
        self.root.supporting_tools()
    }

    pub fn gene(&self) -> &str {
        self.root.value()
    }

    pub fn root(&self) -> &TrieNode {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data_types::parsed_allele::ParsedAllele;

    fn tool_trie(tool_id: &str, alleles: &[&[&str]]) -> AlleleTrie {
        let calls: Vec<ParsedAllele> = alleles.iter()
            .map(|fields| ParsedAllele::new("A".to_string(), fields.iter().map(|f| f.to_string()).collect(), None).unwrap())
            .collect();
        AlleleTrie::build(tool_id, "A", &calls).unwrap().unwrap()
    }

    /// Walks the trie and verifies a child's tools are always a subset of its parent's tools
    fn check_monotonic(node: &TrieNode) {
        for child in node.children().values() {
            assert!(child.supporting_tools().is_subset(node.supporting_tools()));
            assert!(child.support_count() <= node.support_count());
            check_monotonic(child);
        }
    }

    #[test]
    fn test_merge_support() {
        let tries = vec![
            tool_trie("tool1", &[&["01", "01"]]),
            tool_trie("tool2", &[&["01"]]),
            tool_trie("tool3", &[&["01", "02"]])
        ];
        let merged = MergedTrie::merge("A", tries).unwrap();
        assert_eq!(merged.total_tools(), 3);
        assert_eq!(merged.gene(), "A");

        let n01 = merged.root().child(&NodeLabel::Field("01".to_string())).unwrap();
        assert_eq!(n01.support_count(), 3);
        assert!(n01.is_terminal());
        assert_eq!(n01.child(&NodeLabel::Field("01".to_string())).unwrap().support_count(), 1);
        assert_eq!(n01.child(&NodeLabel::Field("02".to_string())).unwrap().support_count(), 1);
        check_monotonic(merged.root());
    }

    #[test]
    fn test_merge_idempotent() {
        let t1 = tool_trie("tool1", &[&["01", "01"], &["02", "01"]]);
        let once = MergedTrie::merge("A", vec![t1.clone()]).unwrap();
        let twice = MergedTrie::merge("A", vec![t1.clone(), t1]).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.total_tools(), 1);
    }

    #[test]
    fn test_merge_commutative() {
        let a = tool_trie("toolA", &[&["01", "01"], &["02", "01"]]);
        let b = tool_trie("toolB", &[&["01"], &["03", "01", "01"]]);
        let c = tool_trie("toolC", &[&["02", "01", "02"]]);

        let abc = MergedTrie::merge("A", vec![a.clone(), b.clone(), c.clone()]).unwrap();
        let cab = MergedTrie::merge("A", vec![c.clone(), a.clone(), b.clone()]).unwrap();
        let bca = MergedTrie::merge("A", vec![b.clone(), c.clone(), a.clone()]).unwrap();
        assert_eq!(abc, cab);
        assert_eq!(abc, bca);
        check_monotonic(abc.root());

        // associativity through pairwise unions
        let mut ab = MergedTrie::merge("A", vec![a, b]).unwrap();
        let c_only = MergedTrie::merge("A", vec![c]).unwrap();
        ab.union(c_only).unwrap();
        assert_eq!(ab, abc);
    }

    #[test]
    fn test_empty_merge() {
        let merged = MergedTrie::merge("KIR2DL1", Vec::<AlleleTrie>::new()).unwrap();
        assert_eq!(merged.total_tools(), 0);
        assert!(merged.root().children().is_empty());
    }

    #[test]
    fn test_merge_wrong_gene() {
        let mut merged = MergedTrie::new("B");
        let result = merged.add_trie(tool_trie("tool1", &[&["01"]]));
        assert_eq!(result, Err(TrieError::MergeMismatch { expected: "B".to_string(), found: "A".to_string() }));

        let result = merged.union(MergedTrie::new("C"));
        assert!(result.is_err());
    }
}
