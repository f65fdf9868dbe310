
use crate::data_types::parsed_allele::ParsedAllele;
use crate::trie::errors::TrieError;
use crate::trie::{allele_path, NodeLabel, TrieNode};

/// The trie for the calls of a single tool for a single (sample, gene) pair
#[derive(Clone, Debug, PartialEq)]
pub struct AlleleTrie {
    /// the tool that made these calls
    tool_id: String,
    /// the root node, labeled with the gene
    root: TrieNode
}

impl AlleleTrie {
    /// Creates an empty trie for a tool and gene
    pub fn new(tool_id: &str, gene: &str) -> AlleleTrie {
        AlleleTrie {
            tool_id: tool_id.to_string(),
            root: TrieNode::new(NodeLabel::Gene(gene.to_string()))
        }
    }

    /// Builds a trie from all the calls of one tool.
    /// Returns None if the tool made no calls, in which case it is not part of the consensus at all.
    /// # Arguments
    /// * `tool_id` - the tool
    /// * `gene` - the gene these calls were reported for
    /// * `calls` - the parsed calls, duplicates are fine
    /// # Errors
    /// * if any call belongs to a different gene
    pub fn build(tool_id: &str, gene: &str, calls: &[ParsedAllele]) -> Result<Option<AlleleTrie>, TrieError> {
        if calls.is_empty() {
            return Ok(None);
        }

        let mut trie = AlleleTrie::new(tool_id, gene);
        for allele in calls.iter() {
            trie.insert(allele)?;
        }
        Ok(Some(trie))
    }

    /// Inserts a single call, repeated calls are idempotent
    /// # Errors
    /// * if the allele belongs to a different gene
    pub fn insert(&mut self, allele: &ParsedAllele) -> Result<(), TrieError> {
        if allele.gene() != self.gene() {
            return Err(TrieError::GeneMismatch {
                expected: self.gene().to_string(),
                allele: allele.to_string()
            });
        }
        let path = allele_path(allele);
        self.root.insert_path(&self.tool_id, &path);
        Ok(())
    }

    /// Consumes the trie and hands back the root for merging
    pub fn into_root(self) -> TrieNode {
        self.root
    }

    // getters
    pub fn tool_id(&self) -> &str {
        &self.tool_id
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

    fn allele(gene: &str, fields: &[&str]) -> ParsedAllele {
        ParsedAllele::new(gene.to_string(), fields.iter().map(|f| f.to_string()).collect(), None).unwrap()
    }

    #[test]
    fn test_build() {
        let calls = vec![allele("A", &["01", "01"]), allele("A", &["02", "01"])];
        let trie = AlleleTrie::build("tool1", "A", &calls).unwrap().unwrap();
        assert_eq!(trie.tool_id(), "tool1");
        assert_eq!(trie.gene(), "A");
        assert_eq!(trie.root().children().len(), 2);
        assert_eq!(trie.root().node_count(), 5);
        for child in trie.root().children().values() {
            assert_eq!(child.supporting_tools().iter().collect::<Vec<_>>(), vec!["tool1"]);
            assert!(!child.is_terminal());
        }
    }

    #[test]
    fn test_empty_calls() {
        assert_eq!(AlleleTrie::build("tool1", "KIR2DL1", &[]).unwrap(), None);
    }

    #[test]
    fn test_homozygous_idempotent() {
        let homozygous = vec![allele("A", &["01", "01"]), allele("A", &["01", "01"])];
        let single = vec![allele("A", &["01", "01"])];
        let t1 = AlleleTrie::build("tool1", "A", &homozygous).unwrap().unwrap();
        let t2 = AlleleTrie::build("tool1", "A", &single).unwrap().unwrap();
        assert_eq!(t1, t2);
        assert_eq!(t1.root().support_count(), 1);
    }

    #[test]
    fn test_suffix_path() {
        let calls = vec![
            ParsedAllele::new("A".to_string(), vec!["01".to_string(), "01".to_string()], Some("N".to_string())).unwrap(),
            allele("A", &["01", "01", "02"])
        ];
        let trie = AlleleTrie::build("tool1", "A", &calls).unwrap().unwrap();
        let n0101 = trie.root()
            .child(&NodeLabel::Field("01".to_string())).unwrap()
            .child(&NodeLabel::Field("01".to_string())).unwrap();

        // suffix and third field are distinct siblings
        assert_eq!(n0101.children().len(), 2);
        assert!(n0101.child(&NodeLabel::Suffix("N".to_string())).unwrap().is_terminal());
        assert!(n0101.child(&NodeLabel::Field("02".to_string())).unwrap().is_terminal());
        assert!(!n0101.is_terminal());
    }

    #[test]
    fn test_gene_mismatch() {
        let calls = vec![allele("A", &["01"]), allele("B", &["07", "02"])];
        let result = AlleleTrie::build("tool1", "A", &calls);
        assert_eq!(result, Err(TrieError::GeneMismatch {
            expected: "A".to_string(),
            allele: "B*07:02".to_string()
        }));
    }
}
