/// Errors that can be produced while building or merging tries
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum TrieError {
    #[error("allele {allele} does not belong to gene {expected}")]
    GeneMismatch { expected: String, allele: String },
    #[error("cannot merge a trie for gene {found} into a trie for gene {expected}")]
    MergeMismatch { expected: String, found: String }
}
