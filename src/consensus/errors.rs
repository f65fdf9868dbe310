
use crate::trie::errors::TrieError;

/// Errors that can be produced by the consensus engine; configuration errors are raised before any work starts,
/// all others fail a single (sample, gene) group
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum ConsensusError {
    #[error("threshold must be between 0.0 and 1.0, found {0}")]
    InvalidThreshold(f64),
    #[error("max resolution must be between 1 and 4, found {0}")]
    InvalidResolution(usize),
    #[error("total tools ({total_tools}) is smaller than the number of contributing tools ({contributing})")]
    ToolCountMismatch { total_tools: usize, contributing: usize },
    #[error("invalid genotype: {0}")]
    InvalidGenotype(String),
    #[error(transparent)]
    Trie(#[from] TrieError)
}
