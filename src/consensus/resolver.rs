
use std::cmp::Ordering;

use crate::consensus::config::{ConsensusConfig, DivergenceRule, TieBreak};
use crate::consensus::errors::ConsensusError;
use crate::data_types::consensus_genotype::{ConsensusAllele, ConsensusStatus};
use crate::trie::merged_trie::MergedTrie;
use crate::trie::{NodeLabel, TrieNode};

/// Absorbs floating point error when comparing a support fraction against the threshold, e.g. 3/5 vs 0.6
const SUPPORT_EPSILON: f64 = 1e-9;

/// The outcome of resolving one merged trie
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// 0, 1, or 2 alleles, the first is always the best supported
    alleles: Vec<ConsensusAllele>,
    /// derived from the number of alleles and the tool count
    status: ConsensusStatus
}

impl Resolution {
    fn new(alleles: Vec<ConsensusAllele>, total_tools: usize) -> Resolution {
        let status = ConsensusStatus::from_counts(total_tools, alleles.len());
        Resolution {
            alleles,
            status
        }
    }

    pub fn into_alleles(self) -> Vec<ConsensusAllele> {
        self.alleles
    }

    // getters
    pub fn alleles(&self) -> &[ConsensusAllele] {
        &self.alleles
    }

    pub fn status(&self) -> ConsensusStatus {
        self.status
    }
}

/// Selects up to two alleles from a merged trie.
/// The first allele is a greedy descent along the best supported children while they clear the threshold.
/// The second allele has to branch off a sibling of the first path, no deeper than where the first path lost unanimous support.
/// # Arguments
/// * `merged` - the merged trie for one (sample, gene) pair
/// * `total_tools` - the denominator for support fractions, normally `merged.total_tools()`
/// * `config` - threshold and tie-break policies
/// # Errors
/// * if `total_tools` is smaller than the number of tools in the trie
/// * if the config is invalid
pub fn resolve(merged: &MergedTrie, total_tools: usize, config: &ConsensusConfig) -> Result<Resolution, ConsensusError> {
    config.validate()?;
    let contributing = merged.total_tools();
    if total_tools < contributing {
        return Err(ConsensusError::ToolCountMismatch { total_tools, contributing });
    }
    if total_tools == 0 {
        return Ok(Resolution::new(vec![], 0));
    }

    let resolver = Resolver { total_tools, config };
    let mut first_path = vec![merged.root()];
    resolver.descend(&mut first_path);
    if first_path.len() == 1 {
        // the best child of the root already failed
        return Ok(Resolution::new(vec![], total_tools));
    }

    let mut alleles = vec![resolver.path_to_allele(&first_path)?];
    if let Some(second_path) = resolver.second_path(&first_path) {
        alleles.push(resolver.path_to_allele(&second_path)?);
    }
    Ok(Resolution::new(alleles, total_tools))
}

/// Shared state for both diploid slots
struct Resolver<'c> {
    total_tools: usize,
    config: &'c ConsensusConfig
}

impl Resolver<'_> {
    fn passes(&self, node: &TrieNode) -> bool {
        node.support_count() as f64 >= self.config.threshold() * self.total_tools as f64 - SUPPORT_EPSILON
    }

    /// Orders nodes by support (descending) and then terminal status if the tie-break uses it; Less is preferred
    fn rank(&self, a: &TrieNode, b: &TrieNode) -> Ordering {
        let by_support = b.support_count().cmp(&a.support_count());
        let by_terminal = match self.config.tie_break() {
            TieBreak::TerminalFirst => b.is_terminal().cmp(&a.is_terminal()),
            TieBreak::LexicographicOnly => Ordering::Equal
        };
        by_support.then(by_terminal)
    }

    fn best_child<'a>(&self, node: &'a TrieNode) -> Option<&'a TrieNode> {
        node.children().values()
            .min_by(|a, b| self.rank(a, b).then_with(|| a.label().cmp(b.label())))
    }

    /// Extends a path greedily until the best child fails the threshold
    fn descend<'a>(&self, path: &mut Vec<&'a TrieNode>) {
        while let Some(&current) = path.last() {
            match self.best_child(current) {
                Some(child) if self.passes(child) => path.push(child),
                _ => break
            }
        }
    }

    /// Finds the path for the second slot, if any sibling branch of the first path clears the threshold
    fn second_path<'a>(&self, first_path: &[&'a TrieNode]) -> Option<Vec<&'a TrieNode>> {
        let last_depth = first_path.len() - 1;
        let cutoff = match self.config.divergence() {
            DivergenceRule::FullSupportPrefix => first_path.iter()
                .enumerate()
                .skip(1)
                .find(|(_, node)| node.support_count() < self.total_tools)
                .map(|(depth, _)| depth)
                .unwrap_or(last_depth),
            DivergenceRule::AnyDepth => last_depth
        };

        let mut best: Option<(usize, &'a TrieNode)> = None;
        for depth in 1..=cutoff {
            let parent = first_path[depth - 1];
            let taken = first_path[depth].label();
            for sibling in parent.children().values() {
                if sibling.label() == taken || !self.passes(sibling) {
                    continue;
                }
                let is_better = match best {
                    None => true,
                    Some((best_depth, best_node)) => {
                        // shallower divergence wins ties, since it separates the two calls earlier
                        self.rank(sibling, best_node)
                            .then(depth.cmp(&best_depth))
                            .then_with(|| sibling.label().cmp(best_node.label())) == Ordering::Less
                    }
                };
                if is_better {
                    best = Some((depth, sibling));
                }
            }
        }

        let (depth, branch) = best?;
        let mut path: Vec<&'a TrieNode> = first_path[..depth].to_vec();
        path.push(branch);
        self.descend(&mut path);
        Some(path)
    }

    /// Converts a root-to-node path into an allele; the path must have at least one node below the root
    fn path_to_allele(&self, path: &[&TrieNode]) -> Result<ConsensusAllele, ConsensusError> {
        let gene = path[0].value().to_string();
        let mut fields = vec![];
        let mut suffix = None;
        for node in path[1..].iter() {
            match node.label() {
                NodeLabel::Field(value) => fields.push(value.clone()),
                NodeLabel::Suffix(value) => suffix = Some(value.clone()),
                NodeLabel::Gene(value) => {
                    return Err(ConsensusError::InvalidGenotype(format!("gene label {value} found below the root")));
                }
            };
        }

        let last = path[path.len() - 1];
        ConsensusAllele::new(
            gene,
            fields,
            suffix,
            last.support_fraction(self.total_tools),
            last.supporting_tools().clone()
        ).map_err(|e| ConsensusError::InvalidGenotype(e.to_string()))
    }
}
