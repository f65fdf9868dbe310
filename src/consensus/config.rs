
use serde::{Deserialize, Serialize};

use crate::consensus::errors::ConsensusError;
use crate::data_types::parsed_allele::MAX_ALLELE_FIELDS;

/// Default fraction of tools that must agree on a node
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// How ties in support are broken while descending the trie
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, clap::ValueEnum, strum_macros::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TieBreak {
    /// Prefer nodes where some tool's call ends, then the lexicographically smallest value
    #[default]
    TerminalFirst,
    /// Only use the lexicographically smallest value
    LexicographicOnly
}

/// Where the second allele is allowed to branch off of the first allele's path
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, clap::ValueEnum, strum_macros::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DivergenceRule {
    /// At or before the first node where the first allele lost unanimous support
    #[default]
    FullSupportPrefix,
    /// At any node along the first allele's path
    AnyDepth
}

/// All the settings that control how a consensus is resolved
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ConsensusConfig {
    /// minimum fraction of contributing tools required for a node, in [0, 1]
    threshold: f64,
    /// tie-break policy for the greedy descent
    tie_break: TieBreak,
    /// branching policy for the second allele
    divergence: DivergenceRule,
    /// if set, calls are truncated to this many fields before voting
    max_resolution: Option<usize>,
    /// if true, the merged tries are kept in the results for debugging
    retain_tries: bool
}

impl ConsensusConfig {
    /// Creates a config with the given threshold and default policies
    /// # Errors
    /// * if the threshold is outside of [0, 1] or NaN
    pub fn new(threshold: f64) -> Result<ConsensusConfig, ConsensusError> {
        let config = ConsensusConfig {
            threshold,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> ConsensusConfig {
        self.tie_break = tie_break;
        self
    }

    pub fn with_divergence(mut self, divergence: DivergenceRule) -> ConsensusConfig {
        self.divergence = divergence;
        self
    }

    /// Sets the maximum resolution calls get truncated to
    /// # Errors
    /// * if the resolution is 0 or more than 4 fields
    pub fn with_max_resolution(mut self, max_resolution: Option<usize>) -> Result<ConsensusConfig, ConsensusError> {
        self.max_resolution = max_resolution;
        self.validate()?;
        Ok(self)
    }

    pub fn with_retain_tries(mut self, retain_tries: bool) -> ConsensusConfig {
        self.retain_tries = retain_tries;
        self
    }

    /// Checks all of the values, this is also called by the engine since configs can be deserialized
    /// # Errors
    /// * if the threshold is outside of [0, 1] or NaN
    /// * if the max resolution is outside of [1, 4]
    pub fn validate(&self) -> Result<(), ConsensusError> {
        // NaN fails the range check as well
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConsensusError::InvalidThreshold(self.threshold));
        }
        if let Some(resolution) = self.max_resolution {
            if resolution == 0 || resolution > MAX_ALLELE_FIELDS {
                return Err(ConsensusError::InvalidResolution(resolution));
            }
        }
        Ok(())
    }

    // getters
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    pub fn divergence(&self) -> DivergenceRule {
        self.divergence
    }

    pub fn max_resolution(&self) -> Option<usize> {
        self.max_resolution
    }

    pub fn retain_tries(&self) -> bool {
        self.retain_tries
    }
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            tie_break: Default::default(),
            divergence: Default::default(),
            max_resolution: None,
            retain_tries: false
        }
    }
}
