
use serde::Serialize;
use simple_error::bail;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry::{Occupied, Vacant};

use crate::consensus::config::ConsensusConfig;
use crate::consensus::engine::{EngineResults, GroupFailure};
use crate::data_types::consensus_genotype::ConsensusGenotype;
use crate::data_types::tool_report::RejectedCall;

/// Intended to be serialized to JSON as the final result
#[derive(Debug, Serialize)]
pub struct ConsensusJson {
    /// Version of the tool that generated the calls
    version: String,
    /// When the calls were generated
    run_time: chrono::DateTime<chrono::Utc>,
    /// The parser used for the raw calls
    gene_system: String,
    /// The settings used to resolve the consensus
    settings: ConsensusConfig,
    /// Map from sample -> gene -> genotype
    genotypes: BTreeMap<String, BTreeMap<String, ConsensusGenotype>>,
    /// Any (sample, gene) pairs that failed to resolve
    failed_groups: Vec<GroupFailure>,
    /// Any raw calls that failed to parse
    rejected_calls: Vec<RejectedCall>
}

impl ConsensusJson {
    /// Basic constructor, genotypes get added with `insert`
    pub fn new(gene_system: String, settings: ConsensusConfig) -> Self {
        Self {
            version: crate::cli::core::FULL_VERSION.to_string(),
            run_time: chrono::Utc::now(),
            gene_system,
            settings,
            genotypes: Default::default(),
            failed_groups: vec![],
            rejected_calls: vec![]
        }
    }

    /// Bundles up everything from an engine run
    /// # Arguments
    /// * `gene_system` - the parser name used for the run
    /// * `settings` - the consensus settings used for the run
    /// * `results` - the output of the engine
    /// # Errors
    /// * if the results contain more than one genotype for a (sample, gene) pair
    pub fn from_results(gene_system: String, settings: ConsensusConfig, results: &EngineResults) -> Result<Self, Box<dyn std::error::Error>> {
        let mut consensus_json = Self::new(gene_system, settings);
        for genotype in results.genotypes().iter() {
            consensus_json.insert(genotype.clone())?;
        }
        consensus_json.failed_groups = results.failed_groups().to_vec();
        consensus_json.rejected_calls = results.rejected_calls().to_vec();
        Ok(consensus_json)
    }

    /// Simple wrapper for our genotype insertion to make sure we do not double insert
    /// # Arguments
    /// * `genotype` - the genotype call getting saved
    pub fn insert(&mut self, genotype: ConsensusGenotype) -> Result<(), Box<dyn std::error::Error>> {
        let sample_genotypes = self.genotypes.entry(genotype.sample_id().to_string()).or_default();
        match sample_genotypes.entry(genotype.gene().to_string()) {
            Vacant(entry) => entry.insert(genotype),
            Occupied(entry) => bail!("Entry for {} {} is already occupied.", genotype.sample_id(), entry.key())
        };
        Ok(())
    }

    pub fn genotypes(&self) -> &BTreeMap<String, BTreeMap<String, ConsensusGenotype>> {
        &self.genotypes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert() {
        let mut consensus_json = ConsensusJson::new("hla".to_string(), ConsensusConfig::default());
        consensus_json.insert(ConsensusGenotype::insufficient_data("S1".to_string(), "A".to_string())).unwrap();
        consensus_json.insert(ConsensusGenotype::insufficient_data("S1".to_string(), "B".to_string())).unwrap();
        consensus_json.insert(ConsensusGenotype::insufficient_data("S2".to_string(), "A".to_string())).unwrap();
        assert_eq!(consensus_json.genotypes().len(), 2);
        assert_eq!(consensus_json.genotypes()["S1"].len(), 2);

        // double insertion is an error
        assert!(consensus_json.insert(ConsensusGenotype::insufficient_data("S1".to_string(), "A".to_string())).is_err());
    }

    #[test]
    fn test_serialization() {
        let mut consensus_json = ConsensusJson::new("kir".to_string(), ConsensusConfig::default());
        consensus_json.insert(ConsensusGenotype::insufficient_data("S1".to_string(), "KIR2DL1".to_string())).unwrap();
        let value: serde_json::Value = serde_json::to_value(&consensus_json).unwrap();
        assert_eq!(value["gene_system"], "kir");
        assert_eq!(value["settings"]["threshold"], 0.6);
        assert_eq!(value["settings"]["tie_break"], "terminal-first");
        assert_eq!(value["genotypes"]["S1"]["KIR2DL1"]["status"], "INSUFFICIENT_DATA");
        assert_eq!(value["genotypes"]["S1"]["KIR2DL1"]["total_tools"], 0);
        assert!(value["failed_groups"].as_array().unwrap().is_empty());
    }
}
