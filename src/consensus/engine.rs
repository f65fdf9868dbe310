
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

use crate::consensus::config::ConsensusConfig;
use crate::consensus::errors::ConsensusError;
use crate::consensus::resolver::resolve;
use crate::data_types::consensus_genotype::{ConsensusGenotype, ConsensusStatus};
use crate::data_types::parsed_allele::ParsedAllele;
use crate::data_types::tool_report::{RawToolReport, RejectedCall, ToolReport};
use crate::parser::AlleleParser;
use crate::trie::allele_trie::AlleleTrie;
use crate::trie::merged_trie::MergedTrie;

/// A (sample, gene) group that could not be resolved
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupFailure {
    sample_id: String,
    gene: String,
    error: String
}

impl GroupFailure {
    // getters
    pub fn sample_id(&self) -> &str {
        &self.sample_id
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn error(&self) -> &str {
        &self.error
    }
}

/// A merged trie kept for debugging
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupTrie {
    sample_id: String,
    gene: String,
    trie: MergedTrie
}

impl GroupTrie {
    // getters
    pub fn sample_id(&self) -> &str {
        &self.sample_id
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn trie(&self) -> &MergedTrie {
        &self.trie
    }
}

/// Everything produced by one engine run; all collections are sorted by (sample, gene)
#[derive(Clone, Debug, Default)]
pub struct EngineResults {
    /// one genotype per successfully resolved group
    genotypes: Vec<ConsensusGenotype>,
    /// groups that failed, these have no genotype
    failed_groups: Vec<GroupFailure>,
    /// raw calls that failed to parse, only filled by `run_raw`
    rejected_calls: Vec<RejectedCall>,
    /// the merged tries, only filled if the config retains them
    merged_tries: Vec<GroupTrie>
}

impl EngineResults {
    /// Counts the genotypes in each status, every status is present even if the count is 0
    pub fn status_counts(&self) -> BTreeMap<ConsensusStatus, usize> {
        let mut counts: BTreeMap<ConsensusStatus, usize> = ConsensusStatus::iter()
            .map(|status| (status, 0))
            .collect();
        for genotype in self.genotypes.iter() {
            *counts.entry(genotype.status()).or_insert(0) += 1;
        }
        counts
    }

    // getters
    pub fn genotypes(&self) -> &[ConsensusGenotype] {
        &self.genotypes
    }

    pub fn failed_groups(&self) -> &[GroupFailure] {
        &self.failed_groups
    }

    pub fn rejected_calls(&self) -> &[RejectedCall] {
        &self.rejected_calls
    }

    pub fn merged_tries(&self) -> &[GroupTrie] {
        &self.merged_tries
    }
}

/// All reports for a single (sample, gene) pair
struct ReportGroup<'a> {
    sample_id: &'a str,
    gene: &'a str,
    reports: Vec<&'a ToolReport>
}

/// Runs the full consensus pipeline over many samples and genes.
/// Each group gets its own fresh tries, so groups are resolved in parallel on the global rayon pool.
#[derive(Clone, Debug)]
pub struct ConsensusEngine {
    config: ConsensusConfig
}

impl ConsensusEngine {
    /// Creates a new engine
    /// # Errors
    /// * if the config fails validation
    pub fn new(config: ConsensusConfig) -> Result<ConsensusEngine, ConsensusError> {
        config.validate()?;
        Ok(ConsensusEngine {
            config
        })
    }

    /// Resolves every (sample, gene) group in the reports.
    /// The output only depends on the set of reports, not their order.
    /// # Arguments
    /// * `reports` - the parsed reports; multiple reports from the same tool for a group are unioned
    pub fn run(&self, reports: &[ToolReport]) -> EngineResults {
        let groups = group_reports(reports);
        info!("Resolving consensus for {} (sample, gene) groups...", groups.len());

        let outcomes: Vec<(&ReportGroup, Result<(ConsensusGenotype, MergedTrie), ConsensusError>)> = groups.par_iter()
            .map(|group| (group, self.resolve_group(group)))
            .collect();

        let mut results = EngineResults::default();
        for (group, outcome) in outcomes.into_iter() {
            match outcome {
                Ok((genotype, merged)) => {
                    debug!("{} {}: {} ({})", group.sample_id, group.gene, genotype.diplotype(), genotype.status());
                    results.genotypes.push(genotype);
                    if self.config.retain_tries() {
                        results.merged_tries.push(GroupTrie {
                            sample_id: group.sample_id.to_string(),
                            gene: group.gene.to_string(),
                            trie: merged
                        });
                    }
                },
                Err(e) => {
                    warn!("Failed to resolve {} {}: {e}", group.sample_id, group.gene);
                    results.failed_groups.push(GroupFailure {
                        sample_id: group.sample_id.to_string(),
                        gene: group.gene.to_string(),
                        error: e.to_string()
                    });
                }
            };
        }
        results
    }

    /// Parses the raw reports and then resolves every group.
    /// Calls that fail to parse are logged and collected, they never fail the run.
    /// # Arguments
    /// * `raw_reports` - the unparsed reports
    /// * `parser` - the allele parser for the gene system of these reports
    pub fn run_raw(&self, raw_reports: &[RawToolReport], parser: &AlleleParser) -> EngineResults {
        let parsed: Vec<(ToolReport, Vec<RejectedCall>)> = raw_reports.par_iter()
            .map(|raw| raw.parse_with(parser))
            .collect();

        let mut reports: Vec<ToolReport> = Vec::with_capacity(parsed.len());
        let mut rejected_calls: Vec<RejectedCall> = vec![];
        for (report, rejected) in parsed.into_iter() {
            for call in rejected.iter() {
                warn!("Rejected call {:?} for {call}", call.raw());
            }
            reports.push(report);
            rejected_calls.extend(rejected);
        }
        if !rejected_calls.is_empty() {
            warn!("{} calls failed to parse and were ignored", rejected_calls.len());
        }

        let mut results = self.run(&reports);
        rejected_calls.sort_by(|a, b| {
            (a.sample_id(), a.gene(), a.tool_id(), a.raw()).cmp(&(b.sample_id(), b.gene(), b.tool_id(), b.raw()))
        });
        results.rejected_calls = rejected_calls;
        results
    }

    /// Builds, merges, and resolves the tries for a single group
    fn resolve_group(&self, group: &ReportGroup) -> Result<(ConsensusGenotype, MergedTrie), ConsensusError> {
        let mut merged = MergedTrie::new(group.gene);
        for report in group.reports.iter() {
            let truncated: Vec<ParsedAllele>;
            let calls: &[ParsedAllele] = match self.config.max_resolution() {
                Some(resolution) => {
                    truncated = report.calls().iter()
                        .map(|allele| allele.truncate(resolution))
                        .collect();
                    &truncated
                },
                None => report.calls()
            };

            if let Some(trie) = AlleleTrie::build(report.tool_id(), group.gene, calls)? {
                merged.add_trie(trie)?;
            }
        }

        let total_tools = merged.total_tools();
        if total_tools == 0 {
            debug!("{} {}: no tool reported a usable call", group.sample_id, group.gene);
            let genotype = ConsensusGenotype::insufficient_data(group.sample_id.to_string(), group.gene.to_string());
            return Ok((genotype, merged));
        } else if total_tools == 1 {
            debug!("{} {}: only {} reported calls", group.sample_id, group.gene, merged.contributing_tools().iter().next().map(String::as_str).unwrap_or_default());
        }

        let resolution = resolve(&merged, total_tools, &self.config)?;
        let genotype = ConsensusGenotype::new(
            group.sample_id.to_string(),
            group.gene.to_string(),
            total_tools,
            resolution.into_alleles()
        ).map_err(|e| ConsensusError::InvalidGenotype(e.to_string()))?;
        Ok((genotype, merged))
    }
}

/// Groups reports by (sample, gene), sorted so the output never depends on the input order
fn group_reports(reports: &[ToolReport]) -> Vec<ReportGroup<'_>> {
    let mut grouped: BTreeMap<(&str, &str), Vec<&ToolReport>> = BTreeMap::new();
    for report in reports.iter() {
        grouped.entry((report.sample_id(), report.gene()))
            .or_default()
            .push(report);
    }
    grouped.into_iter()
        .map(|((sample_id, gene), reports)| ReportGroup { sample_id, gene, reports })
        .collect()
}
