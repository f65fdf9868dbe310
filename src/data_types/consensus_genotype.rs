
use serde::{Deserialize, Serialize};
use simple_error::{bail, SimpleError};
use std::collections::BTreeSet;

/// Placeholder used when a diploid slot could not be filled
pub const EMPTY_SLOT: &str = "NA";

/// A single resolved allele; it can stop at any resolution, including above the deepest field any tool reported
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ConsensusAllele {
    /// the gene name, i.e. the root of the path
    gene: String,
    /// the resolved field values, in order
    fields: Vec<String>,
    /// the suffix, only present if resolution reached it
    suffix: Option<String>,
    /// fraction of contributing tools that support this allele
    support_fraction: f64,
    /// the tools supporting the deepest node of this allele
    supporting_tools: BTreeSet<String>
}

impl ConsensusAllele {
    /// Creates a new consensus allele
    /// # Arguments
    /// * `gene` - the gene name
    /// * `fields` - the resolved fields, must be non-empty
    /// * `suffix` - the resolved suffix, if any
    /// * `support_fraction` - the support for the deepest node, must be in [0, 1]
    /// * `supporting_tools` - the tools that support the deepest node
    /// # Errors
    /// * if `fields` is empty
    /// * if `support_fraction` is outside of [0, 1]
    pub fn new(gene: String, fields: Vec<String>, suffix: Option<String>, support_fraction: f64, supporting_tools: BTreeSet<String>) -> Result<ConsensusAllele, SimpleError> {
        if fields.is_empty() {
            bail!("Consensus allele for {gene} must resolve at least one field");
        }
        if !(0.0..=1.0).contains(&support_fraction) {
            bail!("Support fraction must be between 0.0 and 1.0, found {support_fraction}");
        }
        Ok(ConsensusAllele {
            gene,
            fields,
            suffix,
            support_fraction,
            supporting_tools
        })
    }

    /// The path of values from the root to the resolved node: gene, fields, then the suffix
    pub fn path(&self) -> Vec<&str> {
        std::iter::once(self.gene.as_str())
            .chain(self.fields.iter().map(|f| f.as_str()))
            .chain(self.suffix.as_deref())
            .collect()
    }

    /// The depth of the resolved node, which is the number of resolved fields plus one for a suffix
    pub fn resolution_depth(&self) -> usize {
        self.fields.len() + usize::from(self.suffix.is_some())
    }

    /// Formats the allele with custom delimiters, e.g. ("*", ":") -> "A*01:01"
    pub fn format_with(&self, gene_delimiter: &str, field_delimiter: &str) -> String {
        format!(
            "{}{gene_delimiter}{}{}",
            self.gene,
            self.fields.join(field_delimiter),
            self.suffix.as_deref().unwrap_or_default()
        )
    }

    // getters
    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    pub fn support_fraction(&self) -> f64 {
        self.support_fraction
    }

    pub fn supporting_tools(&self) -> &BTreeSet<String> {
        &self.supporting_tools
    }
}

impl std::fmt::Display for ConsensusAllele {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_with("*", ":"))
    }
}

/// Summary of how a genotype was resolved
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, strum_macros::Display, strum_macros::EnumIter)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsensusStatus {
    /// Both diploid slots are filled
    Resolved,
    /// Only one diploid slot is filled
    Partial,
    /// Tools reported calls, but nothing met the threshold
    NoConsensus,
    /// No tool reported a usable call for this gene
    InsufficientData
}

impl ConsensusStatus {
    /// Derives the status from the number of contributing tools and the number of resolved alleles
    pub fn from_counts(total_tools: usize, allele_count: usize) -> ConsensusStatus {
        if total_tools == 0 {
            return ConsensusStatus::InsufficientData;
        }
        match allele_count {
            0 => ConsensusStatus::NoConsensus,
            1 => ConsensusStatus::Partial,
            _ => ConsensusStatus::Resolved
        }
    }
}

/// The final diploid call for one gene in one sample
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ConsensusGenotype {
    /// the sample identifier
    sample_id: String,
    /// the gene name
    gene: String,
    /// the number of tools that contributed at least one call
    total_tools: usize,
    /// 0, 1, or 2 resolved alleles
    alleles: Vec<ConsensusAllele>,
    /// derived from the tool count and the number of alleles
    status: ConsensusStatus
}

impl ConsensusGenotype {
    /// Creates a new genotype and derives the status from the inputs
    /// # Arguments
    /// * `sample_id` - the sample
    /// * `gene` - the gene
    /// * `total_tools` - the number of tools with at least one call
    /// * `alleles` - the resolved alleles, at most 2
    /// # Errors
    /// * if more than 2 alleles are provided
    /// * if alleles are provided without any contributing tools
    pub fn new(sample_id: String, gene: String, total_tools: usize, alleles: Vec<ConsensusAllele>) -> Result<ConsensusGenotype, SimpleError> {
        if alleles.len() > 2 {
            bail!("Genotype for {sample_id} {gene} has {} alleles, expected at most 2", alleles.len());
        }
        if total_tools == 0 && !alleles.is_empty() {
            bail!("Genotype for {sample_id} {gene} has alleles but no contributing tools");
        }
        let status = ConsensusStatus::from_counts(total_tools, alleles.len());

        Ok(ConsensusGenotype {
            sample_id,
            gene,
            total_tools,
            alleles,
            status
        })
    }

    /// Shortcut for a gene that no tool reported
    pub fn insufficient_data(sample_id: String, gene: String) -> ConsensusGenotype {
        ConsensusGenotype {
            sample_id,
            gene,
            total_tools: 0,
            alleles: vec![],
            status: ConsensusStatus::from_counts(0, 0)
        }
    }

    /// Returns the two diploid slots formatted with the given delimiters, empty slots are "NA"
    pub fn formatted_slots(&self, gene_delimiter: &str, field_delimiter: &str) -> [String; 2] {
        let mut slots = [EMPTY_SLOT.to_string(), EMPTY_SLOT.to_string()];
        for (slot, allele) in slots.iter_mut().zip(self.alleles.iter()) {
            *slot = allele.format_with(gene_delimiter, field_delimiter);
        }
        slots
    }

    /// Returns the genotype as "hap1/hap2", e.g. "A*01:01/A*02:01" or "A*01/NA"
    pub fn diplotype(&self) -> String {
        let [hap1, hap2] = self.formatted_slots("*", ":");
        format!("{hap1}/{hap2}")
    }

    // getters
    pub fn sample_id(&self) -> &str {
        &self.sample_id
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn total_tools(&self) -> usize {
        self.total_tools
    }

    pub fn alleles(&self) -> &[ConsensusAllele] {
        &self.alleles
    }

    pub fn status(&self) -> ConsensusStatus {
        self.status
    }
}
