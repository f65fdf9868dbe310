
/// Contains the resolved consensus alleles and per-gene genotypes
pub mod consensus_genotype;
/// Contains the final JSON output bundle
pub mod consensus_json;
/// Contains the genotyping report file format and loader
pub mod genotyping_report;
/// Contains the normalized representation of a single allele call
pub mod parsed_allele;
/// Contains per-tool reports, raw and parsed, and rejected calls
pub mod tool_report;
