
use rustc_hash::FxHashSet as HashSet;
use std::collections::BTreeMap;

use crate::data_types::tool_report::{RawToolReport, RejectedCall};
use crate::parser::AlleleParser;

/// Call counts for a single tool
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToolStats {
    /// number of (sample, gene) reports from this tool
    pub reports: usize,
    /// number of reports that had no calls
    pub empty_reports: usize,
    /// total raw calls
    pub calls: usize,
    /// calls that failed to parse
    pub rejected: usize,
    /// parsed calls by number of fields, index 0 is a 1-field call
    pub resolutions: [usize; 4]
}

/// Summary statistics for a collection of reports
#[derive(Clone, Debug, Default)]
pub struct ReportStats {
    pub samples: usize,
    /// gene -> number of distinct tools with at least one parsed call
    pub gene_tools: BTreeMap<String, usize>,
    /// tool -> stats
    pub tool_stats: BTreeMap<String, ToolStats>,
    /// every call that failed to parse
    pub rejected_calls: Vec<RejectedCall>
}

impl ReportStats {
    /// Parses every report and tallies the results
    /// # Arguments
    /// * `raw_reports` - the reports to summarize
    /// * `parser` - the allele parser for these reports
    pub fn compute(raw_reports: &[RawToolReport], parser: &AlleleParser) -> ReportStats {
        let mut stats = ReportStats::default();
        let mut samples: HashSet<&str> = Default::default();
        let mut gene_tools: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
        for raw_report in raw_reports.iter() {
            samples.insert(raw_report.sample_id());
            let (report, rejected) = raw_report.parse_with(parser);

            let tool_stats = stats.tool_stats.entry(raw_report.tool_id().to_string()).or_default();
            tool_stats.reports += 1;
            if raw_report.calls().is_empty() {
                tool_stats.empty_reports += 1;
            }
            tool_stats.calls += raw_report.calls().len();
            tool_stats.rejected += rejected.len();
            for allele in report.calls().iter() {
                // parsers cap fields at 4
                tool_stats.resolutions[allele.resolution() - 1] += 1;
            }

            let tools = gene_tools.entry(raw_report.gene()).or_default();
            if !report.calls().is_empty() {
                tools.insert(raw_report.tool_id());
            }
            stats.rejected_calls.extend(rejected);
        }

        stats.samples = samples.len();
        stats.gene_tools = gene_tools.into_iter()
            .map(|(gene, tools)| (gene.to_string(), tools.len()))
            .collect();
        stats
    }
}

/// Prints the statistics for a given set of reports
/// # Arguments
/// * `raw_reports` - the loaded reports
/// * `parser` - the allele parser to evaluate the calls with
pub fn print_stats(raw_reports: &[RawToolReport], parser: &AlleleParser) {
    let stats = ReportStats::compute(raw_reports, parser);

    println!("Report statistics:");
    println!("\tSamples: {}", stats.samples);
    println!("\tGenes: {}", stats.gene_tools.len());
    println!("\tTools: {}", stats.tool_stats.len());
    println!("\tTotal calls: {}", stats.tool_stats.values().map(|t| t.calls).sum::<usize>());
    println!("\tRejected calls: {}", stats.rejected_calls.len());

    println!("Tool statistics:");
    println!("tool\treports\tempty_reports\tcalls\trejected\t1_field\t2_field\t3_field\t4_field");
    for (tool_id, tool_stats) in stats.tool_stats.iter() {
        let [r1, r2, r3, r4] = tool_stats.resolutions;
        println!("{tool_id}\t{}\t{}\t{}\t{}\t{r1}\t{r2}\t{r3}\t{r4}",
            tool_stats.reports, tool_stats.empty_reports, tool_stats.calls, tool_stats.rejected);
    }

    // per-gene and rejected details are just if we have elevated verbosity
    if log::log_enabled!(log::Level::Debug) {
        println!();
        println!("Gene statistics:");
        println!("gene\ttools_with_calls");
        for (gene, tool_count) in stats.gene_tools.iter() {
            println!("{gene}\t{tool_count}");
        }
        println!();

        if !stats.rejected_calls.is_empty() {
            println!("Rejected calls:");
            for rejected in stats.rejected_calls.iter() {
                println!("\t{rejected}");
            }
            println!();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use crate::data_types::genotyping_report::load_raw_reports;
    use crate::parser::parser_config::ParserConfigSet;

    #[test]
    fn test_compute() {
        let filenames = vec![
            PathBuf::from("test_data/reports/sample1.json"),
            PathBuf::from("test_data/reports/sample2.json")
        ];
        let raw_reports = load_raw_reports(&filenames).unwrap();
        let parser = ParserConfigSet::default().build_parser("hla").unwrap();
        let stats = ReportStats::compute(&raw_reports, &parser);

        assert_eq!(stats.samples, 2);
        assert_eq!(stats.gene_tools.len(), 3);
        assert_eq!(stats.gene_tools["A"], 3);
        assert_eq!(stats.gene_tools["C"], 2);
        assert_eq!(stats.tool_stats.len(), 3);

        let hisat = &stats.tool_stats["hisat"];
        assert_eq!(hisat.reports, 4);
        assert_eq!(hisat.empty_reports, 1);
        assert_eq!(hisat.calls, 6);
        assert_eq!(hisat.rejected, 0);
        assert_eq!(hisat.resolutions, [0, 4, 2, 0]);

        let t1k = &stats.tool_stats["t1k"];
        assert_eq!(t1k.rejected, 1);
        assert_eq!(t1k.resolutions, [0, 4, 0, 2]);

        assert_eq!(stats.rejected_calls.len(), 1);
        assert_eq!(stats.rejected_calls[0].raw(), "bad allele");
    }
}
