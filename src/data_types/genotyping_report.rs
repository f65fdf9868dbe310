
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::data_types::tool_report::RawToolReport;
use crate::util::file_io::load_json;

/// A single-sample genotyping report as written by the upstream typing pipeline.
/// Example: `{"sample": "S1", "calls": {"A": {"hisat": ["A*01:01", "A*02:01"], "optitype": ["A*01:01"]}}}`
/// Any other top-level keys (e.g. coverage) are ignored.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GenotypingReport {
    /// The sample identifier
    sample: String,
    /// gene -> tool -> raw allele calls
    calls: BTreeMap<String, BTreeMap<String, Vec<String>>>
}

impl GenotypingReport {
    pub fn new(sample: String, calls: BTreeMap<String, BTreeMap<String, Vec<String>>>) -> GenotypingReport {
        GenotypingReport {
            sample,
            calls
        }
    }

    /// Flattens the report into one raw report per (gene, tool) pair, genes and tools in sorted order
    pub fn raw_tool_reports(&self) -> Vec<RawToolReport> {
        self.calls.iter()
            .flat_map(|(gene, tool_calls)| {
                tool_calls.iter().map(move |(tool_id, calls)| {
                    RawToolReport::new(tool_id.clone(), self.sample.clone(), gene.clone(), calls.clone())
                })
            })
            .collect()
    }

    pub fn sample(&self) -> &str {
        &self.sample
    }

    pub fn calls(&self) -> &BTreeMap<String, BTreeMap<String, Vec<String>>> {
        &self.calls
    }
}

/// Loads a collection of report files (JSON, optionally gzipped) and flattens them into raw tool reports, preserving file order
/// # Arguments
/// * `filenames` - the report files to load
/// # Errors
/// * if any file fails to load or deserialize
pub fn load_raw_reports(filenames: &[PathBuf]) -> Result<Vec<RawToolReport>, Box<dyn std::error::Error>> {
    let mut raw_reports: Vec<RawToolReport> = vec![];
    for filename in filenames.iter() {
        let report = load_report(filename)?;
        raw_reports.extend(report.raw_tool_reports());
    }
    Ok(raw_reports)
}

/// Loads a single report file, attaching the filename to any error
fn load_report(filename: &Path) -> Result<GenotypingReport, Box<dyn std::error::Error>> {
    match load_json(filename) {
        Ok(r) => Ok(r),
        Err(e) => Err(format!("Error while loading report {filename:?}: {e}").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_tool_reports() {
        let json = r#"{
            "sample": "S1",
            "coverage": {"A": []},
            "calls": {
                "B": {"tool2": ["B*07:02"]},
                "A": {"tool2": ["A*01:01"], "tool1": ["A*01:01", "A*02:01"]}
            }
        }"#;
        let report: GenotypingReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.sample(), "S1");

        let raw_reports = report.raw_tool_reports();
        assert_eq!(raw_reports, vec![
            RawToolReport::new("tool1".to_string(), "S1".to_string(), "A".to_string(), vec!["A*01:01".to_string(), "A*02:01".to_string()]),
            RawToolReport::new("tool2".to_string(), "S1".to_string(), "A".to_string(), vec!["A*01:01".to_string()]),
            RawToolReport::new("tool2".to_string(), "S1".to_string(), "B".to_string(), vec!["B*07:02".to_string()]),
        ]);
    }

    #[test]
    fn test_load_raw_reports() {
        let filenames = vec![
            PathBuf::from("test_data/reports/sample1.json"),
            PathBuf::from("test_data/reports/sample2.json")
        ];
        let raw_reports = load_raw_reports(&filenames).unwrap();
        assert_eq!(raw_reports.len(), 12);
        assert_eq!(raw_reports[0].sample_id(), "sample1");
        assert_eq!(raw_reports[11].sample_id(), "sample2");
    }

    #[test]
    fn test_load_bad_report() {
        let filenames = vec![PathBuf::from("test_data/reports/malformed.json")];
        let result = load_raw_reports(&filenames);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("malformed.json"));
    }
}
