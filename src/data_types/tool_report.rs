
use serde::Serialize;

use crate::data_types::parsed_allele::ParsedAllele;
use crate::parser::AlleleParser;
use crate::parser::errors::ParseError;

/// All of the parsed calls one tool made for one gene in one sample
#[derive(Clone, Debug, PartialEq)]
pub struct ToolReport {
    /// the genotyping tool, e.g. "hisat"
    tool_id: String,
    /// the sample the calls belong to
    sample_id: String,
    /// the gene the calls were reported under
    gene: String,
    /// the parsed calls; can be empty, and can contain more than two (ambiguous) calls
    calls: Vec<ParsedAllele>
}

impl ToolReport {
    pub fn new(tool_id: String, sample_id: String, gene: String, calls: Vec<ParsedAllele>) -> ToolReport {
        ToolReport {
            tool_id,
            sample_id,
            gene,
            calls
        }
    }

    // getters
    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    pub fn sample_id(&self) -> &str {
        &self.sample_id
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn calls(&self) -> &[ParsedAllele] {
        &self.calls
    }
}

/// Same as a ToolReport, but the calls are still the raw strings from the tool
#[derive(Clone, Debug, PartialEq)]
pub struct RawToolReport {
    /// the genotyping tool
    tool_id: String,
    /// the sample the calls belong to
    sample_id: String,
    /// the gene the calls were reported under
    gene: String,
    /// the unparsed calls
    calls: Vec<String>
}

impl RawToolReport {
    pub fn new(tool_id: String, sample_id: String, gene: String, calls: Vec<String>) -> RawToolReport {
        RawToolReport {
            tool_id,
            sample_id,
            gene,
            calls
        }
    }

    /// Parses all of the raw calls. Calls that fail to parse are returned separately and are not part of the report.
    /// Parsed alleles without a gene inherit the gene of this report; alleles naming a different gene are rejected.
    /// # Arguments
    /// * `parser` - the allele parser for this gene system
    pub fn parse_with(&self, parser: &AlleleParser) -> (ToolReport, Vec<RejectedCall>) {
        let mut calls: Vec<ParsedAllele> = Vec::with_capacity(self.calls.len());
        let mut rejected: Vec<RejectedCall> = vec![];
        for raw in self.calls.iter() {
            let result = parser.parse(raw).and_then(|allele| {
                if allele.gene().is_empty() {
                    Ok(allele.with_gene(self.gene.clone()))
                } else if allele.gene() != self.gene {
                    Err(ParseError::GeneMismatch {
                        raw: raw.clone(),
                        expected: self.gene.clone(),
                        found: allele.gene().to_string()
                    })
                } else {
                    Ok(allele)
                }
            });

            match result {
                Ok(allele) => calls.push(allele),
                Err(reason) => rejected.push(RejectedCall {
                    tool_id: self.tool_id.clone(),
                    sample_id: self.sample_id.clone(),
                    gene: self.gene.clone(),
                    raw: raw.clone(),
                    reason
                })
            };
        }

        let report = ToolReport::new(self.tool_id.clone(), self.sample_id.clone(), self.gene.clone(), calls);
        (report, rejected)
    }

    // getters
    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    pub fn sample_id(&self) -> &str {
        &self.sample_id
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn calls(&self) -> &[String] {
        &self.calls
    }
}

/// A raw call that could not be parsed, tagged with where it came from
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RejectedCall {
    tool_id: String,
    sample_id: String,
    gene: String,
    /// the offending call string
    raw: String,
    /// why it was rejected
    reason: ParseError
}

impl RejectedCall {
    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    pub fn sample_id(&self) -> &str {
        &self.sample_id
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn reason(&self) -> &ParseError {
        &self.reason
    }
}

impl std::fmt::Display for RejectedCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {} / {}: {}", self.sample_id, self.gene, self.tool_id, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::parser::parser_config::ParserConfigSet;

    fn hla_parser() -> AlleleParser {
        ParserConfigSet::default().build_parser("hla").unwrap()
    }

    #[test]
    fn test_parse_with() {
        let raw = RawToolReport::new(
            "tool1".to_string(), "S1".to_string(), "A".to_string(),
            vec!["A*01:01".to_string(), "02:01".to_string(), "garbage".to_string()]
        );
        let (report, rejected) = raw.parse_with(&hla_parser());
        assert_eq!(report.tool_id(), "tool1");
        assert_eq!(report.calls().len(), 2);

        // the gene-less call inherits the report gene
        assert_eq!(report.calls()[1].to_string(), "A*02:01");

        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].raw(), "garbage");
        assert_eq!(rejected[0].tool_id(), "tool1");
        assert_eq!(rejected[0].reason(), &ParseError::NoMatch { raw: "garbage".to_string() });
    }

    #[test]
    fn test_trailing_text_rejected() {
        let raw = RawToolReport::new(
            "tool1".to_string(), "S1".to_string(), "A".to_string(),
            vec!["A*01:01xyz".to_string(), "A*01:01:01:01:01".to_string(), "A*02:01".to_string()]
        );
        let (report, rejected) = raw.parse_with(&hla_parser());
        assert_eq!(report.calls().len(), 1);
        assert_eq!(report.calls()[0].to_string(), "A*02:01");

        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].reason(), &ParseError::PartialMatch { raw: "A*01:01xyz".to_string(), unparsed: "xyz".to_string() });
        assert_eq!(rejected[1].reason(), &ParseError::TooManyFields { raw: "A*01:01:01:01:01".to_string(), count: 5 });
    }

    #[test]
    fn test_gene_mismatch() {
        let raw = RawToolReport::new(
            "tool1".to_string(), "S1".to_string(), "A".to_string(),
            vec!["B*07:02".to_string()]
        );
        let (report, rejected) = raw.parse_with(&hla_parser());
        assert!(report.calls().is_empty());
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].reason(), &ParseError::GeneMismatch {
            raw: "B*07:02".to_string(),
            expected: "A".to_string(),
            found: "B".to_string()
        });
        assert_eq!(rejected[0].to_string(), "S1 / A / tool1: allele \"B*07:02\" belongs to gene B, but was reported for gene A");
    }
}
