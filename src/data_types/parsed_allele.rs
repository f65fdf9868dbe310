
use serde::{Deserialize, Serialize};
use simple_error::{bail, SimpleError};

/// The maximum number of nomenclature fields an allele can carry, e.g. "A*01:01:01:01"
pub const MAX_ALLELE_FIELDS: usize = 4;

/// A single allele call after parsing, e.g. "A*01:01:01N" -> gene "A", fields ["01", "01", "01"], suffix "N".
/// Equality and hashing only consider the nomenclature (gene, fields, suffix), the confidence is carried along as metadata.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ParsedAllele {
    /// The gene name, e.g. "A" or "KIR2DL1"; can be empty if the caller did not report one
    gene: String,
    /// The ordered field values; absent trailing fields are simply not present, an empty string is a present value
    fields: Vec<String>,
    /// Optional expression suffix, e.g. "N" or "Q"
    suffix: Option<String>,
    /// Optional tool-reported confidence for the call
    confidence: Option<f64>
}

impl ParsedAllele {
    /// Creates a new parsed allele and checks the field invariants.
    /// # Arguments
    /// * `gene` - the gene name, can be empty to inherit it from the report later
    /// * `fields` - the ordered field values, must have 1 to 4 entries
    /// * `suffix` - an optional suffix; an empty suffix is treated as absent
    /// # Errors
    /// * if `fields` is empty or has more than 4 values
    pub fn new(gene: String, fields: Vec<String>, suffix: Option<String>) -> Result<ParsedAllele, SimpleError> {
        if fields.is_empty() {
            bail!("Allele must have at least one field");
        }
        if fields.len() > MAX_ALLELE_FIELDS {
            bail!("Allele has {} fields, expected at most {MAX_ALLELE_FIELDS}", fields.len());
        }
        let suffix = suffix.filter(|s| !s.is_empty());
        Ok(ParsedAllele {
            gene,
            fields,
            suffix,
            confidence: None
        })
    }

    /// Attaches a confidence score to this allele
    pub fn with_confidence(mut self, confidence: Option<f64>) -> ParsedAllele {
        self.confidence = confidence;
        self
    }

    /// Replaces the gene name, used when the raw call did not include one
    pub fn with_gene(mut self, gene: String) -> ParsedAllele {
        self.gene = gene;
        self
    }

    /// Returns a copy of this allele reduced to at most `resolution` fields.
    /// If any field is removed, the suffix is removed with it since it describes the full-resolution allele.
    /// # Arguments
    /// * `resolution` - the maximum number of fields to keep, must be >0
    /// # Panics
    /// * if `resolution` is 0
    pub fn truncate(&self, resolution: usize) -> ParsedAllele {
        assert!(resolution > 0, "Cannot truncate an allele to zero fields");
        if resolution >= self.fields.len() {
            return self.clone();
        }
        ParsedAllele {
            gene: self.gene.clone(),
            fields: self.fields[..resolution].to_vec(),
            suffix: None,
            confidence: self.confidence
        }
    }

    /// Formats the allele with custom delimiters, e.g. ("*", ":") -> "A*01:01N"
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

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    /// The number of fields that were reported
    pub fn resolution(&self) -> usize {
        self.fields.len()
    }
}

impl PartialEq for ParsedAllele {
    fn eq(&self, other: &Self) -> bool {
        // confidence is metadata, two tools calling the same allele with different scores still agree
        self.gene == other.gene && self.fields == other.fields && self.suffix == other.suffix
    }
}

impl Eq for ParsedAllele {}

impl std::hash::Hash for ParsedAllele {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.gene.hash(state);
        self.fields.hash(state);
        self.suffix.hash(state);
    }
}

impl std::fmt::Display for ParsedAllele {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_with("*", ":"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_fields(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_new_allele() {
        let allele = ParsedAllele::new("A".to_string(), to_fields(&["01", "01"]), None).unwrap();
        assert_eq!(allele.gene(), "A");
        assert_eq!(allele.fields(), &["01", "01"]);
        assert_eq!(allele.suffix(), None);
        assert_eq!(allele.resolution(), 2);
        assert_eq!(allele.to_string(), "A*01:01");

        // empty suffix is the same as no suffix
        let allele = ParsedAllele::new("A".to_string(), to_fields(&["01"]), Some(String::new())).unwrap();
        assert_eq!(allele.suffix(), None);
    }

    #[test]
    fn test_bad_fields() {
        assert!(ParsedAllele::new("A".to_string(), vec![], None).is_err());
        assert!(ParsedAllele::new("A".to_string(), to_fields(&["01"; 5]), None).is_err());
    }

    #[test]
    fn test_present_but_empty() {
        // an empty middle field is a real value, not an absent one
        let allele = ParsedAllele::new("A".to_string(), to_fields(&["01", "", "02"]), None).unwrap();
        assert_eq!(allele.resolution(), 3);
        assert_eq!(allele.to_string(), "A*01::02");
    }

    #[test]
    fn test_truncate() {
        let allele = ParsedAllele::new("A".to_string(), to_fields(&["02", "01", "01", "02"]), Some("N".to_string())).unwrap();
        let truncated = allele.truncate(2);
        assert_eq!(truncated.to_string(), "A*02:01");

        // no change requested, suffix is kept
        let same = allele.truncate(4);
        assert_eq!(same, allele);
        assert_eq!(same.to_string(), "A*02:01:01:02N");
    }

    #[test]
    fn test_equality_ignores_confidence() {
        let a1 = ParsedAllele::new("DPA1".to_string(), to_fields(&["01", "03"]), None).unwrap()
            .with_confidence(Some(0.33));
        let a2 = ParsedAllele::new("DPA1".to_string(), to_fields(&["01", "03"]), None).unwrap();
        assert_eq!(a1, a2);
        assert_eq!(a1.confidence(), Some(0.33));
    }

    #[test]
    fn test_format_with() {
        let allele = ParsedAllele::new("KIR2DL1".to_string(), to_fields(&["001", "01"]), None).unwrap();
        assert_eq!(allele.format_with("*", ""), "KIR2DL1*00101");
    }
}
