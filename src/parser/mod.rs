
/// Errors produced while parsing allele calls
pub mod errors;
/// Contains the serializable parser configurations and the built-in defaults
pub mod parser_config;

use regex::Regex;
use simple_error::{bail, SimpleError};

use crate::data_types::parsed_allele::{ParsedAllele, MAX_ALLELE_FIELDS};
use crate::parser::errors::ParseError;
use crate::parser::parser_config::ParserConfig;

/// Names of the capture groups a regex parser can use for fields, in order
const FIELD_GROUPS: [&str; MAX_ALLELE_FIELDS] = ["field1", "field2", "field3", "field4"];

/// The allele parser for one gene system. This is selected once when the configuration is loaded.
#[derive(Clone, Debug)]
pub enum AlleleParser {
    /// Splits on a gene delimiter and a field delimiter
    Delimited(DelimitedParser),
    /// Uses named capture groups
    Regex(RegexParser)
}

impl AlleleParser {
    /// Builds the parser described by a configuration entry
    /// # Arguments
    /// * `config` - the parser configuration
    /// # Errors
    /// * if the configuration is invalid, e.g. a bad regex or an empty gene delimiter
    pub fn from_config(config: &ParserConfig) -> Result<AlleleParser, SimpleError> {
        let parser = match config {
            ParserConfig::Delimited { gene_delimiter, field_delimiter } => {
                AlleleParser::Delimited(DelimitedParser::new(gene_delimiter, field_delimiter)?)
            },
            ParserConfig::Regex { pattern, gene_delimiter, field_delimiter } => {
                AlleleParser::Regex(RegexParser::new(pattern, gene_delimiter, field_delimiter)?)
            }
        };
        Ok(parser)
    }

    /// Parses a raw allele string into a structured allele
    /// # Arguments
    /// * `raw` - the allele string as reported by a genotyping tool
    /// # Errors
    /// * if the string cannot be parsed into a gene and 1-4 fields
    pub fn parse(&self, raw: &str) -> Result<ParsedAllele, ParseError> {
        match self {
            AlleleParser::Delimited(p) => p.parse(raw),
            AlleleParser::Regex(p) => p.parse(raw)
        }
    }

    /// Returns the (gene, field) delimiters used when formatting alleles of this system
    pub fn delimiters(&self) -> (&str, &str) {
        match self {
            AlleleParser::Delimited(p) => (&p.gene_delimiter, &p.field_delimiter),
            AlleleParser::Regex(p) => (&p.gene_delimiter, &p.field_delimiter)
        }
    }
}

/// Parser for alleles that are purely delimiter based, e.g. "A*01:02:03" with "*" and ":"
#[derive(Clone, Debug)]
pub struct DelimitedParser {
    /// separates the gene from the fields
    gene_delimiter: String,
    /// separates the fields from each other
    field_delimiter: String
}

impl DelimitedParser {
    /// Creates a new delimited parser
    /// # Errors
    /// * if the gene delimiter is empty
    pub fn new(gene_delimiter: &str, field_delimiter: &str) -> Result<DelimitedParser, SimpleError> {
        if gene_delimiter.is_empty() {
            bail!("Delimited parser requires a non-empty gene delimiter");
        }
        Ok(DelimitedParser {
            gene_delimiter: gene_delimiter.to_string(),
            field_delimiter: field_delimiter.to_string()
        })
    }

    /// Parses a raw allele string; a trailing run of letters on the last numeric field is split off as the suffix
    pub fn parse(&self, raw: &str) -> Result<ParsedAllele, ParseError> {
        let text = raw.trim();
        let parts: Vec<&str> = text.split(self.gene_delimiter.as_str()).collect();
        if parts.len() != 2 {
            return Err(ParseError::NoMatch { raw: raw.to_string() });
        }

        let gene = parts[0].to_string();
        let field_part = parts[1];
        if field_part.is_empty() {
            return Err(ParseError::EmptyAllele { raw: raw.to_string() });
        }

        let mut fields: Vec<String> = if self.field_delimiter.is_empty() {
            vec![field_part.to_string()]
        } else {
            field_part.split(self.field_delimiter.as_str()).map(String::from).collect()
        };
        if fields.len() > MAX_ALLELE_FIELDS {
            return Err(ParseError::TooManyFields { raw: raw.to_string(), count: fields.len() });
        }

        // fields is non-empty here, split() always yields at least one entry
        let last = fields.len() - 1;
        let (value, suffix) = split_suffix(&fields[last]);
        let suffix = suffix.map(String::from);
        fields[last] = value.to_string();

        ParsedAllele::new(gene, fields, suffix)
            .map_err(|_e| ParseError::EmptyAllele { raw: raw.to_string() })
    }
}

/// Splits "01N" into ("01", Some("N")); anything that is not digits followed by letters is returned unchanged.
fn split_suffix(field: &str) -> (&str, Option<&str>) {
    let digit_end = field.find(|c: char| !c.is_ascii_digit()).unwrap_or(field.len());
    if digit_end == 0 || digit_end == field.len() {
        return (field, None);
    }
    let tail = &field[digit_end..];
    if tail.chars().all(|c| c.is_ascii_alphabetic()) {
        (&field[..digit_end], Some(tail))
    } else {
        (field, None)
    }
}

/// Parser for alleles using named capture groups: `gene`, `field1`..`field4`, `suffix`, and `confidence`
#[derive(Clone, Debug)]
pub struct RegexParser {
    /// the compiled pattern
    pattern: Regex,
    /// only used for formatting output
    gene_delimiter: String,
    /// only used for formatting output
    field_delimiter: String
}

impl RegexParser {
    /// Creates a new regex parser
    /// # Errors
    /// * if the pattern does not compile
    /// * if the pattern does not contain a `field1` group
    pub fn new(pattern: &str, gene_delimiter: &str, field_delimiter: &str) -> Result<RegexParser, SimpleError> {
        let pattern = match Regex::new(pattern) {
            Ok(p) => p,
            Err(e) => bail!("Error while compiling allele pattern: {e}")
        };
        if !pattern.capture_names().flatten().any(|name| name == FIELD_GROUPS[0]) {
            bail!("Allele pattern must contain a named group \"{}\"", FIELD_GROUPS[0]);
        }
        Ok(RegexParser {
            pattern,
            gene_delimiter: gene_delimiter.to_string(),
            field_delimiter: field_delimiter.to_string()
        })
    }

    /// Parses a raw allele string; the match has to cover the whole string after trimming whitespace
    pub fn parse(&self, raw: &str) -> Result<ParsedAllele, ParseError> {
        let text = raw.trim();
        let captures = match self.pattern.captures(text) {
            Some(c) => c,
            None => return Err(ParseError::NoMatch { raw: raw.to_string() })
        };

        // group 0 is always the full match
        let full_match = captures.get(0).map(|m| m.range()).unwrap_or(0..0);
        if full_match.start != 0 || full_match.end != text.len() {
            let unparsed = format!("{}{}", &text[..full_match.start], &text[full_match.end..]);
            if full_match.start == 0 && captures.name(FIELD_GROUPS[MAX_ALLELE_FIELDS - 1]).is_some() && !self.field_delimiter.is_empty() {
                // a full set of fields followed by another delimited field
                let extra = unparsed.split(self.field_delimiter.as_str())
                    .skip(1)
                    .take_while(|f| !f.is_empty() && f.chars().all(|c| c.is_ascii_alphanumeric()))
                    .count();
                if unparsed.starts_with(self.field_delimiter.as_str()) && extra > 0 {
                    return Err(ParseError::TooManyFields { raw: raw.to_string(), count: MAX_ALLELE_FIELDS + extra });
                }
            }
            return Err(ParseError::PartialMatch { raw: raw.to_string(), unparsed });
        }

        // fields must be contiguous from field1
        let mut fields: Vec<String> = vec![];
        let mut first_missing: Option<usize> = None;
        for (i, group) in FIELD_GROUPS.iter().enumerate() {
            match captures.name(group) {
                Some(m) => {
                    if let Some(missing) = first_missing {
                        return Err(ParseError::FieldGap { raw: raw.to_string(), missing });
                    }
                    fields.push(m.as_str().to_string());
                },
                None => {
                    if first_missing.is_none() {
                        first_missing = Some(i + 1);
                    }
                }
            }
        }
        if fields.is_empty() {
            return Err(ParseError::EmptyAllele { raw: raw.to_string() });
        }

        let gene = captures.name("gene").map(|m| m.as_str().to_string()).unwrap_or_default();
        let suffix = captures.name("suffix").map(|m| m.as_str().to_string());
        let confidence = match captures.name("confidence") {
            Some(m) => match m.as_str().trim().parse::<f64>() {
                Ok(c) => Some(c),
                Err(_) => return Err(ParseError::InvalidConfidence { raw: raw.to_string(), confidence: m.as_str().to_string() })
            },
            None => None
        };

        let allele = ParsedAllele::new(gene, fields, suffix)
            .map_err(|_e| ParseError::EmptyAllele { raw: raw.to_string() })?;
        Ok(allele.with_confidence(confidence))
    }
}
