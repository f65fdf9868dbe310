
use log::debug;
use serde::{Deserialize, Serialize};
use simple_error::{bail, SimpleError};
use std::collections::BTreeMap;
use std::path::Path;

use crate::parser::AlleleParser;
use crate::util::file_io::load_json;

/// Default pattern for HLA: optional "HLA-" prefix, optional gene, 1-4 fields, optional expression suffix and confidence
pub const DEFAULT_HLA_PATTERN: &str = r"(?:HLA-)?(?:(?P<gene>[A-Z][A-Z0-9]*)\*)?(?P<field1>\d{2,3})(?::(?P<field2>\d{2,3}))?(?::(?P<field3>\d{2,3}))?(?::(?P<field4>\d{2,3}))?(?P<suffix>[NLSCAQ])?(?:\s*\((?P<confidence>[^)]*)\))?";
/// Default pattern for KIR: fields are not delimited, first is 3 digits and the rest are 2 digits
pub const DEFAULT_KIR_PATTERN: &str = r"(?P<gene>KIR[0-9A-Z]+)\*(?P<field1>\d{3})(?P<field2>\d{2})?(?P<field3>\d{2})?(?P<field4>\d{2})?(?P<suffix>[NLSCAQ])?";

/// Configuration for a single allele parser; tagged by "type" in JSON
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParserConfig {
    /// e.g. `{"type": "delimited", "gene_delimiter": "*", "field_delimiter": ":"}`
    Delimited {
        gene_delimiter: String,
        field_delimiter: String
    },
    /// e.g. `{"type": "regex", "pattern": "(?P<gene>\\w+)\\*(?P<field1>\\d{2})"}`
    Regex {
        pattern: String,
        #[serde(default = "ParserConfig::default_gene_delimiter")]
        gene_delimiter: String,
        #[serde(default = "ParserConfig::default_field_delimiter")]
        field_delimiter: String
    }
}

impl ParserConfig {
    fn default_gene_delimiter() -> String {
        "*".to_string()
    }

    fn default_field_delimiter() -> String {
        ":".to_string()
    }
}

/// The full set of named parser configurations, e.g. "hla" and "kir"
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParserConfigSet {
    /// parser name -> configuration
    parsers: BTreeMap<String, ParserConfig>
}

impl ParserConfigSet {
    /// Loads the built-in configurations and applies any overrides from a user JSON file.
    /// Entries in the user file replace built-in entries with the same name.
    /// # Arguments
    /// * `opt_filename` - optional JSON file with a map of parser name -> configuration
    /// # Errors
    /// * if the file cannot be loaded or deserialized
    pub fn load(opt_filename: Option<&Path>) -> Result<ParserConfigSet, Box<dyn std::error::Error>> {
        let mut config_set = ParserConfigSet::default();
        if let Some(filename) = opt_filename {
            let overrides: ParserConfigSet = load_json(filename)?;
            for (name, config) in overrides.parsers.into_iter() {
                debug!("Parser configuration for \"{name}\" loaded from {filename:?}");
                config_set.parsers.insert(name, config);
            }
        }
        Ok(config_set)
    }

    /// Builds the parser for a given gene system
    /// # Arguments
    /// * `name` - the name of the parser configuration, e.g. "hla"
    /// # Errors
    /// * if the name is not in the configuration set
    /// * if the configuration is invalid
    pub fn build_parser(&self, name: &str) -> Result<AlleleParser, SimpleError> {
        let config = match self.parsers.get(name) {
            Some(c) => c,
            None => bail!("Gene system \"{name}\" not found in allele parser configuration, options: {:?}", self.parsers.keys().collect::<Vec<_>>())
        };
        AlleleParser::from_config(config)
    }

    pub fn parsers(&self) -> &BTreeMap<String, ParserConfig> {
        &self.parsers
    }
}

impl Default for ParserConfigSet {
    fn default() -> Self {
        let mut parsers: BTreeMap<String, ParserConfig> = Default::default();
        parsers.insert("hla".to_string(), ParserConfig::Regex {
            pattern: DEFAULT_HLA_PATTERN.to_string(),
            gene_delimiter: "*".to_string(),
            field_delimiter: ":".to_string()
        });
        parsers.insert("kir".to_string(), ParserConfig::Regex {
            pattern: DEFAULT_KIR_PATTERN.to_string(),
            gene_delimiter: "*".to_string(),
            field_delimiter: "".to_string()
        });
        parsers.insert("delimited".to_string(), ParserConfig::Delimited {
            gene_delimiter: "*".to_string(),
            field_delimiter: ":".to_string()
        });
        Self { parsers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    #[test]
    fn test_default_configs() {
        let config_set = ParserConfigSet::default();
        for name in ["hla", "kir", "delimited"] {
            assert!(config_set.build_parser(name).is_ok());
        }
        assert!(config_set.build_parser("nope").is_err());
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{
            "custom": {"type": "delimited", "gene_delimiter": "_", "field_delimiter": "."},
            "simple": {"type": "regex", "pattern": "(?P<gene>\\w+)\\*(?P<field1>\\d{2})"}
        }"#;
        let config_set: ParserConfigSet = serde_json::from_str(json).unwrap();
        assert_eq!(config_set.parsers().get("custom").unwrap(), &ParserConfig::Delimited {
            gene_delimiter: "_".to_string(),
            field_delimiter: ".".to_string()
        });
        // delimiters default for the regex parser
        assert_eq!(config_set.parsers().get("simple").unwrap(), &ParserConfig::Regex {
            pattern: r"(?P<gene>\w+)\*(?P<field1>\d{2})".to_string(),
            gene_delimiter: "*".to_string(),
            field_delimiter: ":".to_string()
        });

        let parser = config_set.build_parser("custom").unwrap();
        assert_eq!(parser.parse("A_01.02").unwrap().fields(), &["01", "02"]);
    }

    #[test]
    fn test_bad_type() {
        let json = r#"{"custom": {"type": "magic", "gene_delimiter": "_"}}"#;
        let result: Result<ParserConfigSet, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_overrides() {
        let filename = PathBuf::from("test_data/parser_configs/override.json");
        let config_set = ParserConfigSet::load(Some(&filename)).unwrap();

        // hla was replaced with a delimited parser, kir is untouched
        assert!(matches!(config_set.parsers().get("hla").unwrap(), ParserConfig::Delimited { .. }));
        assert!(matches!(config_set.parsers().get("kir").unwrap(), ParserConfig::Regex { .. }));
        assert!(config_set.parsers().contains_key("mhc_underscore"));

        let parser = config_set.build_parser("mhc_underscore").unwrap();
        let allele = parser.parse("DLA-88_001.01").unwrap();
        assert_eq!(allele.gene(), "DLA-88");
        assert_eq!(allele.fields(), &["001", "01"]);
    }

    #[test]
    fn test_load_missing_file() {
        let filename = PathBuf::from("test_data/parser_configs/does_not_exist.json");
        assert!(ParserConfigSet::load(Some(&filename)).is_err());
    }
}
