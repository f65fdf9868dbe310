use serde::Serialize;

/// Errors that can be produced while parsing a single allele call; the call is dropped but the run continues
#[derive(thiserror::Error, Clone, Debug, PartialEq, Serialize)]
pub enum ParseError {
    #[error("no allele name found in \"{raw}\"")]
    NoMatch { raw: String },
    #[error("allele \"{raw}\" does not contain any field values")]
    EmptyAllele { raw: String },
    #[error("allele \"{raw}\" contains unparsed text \"{unparsed}\"")]
    PartialMatch { raw: String, unparsed: String },
    #[error("allele \"{raw}\" has {count} fields, expected at most 4")]
    TooManyFields { raw: String, count: usize },
    #[error("allele \"{raw}\" is missing field{missing} but reports a later field")]
    FieldGap { raw: String, missing: usize },
    #[error("unable to parse confidence \"{confidence}\" from \"{raw}\"")]
    InvalidConfidence { raw: String, confidence: String },
    #[error("allele \"{raw}\" belongs to gene {found}, but was reported for gene {expected}")]
    GeneMismatch { raw: String, expected: String, found: String }
}
