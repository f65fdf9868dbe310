
use clap::{Parser, Subcommand};
use chrono::Datelike;
use lazy_static::lazy_static;
use log::error;
use simple_error::bail;
use std::path::Path;

use crate::cli::consensus::ConsensusSettings;
use crate::cli::report_stat::ReportStatSettings;

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.3.0-6bb9635-dirty` - while on a dirty branch
    /// * `0.3.0-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));

    /// Shared after help string containing the legalese.
    pub static ref AFTER_HELP: String = format!("Copyright (C) 2023-{}     allele-consensus contributors
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year());
}

#[derive(Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about,
    after_help = &**AFTER_HELP)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

/// allele-consensus, a tool for merging HLA and KIR genotype calls from multiple typing tools.
/// Select a subcommand to see more usage information:
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a consensus genotype for every sample and gene
    Consensus(Box<ConsensusSettings>),
    /// Generate statistics about a set of genotyping reports
    ReportStat(Box<ReportStatSettings>),
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_required_filename(filename: &Path, label: &str) {
    if !filename.exists() {
        error!("{} does not exist: \"{}\"", label, filename.display());
        std::process::exit(exitcode::NOINPUT);
    }
}

/// Checks if an optional file exists and will otherwise exit
/// # Arguments
/// * `opt_filename` - the file path to check for, if provided
/// * `label` - the label to use for error messages
pub fn check_optional_filename(opt_filename: Option<&Path>, label: &str) {
    if let Some(filename) = opt_filename {
        check_required_filename(filename, label);
    }
}

/// Makes sure an output file will not overwrite anything
/// # Arguments
/// * `opt_filename` - the output path, if provided
/// * `label` - the label to use for error messages
/// # Errors
/// * if the file already exists
pub fn check_output_filename(opt_filename: Option<&Path>, label: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(filename) = opt_filename {
        if filename.exists() {
            bail!("{} already exists, refusing to overwrite: \"{}\"", label, filename.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_output_filename() {
        let temp_dir = tempfile::tempdir().unwrap();
        let existing = temp_dir.path().join("existing.json");
        std::fs::write(&existing, "{}").unwrap();

        assert!(check_output_filename(None, "Output").is_ok());
        assert!(check_output_filename(Some(&temp_dir.path().join("new.json")), "Output").is_ok());
        assert!(check_output_filename(Some(&existing), "Output").is_err());
    }
}
