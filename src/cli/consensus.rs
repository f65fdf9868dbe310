
use clap::Args;
use log::{debug, info};
use simple_error::bail;
use std::path::PathBuf;

use crate::cli::core::{AFTER_HELP, check_optional_filename, check_output_filename, check_required_filename};
use crate::consensus::config::{ConsensusConfig, DivergenceRule, TieBreak, DEFAULT_THRESHOLD};
use crate::consensus::errors::ConsensusError;
use crate::data_types::parsed_allele::MAX_ALLELE_FIELDS;

#[derive(Args, Clone)]
#[clap(author, about,
    after_help = &**AFTER_HELP)]
pub struct ConsensusSettings {
    /// Input genotyping report file (JSON), can be specified multiple times
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "report")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub report_filenames: Vec<PathBuf>,

    /// Optional parser configuration file (JSON) that adds to or replaces the built-in parsers
    #[clap(long = "parser-config")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub parser_config: Option<PathBuf>,

    /// Output consensus call file (JSON)
    #[clap(short = 'o')]
    #[clap(long = "output-json")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_json: Option<PathBuf>,

    /// Output allele table with two columns per gene (TSV)
    #[clap(long = "output-table")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_table: Option<PathBuf>,

    /// Optional output debug folder
    #[clap(long = "output-debug")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub debug_folder: Option<PathBuf>,

    /// The parser used for the allele names, either built-in (hla, kir, delimited) or from --parser-config
    #[clap(short = 'g')]
    #[clap(long = "gene-system")]
    #[clap(value_name = "NAME")]
    #[clap(default_value = "hla")]
    #[clap(help_heading = Some("Parsing"))]
    pub gene_system: String,

    /// The minimum fraction of tools that must agree on each field of an allele
    #[clap(long = "threshold")]
    #[clap(value_name = "FLOAT")]
    #[clap(default_value_t = DEFAULT_THRESHOLD)]
    #[clap(help_heading = Some("Consensus"))]
    pub threshold: f64,

    /// Truncates every call to this many fields before voting
    #[clap(long = "max-resolution")]
    #[clap(value_name = "FIELDS")]
    #[clap(help_heading = Some("Consensus"))]
    pub max_resolution: Option<usize>,

    /// How ties in tool support are broken
    #[clap(long = "tie-break")]
    #[clap(value_enum)]
    #[clap(default_value_t = TieBreak::TerminalFirst)]
    #[clap(help_heading = Some("Consensus"))]
    pub tie_break: TieBreak,

    /// Where the second allele may branch away from the first
    #[clap(long = "divergence")]
    #[clap(value_enum)]
    #[clap(default_value_t = DivergenceRule::FullSupportPrefix)]
    #[clap(help_heading = Some("Consensus"))]
    pub divergence: DivergenceRule,

    /// Number of threads to use for resolving groups.
    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    pub threads: usize,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl ConsensusSettings {
    /// Converts the CLI settings into the engine configuration
    /// # Errors
    /// * if the threshold or max resolution are out of range
    pub fn consensus_config(&self) -> Result<ConsensusConfig, ConsensusError> {
        let config = ConsensusConfig::new(self.threshold)?
            .with_tie_break(self.tie_break)
            .with_divergence(self.divergence)
            .with_max_resolution(self.max_resolution)?
            .with_retain_tries(self.debug_folder.is_some());
        Ok(config)
    }
}

pub fn check_consensus_settings(mut settings: ConsensusSettings) -> Result<ConsensusSettings, Box<dyn std::error::Error>> {
    info!("Inputs:");

    // check for all the required input files
    for report_fn in settings.report_filenames.iter() {
        check_required_filename(report_fn, "Genotyping report");
        info!("\tReport: {report_fn:?}");
    }
    check_optional_filename(settings.parser_config.as_deref(), "Parser config");
    if let Some(pc) = settings.parser_config.as_ref() {
        info!("\tParser config: {pc:?}");
    }

    // outputs
    if settings.output_json.is_none() && settings.output_table.is_none() {
        bail!("Must provide --output-json and/or --output-table.");
    }
    check_output_filename(settings.output_json.as_deref(), "Output JSON")?;
    check_output_filename(settings.output_table.as_deref(), "Output table")?;

    info!("Outputs:");
    if let Some(filename) = settings.output_json.as_ref() {
        info!("\tConsensus calls: {filename:?}");
    }
    if let Some(filename) = settings.output_table.as_ref() {
        info!("\tAllele table: {filename:?}");
    }
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        debug!("\tDebug folder: {debug_folder:?}");
    }

    info!("Consensus settings:");
    info!("\tGene system: {}", settings.gene_system);
    if !(0.0..=1.0).contains(&settings.threshold) {
        bail!("--threshold must be between 0.0 and 1.0");
    }
    info!("\tThreshold: {}", settings.threshold);

    if let Some(max_resolution) = settings.max_resolution {
        if max_resolution == 0 || max_resolution > MAX_ALLELE_FIELDS {
            bail!("--max-resolution must be between 1 and {MAX_ALLELE_FIELDS}");
        }
        info!("\tMax resolution: {max_resolution} fields");
    }
    info!("\tTie-break: {}", settings.tie_break);
    info!("\tDivergence: {}", settings.divergence);

    if settings.threads == 0 {
        settings.threads = 1;
    }
    info!("\tThreads: {}", settings.threads);

    Ok(settings)
}
