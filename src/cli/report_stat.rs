
use clap::Args;
use log::info;
use std::path::PathBuf;

use crate::cli::core::{check_optional_filename, check_required_filename, AFTER_HELP};

#[derive(Clone, Args)]
#[clap(author, about,
    after_help = &**AFTER_HELP)]
pub struct ReportStatSettings {
    /// Input genotyping report file (JSON), can be specified multiple times
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "report")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub report_filenames: Vec<PathBuf>,

    /// Optional parser configuration file (JSON)
    #[clap(long = "parser-config")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub parser_config: Option<PathBuf>,

    /// The parser used for the allele names
    #[clap(short = 'g')]
    #[clap(long = "gene-system")]
    #[clap(value_name = "NAME")]
    #[clap(default_value = "hla")]
    #[clap(help_heading = Some("Parsing"))]
    pub gene_system: String,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_report_stat_settings(settings: ReportStatSettings) -> ReportStatSettings {
    // dump stuff to the logger
    for report_fn in settings.report_filenames.iter() {
        check_required_filename(report_fn, "Genotyping report");
        info!("Input report: {report_fn:?}");
    }
    check_optional_filename(settings.parser_config.as_deref(), "Parser config");
    info!("Gene system: {}", settings.gene_system);

    settings
}
