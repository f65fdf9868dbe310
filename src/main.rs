
use log::{LevelFilter, error, info, warn};
use std::path::Path;

use allele_consensus::cli::consensus::{ConsensusSettings, check_consensus_settings};
use allele_consensus::cli::core::{Commands, get_cli};
use allele_consensus::cli::report_stat::{ReportStatSettings, check_report_stat_settings};
use allele_consensus::consensus::config::ConsensusConfig;
use allele_consensus::consensus::engine::{ConsensusEngine, EngineResults};
use allele_consensus::data_types::consensus_json::ConsensusJson;
use allele_consensus::data_types::genotyping_report::load_raw_reports;
use allele_consensus::data_types::tool_report::RawToolReport;
use allele_consensus::parser::AlleleParser;
use allele_consensus::parser::parser_config::ParserConfigSet;
use allele_consensus::util::allele_table::save_allele_table;
use allele_consensus::util::file_io::save_json;

/// Sets up the logger, must be called once before anything gets logged
/// # Arguments
/// * `verbosity` - the count of `-v` flags
fn init_logging(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };

    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();
}

/// Loads the parser and all the reports, shared by both subcommands
/// # Arguments
/// * `parser_config` - optional user parser config file
/// * `gene_system` - the parser to use
/// * `report_filenames` - the reports to load
fn load_inputs(parser_config: Option<&Path>, gene_system: &str, report_filenames: &[std::path::PathBuf]) -> (AlleleParser, Vec<RawToolReport>) {
    let parser_set: ParserConfigSet = match ParserConfigSet::load(parser_config) {
        Ok(ps) => ps,
        Err(e) => {
            error!("Error while loading parser config: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };
    let parser: AlleleParser = match parser_set.build_parser(gene_system) {
        Ok(p) => p,
        Err(e) => {
            error!("Error while building allele parser: {e}");
            std::process::exit(exitcode::USAGE);
        }
    };

    info!("Loading {} genotyping reports...", report_filenames.len());
    let raw_reports: Vec<RawToolReport> = match load_raw_reports(report_filenames) {
        Ok(rr) => rr,
        Err(e) => {
            error!("Error while loading genotyping reports: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };
    info!("Loaded {} tool reports.", raw_reports.len());
    (parser, raw_reports)
}

/// This will run the "consensus" mode of the tool
/// # Arguments
/// * `settings` - the ConsensusSettings object
fn run_consensus(settings: ConsensusSettings) {
    // immediately setup logging first
    init_logging(settings.verbosity);

    // okay, now we can check all the other settings
    let cli_settings: ConsensusSettings = match check_consensus_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while processing CLI settings: {e}");
            std::process::exit(exitcode::USAGE);
        }
    };

    let config: ConsensusConfig = match cli_settings.consensus_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Error while processing consensus settings: {e}");
            std::process::exit(exitcode::USAGE);
        }
    };

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(cli_settings.threads)
        .build_global() {
        error!("Error while configuring thread pool: {e}");
        std::process::exit(exitcode::OSERR);
    }

    // create a debug folder if specified
    if let Some(debug_folder) = cli_settings.debug_folder.as_ref() {
        info!("Creating debug folder at {debug_folder:?}...");
        match std::fs::create_dir_all(debug_folder) {
            Ok(()) => {},
            Err(e) => {
                error!("Error while creating debug folder: {e}");
                std::process::exit(exitcode::IOERR);
            }
        }
    }

    let (parser, raw_reports) = load_inputs(
        cli_settings.parser_config.as_deref(),
        &cli_settings.gene_system,
        &cli_settings.report_filenames
    );

    // all the work
    let engine: ConsensusEngine = match ConsensusEngine::new(config.clone()) {
        Ok(e) => e,
        Err(e) => {
            error!("Error while creating consensus engine: {e}");
            std::process::exit(exitcode::USAGE);
        }
    };
    let results: EngineResults = engine.run_raw(&raw_reports, &parser);

    info!("Consensus results:");
    for (status, count) in results.status_counts().iter() {
        info!("\t{status}: {count}");
    }
    if !results.failed_groups().is_empty() {
        warn!("\tFAILED: {}", results.failed_groups().len());
    }

    if let Some(filename) = cli_settings.output_json.as_ref() {
        let consensus_json: ConsensusJson = match ConsensusJson::from_results(cli_settings.gene_system.clone(), config, &results) {
            Ok(cj) => cj,
            Err(e) => {
                error!("Error while collecting consensus calls: {e}");
                std::process::exit(exitcode::DATAERR);
            }
        };

        info!("Saving consensus calls for {} samples to {filename:?}", consensus_json.genotypes().len());
        if let Err(e) = save_json(&consensus_json, filename) {
            error!("Error while writing consensus calls to file: {e}");
            std::process::exit(exitcode::IOERR);
        }
    }

    if let Some(filename) = cli_settings.output_table.as_ref() {
        info!("Saving allele table to {filename:?}");
        let (gene_delimiter, field_delimiter) = parser.delimiters();
        if let Err(e) = save_allele_table(results.genotypes(), gene_delimiter, field_delimiter, filename) {
            error!("Error while writing allele table to file: {e}");
            std::process::exit(exitcode::IOERR);
        }
    }

    if let Some(debug_folder) = cli_settings.debug_folder.as_ref() {
        let trie_filename = debug_folder.join("merged_tries.json");
        info!("Saving merged tries to {trie_filename:?}");
        if let Err(e) = save_json(&results.merged_tries(), &trie_filename) {
            error!("Error while writing merged tries to file: {e}");
            std::process::exit(exitcode::IOERR);
        }
    }
}

/// This will run the "report-stat" mode of the tool
/// # Arguments
/// * `settings` - the ReportStatSettings object
fn run_report_stat(settings: ReportStatSettings) {
    // immediately setup logging first
    init_logging(settings.verbosity);

    // okay, now we can check all the other settings
    let cli_settings: ReportStatSettings = check_report_stat_settings(settings);

    let (parser, raw_reports) = load_inputs(
        cli_settings.parser_config.as_deref(),
        &cli_settings.gene_system,
        &cli_settings.report_filenames
    );

    // display the report statistics
    allele_consensus::report_stat::print_stats(&raw_reports, &parser);
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Consensus(settings) => {
            run_consensus(*settings);
        },
        Commands::ReportStat(settings) => {
            run_report_stat(*settings);
        }
    }

    info!("Process finished successfully.");
}
