/// the main CLI module
pub mod core;
/// the consensus CLI subcommand for resolving genotypes
pub mod consensus;
/// the report-stat CLI subcommand for summarizing reports
pub mod report_stat;
