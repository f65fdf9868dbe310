
/// Contains all the CLI related functionality
pub mod cli;
/// Contains the consensus resolver and the engine that runs it over many samples and genes
pub mod consensus;
/// Contains any specialized data types that are shared across the tooling
pub mod data_types;
/// Contains the allele name parsers and their configuration
pub mod parser;
/// Contains functionality for displaying report statistics
pub mod report_stat;
/// Contains the allele tries and the merging of tries across tools
pub mod trie;
/// Contains generic utilities that are handy wrappers
pub mod util;
