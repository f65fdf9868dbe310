
/// Settings and policies for consensus resolution
pub mod config;
/// The orchestrator that resolves every (sample, gene) group
pub mod engine;
/// Errors produced during consensus
pub mod errors;
/// Selects up to two alleles from a merged trie
pub mod resolver;
