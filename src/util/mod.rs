/// Writes genotypes as a wide, tab-delimited allele table
pub mod allele_table;
/// Generic functionality for reading/writing serializable object to file
pub mod file_io;
