
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use crate::data_types::consensus_genotype::{ConsensusGenotype, EMPTY_SLOT};

/// Saves genotypes as a wide allele table: one row per sample, two columns per gene ("A", "A.1").
/// Samples and genes are sorted; any slot without a call is written as "NA".
/// # Arguments
/// * `genotypes` - the genotypes to write, in any order
/// * `gene_delimiter` - the delimiter between gene and fields in the allele names
/// * `field_delimiter` - the delimiter between fields in the allele names
/// * `filename` - the output filename, TSV
/// # Errors
/// * if we have any errors opening or writing to the file
pub fn save_allele_table(genotypes: &[ConsensusGenotype], gene_delimiter: &str, field_delimiter: &str, filename: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let genes: Vec<&str> = genotypes.iter()
        .map(|g| g.gene())
        .sorted()
        .dedup()
        .collect();

    let mut sample_rows: BTreeMap<&str, BTreeMap<&str, [String; 2]>> = BTreeMap::new();
    for genotype in genotypes.iter() {
        sample_rows.entry(genotype.sample_id())
            .or_default()
            .insert(genotype.gene(), genotype.formatted_slots(gene_delimiter, field_delimiter));
    }

    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(filename)?;

    let header: Vec<String> = std::iter::once("sample".to_string())
        .chain(genes.iter().flat_map(|gene| [gene.to_string(), format!("{gene}.1")]))
        .collect();
    csv_writer.write_record(&header)?;

    for (sample_id, gene_slots) in sample_rows.iter() {
        let mut row: Vec<&str> = Vec::with_capacity(header.len());
        row.push(sample_id);
        for gene in genes.iter() {
            match gene_slots.get(gene) {
                Some([hap1, hap2]) => {
                    row.push(hap1);
                    row.push(hap2);
                },
                None => {
                    row.push(EMPTY_SLOT);
                    row.push(EMPTY_SLOT);
                }
            };
        }
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
