
use std::io::{BufWriter, Write};
use std::fs::File;
use std::path::Path;

/// Helper function that loads a file into some type, helpful generic.
/// Files ending in ".gz" are transparently decompressed.
/// # Arguments
/// * `filename` - the file path to open and parse
/// # Errors
/// * if the file does not open properly
/// * if the deserialization throws errors
pub fn load_json<T: serde::de::DeserializeOwned>(filename: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let fp: Box<dyn std::io::Read> = if filename.extension().unwrap_or_default() == "gz" {
        Box::new(
            flate2::read::MultiGzDecoder::new(
                File::open(filename)?
            )
        )
    } else {
        Box::new(File::open(filename)?)
    };
    let result: T = serde_json::from_reader(fp)?;
    Ok(result)
}

/// This will save a generic serializable struct to JSON, gzipped if the filename ends in ".gz".
/// # Arguments
/// * `data` - the data in memory
/// * `out_filename` - user provided path to write to
/// # Errors
/// * if opening or writing to the file throw errors
/// * if JSON serialization throws errors
pub fn save_json<T: serde::Serialize>(data: &T, out_filename: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file: Box<dyn std::io::Write> = if out_filename.extension().unwrap_or_default() == "gz" {
        Box::new(
            flate2::write::GzEncoder::new(
                File::create(out_filename)?,
                flate2::Compression::best()
            )
        )
    } else {
        Box::new(File::create(out_filename)?)
    };
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    #[test]
    fn test_gz_json() {
        let data: BTreeMap<String, Vec<String>> = BTreeMap::from([
            ("A".to_string(), vec!["A*01:01".to_string(), "A*02:01".to_string()])
        ]);

        let temp_dir = tempfile::tempdir().unwrap();
        for name in ["data.json", "data.json.gz"] {
            let filename = temp_dir.path().join(name);
            save_json(&data, &filename).unwrap();
            let reloaded: BTreeMap<String, Vec<String>> = load_json(&filename).unwrap();
            assert_eq!(reloaded, data);
        }
    }

    #[test]
    fn test_missing_file() {
        let result: Result<BTreeMap<String, String>, _> = load_json(Path::new("test_data/does_not_exist.json"));
        assert!(result.is_err());
    }
}
