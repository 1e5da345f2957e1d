//! Barcode numbers embedded in file names
//!
//! Demultiplexed outputs carry a numeric suffix before the extension
//! (`sample-12.bam`). The number is matched against the trailing digits of
//! the sample names in the primers report to recover the primer name.

use std::collections::BTreeMap;

/// Numeric suffix of a file name, if any
///
/// `.gz` is ignored so compressed outputs resolve like their originals.
///
/// # Examples
///
/// ```
/// use seqferry::core::metadata::barcode_number;
///
/// assert_eq!(barcode_number("scisoseq-12.bam"), Some(12));
/// assert_eq!(barcode_number("reads-7.fasta.gz"), Some(7));
/// assert_eq!(barcode_number("reads.bam"), None);
/// ```
pub fn barcode_number(file_name: &str) -> Option<u32> {
    let name = file_name.strip_suffix(".gz").unwrap_or(file_name);
    let (stem, _extension) = name.rsplit_once('.')?;
    let (_, digits) = stem.rsplit_once('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Primer name for the barcode number in `file_name`
///
/// Returns `None` when the name carries no number or no sample in the
/// table ends with that number.
pub fn primer_for<'a>(file_name: &str, primers: &'a BTreeMap<String, String>) -> Option<&'a str> {
    let number = barcode_number(file_name)?;
    primers
        .iter()
        .find(|(sample, _)| trailing_number(sample) == Some(number))
        .map(|(_, primer)| primer.as_str())
}

fn trailing_number(name: &str) -> Option<u32> {
    let start = name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    name[start..].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("sample-12.bam", Some(12) ; "plain")]
    #[test_case("0000021.m84047.sample-003.bam", Some(3) ; "prefixed and padded")]
    #[test_case("reads-7.fasta.gz", Some(7) ; "compressed")]
    #[test_case("reads-x7.bam", None ; "not numeric")]
    #[test_case("reads-.bam", None ; "empty suffix")]
    #[test_case("reads-12", None ; "no extension")]
    fn test_barcode_number(name: &str, expected: Option<u32>) {
        assert_eq!(barcode_number(name), expected);
    }

    #[test]
    fn test_primer_for() {
        let mut primers = BTreeMap::new();
        primers.insert("Sample 1".to_string(), "bc1001_5p--bc1001_3p".to_string());
        primers.insert("Sample12".to_string(), "bc1012_5p--bc1012_3p".to_string());

        assert_eq!(primer_for("cells-12.bam", &primers), Some("bc1012_5p--bc1012_3p"));
        assert_eq!(primer_for("cells-01.bam", &primers), Some("bc1001_5p--bc1001_3p"));
        assert_eq!(primer_for("cells-5.bam", &primers), None);
        assert_eq!(primer_for("cells.bam", &primers), None);
    }
}
