use crate::core::MatchResult;
use crate::utils::error::Result;

pub const RESULT_HEADER: [&str; 2] = ["isbn", "match"];
const QUOTE: u8 = b'\'';

/// Renders results as `isbn,match` CSV, quoting with `'`.
pub fn write_results(results: &[MatchResult]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .quote(QUOTE)
        .has_headers(false)
        .from_writer(Vec::new());

    // 沒有資料時仍輸出標題列
    writer.write_record(RESULT_HEADER)?;
    for result in results {
        writer.serialize(result)?;
    }

    writer
        .into_inner()
        .map_err(|e| crate::utils::error::CheckError::IoError(e.into_error()))
}

/// Parses a file produced by [`write_results`].
pub fn read_results(data: &[u8]) -> Result<Vec<MatchResult>> {
    let mut reader = csv::ReaderBuilder::new()
        .quote(QUOTE)
        .trim(csv::Trim::All)
        .from_reader(data);

    reader
        .deserialize::<MatchResult>()
        .map(|row| row.map_err(Into::into))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_rows() {
        let results = vec![
            MatchResult::new("9785990589834", true),
            MatchResult::new("0123456789", false),
        ];
        let csv = String::from_utf8(write_results(&results).unwrap()).unwrap();
        assert_eq!(csv, "isbn,match\n9785990589834,true\n0123456789,false\n");
    }

    #[test]
    fn test_empty_results_still_have_header() {
        let csv = String::from_utf8(write_results(&[]).unwrap()).unwrap();
        assert_eq!(csv, "isbn,match\n");
        assert!(read_results(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_single_result() {
        let results = vec![MatchResult::new("9781781792834", true)];
        let data = write_results(&results).unwrap();
        assert_eq!(read_results(&data).unwrap(), results);
    }

    #[test]
    fn test_fields_needing_quotes_use_single_quote() {
        let results = vec![MatchResult::new("12,34", false)];
        let data = write_results(&results).unwrap();
        let csv = String::from_utf8(data.clone()).unwrap();
        assert_eq!(csv, "isbn,match\n'12,34',false\n");
        assert_eq!(read_results(&data).unwrap(), results);
    }

    #[test]
    fn test_read_rejects_non_boolean_match() {
        let data = b"isbn,match\n9781781792834,maybe\n";
        assert!(read_results(data).is_err());
    }
}
