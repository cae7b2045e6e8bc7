use super::DocumentText;
use crate::error::LoadError;
use csv::ReaderBuilder;

/// Turns CSV bytes into one line per data row, e.g. `name: Alice, age: 30`.
/// Rows keep their file order; nothing is deduplicated or validated against a schema.
pub fn load_csv(bytes: &[u8]) -> Result<DocumentText, LoadError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| LoadError::MalformedInput(format!("Failed to read CSV header: {}", e)))?
        .clone();
    if headers.is_empty() {
        return Err(LoadError::MalformedInput("CSV file is empty".to_string()));
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            LoadError::MalformedInput(format!("Failed to parse CSV row {}: {}", index + 1, e))
        })?;

        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| format!("{}: {}", collapse(header), collapse(value)))
            .collect::<Vec<_>>()
            .join(", ");
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(LoadError::MalformedInput(
            "CSV file has a header but no rows".to_string(),
        ));
    }

    Ok(DocumentText::from_units(rows))
}

// Quoted fields may span lines; keep each row on one line.
fn collapse(field: &str) -> String {
    field.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadErrorKind;

    #[test]
    fn test_one_unit_per_row_in_order() {
        let csv = b"name,age\nAlice,30\nBob,25\nCarol,41\n";
        let text = load_csv(csv).unwrap();

        assert_eq!(text.unit_count(), 3);
        let lines: Vec<_> = text.as_str().lines().collect();
        assert_eq!(
            lines,
            vec!["name: Alice, age: 30", "name: Bob, age: 25", "name: Carol, age: 41"]
        );
    }

    #[test]
    fn test_duplicate_rows_are_kept() {
        let text = load_csv(b"city\nParis\nParis\n").unwrap();
        assert_eq!(text.as_str(), "city: Paris\ncity: Paris");
    }

    #[test]
    fn test_multiline_field_stays_on_one_line() {
        let text = load_csv(b"note\n\"first line\nsecond line\"\n").unwrap();
        assert_eq!(text.as_str(), "note: first line second line");
        assert_eq!(text.unit_count(), 1);
    }

    #[test]
    fn test_ragged_rows_are_malformed() {
        let err = load_csv(b"a,b\n1,2\n3\n").unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::MalformedInput);
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let err = load_csv(b"name\n\xff\xfe\xfd\n").unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::MalformedInput);
    }

    #[test]
    fn test_empty_input_is_malformed() {
        assert_eq!(load_csv(b"").unwrap_err().kind(), LoadErrorKind::MalformedInput);
        assert_eq!(load_csv(b"only,header\n").unwrap_err().kind(), LoadErrorKind::MalformedInput);
    }
}
