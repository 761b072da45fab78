//! CSV source with encoding and delimiter handling.
//!
//! Decodes raw bytes, reads the header row, then yields data rows one at a
//! time. Each row's value count is checked against the header; a mismatch
//! reports the physical line number. Values are never trimmed or rewritten.

use std::io::Cursor;

use crate::error::{ConfigError, CsvError, CsvResult, SourceError};
use crate::models::{HeaderSet, Record};

/// Separators tried by [`detect_delimiter`].
const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

const UTF8_BOM: char = '\u{feff}';

/// How to read the source.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub delimiter: char,
    /// Count separators in the header line instead of using `delimiter`.
    pub detect_delimiter: bool,
    /// Forced encoding; auto-detected when `None`.
    pub encoding: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            detect_delimiter: false,
            encoding: None,
        }
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    normalize_encoding_name(&result.0).unwrap_or(result.0)
}

/// Canonical name for a supported encoding label.
fn normalize_encoding_name(label: &str) -> Option<String> {
    let name = match label.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8",
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1",
        "windows-1252" | "cp1252" => "windows-1252",
        _ => return None,
    };
    Some(name.to_string())
}

/// Check a user-supplied encoding name.
pub fn resolve_encoding(label: &str) -> Result<String, ConfigError> {
    normalize_encoding_name(label).ok_or_else(|| ConfigError::UnknownEncoding(label.to_string()))
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown encodings fall back to lossy UTF-8. A leading byte-order mark is
/// dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => match String::from_utf8(bytes.to_vec()) {
            Ok(s) => s,
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
    };
    match decoded.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Falls back to `,` when no candidate appears.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &CANDIDATE_DELIMITERS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Delimiter as the single byte the csv crate expects.
pub fn delimiter_byte(delimiter: char) -> Result<u8, ConfigError> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(ConfigError::InvalidDelimiter(delimiter))
    }
}

/// An opened CSV source positioned after the header row.
pub struct CsvSource {
    headers: HeaderSet,
    encoding: String,
    delimiter: char,
    reader: csv::Reader<Cursor<Vec<u8>>>,
}

impl std::fmt::Debug for CsvSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvSource")
            .field("headers", &self.headers)
            .field("encoding", &self.encoding)
            .field("delimiter", &self.delimiter)
            .finish_non_exhaustive()
    }
}

impl CsvSource {
    /// Decode `bytes` and read the header row.
    ///
    /// Fails with [`CsvError::EmptyFile`] on zero bytes and
    /// [`CsvError::NoHeaders`] when no record can be read at all.
    pub fn from_bytes(bytes: &[u8], options: &ParseOptions) -> Result<Self, SourceError> {
        if bytes.is_empty() {
            return Err(CsvError::EmptyFile.into());
        }

        let encoding = match options.encoding.as_deref() {
            Some(label) => resolve_encoding(label)?,
            None => detect_encoding(bytes),
        };
        let content = decode_content(bytes, &encoding);

        let delimiter = if options.detect_delimiter {
            detect_delimiter(&content)
        } else {
            options.delimiter
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter_byte(delimiter)?)
            .from_reader(Cursor::new(content.into_bytes()));

        let mut header_record = csv::StringRecord::new();
        let has_header = reader
            .read_record(&mut header_record)
            .map_err(|e| csv_error(e, reader.get_ref().get_ref()))?;
        if !has_header {
            return Err(CsvError::NoHeaders.into());
        }

        let headers = HeaderSet::new(header_record.iter().map(String::from).collect());

        Ok(Self {
            headers,
            encoding,
            delimiter,
            reader,
        })
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Next data row, or `None` at end of input.
    pub fn next_record(&mut self) -> CsvResult<Option<Record>> {
        let mut row = csv::StringRecord::new();
        let has_row = self
            .reader
            .read_record(&mut row)
            .map_err(|e| csv_error(e, self.reader.get_ref().get_ref()))?;
        if !has_row {
            return Ok(None);
        }

        let line = row
            .position()
            .map(|p| physical_line(self.reader.get_ref().get_ref(), p.byte()))
            .unwrap_or(0);
        let expected = self.headers.len();
        if row.len() != expected {
            return Err(CsvError::RowShape {
                line,
                actual: row.len(),
                expected,
            });
        }

        Ok(Some(Record::new(line, row.iter().map(String::from).collect())))
    }

    /// Read every remaining row.
    pub fn read_all(&mut self) -> CsvResult<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record()? {
            records.push(record);
        }
        Ok(records)
    }
}

/// 1-based line of the record starting at `byte`.
///
/// The reader's position may point at blank lines it skipped before the
/// record; those are stepped over. Newlines inside earlier quoted fields are
/// counted.
fn physical_line(content: &[u8], byte: u64) -> u64 {
    let mut start = (byte as usize).min(content.len());
    while start < content.len() && matches!(content[start], b'\r' | b'\n') {
        start += 1;
    }
    content[..start].iter().filter(|&&b| b == b'\n').count() as u64 + 1
}

fn csv_error(err: csv::Error, content: &[u8]) -> CsvError {
    let line = err
        .position()
        .map(|p| physical_line(content, p.byte()))
        .unwrap_or(0);
    match err.into_kind() {
        csv::ErrorKind::Io(e) => CsvError::IoError(e),
        other => CsvError::ParseError {
            line,
            message: format!("{:?}", other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(csv: &str) -> CsvSource {
        CsvSource::from_bytes(csv.as_bytes(), &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_simple_csv() {
        let mut source =
            open("FirstName,LastName,Email\nJohn,Doe,john@x.com\nJane,Smith,jane@x.com\n");
        assert_eq!(source.headers().names(), ["FirstName", "LastName", "Email"]);

        let rows = source.read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].values, vec!["John", "Doe", "john@x.com"]);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn test_values_kept_verbatim() {
        let mut source = open("a,b\n  Alice , Bob@X.com \n");
        let rows = source.read_all().unwrap();
        assert_eq!(rows[0].values, vec!["  Alice ", " Bob@X.com "]);
    }

    #[test]
    fn test_quoted_values() {
        let mut source = open("name,value\n\"Alice\",\"Hello, World\"\n");
        let rows = source.read_all().unwrap();
        assert_eq!(rows[0].values, vec!["Alice", "Hello, World"]);
    }

    #[test]
    fn test_header_only() {
        let mut source = open("FirstName,LastName,Email\n");
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_empty_lines_skipped() {
        let mut source = open("a,b\n1,2\n\n3,4\n");
        let rows = source.read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].line, 4);
    }

    #[test]
    fn test_row_shape_reports_physical_line() {
        let mut source = open("a,b,c\n1,2,3\n\n4,5\n");
        assert!(source.next_record().unwrap().is_some());
        match source.next_record() {
            Err(CsvError::RowShape { line, actual, expected }) => {
                assert_eq!(line, 4);
                assert_eq!(actual, 2);
                assert_eq!(expected, 3);
            }
            other => panic!("expected row shape error, got {:?}", other),
        }
    }

    #[test]
    fn test_multiline_field_counts_lines() {
        let mut source = open("a,b\n1,\"two\nlines\"\n3\n");
        assert_eq!(source.next_record().unwrap().unwrap().line, 2);
        assert!(matches!(
            source.next_record(),
            Err(CsvError::RowShape { line: 4, actual: 1, expected: 2 })
        ));
    }

    #[test]
    fn test_physical_line_skips_blank_lines() {
        let content = b"a,b\n\r\n\n1,2\n";
        // offset of the first blank line
        assert_eq!(physical_line(content, 4), 4);
        assert_eq!(physical_line(content, 0), 1);
        assert_eq!(physical_line(content, 100), 5);
    }

    #[test]
    fn test_extra_values_rejected() {
        let mut source = open("a,b\n1,2,3\n");
        assert!(matches!(
            source.next_record(),
            Err(CsvError::RowShape { line: 2, actual: 3, expected: 2 })
        ));
    }

    #[test]
    fn test_empty_bytes_error() {
        let err = CsvSource::from_bytes(b"", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, SourceError::Csv(CsvError::EmptyFile)));
    }

    #[test]
    fn test_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"FirstName,LastName\nA,B\n");
        let source = CsvSource::from_bytes(&bytes, &ParseOptions::default()).unwrap();
        assert_eq!(source.headers().names()[0], "FirstName");
    }

    #[test]
    fn test_explicit_delimiter() {
        let options = ParseOptions {
            delimiter: ';',
            ..ParseOptions::default()
        };
        let mut source = CsvSource::from_bytes(b"a;b\n1;2\n", &options).unwrap();
        assert_eq!(source.delimiter(), ';');
        assert_eq!(source.read_all().unwrap()[0].values, vec!["1", "2"]);
    }

    #[test]
    fn test_detected_delimiter() {
        let options = ParseOptions {
            detect_delimiter: true,
            ..ParseOptions::default()
        };
        let source = CsvSource::from_bytes(b"a\tb\tc\n1\t2\t3\n", &options).unwrap();
        assert_eq!(source.delimiter(), '\t');
        assert_eq!(source.headers().len(), 3);
    }

    #[test]
    fn test_detect_delimiter_candidates() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a|b|c"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let options = ParseOptions {
            delimiter: '§',
            ..ParseOptions::default()
        };
        let err = CsvSource::from_bytes(b"a,b\n", &options).unwrap_err();
        assert!(matches!(err, SourceError::Config(ConfigError::InvalidDelimiter('§'))));
    }

    #[test]
    fn test_unknown_forced_encoding() {
        assert!(resolve_encoding("klingon").is_err());
        assert_eq!(resolve_encoding("Latin1").unwrap(), "iso-8859-1");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }
}
