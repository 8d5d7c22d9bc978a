//! Streaming CSV decoding for contact exports
//!
//! Wraps `csv::Reader` so that every data line comes out as a [`RawRow`]
//! labelled by position, and so that a quoted field left open at end of file
//! is reported as an error instead of silently absorbing the rest of the file.

use crate::error::{ContactError, PipelineStage, Result};
use crate::models::RawRow;

use csv::ByteRecord;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Raised through the I/O layer when input ends inside a quoted field
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("input ended inside a quoted field opened on line {line}")]
pub struct UnterminatedQuote {
    pub line: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// A quote seen inside a quoted field: either an escape or the close
    QuoteInQuoted,
}

/// Pass-through reader that follows CSV quoting as bytes go by.
///
/// `csv` treats end of input as closing any open quote. This guard turns
/// that case into an `InvalidData` error carrying [`UnterminatedQuote`].
#[derive(Debug)]
pub struct QuoteGuard<R> {
    inner: R,
    state: QuoteState,
    line: u64,
    quote_opened_on: u64,
    failed: bool,
}

impl<R: Read> QuoteGuard<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            state: QuoteState::FieldStart,
            line: 1,
            quote_opened_on: 1,
            failed: false,
        }
    }

    fn track(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state = match (self.state, byte) {
                (QuoteState::FieldStart, b'"') => {
                    self.quote_opened_on = self.line;
                    QuoteState::Quoted
                }
                (QuoteState::Quoted, b'"') => QuoteState::QuoteInQuoted,
                (QuoteState::Quoted, _) => QuoteState::Quoted,
                (QuoteState::QuoteInQuoted, b'"') => QuoteState::Quoted,
                (_, b',' | b'\n' | b'\r') => QuoteState::FieldStart,
                (QuoteState::QuoteInQuoted, _) => QuoteState::Unquoted,
                (_, _) => QuoteState::Unquoted,
            };
            if byte == b'\n' {
                self.line += 1;
            }
        }
    }
}

impl<R: Read> Read for QuoteGuard<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.failed {
            return Ok(0);
        }
        let n = self.inner.read(buf)?;
        if n == 0 && self.state == QuoteState::Quoted {
            self.failed = true;
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                UnterminatedQuote {
                    line: self.quote_opened_on,
                },
            ));
        }
        self.track(&buf[..n]);
        Ok(n)
    }
}

/// Decoder for contact export files.
///
/// The first line is the export's own header and is consumed without being
/// interpreted. Rows must all have the header's field count.
#[derive(Debug)]
pub struct ContactReader<R> {
    reader: csv::Reader<QuoteGuard<R>>,
    source: PathBuf,
}

impl ContactReader<File> {
    /// Open an export file for streaming
    pub fn from_path(path: &Path) -> Result<Self> {
        let file =
            File::open(path).map_err(|e| ContactError::io(path, PipelineStage::OpenInput, e))?;
        Ok(Self::with_source(file, path.to_path_buf()))
    }
}

impl<R: Read> ContactReader<R> {
    pub fn from_reader(reader: R) -> Self {
        Self::with_source(reader, PathBuf::from("<stream>"))
    }

    fn with_source(reader: R, source: PathBuf) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(QuoteGuard::new(reader));
        Self { reader, source }
    }

    /// Raw byte records, header line excluded. Ends after the first error.
    ///
    /// Fields are not checked for UTF-8 here; text decoding is left to
    /// [`ContactReader::rows`].
    pub fn records(&mut self) -> impl Iterator<Item = Result<ByteRecord>> + '_ {
        let source = self.source.clone();
        let mut failed = false;
        self.reader.byte_records().map_while(move |r| {
            if failed {
                return None;
            }
            failed = r.is_err();
            Some(r.map_err(|e| ContactError::decode(&source, e)))
        })
    }

    /// Data rows labelled with the fixed contact columns.
    ///
    /// Bytes that are not valid UTF-8 become U+FFFD, so a mis-encoded row
    /// reaches validation instead of failing the file.
    pub fn rows(&mut self) -> impl Iterator<Item = Result<RawRow>> + '_ {
        self.records().map(|r| {
            r.map(|record| RawRow::from_fields(record.iter().map(String::from_utf8_lossy)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(data: &str) -> Vec<Result<RawRow>> {
        let mut reader = ContactReader::from_reader(data.as_bytes());
        reader.rows().collect()
    }

    #[test]
    fn test_header_line_is_skipped_and_columns_relabelled() {
        let rows = decode(
            "Email Address,First Name,Last Name,Subscribed,Unsub Date\n\
             a@x.com,Ann,Lee,Yes,\n",
        );
        assert_eq!(rows.len(), 1);
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.email.as_deref(), Some("a@x.com"));
        assert_eq!(row.first_name.as_deref(), Some("Ann"));
        assert_eq!(row.last_name.as_deref(), Some("Lee"));
        assert_eq!(row.is_subscribed.as_deref(), Some("Yes"));
        assert_eq!(row.unsubscribed_date.as_deref(), Some(""));
    }

    #[test]
    fn test_quoted_fields() {
        let rows = decode(
            "h1,h2,h3,h4,h5\n\
             \"a@x.com\",\"Lee, Ann\",\"O\"\"Hara\",Yes,\"line one\r\nline two\"\n",
        );
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.first_name.as_deref(), Some("Lee, Ann"));
        assert_eq!(row.last_name.as_deref(), Some("O\"Hara"));
        assert_eq!(row.unsubscribed_date.as_deref(), Some("line one\r\nline two"));
    }

    #[test]
    fn test_crlf_input() {
        let rows = decode(
            "h1,h2,h3,h4,h5\r\na@x.com,Ann,Lee,Yes,\r\nb@x.com,Bo,Ng,No,2020-01-01\r\n",
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].as_ref().unwrap().email.as_deref(), Some("b@x.com"));
    }

    #[test]
    fn test_unterminated_quote_is_fatal() {
        let rows = decode("h1,h2,h3,h4,h5\na@x.com,Ann,Lee,Yes,\nb@x.com,Bo,Ng,No,\"2020-01-01\n");
        let err = rows
            .into_iter()
            .find_map(|r| r.err())
            .expect("unterminated quote should fail");
        match err {
            ContactError::UnterminatedQuote { line, .. } => assert_eq!(line, 3),
            other => panic!("Expected UnterminatedQuote, got {:?}", other),
        }
    }

    #[test]
    fn test_decoding_stops_at_first_error() {
        let rows = decode("h1,h2,h3,h4,h5\na@x.com,Ann,Lee,Yes,\nb@x.com,Bo,Ng,No,\"2020\n");
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_ok());
        assert!(rows[1].is_err());
    }

    #[test]
    fn test_ragged_row_is_fatal() {
        let rows = decode("h1,h2,h3,h4,h5\na@x.com,Ann,Lee\n");
        match rows.into_iter().next() {
            Some(Err(ContactError::Decode { .. })) => {}
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_latin1_bytes_are_replaced_not_fatal() {
        let data = b"h1,h2,h3,h4,h5\nb@x.com,J\xfcrgen,M\xfcller,Yes,\nc@x.com,Cy,Oh,Yes,\n";
        let mut reader = ContactReader::from_reader(&data[..]);
        let rows: Vec<RawRow> = reader.rows().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].first_name.as_deref(), Some("J\u{FFFD}rgen"));
        assert_eq!(rows[0].last_name.as_deref(), Some("M\u{FFFD}ller"));
        assert_eq!(rows[1].email.as_deref(), Some("c@x.com"));
    }

    #[test]
    fn test_empty_input_yields_no_rows() {
        assert!(decode("").is_empty());
        assert!(decode("h1,h2,h3,h4,h5\n").is_empty());
    }

    #[test]
    fn test_quote_guard_passes_bytes_through() {
        let data = b"\"a\"\"b\",c\n";
        let mut guard = QuoteGuard::new(&data[..]);
        let mut out = Vec::new();
        guard.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_missing_input_file() {
        let err = ContactReader::from_path(Path::new("/definitely/not/here.csv")).unwrap_err();
        match err {
            ContactError::Io { stage, .. } => assert_eq!(stage, PipelineStage::OpenInput),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }
}
