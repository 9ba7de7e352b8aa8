//! Streaming decoder for CouchDB `_all_docs` style exports
//!
//! The source payload has the shape
//! `{"total_rows": N, "offset": 0, "rows": [{"id": ..., "doc": {...}}, ...]}`
//! and can hold millions of rows. [`RowDecoder`] seeks to `total_rows`, then
//! to the `rows` array, and yields one document per pull. Only the element
//! being decoded is held in memory.
//!
//! # Example
//!
//! ```rust
//! use couchcopy::core::decode::RowDecoder;
//!
//! # async fn example() -> couchcopy::domain::Result<()> {
//! let input: &[u8] = br#"{"total_rows": 1, "rows": [{"doc": {"_id": "a"}}]}"#;
//! let mut decoder = RowDecoder::new(input);
//! let total = decoder.begin().await?;
//! assert_eq!(total, 1.0);
//!
//! while let Some(doc) = decoder.next().await? {
//!     assert_eq!(doc["_id"], "a");
//! }
//! # Ok(())
//! # }
//! ```

pub mod scanner;

use crate::domain::{Document, Result};
use scanner::JsonScanner;
use serde::Deserialize;
use tokio::io::AsyncBufRead;

/// Key holding the row count announced by the source
pub const TOTAL_ROWS_KEY: &str = "total_rows";

/// Key holding the array of rows
pub const ROWS_KEY: &str = "rows";

/// One element of the `rows` array. Only `doc` is kept.
#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    doc: Option<Document>,
}

/// Where the decoder is within the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// `begin` has not completed yet
    Header,
    /// Inside the `rows` array; `first` is true until an element has been read
    Rows { first: bool },
    /// The closing bracket of `rows` has been consumed
    Finished,
}

/// Pull-based decoder yielding documents from a `rows` array
pub struct RowDecoder<R> {
    scanner: JsonScanner<R>,
    state: DecoderState,
    total_rows: Option<f64>,
    rows_read: u64,
    element: Vec<u8>,
}

impl<R> RowDecoder<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Create a decoder over a buffered byte stream
    pub fn new(reader: R) -> Self {
        Self {
            scanner: JsonScanner::new(reader),
            state: DecoderState::Header,
            total_rows: None,
            rows_read: 0,
            element: Vec::new(),
        }
    }

    /// Read the header: decode `total_rows` and open the `rows` array.
    ///
    /// Returns the announced row count.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if the stream is not an object, either key is
    /// missing, `total_rows` is not a number or `rows` is not an array.
    pub async fn begin(&mut self) -> Result<f64> {
        if self.state != DecoderState::Header {
            return Err(self.scanner.malformed("decoder header already read"));
        }

        self.scanner.expect(b'{', "at document start").await?;

        self.seek_key(TOTAL_ROWS_KEY).await?;
        let total = self.read_number(TOTAL_ROWS_KEY).await?;
        self.total_rows = Some(total);

        self.seek_key(ROWS_KEY).await?;
        self.scanner
            .expect(b'[', "at the start of the rows array")
            .await?;
        self.state = DecoderState::Rows { first: true };

        tracing::debug!(total_rows = total, "Decoded source header");
        Ok(total)
    }

    /// Decode the next document, or `None` once the array is exhausted
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` for truncated input, non-object rows and rows
    /// without a `doc` object.
    pub async fn next(&mut self) -> Result<Option<Document>> {
        let first = match self.state {
            DecoderState::Finished => return Ok(None),
            DecoderState::Header => {
                return Err(self.scanner.malformed("rows requested before header was read"))
            }
            DecoderState::Rows { first } => first,
        };

        match self.scanner.peek_significant().await? {
            Some(b']') => {
                self.scanner.expect(b']', "at the end of the rows array").await?;
                self.state = DecoderState::Finished;
                tracing::debug!(rows_read = self.rows_read, "Reached end of rows array");
                return Ok(None);
            }
            Some(_) if !first => {
                self.scanner.expect(b',', "between rows").await?;
            }
            Some(_) => {}
            None => {
                return Err(self
                    .scanner
                    .malformed("unexpected end of input inside the rows array"))
            }
        }

        self.element.clear();
        self.scanner
            .capture_value(&mut self.element, "inside a row")
            .await?;

        let row: Row = serde_json::from_slice(&self.element).map_err(|e| {
            self.scanner
                .malformed(format!("row {} is not a valid row object: {e}", self.rows_read))
        })?;
        let doc = row.doc.ok_or_else(|| {
            self.scanner
                .malformed(format!("row {} has no doc object", self.rows_read))
        })?;

        self.rows_read += 1;
        self.state = DecoderState::Rows { first: false };
        Ok(Some(doc))
    }

    /// Row count announced by the source header, once `begin` has run
    pub fn total_rows(&self) -> Option<f64> {
        self.total_rows
    }

    /// Number of documents yielded so far
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Current decoder state
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Move forward through the top-level object until `key` is found,
    /// skipping the values of every other key. Leaves the cursor at the value.
    async fn seek_key(&mut self, key: &str) -> Result<()> {
        loop {
            match self.scanner.peek_significant().await? {
                Some(b',') => self.scanner.expect(b',', "between keys").await?,
                Some(b'"') => {
                    let context = format!("while looking for key `{key}`");
                    let found = self.scanner.read_string(&context).await?;
                    self.scanner.expect(b':', &context).await?;
                    if found == key {
                        return Ok(());
                    }
                    self.scanner.skip_value(&context).await?;
                }
                Some(b'}') => {
                    return Err(self
                        .scanner
                        .malformed(format!("key `{key}` not found in source document")))
                }
                Some(other) => {
                    return Err(self.scanner.malformed(format!(
                        "unexpected byte 0x{other:02x} while looking for key `{key}`"
                    )))
                }
                None => {
                    return Err(self.scanner.malformed(format!(
                        "unexpected end of input while looking for key `{key}`"
                    )))
                }
            }
        }
    }

    async fn read_number(&mut self, key: &str) -> Result<f64> {
        let mut raw = Vec::new();
        self.scanner
            .capture_value(&mut raw, &format!("in the value of `{key}`"))
            .await?;
        serde_json::from_slice::<f64>(&raw).map_err(|_| {
            self.scanner.malformed(format!(
                "`{key}` must be a number, found `{}`",
                String::from_utf8_lossy(&raw)
            ))
        })
    }
}
