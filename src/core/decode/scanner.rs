//! Token-level JSON scanner over an async buffered reader
//!
//! The scanner never materializes more than one value at a time. Values can be
//! skipped (brackets are matched and bare tokens checked) or captured into a
//! caller-owned buffer for decoding with `serde_json`.

use crate::domain::{CopyError, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Byte-level cursor over a JSON text
pub struct JsonScanner<R> {
    reader: R,
    offset: u64,
}

impl<R> JsonScanner<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Wrap a buffered reader positioned at the start of a JSON text
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    /// Number of bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Look at the next byte without consuming it. `None` at end of input.
    pub async fn peek(&mut self) -> Result<Option<u8>> {
        let buf = self
            .reader
            .fill_buf()
            .await
            .map_err(|e| CopyError::Source(format!("Failed to read source stream: {e}")))?;
        Ok(buf.first().copied())
    }

    /// Consume one byte previously returned by `peek`
    fn bump(&mut self) {
        self.reader.consume(1);
        self.offset += 1;
    }

    async fn next_byte(&mut self) -> Result<Option<u8>> {
        let byte = self.peek().await?;
        if byte.is_some() {
            self.bump();
        }
        Ok(byte)
    }

    async fn next_byte_or_eof(&mut self, context: &str) -> Result<u8> {
        match self.next_byte().await? {
            Some(b) => Ok(b),
            None => Err(self.truncated(context)),
        }
    }

    /// Skip insignificant whitespace
    pub async fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(b) = self.peek().await? {
            if !is_whitespace(b) {
                break;
            }
            self.bump();
        }
        Ok(())
    }

    /// Skip whitespace and return the next significant byte without consuming it
    pub async fn peek_significant(&mut self) -> Result<Option<u8>> {
        self.skip_whitespace().await?;
        self.peek().await
    }

    /// Skip whitespace and consume `expected`, failing on anything else
    pub async fn expect(&mut self, expected: u8, context: &str) -> Result<()> {
        self.skip_whitespace().await?;
        match self.next_byte().await? {
            Some(b) if b == expected => Ok(()),
            Some(b) => Err(self.malformed(format!(
                "expected '{}' {context}, found '{}'",
                expected as char,
                printable(b)
            ))),
            None => Err(self.truncated(context)),
        }
    }

    /// Read a JSON string token and return its unescaped value
    pub async fn read_string(&mut self, context: &str) -> Result<String> {
        let mut raw = Vec::new();
        self.expect(b'"', context).await?;
        raw.push(b'"');
        self.scan_string_body(Some(&mut raw), context).await?;
        serde_json::from_slice(&raw)
            .map_err(|e| self.malformed(format!("invalid string {context}: {e}")))
    }

    /// Skip over one complete value
    pub async fn skip_value(&mut self, context: &str) -> Result<()> {
        self.scan_value(None, context).await
    }

    /// Append the raw bytes of one complete value to `out`
    pub async fn capture_value(&mut self, out: &mut Vec<u8>, context: &str) -> Result<()> {
        self.scan_value(Some(out), context).await
    }

    async fn scan_value(&mut self, mut out: Option<&mut Vec<u8>>, context: &str) -> Result<()> {
        self.skip_whitespace().await?;
        let first = match self.peek().await? {
            Some(b) => b,
            None => return Err(self.truncated(context)),
        };

        match first {
            b'{' | b'[' => {
                let mut closers: Vec<u8> = Vec::new();
                let mut scalar = Vec::new();
                loop {
                    let b = self.next_byte_or_eof(context).await?;
                    if let Some(out) = out.as_deref_mut() {
                        out.push(b);
                    }
                    if is_whitespace(b) || is_structural(b) {
                        self.check_scalar(&scalar, context)?;
                        scalar.clear();
                    }
                    match b {
                        b'"' => self.scan_string_body(out.as_deref_mut(), context).await?,
                        b'{' => closers.push(b'}'),
                        b'[' => closers.push(b']'),
                        b'}' | b']' => {
                            if closers.pop() != Some(b) {
                                return Err(self.malformed(format!(
                                    "mismatched '{}' {context}",
                                    b as char
                                )));
                            }
                            if closers.is_empty() {
                                return Ok(());
                            }
                        }
                        b',' | b':' => {}
                        _ if is_whitespace(b) => {}
                        _ => scalar.push(b),
                    }
                }
            }
            b'"' => {
                self.bump();
                if let Some(out) = out.as_deref_mut() {
                    out.push(b'"');
                }
                self.scan_string_body(out, context).await
            }
            b'}' | b']' | b',' | b':' => Err(self.malformed(format!(
                "expected a value {context}, found '{}'",
                printable(first)
            ))),
            _ => {
                let mut scalar = Vec::new();
                while let Some(b) = self.peek().await? {
                    if is_whitespace(b) || matches!(b, b',' | b'}' | b']') {
                        break;
                    }
                    scalar.push(b);
                    self.bump();
                }
                self.check_scalar(&scalar, context)?;
                if let Some(out) = out {
                    out.extend_from_slice(&scalar);
                }
                Ok(())
            }
        }
    }

    /// Reject a bare token that is not a JSON number or literal
    fn check_scalar(&self, token: &[u8], context: &str) -> Result<()> {
        if token.is_empty() {
            return Ok(());
        }
        match serde_json::from_slice::<serde_json::Value>(token) {
            Ok(value) if !value.is_object() && !value.is_array() => Ok(()),
            _ => Err(self.malformed(format!(
                "invalid token '{}' {context}",
                String::from_utf8_lossy(token)
            ))),
        }
    }

    /// Consume a string body up to and including the closing quote.
    /// The opening quote must already be consumed.
    async fn scan_string_body(
        &mut self,
        mut out: Option<&mut Vec<u8>>,
        context: &str,
    ) -> Result<()> {
        loop {
            let b = self.next_byte_or_eof(context).await?;
            if let Some(out) = out.as_deref_mut() {
                out.push(b);
            }
            match b {
                b'\\' => {
                    let escaped = self.next_byte_or_eof(context).await?;
                    if let Some(out) = out.as_deref_mut() {
                        out.push(escaped);
                    }
                }
                b'"' => return Ok(()),
                _ => {}
            }
        }
    }

    /// Build a `MalformedInput` error annotated with the current byte offset
    pub fn malformed(&self, message: impl AsRef<str>) -> CopyError {
        CopyError::MalformedInput(format!("{} (at byte {})", message.as_ref(), self.offset))
    }

    fn truncated(&self, context: &str) -> CopyError {
        self.malformed(format!("unexpected end of input {context}"))
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_structural(b: u8) -> bool {
    matches!(b, b'"' | b'{' | b'[' | b'}' | b']' | b',' | b':')
}

fn printable(b: u8) -> char {
    if b.is_ascii_graphic() {
        b as char
    } else {
        '?'
    }
}
