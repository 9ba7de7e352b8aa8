//! Local file destinations
//!
//! Two shapes: a verbatim byte copy of the source stream, and the flattened
//! form with one serialized document per line.

use crate::domain::{CopyError, Document, Result};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncWriteExt, BufWriter};

/// Copy every byte of `reader` into a newly created (or truncated) file.
///
/// Returns the number of bytes written.
pub async fn copy_stream_to_file<R>(reader: &mut R, path: &Path) -> Result<u64>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let file = create(path).await?;
    let mut writer = BufWriter::new(file);

    let bytes = tokio::io::copy_buf(reader, &mut writer)
        .await
        .map_err(|e| write_error(path, e))?;
    writer.flush().await.map_err(|e| write_error(path, e))?;

    Ok(bytes)
}

/// Writes documents as newline-delimited JSON
pub struct LineWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    lines: u64,
    line: Vec<u8>,
}

impl LineWriter {
    /// Create (or truncate) the output file
    pub async fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = create(&path).await?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            lines: 0,
            line: Vec::new(),
        })
    }

    /// Append one document followed by a newline
    pub async fn write_document(&mut self, doc: &Document) -> Result<()> {
        self.line.clear();
        serde_json::to_writer(&mut self.line, doc)?;
        self.line.push(b'\n');

        self.writer
            .write_all(&self.line)
            .await
            .map_err(|e| write_error(&self.path, e))?;
        self.lines += 1;
        Ok(())
    }

    /// Flush buffered output and return the number of lines written
    pub async fn finish(mut self) -> Result<u64> {
        self.writer
            .flush()
            .await
            .map_err(|e| write_error(&self.path, e))?;
        Ok(self.lines)
    }

    /// Output file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn create(path: &Path) -> Result<File> {
    File::create(path).await.map_err(|e| {
        CopyError::DestinationWrite(format!("Failed to create {}: {e}", path.display()))
    })
}

fn write_error(path: &Path, err: std::io::Error) -> CopyError {
    CopyError::DestinationWrite(format!("Failed to write {}: {err}", path.display()))
}
