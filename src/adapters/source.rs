//! Document source
//!
//! Opens a readable byte stream for an address: an HTTP GET whose body is
//! streamed, or a local file. Both are exposed as the same buffered reader.

use crate::domain::{Address, CopyError, Result};
use futures::TryStreamExt;
use reqwest::Client;
use tokio::io::{AsyncBufRead, BufReader};
use tokio_util::io::StreamReader;

/// Buffer size for local file sources
const FILE_BUFFER_BYTES: usize = 64 * 1024;

/// A source byte stream
pub type SourceStream = Box<dyn AsyncBufRead + Unpin + Send>;

/// Open the byte stream behind `address`
///
/// # Errors
///
/// Returns `CopyError::Source` if the file cannot be opened, the request
/// fails, or the server answers with a non-success status.
pub async fn open_source(address: &Address, client: &Client) -> Result<SourceStream> {
    if address.is_url() {
        open_url(address, client).await
    } else {
        open_file(address).await
    }
}

async fn open_url(address: &Address, client: &Client) -> Result<SourceStream> {
    tracing::debug!(source = %address, "Requesting source export");

    let response = client
        .get(address.as_str())
        .send()
        .await
        .map_err(|e| CopyError::Source(format!("Failed to request {address}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CopyError::Source(format!(
            "{address} answered with status {status}: {body}"
        )));
    }

    let stream = response
        .bytes_stream()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));

    Ok(Box::new(StreamReader::new(Box::pin(stream))))
}

async fn open_file(address: &Address) -> Result<SourceStream> {
    let file = tokio::fs::File::open(address.as_str())
        .await
        .map_err(|e| CopyError::Source(format!("Failed to open {address}: {e}")))?;

    Ok(Box::new(BufReader::with_capacity(FILE_BUFFER_BYTES, file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tokio::io::AsyncReadExt;

    async fn read_all(mut stream: SourceStream) -> Vec<u8> {
        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn test_open_file_source() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{\"total_rows\":0,\"rows\":[]}").unwrap();
        file.flush().unwrap();

        let address = Address::new(file.path().to_string_lossy().to_string()).unwrap();
        let stream = open_source(&address, &Client::new()).await.unwrap();
        assert_eq!(read_all(stream).await, b"{\"total_rows\":0,\"rows\":[]}");
    }

    #[tokio::test]
    async fn test_open_missing_file_is_source_error() {
        let address = Address::new("/definitely/not/here.json").unwrap();
        let result = open_source(&address, &Client::new()).await;
        assert!(matches!(result, Err(CopyError::Source(_))));
    }

    #[tokio::test]
    async fn test_open_url_source_streams_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/db/_all_docs")
            .match_query(mockito::Matcher::UrlEncoded(
                "include_docs".into(),
                "true".into(),
            ))
            .with_status(200)
            .with_body("{\"total_rows\":0,\"rows\":[]}")
            .create_async()
            .await;

        let address = Address::new(format!("{}/db/_all_docs?include_docs=true", server.url())).unwrap();
        let stream = open_source(&address, &Client::new()).await.unwrap();
        assert_eq!(read_all(stream).await, b"{\"total_rows\":0,\"rows\":[]}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_open_url_non_success_is_source_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/db/_all_docs")
            .with_status(401)
            .with_body("{\"error\":\"unauthorized\"}")
            .create_async()
            .await;

        let address = Address::new(format!("{}/db/_all_docs", server.url())).unwrap();
        let err = match open_source(&address, &Client::new()).await {
            Err(e) => e,
            Ok(_) => panic!("expected a source error"),
        };
        assert!(matches!(err, CopyError::Source(_)));
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("unauthorized"));
    }
}
