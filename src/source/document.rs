//! JSON documents fetched over HTTP or read from disk

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};
use crate::roster::{FamilyLists, RawStudent};

use super::{Location, RosterSource};

/// Source backed by two JSON documents
pub struct DocumentSource {
    students: Location,
    families: Location,
    client: Client,
    timeout_secs: u64,
}

impl DocumentSource {
    pub fn new(students: Location, families: Location, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("hogwarts-roster/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            students,
            families,
            client,
            timeout_secs,
        })
    }

    /// Parse both locations and build the source
    pub fn from_locations(students: &str, families: &str, timeout_secs: u64) -> Result<Self> {
        Self::new(
            Location::parse(students)?,
            Location::parse(families)?,
            timeout_secs,
        )
    }

    async fn read_bytes(&self, location: &Location) -> Result<Vec<u8>> {
        match location {
            Location::Remote(url) => {
                let response = self.client.get(url.clone()).send().await.map_err(|e| {
                    if e.is_timeout() {
                        Error::FetchTimeout {
                            location: location.to_string(),
                            timeout_secs: self.timeout_secs,
                        }
                    } else {
                        Error::fetch_failed(location.to_string(), e.to_string())
                    }
                })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(Error::FetchStatus {
                        location: location.to_string(),
                        status: status.as_u16(),
                    });
                }

                let bytes = response.bytes().await.map_err(|e| {
                    Error::fetch_failed(
                        location.to_string(),
                        format!("Failed to read response body: {}", e),
                    )
                })?;
                Ok(bytes.to_vec())
            }
            Location::Local(path) => tokio::fs::read(path)
                .await
                .map_err(|e| Error::fetch_failed(location.to_string(), e.to_string())),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, location: &Location) -> Result<T> {
        let bytes = self.read_bytes(location).await?;
        debug!(location = %location, bytes = bytes.len(), "Fetched document");
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::data_malformed(location.to_string(), e.to_string()))
    }
}

#[async_trait]
impl RosterSource for DocumentSource {
    fn describe(&self) -> String {
        format!("{} + {}", self.students, self.families)
    }

    async fn students(&self) -> Result<Vec<RawStudent>> {
        self.fetch(&self.students).await
    }

    async fn families(&self) -> Result<FamilyLists> {
        self.fetch(&self.families).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `reply` to the first connection; `None` accepts and never answers
    async fn one_shot_server(reply: Option<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request).await;
            match reply {
                Some(reply) => {
                    let _ = stream.write_all(reply.as_bytes()).await;
                    let _ = stream.shutdown().await;
                }
                None => tokio::time::sleep(Duration::from_secs(10)).await,
            }
        });
        format!("http://{}/students.json", addr)
    }

    fn json_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn source(students: &NamedTempFile, families: &NamedTempFile) -> DocumentSource {
        DocumentSource::from_locations(
            students.path().to_str().unwrap(),
            families.path().to_str().unwrap(),
            5,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_reads_local_documents() {
        let students = json_file(
            r#"[{"fullname":"Harry Potter","house":"Gryffindor","gender":"boy"}]"#,
        );
        let families = json_file(r#"{"half":["Potter"],"pure":[]}"#);
        let source = source(&students, &families);

        let raw = source.students().await.unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].fullname, "Harry Potter");

        let lists = source.families().await.unwrap();
        assert_eq!(lists.half, vec!["Potter".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_family_list_defaults_to_empty() {
        let students = json_file("[]");
        let families = json_file(r#"{"pure":["Malfoy"]}"#);
        let lists = source(&students, &families).families().await.unwrap();
        assert!(lists.half.is_empty());
        assert_eq!(lists.pure.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_document() {
        let students = json_file(r#"{"not":"a list"}"#);
        let families = json_file("{}");
        let err = source(&students, &families).students().await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::DataMalformed);
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_failure() {
        let source =
            DocumentSource::from_locations("/nonexistent/students.json", "/nonexistent/f.json", 5)
                .unwrap();
        let err = source.students().await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::FetchFailed);
        assert!(err.is_load_failure());
    }

    #[tokio::test]
    async fn test_connection_refused_is_fetch_failure() {
        let source = DocumentSource::from_locations(
            "http://127.0.0.1:9/students.json",
            "http://127.0.0.1:9/families.json",
            5,
        )
        .unwrap();
        let err = source.families().await.unwrap_err();
        assert!(err.is_load_failure());
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_failure() {
        let url = one_shot_server(Some(
            "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        ))
        .await;
        let source = DocumentSource::from_locations(&url, &url, 5).unwrap();

        let err = source.students().await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::FetchStatus);
        assert_eq!(err.exit_code(), 30);
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let url = one_shot_server(None).await;
        let source = DocumentSource::from_locations(&url, &url, 1).unwrap();

        let err = source.students().await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::FetchTimeout);
        assert_eq!(err.exit_code(), 30);
    }

    #[tokio::test]
    async fn test_remote_document_is_parsed() {
        let url = one_shot_server(Some(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n[]",
        ))
        .await;
        let source = DocumentSource::from_locations(&url, &url, 5).unwrap();

        assert!(source.students().await.unwrap().is_empty());
    }
}
