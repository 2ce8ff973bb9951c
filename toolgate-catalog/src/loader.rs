//! Fetching and parsing API description documents.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Map, Number, Value};
use tracing::{debug, info};
use url::Url;

use crate::catalog::OperationCatalog;
use crate::error::{CatalogError, CatalogResult};

/// Where the API description comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum SpecSource {
    /// Fetched over HTTP(S).
    Url(String),
    /// Read from the local filesystem.
    Path(PathBuf),
    /// Supplied directly by the caller.
    Inline(Bytes),
}

impl SpecSource {
    /// Interprets a user-supplied location as a URL or a file path.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        let remote = Url::parse(trimmed).is_ok_and(|url| matches!(url.scheme(), "http" | "https"));
        if remote {
            Self::Url(trimmed.to_owned())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }

    /// Human-readable location used in errors and logs.
    #[must_use]
    pub fn location(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Path(path) => path.display().to_string(),
            Self::Inline(bytes) => format!("<inline, {} bytes>", bytes.len()),
        }
    }
}

impl fmt::Debug for SpecSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SpecSource").field(&self.location()).finish()
    }
}

/// Retrieves a remote document. Implemented by the HTTP layer.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetches the document at `url` and returns its raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] on transport failure or a
    /// non-success status.
    async fn fetch(&self, url: &str) -> CatalogResult<Bytes>;
}

/// Loads an [`OperationCatalog`] from a [`SpecSource`].
#[derive(Clone, Default)]
pub struct SpecLoader {
    fetcher: Option<Arc<dyn DocumentFetcher>>,
}

impl fmt::Debug for SpecLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecLoader")
            .field("remote", &self.fetcher.is_some())
            .finish()
    }
}

impl SpecLoader {
    /// Creates a loader that can only read paths and inline documents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the fetcher used for [`SpecSource::Url`].
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Reads the raw document bytes without parsing them.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] when the file cannot be read,
    /// the fetch fails, or a URL is given without a configured fetcher.
    pub async fn read(&self, source: &SpecSource) -> CatalogResult<Bytes> {
        match source {
            SpecSource::Inline(bytes) => Ok(bytes.clone()),
            SpecSource::Path(path) => tokio::fs::read(path)
                .await
                .map(Bytes::from)
                .map_err(|err| CatalogError::unavailable(source.location(), err.to_string())),
            SpecSource::Url(url) => {
                let fetcher = self.fetcher.as_ref().ok_or_else(|| {
                    CatalogError::unavailable(url.clone(), "no http fetcher configured")
                })?;
                fetcher.fetch(url).await
            }
        }
    }

    /// Loads and parses the description into a catalog.
    ///
    /// When `cached` holds previously fetched bytes they are parsed instead,
    /// so the source is contacted at most once per process.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] if the document cannot be read
    /// and [`CatalogError::Invalid`] if it does not parse as a description.
    pub async fn load(
        &self,
        source: &SpecSource,
        cached: Option<Bytes>,
    ) -> CatalogResult<OperationCatalog> {
        let bytes = match cached {
            Some(bytes) => {
                debug!(source = ?source, "using cached api description");
                bytes
            }
            None => self.read(source).await?,
        };

        let document = parse_document(&bytes)?;
        let catalog = OperationCatalog::from_document(&document)?;
        info!(
            source = %source.location(),
            operations = catalog.len(),
            rejected = catalog.rejected().len(),
            "api description loaded"
        );
        Ok(catalog)
    }
}

/// Parses raw bytes as JSON, falling back to YAML.
///
/// # Errors
///
/// Returns [`CatalogError::Invalid`] when neither format accepts the input.
pub fn parse_document(bytes: &[u8]) -> CatalogResult<Value> {
    let json_err = match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    match serde_yaml::from_slice::<serde_yaml::Value>(bytes) {
        Ok(yaml) => Ok(yaml_to_json(yaml)),
        Err(yaml_err) => Err(CatalogError::invalid(format!(
            "not JSON ({json_err}) and not YAML ({yaml_err})"
        ))),
    }
}

fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(flag) => Value::Bool(flag),
        Yaml::Number(number) => yaml_number(&number),
        Yaml::String(text) => Value::String(text),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                // Response codes are commonly written as bare integers.
                let key = match key {
                    Yaml::String(key) => key,
                    Yaml::Number(number) => number.to_string(),
                    Yaml::Bool(flag) => flag.to_string(),
                    other => {
                        debug!(key = ?other, "skipping non-scalar yaml key");
                        continue;
                    }
                };
                map.insert(key, yaml_to_json(value));
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_number(number: &serde_yaml::Number) -> Value {
    if let Some(int) = number.as_i64() {
        Value::from(int)
    } else if let Some(int) = number.as_u64() {
        Value::from(int)
    } else {
        number
            .as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const JSON_DOC: &str = r#"{
        "openapi": "3.0.0",
        "info": {"title": "Pets", "version": "1.0"},
        "paths": {"/pets": {"get": {"operationId": "list_pets", "tags": ["Pets"]}}}
    }"#;

    const YAML_DOC: &str = "
openapi: 3.0.0
info:
  title: Pets
  version: '1.0'
paths:
  /pets:
    get:
      operationId: list_pets
      responses:
        200:
          description: ok
          content:
            application/json:
              schema:
                type: array
";

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentFetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> CatalogResult<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from_static(JSON_DOC.as_bytes()))
        }
    }

    #[tokio::test]
    async fn loads_inline_json() {
        let catalog = SpecLoader::new()
            .load(&SpecSource::Inline(Bytes::from_static(JSON_DOC.as_bytes())), None)
            .await
            .unwrap();
        assert!(catalog.get("list_pets").is_some());
    }

    #[tokio::test]
    async fn loads_yaml_with_integer_response_codes() {
        let catalog = SpecLoader::new()
            .load(&SpecSource::Inline(Bytes::from_static(YAML_DOC.as_bytes())), None)
            .await
            .unwrap();
        let op = catalog.get("list_pets").unwrap();
        assert_eq!(op.response_schema().unwrap()["type"], "array");
    }

    #[tokio::test]
    async fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(JSON_DOC.as_bytes()).unwrap();

        let source = SpecSource::Path(file.path().to_path_buf());
        let catalog = SpecLoader::new().load(&source, None).await.unwrap();
        assert_eq!(catalog.title(), Some("Pets"));
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let source = SpecSource::parse("/definitely/not/here.json");
        let err = SpecLoader::new().load(&source, None).await.expect_err("missing");
        assert!(matches!(err, CatalogError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn cached_bytes_skip_fetch() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
        });
        let loader = SpecLoader::new().with_fetcher(fetcher.clone());
        let source = SpecSource::parse("https://airflow.example/api/v1/openapi.json");

        let bytes = loader.read(&source).await.unwrap();
        loader.load(&source, Some(bytes)).await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn url_without_fetcher_is_unavailable() {
        let source = SpecSource::parse("http://localhost:8080/openapi.json");
        let err = SpecLoader::new().load(&source, None).await.expect_err("no fetcher");
        assert!(matches!(err, CatalogError::Unavailable { .. }));
    }

    #[test]
    fn garbage_is_invalid() {
        let err = parse_document(b"{ not: [valid").expect_err("garbage");
        assert!(matches!(err, CatalogError::Invalid { .. }));
    }

    #[test]
    fn only_http_locations_are_remote() {
        assert!(matches!(
            SpecSource::parse(" HTTPS://airflow.example/openapi.yaml "),
            SpecSource::Url(_)
        ));
        assert!(matches!(SpecSource::parse("specs/openapi.json"), SpecSource::Path(_)));
    }
}
