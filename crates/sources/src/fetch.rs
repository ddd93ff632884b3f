use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("unsupported URL scheme '{scheme}' of '{url}'")]
    UnsupportedScheme { url: Url, scheme: String },
    #[error("failed to read file '{url}': {detail}")]
    File {
        url: Url,
        #[source]
        detail: std::io::Error,
    },
    #[error("failed to fetch '{url}': {detail}")]
    Http {
        url: Url,
        #[source]
        detail: reqwest::Error,
    },
    #[error("'{url}' is not a fetchable resource")]
    NotFound { url: Url },
}

/// Fetcher retrieves the contents of a resource URL. The default
/// implementation reads files and HTTP(S); tests and embedding drivers
/// substitute their own.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, resource: &Url) -> Result<String, FetchError>;
}

#[async_trait::async_trait]
impl<F: Fetcher + ?Sized> Fetcher for &F {
    async fn fetch(&self, resource: &Url) -> Result<String, FetchError> {
        (**self).fetch(resource).await
    }
}

/// SourceFetcher reads `file://` URLs from the local filesystem and
/// `http(s)://` URLs over the network, with a per-fetch timeout.
/// Proxy environment variables (HTTPS_PROXY / NO_PROXY) are honored by the
/// underlying client.
pub struct SourceFetcher {
    client: reqwest::Client,
}

impl SourceFetcher {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new() -> SourceFetcher {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> SourceFetcher {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("client builder with static options");
        SourceFetcher { client }
    }
}

impl Default for SourceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Fetcher for SourceFetcher {
    async fn fetch(&self, resource: &Url) -> Result<String, FetchError> {
        tracing::debug!(url = %resource, "fetching resource");

        match resource.scheme() {
            "file" => {
                let path = resource
                    .to_file_path()
                    .map_err(|()| FetchError::NotFound {
                        url: resource.clone(),
                    })?;
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|detail| FetchError::File {
                        url: resource.clone(),
                        detail,
                    })
            }
            "http" | "https" => {
                let response = self
                    .client
                    .get(resource.clone())
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|detail| FetchError::Http {
                        url: resource.clone(),
                        detail,
                    })?;
                response.text().await.map_err(|detail| FetchError::Http {
                    url: resource.clone(),
                    detail,
                })
            }
            scheme => Err(FetchError::UnsupportedScheme {
                url: resource.clone(),
                scheme: scheme.to_string(),
            }),
        }
    }
}

/// MapFetcher serves fixtures from memory, for tests and embedded drivers.
#[derive(Default)]
pub struct MapFetcher {
    resources: BTreeMap<Url, String>,
}

impl MapFetcher {
    pub fn new() -> MapFetcher {
        Default::default()
    }

    pub fn add(mut self, url: &str, content: &str) -> MapFetcher {
        let url = Url::parse(url).expect("fixture URL parses");
        self.resources.insert(url, content.to_string());
        self
    }
}

#[async_trait::async_trait]
impl Fetcher for MapFetcher {
    async fn fetch(&self, resource: &Url) -> Result<String, FetchError> {
        let mut lookup = resource.clone();
        lookup.set_fragment(None);

        self.resources
            .get(&lookup)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                url: resource.clone(),
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_fetch() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "openapi: 3.0.0\n").unwrap();

        let url = Url::from_file_path(file.path()).unwrap();
        let fetched = SourceFetcher::new().fetch(&url).await.unwrap();
        assert_eq!(fetched, "openapi: 3.0.0\n");

        let missing = Url::parse("file:///definitely/not/here.yaml").unwrap();
        let err = SourceFetcher::new().fetch(&missing).await.unwrap_err();
        assert!(matches!(err, FetchError::File { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let url = Url::parse("ftp://example/openapi.yaml").unwrap();
        let err = SourceFetcher::new().fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedScheme { .. }));
    }
}
