//! Word-list persistence.
//!
//! The list is a JSON array of strings on disk. When it is missing or empty,
//! a remote JSON document can seed it once at startup.

use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct WordStore {
    path: PathBuf,
}

impl WordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored list. A missing file is an empty list.
    pub async fn load(&self) -> Result<Vec<String>, StoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&text).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the list through a temporary file and rename it into place.
    pub async fn save(&self, words: &[String]) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let json = serde_json::to_vec_pretty(words).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let partial = self.path.with_extension("json.partial");
        tokio::fs::write(&partial, json).await.map_err(io_err)?;
        tokio::fs::rename(&partial, &self.path).await.map_err(io_err)?;
        debug!("store: saved {} words to {}", words.len(), self.path.display());
        Ok(())
    }

    /// Local list if it has words, otherwise the remote document. Remote
    /// failures are logged and give an empty list.
    pub async fn load_or_fetch(&self, remote_url: Option<&str>) -> Result<Vec<String>, StoreError> {
        let local = self.load().await?;
        if !local.is_empty() {
            return Ok(local);
        }

        let Some(url) = remote_url else {
            return Ok(local);
        };

        match fetch_remote_words(url).await {
            Ok(words) => {
                info!("store: seeded {} words from {url}", words.len());
                Ok(words)
            }
            Err(e) => {
                warn!("store: {e}");
                Ok(Vec::new())
            }
        }
    }
}

/// Resolve a word-list reference against `base`. Absolute references are
/// returned unchanged.
pub fn resolve_remote_url(base: &str, reference: &str) -> Result<String, StoreError> {
    let base = reqwest::Url::parse(base).map_err(|e| StoreError::Url(format!("{base}: {e}")))?;
    let url = base
        .join(reference)
        .map_err(|e| StoreError::Url(format!("{reference}: {e}")))?;
    Ok(url.into())
}

/// `GET` a JSON array of words. Anything but `200 OK` fails.
pub async fn fetch_remote_words(url: &str) -> Result<Vec<String>, StoreError> {
    let resp = reqwest::get(url)
        .await
        .map_err(|e| StoreError::Fetch(format!("request to {url} failed: {e}")))?;

    if resp.status() != StatusCode::OK {
        return Err(StoreError::Fetch(format!(
            "{url} returned status {}",
            resp.status()
        )));
    }

    resp.json::<Vec<String>>()
        .await
        .map_err(|e| StoreError::Fetch(format!("{url} is not a word list: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::Router;
    use axum::http::StatusCode as HttpStatus;
    use axum::routing::get;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn relative_reference_joins_base() {
        let url = resolve_remote_url("https://example.org/data/japanese/", "./data.json").unwrap();
        assert_eq!(url, "https://example.org/data/japanese/data.json");
    }

    #[test]
    fn absolute_reference_ignores_base() {
        let url = resolve_remote_url("https://example.org/a/", "http://127.0.0.1:8080/words.json").unwrap();
        assert_eq!(url, "http://127.0.0.1:8080/words.json");
    }

    #[test]
    fn bad_base_is_url_error() {
        let err = resolve_remote_url("not a url", "./data.json").unwrap_err();
        assert!(matches!(err, StoreError::Url(_)));
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = WordStore::new(dir.path().join("words.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = WordStore::new(dir.path().join("nested/words.json"));
        let list = words(&["猫", "犬", "猫"]);

        store.save(&list).await.unwrap();
        assert_eq!(store.load().await.unwrap(), list);
        assert!(!dir.path().join("nested/words.json.partial").exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        std::fs::write(&path, "{not a list").unwrap();
        let store = WordStore::new(path);
        assert!(matches!(store.load().await, Err(StoreError::Json { .. })));
    }

    #[tokio::test]
    async fn local_list_wins_over_remote() {
        let dir = tempfile::tempdir().unwrap();
        let store = WordStore::new(dir.path().join("words.json"));
        store.save(&words(&["山"])).await.unwrap();

        // Unroutable URL: must not be contacted.
        let list = store.load_or_fetch(Some("http://127.0.0.1:9/data.json")).await.unwrap();
        assert_eq!(list, words(&["山"]));
    }

    #[tokio::test]
    async fn empty_local_list_fetches_remote() {
        let app = Router::new().route("/data.json", get(|| async { r#"["川", "海"]"# }));
        let base = serve(app).await;
        let dir = tempfile::tempdir().unwrap();
        let store = WordStore::new(dir.path().join("words.json"));

        let list = store
            .load_or_fetch(Some(&format!("{base}/data.json")))
            .await
            .unwrap();
        assert_eq!(list, words(&["川", "海"]));
    }

    #[tokio::test]
    async fn remote_failure_gives_empty_list() {
        let app = Router::new().route("/data.json", get(|| async { HttpStatus::NOT_FOUND }));
        let base = serve(app).await;
        let dir = tempfile::tempdir().unwrap();
        let store = WordStore::new(dir.path().join("words.json"));

        let list = store
            .load_or_fetch(Some(&format!("{base}/data.json")))
            .await
            .unwrap();
        assert!(list.is_empty());
    }
}
