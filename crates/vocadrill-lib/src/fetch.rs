//! Recorded-clip download.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::AudioError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches the raw bytes of a recorded clip for a word.
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    async fn fetch(&self, word: &str) -> Result<Vec<u8>, AudioError>;
}

/// Build the clip URL by substituting the percent-encoded word for `{word}`.
pub fn audio_url(template: &str, word: &str) -> String {
    template.replace("{word}", &urlencoding::encode(word))
}

/// `GET` against the remote audio endpoint. Anything but `200 OK` fails.
#[derive(Debug, Clone)]
pub struct HttpAudioFetcher {
    client: reqwest::Client,
    url_template: String,
}

impl HttpAudioFetcher {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url_template)
    }

    pub fn with_client(client: reqwest::Client, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }
}

#[async_trait]
impl AudioFetcher for HttpAudioFetcher {
    async fn fetch(&self, word: &str) -> Result<Vec<u8>, AudioError> {
        let url = audio_url(&self.url_template, word);
        debug!("fetch: GET {url}");

        let resp = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| AudioError::Fetch(e.to_string()))?;

        if resp.status() != StatusCode::OK {
            return Err(AudioError::Status(resp.status().as_u16()));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| AudioError::Fetch(e.to_string()))?;
        debug!("fetch: {} bytes for {word}", bytes.len());
        Ok(bytes.to_vec())
    }
}
