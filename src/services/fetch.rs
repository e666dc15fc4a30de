use std::time::Duration;

use reqwest::{Client, StatusCode};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("image download timed out")]
    Timeout,

    #[error("image download failed: {0}")]
    Http(reqwest::Error),

    #[error("image server returned status {0}")]
    Status(StatusCode),
}

/// Downloads remote image bytes with a bounded timeout. No retries; a failed
/// fetch is surfaced as the job's failure.
#[derive(Clone)]
pub struct ImageFetcher {
    http: Client,
}

impl ImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.http.get(url).send().await.map_err(classify)?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let bytes = response.bytes().await.map_err(classify)?;
        Ok(bytes.to_vec())
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Http(err)
    }
}
