//! Outbound HTTP for remote collections and the opening explorer.
//!
//! Callers are generic over [`Fetch`] so tests can serve canned responses
//! without a network.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;

const USER_AGENT: &str = concat!("pgnshelf/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned {status}")]
    Status { status: u16, url: String },
    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Source of remote documents.
pub trait Fetch: Send + Sync {
    /// GET a URL and return the body as text. Non-2xx statuses are errors.
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;

    /// GET a URL and decode the body as JSON.
    fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<T, FetchError>> + Send {
        async move {
            let body = self.fetch_text(url).await?;
            Ok(serde_json::from_str(&body)?)
        }
    }
}

/// [`Fetch`] over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(FetchError::InvalidUrl(format!(
                "only http and https are supported, got {}",
                parsed.scheme()
            )));
        }

        tracing::debug!(%url, "GET");
        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeFetcher;
    use super::*;

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Doc {
        n: u32,
    }

    #[tokio::test]
    async fn test_fetch_json_decodes_body() {
        let fetcher = FakeFetcher::default();
        fetcher.serve("http://x/doc", r#"{"n": 7}"#);
        let doc: Doc = fetcher.fetch_json("http://x/doc").await.unwrap();
        assert_eq!(doc, Doc { n: 7 });
    }

    #[tokio::test]
    async fn test_fetch_json_reports_bad_json() {
        let fetcher = FakeFetcher::default();
        fetcher.serve("http://x/doc", "<html>");
        let err = fetcher.fetch_json::<Doc>("http://x/doc").await.unwrap_err();
        assert!(matches!(err, FetchError::Json(_)));
    }

    #[tokio::test]
    async fn test_http_fetcher_rejects_bad_urls() {
        let fetcher = HttpFetcher::new().unwrap();
        assert!(matches!(
            fetcher.fetch_text("not a url").await,
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            fetcher.fetch_text("ftp://example.com/x.pgn").await,
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
