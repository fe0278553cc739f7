use crate::traits::{RemoteFetcher, StorageError, StorageResult};
use crate::url_guard::{check_url, UrlPolicy};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{header, Url};
use std::time::Duration;

/// Redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

/// HTTP(S) byte fetcher backed by reqwest
///
/// Redirects are followed by hand so that every hop goes through the same URL checks as the
/// original request.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: u64,
    url_policy: UrlPolicy,
}

impl HttpFetcher {
    /// Create a new fetcher
    ///
    /// # Arguments
    /// * `timeout` - Whole-request timeout; a stalled server fails with `DownloadFailed`
    /// * `max_bytes` - Largest body accepted
    /// * `url_policy` - Address and allowlist checks applied before each request and redirect
    pub fn new(timeout: Duration, max_bytes: u64, url_policy: UrlPolicy) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                StorageError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            max_bytes,
            url_policy,
        })
    }

    async fn send_checked(&self, url: &str) -> StorageResult<reqwest::Response> {
        let mut current = check_url(url, &self.url_policy).await?;

        for _ in 0..=MAX_REDIRECTS {
            let response = self.client.get(current.clone()).send().await.map_err(|e| {
                tracing::error!(error = %e, url = %current, "Failed to download from URL");
                StorageError::DownloadFailed(format!("Failed to download from URL: {}", e))
            })?;

            if !response.status().is_redirection() {
                return Ok(response);
            }

            let next = redirect_target(&current, &response)?;
            tracing::debug!(from = %current, to = %next, "Following redirect");
            current = check_url(next.as_str(), &self.url_policy).await?;
        }

        Err(StorageError::DownloadFailed(format!(
            "Too many redirects (max: {})",
            MAX_REDIRECTS
        )))
    }

    async fn read_capped(&self, mut response: reqwest::Response) -> StorageResult<Bytes> {
        if let Some(size) = response.content_length() {
            if size > self.max_bytes {
                return Err(StorageError::TooLarge {
                    size,
                    max: self.max_bytes,
                });
            }
        }

        let mut data = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read response body: {}", e))
        })? {
            let size = (data.len() + chunk.len()) as u64;
            if size > self.max_bytes {
                return Err(StorageError::TooLarge {
                    size,
                    max: self.max_bytes,
                });
            }
            data.extend_from_slice(&chunk);
        }

        Ok(data.freeze())
    }
}

fn redirect_target(current: &Url, response: &reqwest::Response) -> StorageResult<Url> {
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            StorageError::DownloadFailed(format!(
                "Redirect ({}) without a usable Location header",
                response.status()
            ))
        })?;

    current
        .join(location)
        .map_err(|e| StorageError::InvalidUrl(format!("{}: {}", location, e)))
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> StorageResult<Bytes> {
        let start = std::time::Instant::now();
        let response = self.send_checked(url).await?;

        if !response.status().is_success() {
            return Err(StorageError::DownloadFailed(format!(
                "URL returned status code: {}",
                response.status()
            )));
        }

        let data = self.read_capped(response).await?;

        tracing::info!(
            url = %url,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote fetch successful"
        );

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn local_fetcher(max_bytes: u64) -> HttpFetcher {
        HttpFetcher::new(
            Duration::from_secs(5),
            max_bytes,
            UrlPolicy {
                allow_private_ips: true,
                allowlist: None,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/photo.gif")
            .with_status(200)
            .with_body(b"GIF89a....")
            .create_async()
            .await;

        let data = local_fetcher(1024)
            .fetch(&format!("{}/photo.gif", server.url()))
            .await
            .unwrap();

        assert_eq!(&data[..6], b"GIF89a");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing.png")
            .with_status(404)
            .create_async()
            .await;

        let result = local_fetcher(1024)
            .fetch(&format!("{}/missing.png", server.url()))
            .await;
        assert!(matches!(result, Err(StorageError::DownloadFailed(m)) if m.contains("404")));
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/big.png")
            .with_status(200)
            .with_body(vec![0u8; 64])
            .create_async()
            .await;

        let result = local_fetcher(16)
            .fetch(&format!("{}/big.png", server.url()))
            .await;
        assert!(matches!(result, Err(StorageError::TooLarge { max: 16, .. })));
    }

    #[tokio::test]
    async fn test_fetch_blocks_private_hosts_by_default() {
        let fetcher =
            HttpFetcher::new(Duration::from_secs(5), 1024, UrlPolicy::default()).unwrap();
        let result = fetcher.fetch("http://127.0.0.1:9/a.png").await;
        assert!(matches!(result, Err(StorageError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_chunked_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stream.png")
            .with_status(200)
            .with_chunked_body(|w| {
                for _ in 0..64 {
                    w.write_all(&[0u8; 1024])?;
                }
                Ok(())
            })
            .create_async()
            .await;

        let result = local_fetcher(16)
            .fetch(&format!("{}/stream.png", server.url()))
            .await;
        assert!(matches!(result, Err(StorageError::TooLarge { max: 16, .. })));
    }

    #[tokio::test]
    async fn test_fetch_follows_allowed_redirect() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/old.gif")
            .with_status(301)
            .with_header("location", "/new.gif")
            .create_async()
            .await;
        server
            .mock("GET", "/new.gif")
            .with_status(200)
            .with_body(b"GIF89a-moved")
            .create_async()
            .await;

        let data = local_fetcher(1024)
            .fetch(&format!("{}/old.gif", server.url()))
            .await
            .unwrap();
        assert_eq!(&data[..], b"GIF89a-moved");
    }

    #[tokio::test]
    async fn test_redirect_target_is_checked_against_allowlist() {
        let mut server = mockito::Server::new_async().await;
        let port = server.socket_address().port();
        let blocked = format!("http://127.0.0.1:{}/secret.gif", port);
        server
            .mock("GET", "/a.gif")
            .with_status(302)
            .with_header("location", &blocked)
            .create_async()
            .await;
        let secret = server
            .mock("GET", "/secret.gif")
            .with_status(200)
            .with_body(b"GIF89a-secret")
            .expect(0)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(
            Duration::from_secs(5),
            1024,
            UrlPolicy {
                allow_private_ips: true,
                allowlist: Some(vec!["localhost".to_string()]),
            },
        )
        .unwrap();

        let result = fetcher
            .fetch(&format!("http://localhost:{}/a.gif", port))
            .await;
        assert!(matches!(result, Err(StorageError::InvalidUrl(m)) if m.contains("127.0.0.1")));
        secret.assert_async().await;
    }

    #[tokio::test]
    async fn test_redirect_loop_gives_up() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/loop.gif")
            .with_status(302)
            .with_header("location", "/loop.gif")
            .create_async()
            .await;

        let result = local_fetcher(1024)
            .fetch(&format!("{}/loop.gif", server.url()))
            .await;
        assert!(matches!(result, Err(StorageError::DownloadFailed(m)) if m.contains("redirects")));
    }
}
