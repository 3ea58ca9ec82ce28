//! Concurrent image downloads into reserved scratch paths.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::io::AsyncWriteExt;

use crate::error::FetchError;

const KNOWN_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp"];
const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// Scratch file name for the image at `index`, keeping a recognised
/// extension from the URL path when there is one.
pub fn image_file_name(index: usize, url: &str) -> String {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .rsplit('/')
        .next()
        .unwrap_or_default();

    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| KNOWN_IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string());

    format!("image_{}.{}", index, ext)
}

/// Downloads source images with bounded concurrency.
#[derive(Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
    concurrency: usize,
    max_image_bytes: u64,
}

impl ImageFetcher {
    pub fn new(client: reqwest::Client, concurrency: usize, max_image_bytes: u64) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
            max_image_bytes,
        }
    }

    /// Download `urls[i]` into `destinations[i]` for every `i`.
    ///
    /// At most `concurrency` downloads are in flight and they complete in any
    /// order. Results come back in request order. The first failure to
    /// complete stops the run and drops every download still in flight.
    #[tracing::instrument(skip(self, urls, destinations), fields(image_count = urls.len()))]
    pub async fn fetch_all(
        &self,
        urls: &[String],
        destinations: &[PathBuf],
    ) -> Result<Vec<PathBuf>, FetchError> {
        debug_assert_eq!(urls.len(), destinations.len());

        let downloads = urls
            .iter()
            .zip(destinations.iter())
            .enumerate()
            .map(|(index, (url, dest))| async move {
                self.fetch_one(index, url, dest).await.map(|path| (index, path))
            })
            .collect::<Vec<_>>();

        let mut completed = stream::iter(downloads).buffer_unordered(self.concurrency);
        let mut paths: Vec<Option<PathBuf>> = vec![None; urls.len()];

        while let Some((index, path)) = completed.try_next().await? {
            paths[index] = Some(path);
        }

        let paths: Vec<PathBuf> = paths.into_iter().flatten().collect();
        tracing::debug!(image_count = paths.len(), "All images downloaded");
        Ok(paths)
    }

    async fn fetch_one(&self, index: usize, url: &str, dest: &Path) -> Result<PathBuf, FetchError> {
        tracing::debug!(index, url = %url, "Downloading image");

        let request_error = |source| FetchError::Request {
            index,
            url: url.to_string(),
            source,
        };
        let too_large = || FetchError::TooLarge {
            index,
            url: url.to_string(),
            limit: self.max_image_bytes,
        };
        let write_error = |source| FetchError::Write {
            index,
            path: dest.to_path_buf(),
            source,
        };

        let mut response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(index, url = %url, status = status.as_u16(), "Image download rejected");
            return Err(FetchError::Status {
                index,
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_image_bytes)
        {
            return Err(too_large());
        }

        let mut file = tokio::fs::File::create(dest).await.map_err(write_error)?;
        let mut written: u64 = 0;

        while let Some(chunk) = response.chunk().await.map_err(request_error)? {
            written += chunk.len() as u64;
            if written > self.max_image_bytes {
                return Err(too_large());
            }
            file.write_all(&chunk).await.map_err(write_error)?;
        }
        file.flush().await.map_err(write_error)?;

        tracing::debug!(index, bytes = written, path = %dest.display(), "Image downloaded");
        Ok(dest.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destinations(dir: &Path, urls: &[String]) -> Vec<PathBuf> {
        urls.iter()
            .enumerate()
            .map(|(i, url)| dir.join(image_file_name(i, url)))
            .collect()
    }

    #[test]
    fn test_image_file_name_extensions() {
        assert_eq!(image_file_name(0, "https://x.test/a/cat.PNG"), "image_0.png");
        assert_eq!(image_file_name(1, "https://x.test/a/dog.webp?w=200"), "image_1.webp");
        assert_eq!(image_file_name(2, "https://x.test/render"), "image_2.jpg");
        assert_eq!(image_file_name(3, "https://x.test/file.exe"), "image_3.jpg");
        assert_eq!(image_file_name(4, "https://x.test/v1.2/photo"), "image_4.jpg");
    }

    #[tokio::test]
    async fn test_fetch_all_preserves_request_order() {
        let mut server = mockito::Server::new_async().await;
        let _a = server
            .mock("GET", "/a.png")
            .with_status(200)
            .with_body("first")
            .create_async()
            .await;
        let _b = server
            .mock("GET", "/b.png")
            .with_status(200)
            .with_body("second")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let urls = vec![
            format!("{}/a.png", server.url()),
            format!("{}/b.png", server.url()),
        ];
        let dests = destinations(dir.path(), &urls);

        let fetcher = ImageFetcher::new(reqwest::Client::new(), 2, 1024);
        let paths = fetcher.fetch_all(&urls, &dests).await.unwrap();

        assert_eq!(paths, dests);
        assert_eq!(std::fs::read(&paths[0]).unwrap(), b"first");
        assert_eq!(std::fs::read(&paths[1]).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_fetch_all_fails_on_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/ok.jpg")
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/missing.jpg")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let urls = vec![
            format!("{}/ok.jpg", server.url()),
            format!("{}/missing.jpg", server.url()),
        ];
        let dests = destinations(dir.path(), &urls);

        let fetcher = ImageFetcher::new(reqwest::Client::new(), 1, 1024);
        let err = fetcher.fetch_all(&urls, &dests).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { index: 1, status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_image() {
        let mut server = mockito::Server::new_async().await;
        let _big = server
            .mock("GET", "/big.jpg")
            .with_status(200)
            .with_body(vec![0u8; 64])
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let urls = vec![format!("{}/big.jpg", server.url())];
        let dests = destinations(dir.path(), &urls);

        let fetcher = ImageFetcher::new(reqwest::Client::new(), 4, 16);
        let err = fetcher.fetch_all(&urls, &dests).await.unwrap_err();

        assert!(matches!(err, FetchError::TooLarge { index: 0, limit: 16, .. }));
    }

    /// Accepts connections and never answers them.
    async fn silent_listener() -> (tokio::net::TcpListener, String) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/slow.jpg", listener.local_addr().unwrap());
        (listener, url)
    }

    #[tokio::test]
    async fn test_first_failure_wins_over_pending_download() {
        let (_listener, slow_url) = silent_listener().await;
        let mut server = mockito::Server::new_async().await;
        let _missing = server
            .mock("GET", "/missing.jpg")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let urls = vec![slow_url, format!("{}/missing.jpg", server.url())];
        let dests = destinations(dir.path(), &urls);

        let fetcher = ImageFetcher::new(reqwest::Client::new(), 2, 1024);
        let err = tokio::time::timeout(
            std::time::Duration::from_secs(3),
            fetcher.fetch_all(&urls, &dests),
        )
        .await
        .expect("failed download should end the batch without waiting for the stalled one")
        .unwrap_err();

        assert!(matches!(err, FetchError::Status { index: 1, status: 404, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        let dir = tempfile::tempdir().unwrap();
        let urls = vec!["http://127.0.0.1:1/nothing.jpg".to_string()];
        let dests = destinations(dir.path(), &urls);

        let fetcher = ImageFetcher::new(reqwest::Client::new(), 1, 1024);
        let err = fetcher.fetch_all(&urls, &dests).await.unwrap_err();

        assert!(matches!(err, FetchError::Request { index: 0, .. }));
    }
}
