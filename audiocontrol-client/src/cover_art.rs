//! On-disk cache for downloaded cover art.
//!
//! Files are named after a hash of their URL, so the cache needs no index and
//! survives restarts for as long as the directory does.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Error};
use tracing::{debug, info};

use crate::USER_AGENT;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);
const CACHE_DIR_NAME: &str = "nowplaying_sdl_cache";

#[derive(Clone, Debug)]
pub struct CoverArtCache {
    dir: PathBuf,
    http: reqwest::Client,
}

impl CoverArtCache {
    /// Cache in `dir`, or in a fixed directory below the system temp dir.
    pub fn new(dir: Option<PathBuf>) -> Result<Self, Error> {
        let dir = dir.unwrap_or_else(|| std::env::temp_dir().join(CACHE_DIR_NAME));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Could not create cover cache {}", dir.display()))?;
        let http = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Could not create HTTP client")?;
        info!("Cover art cache at {}", dir.display());
        Ok(Self { dir, http })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the image for `url` lives once downloaded.
    pub fn path_for(&self, url: &str) -> PathBuf {
        let hash = blake3::hash(url.as_bytes()).to_hex();
        let lower = url.to_ascii_lowercase();
        let extension = if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            ".jpg"
        } else if lower.ends_with(".png") {
            ".png"
        } else {
            ""
        };
        self.dir.join(format!("{hash}{extension}"))
    }

    /// Local file for `url` if it has already been downloaded. Never touches
    /// the network.
    pub fn cached_path(&self, url: Option<&str>) -> Option<PathBuf> {
        let path = self.path_for(url.filter(|url| !url.is_empty())?);
        path.is_file().then_some(path)
    }

    /// Downloads `url` unless it is cached already.
    pub async fn fetch(&self, url: &str) -> Result<PathBuf, Error> {
        let path = self.path_for(url);
        if path.is_file() {
            return Ok(path);
        }

        debug!("Downloading cover art from {url}");
        let bytes = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request for {url} failed"))?
            .error_for_status()
            .with_context(|| format!("Server refused {url}"))?
            .bytes()
            .await
            .with_context(|| format!("Could not read body of {url}"))?;

        // Write next to the target and rename, so readers never see a
        // partially written image.
        let partial = path.with_extension("part");
        tokio::fs::write(&partial, &bytes)
            .await
            .with_context(|| format!("Could not write {}", partial.display()))?;
        tokio::fs::rename(&partial, &path)
            .await
            .with_context(|| format!("Could not move {} into place", path.display()))?;

        debug!("Cached {} bytes as {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Removes every cached image.
    pub fn clear(&self) -> Result<(), Error> {
        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir)
                .with_context(|| format!("Could not remove {}", self.dir.display()))?;
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Could not recreate {}", self.dir.display()))?;
        info!("Cleared cover art cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_cache(name: &str) -> CoverArtCache {
        let dir = std::env::temp_dir().join(format!(
            "audiocontrol-client-test-{}-{name}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        CoverArtCache::new(Some(dir)).unwrap()
    }

    #[test]
    fn test_path_keeps_known_extensions() {
        let cache = scratch_cache("extensions");
        let jpg = cache.path_for("http://covers/a.JPEG");
        let png = cache.path_for("http://covers/b.png");
        let other = cache.path_for("http://covers/art?id=7");

        assert_eq!(jpg.extension().and_then(|e| e.to_str()), Some("jpg"));
        assert_eq!(png.extension().and_then(|e| e.to_str()), Some("png"));
        assert_eq!(other.extension(), None);
        assert!(jpg.starts_with(cache.dir()));
        assert_eq!(cache.path_for("http://covers/b.png"), png);
        assert_ne!(jpg, cache.path_for("http://covers/c.jpeg"));
    }

    #[test]
    fn test_cached_path_only_for_existing_files() {
        let cache = scratch_cache("cached");
        let url = "http://covers/rick.jpg";

        assert_eq!(cache.cached_path(Some(url)), None);
        assert_eq!(cache.cached_path(None), None);
        assert_eq!(cache.cached_path(Some("")), None);

        std::fs::write(cache.path_for(url), b"jpeg").unwrap();
        assert_eq!(cache.cached_path(Some(url)), Some(cache.path_for(url)));

        cache.clear().unwrap();
        assert_eq!(cache.cached_path(Some(url)), None);
        assert!(cache.dir().is_dir());
    }

    #[test]
    fn test_fetch_returns_cached_file_without_network() {
        let cache = scratch_cache("fetch");
        let url = "http://unreachable.invalid/cover.png";
        std::fs::write(cache.path_for(url), b"png").unwrap();

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let path = runtime.block_on(cache.fetch(url)).unwrap();
        assert_eq!(path, cache.path_for(url));
    }

    #[test]
    fn test_fetch_failure_leaves_no_file() {
        let cache = scratch_cache("failure");
        let url = "http://127.0.0.1:9/missing.jpg";

        let runtime = tokio::runtime::Runtime::new().unwrap();
        assert!(runtime.block_on(cache.fetch(url)).is_err());
        assert_eq!(cache.cached_path(Some(url)), None);
    }
}
