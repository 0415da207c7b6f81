//! Where the now playing data and cover images come from.

use std::path::PathBuf;

use audiocontrol_client::cover_art::CoverArtCache;
use audiocontrol_client::{PlaybackState, TrackInfo};
use tokio::sync::watch;
use tracing::{debug, warn};

const DEMO_COVER: &str = "demo_cover.jpg";
const SYSTEM_RESOURCE_DIR: &str = "/usr/share/nowplaying-sdl";

pub trait NowPlayingProvider {
    /// Latest complete track info.
    fn current_track(&self) -> TrackInfo;
}

pub trait CoverArtResolver {
    /// Local image for a cover URL. Must not block on the network.
    fn local_path_for(&self, url: Option<&str>) -> Option<PathBuf>;
}

impl NowPlayingProvider for watch::Receiver<TrackInfo> {
    fn current_track(&self) -> TrackInfo {
        self.borrow().clone()
    }
}

impl CoverArtResolver for CoverArtCache {
    fn local_path_for(&self, url: Option<&str>) -> Option<PathBuf> {
        self.cached_path(url)
    }
}

impl<T: CoverArtResolver> CoverArtResolver for Option<T> {
    fn local_path_for(&self, url: Option<&str>) -> Option<PathBuf> {
        self.as_ref()?.local_path_for(url)
    }
}

/// Fixed track for trying the display without an AudioControl server.
#[derive(Clone, Debug)]
pub struct DemoSource {
    cover: Option<PathBuf>,
}

impl DemoSource {
    pub fn new() -> Self {
        let cover = find_resource(DEMO_COVER);
        if cover.is_none() {
            warn!("Demo cover {DEMO_COVER} not found, showing placeholder");
        }
        Self::with_cover(cover)
    }

    pub fn with_cover(cover: Option<PathBuf>) -> Self {
        Self { cover }
    }
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl NowPlayingProvider for DemoSource {
    fn current_track(&self) -> TrackInfo {
        TrackInfo {
            title: "Never Gonna Give You Up".to_string(),
            artist: "Rick Astley".to_string(),
            album: "Whenever You Need Somebody".to_string(),
            cover_url: self
                .cover
                .as_ref()
                .map(|path| path.to_string_lossy().into_owned()),
            state: PlaybackState::Playing,
            ..Default::default()
        }
    }
}

impl CoverArtResolver for DemoSource {
    fn local_path_for(&self, _url: Option<&str>) -> Option<PathBuf> {
        self.cover.clone()
    }
}

/// Looks for a bundled resource beside the executable, in `assets/` and in
/// the system data directory, in that order.
pub fn find_resource(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
    {
        candidates.push(dir.join(name));
    }
    candidates.push(PathBuf::from("assets").join(name));
    candidates.push(PathBuf::from(SYSTEM_RESOURCE_DIR).join(name));

    let found = candidates.into_iter().find(|path| path.is_file());
    debug!("Resource {name} resolved to {found:?}");
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_track() {
        let demo = DemoSource::with_cover(Some(PathBuf::from("/tmp/demo_cover.jpg")));
        let track = demo.current_track();
        assert_eq!(track.title, "Never Gonna Give You Up");
        assert_eq!(track.artist, "Rick Astley");
        assert!(track.is_playing());
        assert_eq!(
            demo.local_path_for(track.cover_url.as_deref()),
            Some(PathBuf::from("/tmp/demo_cover.jpg"))
        );
    }

    #[test]
    fn test_demo_without_cover() {
        let demo = DemoSource::with_cover(None);
        assert_eq!(demo.current_track().cover_url, None);
        assert_eq!(demo.local_path_for(None), None);
    }

    #[test]
    fn test_missing_resolver_has_no_covers() {
        let covers: Option<DemoSource> = None;
        assert_eq!(covers.local_path_for(Some("http://covers/a.jpg")), None);

        let covers = Some(DemoSource::with_cover(Some(PathBuf::from("/tmp/a.jpg"))));
        assert_eq!(covers.local_path_for(None), Some(PathBuf::from("/tmp/a.jpg")));
    }

    #[test]
    fn test_watch_receiver_sees_latest_value() {
        let (sender, receiver) = watch::channel(TrackInfo::default());
        assert_eq!(receiver.current_track(), TrackInfo::default());

        sender.send_replace(TrackInfo {
            title: "Together Forever".to_string(),
            ..Default::default()
        });
        sender.send_replace(TrackInfo {
            title: "Cry for Help".to_string(),
            ..Default::default()
        });
        assert_eq!(receiver.current_track().title, "Cry for Help");
    }

    #[test]
    fn test_missing_resource() {
        assert_eq!(find_resource("definitely-not-a-bundled-resource.bin"), None);
    }
}
