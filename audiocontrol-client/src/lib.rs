//! Client for the [AudioControl] REST API, made for now playing displays.
//!
//! It polls the `now-playing` and `players` endpoints on a tokio runtime,
//! normalises the answers into a [`TrackInfo`] and publishes every change
//! through a [`tokio::sync::watch`] channel. Readers always get a complete
//! value, never a half updated one. Cover art can be prefetched into a
//! [`cover_art::CoverArtCache`] so the display never waits for the network.
//!
//! [AudioControl]: https://github.com/hifiberry/audiocontrol

pub mod cover_art;

use std::time::Duration;

use anyhow::{Context, Error};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::cover_art::CoverArtCache;

pub const DEFAULT_API_URL: &str = "http://localhost:1080/api";
pub const USER_AGENT: &str = "NowPlayingSDL/1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Playback state as reported by the API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
    #[default]
    Unknown,
    /// The last poll failed, see [`TrackInfo::error`].
    Error,
}

impl PlaybackState {
    fn parse(state: &str) -> Self {
        match state.to_ascii_lowercase().as_str() {
            "playing" => PlaybackState::Playing,
            "paused" => PlaybackState::Paused,
            "stopped" => PlaybackState::Stopped,
            _ => PlaybackState::Unknown,
        }
    }
}

/// One normalised now playing answer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackInfo {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub cover_url: Option<String>,
    pub state: PlaybackState,
    pub position: Option<f64>,
    pub duration: Option<f64>,
    pub player_name: Option<String>,
    pub error: Option<String>,
}

impl TrackInfo {
    /// Empty track carrying only the reason why nothing could be fetched.
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            state: PlaybackState::Error,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    fn from_responses(now_playing: NowPlayingResponse, players: Option<PlayersResponse>) -> Self {
        let song = now_playing.song.unwrap_or_default();
        let cover_url = [song.cover_art_url, song.cover_url, song.art_url]
            .into_iter()
            .flatten()
            .find(|url| !url.is_empty());
        let player_name = players.and_then(|players| {
            players
                .players
                .into_iter()
                .find(|player| {
                    matches!(
                        player.state.as_deref().map(PlaybackState::parse),
                        Some(PlaybackState::Playing | PlaybackState::Paused)
                    )
                })
                .and_then(|player| player.name)
        });

        Self {
            title: song.title.unwrap_or_default(),
            artist: song.artist.unwrap_or_default(),
            album: song.album.unwrap_or_default(),
            cover_url,
            state: now_playing
                .state
                .as_deref()
                .map_or(PlaybackState::Unknown, PlaybackState::parse),
            position: now_playing.position,
            duration: song.duration,
            player_name,
            error: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct NowPlayingResponse {
    #[serde(default)]
    song: Option<Song>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    position: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Song {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    album: Option<String>,
    #[serde(default)]
    cover_art_url: Option<String>,
    #[serde(default, rename = "coverUrl")]
    cover_url: Option<String>,
    #[serde(default, rename = "artUrl")]
    art_url: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct PlayersResponse {
    #[serde(default)]
    players: Vec<Player>,
}

#[derive(Debug, Deserialize)]
struct Player {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

/// HTTP access to one AudioControl instance.
#[derive(Clone, Debug)]
pub struct AudioControlClient {
    http: reqwest::Client,
    api_url: String,
}

impl AudioControlClient {
    pub fn new(api_url: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Could not create HTTP client")?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Polls once. Failures are folded into an error [`TrackInfo`].
    pub async fn fetch(&self) -> TrackInfo {
        let now_playing = match self.get_json::<NowPlayingResponse>("now-playing").await {
            Ok(now_playing) => now_playing,
            Err(err) => {
                error!("Could not fetch now playing: {err:#}");
                return TrackInfo::from_error(format!("{err:#}"));
            }
        };
        let players = match self.get_json::<PlayersResponse>("players").await {
            Ok(players) => Some(players),
            Err(err) => {
                debug!("Could not fetch player info: {err:#}");
                None
            }
        };
        TrackInfo::from_responses(now_playing, players)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, Error> {
        let url = format!("{}/{endpoint}", self.api_url);
        debug!("Fetching {url}");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Connection error for {url}"))?
            .error_for_status()
            .with_context(|| format!("HTTP error for {url}"))?;
        let body = response
            .text()
            .await
            .with_context(|| format!("Could not read response from {url}"))?;
        serde_json::from_str(&body).with_context(|| format!("Invalid JSON response from {url}"))
    }

    /// Starts polling every `interval` on `runtime`. The first poll runs
    /// right away. Covers of new tracks are downloaded into `covers` before
    /// the track is published. Polling stops once every receiver is dropped.
    pub fn start(
        self,
        runtime: &Handle,
        interval: Duration,
        covers: Option<CoverArtCache>,
    ) -> watch::Receiver<TrackInfo> {
        let (sender, receiver) = watch::channel(TrackInfo::default());
        info!(
            "Polling AudioControl API {} every {:?}",
            self.api_url, interval
        );

        runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if sender.is_closed() {
                    debug!("No more now playing readers, stop polling");
                    break;
                }

                let track = self.fetch().await;
                let mut cover_arrived = false;
                if let (Some(cache), Some(url)) = (&covers, track.cover_url.as_deref()) {
                    if cache.cached_path(Some(url)).is_none() {
                        match cache.fetch(url).await {
                            Ok(_) => cover_arrived = true,
                            Err(err) => warn!("Could not download cover art from {url}: {err:#}"),
                        }
                    }
                }

                publish(&sender, track, cover_arrived);
            }
        });

        receiver
    }
}

/// Hands `track` to the readers when it differs from the current one, or
/// when its cover has just been downloaded. Returns whether readers were
/// notified.
fn publish(sender: &watch::Sender<TrackInfo>, track: TrackInfo, cover_arrived: bool) -> bool {
    sender.send_if_modified(|current| {
        if *current != track {
            debug!("Now playing changed: {} - {}", track.artist, track.title);
            *current = track;
            true
        } else if cover_arrived {
            debug!("Cover art ready for {} - {}", track.artist, track.title);
            true
        } else {
            false
        }
    })
}
