use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Error, bail};
use audiocontrol_client::DEFAULT_API_URL;
use clap::{ArgGroup, Parser};
use serde::Deserialize;
use tracing::{debug, info};

use crate::display::OrientationRequest;
use crate::frame::ButtonVisibility;
use crate::geometry::RotationAngle;
use crate::layout::DisplayOptions;

const CONFIG_FILE_NAME: &str = "nowplaying_sdl.conf";
const SYSTEM_CONFIG: &str = "/etc/nowplaying_sdl.conf";

/// Fullscreen now playing display for AudioControl.
#[derive(Debug, Parser)]
#[command(name = "nowplaying-kiosk", version, about, long_about = None)]
#[command(group(ArgGroup::new("layout").args(["portrait", "landscape", "circle", "circle2"])))]
pub struct Cli {
    /// Read this INI file on top of the system and user configuration.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Force the portrait layout.
    #[arg(long)]
    pub portrait: bool,
    /// Force the landscape layout.
    #[arg(long)]
    pub landscape: bool,
    /// Layout for a round screen.
    #[arg(long)]
    pub circle: bool,
    /// Round screen layout with a larger cover.
    #[arg(long)]
    pub circle2: bool,

    /// How the screen is mounted, in degrees clockwise.
    #[arg(long, value_name = "DEGREES")]
    pub rotation: Option<u16>,

    /// Draw every button in the same grey.
    #[arg(long)]
    pub bw_buttons: bool,
    /// Hide the transport buttons, keeping only like.
    #[arg(long)]
    pub no_control: bool,
    /// Icons without button backgrounds.
    #[arg(long)]
    pub minimal_buttons: bool,
    #[arg(long)]
    pub hide_like_button: bool,
    /// Start with the track liked.
    #[arg(long)]
    pub liked: bool,

    /// Show a fixed demo track instead of polling the API.
    #[arg(long)]
    pub demo: bool,
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
    /// Seconds between polls.
    #[arg(long, value_name = "SECONDS")]
    pub poll_interval: Option<f64>,

    /// Run in a window instead of fullscreen.
    #[arg(long)]
    pub windowed: bool,
    #[arg(long)]
    pub debug: bool,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct NowPlayingSection {
    pub api_url: Option<String>,
    pub poll_interval: Option<f64>,
    pub demo: bool,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplaySection {
    pub rotation: u16,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiSection {
    pub portrait: bool,
    pub landscape: bool,
    pub circle: bool,
    pub circle2: bool,
    pub bw_buttons: bool,
    pub no_control: bool,
    pub minimal_buttons: bool,
    pub hide_like_button: bool,
    pub liked: bool,
}

/// Contents of the layered INI configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    pub nowplaying: NowPlayingSection,
    pub display: DisplaySection,
    pub ui: UiSection,
}

impl FileConfig {
    /// System file, user file, then `explicit`, then `NOWPLAYING_*`
    /// environment variables. Only `explicit` has to exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut optional = vec![PathBuf::from(SYSTEM_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            optional.push(dir.join(CONFIG_FILE_NAME));
        }
        Self::load_from(&optional, explicit)
    }

    fn load_from(
        optional: &[PathBuf],
        explicit: Option<&Path>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("nowplaying.api_url", DEFAULT_API_URL)?
            .set_default("nowplaying.poll_interval", 2.0)?
            .set_default("display.rotation", 0)?;

        for path in optional {
            debug!("Looking for configuration in {}", path.display());
            builder = builder.add_source(
                config::File::from(path.as_path())
                    .format(config::FileFormat::Ini)
                    .required(false),
            );
        }
        if let Some(path) = explicit {
            info!("Reading configuration from {}", path.display());
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Ini)
                    .required(true),
            );
        }

        builder
            .add_source(
                config::Environment::with_prefix("NOWPLAYING")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    fn orientation_request(&self) -> OrientationRequest {
        let ui = &self.ui;
        if ui.circle2 {
            OrientationRequest::CircleLarge
        } else if ui.circle {
            OrientationRequest::Circle
        } else if ui.portrait {
            OrientationRequest::Portrait
        } else if ui.landscape {
            OrientationRequest::Landscape
        } else {
            OrientationRequest::Auto
        }
    }
}

/// Effective settings for one session, command line over file.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub poll_interval: Duration,
    pub demo: bool,
    pub rotation: RotationAngle,
    pub request: OrientationRequest,
    pub options: DisplayOptions,
    pub buttons: ButtonVisibility,
    pub liked: bool,
    pub windowed: bool,
}

impl Settings {
    pub fn load(cli: &Cli) -> Result<Self, Error> {
        let file = FileConfig::load(cli.config.as_deref()).context("Could not load configuration")?;
        Self::merge(cli, &file)
    }

    pub fn merge(cli: &Cli, file: &FileConfig) -> Result<Self, Error> {
        let request = if cli.circle2 {
            OrientationRequest::CircleLarge
        } else if cli.circle {
            OrientationRequest::Circle
        } else if cli.portrait {
            OrientationRequest::Portrait
        } else if cli.landscape {
            OrientationRequest::Landscape
        } else {
            file.orientation_request()
        };

        let rotation = RotationAngle::try_from(cli.rotation.unwrap_or(file.display.rotation))?;

        let poll_interval = cli
            .poll_interval
            .or(file.nowplaying.poll_interval)
            .unwrap_or(2.0);
        if !poll_interval.is_finite() || poll_interval <= 0.0 {
            bail!("poll interval must be a positive number of seconds, got {poll_interval}");
        }

        let api_url = cli
            .api_url
            .clone()
            .or_else(|| file.nowplaying.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let ui = &file.ui;
        Ok(Self {
            api_url,
            poll_interval: Duration::from_secs_f64(poll_interval),
            demo: cli.demo || file.nowplaying.demo,
            rotation,
            request,
            options: DisplayOptions {
                monochrome: cli.bw_buttons || ui.bw_buttons,
                minimal_buttons: cli.minimal_buttons || ui.minimal_buttons,
            },
            buttons: ButtonVisibility {
                controls: !(cli.no_control || ui.no_control),
                like: !(cli.hide_like_button || ui.hide_like_button),
            },
            liked: cli.liked || ui.liked,
            windowed: cli.windowed,
        })
    }
}
