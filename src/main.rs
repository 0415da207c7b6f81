mod backend;
mod config;
mod display;
mod frame;
mod geometry;
mod input;
mod layout;
mod render;
mod sources;
#[cfg(test)]
mod testing;
mod text;

use audiocontrol_client::cover_art::CoverArtCache;
use audiocontrol_client::{AudioControlClient, TrackInfo};
use clap::Parser;
use eframe::{NativeOptions, egui};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::backend::{EguiBackend, FontSet, TextureCache};
use crate::config::{Cli, Settings};
use crate::display::Viewport;
use crate::frame::NowPlayingScreen;
use crate::geometry::Dimensions;
use crate::sources::{CoverArtResolver, DemoSource, NowPlayingProvider};

fn main() -> eframe::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.debug { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = match Settings::load(&cli) {
        Ok(settings) => {
            info!("Configuration loaded successfully");
            debug!("Effective settings: {settings:?}");
            settings
        }
        Err(err) => {
            error!("{err:#}");
            std::process::exit(2);
        }
    };

    // Tokio runtime for polling and cover downloads
    let tokio_rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            error!("Failed to create tokio runtime: {err}");
            std::process::exit(1);
        }
    };

    let feed = if settings.demo {
        info!("Demo mode, not contacting {}", settings.api_url);
        Feed::Demo(DemoSource::new())
    } else {
        let client = match AudioControlClient::new(&settings.api_url) {
            Ok(client) => client,
            Err(err) => {
                error!("{err:#}");
                std::process::exit(1);
            }
        };
        let covers = match CoverArtCache::new(None) {
            Ok(cache) => Some(cache),
            Err(err) => {
                warn!("Cover art disabled: {err:#}");
                None
            }
        };
        let track = client.start(tokio_rt.handle(), settings.poll_interval, covers.clone());
        Feed::Live { track, covers }
    };

    let viewport = egui::ViewportBuilder::default()
        .with_title("Now Playing")
        .with_inner_size([1280.0, 720.0])
        .with_fullscreen(!settings.windowed);
    let options = NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Now Playing",
        options,
        Box::new(move |cc| {
            // Layout works in pixels, so one point must be one pixel.
            cc.egui_ctx.set_pixels_per_point(1.0);
            let fonts = FontSet::install(&cc.egui_ctx);

            // Wake the UI whenever the poller publishes a new track.
            if let Feed::Live { track, .. } = &feed {
                let mut changes = track.clone();
                let ctx = cc.egui_ctx.clone();
                tokio_rt.spawn(async move {
                    while changes.changed().await.is_ok() {
                        ctx.request_repaint();
                    }
                    debug!("Now playing channel closed");
                });
            }

            Ok(Box::new(NowPlayingApp {
                settings,
                feed,
                fonts,
                textures: TextureCache::default(),
                screen: None,
                _tokio_rt: tokio_rt,
            }))
        }),
    )
}

// ---------------------------------------------------------------------------
// Track sources
// ---------------------------------------------------------------------------

enum Feed {
    Demo(DemoSource),
    Live {
        track: watch::Receiver<TrackInfo>,
        covers: Option<CoverArtCache>,
    },
}

impl Feed {
    fn source(&self) -> &dyn NowPlayingProvider {
        match self {
            Feed::Demo(demo) => demo,
            Feed::Live { track, .. } => track,
        }
    }

    fn covers(&self) -> &dyn CoverArtResolver {
        match self {
            Feed::Demo(demo) => demo,
            Feed::Live { covers, .. } => covers,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

struct NowPlayingApp {
    settings: Settings,
    feed: Feed,
    fonts: FontSet,
    textures: TextureCache,
    /// Built on the first frame, once the screen size is known, and rebuilt
    /// when it changes.
    screen: Option<(Dimensions, NowPlayingScreen)>,
    _tokio_rt: tokio::runtime::Runtime,
}

impl NowPlayingApp {
    fn ensure_screen(&mut self, physical: Dimensions) -> Result<(), display::SetupError> {
        if matches!(&self.screen, Some((size, _)) if *size == physical) {
            return Ok(());
        }
        let liked = self
            .screen
            .as_ref()
            .map_or(self.settings.liked, |(_, screen)| screen.liked());
        let viewport = Viewport::resolve(physical, self.settings.rotation, self.settings.request)?;
        self.screen = Some((
            physical,
            NowPlayingScreen::new(
                viewport,
                self.settings.options,
                self.settings.buttons,
                liked,
            ),
        ));
        Ok(())
    }
}

impl eframe::App for NowPlayingApp {
    // Required by eframe 0.34; rendering stays in `update`, which eframe still calls each frame.
    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape) || i.key_pressed(egui::Key::Q)) {
            info!("Quit requested");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let physical = Dimensions::new(
                    rect.width().round() as u32,
                    rect.height().round() as u32,
                );
                if let Err(err) = self.ensure_screen(physical) {
                    error!("{err}");
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    return;
                }
                let Some((_, screen)) = self.screen.as_mut() else {
                    return;
                };

                let events = ui.input(|i| backend::pointer_events(&i.events, physical));
                let mut backend =
                    EguiBackend::new(ui.painter().clone(), &self.fonts, &mut self.textures);
                let actions =
                    screen.frame(&events, self.feed.source(), self.feed.covers(), &mut backend);
                if !actions.is_empty() {
                    debug!("Handled {actions:?}");
                }
            });
    }
}
