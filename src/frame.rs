//! The per-frame cycle of the now playing screen.
//!
//! Pointer events are resolved against the buttons drawn in the previous
//! frame, then the next frame is laid out from the latest track and drawn.

use audiocontrol_client::TrackInfo;
use tracing::{debug, info};

use crate::display::Viewport;
use crate::geometry::Physical;
use crate::input::{InputMapper, PointerEvent};
use crate::layout::{
    ButtonId, ButtonRegistry, DisplayOptions, LayoutMode, NowPlayingSnapshot, build_scene,
};
use crate::render::{DrawingBackend, SceneRenderer};
use crate::sources::{CoverArtResolver, NowPlayingProvider};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiAction {
    Previous,
    PlayPause,
    Next,
    ToggleLike,
}

impl From<ButtonId> for UiAction {
    fn from(id: ButtonId) -> Self {
        match id {
            ButtonId::Previous => UiAction::Previous,
            ButtonId::PlayPause => UiAction::PlayPause,
            ButtonId::Next => UiAction::Next,
            ButtonId::Like => UiAction::ToggleLike,
        }
    }
}

/// Which buttons the screen offers, fixed for the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonVisibility {
    pub controls: bool,
    pub like: bool,
}

impl Default for ButtonVisibility {
    fn default() -> Self {
        Self {
            controls: true,
            like: true,
        }
    }
}

pub struct NowPlayingScreen {
    mode: LayoutMode,
    renderer: SceneRenderer,
    input: InputMapper,
    options: DisplayOptions,
    buttons: ButtonVisibility,
    liked: bool,
    registry: ButtonRegistry<Physical>,
}

impl NowPlayingScreen {
    pub fn new(
        viewport: Viewport,
        options: DisplayOptions,
        buttons: ButtonVisibility,
        liked: bool,
    ) -> Self {
        Self {
            mode: viewport.mode,
            renderer: SceneRenderer::new(viewport.transform),
            input: InputMapper::new(viewport.transform),
            options,
            buttons,
            liked,
            registry: ButtonRegistry::new(),
        }
    }

    pub fn liked(&self) -> bool {
        self.liked
    }

    /// Buttons as drawn by the last frame, in screen pixels.
    #[cfg(test)]
    pub fn registry(&self) -> &ButtonRegistry<Physical> {
        &self.registry
    }

    /// Runs one frame and returns the actions the pointer events triggered.
    pub fn frame<B>(
        &mut self,
        events: &[PointerEvent],
        source: &dyn NowPlayingProvider,
        covers: &dyn CoverArtResolver,
        backend: &mut B,
    ) -> Vec<UiAction>
    where
        B: DrawingBackend + ?Sized,
    {
        let actions = self.handle_input(events);

        let track = source.current_track();
        let snapshot = self.snapshot(&track, covers);
        let scene = build_scene(
            self.mode,
            self.renderer.transform().logical(),
            &snapshot,
            &self.options,
            &*backend,
        );
        self.registry = self.renderer.render(&scene, backend);

        actions
    }

    /// Resolves `events` against the previous frame's buttons and applies
    /// the resulting actions.
    pub fn handle_input(&mut self, events: &[PointerEvent]) -> Vec<UiAction> {
        let actions: Vec<UiAction> = events
            .iter()
            .filter_map(|event| self.input.resolve(*event, &self.registry))
            .map(UiAction::from)
            .collect();
        for action in &actions {
            self.process_action(*action);
        }
        actions
    }

    fn process_action(&mut self, action: UiAction) {
        match action {
            UiAction::ToggleLike => {
                self.liked = !self.liked;
                info!("Liked: {}", self.liked);
            }
            UiAction::Previous | UiAction::PlayPause | UiAction::Next => {
                info!("Button pressed: {action:?}");
            }
        }
    }

    pub fn snapshot(&self, track: &TrackInfo, covers: &dyn CoverArtResolver) -> NowPlayingSnapshot {
        if let Some(error) = &track.error {
            debug!("Showing empty track, last poll failed: {error}");
        }
        NowPlayingSnapshot {
            title: track.title.clone(),
            artist: track.artist.clone(),
            cover_image_path: covers.local_path_for(track.cover_url.as_deref()),
            liked: self.liked,
            controls_visible: self.buttons.controls,
            like_button_visible: self.buttons.like,
            playing: track.is_playing(),
        }
    }
}
