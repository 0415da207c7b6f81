//! Scene construction in the un-rotated logical space.
//!
//! [`build_scene`] is the single entry point: every layout mode runs the same
//! builder, parameterised by the [`profile::ModeProfile`] table. The resulting
//! [`Scene`] is a flat list of draw commands plus the button regions, ready
//! for [`crate::render::SceneRenderer`].

mod profile;

use std::path::PathBuf;

use crate::geometry::{Dimensions, Logical, Point, Rect};
use crate::text::{FontSpec, TextMeasurer, truncate_with_ellipsis, wrap_and_cap};

use profile::{ArtistOffset, ModeProfile, RowY, TextFit};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
    Landscape,
    Portrait,
    Circle,
    CircleLarge,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Draw every button in the same neutral grey.
    pub monochrome: bool,
    /// Icons only, tinted with the button colour, no rounded background.
    pub minimal_buttons: bool,
}

/// Everything one frame needs to know about the current track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NowPlayingSnapshot {
    pub title: String,
    pub artist: String,
    pub cover_image_path: Option<PathBuf>,
    pub liked: bool,
    pub controls_visible: bool,
    pub like_button_visible: bool,
    pub playing: bool,
}

impl Default for NowPlayingSnapshot {
    fn default() -> Self {
        Self {
            title: String::new(),
            artist: String::new(),
            cover_image_path: None,
            liked: false,
            controls_visible: true,
            like_button_visible: true,
            playing: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ButtonId {
    Previous,
    PlayPause,
    Next,
    Like,
}

impl ButtonId {
    pub const ALL: [ButtonId; 4] = [
        ButtonId::Previous,
        ButtonId::PlayPause,
        ButtonId::Next,
        ButtonId::Like,
    ];
}

/// Named interactive regions in one coordinate space, in drawing order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonRegistry<S> {
    entries: Vec<(ButtonId, Rect<S>)>,
}

impl<S> Default for ButtonRegistry<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<S> ButtonRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `rect` for `id`, replacing any earlier region for it.
    pub fn insert(&mut self, id: ButtonId, rect: Rect<S>) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = rect,
            None => self.entries.push((id, rect)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, id: ButtonId) -> Option<&Rect<S>> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, rect)| rect)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ButtonId, &Rect<S>)> {
        self.entries.iter().map(|(id, rect)| (*id, rect))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub const BACKGROUND: Rgb = Rgb::new(240, 240, 240);
pub const TITLE_COLOR: Rgb = Rgb::new(30, 30, 30);
pub const ARTIST_COLOR: Rgb = Rgb::new(100, 100, 100);
const COVER_BACKGROUND: Rgb = Rgb::new(100, 100, 100);
const PLACEHOLDER_COLOR: Rgb = Rgb::new(200, 200, 200);
const COVER_RADIUS: i32 = 20;
const OUTLINE_THICKNESS: i32 = 2;
const MINIMAL_ICON_SCALE: f32 = 1.5;

pub const GLYPH_PREVIOUS: &str = "⏮";
pub const GLYPH_NEXT: &str = "⏭";
pub const GLYPH_PLAY: &str = "▶";
pub const GLYPH_PAUSE: &str = "⏸";
pub const GLYPH_LIKED: &str = "♥";
pub const GLYPH_NOT_LIKED: &str = "♡";
pub const GLYPH_ALBUM: &str = "🎵";

/// A single pre-styled glyph, used where an image may be missing.
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub text: &'static str,
    pub font: FontSpec,
    pub color: Rgb,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    RoundedRect {
        rect: Rect<Logical>,
        radius: i32,
        color: Rgb,
    },
    /// Outline of the round screen. Anchored to the physical screen, so it
    /// carries no logical geometry.
    CircleOutline { thickness: i32, color: Rgb },
    /// Cover art: the rounded background is always drawn, then the image,
    /// or `placeholder` centred when there is no usable image.
    Cover {
        rect: Rect<Logical>,
        radius: i32,
        background: Rgb,
        image: Option<PathBuf>,
        placeholder: Glyph,
    },
    TextLine {
        center: Point<Logical>,
        text: String,
        font: FontSpec,
        color: Rgb,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub background: Rgb,
    pub commands: Vec<DrawCommand>,
    pub buttons: ButtonRegistry<Logical>,
}

impl Scene {
    fn new(background: Rgb) -> Self {
        Self {
            background,
            commands: Vec::new(),
            buttons: ButtonRegistry::new(),
        }
    }

    fn text(&mut self, center: Point<Logical>, text: &str, font: FontSpec, color: Rgb) {
        if text.is_empty() {
            return;
        }
        self.commands.push(DrawCommand::TextLine {
            center,
            text: text.to_string(),
            font,
            color,
        });
    }
}

pub fn button_color(id: ButtonId, options: &DisplayOptions) -> Rgb {
    if options.monochrome {
        return Rgb::new(80, 80, 80);
    }
    match id {
        ButtonId::Previous | ButtonId::Next => Rgb::new(60, 60, 60),
        ButtonId::PlayPause => Rgb::new(30, 150, 30),
        ButtonId::Like => Rgb::new(200, 50, 50),
    }
}

fn button_glyph(id: ButtonId, snapshot: &NowPlayingSnapshot) -> &'static str {
    match id {
        ButtonId::Previous => GLYPH_PREVIOUS,
        ButtonId::Next => GLYPH_NEXT,
        ButtonId::PlayPause if snapshot.playing => GLYPH_PAUSE,
        ButtonId::PlayPause => GLYPH_PLAY,
        ButtonId::Like if snapshot.liked => GLYPH_LIKED,
        ButtonId::Like => GLYPH_NOT_LIKED,
    }
}

fn visible_buttons(snapshot: &NowPlayingSnapshot) -> Vec<ButtonId> {
    let mut buttons = Vec::with_capacity(4);
    if snapshot.controls_visible {
        buttons.extend([ButtonId::Previous, ButtonId::PlayPause, ButtonId::Next]);
    }
    if snapshot.like_button_visible {
        buttons.push(ButtonId::Like);
    }
    buttons
}

/// Lays out one frame of the now playing screen on a logical `canvas`.
pub fn build_scene(
    mode: LayoutMode,
    canvas: Dimensions,
    snapshot: &NowPlayingSnapshot,
    options: &DisplayOptions,
    measurer: &(impl TextMeasurer + ?Sized),
) -> Scene {
    let profile = ModeProfile::for_mode(mode);
    let frame = profile.shape.frame(canvas);
    let mut scene = Scene::new(BACKGROUND);

    if frame.outline {
        scene.commands.push(DrawCommand::CircleOutline {
            thickness: OUTLINE_THICKNESS,
            color: Rgb::BLACK,
        });
    }

    scene.commands.push(DrawCommand::Cover {
        rect: frame.cover,
        radius: COVER_RADIUS,
        background: COVER_BACKGROUND,
        image: snapshot.cover_image_path.clone(),
        placeholder: Glyph {
            text: GLYPH_ALBUM,
            font: FontSpec::symbol(frame.cover.width as f32 * 0.4),
            color: PLACEHOLDER_COLOR,
        },
    });

    let center_x = frame.column_center();

    let title_pitch = profile.title_pitch.resolve(measurer, &profile.title_font);
    let title_lines = wrap_and_cap(
        measurer,
        &profile.title_font,
        &snapshot.title,
        frame.text_width,
        profile.title_lines,
    );
    for (i, line) in title_lines.iter().enumerate() {
        let y = frame.title_y + i as i32 * title_pitch;
        scene.text(Point::new(center_x, y), line, profile.title_font, TITLE_COLOR);
    }
    // An empty title still occupies one line so nothing below it moves.
    let title_slots = title_lines.len().max(1) as i32;

    let artist_y = frame.title_y
        + (title_slots - 1) * title_pitch
        + match profile.artist_offset {
            ArtistOffset::Fixed(offset) => offset,
            ArtistOffset::AfterLine(gap) => title_pitch + gap,
        };
    let artist_pitch = profile.artist_pitch.resolve(measurer, &profile.artist_font);
    let artist_lines = match profile.artist_fit {
        TextFit::Wrap { max_lines } => wrap_and_cap(
            measurer,
            &profile.artist_font,
            &snapshot.artist,
            frame.text_width,
            max_lines,
        ),
        TextFit::Truncate => vec![truncate_with_ellipsis(
            measurer,
            &profile.artist_font,
            snapshot.artist.trim(),
            frame.text_width,
        )],
    };
    for (i, line) in artist_lines.iter().enumerate() {
        let y = artist_y + i as i32 * artist_pitch;
        scene.text(Point::new(center_x, y), line, profile.artist_font, ARTIST_COLOR);
    }

    let metrics = profile.buttons.resolve(canvas.min_side());
    let row_y = match frame.row_y {
        RowY::At(y) => y,
        RowY::BottomAt(bottom) => bottom - metrics.size,
        RowY::BelowTitle(gap) => frame.title_y + title_slots * title_pitch + gap,
    };

    let buttons = visible_buttons(snapshot);
    let count = buttons.len() as i32;
    let row_width = count * metrics.size + (count - 1).max(0) * metrics.spacing;
    let mut x = frame.column_x + (frame.column_width - row_width) / 2;

    for id in buttons {
        let rect = Rect::square(x, row_y, metrics.size);
        let color = button_color(id, options);
        let glyph = button_glyph(id, snapshot);

        if options.minimal_buttons {
            let font = FontSpec::symbol(metrics.icon * MINIMAL_ICON_SCALE);
            scene.text(rect.center(), glyph, font, color);
        } else {
            scene.commands.push(DrawCommand::RoundedRect {
                rect,
                radius: metrics.radius,
                color,
            });
            scene.text(rect.center(), glyph, FontSpec::symbol(metrics.icon), Rgb::WHITE);
        }

        scene.buttons.insert(id, rect);
        x += metrics.size + metrics.spacing;
    }

    scene
}
