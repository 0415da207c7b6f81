//! Maps a logical [`Scene`] onto the physical screen.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::geometry::{Physical, Point, Rect, RotationAngle, Transform};
use crate::layout::{ButtonRegistry, DrawCommand, Glyph, Rgb, Scene};
use crate::text::{FontSpec, TextMeasurer};

#[derive(Debug, Error)]
pub enum DrawError {
    #[error("no visible glyphs in {0:?}")]
    NoGlyphs(String),
    #[error("failed to load image {}: {reason}", path.display())]
    Image { path: PathBuf, reason: String },
}

/// Drawing primitives in physical pixels.
///
/// Text and images take the session rotation and are rotated about their own
/// centre, so the caller only has to map the anchor.
pub trait DrawingBackend: TextMeasurer {
    fn fill_rect(&mut self, rect: Rect<Physical>, color: Rgb);

    fn plot_points(&mut self, points: &[Point<Physical>], color: Rgb);

    fn draw_text(
        &mut self,
        font: &FontSpec,
        text: &str,
        center: Point<Physical>,
        color: Rgb,
        rotation: RotationAngle,
    ) -> Result<(), DrawError>;

    fn draw_image(
        &mut self,
        path: &Path,
        rect: Rect<Physical>,
        rotation: RotationAngle,
    ) -> Result<(), DrawError>;

    /// Filled rectangle with its corners cut along the 45 degree points of
    /// the corner arcs, built from five plain rectangles.
    fn fill_rounded_rect(&mut self, rect: Rect<Physical>, radius: i32, color: Rgb) {
        let r = radius.clamp(0, rect.width.min(rect.height) / 2);
        if r == 0 {
            self.fill_rect(rect, color);
            return;
        }
        // Inset of the 45 degree point of a corner arc.
        let s = r - (r as f32 * std::f32::consts::FRAC_1_SQRT_2).round() as i32;
        let Rect {
            x,
            y,
            width: w,
            height: h,
            ..
        } = rect;

        self.fill_rect(Rect::new(x, y + r, w, h - 2 * r), color);
        self.fill_rect(Rect::new(x + r, y, w - 2 * r, r), color);
        self.fill_rect(Rect::new(x + r, y + h - r, w - 2 * r, r), color);
        self.fill_rect(Rect::new(x + s, y + s, w - 2 * s, r - s), color);
        self.fill_rect(Rect::new(x + s, y + h - r, w - 2 * s, r - s), color);
    }

    /// Midpoint circle, one ring per pixel of `thickness` growing outward.
    fn draw_circle_outline(
        &mut self,
        center: Point<Physical>,
        radius: i32,
        thickness: i32,
        color: Rgb,
    ) {
        let points = circle_points(center, radius, thickness);
        self.plot_points(&points, color);
    }
}

pub(crate) fn circle_points(
    center: Point<Physical>,
    radius: i32,
    thickness: i32,
) -> Vec<Point<Physical>> {
    let (cx, cy) = (center.x, center.y);
    let mut points = Vec::new();

    for ring in 0..thickness.max(1) {
        let mut x = radius + ring;
        let mut y = 0;
        let mut decision = 1 - x;

        while x >= y {
            for (dx, dy) in [
                (x, y),
                (y, x),
                (-y, x),
                (-x, y),
                (-x, -y),
                (-y, -x),
                (y, -x),
                (x, -y),
            ] {
                points.push(Point::new(cx + dx, cy + dy));
            }

            y += 1;
            if decision <= 0 {
                decision += 2 * y + 1;
            } else {
                x -= 1;
                decision += 2 * (y - x) + 1;
            }
        }
    }
    points
}

/// Draws scenes through one session [`Transform`].
pub struct SceneRenderer {
    transform: Transform,
}

impl SceneRenderer {
    pub fn new(transform: Transform) -> Self {
        Self { transform }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Draws `scene` and returns where its buttons ended up on screen.
    pub fn render(
        &self,
        scene: &Scene,
        backend: &mut (impl DrawingBackend + ?Sized),
    ) -> ButtonRegistry<Physical> {
        let physical = self.transform.physical();
        let rotation = self.transform.rotation();

        backend.fill_rect(
            Rect::new(0, 0, physical.w(), physical.h()),
            scene.background,
        );

        for command in &scene.commands {
            match command {
                DrawCommand::RoundedRect {
                    rect,
                    radius,
                    color,
                } => {
                    backend.fill_rounded_rect(self.transform.map_rect(*rect), *radius, *color);
                }
                DrawCommand::CircleOutline { thickness, color } => {
                    let center = Point::new(physical.w() / 2, physical.h() / 2);
                    let radius = physical.min_side() / 2 + 1;
                    backend.draw_circle_outline(center, radius, *thickness, *color);
                }
                DrawCommand::Cover {
                    rect,
                    radius,
                    background,
                    image,
                    placeholder,
                } => {
                    let target = self.transform.map_rect(*rect);
                    backend.fill_rounded_rect(target, *radius, *background);

                    let drawn = match image {
                        Some(path) => match backend.draw_image(path, target, rotation) {
                            Ok(()) => true,
                            Err(err) => {
                                debug!("Cover falls back to placeholder: {err}");
                                false
                            }
                        },
                        None => false,
                    };
                    if !drawn {
                        self.glyph(backend, placeholder, target.center());
                    }
                }
                DrawCommand::TextLine {
                    center,
                    text,
                    font,
                    color,
                } => {
                    if text.is_empty() {
                        continue;
                    }
                    let center = self.transform.map_point(*center);
                    if let Err(err) = backend.draw_text(font, text, center, *color, rotation) {
                        warn!("Skipping text '{text}': {err}");
                    }
                }
            }
        }

        let mut registry = ButtonRegistry::new();
        for (id, rect) in scene.buttons.iter() {
            registry.insert(id, self.transform.map_rect(*rect));
        }
        registry
    }

    fn glyph(
        &self,
        backend: &mut (impl DrawingBackend + ?Sized),
        glyph: &Glyph,
        center: Point<Physical>,
    ) {
        let rotation = self.transform.rotation();
        if let Err(err) = backend.draw_text(&glyph.font, glyph.text, center, glyph.color, rotation)
        {
            warn!("Skipping placeholder glyph: {err}");
        }
    }
}
