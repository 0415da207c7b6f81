//! Deterministic stand-ins for fonts and the screen.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::geometry::{Physical, Point, Rect, RotationAngle};
use crate::layout::Rgb;
use crate::render::{DrawError, DrawingBackend};
use crate::text::{FontSpec, TextMeasurer};

/// Every character advances by the same width regardless of font.
#[derive(Clone, Copy, Debug)]
pub struct MonospaceMeasurer {
    advance: i32,
}

impl MonospaceMeasurer {
    pub fn new(advance: i32) -> Self {
        Self { advance }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn text_width(&self, _font: &FontSpec, text: &str) -> i32 {
        text.chars().count() as i32 * self.advance
    }

    fn line_height(&self, font: &FontSpec) -> i32 {
        (font.size * 1.2) as i32
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    FillRect(Rect<Physical>, Rgb),
    Points(Vec<Point<Physical>>, Rgb),
    Text {
        font: FontSpec,
        text: String,
        center: Point<Physical>,
        color: Rgb,
        rotation: RotationAngle,
    },
    Image {
        path: PathBuf,
        rect: Rect<Physical>,
        rotation: RotationAngle,
    },
}

/// Records every primitive instead of drawing it.
pub struct RecordingBackend {
    pub calls: Vec<Call>,
    measurer: MonospaceMeasurer,
    failing_images: HashSet<PathBuf>,
    failing_texts: HashSet<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            measurer: MonospaceMeasurer::new(20),
            failing_images: HashSet::new(),
            failing_texts: HashSet::new(),
        }
    }

    pub fn fail_image(&mut self, path: impl Into<PathBuf>) {
        self.failing_images.insert(path.into());
    }

    pub fn fail_text(&mut self, text: impl Into<String>) {
        self.failing_texts.insert(text.into());
    }
}

impl TextMeasurer for RecordingBackend {
    fn text_width(&self, font: &FontSpec, text: &str) -> i32 {
        self.measurer.text_width(font, text)
    }

    fn line_height(&self, font: &FontSpec) -> i32 {
        self.measurer.line_height(font)
    }
}

impl DrawingBackend for RecordingBackend {
    fn fill_rect(&mut self, rect: Rect<Physical>, color: Rgb) {
        self.calls.push(Call::FillRect(rect, color));
    }

    fn plot_points(&mut self, points: &[Point<Physical>], color: Rgb) {
        self.calls.push(Call::Points(points.to_vec(), color));
    }

    fn draw_text(
        &mut self,
        font: &FontSpec,
        text: &str,
        center: Point<Physical>,
        color: Rgb,
        rotation: RotationAngle,
    ) -> Result<(), DrawError> {
        if self.failing_texts.contains(text) {
            return Err(DrawError::NoGlyphs(text.to_string()));
        }
        self.calls.push(Call::Text {
            font: *font,
            text: text.to_string(),
            center,
            color,
            rotation,
        });
        Ok(())
    }

    fn draw_image(
        &mut self,
        path: &Path,
        rect: Rect<Physical>,
        rotation: RotationAngle,
    ) -> Result<(), DrawError> {
        self.calls.push(Call::Image {
            path: path.to_path_buf(),
            rect,
            rotation,
        });
        if self.failing_images.contains(path) {
            return Err(DrawError::Image {
                path: path.to_path_buf(),
                reason: "unreadable".to_string(),
            });
        }
        Ok(())
    }
}
