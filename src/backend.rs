//! [`DrawingBackend`] on top of an egui [`Painter`].
//!
//! With pixels-per-point forced to 1, egui points are physical pixels, so
//! physical rects go straight into meshes.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use egui::epaint::{TextShape, Vertex};
use egui::{
    Color32, ColorImage, FontData, FontDefinitions, FontFamily, FontId, Mesh, Painter, Pos2,
    Shape, TextureHandle, TextureOptions, TouchPhase, vec2,
};
use tracing::{debug, info, warn};

use crate::geometry::{Dimensions, Physical, Point, Rect, RotationAngle};
use crate::input::PointerEvent;
use crate::layout::Rgb;
use crate::render::{DrawError, DrawingBackend};
use crate::text::{FontFace, FontSpec, TextMeasurer};

const FONT_DIR: &str = "/usr/share/fonts/truetype/dejavu";
const BOLD_FONT: (&str, &str) = ("dejavu-bold", "DejaVuSans-Bold.ttf");
const REGULAR_FONT: (&str, &str) = ("dejavu-regular", "DejaVuSans.ttf");

/// Font families registered with egui for the session.
#[derive(Clone, Debug, Default)]
pub struct FontSet {
    bold: Option<FontFamily>,
    regular: Option<FontFamily>,
}

impl FontSet {
    /// Loads the system DejaVu fonts into `ctx`. Missing files fall back to
    /// egui's built-in proportional font.
    pub fn install(ctx: &egui::Context) -> Self {
        let mut fonts = FontDefinitions::default();
        let fallback = fonts
            .families
            .get(&FontFamily::Proportional)
            .cloned()
            .unwrap_or_default();

        let mut register = |(name, file): (&str, &str)| -> Option<FontFamily> {
            let path = Path::new(FONT_DIR).join(file);
            match std::fs::read(&path) {
                Ok(bytes) => {
                    fonts
                        .font_data
                        .insert(name.into(), Arc::new(FontData::from_owned(bytes)));
                    let family = FontFamily::Name(name.into());
                    let mut chain = vec![name.to_string()];
                    chain.extend(fallback.iter().cloned());
                    fonts.families.insert(family.clone(), chain);
                    info!("Loaded font {}", path.display());
                    Some(family)
                }
                Err(err) => {
                    warn!("Font {} unavailable ({err}), using default", path.display());
                    None
                }
            }
        };

        let set = Self {
            bold: register(BOLD_FONT),
            regular: register(REGULAR_FONT),
        };
        ctx.set_fonts(fonts);
        set
    }

    fn family(&self, face: FontFace) -> FontFamily {
        let family = match face {
            FontFace::Bold => self.bold.as_ref(),
            FontFace::Regular => self.regular.as_ref(),
            FontFace::Symbol => None,
        };
        family.cloned().unwrap_or(FontFamily::Proportional)
    }

    fn font_id(&self, font: &FontSpec) -> FontId {
        FontId::new(font.size, self.family(font.face))
    }
}

/// Cover textures of the current and the previous track. Failed loads are
/// remembered as well, so a broken file is not read again every frame.
#[derive(Default)]
pub struct TextureCache {
    /// Most recently used first.
    textures: VecDeque<(PathBuf, Result<TextureHandle, String>)>,
}

impl TextureCache {
    const CAPACITY: usize = 2;

    fn get(&mut self, ctx: &egui::Context, path: &Path) -> Result<TextureHandle, DrawError> {
        match self.textures.iter().position(|(cached, _)| cached == path) {
            Some(index) => {
                if let Some(entry) = self.textures.remove(index) {
                    self.textures.push_front(entry);
                }
            }
            None => {
                let loaded = load_image_from_path(path).map(|img| {
                    debug!("Loaded cover texture {}", path.display());
                    ctx.load_texture(path.display().to_string(), img, TextureOptions::LINEAR)
                });
                self.textures.push_front((path.to_path_buf(), loaded));
                while self.textures.len() > Self::CAPACITY {
                    if let Some((evicted, _)) = self.textures.pop_back() {
                        debug!("Released cover texture {}", evicted.display());
                    }
                }
            }
        }

        match self.textures.front() {
            Some((_, Ok(texture))) => Ok(texture.clone()),
            Some((_, Err(reason))) => Err(DrawError::Image {
                path: path.to_path_buf(),
                reason: reason.clone(),
            }),
            None => Err(DrawError::Image {
                path: path.to_path_buf(),
                reason: "texture cache is empty".to_string(),
            }),
        }
    }
}

fn load_image_from_path(path: &Path) -> Result<ColorImage, String> {
    let img = image::open(path).map_err(|err| err.to_string())?;
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let pixels = rgba.into_raw();
    Ok(ColorImage::from_rgba_unmultiplied(size, &pixels))
}

fn color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.r, rgb.g, rgb.b)
}

fn egui_rect(rect: Rect<Physical>) -> egui::Rect {
    egui::Rect::from_min_size(
        Pos2::new(rect.x as f32, rect.y as f32),
        vec2(rect.width as f32, rect.height as f32),
    )
}

pub struct EguiBackend<'a> {
    painter: Painter,
    fonts: &'a FontSet,
    textures: &'a mut TextureCache,
}

impl<'a> EguiBackend<'a> {
    pub fn new(painter: Painter, fonts: &'a FontSet, textures: &'a mut TextureCache) -> Self {
        Self {
            painter,
            fonts,
            textures,
        }
    }

    fn galley(&self, font: &FontSpec, text: &str, color: Color32) -> Arc<egui::Galley> {
        self.painter
            .layout_no_wrap(text.to_string(), self.fonts.font_id(font), color)
    }
}

impl TextMeasurer for EguiBackend<'_> {
    fn text_width(&self, font: &FontSpec, text: &str) -> i32 {
        self.galley(font, text, Color32::WHITE).size().x.ceil() as i32
    }

    fn line_height(&self, font: &FontSpec) -> i32 {
        self.galley(font, "Ag", Color32::WHITE).size().y.ceil() as i32
    }
}

impl DrawingBackend for EguiBackend<'_> {
    fn fill_rect(&mut self, rect: Rect<Physical>, rgb: Rgb) {
        let mut mesh = Mesh::default();
        mesh.add_colored_rect(egui_rect(rect), color(rgb));
        self.painter.add(Shape::mesh(mesh));
    }

    fn plot_points(&mut self, points: &[Point<Physical>], rgb: Rgb) {
        let mut mesh = Mesh::default();
        for point in points {
            mesh.add_colored_rect(egui_rect(Rect::square(point.x, point.y, 1)), color(rgb));
        }
        self.painter.add(Shape::mesh(mesh));
    }

    fn draw_text(
        &mut self,
        font: &FontSpec,
        text: &str,
        center: Point<Physical>,
        rgb: Rgb,
        rotation: RotationAngle,
    ) -> Result<(), DrawError> {
        let galley = self.galley(font, text, color(rgb));
        let size = galley.size();
        if size.x <= 0.0 {
            return Err(DrawError::NoGlyphs(text.to_string()));
        }
        let angle = rotation.radians();
        // TextShape rotates about its top-left corner.
        let half = egui::emath::Rot2::from_angle(angle) * (size / 2.0);
        let pos = Pos2::new(center.x as f32, center.y as f32) - half;
        self.painter
            .add(TextShape::new(pos, galley, color(rgb)).with_angle(angle));
        Ok(())
    }

    fn draw_image(
        &mut self,
        path: &Path,
        rect: Rect<Physical>,
        rotation: RotationAngle,
    ) -> Result<(), DrawError> {
        let texture = self.textures.get(self.painter.ctx(), path)?;

        let center = egui_rect(rect).center();
        let (w, h) = if rotation.swaps_axes() {
            (rect.height as f32, rect.width as f32)
        } else {
            (rect.width as f32, rect.height as f32)
        };
        let half = vec2(w / 2.0, h / 2.0);
        let (sin_r, cos_r) = rotation.radians().sin_cos();
        let corners = [
            (vec2(-half.x, -half.y), Pos2::new(0.0, 0.0)),
            (vec2(half.x, -half.y), Pos2::new(1.0, 0.0)),
            (vec2(half.x, half.y), Pos2::new(1.0, 1.0)),
            (vec2(-half.x, half.y), Pos2::new(0.0, 1.0)),
        ];

        let mut mesh = Mesh::with_texture(texture.id());
        for (offset, uv) in corners {
            let rotated = vec2(
                offset.x * cos_r - offset.y * sin_r,
                offset.x * sin_r + offset.y * cos_r,
            );
            mesh.vertices.push(Vertex {
                pos: center + rotated,
                uv,
                color: Color32::WHITE,
            });
        }
        mesh.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
        self.painter.add(Shape::mesh(mesh));
        Ok(())
    }
}

/// Presses of this frame as pointer events. A finger produces both a touch
/// and a simulated mouse press, so mouse presses are dropped when any touch
/// started.
pub fn pointer_events(events: &[egui::Event], physical: Dimensions) -> Vec<PointerEvent> {
    let touches: Vec<PointerEvent> = events
        .iter()
        .filter_map(|event| match event {
            egui::Event::Touch {
                phase: TouchPhase::Start,
                pos,
                ..
            } => Some(PointerEvent::Touch {
                x: pos.x / physical.width as f32,
                y: pos.y / physical.height as f32,
            }),
            _ => None,
        })
        .collect();
    if !touches.is_empty() {
        return touches;
    }

    events
        .iter()
        .filter_map(|event| match event {
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed: true,
                ..
            } => Some(PointerEvent::Mouse {
                x: pos.x as i32,
                y: pos.y as i32,
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Modifiers, PointerButton, TouchDeviceId, TouchId};

    fn press(x: f32, y: f32) -> egui::Event {
        egui::Event::PointerButton {
            pos: Pos2::new(x, y),
            button: PointerButton::Primary,
            pressed: true,
            modifiers: Modifiers::default(),
        }
    }

    fn touch(phase: TouchPhase, x: f32, y: f32) -> egui::Event {
        egui::Event::Touch {
            device_id: TouchDeviceId(0),
            id: TouchId(1),
            phase,
            pos: Pos2::new(x, y),
            force: None,
        }
    }

    #[test]
    fn test_mouse_presses() {
        let physical = Dimensions::new(1280, 720);
        let release = egui::Event::PointerButton {
            pos: Pos2::new(5.0, 5.0),
            button: PointerButton::Primary,
            pressed: false,
            modifiers: Modifiers::default(),
        };
        let events = [press(100.7, 200.2), release];
        assert_eq!(
            pointer_events(&events, physical),
            vec![PointerEvent::Mouse { x: 100, y: 200 }]
        );
    }

    #[test]
    fn test_touch_wins_over_simulated_press() {
        let physical = Dimensions::new(1280, 720);
        let events = [
            touch(TouchPhase::Start, 640.0, 360.0),
            press(640.0, 360.0),
            touch(TouchPhase::End, 640.0, 360.0),
        ];
        assert_eq!(
            pointer_events(&events, physical),
            vec![PointerEvent::Touch { x: 0.5, y: 0.5 }]
        );
    }

    #[test]
    fn test_missing_texture_is_remembered() {
        let ctx = egui::Context::default();
        let mut cache = TextureCache::default();
        let path = Path::new("/nonexistent/cover.jpg");

        assert!(matches!(cache.get(&ctx, path), Err(DrawError::Image { .. })));
        assert!(matches!(cache.get(&ctx, path), Err(DrawError::Image { .. })));
        assert_eq!(cache.textures.len(), 1);
    }

    #[test]
    fn test_texture_cache_keeps_two_covers() {
        let dir = std::env::temp_dir().join(format!(
            "nowplaying-kiosk-textures-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let covers: Vec<PathBuf> = (0..50)
            .map(|i| {
                let path = dir.join(format!("cover-{i}.png"));
                image::RgbaImage::new(4, 4).save(&path).unwrap();
                path
            })
            .collect();

        let ctx = egui::Context::default();
        let mut cache = TextureCache::default();
        for cover in &covers {
            assert!(cache.get(&ctx, cover).is_ok());
            assert!(cache.textures.len() <= TextureCache::CAPACITY);
        }

        // The previous cover is still held, older ones are gone.
        let previous = &covers[48];
        assert!(cache.get(&ctx, previous).is_ok());
        let held: Vec<&PathBuf> = cache.textures.iter().map(|(path, _)| path).collect();
        assert_eq!(held, vec![previous, &covers[49]]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_text_without_glyphs_is_an_error() {
        let ctx = egui::Context::default();
        let fonts = FontSet::default();
        let mut textures = TextureCache::default();
        let white = Rgb {
            r: 255,
            g: 255,
            b: 255,
        };

        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::background());
            let mut backend = EguiBackend::new(painter, &fonts, &mut textures);
            let font = FontSpec::regular(30.0);
            let center = Point::new(100, 100);

            let drawn = backend.draw_text(&font, "Rick", center, white, RotationAngle::Deg90);
            assert!(drawn.is_ok());
            assert!(matches!(
                backend.draw_text(&font, "", center, white, RotationAngle::Deg0),
                Err(DrawError::NoGlyphs(_))
            ));
        });
    }

    #[test]
    fn test_symbol_face_uses_default_family() {
        let fonts = FontSet::default();
        assert_eq!(fonts.family(FontFace::Symbol), FontFamily::Proportional);
        assert_eq!(fonts.family(FontFace::Bold), FontFamily::Proportional);
        let id = fonts.font_id(&FontSpec::regular(42.0));
        assert_eq!(id.size, 42.0);
    }
}
